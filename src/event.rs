//! Ordered asynchronous event dispatch.
//!
//! Subscribers run sequentially in registration order over the same mutable
//! payload. A subscriber that marks the payload handled short-circuits the
//! rest; errors are collected rather than rethrown, and surfaced together once
//! dispatch completes. Registration and removal lock the list; invocation runs
//! over a snapshot taken at its start, so mutations during an in-flight
//! invocation never affect that invocation.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// Future returned by a subscriber; borrows the payload for its lifetime.
pub type HandlerFuture<'a> = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send + 'a>>;

type Handler<T> = Arc<dyn for<'a> Fn(&'a mut T) -> HandlerFuture<'a> + Send + Sync>;

/// Payload contract: exposes the handled flag the dispatcher short-circuits on.
pub trait EventArgs {
    fn handled(&self) -> bool;
}

/// Token identifying one registration, for later removal.
///
/// Registering the same function twice yields two distinct tokens, and the
/// function is invoked twice per dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandlerId(u64);

/// Aggregated subscriber failures from one dispatch.
#[derive(Debug)]
pub struct DispatchError {
    failures: Vec<anyhow::Error>,
}

impl DispatchError {
    pub fn failures(&self) -> &[anyhow::Error] {
        &self.failures
    }
}

impl fmt::Display for DispatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} subscriber(s) failed", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "\n  {failure:#}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DispatchError {}

/// An ordered list of asynchronous subscribers.
pub struct AsyncEvent<T> {
    handlers: Mutex<Vec<(HandlerId, Handler<T>)>>,
    next_id: AtomicU64,
}

impl<T: EventArgs> AsyncEvent<T> {
    pub fn new() -> Self {
        Self {
            handlers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
        }
    }

    /// Appends a subscriber; insertion order is invocation order.
    pub fn subscribe<F>(&self, handler: F) -> HandlerId
    where
        F: for<'a> Fn(&'a mut T) -> HandlerFuture<'a> + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers
            .lock()
            .expect("subscriber list lock poisoned")
            .push((id, Arc::new(handler)));
        id
    }

    /// Removes the registration identified by `id`.
    ///
    /// Returns `false` when the token is unknown (already removed).
    pub fn unsubscribe(&self, id: HandlerId) -> bool {
        let mut handlers = self
            .handlers
            .lock()
            .expect("subscriber list lock poisoned");
        let before = handlers.len();
        handlers.retain(|(registered, _)| *registered != id);
        handlers.len() != before
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers
            .lock()
            .expect("subscriber list lock poisoned")
            .len()
    }

    /// Invokes subscribers in registration order over a snapshot of the list.
    ///
    /// After a subscriber completes without error, a set handled flag skips
    /// the rest. A failing subscriber does not stop iteration; all failures
    /// are aggregated into the returned [`DispatchError`].
    pub async fn invoke(&self, args: &mut T) -> Result<(), DispatchError> {
        let snapshot: Vec<Handler<T>> = self
            .handlers
            .lock()
            .expect("subscriber list lock poisoned")
            .iter()
            .map(|(_, handler)| handler.clone())
            .collect();

        let mut failures = Vec::new();

        for handler in snapshot {
            match handler(args).await {
                Ok(()) => {
                    if args.handled() {
                        break;
                    }
                }
                Err(e) => failures.push(e),
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(DispatchError { failures })
        }
    }
}

impl<T: EventArgs> Default for AsyncEvent<T> {
    fn default() -> Self {
        Self::new()
    }
}
