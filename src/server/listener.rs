use std::mem;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::bail;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::event::{AsyncEvent, DispatchError, EventArgs};
use crate::http::connection::Connection;
use crate::http::request::Request;
use crate::http::response::{Response, StatusCode};

/// Payload delivered to request subscribers.
///
/// Carries the exchange's request and response; a subscriber that answers the
/// request sets `handled` to suppress the default not-found synthesis.
#[derive(Debug)]
pub struct RequestEvent {
    pub request: Request,
    pub response: Response,
    pub handled: bool,
}

impl RequestEvent {
    fn new(request: Request, response: Response) -> Self {
        Self {
            request,
            response,
            handled: false,
        }
    }
}

impl EventArgs for RequestEvent {
    fn handled(&self) -> bool {
        self.handled
    }
}

enum State {
    Stopped,
    Listening {
        local_addr: SocketAddr,
        shutdown: watch::Sender<bool>,
        accept_task: JoinHandle<()>,
    },
}

/// The listening socket and its accept loop.
///
/// Explicit `Stopped`/`Listening` state machine: [`start`](HttpServer::start)
/// binds and spawns the accept loop, [`stop`](HttpServer::stop) releases the
/// listening socket and waits for the loop to exit. In-flight connection
/// tasks are not cancelled by `stop`; they run to completion independently.
///
/// No read/write deadline is applied to connections: a slow peer holds its
/// own handling task indefinitely, never the acceptor or other connections.
pub struct HttpServer {
    port: u16,
    on_request: Arc<AsyncEvent<RequestEvent>>,
    state: State,
}

impl HttpServer {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            on_request: Arc::new(AsyncEvent::new()),
            state: State::Stopped,
        }
    }

    /// The request-handling hook; the engine's only extension point.
    pub fn on_request(&self) -> &AsyncEvent<RequestEvent> {
        &self.on_request
    }

    pub fn is_listening(&self) -> bool {
        matches!(self.state, State::Listening { .. })
    }

    /// The bound address while listening. Useful with port 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        match &self.state {
            State::Listening { local_addr, .. } => Some(*local_addr),
            State::Stopped => None,
        }
    }

    /// Binds to the configured port on all addresses and starts accepting.
    ///
    /// Fails if the server is already listening or the port cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<()> {
        if self.is_listening() {
            bail!("server is already listening");
        }

        let listener = TcpListener::bind(SocketAddr::from(([0, 0, 0, 0], self.port))).await?;
        let local_addr = listener.local_addr()?;

        let (shutdown, shutdown_rx) = watch::channel(false);
        let hook = self.on_request.clone();
        let accept_task = tokio::spawn(accept_loop(listener, hook, shutdown_rx));

        info!("Listening on {}", local_addr);

        self.state = State::Listening {
            local_addr,
            shutdown,
            accept_task,
        };

        Ok(())
    }

    /// Releases the listening socket and waits for the accept loop to exit.
    ///
    /// A no-op when already stopped.
    pub async fn stop(&mut self) -> anyhow::Result<()> {
        match mem::replace(&mut self.state, State::Stopped) {
            State::Stopped => Ok(()),
            State::Listening {
                shutdown,
                accept_task,
                local_addr,
            } => {
                let _ = shutdown.send(true);
                accept_task.await?;
                info!("Stopped listening on {}", local_addr);
                Ok(())
            }
        }
    }
}

async fn accept_loop(
    listener: TcpListener,
    hook: Arc<AsyncEvent<RequestEvent>>,
    mut shutdown: watch::Receiver<bool>,
) {
    loop {
        tokio::select! {
            _ = shutdown.changed() => {
                debug!("Accept loop shutting down");
                break;
            }

            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    debug!("Accepted connection from {}", peer);

                    let hook = hook.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handle_connection(socket, hook).await {
                            error!("Connection error from {}: {}", peer, e);
                        }
                    });
                }
                Err(e) => {
                    warn!("Accept failed: {}", e);
                }
            }
        }
    }
    // Dropping the listener here releases the socket.
}

/// Drives one request/response exchange.
///
/// Every code path ends in exactly one serialize: parse failures and dispatch
/// failures are translated into error responses, an unhandled request into a
/// not-found response.
async fn handle_connection(
    socket: TcpStream,
    hook: Arc<AsyncEvent<RequestEvent>>,
) -> anyhow::Result<()> {
    let mut conn = Connection::new(socket);

    let mut response = match conn.parse().await {
        Ok(request) => {
            debug!("{} {}", request.method().as_str(), request.raw_url());

            let mut event = RequestEvent::new(request, conn.take_response());
            let outcome = hook.invoke(&mut event).await;

            let RequestEvent {
                request,
                mut response,
                handled,
            } = event;

            match outcome {
                Err(failure) => {
                    warn!("Dispatch failed for {}: {}", request.local_path(), failure);
                    dispatch_failure_response(&mut response, &failure);
                }
                Ok(()) if !handled => {
                    not_found_response(&mut response, request.local_path());
                }
                Ok(()) => {}
            }

            response
        }
        Err(e) => {
            warn!("Request parsing failed: {}", e);

            let mut response = conn.take_response();
            let status = e.status();
            response.with_status(status).with_text(format!(
                "{} {}\n{}",
                status.as_u16(),
                status.reason_phrase(),
                e
            ));
            response
        }
    };

    conn.send(&mut response).await?;
    conn.close().await?;

    Ok(())
}

fn not_found_response(response: &mut Response, path: &str) {
    response
        .with_status(StatusCode::NotFound)
        .with_text(format!("404 Not Found: no handler answered {path}"));
}

fn dispatch_failure_response(response: &mut Response, failure: &DispatchError) {
    response
        .with_status(StatusCode::InternalServerError)
        .with_text(format!("500 Internal Server Error\n{failure}"));
}
