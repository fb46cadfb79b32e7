use httpd::config::Config;
use httpd::event::HandlerFuture;
use httpd::http::response::StatusCode;
use httpd::server::{HttpServer, RequestEvent};

fn greet(event: &mut RequestEvent) -> HandlerFuture<'_> {
    Box::pin(async move {
        if event.request.local_path() == "/" {
            event
                .response
                .with_status(StatusCode::Ok)
                .with_text("It works!\n");
            event.handled = true;
        }

        Ok(())
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load()?;

    let mut server = HttpServer::new(cfg.port);
    server.on_request().subscribe(greet);

    server.start().await?;

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown signal received");

    server.stop().await?;

    Ok(())
}
