use std::net::SocketAddr;

use color_eyre::eyre::WrapErr as _;
use tracing::info;

const DEFAULT_PORT: u16 = 3000;

/// Serve the router on `PORT` (default 3000) until the process exits
pub async fn run_server(app: axum::Router) -> crate::Result<()> {
    let port = match std::env::var("PORT") {
        Ok(raw) => raw
            .parse::<u16>()
            .wrap_err_with(|| format!("Invalid PORT: {}", raw))?,
        Err(_) => DEFAULT_PORT,
    };
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", addr))?;

    info!("Listening on {}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
