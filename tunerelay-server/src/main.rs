use std::sync::Arc;

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use music_providers::ProviderRegistry;
use stream_relay::{RelayConfig, StreamRelay};
use tunerelay_server::AppState;
use tunerelay_server::routes;

#[derive(Debug, Error)]
enum AppError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("relay error: {0}")]
    Relay(#[from] stream_relay::RelayError),
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,hyper=warn,reqwest=warn"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let registry = Arc::new(ProviderRegistry::standard());
    let relay = Arc::new(StreamRelay::new(RelayConfig::default())?);
    let app = routes::router(AppState { registry, relay });

    let addr = std::env::var("TUNERELAY_ADDR").unwrap_or_else(|_| "0.0.0.0:3271".to_owned());
    let listener = TcpListener::bind(&addr).await?;
    info!("listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown signal received"),
        Err(cause) => tracing::error!("failed to listen for ctrl-c: {cause}"),
    }
}
