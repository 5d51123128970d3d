use anyhow::Context;

use library_events_api::app::{build_app, services::build_services};
use library_events_infra::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    library_events_observability::init();

    let config = AppConfig::from_env()?;
    let services = build_services(&config).await?;
    let app = build_app(services.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    services.shutdown().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
    tracing::info!("shutting down");
}
