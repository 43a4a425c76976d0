use std::sync::Arc;

use anyhow::Context;
use axum::Router;
use tokio::net::TcpListener;

use docqa_backend::core::config::AppConfig;
use docqa_backend::core::logging;
use docqa_backend::server::router::router;
use docqa_backend::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    logging::init(&config.log_dir);

    let port = config.port;
    let state: Arc<AppState> = AppState::initialize(config).await?;

    match state.provider.health_check().await {
        Ok(true) => tracing::info!("provider {} is reachable", state.provider.name()),
        _ => tracing::warn!(
            "provider {} is not reachable; requests will fail until it is",
            state.provider.name()
        ),
    }

    let bind_addr = format!("127.0.0.1:{}", port);
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    tracing::info!("Listening on {}", listener.local_addr()?);

    let app: Router = router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
