use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use server_core::{routes, AppState, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,server=debug,paperqa=debug")),
        )
        .init();

    // Fatal on missing credentials: refuse to serve rather than fail lazily.
    let config = Config::from_env()?;
    let addr = format!("0.0.0.0:{}", config.port);

    let state = AppState::from_config(&config).await?;
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!(%addr, data_dir = %config.data_dir, "paper QA server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
