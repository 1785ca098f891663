use anyhow::Context;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use anifin_metadata::provider::ProviderRegistry;
use anifin_server::config::ServerConfig;
use anifin_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = ServerConfig::from_env();

    // Cache directory
    std::fs::create_dir_all(&config.metadata.cache_dir)
        .context("failed to create cache dir")?;
    info!(cache_dir = %config.metadata.cache_dir.display(), "image cache ready");

    let registry =
        ProviderRegistry::from_config(&config.metadata).context("failed to build providers")?;
    if registry.is_empty() {
        warn!("every metadata provider is disabled");
    }

    let app = anifin_server::routes::build_router(AppState::new(registry));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .context("failed to bind")?;
    info!(addr = %config.bind, "server listening");

    axum::serve(listener, app).await?;
    Ok(())
}
