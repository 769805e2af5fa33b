// content-service-rs/src/main.rs
// Main entry point for the content service.
// Reads CONTENT_* settings, picks a script store and serves the HTTP surface.

use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn};

use content_sdk::config::{ConfigProviderExt, DEFAULT_PROVIDER};
use content_sdk::{
    ContentClient, MemoryScriptStore, PostgrestScriptStore, ScriptStore, StaticTokenSource, StoreConfig,
};
use content_service::logging::{init_logging, LoggingConfig};
use content_service::{router, AppState};

/// Hosted store when `CONTENT_STORE_URL` is configured, in-process store otherwise
fn build_store() -> anyhow::Result<Arc<dyn ScriptStore>> {
    let config = DEFAULT_PROVIDER.as_ref();

    match StoreConfig::from_provider(config) {
        Ok(store_config) => {
            // Service credential if one is set, the public key otherwise
            let token = config.get_string_or("store_service_token", &store_config.anon_key);
            let store = PostgrestScriptStore::new(&store_config, Arc::new(StaticTokenSource::new(token)))
                .context("failed to create script store")?;
            info!(table = %store_config.table, "Using hosted script store");
            Ok(Arc::new(store))
        }
        Err(err) => {
            warn!(reason = %err, "Hosted script store not configured, keeping scripts in memory");
            Ok(Arc::new(MemoryScriptStore::new()))
        }
    }
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_logging(LoggingConfig::from_env())?;

    let client = ContentClient::from_config(DEFAULT_PROVIDER.as_ref())
        .context("failed to configure generative provider")?;
    info!(provider = client.provider_name(), "Content client ready");

    let state = Arc::new(AppState::new(client, build_store()?));
    let app = router(state);

    let addr = config_rs::get_bind_address("CONTENT", 8080);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;

    info!(%addr, "Content service starting");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}
