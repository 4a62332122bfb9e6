use rd_config::ServiceConfig;
use rd_provider::{ModelClient, ModelProvider};
use rd_quota::UsageStore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub config: ServiceConfig,
    pub usage: Arc<UsageStore>,
    pub models: Arc<dyn ModelProvider>,
    pub version: &'static str,
}

impl AppState {
    /// Wires production state: the usage ledger at its configured path and
    /// HTTP clients for the two model services. Everything downstream
    /// receives these through state rather than constructing its own.
    pub fn new(config: ServiceConfig) -> anyhow::Result<Self> {
        let db_path = config.resolved_database_path()?;
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let usage = Arc::new(UsageStore::open(&db_path)?);

        let models: Arc<dyn ModelProvider> = Arc::new(ModelClient::new(
            config.detection.endpoint.clone(),
            config.detection.api_key.clone(),
            config.paraphrase.endpoint.clone(),
            config.paraphrase.api_key.clone(),
        )?);

        Ok(Self {
            config,
            usage,
            models,
            version: env!("CARGO_PKG_VERSION"),
        })
    }

    /// State from explicit parts; tests pair an in-memory store with a
    /// scripted provider.
    pub fn with_parts(
        config: ServiceConfig,
        usage: Arc<UsageStore>,
        models: Arc<dyn ModelProvider>,
    ) -> Self {
        Self {
            config,
            usage,
            models,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}
