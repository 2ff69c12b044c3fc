//! Shared wiring for CLI commands.

use std::sync::Arc;

use anyhow::{bail, Context as _, Result};

use crate::domain::models::{CollectionMode, Config, Hardware};
use crate::domain::ports::{RunRepository, SourceReader};
use crate::infrastructure::database::{DatabaseConnection, SqliteRunRepository};
use crate::infrastructure::readers::{
    CachedReader, FallbackResolver, LocalReader, RemoteReader,
};
use crate::services::{TaskResultAggregator, TrendEngine};

/// Everything a command needs, built once from configuration.
pub struct EngineContext {
    pub resolver: Arc<FallbackResolver>,
    pub aggregator: Arc<TaskResultAggregator>,
    pub trend: TrendEngine,
    pub store: Arc<dyn RunRepository>,
}

impl EngineContext {
    pub async fn build(config: &Config) -> Result<Self> {
        let db = DatabaseConnection::new(
            &format!("sqlite:{}", config.database.path),
            config.database.max_connections,
        )
        .await
        .context("Failed to open result cache database")?;
        db.migrate().await.context("Failed to run migrations")?;

        let store: Arc<dyn RunRepository> = Arc::new(SqliteRunRepository::new(db.pool()));

        let mut readers: Vec<Arc<dyn SourceReader>> = Vec::new();
        if config.collection.mode == CollectionMode::RemoteFirst {
            readers.push(Arc::new(
                RemoteReader::new(&config.remote)
                    .context("Failed to build remote reader")?,
            ));
        }
        readers.push(Arc::new(LocalReader::new(config.log_root.clone())));

        let resolver = Arc::new(FallbackResolver::new(readers));
        let cache = config
            .collection
            .use_cache
            .then(|| CachedReader::new(store.clone()));
        let aggregator = Arc::new(TaskResultAggregator::new(resolver.clone(), cache));
        let trend = TrendEngine::new(aggregator.clone(), resolver.clone());

        Ok(Self {
            resolver,
            aggregator,
            trend,
            store,
        })
    }
}

/// Resolve the hardware platform: explicit flag first, then the configured
/// hostname map.
pub fn resolve_hardware(config: &Config, flag: Option<Hardware>) -> Result<Hardware> {
    if let Some(hardware) = flag {
        return Ok(hardware);
    }
    let hostname = std::env::var("HOSTNAME").unwrap_or_default();
    match Hardware::detect(&hostname, &config.hostname_map) {
        Some(hardware) => Ok(hardware),
        None => bail!(
            "could not detect hardware for host '{hostname}'; pass --hardware or add the host to hostname_map"
        ),
    }
}
