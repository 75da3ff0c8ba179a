use crate::config::AppConfig;
use crate::db::PgStore;
use crate::images::slot::UploadSlot;
use crate::storage::{KvStore, MemoryStore};
use std::sync::Arc;
use tracing::warn;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub store: Arc<dyn KvStore>,
    pub uploads: Arc<UploadSlot>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        let store = match config.database_url.as_deref() {
            Some(url) => {
                Arc::new(PgStore::connect(url, config.storage_capacity_bytes).await?) as Arc<dyn KvStore>
            }
            None => {
                warn!("DATABASE_URL not set; diary is kept in memory only");
                Arc::new(MemoryStore::new(config.storage_capacity_bytes)) as Arc<dyn KvStore>
            }
        };

        Ok(Self::from_parts(config, store))
    }

    pub fn from_parts(config: Arc<AppConfig>, store: Arc<dyn KvStore>) -> Self {
        Self {
            config,
            store,
            uploads: Arc::new(UploadSlot::default()),
        }
    }

    /// In-memory state with default config, for tests.
    #[cfg(test)]
    pub fn fake() -> Self {
        let config = Arc::new(AppConfig::default());
        let store = Arc::new(MemoryStore::new(config.storage_capacity_bytes)) as Arc<dyn KvStore>;
        Self::from_parts(config, store)
    }
}
