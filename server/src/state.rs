use std::sync::Arc;

use store::{MemoryStore, RecordStore, RestStore};
use tracing::{info, warn};

use super::config::Config;

pub struct State {
    pub config: Config,
    pub store: Arc<dyn RecordStore>,
}

impl State {
    pub fn new() -> Arc<Self> {
        let config = Config::load();

        // The fallback is a configuration-absence path. A configured store
        // that fails at runtime surfaces errors instead of silently
        // switching to memory.
        let store: Arc<dyn RecordStore> = match config.store.clone() {
            Some(credentials) => {
                info!("Record store connected: {}", credentials.url);
                Arc::new(RestStore::new(Some(credentials)))
            }
            None => {
                warn!("Record store not configured, using in-memory fallback");
                Arc::new(MemoryStore::new())
            }
        };

        Arc::new(Self { config, store })
    }

    pub fn with_store(config: Config, store: Arc<dyn RecordStore>) -> Arc<Self> {
        Arc::new(Self { config, store })
    }
}
