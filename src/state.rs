use std::sync::Arc;
use std::time::Instant;

use crate::engine::QuestEngine;
use crate::store::Store;

#[derive(Clone)]
pub struct AppState {
    store: Arc<Store>,
    engine: Arc<QuestEngine>,
    started_at: Instant,
}

impl AppState {
    pub fn new(store: Arc<Store>, engine: Arc<QuestEngine>) -> Self {
        Self {
            store,
            engine,
            started_at: Instant::now(),
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn engine(&self) -> &QuestEngine {
        &self.engine
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::engine::config::EngineConfig;

    #[test]
    fn clones_share_store_and_engine() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let store =
            Arc::new(Store::open(tmp.path().join("state.sled").to_str().unwrap()).unwrap());
        let engine = Arc::new(QuestEngine::new(EngineConfig::default(), store.clone()));
        let state = AppState::new(store, engine);

        let cloned = state.clone();
        assert!(std::ptr::eq(state.store(), cloned.store()));
        assert!(std::ptr::eq(state.engine(), cloned.engine()));
        assert_eq!(state.uptime_secs(), 0);
    }
}
