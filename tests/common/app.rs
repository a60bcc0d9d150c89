use std::sync::Arc;

use axum::Router;
use tempfile::TempDir;

use quest_engine::config::{Config, EngineEnvConfig};
use quest_engine::engine::config::EngineConfig;
use quest_engine::engine::QuestEngine;
use quest_engine::routes::build_router;
use quest_engine::state::AppState;
use quest_engine::store::Store;

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
    pub config: Config,
    _temp_dir: TempDir,
}

// built directly; set_var would race across parallel tests
fn test_config(sled_path: String) -> Config {
    Config {
        host: std::net::IpAddr::V4(std::net::Ipv4Addr::new(127, 0, 0, 1)),
        port: 3000,
        log_level: "info".to_string(),
        enable_file_logs: false,
        log_dir: "./logs".to_string(),
        sled_path,
        cors_origin: "http://localhost:5173".to_string(),
        engine: EngineEnvConfig {
            max_recommendations: 10,
            min_challenges_completed: 12,
            min_completion_rate: 75.0,
            min_mastery_level: "developing".to_string(),
            require_all_challenges: false,
        },
    }
}

pub async fn spawn_test_server() -> TestApp {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let sled_path = temp_dir.path().join("quest-test.sled");
    let config = test_config(sled_path.to_string_lossy().to_string());

    let store = Arc::new(Store::open(&config.sled_path).expect("open store"));
    store.run_migrations().expect("run migrations");

    let engine = Arc::new(QuestEngine::new(
        EngineConfig::from_env(&config.engine),
        store.clone(),
    ));
    let state = AppState::new(store, engine);

    TestApp {
        app: build_router(state.clone()),
        state,
        config,
        _temp_dir: temp_dir,
    }
}
