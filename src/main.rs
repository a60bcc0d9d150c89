use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{header, HeaderValue};
use quest_engine::config::Config;
use quest_engine::engine::config::EngineConfig;
use quest_engine::engine::QuestEngine;
use quest_engine::logging::{init_tracing, LogConfig};
use quest_engine::routes::build_router;
use quest_engine::state::AppState;
use quest_engine::store::Store;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let config = Config::from_env();
    init_tracing(&LogConfig::from(&config));
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting quest-engine");

    let store = Arc::new(Store::open(&config.sled_path).expect("Failed to open sled database"));
    store.run_migrations().expect("Failed to run migrations");

    let engine_config = load_engine_config(&store, &config);
    let engine = Arc::new(QuestEngine::new(engine_config, store.clone()));

    let state = AppState::new(store.clone(), engine);

    let app = build_router(state)
        .layer(build_cors_layer(&config))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    let addr = SocketAddr::new(config.host, config.port);
    tracing::info!(%addr, "Listening");
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind TCP listener");

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "HTTP server crashed");
    }

    tracing::info!("Flushing store before exit");
    if let Err(e) = store.flush() {
        tracing::error!(error = %e, "Failed to flush store before exit");
    }
    tracing::info!("Shutdown complete");
}

/// A config saved through the API wins over the environment.
fn load_engine_config(store: &Store, config: &Config) -> EngineConfig {
    match store.get_engine_config() {
        Ok(Some(saved)) if saved.validate().is_ok() => {
            tracing::info!("Using persisted engine config");
            saved
        }
        Ok(Some(_)) => {
            tracing::warn!("Persisted engine config is invalid, falling back to environment");
            env_engine_config(config)
        }
        Ok(None) => env_engine_config(config),
        Err(e) => {
            tracing::error!(error = %e, "Failed to read persisted engine config");
            env_engine_config(config)
        }
    }
}

fn env_engine_config(config: &Config) -> EngineConfig {
    let engine_config = EngineConfig::from_env(&config.engine);
    match engine_config.validate() {
        Ok(()) => engine_config,
        Err(msg) => {
            tracing::warn!(error = %msg, "Engine env config invalid, using defaults");
            EngineConfig::default()
        }
    }
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    if config.cors_origin.trim() == "*" {
        return CorsLayer::new()
            .allow_origin(Any)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_methods(Any);
    }

    match config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => CorsLayer::new()
            .allow_origin(origin)
            .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
            .allow_methods(Any),
        Err(e) => {
            panic!(
                "FATAL: Invalid CORS_ORIGIN '{}': {}. Fix the CORS_ORIGIN environment variable.",
                config.cors_origin, e
            );
        }
    }
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler");
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {},
            _ = sigterm.recv() => {},
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }

    tracing::info!("Shutdown signal received");
}
