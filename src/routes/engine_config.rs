use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;

use crate::engine::config::EngineConfig;
use crate::extractors::JsonBody;
use crate::response::{ok, AppError};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/config", get(get_config).put(put_config))
}

async fn get_config(State(state): State<AppState>) -> impl IntoResponse {
    ok(state.engine().get_config().await)
}

async fn put_config(
    State(state): State<AppState>,
    JsonBody(config): JsonBody<EngineConfig>,
) -> Result<impl IntoResponse, AppError> {
    let version = state.engine().reload_config(config.clone()).await?;
    Ok(ok(serde_json::json!({
        "version": version,
        "config": config,
    })))
}
