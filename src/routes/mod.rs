pub mod catalog;
pub mod engine_config;
pub mod health;
pub mod progression;
pub mod students;

use axum::extract::DefaultBodyLimit;
use axum::Router;

use crate::middleware::request_id;
use crate::response::AppError;
use crate::state::AppState;
use crate::validation::validate_identifier;

/// Maximum request body size: 4 MiB (full catalog / curriculum uploads).
const MAX_BODY_SIZE: usize = 4 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .nest("/students", students::router())
        .nest("/quests", catalog::quests_router())
        .nest("/curriculum", catalog::curriculum_router())
        .nest("/engine", engine_config::router())
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE));

    Router::new()
        .nest("/api", api_routes)
        .nest("/health", health::router())
        .layer(axum::middleware::from_fn(request_id::request_id_middleware))
        .with_state(state)
}

pub(crate) fn require_id(value: &str) -> Result<(), AppError> {
    validate_identifier(value).map_err(|msg| AppError::bad_request("INVALID_ID", msg))
}
