use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;

use crate::engine::config::ProgressionCriteria;
use crate::engine::types::MasteryTier;
use crate::extractors::QueryParams;
use crate::response::{ok, AppError};
use crate::routes::require_id;
use crate::state::AppState;
use crate::validation::validate_percentage;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/progression/:quest_id", get(check))
        .route("/:id/progression/:quest_id/advance", post(advance))
}

/// Per-call overrides layered over the configured criteria.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CriteriaQuery {
    min_mastery: Option<MasteryTier>,
    min_challenges: Option<u32>,
    min_completion_rate: Option<f64>,
    require_all: Option<bool>,
}

impl CriteriaQuery {
    fn apply(self, mut base: ProgressionCriteria) -> Result<ProgressionCriteria, AppError> {
        if let Some(tier) = self.min_mastery {
            base.minimum_mastery_level = tier;
        }
        if let Some(n) = self.min_challenges {
            base.minimum_challenges_completed = n;
        }
        if let Some(rate) = self.min_completion_rate {
            validate_percentage(rate)
                .map_err(|msg| AppError::bad_request("INVALID_CRITERIA", msg))?;
            base.minimum_completion_rate = rate;
        }
        if let Some(all) = self.require_all {
            base.require_all_challenges = all;
        }
        Ok(base)
    }
}

async fn check(
    State(state): State<AppState>,
    Path((student_id, quest_id)): Path<(String, String)>,
    QueryParams(query): QueryParams<CriteriaQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_id(&student_id)?;
    require_id(&quest_id)?;
    let criteria = query.apply(state.engine().default_criteria().await)?;
    let result = state
        .engine()
        .check_progression(&student_id, &quest_id, &criteria)
        .await?;
    Ok(ok(result))
}

async fn advance(
    State(state): State<AppState>,
    Path((student_id, quest_id)): Path<(String, String)>,
    QueryParams(query): QueryParams<CriteriaQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_id(&student_id)?;
    require_id(&quest_id)?;
    let criteria = query.apply(state.engine().default_criteria().await)?;
    let outcome = state
        .engine()
        .auto_assign_next_quest(&student_id, &quest_id, &criteria)
        .await?;
    Ok(ok(outcome))
}
