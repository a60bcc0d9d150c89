use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::routing::{get, post, put};
use axum::Router;
use serde::Deserialize;

use crate::constants::MAX_MASTERY_RECORDS_PER_REQUEST;
use crate::engine::types::{MasteryRecord, MasteryTier};
use crate::extractors::{JsonBody, QueryParams};
use crate::response::{created, ok, AppError};
use crate::routes::{progression, require_id};
use crate::state::AppState;
use crate::store::operations::student_quests::StudentQuestStatus;
use crate::validation::validate_tier_name;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:id/mastery", get(list_mastery).put(put_mastery))
        .route("/:id/domains", get(domain_summaries))
        .route("/:id/recommendations", get(recommendations))
        .route("/:id/quests", get(list_quests))
        .route("/:id/quests/:quest_id", put(set_quest_status))
        .route("/:id/submissions", post(record_submission))
        .merge(progression::router())
}

async fn list_mastery(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_id(&student_id)?;
    let records = state.store().list_mastery_records(&student_id)?;
    Ok(ok(records))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PutMasteryRequest {
    records: Vec<MasteryRecord>,
    /// `false` merges into the existing snapshot instead of replacing it.
    #[serde(default = "default_replace")]
    replace: bool,
}

fn default_replace() -> bool {
    true
}

async fn put_mastery(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    JsonBody(req): JsonBody<PutMasteryRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_id(&student_id)?;
    if req.records.len() > MAX_MASTERY_RECORDS_PER_REQUEST {
        return Err(AppError::payload_too_large(&format!(
            "at most {MAX_MASTERY_RECORDS_PER_REQUEST} records per request"
        )));
    }

    let written = if req.replace {
        state.store().replace_mastery_records(&student_id, &req.records)?
    } else {
        for record in &req.records {
            state.store().upsert_mastery_record(&student_id, record)?;
        }
        req.records.len()
    };
    tracing::info!(student_id = %student_id, written, replace = req.replace, "Mastery records stored");
    Ok(ok(serde_json::json!({ "written": written })))
}

async fn domain_summaries(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_id(&student_id)?;
    Ok(ok(state.engine().domain_summaries(&student_id)?))
}

#[derive(Debug, Default, Deserialize)]
struct RecommendationQuery {
    tier: Option<String>,
}

async fn recommendations(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    QueryParams(query): QueryParams<RecommendationQuery>,
) -> Result<impl IntoResponse, AppError> {
    require_id(&student_id)?;
    // no tier: only quests open to every tier are offered
    let tier = query.tier.unwrap_or_default();
    if !tier.is_empty() {
        validate_tier_name(&tier).map_err(|msg| AppError::bad_request("INVALID_TIER", msg))?;
    }
    let recs = state.engine().recommendations_for(&student_id, &tier).await?;
    Ok(ok(recs))
}

async fn list_quests(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    require_id(&student_id)?;
    Ok(ok(state.store().list_student_quests(&student_id)?))
}

#[derive(Debug, Deserialize)]
struct SetQuestStatusRequest {
    status: StudentQuestStatus,
}

async fn set_quest_status(
    State(state): State<AppState>,
    Path((student_id, quest_id)): Path<(String, String)>,
    JsonBody(req): JsonBody<SetQuestStatusRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_id(&student_id)?;
    require_id(&quest_id)?;
    let entry = state
        .store()
        .set_student_quest_status(&student_id, &quest_id, req.status)?;
    Ok(ok(entry))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SubmissionRequest {
    challenge_id: String,
    mastery_level: MasteryTier,
}

async fn record_submission(
    State(state): State<AppState>,
    Path(student_id): Path<String>,
    JsonBody(req): JsonBody<SubmissionRequest>,
) -> Result<impl IntoResponse, AppError> {
    require_id(&student_id)?;
    require_id(&req.challenge_id)?;
    let submission =
        state
            .store()
            .record_submission(&student_id, &req.challenge_id, req.mastery_level)?;
    Ok(created(submission))
}
