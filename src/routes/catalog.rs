use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use crate::constants::{
    DEFAULT_PAGE_SIZE, MAX_CHALLENGES_PER_QUEST, MAX_CURRICULUM_QUESTS, MAX_PAGE_SIZE,
    MAX_QUEST_CATALOG_SIZE,
};
use crate::engine::curriculum::CurriculumQuest;
use crate::engine::types::QuestDescriptor;
use crate::extractors::{JsonBody, QueryParams};
use crate::response::{ok, paginated, AppError};
use crate::state::AppState;
use crate::validation::{validate_identifier, validate_tier_name};

pub fn quests_router() -> Router<AppState> {
    Router::new().route("/", get(list_quests).put(replace_quests))
}

pub fn curriculum_router() -> Router<AppState> {
    Router::new().route("/", get(list_curriculum).put(replace_curriculum))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageQuery {
    page: Option<u64>,
    per_page: Option<u64>,
}

async fn list_quests(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query
        .per_page
        .unwrap_or(DEFAULT_PAGE_SIZE)
        .clamp(1, MAX_PAGE_SIZE);

    let all = state.store().list_quests()?;
    let total = all.len() as u64;
    let items: Vec<QuestDescriptor> = all
        .into_iter()
        .skip(usize::try_from(page.saturating_sub(1).saturating_mul(per_page)).unwrap_or(usize::MAX))
        .take(per_page as usize)
        .collect();
    Ok(paginated(items, total, page, per_page))
}

#[derive(Debug, Deserialize)]
struct ReplaceQuestsRequest {
    quests: Vec<QuestDescriptor>,
}

async fn replace_quests(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ReplaceQuestsRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.quests.len() > MAX_QUEST_CATALOG_SIZE {
        return Err(AppError::payload_too_large(&format!(
            "at most {MAX_QUEST_CATALOG_SIZE} quests per catalog"
        )));
    }
    for quest in &req.quests {
        validate_identifier(&quest.id)
            .map_err(|msg| AppError::bad_request("INVALID_QUEST_ID", msg))?;
    }
    let count = state.store().replace_quest_catalog(&req.quests)?;
    tracing::info!(count, "Quest catalog replaced");
    Ok(ok(serde_json::json!({ "count": count })))
}

async fn list_curriculum(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    Ok(ok(state.store().list_curriculum()?))
}

#[derive(Debug, Deserialize)]
struct ReplaceCurriculumRequest {
    quests: Vec<CurriculumQuest>,
}

async fn replace_curriculum(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ReplaceCurriculumRequest>,
) -> Result<impl IntoResponse, AppError> {
    if req.quests.len() > MAX_CURRICULUM_QUESTS {
        return Err(AppError::payload_too_large(&format!(
            "at most {MAX_CURRICULUM_QUESTS} curriculum quests"
        )));
    }
    for quest in &req.quests {
        validate_identifier(&quest.id)
            .map_err(|msg| AppError::bad_request("INVALID_QUEST_ID", msg))?;
        validate_tier_name(&quest.tier)
            .map_err(|msg| AppError::bad_request("INVALID_TIER", msg))?;
        if quest.challenge_ids.len() > MAX_CHALLENGES_PER_QUEST {
            return Err(AppError::bad_request(
                "TOO_MANY_CHALLENGES",
                &format!("quest {} lists more than {MAX_CHALLENGES_PER_QUEST} challenges", quest.id),
            ));
        }
    }
    let count = state.store().replace_curriculum(req.quests)?;
    tracing::info!(count, "Curriculum replaced");
    Ok(ok(serde_json::json!({ "count": count })))
}
