pub mod aggregator;
pub mod config;
pub mod curriculum;
pub mod progression;
pub mod ranker;
pub mod types;

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{Mutex, RwLock};

use crate::constants::STUDENT_LOCK_PRUNE_THRESHOLD;
use crate::engine::config::{EngineConfig, ProgressionCriteria};
use crate::engine::progression::QuestProgressionResult;
use crate::engine::types::{DomainSummary, Recommendation};
use crate::response::AppError;
use crate::store::operations::student_quests::StudentQuest;
use crate::store::Store;

/// Result of a progression check that also wrote quest statuses back.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvanceOutcome {
    pub progression: QuestProgressionResult,
    pub completed_quest: Option<StudentQuest>,
    pub unlocked_quest: Option<StudentQuest>,
}

/// Hosts the pure engine functions over the store, with a hot-reloadable config.
pub struct QuestEngine {
    config: Arc<RwLock<EngineConfig>>,
    store: Arc<Store>,
    student_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl QuestEngine {
    pub fn new(config: EngineConfig, store: Arc<Store>) -> Self {
        Self {
            config: Arc::new(RwLock::new(config)),
            store,
            student_locks: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Validates, persists, then swaps the live config. Returns the saved version.
    ///
    /// The write lock is held across the save so concurrent reloads persist
    /// and swap in the same order.
    pub async fn reload_config(&self, new_config: EngineConfig) -> Result<u32, AppError> {
        new_config
            .validate()
            .map_err(|msg| AppError::bad_request("INVALID_ENGINE_CONFIG", &msg))?;
        let mut cfg = self.config.write().await;
        let version = self.store.save_engine_config(&new_config)?;
        *cfg = new_config;
        tracing::info!(version, "Engine config reloaded");
        Ok(version)
    }

    pub async fn get_config(&self) -> EngineConfig {
        self.config.read().await.clone()
    }

    async fn acquire_student_lock(&self, student_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.student_locks.lock().await;

        // strong_count == 1: only the map holds it, nobody is waiting
        if locks.len() > STUDENT_LOCK_PRUNE_THRESHOLD {
            locks.retain(|_, v| Arc::strong_count(v) > 1);
        }

        locks
            .entry(student_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    pub fn domain_summaries(&self, student_id: &str) -> Result<Vec<DomainSummary>, AppError> {
        let records = self.store.list_mastery_records(student_id)?;
        Ok(aggregator::summarize_domains(&records).into_values().collect())
    }

    pub async fn recommendations_for(
        &self,
        student_id: &str,
        student_tier: &str,
    ) -> Result<Vec<Recommendation>, AppError> {
        let records = self.store.list_mastery_records(student_id)?;
        let quests = self.store.list_quests()?;
        let statuses = self.store.quest_status_sets(student_id)?;
        let ranker_config = self.config.read().await.ranker.clone();

        let recommendations = ranker::generate_recommendations(
            student_tier,
            &records,
            &quests,
            &statuses.completed,
            &statuses.in_progress,
            &ranker_config,
        );
        tracing::debug!(
            student_id,
            student_tier,
            count = recommendations.len(),
            "Recommendations ready"
        );
        Ok(recommendations)
    }

    /// Criteria used when the caller supplies none.
    pub async fn default_criteria(&self) -> ProgressionCriteria {
        self.config.read().await.progression.clone()
    }

    /// Lenient check: engine-level failures come back as a non-eligible result.
    pub async fn check_progression(
        &self,
        student_id: &str,
        quest_id: &str,
        criteria: &ProgressionCriteria,
    ) -> Result<QuestProgressionResult, AppError> {
        let curriculum = self.store.load_curriculum()?;
        Ok(progression::check_quest_progression(
            self.store.as_ref(),
            &curriculum,
            student_id,
            quest_id,
            criteria,
        )
        .await)
    }

    /// Runs the strict check and, when eligible, completes the current quest
    /// and unlocks the next one.
    pub async fn auto_assign_next_quest(
        &self,
        student_id: &str,
        quest_id: &str,
        criteria: &ProgressionCriteria,
    ) -> Result<AdvanceOutcome, AppError> {
        let lock = self.acquire_student_lock(student_id).await;
        let _guard = lock.lock().await;

        let curriculum = self.store.load_curriculum()?;
        let result = progression::evaluate_quest_progression(
            self.store.as_ref(),
            &curriculum,
            student_id,
            quest_id,
            criteria,
        )
        .await?;

        if !result.eligible {
            return Ok(AdvanceOutcome {
                progression: result,
                completed_quest: None,
                unlocked_quest: None,
            });
        }

        let (completed, unlocked) = self.store.complete_and_unlock(
            student_id,
            quest_id,
            result.next_quest_id.as_deref(),
        )?;

        tracing::info!(
            student_id,
            quest_id,
            next_quest_id = ?result.next_quest_id,
            unlocked = unlocked.is_some(),
            "Quest advanced"
        );

        Ok(AdvanceOutcome {
            progression: result,
            completed_quest: Some(completed),
            unlocked_quest: unlocked,
        })
    }
}
