//! Quest pass/fail decision against a fixed rubric, plus the next-quest lookup.

use std::collections::HashSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::engine::config::ProgressionCriteria;
use crate::engine::curriculum::{Curriculum, CurriculumQuest};
use crate::engine::types::SubmissionRow;

pub type FetchError = Box<dyn std::error::Error + Send + Sync>;

/// Supplies a student's challenge submissions. A missing row means the
/// challenge has not been completed.
#[async_trait]
pub trait SubmissionSource: Send + Sync {
    async fn fetch_submissions(
        &self,
        student_id: &str,
        challenge_ids: &[String],
    ) -> Result<Vec<SubmissionRow>, FetchError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProgressionError {
    #[error("quest not found in curriculum: {0}")]
    QuestNotFound(String),
    #[error("submission fetch failed: {0}")]
    Fetch(#[source] FetchError),
}

impl ProgressionError {
    pub fn kind(&self) -> ProgressionFailure {
        match self {
            ProgressionError::QuestNotFound(_) => ProgressionFailure::QuestNotFound,
            ProgressionError::Fetch(_) => ProgressionFailure::FetchFailed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionFailure {
    QuestNotFound,
    FetchFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criterion {
    MinimumChallenges,
    CompletionRate,
    MasteryLevel,
    AllChallenges,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CriterionOutcome {
    pub criterion: Criterion,
    pub passed: bool,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionStats {
    pub completed_challenges: usize,
    pub total_challenges: usize,
    pub completion_rate: f64,
    pub average_mastery_score: f64,
}

impl ProgressionStats {
    /// Rows outside the quest's challenge set and repeated challenge ids are ignored.
    pub fn from_rows(quest: &CurriculumQuest, rows: &[SubmissionRow]) -> Self {
        let wanted: HashSet<&str> = quest.challenge_ids.iter().map(String::as_str).collect();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut score_sum = 0u32;
        for row in rows {
            if wanted.contains(row.challenge_id.as_str()) && seen.insert(row.challenge_id.as_str()) {
                score_sum += u32::from(row.mastery_level.ordinal());
            }
        }

        let completed = seen.len();
        let total = wanted.len();
        let completion_rate = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        let average_mastery_score = if completed == 0 {
            0.0
        } else {
            score_sum as f64 / completed as f64
        };

        Self {
            completed_challenges: completed,
            total_challenges: total,
            completion_rate,
            average_mastery_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestProgressionResult {
    pub eligible: bool,
    pub next_quest_id: Option<String>,
    pub next_quest_theme: Option<String>,
    pub reason: String,
    pub congrats_message: Option<String>,
    pub completed_challenges: usize,
    pub total_challenges: usize,
    pub completion_rate: f64,
    pub average_mastery_score: f64,
    pub criteria: Vec<CriterionOutcome>,
    pub error: Option<ProgressionFailure>,
}

pub const ERROR_REASON: &str = "Error checking progression";

impl QuestProgressionResult {
    fn failed(kind: ProgressionFailure) -> Self {
        Self {
            eligible: false,
            next_quest_id: None,
            next_quest_theme: None,
            reason: ERROR_REASON.to_string(),
            congrats_message: None,
            completed_challenges: 0,
            total_challenges: 0,
            completion_rate: 0.0,
            average_mastery_score: 0.0,
            criteria: Vec::new(),
            error: Some(kind),
        }
    }

    /// True when the student finished the last quest of their tier.
    pub fn is_tier_complete(&self) -> bool {
        self.eligible && self.next_quest_id.is_none()
    }
}

/// Every criterion in fixed order. `AllChallenges` only appears when required.
pub fn evaluate_criteria(
    stats: &ProgressionStats,
    criteria: &ProgressionCriteria,
) -> Vec<CriterionOutcome> {
    let min_tier = criteria.minimum_mastery_level;
    let mut outcomes = vec![
        CriterionOutcome {
            criterion: Criterion::MinimumChallenges,
            passed: stats.completed_challenges >= criteria.minimum_challenges_completed as usize,
            message: format!(
                "Complete at least {} challenges (currently {})",
                criteria.minimum_challenges_completed, stats.completed_challenges
            ),
        },
        CriterionOutcome {
            criterion: Criterion::CompletionRate,
            passed: stats.completion_rate >= criteria.minimum_completion_rate,
            message: format!(
                "Reach {:.0}% completion (currently {:.0}%)",
                criteria.minimum_completion_rate, stats.completion_rate
            ),
        },
        CriterionOutcome {
            criterion: Criterion::MasteryLevel,
            passed: stats.average_mastery_score >= f64::from(min_tier.ordinal()),
            message: format!(
                "Reach an average mastery of {} (currently {:.1} of {})",
                min_tier.label(),
                stats.average_mastery_score,
                min_tier.ordinal()
            ),
        },
    ];

    if criteria.require_all_challenges {
        outcomes.push(CriterionOutcome {
            criterion: Criterion::AllChallenges,
            passed: stats.completed_challenges >= stats.total_challenges,
            message: format!(
                "Complete all {} challenges (currently {})",
                stats.total_challenges, stats.completed_challenges
            ),
        });
    }

    outcomes
}

/// Strict progression check: configuration and fetch failures come back as errors.
pub async fn evaluate_quest_progression(
    source: &dyn SubmissionSource,
    curriculum: &Curriculum,
    student_id: &str,
    current_quest_id: &str,
    criteria: &ProgressionCriteria,
) -> Result<QuestProgressionResult, ProgressionError> {
    let quest = curriculum
        .get(current_quest_id)
        .ok_or_else(|| ProgressionError::QuestNotFound(current_quest_id.to_string()))?;

    let rows = source
        .fetch_submissions(student_id, &quest.challenge_ids)
        .await
        .map_err(ProgressionError::Fetch)?;

    let stats = ProgressionStats::from_rows(quest, &rows);
    let outcomes = evaluate_criteria(&stats, criteria);

    let mut result = QuestProgressionResult {
        eligible: false,
        next_quest_id: None,
        next_quest_theme: None,
        reason: String::new(),
        congrats_message: None,
        completed_challenges: stats.completed_challenges,
        total_challenges: stats.total_challenges,
        completion_rate: stats.completion_rate,
        average_mastery_score: stats.average_mastery_score,
        criteria: Vec::new(),
        error: None,
    };

    if let Some(failing) = outcomes.iter().find(|o| !o.passed) {
        result.reason = failing.message.clone();
        result.criteria = outcomes;
        tracing::debug!(
            student_id,
            quest_id = %quest.id,
            completed = stats.completed_challenges,
            total = stats.total_challenges,
            "Quest progression not yet eligible"
        );
        return Ok(result);
    }
    result.criteria = outcomes;
    result.eligible = true;

    match curriculum.next_after(quest) {
        Some(next) => {
            result.reason = "All progression criteria met".to_string();
            result.congrats_message = Some(format!(
                "Congratulations on completing {}! {} is now unlocked.",
                quest.theme, next.theme
            ));
            result.next_quest_id = Some(next.id.clone());
            result.next_quest_theme = Some(next.theme.clone());
        }
        None => {
            result.reason = format!("All quests in the {} tier are complete", quest.tier);
            result.congrats_message = Some(format!(
                "Incredible work! You've mastered every quest in the {} tier.",
                quest.tier
            ));
        }
    }

    tracing::info!(
        student_id,
        quest_id = %quest.id,
        next_quest_id = ?result.next_quest_id,
        "Quest progression eligible"
    );
    Ok(result)
}

/// Lenient progression check: any failure becomes a non-eligible result
/// carrying the failure kind.
pub async fn check_quest_progression(
    source: &dyn SubmissionSource,
    curriculum: &Curriculum,
    student_id: &str,
    current_quest_id: &str,
    criteria: &ProgressionCriteria,
) -> QuestProgressionResult {
    match evaluate_quest_progression(source, curriculum, student_id, current_quest_id, criteria)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            match &e {
                ProgressionError::QuestNotFound(_) => {
                    tracing::error!(student_id, quest_id = current_quest_id, error = %e, "Progression check failed");
                }
                ProgressionError::Fetch(_) => {
                    tracing::warn!(student_id, quest_id = current_quest_id, error = %e, "Progression check failed");
                }
            }
            QuestProgressionResult::failed(e.kind())
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::engine::types::MasteryTier;

    struct MapSource(HashMap<String, MasteryTier>);

    #[async_trait]
    impl SubmissionSource for MapSource {
        async fn fetch_submissions(
            &self,
            _student_id: &str,
            challenge_ids: &[String],
        ) -> Result<Vec<SubmissionRow>, FetchError> {
            Ok(challenge_ids
                .iter()
                .filter_map(|id| {
                    self.0.get(id).map(|tier| SubmissionRow {
                        challenge_id: id.clone(),
                        mastery_level: *tier,
                    })
                })
                .collect())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl SubmissionSource for FailingSource {
        async fn fetch_submissions(
            &self,
            _student_id: &str,
            _challenge_ids: &[String],
        ) -> Result<Vec<SubmissionRow>, FetchError> {
            Err("connection reset".into())
        }
    }

    fn week(id: &str, n: u32, challenges: usize) -> CurriculumQuest {
        CurriculumQuest {
            id: id.to_string(),
            tier: "Explorer".to_string(),
            week_number: n,
            theme: format!("Week {n} Theme"),
            challenge_ids: (0..challenges).map(|i| format!("{id}-c{i}")).collect(),
        }
    }

    fn curriculum() -> Curriculum {
        Curriculum::new(vec![week("w1", 1, 16), week("w2", 2, 16)]).unwrap()
    }

    fn completed(quest_id: &str, count: usize, tier: MasteryTier) -> MapSource {
        MapSource(
            (0..count)
                .map(|i| (format!("{quest_id}-c{i}"), tier))
                .collect(),
        )
    }

    #[tokio::test]
    async fn too_few_challenges_reports_count() {
        let source = completed("w1", 8, MasteryTier::Mastered);
        let result = check_quest_progression(
            &source,
            &curriculum(),
            "s1",
            "w1",
            &ProgressionCriteria::default(),
        )
        .await;

        assert!(!result.eligible);
        assert!(result
            .reason
            .contains("Complete at least 12 challenges (currently 8)"));
        assert_eq!(result.completion_rate, 50.0);
        assert_eq!(result.criteria.len(), 3);
        assert!(result.error.is_none());
    }

    #[tokio::test]
    async fn first_failing_criterion_wins_but_all_are_reported() {
        let source = completed("w1", 13, MasteryTier::Emerging);
        let result = check_quest_progression(
            &source,
            &curriculum(),
            "s1",
            "w1",
            &ProgressionCriteria::default(),
        )
        .await;

        assert!(!result.eligible);
        // 13/16 = 81.25% passes the rate, emerging (1.0) fails developing (2)
        assert!(result.reason.starts_with("Reach an average mastery of developing"));
        let failed: Vec<Criterion> = result
            .criteria
            .iter()
            .filter(|o| !o.passed)
            .map(|o| o.criterion)
            .collect();
        assert_eq!(failed, vec![Criterion::MasteryLevel]);
    }

    #[tokio::test]
    async fn passing_unlocks_next_week() {
        let source = completed("w1", 14, MasteryTier::Proficient);
        let result = check_quest_progression(
            &source,
            &curriculum(),
            "s1",
            "w1",
            &ProgressionCriteria::default(),
        )
        .await;

        assert!(result.eligible);
        assert_eq!(result.next_quest_id.as_deref(), Some("w2"));
        assert_eq!(result.next_quest_theme.as_deref(), Some("Week 2 Theme"));
        let congrats = result.congrats_message.unwrap();
        assert!(congrats.contains("Week 1 Theme") && congrats.contains("Week 2 Theme"));
    }

    #[tokio::test]
    async fn last_quest_is_terminal_tier_mastered() {
        let source = completed("w2", 16, MasteryTier::Advanced);
        let result = check_quest_progression(
            &source,
            &curriculum(),
            "s1",
            "w2",
            &ProgressionCriteria::default(),
        )
        .await;

        assert!(result.eligible);
        assert!(result.next_quest_id.is_none());
        assert!(result.is_tier_complete());
        assert!(result.congrats_message.unwrap().contains("Explorer"));
    }

    #[tokio::test]
    async fn require_all_challenges_is_checked_last() {
        let source = completed("w1", 15, MasteryTier::Mastered);
        let criteria = ProgressionCriteria {
            require_all_challenges: true,
            ..ProgressionCriteria::default()
        };
        let result =
            check_quest_progression(&source, &curriculum(), "s1", "w1", &criteria).await;

        assert!(!result.eligible);
        assert_eq!(result.reason, "Complete all 16 challenges (currently 15)");
        assert_eq!(result.criteria.len(), 4);
    }

    #[tokio::test]
    async fn unknown_quest_is_a_strict_error_and_lenient_failure() {
        let source = completed("w1", 16, MasteryTier::Mastered);
        let err = evaluate_quest_progression(
            &source,
            &curriculum(),
            "s1",
            "nope",
            &ProgressionCriteria::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ProgressionError::QuestNotFound(_)));

        let result = check_quest_progression(
            &source,
            &curriculum(),
            "s1",
            "nope",
            &ProgressionCriteria::default(),
        )
        .await;
        assert!(!result.eligible);
        assert_eq!(result.reason, ERROR_REASON);
        assert_eq!(result.error, Some(ProgressionFailure::QuestNotFound));
    }

    #[tokio::test]
    async fn fetch_failure_is_reported_as_not_eligible() {
        let result = check_quest_progression(
            &FailingSource,
            &curriculum(),
            "s1",
            "w1",
            &ProgressionCriteria::default(),
        )
        .await;
        assert!(!result.eligible);
        assert_eq!(result.error, Some(ProgressionFailure::FetchFailed));
    }

    #[test]
    fn stats_ignore_foreign_and_repeated_rows() {
        let quest = week("w1", 1, 4);
        let rows = vec![
            SubmissionRow {
                challenge_id: "w1-c0".to_string(),
                mastery_level: MasteryTier::Mastered,
            },
            SubmissionRow {
                challenge_id: "w1-c0".to_string(),
                mastery_level: MasteryTier::Emerging,
            },
            SubmissionRow {
                challenge_id: "other".to_string(),
                mastery_level: MasteryTier::Emerging,
            },
            SubmissionRow {
                challenge_id: "w1-c1".to_string(),
                mastery_level: MasteryTier::Developing,
            },
        ];
        let stats = ProgressionStats::from_rows(&quest, &rows);
        assert_eq!(stats.completed_challenges, 2);
        assert_eq!(stats.completion_rate, 50.0);
        assert_eq!(stats.average_mastery_score, 3.5);
    }

    #[test]
    fn empty_quest_has_zero_rate() {
        let quest = week("w0", 0, 0);
        let stats = ProgressionStats::from_rows(&quest, &[]);
        assert_eq!(stats.completion_rate, 0.0);
        assert_eq!(stats.average_mastery_score, 0.0);
    }
}
