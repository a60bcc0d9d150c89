use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::engine::progression::{FetchError, SubmissionSource};
use crate::engine::types::{MasteryTier, SubmissionRow};
use crate::store::keys;
use crate::store::{Store, StoreError};

/// Latest graded submission for one challenge. Resubmitting overwrites.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub student_id: String,
    pub challenge_id: String,
    pub mastery_level: MasteryTier,
    pub submitted_at: DateTime<Utc>,
}

impl Store {
    pub fn record_submission(
        &self,
        student_id: &str,
        challenge_id: &str,
        mastery_level: MasteryTier,
    ) -> Result<Submission, StoreError> {
        let key = keys::submission_key(student_id, challenge_id)?;
        let submission = Submission {
            student_id: student_id.to_string(),
            challenge_id: challenge_id.to_string(),
            mastery_level,
            submitted_at: Utc::now(),
        };
        self.submissions
            .insert(key.as_bytes(), Self::serialize(&submission)?)?;
        Ok(submission)
    }

    /// Point lookups for each challenge id; missing ones are skipped.
    pub fn get_submissions(
        &self,
        student_id: &str,
        challenge_ids: &[String],
    ) -> Result<Vec<SubmissionRow>, StoreError> {
        let mut rows = Vec::with_capacity(challenge_ids.len());
        for challenge_id in challenge_ids {
            let key = keys::submission_key(student_id, challenge_id)?;
            if let Some(raw) = self.submissions.get(key.as_bytes())? {
                let submission: Submission = Self::deserialize(&raw)?;
                rows.push(SubmissionRow {
                    challenge_id: submission.challenge_id,
                    mastery_level: submission.mastery_level,
                });
            }
        }
        Ok(rows)
    }
}

#[async_trait]
impl SubmissionSource for Store {
    async fn fetch_submissions(
        &self,
        student_id: &str,
        challenge_ids: &[String],
    ) -> Result<Vec<SubmissionRow>, FetchError> {
        Ok(self.get_submissions(student_id, challenge_ids)?)
    }
}
