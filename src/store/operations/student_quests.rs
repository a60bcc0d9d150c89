use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sled::transaction::{ConflictableTransactionError, TransactionError};

use crate::store::keys;
use crate::store::{Store, StoreError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StudentQuestStatus {
    Unlocked,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuest {
    pub student_id: String,
    pub quest_id: String,
    pub status: StudentQuestStatus,
    pub updated_at: DateTime<Utc>,
}

impl StudentQuest {
    fn new(student_id: &str, quest_id: &str, status: StudentQuestStatus) -> Self {
        Self {
            student_id: student_id.to_string(),
            quest_id: quest_id.to_string(),
            status,
            updated_at: Utc::now(),
        }
    }
}

fn check_transition(key: &str, raw: &[u8], status: StudentQuestStatus) -> Result<(), StoreError> {
    let existing: StudentQuest = Store::deserialize(raw)?;
    if existing.status == StudentQuestStatus::Completed && status != StudentQuestStatus::Completed {
        return Err(StoreError::Conflict {
            entity: "student_quest".to_string(),
            key: key.to_string(),
        });
    }
    Ok(())
}

fn map_tx_error(err: TransactionError<StoreError>) -> StoreError {
    match err {
        TransactionError::Abort(e) => e,
        TransactionError::Storage(e) => StoreError::Sled(e),
    }
}

/// Quest ids a student has finished and ids they are currently working on.
#[derive(Debug, Clone, Default)]
pub struct QuestStatusSets {
    pub completed: HashSet<String>,
    pub in_progress: HashSet<String>,
}

impl Store {
    pub fn get_student_quest(
        &self,
        student_id: &str,
        quest_id: &str,
    ) -> Result<Option<StudentQuest>, StoreError> {
        let key = keys::student_quest_key(student_id, quest_id)?;
        match self.student_quests.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn list_student_quests(&self, student_id: &str) -> Result<Vec<StudentQuest>, StoreError> {
        let prefix = keys::student_prefix(student_id)?;
        Self::scan_prefix(&self.student_quests, &prefix)
    }

    /// Completed is terminal: a completed quest never moves back. The read and
    /// the write happen in one transaction.
    pub fn set_student_quest_status(
        &self,
        student_id: &str,
        quest_id: &str,
        status: StudentQuestStatus,
    ) -> Result<StudentQuest, StoreError> {
        let key = keys::student_quest_key(student_id, quest_id)?;
        let entry = StudentQuest::new(student_id, quest_id, status);
        let entry_bytes = Self::serialize(&entry)?;

        self.student_quests
            .transaction(|tx| {
                if let Some(raw) = tx.get(key.as_bytes())? {
                    check_transition(&key, &raw, status).map_err(ConflictableTransactionError::Abort)?;
                }
                tx.insert(key.as_bytes(), entry_bytes.as_slice())?;
                Ok(())
            })
            .map_err(map_tx_error)?;
        Ok(entry)
    }

    /// Marks `quest_id` completed and, when `next_quest_id` has no status yet,
    /// unlocks it. Both writes commit together or not at all.
    pub fn complete_and_unlock(
        &self,
        student_id: &str,
        quest_id: &str,
        next_quest_id: Option<&str>,
    ) -> Result<(StudentQuest, Option<StudentQuest>), StoreError> {
        let key = keys::student_quest_key(student_id, quest_id)?;
        let completed = StudentQuest::new(student_id, quest_id, StudentQuestStatus::Completed);
        let completed_bytes = Self::serialize(&completed)?;

        let next = match next_quest_id {
            Some(next_id) => {
                let next_key = keys::student_quest_key(student_id, next_id)?;
                let unlocked = StudentQuest::new(student_id, next_id, StudentQuestStatus::Unlocked);
                let unlocked_bytes = Self::serialize(&unlocked)?;
                Some((next_key, unlocked, unlocked_bytes))
            }
            None => None,
        };

        let wrote_next = self
            .student_quests
            .transaction(|tx| {
                tx.insert(key.as_bytes(), completed_bytes.as_slice())?;
                let Some((next_key, _, unlocked_bytes)) = &next else {
                    return Ok(false);
                };
                // already unlocked, started or done: leave it
                if tx.get(next_key.as_bytes())?.is_some() {
                    return Ok(false);
                }
                tx.insert(next_key.as_bytes(), unlocked_bytes.as_slice())?;
                Ok(true)
            })
            .map_err(map_tx_error)?;

        let unlocked = if wrote_next {
            next.map(|(_, entry, _)| entry)
        } else {
            None
        };
        Ok((completed, unlocked))
    }

    pub fn quest_status_sets(&self, student_id: &str) -> Result<QuestStatusSets, StoreError> {
        let mut sets = QuestStatusSets::default();
        for entry in self.list_student_quests(student_id)? {
            match entry.status {
                StudentQuestStatus::Completed => {
                    sets.completed.insert(entry.quest_id);
                }
                StudentQuestStatus::InProgress => {
                    sets.in_progress.insert(entry.quest_id);
                }
                StudentQuestStatus::Unlocked => {}
            }
        }
        Ok(sets)
    }
}
