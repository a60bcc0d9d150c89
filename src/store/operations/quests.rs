use crate::constants::QUEST_LEVEL_RANGE;
use crate::engine::types::QuestDescriptor;
use crate::store::keys;
use crate::store::{Store, StoreError};
use crate::validation::validate_percentage;

fn check_quest(quest: &QuestDescriptor) -> Result<(), StoreError> {
    if quest.title.trim().is_empty() {
        return Err(StoreError::Validation(format!("quest {} has an empty title", quest.id)));
    }
    if !QUEST_LEVEL_RANGE.contains(&quest.level) {
        return Err(StoreError::Validation(format!(
            "quest {} level {} is outside {}..={}",
            quest.id,
            quest.level,
            QUEST_LEVEL_RANGE.start(),
            QUEST_LEVEL_RANGE.end()
        )));
    }
    if let Some(pct) = quest.required_mastery_percentage {
        validate_percentage(pct)
            .map_err(|msg| StoreError::Validation(format!("quest {}: {msg}", quest.id)))?;
    }
    if quest.domain().is_none() {
        tracing::warn!(quest_id = %quest.id, subject = %quest.subject, "Quest subject maps to no domain");
    }
    Ok(())
}

impl Store {
    pub fn list_quests(&self) -> Result<Vec<QuestDescriptor>, StoreError> {
        let mut quests = Vec::new();
        for item in self.quest_catalog.iter() {
            let (_, value) = item?;
            quests.push(Self::deserialize(&value)?);
        }
        Ok(quests)
    }

    pub fn get_quest(&self, quest_id: &str) -> Result<Option<QuestDescriptor>, StoreError> {
        let key = keys::quest_key(quest_id)?;
        match self.quest_catalog.get(key.as_bytes())? {
            Some(raw) => Ok(Some(Self::deserialize(&raw)?)),
            None => Ok(None),
        }
    }

    pub fn upsert_quest(&self, quest: &QuestDescriptor) -> Result<(), StoreError> {
        check_quest(quest)?;
        let key = keys::quest_key(&quest.id)?;
        self.quest_catalog
            .insert(key.as_bytes(), Self::serialize(quest)?)?;
        Ok(())
    }

    /// Replaces the whole catalog in one batch.
    pub fn replace_quest_catalog(&self, quests: &[QuestDescriptor]) -> Result<usize, StoreError> {
        let mut batch = sled::Batch::default();
        for item in self.quest_catalog.iter() {
            let (key, _) = item?;
            batch.remove(key);
        }
        let mut seen = std::collections::HashSet::new();
        for quest in quests {
            check_quest(quest)?;
            if !seen.insert(quest.id.as_str()) {
                return Err(StoreError::Conflict {
                    entity: "quest".to_string(),
                    key: quest.id.clone(),
                });
            }
            let key = keys::quest_key(&quest.id)?;
            batch.insert(key.as_bytes(), Self::serialize(quest)?);
        }
        self.quest_catalog.apply_batch(batch)?;
        Ok(quests.len())
    }
}
