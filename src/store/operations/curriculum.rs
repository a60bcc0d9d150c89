use crate::engine::curriculum::{Curriculum, CurriculumQuest};
use crate::store::keys;
use crate::store::{Store, StoreError};

impl Store {
    pub fn list_curriculum(&self) -> Result<Vec<CurriculumQuest>, StoreError> {
        let mut quests = Vec::new();
        for item in self.curriculum.iter() {
            let (_, value) = item?;
            quests.push(Self::deserialize(&value)?);
        }
        Ok(quests)
    }

    pub fn load_curriculum(&self) -> Result<Curriculum, StoreError> {
        Curriculum::new(self.list_curriculum()?)
            .map_err(|e| StoreError::Validation(e.to_string()))
    }

    /// Validates the full table before swapping it in.
    pub fn replace_curriculum(&self, quests: Vec<CurriculumQuest>) -> Result<usize, StoreError> {
        for quest in &quests {
            keys::validate_segment("questId", &quest.id)?;
            for challenge_id in &quest.challenge_ids {
                keys::validate_segment("challengeId", challenge_id)?;
            }
        }
        let curriculum =
            Curriculum::new(quests).map_err(|e| StoreError::Validation(e.to_string()))?;

        let mut batch = sled::Batch::default();
        for item in self.curriculum.iter() {
            let (key, _) = item?;
            batch.remove(key);
        }
        for quest in curriculum.iter() {
            let key = keys::curriculum_key(&quest.tier, quest.week_number)?;
            batch.insert(key.as_bytes(), Self::serialize(quest)?);
        }
        self.curriculum.apply_batch(batch)?;
        Ok(curriculum.len())
    }
}
