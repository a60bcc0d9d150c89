use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// One weekly quest in a tier's curriculum.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurriculumQuest {
    pub id: String,
    pub tier: String,
    pub week_number: u32,
    pub theme: String,
    pub challenge_ids: Vec<String>,
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum CurriculumError {
    #[error("duplicate quest id: {0}")]
    DuplicateId(String),
    #[error("duplicate week {week} in tier {tier}")]
    DuplicateWeek { tier: String, week: u32 },
}

/// Curriculum table indexed by quest id and by `(tier, week)`.
#[derive(Debug, Clone, Default)]
pub struct Curriculum {
    by_week: BTreeMap<(String, u32), CurriculumQuest>,
    by_id: HashMap<String, (String, u32)>,
}

fn tier_key(tier: &str) -> String {
    tier.trim().to_ascii_lowercase()
}

impl Curriculum {
    pub fn new(quests: Vec<CurriculumQuest>) -> Result<Self, CurriculumError> {
        let mut curriculum = Self::default();
        for quest in quests {
            let slot = (tier_key(&quest.tier), quest.week_number);
            if curriculum.by_id.contains_key(&quest.id) {
                return Err(CurriculumError::DuplicateId(quest.id));
            }
            if curriculum.by_week.contains_key(&slot) {
                return Err(CurriculumError::DuplicateWeek {
                    tier: quest.tier,
                    week: quest.week_number,
                });
            }
            curriculum.by_id.insert(quest.id.clone(), slot.clone());
            curriculum.by_week.insert(slot, quest);
        }
        Ok(curriculum)
    }

    pub fn get(&self, quest_id: &str) -> Option<&CurriculumQuest> {
        self.by_id
            .get(quest_id)
            .and_then(|slot| self.by_week.get(slot))
    }

    pub fn week(&self, tier: &str, week_number: u32) -> Option<&CurriculumQuest> {
        self.by_week.get(&(tier_key(tier), week_number))
    }

    /// The quest for the following week in the same tier, if any.
    pub fn next_after(&self, quest: &CurriculumQuest) -> Option<&CurriculumQuest> {
        let next_week = quest.week_number.checked_add(1)?;
        self.week(&quest.tier, next_week)
    }

    pub fn len(&self) -> usize {
        self.by_week.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_week.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &CurriculumQuest> {
        self.by_week.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quest(id: &str, tier: &str, week: u32) -> CurriculumQuest {
        CurriculumQuest {
            id: id.to_string(),
            tier: tier.to_string(),
            week_number: week,
            theme: format!("Theme {week}"),
            challenge_ids: vec![format!("{id}-c1")],
        }
    }

    #[test]
    fn next_after_stays_within_tier() {
        let curriculum = Curriculum::new(vec![
            quest("a1", "Explorer", 1),
            quest("a2", "Explorer", 2),
            quest("b3", "Champion", 3),
        ])
        .unwrap();

        let first = curriculum.get("a1").unwrap();
        assert_eq!(curriculum.next_after(first).unwrap().id, "a2");
        let last = curriculum.get("a2").unwrap();
        assert!(curriculum.next_after(last).is_none());
    }

    #[test]
    fn tier_lookup_is_case_insensitive() {
        let curriculum = Curriculum::new(vec![quest("a1", "Explorer", 1)]).unwrap();
        assert_eq!(curriculum.week("explorer", 1).unwrap().id, "a1");
    }

    #[test]
    fn duplicates_are_rejected() {
        let err = Curriculum::new(vec![quest("a1", "x", 1), quest("a1", "x", 2)]).unwrap_err();
        assert_eq!(err, CurriculumError::DuplicateId("a1".to_string()));

        let err = Curriculum::new(vec![quest("a1", "x", 1), quest("a2", "X", 1)]).unwrap_err();
        assert!(matches!(err, CurriculumError::DuplicateWeek { week: 1, .. }));
    }
}
