use serde::{Deserialize, Serialize};

use crate::engine::types::MasteryTier;

/// Domain-average cut points (percent).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryThresholds {
    /// Averages at or below this are struggling.
    pub struggling: i32,
    /// Averages strictly below this are still developing.
    pub developing: i32,
    pub proficient: i32,
    pub mastery: i32,
}

impl Default for MasteryThresholds {
    fn default() -> Self {
        Self {
            struggling: 25,
            developing: 50,
            proficient: 75,
            mastery: 90,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityWeights {
    pub review: i32,
    pub weak_domain_base: i32,
    pub weak_domain_step: i32,
    pub developing_domain: i32,
    pub default_domain: i32,
    pub proficient_domain: i32,
    pub practice: i32,
    pub challenge_up: i32,
    pub celebration: i32,
    /// Upper bound for quest priorities after level adjustment.
    pub quest_cap: i32,
    pub level_pivot: i32,
    pub level_weight: i32,
}

impl Default for PriorityWeights {
    fn default() -> Self {
        Self {
            review: 95,
            weak_domain_base: 85,
            weak_domain_step: 10,
            developing_domain: 60,
            default_domain: 50,
            proficient_domain: 40,
            practice: 65,
            challenge_up: 70,
            celebration: 30,
            quest_cap: 90,
            level_pivot: 5,
            level_weight: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankerConfig {
    #[serde(default)]
    pub thresholds: MasteryThresholds,
    #[serde(default)]
    pub priorities: PriorityWeights,
    pub weak_domain_count: usize,
    pub max_recommendations: usize,
}

impl Default for RankerConfig {
    fn default() -> Self {
        Self {
            thresholds: MasteryThresholds::default(),
            priorities: PriorityWeights::default(),
            weak_domain_count: 3,
            max_recommendations: 10,
        }
    }
}

/// Pass rubric for a curriculum quest. Substituted wholesale per call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressionCriteria {
    pub minimum_mastery_level: MasteryTier,
    pub minimum_challenges_completed: u32,
    pub minimum_completion_rate: f64,
    pub require_all_challenges: bool,
}

impl Default for ProgressionCriteria {
    fn default() -> Self {
        Self {
            minimum_mastery_level: MasteryTier::Developing,
            minimum_challenges_completed: 12,
            minimum_completion_rate: 75.0,
            require_all_challenges: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    #[serde(default)]
    pub ranker: RankerConfig,
    #[serde(default)]
    pub progression: ProgressionCriteria,
}

impl EngineConfig {
    pub fn from_env(env_config: &crate::config::EngineEnvConfig) -> Self {
        let mut config = Self::default();
        config.ranker.max_recommendations = env_config.max_recommendations;
        config.progression.minimum_challenges_completed = env_config.min_challenges_completed;
        config.progression.minimum_completion_rate = env_config.min_completion_rate;
        config.progression.require_all_challenges = env_config.require_all_challenges;
        match env_config.min_mastery_level.parse::<MasteryTier>() {
            Ok(tier) => config.progression.minimum_mastery_level = tier,
            Err(e) => {
                tracing::warn!(error = %e, "Invalid PROGRESSION_MIN_MASTERY, using default");
            }
        }
        config
    }

    pub fn validate(&self) -> Result<(), String> {
        let t = &self.ranker.thresholds;
        if !(0..=100).contains(&t.struggling)
            || !(0..=100).contains(&t.developing)
            || !(0..=100).contains(&t.proficient)
            || !(0..=100).contains(&t.mastery)
        {
            return Err("ranker.thresholds must be in [0,100]".to_string());
        }
        if !(t.struggling <= t.developing && t.developing <= t.proficient && t.proficient <= t.mastery)
        {
            return Err(
                "ranker.thresholds must satisfy struggling <= developing <= proficient <= mastery"
                    .to_string(),
            );
        }

        let p = &self.ranker.priorities;
        for (name, value) in [
            ("review", p.review),
            ("weakDomainBase", p.weak_domain_base),
            ("developingDomain", p.developing_domain),
            ("defaultDomain", p.default_domain),
            ("proficientDomain", p.proficient_domain),
            ("practice", p.practice),
            ("challengeUp", p.challenge_up),
            ("celebration", p.celebration),
            ("questCap", p.quest_cap),
        ] {
            if !(1..=100).contains(&value) {
                return Err(format!("ranker.priorities.{name} must be in [1,100]"));
            }
        }
        for (name, value, max) in [
            ("weakDomainStep", p.weak_domain_step, 100),
            ("levelPivot", p.level_pivot, 100),
            ("levelWeight", p.level_weight, 20),
        ] {
            if !(0..=max).contains(&value) {
                return Err(format!("ranker.priorities.{name} must be in [0,{max}]"));
            }
        }
        if self.ranker.weak_domain_count > crate::engine::types::Domain::ALL.len() {
            return Err("ranker.weak_domain_count exceeds the number of domains".to_string());
        }

        if self.ranker.max_recommendations == 0 {
            return Err("ranker.max_recommendations must be > 0".to_string());
        }

        let rate = self.progression.minimum_completion_rate;
        if !rate.is_finite() || !(0.0..=100.0).contains(&rate) {
            return Err("progression.minimum_completion_rate must be in [0,100]".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(EngineConfig::default().validate().is_ok());
    }

    #[test]
    fn unordered_thresholds_are_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.ranker.thresholds.developing = 80;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn zero_cap_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.ranker.max_recommendations = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn oversized_level_weight_and_step_are_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.ranker.priorities.level_weight = i32::MAX;
        assert!(cfg.validate().is_err());

        let mut cfg = EngineConfig::default();
        cfg.ranker.priorities.weak_domain_step = 1_000;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn completion_rate_out_of_range_is_rejected() {
        let mut cfg = EngineConfig::default();
        cfg.progression.minimum_completion_rate = 120.0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let cfg: EngineConfig =
            serde_json::from_str(r#"{"progression":{"minimumMasteryLevel":"advanced","minimumChallengesCompleted":4,"minimumCompletionRate":50.0,"requireAllChallenges":true}}"#)
                .unwrap();
        assert_eq!(cfg.ranker, RankerConfig::default());
        assert_eq!(cfg.progression.minimum_mastery_level, MasteryTier::Advanced);
        assert!(cfg.progression.require_all_challenges);
    }
}
