use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Broad subject area used to bucket skills for aggregate scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    #[serde(alias = "Math")]
    Math,
    #[serde(alias = "Reading")]
    Reading,
    #[serde(alias = "Writing")]
    Writing,
    #[serde(alias = "STEAM", alias = "science")]
    Steam,
    #[serde(alias = "Executive Function")]
    ExecutiveFunction,
}

/// Subject label -> domain. The first entry for each domain is its canonical
/// subject; later entries are accepted aliases.
const SUBJECT_TABLE: &[(&str, Domain)] = &[
    ("math", Domain::Math),
    ("reading", Domain::Reading),
    ("writing", Domain::Writing),
    ("steam", Domain::Steam),
    ("executive_function", Domain::ExecutiveFunction),
    ("mathematics", Domain::Math),
    ("ela", Domain::Reading),
    ("literacy", Domain::Reading),
    ("science", Domain::Steam),
    ("stem", Domain::Steam),
    ("executive-function", Domain::ExecutiveFunction),
    ("life_skills", Domain::ExecutiveFunction),
];

impl Domain {
    pub const ALL: [Domain; 5] = [
        Domain::Math,
        Domain::Reading,
        Domain::Writing,
        Domain::Steam,
        Domain::ExecutiveFunction,
    ];

    pub fn from_subject(subject: &str) -> Option<Self> {
        let normalized = subject.trim().to_ascii_lowercase().replace(' ', "_");
        SUBJECT_TABLE
            .iter()
            .find(|(label, _)| *label == normalized)
            .map(|(_, domain)| *domain)
    }

    pub fn subject(&self) -> &'static str {
        SUBJECT_TABLE
            .iter()
            .find(|(_, domain)| domain == self)
            .map(|(label, _)| *label)
            .unwrap_or("unknown")
    }

    pub fn label(&self) -> &'static str {
        match self {
            Domain::Math => "Math",
            Domain::Reading => "Reading",
            Domain::Writing => "Writing",
            Domain::Steam => "STEAM",
            Domain::ExecutiveFunction => "Executive Function",
        }
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Skill identifier; upstream data uses both numeric and string ids.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompetencyId {
    Numeric(i64),
    Text(String),
}

impl fmt::Display for CompetencyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompetencyId::Numeric(id) => write!(f, "{id}"),
            CompetencyId::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MasteryRecord {
    pub competency_id: CompetencyId,
    #[serde(default)]
    pub competency_name: Option<String>,
    pub domain: Domain,
    pub mastery_percentage: f64,
    #[serde(default)]
    pub attempts: u32,
    #[serde(default)]
    pub last_assessed_at: Option<DateTime<Utc>>,
}

impl MasteryRecord {
    pub fn is_attempted(&self) -> bool {
        self.attempts > 0
    }

    pub fn display_name(&self) -> String {
        self.competency_name
            .clone()
            .unwrap_or_else(|| self.competency_id.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainSummary {
    pub domain: Domain,
    pub average_mastery: i32,
    pub weakest_record: MasteryRecord,
    pub record_count: usize,
    pub attempted_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Novice,
    Apprentice,
    Skilled,
    Master,
}

impl Difficulty {
    pub fn is_advanced(&self) -> bool {
        matches!(self, Difficulty::Skilled | Difficulty::Master)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestDescriptor {
    pub id: String,
    pub title: String,
    pub subject: String,
    pub level: i32,
    pub difficulty: Difficulty,
    pub base_xp: u32,
    #[serde(default)]
    pub prerequisite_quest_id: Option<String>,
    #[serde(default)]
    pub required_mastery_domain: Option<Domain>,
    #[serde(default)]
    pub required_mastery_percentage: Option<f64>,
    /// Student tier the quest belongs to; `None` means every tier.
    #[serde(default)]
    pub tier: Option<String>,
}

impl QuestDescriptor {
    pub fn domain(&self) -> Option<Domain> {
        Domain::from_subject(&self.subject)
    }

    pub fn matches_tier(&self, student_tier: &str) -> bool {
        match &self.tier {
            Some(tier) => tier.eq_ignore_ascii_case(student_tier),
            None => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecommendationKind {
    #[serde(rename_all = "camelCase")]
    Quest {
        quest_id: String,
        xp_reward: u32,
        domain: Domain,
    },
    #[serde(rename_all = "camelCase")]
    Practice {
        domain: Domain,
        competency_id: CompetencyId,
    },
    #[serde(rename_all = "camelCase")]
    Review {
        domain: Domain,
        competency_id: CompetencyId,
    },
    #[serde(rename_all = "camelCase")]
    ChallengeUp {
        quest_id: String,
        xp_reward: u32,
        domain: Domain,
    },
    Celebration { domain: Domain },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    #[serde(flatten)]
    pub kind: RecommendationKind,
    pub priority: u8,
    pub title: String,
    pub description: String,
    pub reason: String,
}

impl Recommendation {
    pub fn quest_id(&self) -> Option<&str> {
        match &self.kind {
            RecommendationKind::Quest { quest_id, .. }
            | RecommendationKind::ChallengeUp { quest_id, .. } => Some(quest_id),
            _ => None,
        }
    }

    pub fn domain(&self) -> Domain {
        match &self.kind {
            RecommendationKind::Quest { domain, .. }
            | RecommendationKind::Practice { domain, .. }
            | RecommendationKind::Review { domain, .. }
            | RecommendationKind::ChallengeUp { domain, .. }
            | RecommendationKind::Celebration { domain } => *domain,
        }
    }

    pub fn is_celebration(&self) -> bool {
        matches!(self.kind, RecommendationKind::Celebration { .. })
    }
}

/// Ordinal mastery tier reported on challenge submissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MasteryTier {
    Emerging,
    Developing,
    Proficient,
    Advanced,
    Mastered,
}

impl MasteryTier {
    pub fn ordinal(&self) -> u8 {
        match self {
            MasteryTier::Emerging => 1,
            MasteryTier::Developing => 2,
            MasteryTier::Proficient => 3,
            MasteryTier::Advanced => 4,
            MasteryTier::Mastered => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MasteryTier::Emerging => "emerging",
            MasteryTier::Developing => "developing",
            MasteryTier::Proficient => "proficient",
            MasteryTier::Advanced => "advanced",
            MasteryTier::Mastered => "mastered",
        }
    }
}

impl std::str::FromStr for MasteryTier {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "emerging" => Ok(Self::Emerging),
            "developing" => Ok(Self::Developing),
            "proficient" => Ok(Self::Proficient),
            "advanced" => Ok(Self::Advanced),
            "mastered" => Ok(Self::Mastered),
            other => Err(format!("unknown mastery tier '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionRow {
    pub challenge_id: String,
    pub mastery_level: MasteryTier,
}
