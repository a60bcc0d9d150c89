use serde_json::{json, Value};

use quest_engine::engine::curriculum::CurriculumQuest;
use quest_engine::engine::types::{
    CompetencyId, Difficulty, Domain, MasteryRecord, MasteryTier, QuestDescriptor,
};
use quest_engine::store::Store;

pub fn mastery(id: i64, domain: Domain, pct: f64) -> MasteryRecord {
    MasteryRecord {
        competency_id: CompetencyId::Numeric(id),
        competency_name: Some(format!("Skill {id}")),
        domain,
        mastery_percentage: pct,
        attempts: 1,
        last_assessed_at: None,
    }
}

pub fn quest(id: &str, subject: &str, level: i32, difficulty: Difficulty) -> QuestDescriptor {
    QuestDescriptor {
        id: id.to_string(),
        title: format!("Quest {id}"),
        subject: subject.to_string(),
        level,
        difficulty,
        base_xp: 100,
        prerequisite_quest_id: None,
        required_mastery_domain: None,
        required_mastery_percentage: None,
        tier: None,
    }
}

pub fn quest_json(id: &str, subject: &str, level: i32) -> Value {
    json!({
        "id": id,
        "title": format!("Quest {id}"),
        "subject": subject,
        "level": level,
        "difficulty": "Novice",
        "baseXp": 120,
    })
}

/// Two-week Explorer curriculum with 16 challenges per week.
pub fn seed_curriculum(store: &Store) -> Vec<CurriculumQuest> {
    let weeks: Vec<CurriculumQuest> = (1..=2)
        .map(|n| CurriculumQuest {
            id: format!("explorer-w{n}"),
            tier: "Explorer".to_string(),
            week_number: n,
            theme: format!("Explorer Week {n}"),
            challenge_ids: (0..16).map(|i| format!("w{n}-c{i}")).collect(),
        })
        .collect();
    store
        .replace_curriculum(weeks.clone())
        .expect("seed curriculum");
    weeks
}

pub fn seed_submissions(store: &Store, student_id: &str, week: u32, count: usize, tier: MasteryTier) {
    for i in 0..count {
        store
            .record_submission(student_id, &format!("w{week}-c{i}"), tier)
            .expect("record submission");
    }
}
