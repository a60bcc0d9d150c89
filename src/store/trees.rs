pub const MASTERY_RECORDS: &str = "mastery_records";
pub const QUEST_CATALOG: &str = "quest_catalog";
pub const STUDENT_QUESTS: &str = "student_quests";
pub const SUBMISSIONS: &str = "submissions";
pub const CURRICULUM: &str = "curriculum";
pub const CONFIG_VERSIONS: &str = "config_versions";
