pub mod curriculum;
pub mod engine_config;
pub mod mastery;
pub mod quests;
pub mod student_quests;
pub mod submissions;
