/// Mastery records accepted in a single request.
pub const MAX_MASTERY_RECORDS_PER_REQUEST: usize = 5_000;

/// Catalog entries accepted by one replace.
pub const MAX_QUEST_CATALOG_SIZE: usize = 10_000;

/// Curriculum weeks accepted by one replace.
pub const MAX_CURRICULUM_QUESTS: usize = 2_000;

/// Challenges allowed on one curriculum quest.
pub const MAX_CHALLENGES_PER_QUEST: usize = 500;

/// Idle student locks are pruned once the map grows past this.
pub const STUDENT_LOCK_PRUNE_THRESHOLD: usize = 1_000;

/// Accepted quest levels, inclusive.
pub const QUEST_LEVEL_RANGE: std::ops::RangeInclusive<i32> = 0..=100;

pub const DEFAULT_PAGE_SIZE: u64 = 20;

pub const MAX_PAGE_SIZE: u64 = 100;
