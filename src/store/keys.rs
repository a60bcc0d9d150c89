use crate::engine::types::{CompetencyId, Domain};
use crate::store::StoreError;

const SEP: char = ':';

/// Identifiers become key segments, so they must be non-empty and free of the separator.
pub fn validate_segment(kind: &str, value: &str) -> Result<(), StoreError> {
    if value.is_empty() {
        return Err(StoreError::Validation(format!("{kind} must not be empty")));
    }
    if value.contains(SEP) {
        return Err(StoreError::Validation(format!(
            "{kind} must not contain '{SEP}': {value}"
        )));
    }
    Ok(())
}

pub fn student_prefix(student_id: &str) -> Result<String, StoreError> {
    validate_segment("studentId", student_id)?;
    Ok(format!("{student_id}{SEP}"))
}

/// The competency segment is tagged by id kind, so `42` and `"42"` stay distinct.
pub fn mastery_key(
    student_id: &str,
    domain: Domain,
    competency_id: &CompetencyId,
) -> Result<String, StoreError> {
    validate_segment("studentId", student_id)?;
    let competency = match competency_id {
        CompetencyId::Numeric(id) => format!("n.{id}"),
        CompetencyId::Text(id) => {
            validate_segment("competencyId", id)?;
            format!("t.{id}")
        }
    };
    Ok(format!("{student_id}{SEP}{}{SEP}{competency}", domain.subject()))
}

pub fn quest_key(quest_id: &str) -> Result<String, StoreError> {
    validate_segment("questId", quest_id)?;
    Ok(quest_id.to_string())
}

pub fn student_quest_key(student_id: &str, quest_id: &str) -> Result<String, StoreError> {
    validate_segment("studentId", student_id)?;
    validate_segment("questId", quest_id)?;
    Ok(format!("{student_id}{SEP}{quest_id}"))
}

pub fn submission_key(student_id: &str, challenge_id: &str) -> Result<String, StoreError> {
    validate_segment("studentId", student_id)?;
    validate_segment("challengeId", challenge_id)?;
    Ok(format!("{student_id}{SEP}{challenge_id}"))
}

/// Zero-padded week keeps a tier's quests in week order under sled's byte ordering.
pub fn curriculum_key(tier: &str, week_number: u32) -> Result<String, StoreError> {
    validate_segment("tier", tier)?;
    Ok(format!(
        "{}{SEP}{:06}",
        tier.trim().to_ascii_lowercase(),
        week_number
    ))
}

pub fn config_latest_key(config_type: &str) -> String {
    format!("{config_type}{SEP}latest")
}

pub fn config_version_key(config_type: &str, version: u32) -> String {
    format!("{config_type}{SEP}{version:010}")
}
