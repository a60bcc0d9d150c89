use crate::engine::curriculum::CurriculumQuest;
use crate::engine::types::MasteryRecord;
use crate::store::keys;
use crate::store::{Store, StoreError};

const VERSION_KEY: &str = "_meta:version";

type MigrationFn = fn(&Store) -> Result<(), StoreError>;

fn migrations() -> Vec<(&'static str, MigrationFn)> {
    vec![
        ("001_initial", m001_initial),
        ("002_normalize_curriculum_tiers", m002_normalize_curriculum_tiers),
        ("003_tag_competency_keys", m003_tag_competency_keys),
    ]
}

/// Applies pending migrations in order.
///
/// Each migration must be safe to re-run: the version is only persisted after
/// the migration returns, so a crash in between replays it on next start.
/// Versions only move forward.
pub fn run(store: &Store) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    let all = migrations();

    for (index, (name, func)) in all.iter().enumerate() {
        let version = (index + 1) as u32;
        if version > current {
            tracing::info!(version, name, "Running migration");
            func(store)?;
            set_version(store, version)?;
            tracing::info!(version, name, "Migration complete");
        } else {
            tracing::debug!(version, name, "Migration already applied, skipping");
        }
    }

    Ok(())
}

pub fn get_current_version(store: &Store) -> Result<u32, StoreError> {
    match store.config_versions.get(VERSION_KEY.as_bytes())? {
        Some(raw) => {
            if raw.len() == 4 {
                let bytes: [u8; 4] = raw.as_ref().try_into().unwrap_or([0; 4]);
                Ok(u32::from_be_bytes(bytes))
            } else {
                // Legacy string format fallback
                let text = String::from_utf8(raw.to_vec()).unwrap_or_else(|_| "0".to_string());
                Ok(text.parse::<u32>().unwrap_or(0))
            }
        }
        None => Ok(0),
    }
}

pub fn set_version(store: &Store, version: u32) -> Result<(), StoreError> {
    let current = get_current_version(store)?;
    if version < current {
        return Err(StoreError::Migration {
            version,
            message: format!("Refuse to downgrade from {} to {}", current, version),
        });
    }

    store
        .config_versions
        .insert(VERSION_KEY.as_bytes(), &version.to_be_bytes())?;
    Ok(())
}

fn m001_initial(_store: &Store) -> Result<(), StoreError> {
    Ok(())
}

/// Curriculum keys written before tier lowercasing get re-keyed.
fn m002_normalize_curriculum_tiers(store: &Store) -> Result<(), StoreError> {
    for item in store.curriculum.iter() {
        let (key, value) = item?;
        let quest: CurriculumQuest = Store::deserialize(&value)?;
        let expected = keys::curriculum_key(&quest.tier, quest.week_number)?;
        if key.as_ref() != expected.as_bytes() {
            store.curriculum.remove(&key)?;
            store.curriculum.insert(expected.as_bytes(), value)?;
        }
    }
    Ok(())
}

/// Mastery keys gain an id-kind tag on the competency segment.
fn m003_tag_competency_keys(store: &Store) -> Result<(), StoreError> {
    for item in store.mastery_records.iter() {
        let (key, value) = item?;
        let Some(student_id) = std::str::from_utf8(&key)
            .ok()
            .and_then(|k| k.split(':').next())
        else {
            continue;
        };
        let record: MasteryRecord = Store::deserialize(&value)?;
        let expected = keys::mastery_key(student_id, record.domain, &record.competency_id)?;
        if key.as_ref() != expected.as_bytes() {
            store.mastery_records.remove(&key)?;
            store.mastery_records.insert(expected.as_bytes(), value)?;
        }
    }
    Ok(())
}
