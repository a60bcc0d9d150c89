use crate::engine::types::MasteryRecord;
use crate::store::keys;
use crate::store::{Store, StoreError};
use crate::validation::validate_percentage;

fn record_key(student_id: &str, record: &MasteryRecord) -> Result<String, StoreError> {
    keys::mastery_key(student_id, record.domain, &record.competency_id)
}

fn check_record(record: &MasteryRecord) -> Result<(), StoreError> {
    validate_percentage(record.mastery_percentage)
        .map_err(|msg| StoreError::Validation(format!("{}: {msg}", record.competency_id)))
}

impl Store {
    pub fn list_mastery_records(&self, student_id: &str) -> Result<Vec<MasteryRecord>, StoreError> {
        let prefix = keys::student_prefix(student_id)?;
        Self::scan_prefix(&self.mastery_records, &prefix)
    }

    pub fn upsert_mastery_record(
        &self,
        student_id: &str,
        record: &MasteryRecord,
    ) -> Result<(), StoreError> {
        check_record(record)?;
        let key = record_key(student_id, record)?;
        self.mastery_records
            .insert(key.as_bytes(), Self::serialize(record)?)?;
        Ok(())
    }

    /// Swaps the student's whole mastery snapshot. Nothing is written if any
    /// record is invalid or two records share a domain and competency.
    pub fn replace_mastery_records(
        &self,
        student_id: &str,
        records: &[MasteryRecord],
    ) -> Result<usize, StoreError> {
        let prefix = keys::student_prefix(student_id)?;
        let mut batch = sled::Batch::default();
        for item in self.mastery_records.scan_prefix(prefix.as_bytes()) {
            let (key, _) = item?;
            batch.remove(key);
        }
        let mut seen = std::collections::HashSet::new();
        for record in records {
            check_record(record)?;
            let key = record_key(student_id, record)?;
            if !seen.insert(key.clone()) {
                return Err(StoreError::Conflict {
                    entity: "mastery_record".to_string(),
                    key,
                });
            }
            batch.insert(key.as_bytes(), Self::serialize(record)?);
        }
        self.mastery_records.apply_batch(batch)?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use tempfile::tempdir;

    use crate::engine::types::{CompetencyId, Domain, MasteryRecord};
    use crate::store::{Store, StoreError};

    fn record(id: &str, domain: Domain, pct: f64) -> MasteryRecord {
        MasteryRecord {
            competency_id: CompetencyId::Text(id.to_string()),
            competency_name: Some(format!("Skill {id}")),
            domain,
            mastery_percentage: pct,
            attempts: 2,
            last_assessed_at: None,
        }
    }

    #[test]
    fn replace_drops_previous_snapshot() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        store
            .replace_mastery_records("s1", &[record("a", Domain::Math, 10.0), record("b", Domain::Reading, 20.0)])
            .unwrap();
        store
            .replace_mastery_records("s1", &[record("c", Domain::Writing, 30.0)])
            .unwrap();
        store.upsert_mastery_record("s10", &record("z", Domain::Math, 50.0)).unwrap();

        let records = store.list_mastery_records("s1").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].domain, Domain::Writing);
    }

    #[test]
    fn out_of_range_percentage_is_rejected_atomically() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        store.upsert_mastery_record("s1", &record("a", Domain::Math, 40.0)).unwrap();

        let err = store
            .replace_mastery_records("s1", &[record("b", Domain::Math, 50.0), record("c", Domain::Math, 140.0)])
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
        assert_eq!(store.list_mastery_records("s1").unwrap().len(), 1);

        let err = store
            .upsert_mastery_record("s1", &record("d", Domain::Math, f64::NAN))
            .unwrap_err();
        assert!(matches!(err, StoreError::Validation(_)));
    }

    #[test]
    fn numeric_and_text_ids_are_separate_records() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();

        let mut numeric = record("42", Domain::Math, 30.0);
        numeric.competency_id = CompetencyId::Numeric(42);
        let text = record("42", Domain::Math, 70.0);

        let written = store.replace_mastery_records("s1", &[numeric, text]).unwrap();
        assert_eq!(written, 2);
        assert_eq!(store.list_mastery_records("s1").unwrap().len(), 2);
    }

    #[test]
    fn duplicate_records_in_one_snapshot_conflict() {
        let dir = tempdir().unwrap();
        let store = Store::open(dir.path().join("db").to_str().unwrap()).unwrap();
        store.replace_mastery_records("s1", &[record("a", Domain::Math, 10.0)]).unwrap();

        let err = store
            .replace_mastery_records("s1", &[record("b", Domain::Math, 10.0), record("b", Domain::Math, 20.0)])
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict { .. }));
        // previous snapshot untouched
        assert_eq!(store.list_mastery_records("s1").unwrap().len(), 1);
    }
}
