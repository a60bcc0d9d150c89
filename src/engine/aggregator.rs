use std::collections::BTreeMap;

use crate::engine::types::{Domain, DomainSummary, MasteryRecord};

struct Accumulator<'a> {
    sum: f64,
    count: usize,
    attempted: usize,
    weakest: &'a MasteryRecord,
}

/// Reduces per-skill mastery records into one summary per domain.
///
/// Percentages are taken as-is; ingest is where out-of-range values get
/// rejected. Ties for the weakest record keep the first one seen.
pub fn summarize_domains(records: &[MasteryRecord]) -> BTreeMap<Domain, DomainSummary> {
    let mut acc: BTreeMap<Domain, Accumulator<'_>> = BTreeMap::new();

    for record in records {
        let entry = acc.entry(record.domain).or_insert(Accumulator {
            sum: 0.0,
            count: 0,
            attempted: 0,
            weakest: record,
        });
        entry.sum += record.mastery_percentage;
        entry.count += 1;
        if record.is_attempted() {
            entry.attempted += 1;
        }
        if record.mastery_percentage < entry.weakest.mastery_percentage {
            entry.weakest = record;
        }
    }

    acc.into_iter()
        .map(|(domain, a)| {
            let average = (a.sum / a.count as f64).round() as i32;
            (
                domain,
                DomainSummary {
                    domain,
                    average_mastery: average,
                    weakest_record: a.weakest.clone(),
                    record_count: a.count,
                    attempted_count: a.attempted,
                },
            )
        })
        .collect()
}
