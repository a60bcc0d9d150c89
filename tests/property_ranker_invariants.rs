use std::collections::HashSet;

use proptest::prelude::*;

use quest_engine::engine::aggregator::summarize_domains;
use quest_engine::engine::config::RankerConfig;
use quest_engine::engine::ranker::generate_recommendations;
use quest_engine::engine::types::{
    CompetencyId, Difficulty, Domain, MasteryRecord, QuestDescriptor, RecommendationKind,
};

fn domain_strategy() -> impl Strategy<Value = Domain> {
    prop::sample::select(Domain::ALL.to_vec())
}

fn record_strategy() -> impl Strategy<Value = MasteryRecord> {
    (0_i64..50, domain_strategy(), 0.0_f64..=100.0, 0_u32..5).prop_map(|(id, domain, pct, attempts)| {
        MasteryRecord {
            competency_id: CompetencyId::Numeric(id),
            competency_name: None,
            domain,
            mastery_percentage: pct,
            attempts,
            last_assessed_at: None,
        }
    })
}

fn quest_strategy() -> impl Strategy<Value = QuestDescriptor> {
    (
        0_usize..30,
        domain_strategy(),
        1_i32..12,
        prop::sample::select(vec![
            Difficulty::Novice,
            Difficulty::Apprentice,
            Difficulty::Skilled,
            Difficulty::Master,
        ]),
        prop::option::of(0_usize..30),
        prop::option::of(0.0_f64..=100.0),
        prop::option::of(domain_strategy()),
    )
        .prop_map(|(id, domain, level, difficulty, prereq, gate, gate_domain)| QuestDescriptor {
            id: format!("q{id}"),
            title: format!("Quest {id}"),
            subject: domain.subject().to_string(),
            level,
            difficulty,
            base_xp: 50,
            prerequisite_quest_id: prereq.map(|p| format!("q{p}")),
            required_mastery_domain: gate_domain,
            required_mastery_percentage: gate,
            tier: None,
        })
}

fn completed_strategy() -> impl Strategy<Value = HashSet<String>> {
    prop::collection::hash_set((0_usize..30).prop_map(|i| format!("q{i}")), 0..10)
}

proptest! {
    #[test]
    fn pt_output_is_capped_and_sorted(
        records in prop::collection::vec(record_strategy(), 0..40),
        quests in prop::collection::vec(quest_strategy(), 0..30),
        completed in completed_strategy(),
    ) {
        let cfg = RankerConfig::default();
        let recs = generate_recommendations("", &records, &quests, &completed, &HashSet::new(), &cfg);

        prop_assert!(recs.len() <= cfg.max_recommendations);
        prop_assert!(recs.windows(2).all(|w| w[0].priority >= w[1].priority));
        prop_assert!(recs.iter().all(|r| (1..=100).contains(&r.priority)));
    }

    #[test]
    fn pt_prerequisites_and_gates_hold(
        records in prop::collection::vec(record_strategy(), 0..40),
        quests in prop::collection::vec(quest_strategy(), 0..30),
        completed in completed_strategy(),
    ) {
        let cfg = RankerConfig::default();
        let recs = generate_recommendations("", &records, &quests, &completed, &HashSet::new(), &cfg);
        let summaries = summarize_domains(&records);

        for rec in &recs {
            let Some(quest_id) = rec.quest_id() else { continue };
            prop_assert!(!completed.contains(quest_id));
            // catalog ids may repeat; at least one copy must be eligible
            let candidates: Vec<&QuestDescriptor> = quests.iter().filter(|q| q.id == quest_id).collect();
            prop_assert!(!candidates.is_empty());
            let ok = candidates.iter().any(|q| {
                let prereq_ok = q.prerequisite_quest_id.as_ref().map_or(true, |p| completed.contains(p));
                let gate_ok = q.required_mastery_percentage.map_or(true, |req| {
                    let avg = q
                        .required_mastery_domain
                        .or_else(|| q.domain())
                        .and_then(|d| summaries.get(&d))
                        .map_or(0, |s| s.average_mastery);
                    (avg as f64) >= req
                });
                prereq_ok && gate_ok
            });
            prop_assert!(ok);
        }
    }

    #[test]
    fn pt_one_celebration_per_mastered_domain(
        records in prop::collection::vec(record_strategy(), 0..40),
    ) {
        let cfg = RankerConfig {
            max_recommendations: 100,
            ..RankerConfig::default()
        };
        let recs = generate_recommendations("", &records, &[], &HashSet::new(), &HashSet::new(), &cfg);
        let summaries = summarize_domains(&records);

        let mastered = summaries.values().filter(|s| s.average_mastery >= cfg.thresholds.mastery).count();
        let celebrations: Vec<Domain> = recs
            .iter()
            .filter_map(|r| match r.kind {
                RecommendationKind::Celebration { domain } => Some(domain),
                _ => None,
            })
            .collect();
        prop_assert_eq!(celebrations.len(), mastered);
        let unique: HashSet<Domain> = celebrations.iter().copied().collect();
        prop_assert_eq!(unique.len(), celebrations.len());
    }
}
