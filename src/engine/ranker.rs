//! Ranks next actions for a student from a mastery snapshot and the quest catalog.

use std::collections::{BTreeMap, HashSet};

use crate::engine::aggregator::summarize_domains;
use crate::engine::config::RankerConfig;
use crate::engine::types::{
    Domain, DomainSummary, MasteryRecord, QuestDescriptor, Recommendation, RecommendationKind,
};

/// Builds the ranked recommendation list.
///
/// Emission order is review, quest, practice, challenge-up, celebration. The
/// final sort is stable, so equal priorities keep that order before the list
/// is cut to `config.max_recommendations`.
pub fn generate_recommendations(
    student_tier: &str,
    records: &[MasteryRecord],
    quests: &[QuestDescriptor],
    completed_quest_ids: &HashSet<String>,
    in_progress_quest_ids: &HashSet<String>,
    config: &RankerConfig,
) -> Vec<Recommendation> {
    let summaries = summarize_domains(records);
    let eligibility = Eligibility {
        student_tier,
        completed: completed_quest_ids,
        in_progress: in_progress_quest_ids,
        summaries: &summaries,
    };

    let mut out = Vec::new();
    push_struggling_reviews(&mut out, &summaries, config);
    push_quest_matches(&mut out, quests, &eligibility, config);
    push_practice(&mut out, &summaries, config);
    push_challenge_ups(&mut out, quests, &eligibility, config);
    push_celebrations(&mut out, &summaries, config);

    let emitted = out.len();
    out.sort_by(|a, b| b.priority.cmp(&a.priority));
    out.truncate(config.max_recommendations);

    tracing::debug!(
        student_tier,
        domains = summaries.len(),
        emitted,
        returned = out.len(),
        "Generated recommendations"
    );
    out
}

/// Domains with records, weakest first. Equal averages keep domain order.
pub fn weakest_domains(summaries: &BTreeMap<Domain, DomainSummary>, count: usize) -> Vec<Domain> {
    let mut ranked: Vec<&DomainSummary> = summaries.values().collect();
    ranked.sort_by_key(|s| s.average_mastery);
    ranked.into_iter().take(count).map(|s| s.domain).collect()
}

struct Eligibility<'a> {
    student_tier: &'a str,
    completed: &'a HashSet<String>,
    in_progress: &'a HashSet<String>,
    summaries: &'a BTreeMap<Domain, DomainSummary>,
}

impl Eligibility<'_> {
    fn average(&self, domain: Domain) -> i32 {
        domain_average(self.summaries, domain)
    }

    fn allows(&self, quest: &QuestDescriptor) -> bool {
        if self.completed.contains(&quest.id) || self.in_progress.contains(&quest.id) {
            return false;
        }
        if !quest.matches_tier(self.student_tier) {
            return false;
        }
        if let Some(prereq) = &quest.prerequisite_quest_id {
            if !self.completed.contains(prereq) {
                return false;
            }
        }
        if let Some(required) = quest.required_mastery_percentage {
            let gate_domain = quest.required_mastery_domain.or_else(|| quest.domain());
            let current = gate_domain.map(|d| self.average(d)).unwrap_or(0);
            if (current as f64) < required {
                return false;
            }
        }
        true
    }
}

/// Domains without records count as zero.
fn domain_average(summaries: &BTreeMap<Domain, DomainSummary>, domain: Domain) -> i32 {
    summaries
        .get(&domain)
        .map(|s| s.average_mastery)
        .unwrap_or(0)
}

fn fixed_priority(value: i32) -> u8 {
    value.clamp(1, 100) as u8
}

fn push_struggling_reviews(
    out: &mut Vec<Recommendation>,
    summaries: &BTreeMap<Domain, DomainSummary>,
    config: &RankerConfig,
) {
    let threshold = config.thresholds.struggling;
    for summary in summaries.values().filter(|s| s.average_mastery <= threshold) {
        let weakest = &summary.weakest_record;
        let skill = weakest.display_name();
        out.push(Recommendation {
            kind: RecommendationKind::Review {
                domain: summary.domain,
                competency_id: weakest.competency_id.clone(),
            },
            priority: fixed_priority(config.priorities.review),
            title: format!("Review: {skill}"),
            description: format!(
                "Revisit {skill} to rebuild your {} foundation.",
                summary.domain
            ),
            reason: format!(
                "{} average is {}%, at or below {}%",
                summary.domain, summary.average_mastery, threshold
            ),
        });
    }
}

fn push_quest_matches(
    out: &mut Vec<Recommendation>,
    quests: &[QuestDescriptor],
    eligibility: &Eligibility<'_>,
    config: &RankerConfig,
) {
    let t = &config.thresholds;
    let p = &config.priorities;
    let weak = weakest_domains(eligibility.summaries, config.weak_domain_count);

    for quest in quests {
        let Some(domain) = quest.domain() else {
            tracing::debug!(quest_id = %quest.id, subject = %quest.subject, "Skipping quest with unmapped subject");
            continue;
        };
        if !eligibility.allows(quest) {
            continue;
        }

        let average = eligibility.average(domain);
        let (base, reason) = match weak.iter().position(|d| *d == domain) {
            Some(rank) => (
                p.weak_domain_base
                    .saturating_sub(p.weak_domain_step.saturating_mul(rank as i32)),
                format!("Targets {domain}, one of your weakest areas ({average}%)"),
            ),
            None if average < t.developing => (
                p.developing_domain,
                format!("Builds up your developing {domain} skills ({average}%)"),
            ),
            None if average >= t.proficient => (
                p.proficient_domain,
                format!("Keeps your {domain} skills sharp ({average}%)"),
            ),
            None => (
                p.default_domain,
                format!("Matches your current {domain} level ({average}%)"),
            ),
        };

        let adjustment = if average < t.developing {
            p.level_pivot
                .saturating_sub(quest.level)
                .saturating_mul(p.level_weight)
        } else {
            quest.level.saturating_mul(p.level_weight)
        };
        let priority = base
            .saturating_add(adjustment)
            .clamp(1, p.quest_cap.min(100)) as u8;

        out.push(Recommendation {
            kind: RecommendationKind::Quest {
                quest_id: quest.id.clone(),
                xp_reward: quest.base_xp,
                domain,
            },
            priority,
            title: quest.title.clone(),
            description: format!(
                "Level {} {:?} {domain} quest worth {} XP",
                quest.level, quest.difficulty, quest.base_xp
            ),
            reason,
        });
    }
}

fn push_practice(
    out: &mut Vec<Recommendation>,
    summaries: &BTreeMap<Domain, DomainSummary>,
    config: &RankerConfig,
) {
    let t = &config.thresholds;
    for summary in summaries
        .values()
        .filter(|s| s.average_mastery >= t.struggling && s.average_mastery < t.proficient)
    {
        let weakest = &summary.weakest_record;
        let skill = weakest.display_name();
        out.push(Recommendation {
            kind: RecommendationKind::Practice {
                domain: summary.domain,
                competency_id: weakest.competency_id.clone(),
            },
            priority: fixed_priority(config.priorities.practice),
            title: format!("Practice: {skill}"),
            description: format!(
                "A short practice set on {skill} ({}% mastered).",
                weakest.mastery_percentage.round()
            ),
            reason: format!(
                "Weakest skill in {} ({}% average)",
                summary.domain, summary.average_mastery
            ),
        });
    }
}

fn push_challenge_ups(
    out: &mut Vec<Recommendation>,
    quests: &[QuestDescriptor],
    eligibility: &Eligibility<'_>,
    config: &RankerConfig,
) {
    let threshold = config.thresholds.proficient;
    for summary in eligibility
        .summaries
        .values()
        .filter(|s| s.average_mastery >= threshold)
    {
        let candidate = quests.iter().find(|q| {
            q.domain() == Some(summary.domain)
                && q.difficulty.is_advanced()
                && eligibility.allows(q)
        });
        let Some(quest) = candidate else {
            continue;
        };

        out.push(Recommendation {
            kind: RecommendationKind::ChallengeUp {
                quest_id: quest.id.clone(),
                xp_reward: quest.base_xp,
                domain: summary.domain,
            },
            priority: fixed_priority(config.priorities.challenge_up),
            title: format!("Ready for a challenge: {}", quest.title),
            description: format!(
                "Try a {:?} {} quest worth {} XP.",
                quest.difficulty, summary.domain, quest.base_xp
            ),
            reason: format!(
                "{} average is {}%, proficient or above",
                summary.domain, summary.average_mastery
            ),
        });
    }
}

fn push_celebrations(
    out: &mut Vec<Recommendation>,
    summaries: &BTreeMap<Domain, DomainSummary>,
    config: &RankerConfig,
) {
    let threshold = config.thresholds.mastery;
    for summary in summaries.values().filter(|s| s.average_mastery >= threshold) {
        out.push(Recommendation {
            kind: RecommendationKind::Celebration {
                domain: summary.domain,
            },
            priority: fixed_priority(config.priorities.celebration),
            title: format!("{} mastery!", summary.domain),
            description: format!(
                "You've reached {}% across your {} skills.",
                summary.average_mastery, summary.domain
            ),
            reason: format!("{} average is at or above {}%", summary.domain, threshold),
        });
    }
}
