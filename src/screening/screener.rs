// file: src/screening/screener.rs
// description: runs deduplication, relevance screening and eligibility over loaded records
// reference: PRISMA identification -> screening -> eligibility -> included

use crate::cleaning::{Deduplicator, RecordNormalizer};
use crate::config::ScreeningConfig;
use crate::models::{Criteria, Decision, DecisionEntry, Record, Stage};
use crate::pipeline::{PipelineStats, ProgressTracker};
use crate::screening::criteria::{Verdict, check_criteria};
use tracing::{debug, info};

#[derive(Debug, Clone, Default)]
pub struct ScreeningOutcome {
    pub identified: usize,
    pub included: Vec<Record>,
    pub decisions: Vec<DecisionEntry>,
    pub stats: PipelineStats,
}

impl ScreeningOutcome {
    pub fn count(&self, stage: Stage, decision: Decision) -> usize {
        self.decisions
            .iter()
            .filter(|d| d.stage == stage && d.decision == decision)
            .count()
    }
}

pub struct Screener {
    config: ScreeningConfig,
    criteria: Criteria,
    show_progress: bool,
    colored: bool,
}

impl Screener {
    pub fn new(config: ScreeningConfig, criteria: Criteria) -> Self {
        Self {
            config,
            criteria,
            show_progress: false,
            colored: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    /// Why a record fails relevance screening, if it does.
    fn irrelevance_reason(&self, record: &Record) -> Option<&'static str> {
        if record.abstract_text.is_empty() {
            return Some("missing_abstract");
        }
        if self.config.require_title && record.title.is_empty() {
            return Some("missing_title");
        }
        if self.config.require_year && record.year.is_none() {
            return Some("invalid_year");
        }
        None
    }

    pub fn run(&self, records: Vec<Record>) -> ScreeningOutcome {
        let identified = records.len();
        info!("Screening {} identified records", identified);

        let tracker = if self.show_progress {
            ProgressTracker::with_color(identified, self.colored)
        } else {
            ProgressTracker::hidden(identified)
        };

        let normalizer = RecordNormalizer::new();
        let mut dedup = Deduplicator::new();
        let mut decisions = Vec::with_capacity(identified);
        let mut included = Vec::new();

        for record in records {
            let record = normalizer.normalize(record);
            tracker.set_message(record.id.clone());

            if self.config.deduplicate
                && let Some(found) = dedup.check(&record)
            {
                debug!("{} is a duplicate ({})", record.id, found.reason());
                decisions.push(DecisionEntry::new(
                    &record.id,
                    Stage::Screening,
                    Decision::ExcludeDuplicate,
                    found.reason(),
                ));
                tracker.inc_excluded();
                continue;
            }

            if let Some(reason) = self.irrelevance_reason(&record) {
                decisions.push(DecisionEntry::new(
                    &record.id,
                    Stage::Screening,
                    Decision::ExcludeIrrelevant,
                    reason,
                ));
                tracker.inc_excluded();
                continue;
            }

            match check_criteria(&record, &self.criteria) {
                Verdict::Exclude(reason) => {
                    decisions.push(DecisionEntry::new(
                        &record.id,
                        Stage::Eligibility,
                        Decision::ExcludeScope,
                        reason,
                    ));
                    tracker.inc_excluded();
                }
                Verdict::Include => {
                    decisions.push(DecisionEntry::new(
                        &record.id,
                        Stage::Included,
                        Decision::Include,
                        "meets_criteria",
                    ));
                    tracker.inc_included();
                    included.push(record);
                }
            }
        }

        tracker.finish();
        let stats = tracker.get_stats();
        info!(
            "Screening kept {} of {} records ({:.1}%, {:.0} records/s)",
            stats.records_included,
            identified,
            stats.inclusion_rate(),
            stats.records_per_second()
        );

        ScreeningOutcome {
            identified,
            included,
            decisions,
            stats,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::InclusionCriteria;

    fn config() -> ScreeningConfig {
        ScreeningConfig {
            deduplicate: true,
            require_title: true,
            require_year: true,
        }
    }

    fn records() -> Vec<Record> {
        vec![
            Record::new("Urban micro hubs", "Hubs in the city centre.").with_year("2020"),
            Record::new("urban micro-hubs", "Same paper again.").with_year("2020"),
            Record::new("No abstract", "  ").with_year("2020"),
            Record::new("No year", "Abstract present."),
            Record::new("Rural depots", "Depots in farmland.").with_year("2021"),
        ]
    }

    #[test]
    fn test_screening_decisions() {
        let criteria = Criteria {
            inclusion: InclusionCriteria {
                population_terms: vec!["city".to_string()],
                ..Default::default()
            },
            ..Default::default()
        };

        let outcome = Screener::new(config(), criteria).run(records());

        assert_eq!(outcome.identified, 5);
        assert_eq!(outcome.decisions.len(), 5);
        assert_eq!(outcome.count(Stage::Screening, Decision::ExcludeDuplicate), 1);
        assert_eq!(outcome.count(Stage::Screening, Decision::ExcludeIrrelevant), 2);
        assert_eq!(outcome.count(Stage::Eligibility, Decision::ExcludeScope), 1);
        assert_eq!(outcome.included.len(), 1);
        assert_eq!(outcome.included[0].title, "Urban micro hubs");
        assert_eq!(outcome.stats.records_included, 1);
        assert_eq!(outcome.stats.records_excluded, 4);

        let reasons: Vec<_> = outcome.decisions.iter().map(|d| d.reason.as_str()).collect();
        assert!(reasons.contains(&"missing_abstract"));
        assert!(reasons.contains(&"invalid_year"));
        assert!(reasons.contains(&"population_mismatch"));
    }

    #[test]
    fn test_year_not_required() {
        let mut relaxed = config();
        relaxed.require_year = false;
        relaxed.deduplicate = false;

        let outcome = Screener::new(relaxed, Criteria::default()).run(records());
        assert_eq!(outcome.included.len(), 4);
        assert_eq!(outcome.count(Stage::Screening, Decision::ExcludeIrrelevant), 1);
    }
}
