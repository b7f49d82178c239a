// file: src/prisma/counts.rs
// description: PRISMA stage counts derived from the decision log
// reference: PRISMA 2020 flow diagram boxes

use crate::error::{PipelineError, Result};
use crate::models::{Decision, DecisionEntry, Stage};
use crate::prisma::log::DecisionLog;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrismaCounts {
    pub identified: usize,
    pub duplicates_removed: usize,
    pub excluded_screening: usize,
    pub excluded_eligibility: usize,
    pub screened: usize,
    pub eligibility: usize,
    pub included: usize,
}

impl PrismaCounts {
    pub fn from_decisions(identified: usize, decisions: &[DecisionEntry]) -> Self {
        let count = |stage: Stage, decision: Decision| {
            decisions
                .iter()
                .filter(|d| d.stage == stage && d.decision == decision)
                .count()
        };

        let duplicates_removed = count(Stage::Screening, Decision::ExcludeDuplicate);
        let excluded_screening = count(Stage::Screening, Decision::ExcludeIrrelevant);
        let excluded_eligibility = count(Stage::Eligibility, Decision::ExcludeScope);

        let screened = identified.saturating_sub(duplicates_removed);
        let eligibility = screened.saturating_sub(excluded_screening);
        let included = eligibility.saturating_sub(excluded_eligibility);

        if duplicates_removed + excluded_screening + excluded_eligibility > identified {
            warn!(
                "Decision log holds more exclusions than identified records ({}); counts were clamped at zero",
                identified
            );
        }

        Self {
            identified,
            duplicates_removed,
            excluded_screening,
            excluded_eligibility,
            screened,
            eligibility,
            included,
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|e| PipelineError::file_operation(path, e))?;
        Ok(serde_json::from_str(&raw)?)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| PipelineError::file_operation(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| PipelineError::file_operation(path, e))?;
        Ok(())
    }
}

/// Number of records in the cleaned metadata file; missing file counts as zero.
pub fn count_loaded(metadata_path: &Path) -> Result<usize> {
    if !metadata_path.exists() {
        return Ok(0);
    }
    let raw = fs::read_to_string(metadata_path)
        .map_err(|e| PipelineError::file_operation(metadata_path, e))?;
    let values: Vec<serde_json::Value> = serde_json::from_str(&raw)?;
    Ok(values.len())
}

/// Recomputes the stage counts from disk and writes them as pretty JSON.
pub fn update_counts(
    metadata_path: &Path,
    decisions_path: &Path,
    counts_path: &Path,
) -> Result<PrismaCounts> {
    let identified = count_loaded(metadata_path)?;
    let decisions = DecisionLog::new(decisions_path).read_all()?;
    let counts = PrismaCounts::from_decisions(identified, &decisions);

    counts.save(counts_path)?;
    info!(
        "PRISMA counts: identified={} screened={} eligibility={} included={}",
        counts.identified, counts.screened, counts.eligibility, counts.included
    );
    Ok(counts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prisma::log::log_decision;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn entry(stage: Stage, decision: Decision) -> DecisionEntry {
        DecisionEntry::new("id", stage, decision, "r")
    }

    #[test]
    fn test_counts_sum_decisions() {
        let decisions = vec![
            entry(Stage::Screening, Decision::ExcludeDuplicate),
            entry(Stage::Screening, Decision::ExcludeDuplicate),
            entry(Stage::Screening, Decision::ExcludeIrrelevant),
            entry(Stage::Eligibility, Decision::ExcludeScope),
            entry(Stage::Included, Decision::Include),
            entry(Stage::Eligibility, Decision::ExcludeDuplicate),
        ];

        let counts = PrismaCounts::from_decisions(10, &decisions);
        assert_eq!(
            counts,
            PrismaCounts {
                identified: 10,
                duplicates_removed: 2,
                excluded_screening: 1,
                excluded_eligibility: 1,
                screened: 8,
                eligibility: 7,
                included: 6,
            }
        );
    }

    #[test]
    fn test_counts_clamp_at_zero() {
        let decisions = vec![entry(Stage::Screening, Decision::ExcludeDuplicate); 3];
        let counts = PrismaCounts::from_decisions(1, &decisions);
        assert_eq!(counts.screened, 0);
        assert_eq!(counts.included, 0);
    }

    #[test]
    fn test_update_counts_from_files() {
        let temp = TempDir::new().unwrap();
        let metadata = temp.path().join("cleaned_metadata.json");
        let decisions = temp.path().join("logs/decisions.jsonl");
        let counts_path = temp.path().join("logs/prisma_counts.json");

        fs::write(&metadata, r#"[{"title":"a"},{"title":"b"},{"title":"c"}]"#).unwrap();
        log_decision(&decisions, "a", Stage::Screening, Decision::ExcludeIrrelevant, "x").unwrap();

        let counts = update_counts(&metadata, &decisions, &counts_path).unwrap();
        assert_eq!(counts.identified, 3);
        assert_eq!(counts.eligibility, 2);
        assert_eq!(PrismaCounts::load(&counts_path).unwrap(), counts);
    }

    #[test]
    fn test_update_counts_without_inputs() {
        let temp = TempDir::new().unwrap();
        let counts = update_counts(
            &temp.path().join("missing.json"),
            &temp.path().join("missing.jsonl"),
            &temp.path().join("counts.json"),
        )
        .unwrap();
        assert_eq!(counts, PrismaCounts::default());
    }
}
