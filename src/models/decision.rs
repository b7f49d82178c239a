// file: src/models/decision.rs
// description: PRISMA stages, screening decisions and decision log entries
// reference: PRISMA 2020 flow diagram

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Stages a decision can be logged at; identification is the loaded record count.
pub enum Stage {
    Screening,
    Eligibility,
    Included,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Screening => "screening",
            Stage::Eligibility => "eligibility",
            Stage::Included => "included",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Include,
    ExcludeDuplicate,
    ExcludeIrrelevant,
    ExcludeScope,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Include => "include",
            Decision::ExcludeDuplicate => "exclude_duplicate",
            Decision::ExcludeIrrelevant => "exclude_irrelevant",
            Decision::ExcludeScope => "exclude_scope",
        }
    }

    pub fn is_exclusion(&self) -> bool {
        !matches!(self, Decision::Include)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One line of the decision log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionEntry {
    pub id: String,
    pub stage: Stage,
    pub decision: Decision,
    pub reason: String,
    pub timestamp: String,
}

impl DecisionEntry {
    pub fn new(
        id: impl Into<String>,
        stage: Stage,
        decision: Decision,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            stage,
            decision,
            reason: reason.into(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_serializes_snake_case() {
        let entry = DecisionEntry::new("abc", Stage::Screening, Decision::ExcludeDuplicate, "doi");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["stage"], "screening");
        assert_eq!(json["decision"], "exclude_duplicate");
        assert_eq!(json["reason"], "doi");
        assert!(chrono::DateTime::parse_from_rfc3339(&entry.timestamp).is_ok());
    }

    #[test]
    fn test_entry_parses_log_line() {
        let line = r#"{"id":"r1","stage":"eligibility","decision":"exclude_scope","reason":"excl_species","timestamp":"2024-01-01T00:00:00"}"#;
        let entry: DecisionEntry = serde_json::from_str(line).unwrap();

        assert_eq!(entry.stage, Stage::Eligibility);
        assert_eq!(entry.decision, Decision::ExcludeScope);
        assert!(entry.decision.is_exclusion());
    }

    #[test]
    fn test_stage_names_match_log_format() {
        for stage in [Stage::Screening, Stage::Eligibility, Stage::Included] {
            let json = serde_json::to_value(stage).unwrap();
            assert_eq!(json, stage.as_str());
        }
        assert!(serde_json::from_str::<Stage>(r#""identification""#).is_err());
    }
}
