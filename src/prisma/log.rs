// file: src/prisma/log.rs
// description: append-only JSON lines log of PRISMA screening decisions
// reference: https://jsonlines.org

use crate::error::{PipelineError, Result};
use crate::models::{Decision, DecisionEntry, Stage};
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct DecisionLog {
    path: PathBuf,
}

impl DecisionLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|e| PipelineError::file_operation(parent, e))?;
        }
        Ok(())
    }

    /// Truncates the log so a new screening run starts from zero.
    pub fn reset(&self) -> Result<()> {
        self.ensure_parent()?;
        fs::write(&self.path, "").map_err(|e| PipelineError::file_operation(&self.path, e))?;
        debug!("Reset decision log {}", self.path.display());
        Ok(())
    }

    pub fn append(&self, entry: &DecisionEntry) -> Result<()> {
        self.append_all(std::slice::from_ref(entry))
    }

    pub fn append_all(&self, entries: &[DecisionEntry]) -> Result<()> {
        self.ensure_parent()?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| PipelineError::file_operation(&self.path, e))?;

        for entry in entries {
            let line = serde_json::to_string(entry)?;
            writeln!(file, "{}", line).map_err(|e| PipelineError::file_operation(&self.path, e))?;
        }
        Ok(())
    }

    /// Missing log reads as empty; malformed lines are skipped.
    pub fn read_all(&self) -> Result<Vec<DecisionEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&self.path).map_err(|e| PipelineError::file_operation(&self.path, e))?;
        let mut entries = Vec::new();

        for (idx, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|e| PipelineError::file_operation(&self.path, e))?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<DecisionEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    "Skipping malformed decision at {}:{}: {}",
                    self.path.display(),
                    idx + 1,
                    e
                ),
            }
        }

        Ok(entries)
    }

    pub fn count(&self, stage: Stage, decision: Decision) -> Result<usize> {
        Ok(self
            .read_all()?
            .iter()
            .filter(|e| e.stage == stage && e.decision == decision)
            .count())
    }
}

/// Appends a single decision with the current UTC timestamp.
pub fn log_decision(
    path: &Path,
    record_id: &str,
    stage: Stage,
    decision: Decision,
    reason: &str,
) -> Result<DecisionEntry> {
    let entry = DecisionEntry::new(record_id, stage, decision, reason);
    DecisionLog::new(path).append(&entry)?;
    Ok(entry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_append_and_count() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("logs/prisma_decisions.jsonl");

        log_decision(&path, "r1", Stage::Screening, Decision::ExcludeDuplicate, "doi").unwrap();
        log_decision(&path, "r2", Stage::Screening, Decision::ExcludeDuplicate, "title").unwrap();
        log_decision(&path, "r3", Stage::Eligibility, Decision::ExcludeScope, "excl_species")
            .unwrap();

        let log = DecisionLog::new(&path);
        assert_eq!(log.read_all().unwrap().len(), 3);
        assert_eq!(log.count(Stage::Screening, Decision::ExcludeDuplicate).unwrap(), 2);
        assert_eq!(log.count(Stage::Eligibility, Decision::ExcludeScope).unwrap(), 1);
        assert_eq!(log.count(Stage::Screening, Decision::ExcludeIrrelevant).unwrap(), 0);
    }

    #[test]
    fn test_missing_log_is_empty() {
        let log = DecisionLog::new("/nonexistent/decisions.jsonl");
        assert!(log.read_all().unwrap().is_empty());
    }

    #[test]
    fn test_malformed_lines_skipped() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("decisions.jsonl");
        fs::write(
            &path,
            "not json\n{\"id\":\"a\",\"stage\":\"screening\",\"decision\":\"exclude_irrelevant\",\"reason\":\"x\",\"timestamp\":\"t\"}\n\n",
        )
        .unwrap();

        let entries = DecisionLog::new(&path).read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].decision, Decision::ExcludeIrrelevant);
    }

    #[test]
    fn test_reset_truncates() {
        let temp = TempDir::new().unwrap();
        let log = DecisionLog::new(temp.path().join("d.jsonl"));
        log.append(&DecisionEntry::new("a", Stage::Included, Decision::Include, "ok"))
            .unwrap();

        log.reset().unwrap();
        assert!(log.read_all().unwrap().is_empty());
    }
}
