// file: src/sources/mod.rs
// description: export discovery and loading from a file or directory
// reference: internal module structure

pub mod scanner;

pub use scanner::{ExportScanner, ScannedExport};

use crate::error::Result;
use crate::models::Record;
use crate::parser::load_records;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Loads a single export, or every supported export below a directory
/// except the `excluded` files and directories.
pub fn load_input(input: &Path, skip_patterns: &[String], excluded: &[PathBuf]) -> Result<Vec<Record>> {
    if !input.is_dir() {
        return load_records(input);
    }

    let scanner = ExportScanner::new(skip_patterns.to_vec()).with_excluded(excluded);
    let exports = scanner.scan_directory(input)?;
    if exports.is_empty() {
        warn!("No RIS, JSON or CSV exports found in {}", input.display());
    }

    let mut records = Vec::new();
    for export in &exports {
        records.extend(load_records(&export.path)?);
    }

    info!(
        "Loaded {} records from {} export files",
        records.len(),
        exports.len()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_input_directory() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join("a.ris"),
            "TY  - JOUR\nTI  - One\nER  - \nTY  - JOUR\nTI  - Two\nER  - \n",
        )
        .unwrap();
        fs::write(temp.path().join("b.csv"), "title\nThree\n").unwrap();
        fs::write(temp.path().join("notes.txt.bak"), "ignored").unwrap();

        let records = load_input(temp.path(), &[], &[]).unwrap();
        let titles: Vec<_> = records.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(titles, vec!["One", "Two", "Three"]);
    }

    #[test]
    fn test_load_input_single_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("only.ris");
        fs::write(&path, "TY  - JOUR\nTI  - Solo\nER  - \n").unwrap();

        assert_eq!(load_input(&path, &[], &[]).unwrap().len(), 1);
    }
}
