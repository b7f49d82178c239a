// file: src/parser/mod.rs
// description: bibliographic export parsers and format dispatch
// reference: internal module structure

pub mod delimited;
pub mod mendeley;
pub mod ris;

pub use delimited::CsvParser;
pub use mendeley::{MendeleyAuthor, MendeleyDocument, MendeleyParser};
pub use ris::{RisEntry, RisParser, reference_type_name};

use crate::error::{PipelineError, Result};
use crate::models::Record;
use crate::utils::{ExportFormat, Validator};
use std::fs;
use std::path::Path;
use tracing::info;

/// Loads one export file, choosing the parser from its extension.
pub fn load_records(path: &Path) -> Result<Vec<Record>> {
    Validator::validate_file_path(path)?;
    let format = Validator::export_format(path)?;

    let records = match format {
        ExportFormat::Ris => {
            let content = read_export(path)?;
            RisParser::new().parse(&content)?
        }
        ExportFormat::Json => {
            let content = read_export(path)?;
            MendeleyParser::new().parse(&content)?
        }
        ExportFormat::Csv => {
            let file = fs::File::open(path).map_err(|e| PipelineError::file_operation(path, e))?;
            CsvParser::new().parse(file)?
        }
    };

    info!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

fn read_export(path: &Path) -> Result<String> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::file_operation(path, e))?;
    Validator::validate_content_not_empty(&content).map_err(|_| {
        PipelineError::Validation(format!("Export file is empty: {}", path.display()))
    })?;
    Ok(content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_records_dispatches_on_extension() {
        let temp = TempDir::new().unwrap();

        let ris = temp.path().join("export.ris");
        fs::write(&ris, "TY  - JOUR\nTI  - From RIS\nER  - \n").unwrap();
        assert_eq!(load_records(&ris).unwrap()[0].title, "From RIS");

        let json = temp.path().join("export.json");
        fs::write(&json, r#"[{"title": "From JSON"}]"#).unwrap();
        assert_eq!(load_records(&json).unwrap()[0].title, "From JSON");

        let csv = temp.path().join("export.csv");
        fs::write(&csv, "title,abstract\nFrom CSV,text\n").unwrap();
        assert_eq!(load_records(&csv).unwrap()[0].title, "From CSV");
    }

    #[test]
    fn test_load_records_missing_file() {
        let err = load_records(Path::new("/nonexistent/export.ris")).unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound { .. }));
    }

    #[test]
    fn test_load_records_empty_file() {
        let temp = TempDir::new().unwrap();
        let ris = temp.path().join("empty.ris");
        fs::write(&ris, "\n").unwrap();
        assert!(matches!(
            load_records(&ris),
            Err(PipelineError::Validation(_))
        ));
    }
}
