// file: src/sources/scanner.rs
// description: Directory walking and export file discovery with filtering
// reference: https://docs.rs/walkdir

use crate::error::Result;
use crate::utils::{ExportFormat, Validator};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

pub struct ExportScanner {
    skip_patterns: Vec<String>,
    excluded: Vec<PathBuf>,
}

#[derive(Debug, Clone)]
pub struct ScannedExport {
    pub path: PathBuf,
    pub relative_path: String,
    pub format: ExportFormat,
    pub size: u64,
}

impl ExportScanner {
    pub fn new(skip_patterns: Vec<String>) -> Self {
        Self {
            skip_patterns,
            excluded: Vec::new(),
        }
    }

    /// Files, or whole directories, the scan must never return.
    pub fn with_excluded<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.excluded
            .extend(paths.into_iter().map(|p| resolve(p.as_ref())));
        self
    }

    /// Supported exports sorted by path; byte-identical copies are listed once.
    pub fn scan_directory(&self, root: &Path) -> Result<Vec<ScannedExport>> {
        Validator::validate_directory(root)?;
        info!("Scanning directory: {}", root.display());

        let mut exports = Vec::new();
        let mut seen_hashes = HashSet::new();

        for entry in WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
        {
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();

            if self.should_skip(path) {
                debug!("Skipping file: {}", path.display());
                continue;
            }

            if self.is_excluded(path) {
                debug!("Skipping pipeline output: {}", path.display());
                continue;
            }

            let Ok(format) = Validator::export_format(path) else {
                continue;
            };

            match Self::compute_file_hash(path) {
                Ok(hash) if !seen_hashes.insert(hash.clone()) => {
                    debug!(
                        "Skipping duplicate export: {} (hash {})",
                        path.display(),
                        &hash[..12]
                    );
                    continue;
                }
                Ok(_) => {}
                Err(err) => debug!("Failed to hash {}: {}", path.display(), err),
            }

            let size = entry.metadata().map(|m| m.len()).unwrap_or(0);
            let relative_path = path
                .strip_prefix(root)
                .unwrap_or(path)
                .to_string_lossy()
                .to_string();

            exports.push(ScannedExport {
                path: path.to_path_buf(),
                relative_path,
                format,
                size,
            });
        }

        exports.sort_by(|a, b| a.path.cmp(&b.path));
        info!("Found {} export files", exports.len());
        Ok(exports)
    }

    fn should_skip(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();

        for pattern in &self.skip_patterns {
            if pattern.contains('*') {
                let pattern_without_star = pattern.replace("*.", ".");
                if path_str.ends_with(&pattern_without_star) {
                    return true;
                }
            } else if path_str.contains(pattern.as_str()) {
                return true;
            }
        }

        false
    }

    fn is_excluded(&self, path: &Path) -> bool {
        if self.excluded.is_empty() {
            return false;
        }
        let path = resolve(path);
        self.excluded.iter().any(|ex| path.starts_with(ex))
    }

    fn compute_file_hash(path: &Path) -> std::io::Result<String> {
        let content = fs::read(path)?;
        let mut hasher = Sha256::new();
        hasher.update(&content);
        Ok(format!("{:x}", hasher.finalize()))
    }
}

/// Absolute form of a path that may not exist yet.
fn resolve(path: &Path) -> PathBuf {
    if let Ok(canonical) = fs::canonicalize(path) {
        return canonical;
    }
    match (path.parent(), path.file_name()) {
        (Some(parent), Some(name)) => {
            let parent = if parent.as_os_str().is_empty() {
                Path::new(".")
            } else {
                parent
            };
            fs::canonicalize(parent)
                .map(|p| p.join(name))
                .unwrap_or_else(|_| path.to_path_buf())
        }
        _ => path.to_path_buf(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_scan_directory() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("nested")).unwrap();
        fs::write(temp.path().join("b.ris"), "TY  - JOUR\nER  - \n").unwrap();
        fs::write(temp.path().join("nested/a.json"), "[]").unwrap();
        fs::write(temp.path().join("readme.md"), "# notes").unwrap();

        let scanner = ExportScanner::new(vec![]);
        let exports = scanner.scan_directory(temp.path()).unwrap();

        assert_eq!(exports.len(), 2);
        assert_eq!(exports[0].relative_path, "b.ris");
        assert_eq!(exports[0].format, ExportFormat::Ris);
        assert_eq!(exports[1].format, ExportFormat::Json);
    }

    #[test]
    fn test_duplicate_exports_listed_once() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("a.ris"), "TY  - JOUR\nTI  - X\nER  - \n").unwrap();
        fs::write(temp.path().join("copy.ris"), "TY  - JOUR\nTI  - X\nER  - \n").unwrap();

        let exports = ExportScanner::new(vec![]).scan_directory(temp.path()).unwrap();
        assert_eq!(exports.len(), 1);
        assert_eq!(exports[0].relative_path, "a.ris");
    }

    #[test]
    fn test_skip_patterns() {
        let scanner = ExportScanner::new(vec!["*.bak".to_string(), "_backup".to_string()]);

        assert!(scanner.should_skip(Path::new("export.bak")));
        assert!(scanner.should_skip(Path::new("data/_backup_cleanup/old.ris")));
        assert!(!scanner.should_skip(Path::new("data/export.ris")));
    }

    #[test]
    fn test_excluded_paths_not_scanned() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("outputs")).unwrap();
        fs::write(temp.path().join("export.ris"), "TY  - JOUR\nTI  - X\nER  - \n").unwrap();
        fs::write(temp.path().join("cleaned_metadata.json"), "[]").unwrap();
        fs::write(temp.path().join("outputs/included_records.json"), "[{}]").unwrap();

        let exports = ExportScanner::new(vec![])
            .with_excluded([
                temp.path().join("cleaned_metadata.json"),
                temp.path().join("outputs"),
            ])
            .scan_directory(temp.path())
            .unwrap();

        let names: Vec<_> = exports.iter().map(|e| e.relative_path.as_str()).collect();
        assert_eq!(names, vec!["export.ris"]);
    }

    #[test]
    fn test_missing_directory() {
        let scanner = ExportScanner::new(vec![]);
        assert!(scanner.scan_directory(Path::new("/nonexistent/dir")).is_err());
    }
}
