// file: src/models/criteria.rs
// description: inclusion and exclusion criteria loaded from a JSON file
// reference: PRISMA eligibility criteria (PICOS)

use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::{debug, warn};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default)]
    pub inclusion: InclusionCriteria,
    #[serde(default)]
    pub exclusion: ExclusionCriteria,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InclusionCriteria {
    #[serde(default)]
    pub study_designs: Vec<String>,
    #[serde(default)]
    pub publication_types: Vec<String>,
    #[serde(default)]
    pub comparisons: Vec<String>,
    #[serde(default)]
    pub population_terms: Vec<String>,
    #[serde(default)]
    pub year: Option<YearWindow>,
    #[serde(default)]
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExclusionCriteria {
    #[serde(default)]
    pub methodologies: Vec<String>,
    #[serde(default)]
    pub study_designs: Vec<String>,
    #[serde(default)]
    pub publication_types: Vec<String>,
    #[serde(default)]
    pub species: Vec<String>,
    #[serde(default)]
    pub year: Option<YearCutoff>,
    #[serde(default)]
    pub languages: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearWindow {
    #[serde(default)]
    pub min: Option<YearBound>,
    #[serde(default)]
    pub max: Option<YearBound>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct YearCutoff {
    #[serde(default)]
    pub before: Option<YearBound>,
}

/// Criteria files written by hand mix `2010` and `"2010"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum YearBound {
    Number(i64),
    Text(String),
}

impl YearBound {
    pub fn value(&self) -> Option<i32> {
        match self {
            YearBound::Number(n) => i32::try_from(*n).ok(),
            YearBound::Text(s) => s.trim().parse().ok(),
        }
    }

    /// Empty strings and zero behave like an absent bound.
    pub fn is_set(&self) -> bool {
        match self {
            YearBound::Number(n) => *n != 0,
            YearBound::Text(s) => !s.trim().is_empty(),
        }
    }
}

impl Criteria {
    /// Missing or unreadable criteria mean "include everything".
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!("No criteria file at {}, screening without criteria", path.display());
            return Self::default();
        }

        let parsed = std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|raw| serde_json::from_str::<Criteria>(&raw).map_err(|e| e.to_string()));

        match parsed {
            Ok(criteria) => criteria,
            Err(e) => {
                warn!("Ignoring criteria file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_load_missing_is_empty() {
        let criteria = Criteria::load(Path::new("/nonexistent/criteria.json"));
        assert!(criteria.is_empty());
    }

    #[test]
    fn test_load_malformed_is_empty() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("criteria.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(Criteria::load(&path).is_empty());
    }

    #[test]
    fn test_load_mixed_year_types() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("criteria.json");
        std::fs::write(
            &path,
            r#"{"inclusion":{"year":{"min":"2010","max":2020}},"exclusion":{"species":["mice"]}}"#,
        )
        .unwrap();

        let criteria = Criteria::load(&path);
        let window = criteria.inclusion.year.unwrap();
        assert_eq!(window.min.unwrap().value(), Some(2010));
        assert_eq!(window.max.unwrap().value(), Some(2020));
        assert_eq!(criteria.exclusion.species, vec!["mice".to_string()]);
    }

    #[test]
    fn test_year_bound_text_invalid() {
        let bound = YearBound::Text("soon".to_string());
        assert!(bound.is_set());
        assert_eq!(bound.value(), None);
        assert!(!YearBound::Text(" ".to_string()).is_set());
    }
}
