// file: src/models/theme.rs
// description: theme maps used to name keyword clusters
// reference: config/themes/*.json

use crate::error::{PipelineError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const BUILTIN_LOGISTICS_REVIEW: &str = include_str!("../../config/themes/logistics_review.json");

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeMap {
    pub name: String,
    pub themes: Vec<Theme>,
    #[serde(default = "default_fallback_color")]
    pub fallback_color: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub color: String,
    pub keywords: Vec<String>,
}

fn default_fallback_color() -> String {
    "#999999".to_string()
}

impl Theme {
    pub fn keyword_set(&self) -> HashSet<String> {
        self.keywords.iter().map(|k| k.to_lowercase()).collect()
    }
}

impl ThemeMap {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PipelineError::file_operation(path, e))?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let map: ThemeMap = serde_json::from_str(raw)?;
        if map.themes.is_empty() {
            return Err(PipelineError::Validation(format!(
                "Theme map '{}' defines no themes",
                map.name
            )));
        }
        Ok(map)
    }

    /// The urban logistics map bundled with the crate.
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_LOGISTICS_REVIEW)
    }

    pub fn color_for(&self, theme_name: &str) -> Option<&str> {
        self.themes
            .iter()
            .find(|t| t.name == theme_name)
            .map(|t| t.color.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_map() {
        let map = ThemeMap::builtin().unwrap();
        assert_eq!(map.name, "logistics_review");
        assert_eq!(map.themes.len(), 7);
        assert_eq!(
            map.color_for("Urban Mid-Block Morphology"),
            Some("#2CA02C")
        );
        assert_eq!(map.fallback_color, "#999999");
    }

    #[test]
    fn test_empty_map_rejected() {
        assert!(ThemeMap::from_json(r#"{"name":"x","themes":[]}"#).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = ThemeMap::load(Path::new("/nonexistent/themes.json")).unwrap_err();
        assert!(matches!(err, PipelineError::FileNotFound { .. }));
    }
}
