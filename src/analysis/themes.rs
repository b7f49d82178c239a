// file: src/analysis/themes.rs
// description: names keyword clusters after the best matching theme
// reference: config/themes/*.json

use crate::analysis::cluster::ClusterSet;
use crate::models::ThemeMap;
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};
use tracing::{debug, warn};

const TOP_WEIGHTED_TERMS: usize = 5;
const MIN_THEME_SCORE: usize = 2;
const EMERGENT_PREFIX: &str = "Emergent Theme: ";

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClusterNaming {
    /// Cluster id to theme label.
    pub labels: BTreeMap<String, String>,
    /// Theme label to hex color.
    pub colors: BTreeMap<String, String>,
    /// Cluster id to winning score.
    pub scores: BTreeMap<String, usize>,
}

impl ClusterNaming {
    pub fn label_for<'a>(&'a self, cluster_id: &'a str) -> &'a str {
        self.labels
            .get(cluster_id)
            .map(String::as_str)
            .unwrap_or(cluster_id)
    }

    pub fn color_for(&self, label: &str) -> Option<&str> {
        self.colors.get(label).map(String::as_str)
    }

    /// Distinct labels in sorted order.
    pub fn unique_labels(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self.labels.values().map(String::as_str).collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }
}

/// Two points for a theme keyword among the top terms, one for any other match.
pub fn theme_score(terms: &[String], theme_keywords: &HashSet<String>) -> usize {
    let top: HashSet<&str> = terms
        .iter()
        .take(TOP_WEIGHTED_TERMS)
        .map(String::as_str)
        .collect();
    let unique: HashSet<&str> = terms.iter().map(String::as_str).collect();

    unique
        .into_iter()
        .filter(|t| theme_keywords.contains(*t))
        .map(|t| if top.contains(t) { 2 } else { 1 })
        .sum()
}

fn is_alphabetic(term: &str) -> bool {
    !term.is_empty() && term.chars().all(char::is_alphabetic)
}

fn emergent_label(terms: &[String], used: &HashSet<String>) -> String {
    let candidates: Vec<&str> = terms
        .iter()
        .map(String::as_str)
        .filter(|t| is_alphabetic(t))
        .collect();

    for candidate in &candidates {
        let label = format!("{}{}", EMERGENT_PREFIX, candidate);
        if !used.contains(&label) {
            return label;
        }
    }

    let base = format!("{}{}", EMERGENT_PREFIX, candidates.first().copied().unwrap_or(""));
    if !used.contains(&base) {
        return base;
    }
    (2..)
        .map(|n| format!("{} ({})", base, n))
        .find(|label| !used.contains(label))
        .unwrap_or(base)
}

pub fn name_clusters(clusters: &ClusterSet, theme_map: &ThemeMap) -> ClusterNaming {
    let theme_sets: Vec<(&str, HashSet<String>)> = theme_map
        .themes
        .iter()
        .map(|t| (t.name.as_str(), t.keyword_set()))
        .collect();

    let mut naming = ClusterNaming::default();
    let mut used: HashSet<String> = HashSet::new();

    for cluster in &clusters.clusters {
        let terms: Vec<String> = cluster
            .keywords
            .iter()
            .map(|k| k.term.to_lowercase())
            .collect();

        let mut best: Option<(&str, usize)> = None;
        for (name, keywords) in &theme_sets {
            let score = theme_score(&terms, keywords);
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((*name, score));
            }
        }

        let score = best.map_or(0, |(_, s)| s);
        let label = match best {
            Some((name, score)) if score >= MIN_THEME_SCORE => name.to_string(),
            _ => {
                let label = emergent_label(&terms, &used);
                warn!("Fallback label used for {}: {}", cluster.id, label);
                label
            }
        };

        debug!("{} -> {} (score: {})", cluster.id, label, score);

        let color = theme_map
            .color_for(&label)
            .unwrap_or(theme_map.fallback_color.as_str())
            .to_string();
        naming.colors.insert(label.clone(), color);
        naming.scores.insert(cluster.id.clone(), score);
        naming.labels.insert(cluster.id.clone(), label.clone());
        used.insert(label);
    }

    naming
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::cluster::KeywordCluster;
    use crate::analysis::keywords::KeywordCount;
    use pretty_assertions::assert_eq;

    fn cluster(id: usize, terms: &[&str]) -> KeywordCluster {
        KeywordCluster {
            id: format!("Cluster {}", id),
            label: id - 1,
            keywords: terms
                .iter()
                .map(|t| KeywordCount {
                    term: t.to_string(),
                    count: 1,
                })
                .collect(),
        }
    }

    fn set(clusters: Vec<KeywordCluster>) -> ClusterSet {
        ClusterSet {
            clusters,
            ..ClusterSet::default()
        }
    }

    #[test]
    fn test_theme_score_weights_top_terms() {
        let keywords: HashSet<String> = ["flood", "risk"].iter().map(|s| s.to_string()).collect();
        let terms: Vec<String> = ["a", "b", "c", "d", "flood", "risk"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(theme_score(&terms, &keywords), 3);
    }

    #[test]
    fn test_named_after_theme() {
        let map = ThemeMap::builtin().unwrap();
        let naming = name_clusters(
            &set(vec![cluster(1, &["flood", "storm", "parcel"])]),
            &map,
        );

        assert_eq!(
            naming.label_for("Cluster 1"),
            "Infrastructure Risk & Spatial Interference"
        );
        assert_eq!(
            naming.color_for("Infrastructure Risk & Spatial Interference"),
            Some("#AA0D0D")
        );
        assert_eq!(naming.scores["Cluster 1"], 4);
    }

    #[test]
    fn test_emergent_labels_are_unique() {
        let map = ThemeMap::builtin().unwrap();
        let naming = name_clusters(
            &set(vec![
                cluster(1, &["2020", "parcel", "locker"]),
                cluster(2, &["parcel", "locker"]),
                cluster(3, &["parcel"]),
            ]),
            &map,
        );

        assert_eq!(naming.label_for("Cluster 1"), "Emergent Theme: parcel");
        assert_eq!(naming.label_for("Cluster 2"), "Emergent Theme: locker");
        assert_eq!(naming.label_for("Cluster 3"), "Emergent Theme: parcel (2)");
        assert_eq!(naming.color_for("Emergent Theme: locker"), Some("#999999"));
        assert_eq!(naming.unique_labels().len(), 3);
    }

    #[test]
    fn test_unknown_cluster_label() {
        assert_eq!(ClusterNaming::default().label_for("Cluster 9"), "Cluster 9");
    }
}
