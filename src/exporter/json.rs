// file: src/exporter/json.rs
// description: json export of positioned keyword maps and named clusters

use crate::analysis::{ClusterNaming, ClusterSet, KeywordCount};
use crate::error::{PipelineError, Result};
use crate::graph::{KeywordGraph, Layout, Point};
use chrono::Utc;
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone)]
pub struct GraphExporter {
    output_dir: PathBuf,
    pretty: bool,
}

#[derive(Debug, Serialize)]
pub struct ExportedNode {
    pub term: String,
    pub cluster: String,
    pub color: String,
    pub frequency: usize,
    pub weighted_degree: usize,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Serialize)]
pub struct ExportedEdge {
    pub source: String,
    pub target: String,
    pub weight: usize,
    pub weight_norm: f64,
}

#[derive(Debug, Serialize)]
pub struct KeywordMapExport {
    pub exported_at: String,
    pub layout: String,
    pub nodes: Vec<ExportedNode>,
    pub edges: Vec<ExportedEdge>,
}

#[derive(Debug, Serialize)]
pub struct ExportedCluster<'a> {
    pub id: &'a str,
    pub theme: &'a str,
    pub color: Option<&'a str>,
    pub score: usize,
    pub keywords: &'a [KeywordCount],
}

impl GraphExporter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir).map_err(|e| PipelineError::file_operation(&output_dir, e))?;
        Ok(Self {
            output_dir,
            pretty: true,
        })
    }

    pub fn with_pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    fn write_json<T: Serialize>(&self, file_name: &str, value: &T) -> Result<PathBuf> {
        let path = self.output_dir.join(file_name);
        let json = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        fs::write(&path, json).map_err(|e| PipelineError::file_operation(&path, e))?;
        Ok(path)
    }

    pub fn keyword_map(kg: &KeywordGraph, positions: &[Point], layout: Layout) -> Result<KeywordMapExport> {
        if positions.len() != kg.node_count() {
            return Err(PipelineError::Validation(format!(
                "Layout has {} positions for {} nodes",
                positions.len(),
                kg.node_count()
            )));
        }

        let graph = kg.graph();
        let nodes = graph
            .node_indices()
            .map(|idx| {
                let node = &graph[idx];
                let pos = positions[idx.index()];
                ExportedNode {
                    term: node.term.clone(),
                    cluster: node.cluster.clone(),
                    color: node.color.clone(),
                    frequency: node.frequency,
                    weighted_degree: kg.weighted_degree(idx),
                    x: pos.x,
                    y: pos.y,
                }
            })
            .collect();

        let edges = graph
            .edge_references()
            .map(|edge| ExportedEdge {
                source: graph[edge.source()].term.clone(),
                target: graph[edge.target()].term.clone(),
                weight: edge.weight().weight,
                weight_norm: edge.weight().weight_norm,
            })
            .collect();

        Ok(KeywordMapExport {
            exported_at: Utc::now().to_rfc3339(),
            layout: layout.to_string(),
            nodes,
            edges,
        })
    }

    pub fn export_keyword_map(
        &self,
        kg: &KeywordGraph,
        positions: &[Point],
        layout: Layout,
    ) -> Result<PathBuf> {
        let export = Self::keyword_map(kg, positions, layout)?;
        let path = self.write_json("keyword_map.json", &export)?;
        info!(
            "Exported keyword map ({} nodes, {} edges) to {}",
            export.nodes.len(),
            export.edges.len(),
            path.display()
        );
        Ok(path)
    }

    pub fn export_clusters(&self, clusters: &ClusterSet, naming: &ClusterNaming) -> Result<PathBuf> {
        let exported: Vec<ExportedCluster<'_>> = clusters
            .clusters
            .iter()
            .map(|c| {
                let theme = naming.label_for(&c.id);
                ExportedCluster {
                    id: &c.id,
                    theme,
                    color: naming.color_for(theme),
                    score: naming.scores.get(&c.id).copied().unwrap_or(0),
                    keywords: &c.keywords,
                }
            })
            .collect();

        let path = self.write_json("clusters.json", &exported)?;
        info!("Exported {} clusters to {}", exported.len(), path.display());
        Ok(path)
    }

    pub fn export_keywords(&self, keywords: &[KeywordCount]) -> Result<PathBuf> {
        let path = self.write_json("keywords.json", &keywords)?;
        info!("Exported {} keywords to {}", keywords.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::KeywordCluster;
    use tempfile::tempdir;

    fn fixture() -> (ClusterSet, ClusterNaming) {
        let set = ClusterSet {
            clusters: vec![KeywordCluster {
                id: "Cluster 1".into(),
                label: 0,
                keywords: vec![
                    KeywordCount {
                        term: "freight".into(),
                        count: 4,
                    },
                    KeywordCount {
                        term: "hub".into(),
                        count: 2,
                    },
                ],
            }],
            ..ClusterSet::default()
        };
        let mut naming = ClusterNaming::default();
        naming.labels.insert("Cluster 1".into(), "Logistics".into());
        naming.colors.insert("Logistics".into(), "#FF7F0E".into());
        naming.scores.insert("Cluster 1".into(), 3);
        (set, naming)
    }

    #[test]
    fn test_exporter_creation() {
        let dir = tempdir().unwrap();
        let exporter = GraphExporter::new(dir.path().join("nested"));
        assert!(exporter.is_ok());
        assert!(dir.path().join("nested").is_dir());
    }

    #[test]
    fn test_keyword_map_export() {
        let dir = tempdir().unwrap();
        let (set, naming) = fixture();
        let kg = KeywordGraph::build(&set, &naming);
        let positions = vec![Point::new(-1.0, 0.0), Point::new(1.0, 0.5)];

        let path = GraphExporter::new(dir.path())
            .unwrap()
            .export_keyword_map(&kg, &positions, Layout::Spring)
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["layout"], "spring");
        assert_eq!(value["nodes"][0]["term"], "freight");
        assert_eq!(value["nodes"][1]["y"], 0.5);
        assert_eq!(value["edges"][0]["weight"], 1);
        assert_eq!(value["edges"][0]["weight_norm"], 1.0);
    }

    #[test]
    fn test_positions_must_match() {
        let (set, naming) = fixture();
        let kg = KeywordGraph::build(&set, &naming);
        assert!(GraphExporter::keyword_map(&kg, &[], Layout::Circular).is_err());
    }

    #[test]
    fn test_cluster_export() {
        let dir = tempdir().unwrap();
        let (set, naming) = fixture();
        let path = GraphExporter::new(dir.path())
            .unwrap()
            .with_pretty(false)
            .export_clusters(&set, &naming)
            .unwrap();

        let raw = fs::read_to_string(path).unwrap();
        assert!(raw.starts_with(r##"[{"id":"Cluster 1","theme":"Logistics","color":"#FF7F0E","score":3"##));
    }
}
