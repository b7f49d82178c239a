// file: src/graph/keyword_graph.rs
// description: keyword co-occurrence network built from named clusters
// reference: https://docs.rs/petgraph/latest/petgraph/graph/type.UnGraph.html

use crate::analysis::{ClusterNaming, ClusterSet};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use serde::Serialize;
use std::collections::HashMap;
use tracing::debug;

const DEFAULT_NODE_COLOR: &str = "#999999";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordNode {
    pub term: String,
    /// Theme label of the first cluster the term appeared in.
    pub cluster: String,
    pub color: String,
    pub frequency: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CoOccurrence {
    pub weight: usize,
    pub weight_norm: f64,
}

#[derive(Debug, Clone, Default)]
pub struct KeywordGraph {
    graph: UnGraph<KeywordNode, CoOccurrence>,
    index: HashMap<String, NodeIndex>,
}

fn clean_term(term: &str) -> String {
    term.trim().to_lowercase()
}

impl KeywordGraph {
    pub fn build(clusters: &ClusterSet, naming: &ClusterNaming) -> Self {
        let mut kg = Self::default();

        for cluster in &clusters.clusters {
            let label = naming.label_for(&cluster.id);
            let color = naming.color_for(label).unwrap_or(DEFAULT_NODE_COLOR);

            let mut members: Vec<NodeIndex> = Vec::with_capacity(cluster.keywords.len());
            for keyword in &cluster.keywords {
                let term = clean_term(&keyword.term);
                if term.is_empty() {
                    continue;
                }
                let idx = match kg.index.get(&term).copied() {
                    Some(idx) => idx,
                    None => {
                        let idx = kg.graph.add_node(KeywordNode {
                            term: term.clone(),
                            cluster: label.to_string(),
                            color: color.to_string(),
                            frequency: keyword.count,
                        });
                        kg.index.insert(term, idx);
                        idx
                    }
                };
                if !members.contains(&idx) {
                    members.push(idx);
                }
            }

            for (i, &a) in members.iter().enumerate() {
                for &b in &members[i + 1..] {
                    match kg.graph.find_edge(a, b) {
                        Some(edge) => kg.graph[edge].weight += 1,
                        None => {
                            kg.graph.add_edge(
                                a,
                                b,
                                CoOccurrence {
                                    weight: 1,
                                    weight_norm: 0.0,
                                },
                            );
                        }
                    }
                }
            }
        }

        let max_weight = kg
            .graph
            .edge_weights()
            .map(|e| e.weight)
            .max()
            .unwrap_or(1)
            .max(1);
        for edge in kg.graph.edge_weights_mut() {
            edge.weight_norm = edge.weight as f64 / max_weight as f64;
        }

        debug!(
            "Keyword graph: {} nodes, {} edges",
            kg.graph.node_count(),
            kg.graph.edge_count()
        );
        kg
    }

    pub fn graph(&self) -> &UnGraph<KeywordNode, CoOccurrence> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn node_index(&self, term: &str) -> Option<NodeIndex> {
        self.index.get(&clean_term(term)).copied()
    }

    pub fn node(&self, term: &str) -> Option<&KeywordNode> {
        self.node_index(term).map(|idx| &self.graph[idx])
    }

    pub fn edge(&self, a: &str, b: &str) -> Option<&CoOccurrence> {
        let edge = self.graph.find_edge(self.node_index(a)?, self.node_index(b)?)?;
        Some(&self.graph[edge])
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    /// Sum of co-occurrence weights on the node's edges.
    pub fn weighted_degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).map(|e| e.weight().weight).sum()
    }

    /// Distinct cluster labels in sorted order.
    pub fn clusters(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .graph
            .node_weights()
            .map(|n| n.cluster.as_str())
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }

    pub fn same_cluster(&self, a: NodeIndex, b: NodeIndex) -> bool {
        self.graph[a].cluster == self.graph[b].cluster
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{KeywordCluster, KeywordCount};
    use pretty_assertions::assert_eq;

    fn cluster(id: &str, terms: &[(&str, usize)]) -> KeywordCluster {
        KeywordCluster {
            id: id.to_string(),
            label: 0,
            keywords: terms
                .iter()
                .map(|(t, c)| KeywordCount {
                    term: t.to_string(),
                    count: *c,
                })
                .collect(),
        }
    }

    fn fixture() -> KeywordGraph {
        let set = ClusterSet {
            clusters: vec![
                cluster("Cluster 1", &[("Freight", 9), ("hub", 5), ("delivery", 3)]),
                cluster("Cluster 2", &[("freight ", 9), ("hub", 5), ("flood", 2)]),
            ],
            ..ClusterSet::default()
        };
        let mut naming = ClusterNaming::default();
        naming.labels.insert("Cluster 1".into(), "Logistics".into());
        naming.labels.insert("Cluster 2".into(), "Risk".into());
        naming.colors.insert("Logistics".into(), "#FF7F0E".into());
        KeywordGraph::build(&set, &naming)
    }

    #[test]
    fn test_first_cluster_wins() {
        let kg = fixture();
        assert_eq!(kg.node_count(), 4);
        let freight = kg.node("FREIGHT").unwrap();
        assert_eq!(freight.cluster, "Logistics");
        assert_eq!(freight.color, "#FF7F0E");
        assert_eq!(freight.frequency, 9);
        assert_eq!(kg.node("flood").unwrap().color, "#999999");
        assert_eq!(kg.clusters(), vec!["Logistics", "Risk"]);
    }

    #[test]
    fn test_repeated_pairs_increase_weight() {
        let kg = fixture();
        assert_eq!(kg.edge_count(), 5);

        let shared = kg.edge("freight", "hub").unwrap();
        assert_eq!(shared.weight, 2);
        assert_eq!(shared.weight_norm, 1.0);
        assert_eq!(kg.edge("hub", "flood").unwrap().weight_norm, 0.5);
        assert!(kg.edge("delivery", "flood").is_none());
    }

    #[test]
    fn test_degrees() {
        let kg = fixture();
        let hub = kg.node_index("hub").unwrap();
        assert_eq!(kg.degree(hub), 3);
        assert_eq!(kg.weighted_degree(hub), 4);
    }

    #[test]
    fn test_empty_clusters() {
        let kg = KeywordGraph::build(&ClusterSet::default(), &ClusterNaming::default());
        assert!(kg.is_empty());
        assert!(kg.clusters().is_empty());
    }
}
