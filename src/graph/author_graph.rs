// file: src/graph/author_graph.rs
// description: weighted co-authorship network
// reference: https://docs.rs/petgraph/latest/petgraph/graph/type.UnGraph.html

use crate::analysis::AuthorMatrix;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap};

#[derive(Debug, Clone, PartialEq)]
pub struct AuthorNode {
    pub name: String,
    pub cluster: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AuthorGraph {
    graph: UnGraph<AuthorNode, usize>,
    index: HashMap<String, NodeIndex>,
}

impl AuthorGraph {
    /// Authors without any co-author are left out of the network.
    pub fn from_matrix(matrix: &AuthorMatrix, labels: Option<&BTreeMap<String, String>>) -> Self {
        let mut ag = Self::default();

        for (a, b, weight) in matrix.pairs() {
            let a = ag.ensure_node(a, labels);
            let b = ag.ensure_node(b, labels);
            ag.graph.add_edge(a, b, weight);
        }
        ag
    }

    fn ensure_node(&mut self, name: &str, labels: Option<&BTreeMap<String, String>>) -> NodeIndex {
        if let Some(&idx) = self.index.get(name) {
            return idx;
        }
        let idx = self.graph.add_node(AuthorNode {
            name: name.to_string(),
            cluster: labels.and_then(|l| l.get(name).cloned()),
        });
        self.index.insert(name.to_string(), idx);
        idx
    }

    pub fn graph(&self) -> &UnGraph<AuthorNode, usize> {
        &self.graph
    }

    pub fn node_index(&self, name: &str) -> Option<NodeIndex> {
        self.index.get(name).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn degree(&self, idx: NodeIndex) -> usize {
        self.graph.edges(idx).count()
    }

    pub fn max_degree(&self) -> usize {
        self.graph
            .node_indices()
            .map(|idx| self.degree(idx))
            .max()
            .unwrap_or(0)
    }

    pub fn max_weight(&self) -> usize {
        self.graph.edge_references().map(|e| *e.weight()).max().unwrap_or(0)
    }

    /// Distinct cluster labels, unlabeled nodes excluded.
    pub fn clusters(&self) -> Vec<&str> {
        let mut labels: Vec<&str> = self
            .graph
            .node_weights()
            .filter_map(|n| n.cluster.as_deref())
            .collect();
        labels.sort_unstable();
        labels.dedup();
        labels
    }
}
