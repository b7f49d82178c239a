// file: src/analysis/cluster.rs
// description: k-means clustering of documents and per-cluster keyword ranking
// reference: Lloyd's algorithm with k-means++ seeding (Arthur & Vassilvitskii, 2007)

use crate::analysis::keywords::{KeywordCount, term_frequencies};
use crate::config::ClusteringConfig;
use crate::error::{PipelineError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq)]
pub struct ClusterParams {
    pub n_clusters: usize,
    pub seed: u64,
    pub max_iterations: usize,
    pub top_terms: usize,
}

impl Default for ClusterParams {
    fn default() -> Self {
        Self {
            n_clusters: 6,
            seed: 42,
            max_iterations: 300,
            top_terms: 15,
        }
    }
}

impl From<&ClusteringConfig> for ClusterParams {
    fn from(config: &ClusteringConfig) -> Self {
        Self {
            n_clusters: config.n_clusters,
            seed: config.seed,
            max_iterations: config.max_iterations,
            top_terms: config.top_terms,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KeywordCluster {
    /// Display id, `Cluster 1` for label 0.
    pub id: String,
    pub label: usize,
    pub keywords: Vec<KeywordCount>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ClusterSet {
    pub clusters: Vec<KeywordCluster>,
    /// Cluster label per input document.
    pub assignments: Vec<usize>,
    pub term_frequency: HashMap<String, usize>,
}

impl ClusterSet {
    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn get(&self, id: &str) -> Option<&KeywordCluster> {
        self.clusters.iter().find(|c| c.id == id)
    }
}

type SparseRow = Vec<(usize, f64)>;

/// Bag-of-words rows over a sorted vocabulary.
fn document_matrix(token_lists: &[Vec<String>]) -> (Vec<String>, Vec<SparseRow>) {
    let vocabulary: Vec<String> = token_lists
        .iter()
        .flatten()
        .cloned()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    let index: HashMap<&str, usize> = vocabulary
        .iter()
        .enumerate()
        .map(|(i, t)| (t.as_str(), i))
        .collect();

    let rows = token_lists
        .iter()
        .map(|tokens| {
            let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
            for token in tokens {
                *counts.entry(index[token.as_str()]).or_insert(0.0) += 1.0;
            }
            counts.into_iter().collect()
        })
        .collect();

    (vocabulary, rows)
}

fn squared_distance(row: &SparseRow, row_norm: f64, centroid: &[f64], centroid_norm: f64) -> f64 {
    let dot: f64 = row.iter().map(|&(j, v)| v * centroid[j]).sum();
    (row_norm - 2.0 * dot + centroid_norm).max(0.0)
}

fn densify(row: &SparseRow, dims: usize) -> Vec<f64> {
    let mut dense = vec![0.0; dims];
    for &(j, v) in row {
        dense[j] = v;
    }
    dense
}

struct KMeans<'a> {
    rows: &'a [SparseRow],
    row_norms: Vec<f64>,
    dims: usize,
}

impl<'a> KMeans<'a> {
    fn new(rows: &'a [SparseRow], dims: usize) -> Self {
        let row_norms = rows
            .iter()
            .map(|r| r.iter().map(|&(_, v)| v * v).sum())
            .collect();
        Self {
            rows,
            row_norms,
            dims,
        }
    }

    fn nearest(&self, i: usize, centroids: &[Vec<f64>], norms: &[f64]) -> (usize, f64) {
        let mut best = (0, f64::INFINITY);
        for (c, centroid) in centroids.iter().enumerate() {
            let d = squared_distance(&self.rows[i], self.row_norms[i], centroid, norms[c]);
            if d < best.1 {
                best = (c, d);
            }
        }
        best
    }

    /// k-means++: first center uniform, the rest sampled proportional to squared distance.
    fn seed_centroids(&self, k: usize, rng: &mut ChaCha8Rng) -> Vec<Vec<f64>> {
        let n = self.rows.len();
        let mut centroids = vec![densify(&self.rows[rng.gen_range(0..n)], self.dims)];
        let mut norms = vec![norm(&centroids[0])];

        while centroids.len() < k {
            let distances: Vec<f64> = (0..n)
                .map(|i| self.nearest(i, &centroids, &norms).1)
                .collect();
            let total: f64 = distances.iter().sum();

            let chosen = if total <= 0.0 {
                rng.gen_range(0..n)
            } else {
                let mut target = rng.gen_range(0.0..total);
                let mut chosen = n - 1;
                for (i, d) in distances.iter().enumerate() {
                    if target < *d {
                        chosen = i;
                        break;
                    }
                    target -= d;
                }
                chosen
            };

            let centroid = densify(&self.rows[chosen], self.dims);
            norms.push(norm(&centroid));
            centroids.push(centroid);
        }
        centroids
    }

    fn fit(&self, k: usize, max_iterations: usize, rng: &mut ChaCha8Rng) -> Vec<usize> {
        let mut centroids = self.seed_centroids(k, rng);
        let mut norms: Vec<f64> = centroids.iter().map(|c| norm(c)).collect();
        let mut labels: Vec<usize> = Vec::new();

        for iteration in 0..max_iterations.max(1) {
            let next: Vec<usize> = (0..self.rows.len())
                .map(|i| self.nearest(i, &centroids, &norms).0)
                .collect();

            if next == labels {
                debug!("k-means converged after {} iterations", iteration);
                break;
            }
            labels = next;

            let mut sums = vec![vec![0.0; self.dims]; k];
            let mut sizes = vec![0usize; k];
            for (i, &label) in labels.iter().enumerate() {
                sizes[label] += 1;
                for &(j, v) in &self.rows[i] {
                    sums[label][j] += v;
                }
            }
            for c in 0..k {
                // empty clusters keep their previous centroid
                if sizes[c] > 0 {
                    centroids[c] = sums[c].iter().map(|v| v / sizes[c] as f64).collect();
                    norms[c] = norm(&centroids[c]);
                }
            }
        }
        labels
    }
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum()
}

/// Clusters documents by their terms and ranks each cluster's vocabulary by global frequency.
pub fn cluster_keywords(token_lists: &[Vec<String>], params: &ClusterParams) -> Result<ClusterSet> {
    if params.n_clusters == 0 {
        return Err(PipelineError::Analysis(
            "n_clusters must be at least 1".to_string(),
        ));
    }

    let non_empty = token_lists.iter().filter(|t| !t.is_empty()).count();
    if non_empty == 0 {
        return Ok(ClusterSet::default());
    }

    let k = params.n_clusters.min(non_empty);
    if k < params.n_clusters {
        info!(
            "Only {} non-empty documents; clustering into {} instead of {} clusters",
            non_empty, k, params.n_clusters
        );
    }

    let (vocabulary, rows) = document_matrix(token_lists);
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let assignments = KMeans::new(&rows, vocabulary.len()).fit(k, params.max_iterations, &mut rng);

    let term_frequency = term_frequencies(token_lists);
    let mut cluster_terms: BTreeMap<usize, BTreeSet<&str>> = BTreeMap::new();
    for (tokens, &label) in token_lists.iter().zip(&assignments) {
        if tokens.is_empty() {
            continue;
        }
        cluster_terms
            .entry(label)
            .or_default()
            .extend(tokens.iter().map(String::as_str));
    }

    let clusters = cluster_terms
        .into_iter()
        .map(|(label, terms)| {
            let mut keywords: Vec<KeywordCount> = terms
                .into_iter()
                .map(|term| KeywordCount {
                    term: term.to_string(),
                    count: term_frequency.get(term).copied().unwrap_or(0),
                })
                .collect();
            keywords.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.term.cmp(&b.term)));
            keywords.truncate(params.top_terms);

            KeywordCluster {
                id: format!("Cluster {}", label + 1),
                label,
                keywords,
            }
        })
        .collect::<Vec<_>>();

    info!(
        "Clustered {} documents into {} keyword clusters",
        token_lists.len(),
        clusters.len()
    );

    Ok(ClusterSet {
        clusters,
        assignments,
        term_frequency,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn tokens(docs: &[&str]) -> Vec<Vec<String>> {
        docs.iter()
            .map(|d| d.split_whitespace().map(str::to_string).collect())
            .collect()
    }

    fn params(n_clusters: usize) -> ClusterParams {
        ClusterParams {
            n_clusters,
            ..ClusterParams::default()
        }
    }

    #[test]
    fn test_separates_distinct_topics() {
        let docs = tokens(&[
            "freight hub freight delivery",
            "freight hub delivery",
            "flood risk storm",
            "storm flood risk flood",
        ]);

        let set = cluster_keywords(&docs, &params(2)).unwrap();

        assert_eq!(set.len(), 2);
        assert_eq!(set.assignments[0], set.assignments[1]);
        assert_eq!(set.assignments[2], set.assignments[3]);
        assert_ne!(set.assignments[0], set.assignments[2]);

        let freight = set.clusters.iter().find(|c| c.label == set.assignments[0]).unwrap();
        let terms: Vec<&str> = freight.keywords.iter().map(|k| k.term.as_str()).collect();
        assert_eq!(terms, vec!["freight", "delivery", "hub"]);
        assert_eq!(freight.keywords[0].count, 3);
    }

    #[test]
    fn test_same_seed_same_result() {
        let docs = tokens(&["a b", "b c", "c d", "d e", "e f", "f a"]);
        let first = cluster_keywords(&docs, &params(3)).unwrap();
        let second = cluster_keywords(&docs, &params(3)).unwrap();
        assert_eq!(first.assignments, second.assignments);
        assert_eq!(first.clusters, second.clusters);
    }

    #[test]
    fn test_k_clamped_to_documents() {
        let docs = tokens(&["urban hub", "", "rural depot"]);
        let set = cluster_keywords(&docs, &params(6)).unwrap();
        assert!(set.len() <= 2);
        assert_eq!(set.assignments.len(), 3);
    }

    #[test]
    fn test_top_terms_truncation() {
        let docs = tokens(&["a b c d e f g"]);
        let set = cluster_keywords(
            &docs,
            &ClusterParams {
                n_clusters: 1,
                top_terms: 3,
                ..ClusterParams::default()
            },
        )
        .unwrap();
        assert_eq!(set.clusters[0].id, "Cluster 1");
        assert_eq!(set.clusters[0].keywords.len(), 3);
    }

    #[test]
    fn test_empty_input() {
        assert!(cluster_keywords(&[], &params(3)).unwrap().is_empty());
        assert!(cluster_keywords(&tokens(&["", ""]), &params(3)).unwrap().is_empty());
    }

    #[test]
    fn test_zero_clusters_rejected() {
        assert!(cluster_keywords(&tokens(&["a"]), &params(0)).is_err());
    }
}
