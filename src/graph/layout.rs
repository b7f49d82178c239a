// file: src/graph/layout.rs
// description: 2D node placement for network maps
// reference: Fruchterman & Reingold (1991); Gansner, Koren & North stress majorization (2004)

use crate::config::VisualizationConfig;
use crate::error::{PipelineError, Result};
use petgraph::graph::UnGraph;
use petgraph::visit::EdgeRef;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Serialize;
use std::collections::VecDeque;
use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

const MIN_DISTANCE: f64 = 0.01;
const SPRING_THRESHOLD: f64 = 1e-4;
const STRESS_TOLERANCE: f64 = 1e-5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Layout {
    Spring,
    KamadaKawai,
    Circular,
}

impl FromStr for Layout {
    type Err = PipelineError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "spring" => Ok(Layout::Spring),
            "kamada_kawai" | "kamada-kawai" => Ok(Layout::KamadaKawai),
            "circular" => Ok(Layout::Circular),
            _ => Err(PipelineError::Layout(s.to_string())),
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Layout::Spring => "spring",
            Layout::KamadaKawai => "kamada_kawai",
            Layout::Circular => "circular",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutParams {
    pub seed: u64,
    /// Optimal node distance for the spring layout; `1/sqrt(n)` when unset.
    pub k: Option<f64>,
    pub iterations: usize,
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self {
            seed: 1472,
            k: Some(5.0),
            iterations: 500,
        }
    }
}

impl From<&VisualizationConfig> for LayoutParams {
    fn from(config: &VisualizationConfig) -> Self {
        Self {
            seed: config.layout_seed,
            k: (config.spring_k > 0.0).then_some(config.spring_k),
            iterations: config.iterations,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Positions indexed by node index, scaled into [-1, 1].
pub fn compute_layout<N, E, F>(
    graph: &UnGraph<N, E>,
    layout: Layout,
    params: &LayoutParams,
    weight: F,
) -> Vec<Point>
where
    F: Fn(&E) -> f64,
{
    let n = graph.node_count();
    match n {
        0 => Vec::new(),
        1 => vec![Point::default()],
        _ => match layout {
            Layout::Spring => rescale(spring(graph, params, weight)),
            Layout::KamadaKawai => rescale(kamada_kawai(graph, params.iterations)),
            Layout::Circular => circular(n),
        },
    }
}

pub fn circular(n: usize) -> Vec<Point> {
    if n == 1 {
        return vec![Point::default()];
    }
    (0..n)
        .map(|i| {
            let theta = 2.0 * PI * i as f64 / n as f64;
            Point::new(theta.cos(), theta.sin())
        })
        .collect()
}

/// Centers on the origin and scales so the largest coordinate is 1.
pub fn rescale(mut points: Vec<Point>) -> Vec<Point> {
    if points.is_empty() {
        return points;
    }
    let n = points.len() as f64;
    let cx = points.iter().map(|p| p.x).sum::<f64>() / n;
    let cy = points.iter().map(|p| p.y).sum::<f64>() / n;
    for p in points.iter_mut() {
        p.x -= cx;
        p.y -= cy;
    }

    let lim = points
        .iter()
        .map(|p| p.x.abs().max(p.y.abs()))
        .fold(0.0, f64::max);
    if lim > 0.0 {
        for p in points.iter_mut() {
            p.x /= lim;
            p.y /= lim;
        }
    }
    points
}

fn adjacency<N, E, F>(graph: &UnGraph<N, E>, weight: F) -> Vec<Vec<f64>>
where
    F: Fn(&E) -> f64,
{
    let n = graph.node_count();
    let mut a = vec![vec![0.0; n]; n];
    for edge in graph.edge_references() {
        let (i, j) = (edge.source().index(), edge.target().index());
        if i != j {
            let w = weight(edge.weight());
            a[i][j] += w;
            a[j][i] += w;
        }
    }
    a
}

fn spring<N, E, F>(graph: &UnGraph<N, E>, params: &LayoutParams, weight: F) -> Vec<Point>
where
    F: Fn(&E) -> f64,
{
    let n = graph.node_count();
    let a = adjacency(graph, weight);
    let mut rng = ChaCha8Rng::seed_from_u64(params.seed);
    let mut pos: Vec<Point> = (0..n)
        .map(|_| Point::new(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)))
        .collect();

    let k = params.k.unwrap_or_else(|| (1.0 / n as f64).sqrt());
    let span = |pos: &[Point]| {
        let (min_x, max_x) = pos.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.x), hi.max(p.x)));
        let (min_y, max_y) = pos.iter().fold((f64::MAX, f64::MIN), |(lo, hi), p| (lo.min(p.y), hi.max(p.y)));
        (max_x - min_x).max(max_y - min_y)
    };
    let mut t = span(&pos) * 0.1;
    let dt = t / (params.iterations as f64 + 1.0);

    for _ in 0..params.iterations {
        let mut displacement = vec![Point::default(); n];
        for i in 0..n {
            for j in 0..n {
                if i == j {
                    continue;
                }
                let dx = pos[i].x - pos[j].x;
                let dy = pos[i].y - pos[j].y;
                let distance = (dx * dx + dy * dy).sqrt().max(MIN_DISTANCE);
                // force scales the raw offset, so repulsion falls off as k^2/d
                let force = k * k / (distance * distance) - a[i][j] * distance / k;
                displacement[i].x += dx * force;
                displacement[i].y += dy * force;
            }
        }

        let mut moved = 0.0;
        for (p, d) in pos.iter_mut().zip(&displacement) {
            let mut length = (d.x * d.x + d.y * d.y).sqrt();
            if length < MIN_DISTANCE {
                length = 0.1;
            }
            let step = Point::new(d.x * t / length, d.y * t / length);
            p.x += step.x;
            p.y += step.y;
            moved += step.x * step.x + step.y * step.y;
        }
        t -= dt;

        if moved.sqrt() / (n as f64) < SPRING_THRESHOLD {
            break;
        }
    }
    pos
}

/// Breadth-first hop counts; unreachable pairs get the largest distance plus one.
fn hop_distances<N, E>(graph: &UnGraph<N, E>) -> Vec<Vec<f64>> {
    let n = graph.node_count();
    let mut dist = vec![vec![f64::INFINITY; n]; n];

    for source in graph.node_indices() {
        let row = &mut dist[source.index()];
        row[source.index()] = 0.0;
        let mut queue = VecDeque::from([source]);
        while let Some(node) = queue.pop_front() {
            let d = row[node.index()];
            for next in graph.neighbors(node) {
                if row[next.index()].is_infinite() {
                    row[next.index()] = d + 1.0;
                    queue.push_back(next);
                }
            }
        }
    }

    let max = dist
        .iter()
        .flatten()
        .filter(|d| d.is_finite())
        .fold(0.0, |acc: f64, &d| acc.max(d));
    for d in dist.iter_mut().flatten() {
        if d.is_infinite() {
            *d = max + 1.0;
        }
    }
    dist
}

fn kamada_kawai<N, E>(graph: &UnGraph<N, E>, iterations: usize) -> Vec<Point> {
    let n = graph.node_count();
    let dist = hop_distances(graph);
    let mut pos = circular(n);

    for _ in 0..iterations.max(1) {
        let mut moved = 0.0;
        for i in 0..n {
            let (mut sx, mut sy, mut sw) = (0.0, 0.0, 0.0);
            for j in 0..n {
                if i == j {
                    continue;
                }
                let d = dist[i][j];
                let w = 1.0 / (d * d);
                let dx = pos[i].x - pos[j].x;
                let dy = pos[i].y - pos[j].y;
                let norm = (dx * dx + dy * dy).sqrt().max(1e-9);
                sx += w * (pos[j].x + d * dx / norm);
                sy += w * (pos[j].y + d * dy / norm);
                sw += w;
            }
            if sw > 0.0 {
                let next = Point::new(sx / sw, sy / sw);
                moved += (next.x - pos[i].x).abs() + (next.y - pos[i].y).abs();
                pos[i] = next;
            }
        }
        if moved / (n as f64) < STRESS_TOLERANCE {
            break;
        }
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn path_graph(n: usize) -> UnGraph<(), f64> {
        let mut g = UnGraph::new_undirected();
        let nodes: Vec<_> = (0..n).map(|_| g.add_node(())).collect();
        for w in nodes.windows(2) {
            g.add_edge(w[0], w[1], 1.0);
        }
        g
    }

    fn within_unit_box(points: &[Point]) -> bool {
        points
            .iter()
            .all(|p| p.x.abs() <= 1.0 + 1e-9 && p.y.abs() <= 1.0 + 1e-9)
    }

    #[test]
    fn test_parse_layout() {
        assert_eq!("spring".parse::<Layout>().unwrap(), Layout::Spring);
        assert_eq!("kamada_kawai".parse::<Layout>().unwrap(), Layout::KamadaKawai);
        assert_eq!("Circular".parse::<Layout>().unwrap(), Layout::Circular);
        assert_eq!(Layout::KamadaKawai.to_string(), "kamada_kawai");

        let err = "spectral".parse::<Layout>().unwrap_err();
        assert_eq!(err.to_string(), "Unsupported layout type: spectral");
    }

    #[test]
    fn test_spring_is_seeded() {
        let g = path_graph(6);
        let params = LayoutParams::default();
        let first = compute_layout(&g, Layout::Spring, &params, |w| *w);
        let second = compute_layout(&g, Layout::Spring, &params, |w| *w);

        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
        assert!(within_unit_box(&first));
    }

    #[test]
    fn test_kamada_kawai_orders_path() {
        let g = path_graph(4);
        let pos = compute_layout(&g, Layout::KamadaKawai, &LayoutParams::default(), |w| *w);
        assert!(within_unit_box(&pos));

        let d = |a: usize, b: usize| ((pos[a].x - pos[b].x).powi(2) + (pos[a].y - pos[b].y).powi(2)).sqrt();
        assert!(d(0, 3) > d(0, 1));
        assert!(d(0, 3) > d(1, 2));
    }

    #[test]
    fn test_disconnected_distances() {
        let mut g = path_graph(2);
        g.add_node(());
        let dist = hop_distances(&g);
        assert_eq!(dist[0][1], 1.0);
        assert_eq!(dist[0][2], 2.0);
    }

    #[test]
    fn test_small_graphs() {
        let empty: UnGraph<(), f64> = UnGraph::new_undirected();
        assert!(compute_layout(&empty, Layout::Spring, &LayoutParams::default(), |w| *w).is_empty());
        assert_eq!(
            compute_layout(&path_graph(1), Layout::KamadaKawai, &LayoutParams::default(), |w| *w),
            vec![Point::default()]
        );

        let ring = circular(4);
        assert!((ring[1].y - 1.0).abs() < 1e-12);
    }
}
