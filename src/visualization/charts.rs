// file: src/visualization/charts.rs
// description: keyword bar charts and VOS-style network maps rendered to SVG
// reference: VOSviewer map conventions (van Eck & Waltman, 2010)

use crate::analysis::{ClusterNaming, ClusterSet, KeywordCount};
use crate::config::VisualizationConfig;
use crate::error::{PipelineError, Result};
use crate::graph::{AuthorGraph, KeywordGraph, Point};
use crate::visualization::style::{
    SizingMode, bucket_size, compute_opacity, compute_thickness, font_size_from_node_size,
    hls_palette, log_marker_size, radius_from_area, tab10,
};
use crate::visualization::svg::{Anchor, SvgCanvas, TextStyle};
use petgraph::visit::EdgeRef;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use tracing::info;

const BAR_COLOR: &str = "#87ceeb";
const AXIS_COLOR: &str = "#333333";
const GRID_COLOR: &str = "#e5e5e5";
const SAME_CLUSTER_EDGE: &str = "#222222";
const CROSS_CLUSTER_EDGE: &str = "#9a9a9a";
const UNCLUSTERED: &str = "#7f7f7f";
const FALLBACK_COLOR: &str = "#999999";
const LEGEND_WIDTH: f64 = 280.0;
const EDGE_CURVATURE: f64 = 0.1;
const MIN_HULL_NODES: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub struct MapStyle {
    pub sizing: SizingMode,
    pub node_scale: f64,
    pub strong_edge_scale: f64,
    pub weak_edge_scale: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for MapStyle {
    fn default() -> Self {
        Self {
            sizing: SizingMode::Frequency,
            node_scale: 1.0,
            strong_edge_scale: 0.25,
            weak_edge_scale: 0.25,
            width: 1200.0,
            height: 800.0,
        }
    }
}

impl MapStyle {
    pub fn from_config(config: &VisualizationConfig) -> Result<Self> {
        Ok(Self {
            sizing: config.sizing_mode.parse()?,
            node_scale: config.node_scale,
            width: f64::from(config.width),
            height: f64::from(config.height),
            ..Self::default()
        })
    }
}

/// Maps layout coordinates in [-1, 1] onto a pixel rectangle, y pointing up.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl Viewport {
    fn project(&self, p: Point) -> (f64, f64) {
        (
            self.left + (p.x + 1.0) / 2.0 * self.width,
            self.top + (1.0 - (p.y + 1.0) / 2.0) * self.height,
        )
    }
}

fn map_viewport(width: f64, height: f64) -> Viewport {
    let margin = 60.0;
    Viewport {
        left: margin,
        top: margin,
        width: (width - LEGEND_WIDTH - 2.0 * margin).max(100.0),
        height: (height - 2.0 * margin).max(100.0),
    }
}

fn check_positions(expected: usize, positions: &[Point]) -> Result<()> {
    if positions.len() != expected {
        return Err(PipelineError::Validation(format!(
            "Layout has {} positions for {} nodes",
            positions.len(),
            expected
        )));
    }
    Ok(())
}

/// Control point offset sideways by a fraction of the edge length.
fn arc_control(from: (f64, f64), to: (f64, f64), rad: f64) -> (f64, f64) {
    let (mx, my) = ((from.0 + to.0) / 2.0, (from.1 + to.1) / 2.0);
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    (mx + rad * dy, my - rad * dx)
}

fn cross(o: (f64, f64), a: (f64, f64), b: (f64, f64)) -> f64 {
    (a.0 - o.0) * (b.1 - o.1) - (a.1 - o.1) * (b.0 - o.0)
}

/// Andrew's monotone chain; fewer than three distinct points yields them unchanged.
pub fn convex_hull(points: &[(f64, f64)]) -> Vec<(f64, f64)> {
    let mut pts = points.to_vec();
    pts.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    pts.dedup();
    if pts.len() < 3 {
        return pts;
    }

    let mut lower: Vec<(f64, f64)> = Vec::new();
    for &p in &pts {
        while lower.len() >= 2 && cross(lower[lower.len() - 2], lower[lower.len() - 1], p) <= 0.0 {
            lower.pop();
        }
        lower.push(p);
    }
    let mut upper: Vec<(f64, f64)> = Vec::new();
    for &p in pts.iter().rev() {
        while upper.len() >= 2 && cross(upper[upper.len() - 2], upper[upper.len() - 1], p) <= 0.0 {
            upper.pop();
        }
        upper.push(p);
    }
    lower.pop();
    upper.pop();
    lower.extend(upper);
    lower
}

fn legend(canvas: &mut SvgCanvas, title: &str, entries: &[(String, String)]) {
    let x = canvas.width() - LEGEND_WIDTH + 10.0;
    let mut y = 60.0;
    canvas.text(x, y, title, &TextStyle::sized(12.0).bold());
    for (label, color) in entries {
        y += 20.0;
        canvas.circle(x + 6.0, y - 4.0, 6.0, color, color, 1.0);
        canvas.text(x + 18.0, y, label, &TextStyle::sized(10.0));
    }
}

fn nice_max(value: usize) -> usize {
    match value {
        0 => 1,
        v if v <= 10 => v,
        v => {
            let step = 10usize.pow((v as f64).log10().floor() as u32 - 1).max(1) * 5;
            v.div_ceil(step) * step
        }
    }
}

fn value_ticks(max: usize) -> Vec<usize> {
    let step = (max / 5).max(1);
    (0..=max).step_by(step).collect()
}

/// Horizontal bars, most frequent keyword on top.
pub fn plot_keywords(keywords: &[KeywordCount], top_n: usize, path: &Path) -> Result<()> {
    let top: Vec<&KeywordCount> = keywords.iter().take(top_n).collect();
    if top.is_empty() {
        return Err(PipelineError::Validation("No keywords to plot".to_string()));
    }

    let row = 24.0;
    let (left, right, top_margin) = (160.0, 40.0, 50.0);
    let width = 1000.0;
    let plot_height = row * top.len() as f64;
    let height = top_margin + plot_height + 60.0;
    let plot_width = width - left - right;

    let max = nice_max(top.iter().map(|k| k.count).max().unwrap_or(1));
    let x_for = |v: usize| left + v as f64 / max as f64 * plot_width;

    let mut canvas = SvgCanvas::new(width, height);
    canvas.title("Top Keywords in Abstracts");

    for tick in value_ticks(max) {
        let x = x_for(tick);
        canvas.line(x, top_margin, x, top_margin + plot_height, GRID_COLOR, 1.0);
        canvas.text(
            x,
            top_margin + plot_height + 16.0,
            &tick.to_string(),
            &TextStyle::sized(10.0).anchor(Anchor::Middle),
        );
    }

    for (i, keyword) in top.iter().enumerate() {
        let y = top_margin + i as f64 * row;
        canvas.rect(left, y + 3.0, x_for(keyword.count) - left, row - 6.0, BAR_COLOR, None);
        canvas.text(
            left - 8.0,
            y + row / 2.0 + 4.0,
            &keyword.term,
            &TextStyle::sized(11.0).anchor(Anchor::End),
        );
    }

    canvas.line(left, top_margin, left, top_margin + plot_height, AXIS_COLOR, 1.0);
    canvas.text(
        left + plot_width / 2.0,
        height - 12.0,
        "Frequency",
        &TextStyle::sized(12.0).anchor(Anchor::Middle),
    );

    canvas.save(path)?;
    info!("Keyword chart saved to {}", path.display());
    Ok(())
}

/// Keyword frequencies grouped by theme; one bar per theme that holds the keyword.
pub fn plot_theme_clusters(clusters: &ClusterSet, naming: &ClusterNaming, path: &Path) -> Result<()> {
    let mut themes: BTreeMap<&str, HashMap<&str, usize>> = BTreeMap::new();
    let mut keywords: Vec<&str> = Vec::new();
    for cluster in &clusters.clusters {
        let theme = themes.entry(naming.label_for(&cluster.id)).or_default();
        for kw in &cluster.keywords {
            theme.entry(kw.term.as_str()).or_insert(kw.count);
            if !keywords.contains(&kw.term.as_str()) {
                keywords.push(kw.term.as_str());
            }
        }
    }
    if keywords.is_empty() {
        return Err(PipelineError::Validation("No clustered keywords to plot".to_string()));
    }

    let theme_names: Vec<&str> = themes.keys().copied().collect();
    let palette = hls_palette(theme_names.len());
    let color_of: HashMap<&str, String> = theme_names
        .iter()
        .zip(palette)
        .map(|(name, hls)| {
            let color = naming
                .color_for(name)
                .filter(|c| *c != FALLBACK_COLOR)
                .map(str::to_string)
                .unwrap_or(hls);
            (*name, color)
        })
        .collect();

    let group = 18.0 + 8.0 * theme_names.len() as f64;
    let (left, top_margin, bottom) = (60.0, 50.0, 120.0);
    let plot_width = group * keywords.len() as f64;
    let width = (left + plot_width + LEGEND_WIDTH + 20.0).max(900.0);
    let plot_height = 400.0;
    let height = top_margin + plot_height + bottom;

    let max = nice_max(
        themes
            .values()
            .flat_map(|t| t.values().copied())
            .max()
            .unwrap_or(1),
    );
    let y_for = |v: usize| top_margin + plot_height - v as f64 / max as f64 * plot_height;

    let mut canvas = SvgCanvas::new(width, height);
    canvas.title("Keyword Frequencies by Theme");

    for tick in value_ticks(max) {
        let y = y_for(tick);
        canvas.line(left, y, left + plot_width, y, GRID_COLOR, 1.0);
        canvas.text(left - 6.0, y + 4.0, &tick.to_string(), &TextStyle::sized(10.0).anchor(Anchor::End));
    }

    let bar_width = (group - 10.0) / theme_names.len() as f64;
    for (i, keyword) in keywords.iter().enumerate() {
        let x0 = left + i as f64 * group + 5.0;
        for (j, theme) in theme_names.iter().enumerate() {
            if let Some(&count) = themes[theme].get(keyword) {
                let y = y_for(count);
                canvas.rect(
                    x0 + j as f64 * bar_width,
                    y,
                    bar_width,
                    top_margin + plot_height - y,
                    &color_of[theme],
                    None,
                );
            }
        }
        canvas.text(
            x0 + group / 2.0,
            top_margin + plot_height + 14.0,
            keyword,
            &TextStyle::sized(10.0).anchor(Anchor::End).rotate(-45.0),
        );
    }

    canvas.line(left, top_margin + plot_height, left + plot_width, top_margin + plot_height, AXIS_COLOR, 1.0);
    canvas.text(
        18.0,
        top_margin + plot_height / 2.0,
        "Frequency",
        &TextStyle::sized(12.0).anchor(Anchor::Middle).rotate(-90.0),
    );

    let entries: Vec<(String, String)> = theme_names
        .iter()
        .map(|t| (t.to_string(), color_of[t].clone()))
        .collect();
    legend(&mut canvas, "Theme", &entries);

    canvas.save(path)?;
    info!("Theme cluster chart saved to {}", path.display());
    Ok(())
}

/// One color per cluster label: the theme color, or an hls color for unthemed labels.
pub fn cluster_colors(kg: &KeywordGraph) -> BTreeMap<String, String> {
    let labels = kg.clusters();
    let palette = hls_palette(labels.len());
    labels
        .iter()
        .zip(palette)
        .map(|(label, hls)| {
            let theme_color = kg
                .graph()
                .node_weights()
                .find(|n| n.cluster == *label)
                .map(|n| n.color.as_str())
                .filter(|c| *c != FALLBACK_COLOR);
            (label.to_string(), theme_color.map(str::to_string).unwrap_or(hls))
        })
        .collect()
}

/// Keyword co-occurrence network with cluster hulls, curved edges and a legend.
pub fn plot_vos_map(kg: &KeywordGraph, positions: &[Point], style: &MapStyle, path: &Path) -> Result<()> {
    check_positions(kg.node_count(), positions)?;
    if kg.is_empty() {
        return Err(PipelineError::Validation("Keyword graph is empty".to_string()));
    }

    let graph = kg.graph();
    let viewport = map_viewport(style.width, style.height);
    let colors = cluster_colors(kg);
    let pixel: Vec<(f64, f64)> = positions.iter().map(|&p| viewport.project(p)).collect();

    // (radius, marker area) per node
    let sizes: Vec<(f64, f64)> = graph
        .node_indices()
        .map(|idx| {
            let area = match style.sizing {
                SizingMode::Frequency => bucket_size(graph[idx].frequency, style.node_scale),
                SizingMode::CoOccurrence => {
                    let d = log_marker_size(kg.weighted_degree(idx) as f64) * style.node_scale;
                    d * d
                }
                SizingMode::Uniform => (10.0 * style.node_scale).powi(2),
            };
            (radius_from_area(area), area)
        })
        .collect();

    let mut canvas = SvgCanvas::new(style.width, style.height);
    canvas.title(&format!("VOS-style Keyword Map ({})", style.sizing));

    for (label, color) in &colors {
        let members: Vec<(f64, f64)> = graph
            .node_indices()
            .filter(|&idx| graph[idx].cluster == *label)
            .map(|idx| pixel[idx.index()])
            .collect();
        if members.len() >= MIN_HULL_NODES {
            canvas.polygon(&convex_hull(&members), color, 0.15);
        }
    }

    for edge in graph.edge_references() {
        let (a, b) = (edge.source(), edge.target());
        let weight = edge.weight().weight_norm;
        let stroke = if kg.same_cluster(a, b) {
            SAME_CLUSTER_EDGE
        } else {
            CROSS_CLUSTER_EDGE
        };
        let (from, to) = (pixel[a.index()], pixel[b.index()]);
        canvas.curve(
            from,
            arc_control(from, to, EDGE_CURVATURE),
            to,
            stroke,
            compute_thickness(weight, style.strong_edge_scale, style.weak_edge_scale),
            compute_opacity(weight, 1.0, 1.0).max(0.15),
        );
    }

    for idx in graph.node_indices() {
        let (x, y) = pixel[idx.index()];
        let color = colors
            .get(&graph[idx].cluster)
            .map(String::as_str)
            .unwrap_or(UNCLUSTERED);
        canvas.circle(x, y, sizes[idx.index()].0, color, "#000000", 0.85);
    }

    for idx in graph.node_indices() {
        let (x, y) = pixel[idx.index()];
        let font = font_size_from_node_size(sizes[idx.index()].1);
        canvas.text(
            x,
            y + font / 3.0,
            &graph[idx].term,
            &TextStyle::sized(font).anchor(Anchor::Middle).bold(),
        );
    }

    let entries: Vec<(String, String)> = colors.into_iter().collect();
    legend(&mut canvas, "Cluster", &entries);

    canvas.save(path)?;
    info!(
        "Keyword map with {} nodes saved to {}",
        kg.node_count(),
        path.display()
    );
    Ok(())
}

/// Co-authorship network: node size and label font by degree, edge width by weight.
pub fn plot_author_map(ag: &AuthorGraph, positions: &[Point], width: f64, height: f64, path: &Path) -> Result<()> {
    check_positions(ag.node_count(), positions)?;
    if ag.is_empty() {
        return Err(PipelineError::Validation("Co-authorship graph is empty".to_string()));
    }

    let graph = ag.graph();
    let viewport = map_viewport(width, height);
    let pixel: Vec<(f64, f64)> = positions.iter().map(|&p| viewport.project(p)).collect();

    let colors: BTreeMap<&str, &str> = ag
        .clusters()
        .into_iter()
        .enumerate()
        .map(|(i, label)| (label, tab10(i)))
        .collect();
    let color_of = |idx: petgraph::graph::NodeIndex| {
        graph[idx]
            .cluster
            .as_deref()
            .and_then(|c| colors.get(c).copied())
            .unwrap_or(UNCLUSTERED)
    };

    let max_weight = ag.max_weight().max(1) as f64;
    let max_degree = ag.max_degree().max(1) as f64;

    let mut canvas = SvgCanvas::new(width, height);
    canvas.title("Author Co-Authorship Network");

    for edge in graph.edge_references() {
        let (from, to) = (pixel[edge.source().index()], pixel[edge.target().index()]);
        let stroke_width = 0.5 + 4.0 * (*edge.weight() as f64 / max_weight);
        canvas.curve(from, arc_control(from, to, 0.0), to, color_of(edge.source()), stroke_width, 0.4);
    }

    for idx in graph.node_indices() {
        let (x, y) = pixel[idx.index()];
        let degree = ag.degree(idx) as f64;
        let radius = radius_from_area(300.0 + 100.0 * degree);
        canvas.circle(x, y, radius, color_of(idx), "#000000", 0.9);

        let font = 6.0 + 2.0 * degree / max_degree;
        canvas.text(x, y, &graph[idx].name, &TextStyle::sized(font).anchor(Anchor::Middle));
        if let Some(cluster) = &graph[idx].cluster {
            canvas.text(
                x,
                y + font + 1.0,
                &format!("[{}]", cluster),
                &TextStyle::sized(font).anchor(Anchor::Middle),
            );
        }
    }

    let entries: Vec<(String, String)> = colors
        .iter()
        .map(|(label, color)| (label.to_string(), color.to_string()))
        .collect();
    if !entries.is_empty() {
        legend(&mut canvas, "Author Fields", &entries);
    }

    canvas.save(path)?;
    info!("Co-authorship map saved to {}", path.display());
    Ok(())
}
