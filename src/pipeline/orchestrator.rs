// file: src/pipeline/orchestrator.rs
// description: coordinates loading, screening, PRISMA counting, analysis and rendering
// reference: linear review workflow from export files to charts

use crate::analysis::{
    ClusterNaming, ClusterParams, ClusterSet, KeywordCount, Tokenizer, build_author_matrix,
    cluster_authors, cluster_keywords, extract_keywords, name_clusters,
};
use crate::cleaning::{RecordNormalizer, clean_records};
use crate::config::Config;
use crate::error::{PipelineError, Result};
use crate::exporter::GraphExporter;
use crate::graph::{AuthorGraph, CoOccurrence, KeywordGraph, LayoutParams, compute_layout};
use crate::models::{Criteria, Record, ThemeMap};
use crate::parser::MendeleyParser;
use crate::pipeline::progress::PipelineStats;
use crate::prisma::{DecisionLog, PrismaCounts, PrismaDiagram, update_counts};
use crate::screening::{Screener, ScreeningOutcome};
use crate::sources::load_input;
use crate::visualization::{MapStyle, plot_author_map, plot_keywords, plot_theme_clusters, plot_vos_map};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const INCLUDED_RECORDS: &str = "included_records.json";
pub const KEYWORD_CHART: &str = "keywords.svg";
pub const THEME_CHART: &str = "theme_clusters.svg";
pub const VOS_MAP: &str = "vos_map.svg";
pub const AUTHOR_MAP: &str = "author_map.svg";

#[derive(Debug, Clone)]
pub struct ClusterReport {
    pub clusters: ClusterSet,
    pub naming: ClusterNaming,
    pub nodes: usize,
    pub edges: usize,
    pub outputs: Vec<PathBuf>,
}

#[derive(Debug, Clone, Default)]
pub struct AuthorReport {
    pub authors: usize,
    pub pairs: usize,
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct RunSummary {
    pub identified: usize,
    pub included: usize,
    pub counts: PrismaCounts,
    pub keywords: usize,
    pub clusters: usize,
    pub authors: usize,
    pub outputs: Vec<PathBuf>,
    #[serde(skip)]
    pub stats: PipelineStats,
}

pub struct Pipeline {
    config: Config,
    show_progress: bool,
    colored: bool,
}

fn write_records(records: &[Record], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|e| PipelineError::file_operation(parent, e))?;
    }
    let json = serde_json::to_string_pretty(records)?;
    fs::write(path, json).map_err(|e| PipelineError::file_operation(path, e))
}

fn read_records(path: &Path, hint: &str) -> Result<Vec<Record>> {
    if !path.exists() {
        return Err(PipelineError::Validation(format!(
            "Missing {}. {}",
            path.display(),
            hint
        )));
    }
    let raw = fs::read_to_string(path).map_err(|e| PipelineError::file_operation(path, e))?;
    MendeleyParser::new().parse(&raw)
}

impl Pipeline {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            show_progress: false,
            colored: true,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn with_color(mut self, colored: bool) -> Self {
        self.colored = colored;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn output_path(&self, file_name: &str) -> PathBuf {
        self.config.paths.output_dir.join(file_name)
    }

    /// Files the pipeline writes, which a directory scan must not read back as exports.
    fn written_paths(&self) -> Vec<PathBuf> {
        let paths = &self.config.paths;
        vec![
            paths.cleaned_metadata.clone(),
            paths.decisions_log.clone(),
            paths.counts.clone(),
            paths.prisma_csv.clone(),
            paths.output_dir.clone(),
        ]
    }

    fn tokenizer(&self) -> Tokenizer {
        Tokenizer::new().with_extra_stopwords(&self.config.keywords.extra_stopwords)
    }

    /// Configured theme map, or the bundled one when none is set or the file is missing.
    pub fn theme_map(&self) -> Result<ThemeMap> {
        match &self.config.paths.theme_map {
            Some(path) if path.exists() => ThemeMap::load(path),
            Some(path) => {
                warn!(
                    "Theme map {} not found; using the bundled logistics review themes",
                    path.display()
                );
                ThemeMap::builtin()
            }
            None => ThemeMap::builtin(),
        }
    }

    /// Reads the configured exports, normalizes them and writes the cleaned metadata.
    pub fn load(&self) -> Result<Vec<Record>> {
        let paths = &self.config.paths;
        let loaded = load_input(&paths.input, &paths.skip_patterns, &self.written_paths())?;

        let normalizer = RecordNormalizer::new();
        let records: Vec<Record> = loaded.into_iter().map(|r| normalizer.normalize(r)).collect();
        let without_abstract = records.iter().filter(|r| r.abstract_text.is_empty()).count();
        if without_abstract > 0 {
            warn!("{} records have no abstract", without_abstract);
        }

        write_records(&records, &paths.cleaned_metadata)?;
        info!(
            "Saved {} records to {}",
            records.len(),
            paths.cleaned_metadata.display()
        );
        Ok(records)
    }

    pub fn load_cleaned(&self) -> Result<Vec<Record>> {
        read_records(
            &self.config.paths.cleaned_metadata,
            "Run the `load` command first.",
        )
    }

    pub fn load_included(&self) -> Result<Vec<Record>> {
        read_records(
            &self.output_path(INCLUDED_RECORDS),
            "Run the `screen` command first.",
        )
    }

    /// Exports loaded directly and cleaned, without screening.
    pub fn load_adhoc(&self, input: &Path) -> Result<Vec<Record>> {
        let outcome = clean_records(load_input(
            input,
            &self.config.paths.skip_patterns,
            &self.written_paths(),
        )?);
        if !outcome.dropped.is_empty() {
            info!("Dropped {} records without abstract", outcome.dropped.len());
        }
        Ok(outcome.kept)
    }

    /// Screens records, rewrites the decision log and saves the included records.
    pub fn screen(&self, records: Vec<Record>) -> Result<ScreeningOutcome> {
        let criteria = Criteria::load(&self.config.paths.criteria);
        let outcome = Screener::new(self.config.screening.clone(), criteria)
            .with_progress(self.show_progress)
            .with_color(self.colored)
            .run(records);

        let log = DecisionLog::new(&self.config.paths.decisions_log);
        log.reset()?;
        log.append_all(&outcome.decisions)?;
        info!(
            "Logged {} decisions to {}",
            outcome.decisions.len(),
            log.path().display()
        );

        write_records(&outcome.included, &self.output_path(INCLUDED_RECORDS))?;
        Ok(outcome)
    }

    pub fn count(&self) -> Result<PrismaCounts> {
        let paths = &self.config.paths;
        update_counts(&paths.cleaned_metadata, &paths.decisions_log, &paths.counts)
    }

    pub fn prisma_csv(&self) -> Result<PrismaCounts> {
        let paths = &self.config.paths;
        PrismaDiagram::generate_csv(&paths.counts, &paths.prisma_csv)
    }

    /// Re-screens the cleaned metadata, then recounts and regenerates the diagram CSV.
    pub fn refresh(&self) -> Result<PrismaCounts> {
        let records = self.load_cleaned()?;
        self.screen(records)?;
        self.count()?;
        self.prisma_csv()
    }

    pub fn keywords(&self, records: &[Record]) -> Result<(Vec<KeywordCount>, Vec<PathBuf>)> {
        let settings = &self.config.keywords;
        let keywords = extract_keywords(records, &self.tokenizer(), settings.top_n, settings.max_features);
        let mut outputs = Vec::new();

        if keywords.is_empty() {
            warn!("No keywords found in {} records", records.len());
            return Ok((keywords, outputs));
        }

        let exporter = GraphExporter::new(&self.config.paths.output_dir)?;
        outputs.push(exporter.export_keywords(&keywords)?);

        let chart = self.output_path(KEYWORD_CHART);
        plot_keywords(&keywords, settings.top_n, &chart)?;
        outputs.push(chart);
        Ok((keywords, outputs))
    }

    /// Clusters abstracts, names the clusters and renders the keyword map.
    pub fn cluster(&self, records: &[Record]) -> Result<ClusterReport> {
        let tokenizer = self.tokenizer();
        let token_lists: Vec<Vec<String>> = records
            .iter()
            .map(|r| tokenizer.tokenize(&r.abstract_text))
            .collect();

        let clusters = cluster_keywords(&token_lists, &ClusterParams::from(&self.config.clustering))?;
        let naming = name_clusters(&clusters, &self.theme_map()?);
        let graph = KeywordGraph::build(&clusters, &naming);

        let mut report = ClusterReport {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
            clusters,
            naming,
            outputs: Vec::new(),
        };
        if report.clusters.is_empty() || graph.is_empty() {
            warn!("Nothing to cluster in {} records", records.len());
            return Ok(report);
        }

        let layout = self.config.layout()?;
        let positions = compute_layout(
            graph.graph(),
            layout,
            &LayoutParams::from(&self.config.visualization),
            |e: &CoOccurrence| e.weight as f64,
        );

        let vos_map = self.output_path(VOS_MAP);
        plot_vos_map(&graph, &positions, &MapStyle::from_config(&self.config.visualization)?, &vos_map)?;
        report.outputs.push(vos_map);

        let theme_chart = self.output_path(THEME_CHART);
        plot_theme_clusters(&report.clusters, &report.naming, &theme_chart)?;
        report.outputs.push(theme_chart);

        let exporter = GraphExporter::new(&self.config.paths.output_dir)?;
        report.outputs.push(exporter.export_keyword_map(&graph, &positions, layout)?);
        report
            .outputs
            .push(exporter.export_clusters(&report.clusters, &report.naming)?);

        Ok(report)
    }

    /// Co-authorship network with authors grouped by the themes they write about.
    pub fn authors(&self, records: &[Record]) -> Result<AuthorReport> {
        let matrix = build_author_matrix(records);
        let mut report = AuthorReport {
            authors: matrix.author_count(),
            pairs: matrix.pairs().count(),
            output: None,
        };
        if matrix.is_empty() {
            warn!("No co-authored records; skipping the author map");
            return Ok(report);
        }

        let (clusters, set) = cluster_authors(
            records,
            &self.tokenizer(),
            &ClusterParams::from(&self.config.clustering),
        )?;
        let naming = name_clusters(&set, &self.theme_map()?);
        let labels: BTreeMap<String, String> = clusters
            .into_iter()
            .map(|(author, cluster)| {
                let label = naming.label_for(&cluster).to_string();
                (author, label)
            })
            .collect();

        let graph = AuthorGraph::from_matrix(&matrix, Some(&labels));
        let positions = compute_layout(
            graph.graph(),
            self.config.layout()?,
            &LayoutParams::from(&self.config.visualization),
            |w: &usize| *w as f64,
        );

        let path = self.output_path(AUTHOR_MAP);
        let viz = &self.config.visualization;
        plot_author_map(&graph, &positions, f64::from(viz.width), f64::from(viz.height), &path)?;
        report.output = Some(path);
        Ok(report)
    }

    /// Every stage in order, from export files to charts.
    pub fn run(&self) -> Result<RunSummary> {
        info!("Starting literature review pipeline");

        let records = self.load()?;
        let identified = records.len();

        let outcome = self.screen(records)?;
        let counts = self.count()?;
        self.prisma_csv()?;

        let mut summary = RunSummary {
            identified,
            included: outcome.included.len(),
            counts,
            stats: outcome.stats.clone(),
            outputs: vec![
                self.config.paths.cleaned_metadata.clone(),
                self.config.paths.decisions_log.clone(),
                self.config.paths.counts.clone(),
                self.config.paths.prisma_csv.clone(),
            ],
            ..RunSummary::default()
        };

        if outcome.included.is_empty() {
            warn!("No records passed screening; skipping keyword analysis");
            return Ok(summary);
        }

        let (keywords, outputs) = self.keywords(&outcome.included)?;
        summary.keywords = keywords.len();
        summary.outputs.extend(outputs);

        let report = self.cluster(&outcome.included)?;
        summary.clusters = report.clusters.len();
        summary.outputs.extend(report.outputs);

        let authors = self.authors(&outcome.included)?;
        summary.authors = authors.authors;
        summary.outputs.extend(authors.output);

        info!(
            "Pipeline complete: {} identified, {} included, {} clusters",
            summary.identified, summary.included, summary.clusters
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Decision, Stage};
    use tempfile::TempDir;

    const EXPORT: &str = "\
TY  - JOUR
TI  - Urban freight consolidation hubs
AU  - Silva, Ana
AU  - Park, Jo
PY  - 2021
AB  - Urban freight hubs consolidate parcel delivery and reduce delivery traffic in the city.
KW  - freight
ER  -
TY  - JOUR
TI  - Urban freight consolidation hubs
AU  - Silva, Ana
PY  - 2021
AB  - Duplicate entry of the same paper.
ER  -
TY  - JOUR
TI  - Flood risk for kerbside logistics
AU  - Park, Jo
AU  - Lee, Min
PY  - 2019
AB  - Storm flood risk disrupts kerbside delivery and pedestrian safety in urban streets.
ER  -
TY  - JOUR
TI  - Untitled memo
PY  - 2020
ER  -
";

    fn pipeline(temp: &TempDir) -> Pipeline {
        let root = temp.path();
        fs::write(root.join("export.ris"), EXPORT).unwrap();

        let mut config = Config::default_config();
        config.paths.input = root.join("export.ris");
        config.paths.cleaned_metadata = root.join("raw/cleaned_metadata.json");
        config.paths.decisions_log = root.join("logs/prisma_decisions.jsonl");
        config.paths.counts = root.join("logs/prisma_counts.json");
        config.paths.prisma_csv = root.join("logs/prisma_diagram.csv");
        config.paths.criteria = root.join("criteria.json");
        config.paths.theme_map = None;
        config.paths.output_dir = root.join("outputs");
        config.clustering.n_clusters = 2;
        Pipeline::new(config)
    }

    #[test]
    fn test_run_all_stages() {
        let temp = TempDir::new().unwrap();
        let summary = pipeline(&temp).run().unwrap();

        assert_eq!(summary.identified, 4);
        assert_eq!(summary.included, 2);
        assert_eq!(summary.counts.duplicates_removed, 1);
        assert_eq!(summary.counts.excluded_screening, 1);
        assert_eq!(summary.counts.included, 2);
        assert_eq!(summary.clusters, 2);
        assert_eq!(summary.authors, 3);

        for file in [VOS_MAP, THEME_CHART, KEYWORD_CHART, AUTHOR_MAP, "keyword_map.json"] {
            assert!(temp.path().join("outputs").join(file).exists(), "{} missing", file);
        }
        assert!(temp.path().join("logs/prisma_diagram.csv").exists());
    }

    #[test]
    fn test_refresh_does_not_double_count() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(&temp);
        pipeline.run().unwrap();

        let counts = pipeline.refresh().unwrap();
        assert_eq!(counts.duplicates_removed, 1);
        assert_eq!(counts.included, 2);

        let log = DecisionLog::new(temp.path().join("logs/prisma_decisions.jsonl"));
        assert_eq!(log.read_all().unwrap().len(), 4);
        assert_eq!(log.count(Stage::Included, Decision::Include).unwrap(), 2);
    }

    #[test]
    fn test_directory_load_ignores_own_outputs() {
        let temp = TempDir::new().unwrap();
        let raw = temp.path().join("raw");
        fs::create_dir_all(&raw).unwrap();
        fs::write(raw.join("export.ris"), EXPORT).unwrap();

        let mut config = pipeline(&temp).config().clone();
        config.paths.input = raw.clone();
        config.paths.cleaned_metadata = raw.join("cleaned_metadata.json");
        config.paths.output_dir = raw.join("outputs");
        let pipeline = Pipeline::new(config);

        for _ in 0..3 {
            assert_eq!(pipeline.load().unwrap().len(), 4);
        }
        let outcome = pipeline.screen(pipeline.load_cleaned().unwrap()).unwrap();
        assert_eq!(outcome.included.len(), 2);
        assert_eq!(pipeline.load().unwrap().len(), 4);

        let counts = pipeline.count().unwrap();
        assert_eq!(counts.identified, 4);
        assert_eq!(counts.duplicates_removed, 1);
    }

    #[test]
    fn test_progress_independent_of_color() {
        let pipeline = Pipeline::new(Config::default_config())
            .with_progress(true)
            .with_color(false);
        assert!(pipeline.show_progress);
        assert!(!pipeline.colored);
    }

    #[test]
    fn test_stage_order_hints() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(&temp);

        let err = pipeline.load_cleaned().unwrap_err();
        assert!(err.to_string().contains("`load`"));
        let err = pipeline.prisma_csv().unwrap_err();
        assert!(err.to_string().contains("`count`"));
    }

    #[test]
    fn test_adhoc_load_drops_missing_abstracts() {
        let temp = TempDir::new().unwrap();
        let pipeline = pipeline(&temp);
        let records = pipeline.load_adhoc(&temp.path().join("export.ris")).unwrap();
        assert_eq!(records.len(), 3);
    }
}
