// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{PipelineError, Result};
use crate::graph::Layout;
use crate::visualization::SizingMode;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub paths: PathsConfig,
    pub screening: ScreeningConfig,
    pub keywords: KeywordConfig,
    pub clustering: ClusteringConfig,
    pub visualization: VisualizationConfig,
    #[serde(default)]
    pub mendeley: MendeleyConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PathsConfig {
    /// Single export file (RIS, JSON or CSV) or a directory of exports.
    pub input: PathBuf,
    pub cleaned_metadata: PathBuf,
    pub decisions_log: PathBuf,
    pub counts: PathBuf,
    pub prisma_csv: PathBuf,
    pub criteria: PathBuf,
    #[serde(default)]
    pub theme_map: Option<PathBuf>,
    pub output_dir: PathBuf,
    #[serde(default)]
    pub skip_patterns: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScreeningConfig {
    pub deduplicate: bool,
    pub require_title: bool,
    pub require_year: bool,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct KeywordConfig {
    pub top_n: usize,
    pub max_features: usize,
    #[serde(default)]
    pub extra_stopwords: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ClusteringConfig {
    pub n_clusters: usize,
    pub seed: u64,
    pub max_iterations: usize,
    pub top_terms: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VisualizationConfig {
    pub layout: String,
    pub layout_seed: u64,
    pub spring_k: f64,
    pub iterations: usize,
    pub node_scale: f64,
    pub sizing_mode: String,
    pub width: u32,
    pub height: u32,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct MendeleyConfig {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_redirect_uri() -> String {
    "http://localhost:8080".to_string()
}

fn default_api_base() -> String {
    "https://api.mendeley.com".to_string()
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("LITREVIEW")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            paths: PathsConfig {
                input: PathBuf::from("data_sources/raw/mendeley_export.ris"),
                cleaned_metadata: PathBuf::from("data_sources/raw/cleaned_metadata.json"),
                decisions_log: PathBuf::from("data_sources/logs/prisma_decisions.jsonl"),
                counts: PathBuf::from("data_sources/logs/prisma_counts.json"),
                prisma_csv: PathBuf::from("data_sources/logs/prisma_diagram.csv"),
                criteria: PathBuf::from("config/criteria.json"),
                theme_map: None,
                output_dir: PathBuf::from("outputs"),
                skip_patterns: vec!["_backup".to_string(), ".git/".to_string()],
            },
            screening: ScreeningConfig {
                deduplicate: true,
                require_title: true,
                require_year: true,
            },
            keywords: KeywordConfig {
                top_n: 20,
                max_features: 1000,
                extra_stopwords: vec![],
            },
            clustering: ClusteringConfig {
                n_clusters: 6,
                seed: 42,
                max_iterations: 300,
                top_terms: 15,
            },
            visualization: VisualizationConfig {
                layout: "spring".to_string(),
                layout_seed: 1472,
                spring_k: 5.0,
                iterations: 500,
                node_scale: 1.0,
                sizing_mode: "frequency".to_string(),
                width: 1200,
                height: 800,
            },
            mendeley: MendeleyConfig {
                client_id: None,
                client_secret: None,
                redirect_uri: default_redirect_uri(),
                api_base: default_api_base(),
            },
        }
    }

    pub fn layout(&self) -> Result<Layout> {
        self.visualization.layout.parse()
    }

    pub fn sizing_mode(&self) -> Result<SizingMode> {
        self.visualization.sizing_mode.parse()
    }

    pub fn validate(&self) -> Result<()> {
        if self.clustering.n_clusters == 0 {
            return Err(PipelineError::Config(
                "n_clusters must be greater than 0".to_string(),
            ));
        }

        if self.keywords.top_n == 0 || self.clustering.top_terms == 0 {
            return Err(PipelineError::Config(
                "top_n and top_terms must be greater than 0".to_string(),
            ));
        }

        if self.keywords.max_features == 0 {
            return Err(PipelineError::Config(
                "max_features must be greater than 0".to_string(),
            ));
        }

        if self.visualization.width == 0 || self.visualization.height == 0 {
            return Err(PipelineError::Config(
                "chart width and height must be greater than 0".to_string(),
            ));
        }

        self.layout()
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        self.sizing_mode()
            .map_err(|e| PipelineError::Config(e.to_string()))?;

        Ok(())
    }
}
