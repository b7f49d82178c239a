// file: src/main.rs
// description: commandline application entry point with command handling
// reference: application bootstrap and orchestration

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use litreview::utils::logging::{format_info, format_step, format_success, format_warning};
use litreview::{Config, MendeleyClient, Pipeline, documents_to_records, extract_code, save_metadata};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::Instant;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "litreview")]
#[command(version = "0.1.0")]
#[command(about = "Systematic literature review pipeline with PRISMA logging and keyword maps", long_about = None)]
struct Cli {
    #[arg(
        short,
        long,
        value_name = "FILE",
        default_value = "config/default.toml"
    )]
    config: PathBuf,

    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    color: bool,

    #[arg(short, long, action = ArgAction::SetTrue)]
    verbose: bool,

    /// Draw a progress bar while screening
    #[arg(long, default_value_t = true, action = ArgAction::Set)]
    progress: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authorize against Mendeley and save the library metadata
    Fetch {
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Load and normalize the configured exports into the cleaned metadata file
    Load,

    /// Screen the cleaned metadata and rewrite the PRISMA decision log
    Screen,

    /// Recompute PRISMA stage counts from the decision log
    Count,

    /// Write the PRISMA flow diagram CSV from the saved counts
    PrismaCsv,

    /// Re-screen, recount and regenerate the diagram CSV in one go
    Refresh,

    /// Top keyword frequencies over included records, or over an export given with --input
    Keywords {
        #[arg(short, long, value_name = "PATH")]
        input: Option<PathBuf>,
    },

    /// Cluster abstracts into themes and draw the keyword map
    Cluster {
        #[arg(short, long, value_name = "PATH")]
        input: Option<PathBuf>,
    },

    /// Co-authorship network of the included records
    Authors {
        #[arg(short, long, value_name = "PATH")]
        input: Option<PathBuf>,
    },

    /// Every stage from loading to charts
    Run,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    litreview::utils::logging::init_logger(cli.color, cli.verbose);

    info!("Literature Review Pipeline");
    info!("Loading configuration from: {}", cli.config.display());

    let config = if cli.config.exists() {
        Config::load(Some(cli.config.as_path())).context("Failed to load configuration")?
    } else {
        warn!(
            "Config file {} not found, using default configuration",
            cli.config.display()
        );
        let config = Config::default_config();
        config.validate().context("Invalid default configuration")?;
        config
    };

    let pipeline = Pipeline::new(config)
        .with_progress(cli.progress)
        .with_color(cli.color);

    match cli.command {
        Commands::Fetch { output } => cmd_fetch(pipeline.config(), output).await?,
        Commands::Load => cmd_load(&pipeline)?,
        Commands::Screen => cmd_screen(&pipeline)?,
        Commands::Count => cmd_count(&pipeline)?,
        Commands::PrismaCsv => cmd_prisma_csv(&pipeline)?,
        Commands::Refresh => cmd_refresh(&pipeline)?,
        Commands::Keywords { input } => cmd_keywords(&pipeline, input)?,
        Commands::Cluster { input } => cmd_cluster(&pipeline, input)?,
        Commands::Authors { input } => cmd_authors(&pipeline, input)?,
        Commands::Run => cmd_run(&pipeline)?,
    }

    Ok(())
}

/// Records for the analysis commands: an ad-hoc export, or the screened set.
fn analysis_records(pipeline: &Pipeline, input: Option<PathBuf>) -> Result<Vec<litreview::Record>> {
    match input {
        Some(path) => pipeline
            .load_adhoc(&path)
            .with_context(|| format!("Failed to load {}", path.display())),
        None => Ok(pipeline.load_included()?),
    }
}

async fn cmd_fetch(config: &Config, output: Option<PathBuf>) -> Result<()> {
    let client = MendeleyClient::from_config(&config.mendeley)?;
    let url = client.authorize_url()?;

    println!("{}", format_info("Open this URL in your browser and authorize access:"));
    println!("\n  {}\n", url);
    print!("Paste the full redirect URL: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let code = extract_code(&line)
        .ok_or_else(|| anyhow::anyhow!("No authorization code found in the redirect URL"))?;

    let token = client
        .exchange_code(&code)
        .await
        .context("Token exchange failed")?;
    let documents = client
        .fetch_documents(&token)
        .await
        .context("Fetching documents failed")?;

    let records = documents_to_records(documents);
    let path = output.unwrap_or_else(|| {
        let input = &config.paths.input;
        if input.is_dir() {
            input.join("mendeley_metadata.json")
        } else {
            input.with_file_name("mendeley_metadata.json")
        }
    });
    save_metadata(&records, &path)?;

    println!(
        "{}",
        format_success(&format!("Saved {} records to {}", records.len(), path.display()))
    );
    Ok(())
}

fn cmd_load(pipeline: &Pipeline) -> Result<()> {
    let records = pipeline.load().context("Loading exports failed")?;
    println!(
        "{}",
        format_success(&format!(
            "Loaded {} records into {}",
            records.len(),
            pipeline.config().paths.cleaned_metadata.display()
        ))
    );
    Ok(())
}

fn cmd_screen(pipeline: &Pipeline) -> Result<()> {
    let records = pipeline.load_cleaned()?;
    let outcome = pipeline.screen(records).context("Screening failed")?;
    println!(
        "{}",
        format_success(&format!(
            "Screened {} records, {} included",
            outcome.identified,
            outcome.included.len()
        ))
    );
    Ok(())
}

fn cmd_count(pipeline: &Pipeline) -> Result<()> {
    let counts = pipeline.count().context("Counting failed")?;
    println!("{}", serde_json::to_string_pretty(&counts)?);
    Ok(())
}

fn cmd_prisma_csv(pipeline: &Pipeline) -> Result<()> {
    pipeline.prisma_csv()?;
    println!(
        "{}",
        format_success(&format!(
            "PRISMA diagram CSV written to {}",
            pipeline.config().paths.prisma_csv.display()
        ))
    );
    Ok(())
}

fn cmd_refresh(pipeline: &Pipeline) -> Result<()> {
    let counts = pipeline.refresh()?;
    println!(
        "{}",
        format_success(&format!(
            "PRISMA refreshed: {} identified, {} included",
            counts.identified, counts.included
        ))
    );
    Ok(())
}

fn cmd_keywords(pipeline: &Pipeline, input: Option<PathBuf>) -> Result<()> {
    let records = analysis_records(pipeline, input)?;
    let (keywords, _) = pipeline.keywords(&records)?;

    for (rank, keyword) in keywords.iter().enumerate() {
        println!("{:>3}. {:<30} {}", rank + 1, keyword.term, keyword.count);
    }
    Ok(())
}

fn cmd_cluster(pipeline: &Pipeline, input: Option<PathBuf>) -> Result<()> {
    let records = analysis_records(pipeline, input)?;
    let report = pipeline.cluster(&records)?;

    for cluster in &report.clusters.clusters {
        let terms: Vec<&str> = cluster.keywords.iter().map(|k| k.term.as_str()).collect();
        println!(
            "{} [{}]: {}",
            cluster.id,
            report.naming.label_for(&cluster.id),
            terms.join(", ")
        );
    }
    println!(
        "{}",
        format_success(&format!(
            "Keyword map: {} nodes, {} edges",
            report.nodes, report.edges
        ))
    );
    Ok(())
}

fn cmd_authors(pipeline: &Pipeline, input: Option<PathBuf>) -> Result<()> {
    let records = analysis_records(pipeline, input)?;
    let report = pipeline.authors(&records)?;

    match report.output {
        Some(path) => println!(
            "{}",
            format_success(&format!(
                "{} authors, {} co-authoring pairs, map at {}",
                report.authors,
                report.pairs,
                path.display()
            ))
        ),
        None => println!("{}", format_warning("No co-authored records found")),
    }
    Ok(())
}

fn cmd_run(pipeline: &Pipeline) -> Result<()> {
    let start_time = Instant::now();
    println!("{}", format_step(1, 1, "Running every pipeline stage"));

    let summary = pipeline.run()?;

    info!("=== Pipeline Execution Summary ===");
    info!("Records identified: {}", summary.identified);
    info!("Duplicates removed: {}", summary.counts.duplicates_removed);
    info!("Excluded at screening: {}", summary.counts.excluded_screening);
    info!("Excluded at eligibility: {}", summary.counts.excluded_eligibility);
    info!("Records included: {}", summary.included);
    info!("Inclusion rate: {:.1}%", summary.stats.inclusion_rate());
    info!("Keywords: {}", summary.keywords);
    info!("Clusters: {}", summary.clusters);
    info!("Authors: {}", summary.authors);
    info!("Total time: {:.2}s", start_time.elapsed().as_secs_f64());
    info!("==================================");

    for output in &summary.outputs {
        println!("  {}", output.display());
    }
    println!("{}", format_success("Pipeline complete"));
    Ok(())
}
