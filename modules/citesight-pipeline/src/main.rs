use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use citesight_common::{AnalysisConfig, PageModel};
use citesight_pipeline::{Analyzer, SimulationTarget};

#[derive(Parser)]
#[command(name = "citesight")]
#[command(about = "Score a crawled page for AI recommendation readiness")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a crawled page model and print the report JSON
    Analyze {
        /// Path to a PageModel JSON file produced by the crawler
        #[arg(long)]
        page: PathBuf,

        /// Brand to check for citations (enables simulation)
        #[arg(long)]
        brand: Option<String>,

        /// Product category for the simulated query
        #[arg(long)]
        category: Option<String>,

        /// Use case for the simulated query
        #[arg(long = "use-case")]
        use_case: Option<String>,

        /// Ground the simulation in a page excerpt
        #[arg(long)]
        with_context: bool,

        /// Pretty-print the report JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("citesight=info".parse()?))
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze { page, brand, category, use_case, with_context, pretty } => {
            let config = AnalysisConfig::from_env()?;
            info!(provider = config.provider.as_str(), "configuration loaded");

            let raw = std::fs::read_to_string(&page)
                .with_context(|| format!("reading page model from {}", page.display()))?;
            let page_model: PageModel =
                serde_json::from_str(&raw).context("parsing page model JSON")?;

            let target = match (brand, category, use_case) {
                (Some(brand), Some(category), Some(use_case)) => Some(SimulationTarget {
                    brand,
                    category,
                    use_case,
                    include_page_context: with_context,
                }),
                (None, None, None) => None,
                _ => bail!("--brand, --category and --use-case must be provided together"),
            };

            let analyzer = Analyzer::new(config)?;
            let report = analyzer.analyze(page_model, target).await?;

            let out = if pretty {
                serde_json::to_string_pretty(&report)?
            } else {
                serde_json::to_string(&report)?
            };
            println!("{out}");
        }
    }

    Ok(())
}
