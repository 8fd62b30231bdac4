// Command-line entry point: scrape one URL and print the outcome as JSON.
//
// stdout carries only the JSON envelope; logs go to stderr (RUST_LOG, default warn).

use anyhow::Result;
use clap::Parser;
use kodegen_tools_metascrape::{MetaScraper, PipelineOutcome, ScrapeConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "kodegen-metascrape", version, about = "Extract page metadata as JSON")]
struct Cli {
    /// Absolute URL of the page to scrape
    url: String,

    /// YAML config file (overrides defaults, overridden by environment)
    #[arg(long, env = "SCRAPER_CONFIG")]
    config: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = ScrapeConfig::load(cli.config.as_deref())?;

    let outcome = match MetaScraper::new(config) {
        Ok(scraper) => scraper.scrape(&cli.url).await,
        Err(e) => PipelineOutcome::Failure {
            url: cli.url.clone(),
            error: e.to_string(),
        },
    };

    let json = if cli.pretty {
        serde_json::to_string_pretty(&outcome)?
    } else {
        serde_json::to_string(&outcome)?
    };
    println!("{json}");
    Ok(())
}
