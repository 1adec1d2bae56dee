use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use revharvest::config::Config;

mod commands;

use commands::{scrape, ScrapeParams};

#[derive(Parser)]
#[command(
    name = "revharvest",
    version,
    about = "Collect dated software reviews from G2, Capterra and TrustRadius",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log format (text, json); defaults to the configured format
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// Configuration file (TOML); environment variables are used otherwise
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape reviews for a company within a date window
    Scrape {
        /// Company slug as used in the platform URLs (e.g. acme-crm)
        #[arg(long)]
        company: String,

        /// First day of the window (YYYY-MM-DD)
        #[arg(long)]
        start: String,

        /// Last day of the window (YYYY-MM-DD)
        #[arg(long)]
        end: String,

        /// Review platforms (g2, capterra, trustradius); repeat for several
        #[arg(long = "source", required = true, num_args = 1..)]
        sources: Vec<String>,

        /// Output directory for the JSON files
        #[arg(short, long)]
        outdir: Option<PathBuf>,

        /// Replay saved HTML pages from a directory instead of opening a browser
        #[arg(long)]
        replay: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::from_env()?,
    };
    config.validate().context("Invalid configuration")?;

    // Initialize tracing/logging
    let log_format = cli.log_format.as_deref().unwrap_or(&config.logging.format);
    setup_tracing(log_format, &config.logging.level, cli.verbose)?;

    tracing::info!("revharvest starting");

    match cli.command {
        Commands::Scrape {
            company,
            start,
            end,
            sources,
            outdir,
            replay,
        } => {
            tracing::info!(
                company = %company,
                start = %start,
                end = %end,
                sources = ?sources,
                replay = ?replay,
                "Starting scrape command"
            );
            scrape(
                config,
                ScrapeParams {
                    company,
                    start,
                    end,
                    sources,
                    outdir,
                    replay,
                },
            )
            .await?;
        }
    }

    tracing::info!("revharvest completed successfully");
    Ok(())
}

fn setup_tracing(format: &str, level: &str, verbose: bool) -> Result<()> {
    let env_filter = if verbose {
        tracing_subscriber::EnvFilter::new("revharvest=debug,info")
    } else {
        tracing_subscriber::EnvFilter::try_new(format!("revharvest={level},warn"))
            .context("Invalid log level")?
    };

    match format {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }

    Ok(())
}
