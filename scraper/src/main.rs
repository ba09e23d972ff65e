//! Job board scraper
//!
//! Opens every configured job board in Chrome, extracts the listings,
//! saves one `{source}-jobs.json` per board and merges them into
//! `all-jobs.json` for the server.

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::config::{Config, DEFAULT_CONFIG_PATH};
use crate::logo::LogoResolver;
use crate::page::ChromeSession;

mod config;
mod driver;
mod error;
mod extract;
mod logo;
mod page;
mod salary;
mod sources;
mod store;

#[derive(Parser)]
#[command(name = "job-scraper")]
#[command(about = "Scrapes job boards into JSON snapshots", long_about = None)]
struct Cli {
    /// Path to the TOML config; built-in defaults are used if it doesn't exist
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Overrides `data_dir` from the config
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Skip the logo lookups
    #[arg(long, global = true)]
    no_logos: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape sources, save per-source files and rebuild the combined snapshot
    Scrape {
        /// Only run these sources (repeatable)
        #[arg(long)]
        only: Vec<String>,
    },
    /// Rebuild the combined snapshot from the per-source files on disk
    Merge,
    /// List configured sources
    Sources,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}

fn resolver(config: &Config, no_logos: bool) -> anyhow::Result<Option<LogoResolver>> {
    if no_logos || !config.logo.enabled {
        info!("Logo lookups disabled");
        return Ok(None);
    }
    Ok(Some(LogoResolver::new(&config.logo)?))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = Config::load(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    match cli.command {
        Commands::Sources => {
            for source in &config.sources {
                let Some(profile) = sources::profile(&source.name) else {
                    continue;
                };
                println!(
                    "{:<12} {:<16} {:<8} {:?}\n             {}",
                    source.name,
                    profile.tag,
                    if source.enabled { "enabled" } else { "disabled" },
                    profile.pagination,
                    source.url
                );
            }
        }
        Commands::Merge => {
            let resolver = resolver(&config, cli.no_logos)?;
            let summary = driver::merge(&config.data_dir, resolver.as_ref())
                .await
                .context("merging source snapshots")?;
            println!(
                "💾 Saved {} jobs from {} sources to {} ({} with logos)",
                summary.total,
                summary.sources,
                summary.path.display(),
                summary.with_logo
            );
        }
        Commands::Scrape { only } => {
            for name in &only {
                if sources::profile(name).is_none() {
                    anyhow::bail!("unknown source `{}` (known: {})", name, sources::names().join(", "));
                }
            }
            let resolver = resolver(&config, cli.no_logos)?;

            println!("🔍 Starting job scraper...\n");
            let session = tokio::task::spawn_blocking({
                let config = config.clone();
                move || ChromeSession::launch(&config)
            })
            .await?
            .context("launching Chrome")?;

            let summary = driver::run(&config, Arc::new(session), resolver.as_ref(), &only).await;

            println!();
            for source in &summary.sources {
                let mark = if source.count > 0 { "✅" } else { "⚠️" };
                println!("{} {:<12} {:>4} jobs", mark, source.name, source.count);
            }
            println!(
                "📊 {} of {} sources returned jobs, {} scraped",
                summary.productive_sources(),
                summary.sources.len(),
                summary.scraped_total()
            );
            match &summary.merged {
                Some(merged) => println!(
                    "💾 Saved {} unique jobs to {}",
                    merged.total,
                    merged.path.display()
                ),
                None => println!("❌ Combined snapshot was not written, see the log"),
            }
            println!("\n✨ Scraping complete!");
        }
    }

    Ok(())
}
