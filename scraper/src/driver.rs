//! Runs every source, persists each one, then builds the combined snapshot.

use common::{CombinedSnapshot, Posting, PostingSet, SourceSnapshot};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::extract::run_source;
use crate::logo::LogoResolver;
use crate::page::Session;
use crate::sources;
use crate::store;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceOutcome {
    pub name: String,
    pub count: usize,
    /// Whether `{name}-jobs.json` was written.
    pub saved: bool,
}

#[derive(Debug, Clone)]
pub struct MergeSummary {
    /// Per-source files that went into the merge.
    pub sources: usize,
    pub total: usize,
    pub with_logo: usize,
    pub path: PathBuf,
}

#[derive(Debug)]
pub struct RunSummary {
    pub sources: Vec<SourceOutcome>,
    /// `None` when the combined snapshot could not be built.
    pub merged: Option<MergeSummary>,
}

impl RunSummary {
    pub fn productive_sources(&self) -> usize {
        self.sources.iter().filter(|s| s.count > 0).count()
    }

    pub fn scraped_total(&self) -> usize {
        self.sources.iter().map(|s| s.count).sum()
    }
}

/// Scrapes the active sources in parallel, one tab and one blocking task
/// each, and writes every source's file as soon as it finishes.
///
/// A source that fails to open, panics or finds nothing still gets a file
/// with zero jobs; nothing here aborts the run.
pub async fn scrape<S: Session>(config: &Config, session: Arc<S>, only: &[String]) -> Vec<SourceOutcome> {
    let mut tasks = JoinSet::new();
    let mut pending = BTreeSet::new();

    for source in config.active_sources(only) {
        let Some(profile) = sources::profile(&source.name) else {
            warn!(source = %source.name, "No profile for source, skipping");
            continue;
        };
        pending.insert(source.name.clone());

        let session = Arc::clone(&session);
        let source = source.clone();
        let scroll = config.scroll.clone();
        tasks.spawn_blocking(move || {
            info!(source = %source.name, url = %source.url, "🚀 Starting source");
            let postings = match session.open(&source.url) {
                Ok(page) => run_source(&page, profile, &source, &scroll),
                Err(e) => {
                    warn!(source = %source.name, error = %e, "Could not open page");
                    Vec::new()
                }
            };
            (source.name, postings)
        });
    }

    let mut outcomes = Vec::with_capacity(pending.len());
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((name, postings)) => {
                pending.remove(&name);
                outcomes.push(persist(&config.data_dir, name, postings).await);
            }
            Err(e) => error!(error = %e, "Source task failed"),
        }
    }

    // tasks that panicked never reported back
    for name in pending {
        outcomes.push(persist(&config.data_dir, name, Vec::new()).await);
    }

    outcomes.sort_by(|a, b| a.name.cmp(&b.name));
    outcomes
}

async fn persist(dir: &Path, name: String, postings: Vec<Posting>) -> SourceOutcome {
    let count = postings.len();
    if count == 0 {
        warn!(source = %name, "No jobs found");
    } else {
        info!(source = %name, count, "✅ Source finished");
    }

    let saved = match store::write_source(dir, &SourceSnapshot::new(name.as_str(), postings)).await {
        Ok(_) => true,
        Err(e) => {
            error!(source = %name, error = %e, "Failed to save source snapshot");
            false
        }
    };
    SourceOutcome { name, count, saved }
}

/// Rebuilds `all-jobs.json` from the per-source files on disk.
///
/// Files are merged in file-name order; on a URL clash the posting read
/// last wins. Safe to run on its own any number of times.
pub async fn merge(data_dir: &Path, resolver: Option<&LogoResolver>) -> Result<MergeSummary> {
    let snapshots = store::read_sources(data_dir).await?;

    let mut set = PostingSet::new();
    let mut read = 0;
    for snapshot in &snapshots {
        read += snapshot.jobs.len();
        set.extend(snapshot.jobs.iter().cloned());
    }
    info!(files = snapshots.len(), read, unique = set.len(), "🔀 Merged source snapshots");

    let mut jobs = set.into_vec();
    let with_logo = match resolver {
        Some(resolver) => resolver.attach(&mut jobs).await,
        None => 0,
    };

    let combined = CombinedSnapshot::new(jobs, snapshots.len());
    let path = store::write_combined(data_dir, &combined).await?;

    Ok(MergeSummary {
        sources: combined.sources,
        total: combined.total_count,
        with_logo,
        path,
    })
}

/// Full pipeline: scrape, persist, merge, logos, combined snapshot.
pub async fn run<S: Session>(
    config: &Config,
    session: Arc<S>,
    resolver: Option<&LogoResolver>,
    only: &[String],
) -> RunSummary {
    let started = Instant::now();
    let sources = scrape(config, session, only).await;

    let merged = match merge(&config.data_dir, resolver).await {
        Ok(summary) => Some(summary),
        Err(e) => {
            error!(error = %e, "Failed to build combined snapshot");
            None
        }
    };

    let summary = RunSummary { sources, merged };
    info!(
        productive = summary.productive_sources(),
        sources = summary.sources.len(),
        scraped = summary.scraped_total(),
        elapsed_secs = started.elapsed().as_secs(),
        "🎉 Run finished"
    );
    summary
}
