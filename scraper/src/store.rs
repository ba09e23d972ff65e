//! Snapshot files in the data directory.
//!
//! Every write replaces the file wholesale; nothing is appended or versioned.

use common::{CombinedSnapshot, SourceSnapshot, COMBINED_FILE, SOURCE_FILE_SUFFIX};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info, warn};

use crate::error::{Result, ScrapeError};

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| ScrapeError::io(parent, e))?;
    }
    let body = serde_json::to_vec_pretty(value)?;
    fs::write(path, body).await.map_err(|e| ScrapeError::io(path, e))
}

/// Writes `{source}-jobs.json`, overwriting the previous run's file.
pub async fn write_source(dir: &Path, snapshot: &SourceSnapshot) -> Result<PathBuf> {
    let path = dir.join(SourceSnapshot::file_name(&snapshot.source));
    write_json(&path, snapshot).await?;
    info!(source = %snapshot.source, count = snapshot.count, path = %path.display(), "💾 Saved source snapshot");
    Ok(path)
}

/// Per-source files currently on disk, sorted by file name.
///
/// Files that can't be parsed are skipped with a warning so one corrupt
/// file doesn't block the merge.
pub async fn read_sources(dir: &Path) -> Result<Vec<SourceSnapshot>> {
    let mut entries = fs::read_dir(dir).await.map_err(|e| ScrapeError::io(dir, e))?;

    let mut paths = Vec::new();
    while let Some(entry) = entries.next_entry().await.map_err(|e| ScrapeError::io(dir, e))? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(SOURCE_FILE_SUFFIX) && name != COMBINED_FILE {
            paths.push(entry.path());
        }
    }
    paths.sort();

    let mut snapshots = Vec::with_capacity(paths.len());
    for path in paths {
        let raw = match fs::read(&path).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read source snapshot");
                continue;
            }
        };
        match serde_json::from_slice::<SourceSnapshot>(&raw) {
            Ok(snapshot) => {
                debug!(path = %path.display(), count = snapshot.jobs.len(), "Read source snapshot");
                snapshots.push(snapshot);
            }
            Err(e) => warn!(path = %path.display(), error = %e, "Skipping malformed source snapshot"),
        }
    }
    Ok(snapshots)
}

pub async fn write_combined(dir: &Path, snapshot: &CombinedSnapshot) -> Result<PathBuf> {
    let path = dir.join(COMBINED_FILE);
    write_json(&path, snapshot).await?;
    info!(total = snapshot.total_count, sources = snapshot.sources, path = %path.display(), "💾 Saved combined snapshot");
    Ok(path)
}
