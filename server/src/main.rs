//! Job Listing Server
//!
//! Serves the combined snapshot written by the scraper as a small JSON
//! API with search, facet filters and pagination.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use chrono::{DateTime, Utc};
use clap::Parser;
use common::{CombinedSnapshot, Posting, COMBINED_FILE};
use serde::Serialize;
use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

mod query;

use query::{JobQuery, paginate};

#[derive(Parser)]
#[command(name = "server")]
#[command(about = "JSON API over the scraped job listings", long_about = None)]
struct Args {
    /// Directory holding all-jobs.json
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    #[arg(long, default_value = "127.0.0.1:3000")]
    addr: SocketAddr,
}

/// Shared application state
struct AppState {
    data_dir: PathBuf,
}

/// Response for GET /jobs
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JobsResponse {
    page: usize,
    limit: usize,
    total_items: usize,
    total_pages: usize,
    last_updated: Option<DateTime<Utc>>,
    items: Vec<Posting>,
}

/// Response for GET /stats
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatsResponse {
    last_updated: Option<DateTime<Utc>>,
    total_count: usize,
    sources: usize,
    per_source: BTreeMap<String, usize>,
}

/// Reads the snapshot fresh on every request so a new scraper run shows
/// up without a restart. Missing or unreadable means no jobs.
async fn load_snapshot(data_dir: &Path) -> Option<CombinedSnapshot> {
    let path = data_dir.join(COMBINED_FILE);
    let raw = match tokio::fs::read(&path).await {
        Ok(raw) => raw,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No snapshot to serve");
            return None;
        }
    };
    match serde_json::from_slice(&raw) {
        Ok(snapshot) => Some(snapshot),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Snapshot is not valid JSON");
            None
        }
    }
}

/// Handler for GET /jobs
async fn jobs_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<Vec<(String, String)>>,
) -> Json<JobsResponse> {
    let query = JobQuery::from_pairs(&params);
    let snapshot = load_snapshot(&state.data_dir).await;
    let last_updated = snapshot.as_ref().map(|s| s.last_updated);
    let today = Utc::now().date_naive();

    let matching: Vec<Posting> = snapshot
        .map(|s| s.jobs)
        .unwrap_or_default()
        .into_iter()
        .filter(|p| query.matches(p, today))
        .collect();

    let page = paginate(matching, query.page, query.limit);
    Json(JobsResponse {
        page: query.page,
        limit: query.limit,
        total_items: page.total_items,
        total_pages: page.total_pages,
        last_updated,
        items: page.items,
    })
}

/// Handler for GET /stats
async fn stats_handler(State(state): State<Arc<AppState>>) -> Json<StatsResponse> {
    let Some(snapshot) = load_snapshot(&state.data_dir).await else {
        return Json(StatsResponse {
            last_updated: None,
            total_count: 0,
            sources: 0,
            per_source: BTreeMap::new(),
        });
    };

    let mut per_source = BTreeMap::new();
    for job in &snapshot.jobs {
        *per_source.entry(job.source.clone()).or_insert(0) += 1;
    }

    Json(StatsResponse {
        last_updated: Some(snapshot.last_updated),
        total_count: snapshot.jobs.len(),
        sources: snapshot.sources,
        per_source,
    })
}

/// Handler for GET / (root)
async fn root_handler() -> &'static str {
    "🔍 Job Listing API\n\nEndpoints:\n  GET /jobs   - Paginated, filtered job listings\n              ?page=1&limit=10&search=<text>\n              &source=<id>&workType=internship|full-time|part-time|contract\n              &location=wroclaw|remote|hybrid&dateRange=today|week|month|all\n  GET /stats  - Snapshot totals per source\n\nExample:\n  curl 'http://127.0.0.1:3000/jobs?search=junior&location=remote'"
}

fn app(data_dir: PathBuf) -> Router {
    let state = Arc::new(AppState { data_dir });
    Router::new()
        .route("/", get(root_handler))
        .route("/jobs", get(jobs_handler))
        .route("/stats", get(stats_handler))
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let args = Args::parse();

    println!("🚀 Starting Job Listing Server...\n");
    if !args.data_dir.join(COMBINED_FILE).exists() {
        println!("⚠️  No {} found in {}. Run the scraper first!", COMBINED_FILE, args.data_dir.display());
        println!("   cargo run -p job-scraper -- scrape\n");
    }

    let listener = tokio::net::TcpListener::bind(args.addr).await?;
    info!(addr = %args.addr, data_dir = %args.data_dir.display(), "🌐 Server running");
    println!("   Try: curl 'http://{}/jobs?search=developer'\n", args.addr);

    axum::serve(listener, app(args.data_dir)).await?;
    Ok(())
}
