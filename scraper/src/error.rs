//! Error types for the scraping pipeline.
//!
//! Most of these never leave the component that raised them: extractors and
//! logo lookups turn failures into empty results. They exist so those
//! boundaries can log something meaningful before degrading.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Chrome could not be launched or a tab could not be opened
    #[error("Browser error: {0}")]
    Browser(String),

    /// The tab was closed, detached or navigated away while we used it
    #[error("Page invalidated: {0}")]
    PageInvalidated(String),

    /// A CSS selector in a site profile does not parse
    #[error("Invalid selector `{selector}`: {message}")]
    Selector { selector: String, message: String },

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl ScrapeError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn invalidated(msg: impl Into<String>) -> Self {
        Self::PageInvalidated(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
