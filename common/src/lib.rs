//! Shared data model for the job aggregator.
//!
//! The scraper writes these shapes to disk and the server reads them back,
//! so every type here is the JSON contract between the two binaries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

pub const NO_TITLE: &str = "No title";
pub const NO_COMPANY: &str = "No company";
pub const UNKNOWN_COMPANY: &str = "Unknown company";
pub const NO_LOCATION: &str = "No location";
pub const NO_URL: &str = "No URL";

/// File name of the merged snapshot inside the data directory.
pub const COMBINED_FILE: &str = "all-jobs.json";
/// Suffix shared by every per-source file (`{source}-jobs.json`).
pub const SOURCE_FILE_SUFFIX: &str = "-jobs.json";

/// Pay period inferred from markers in the salary text.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SalaryType {
    Monthly,
    Hourly,
}

/// One normalized job listing.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Posting {
    #[serde(default = "default_title")]
    pub title: String,
    #[serde(default = "default_company")]
    pub company: String,
    #[serde(default = "default_location")]
    pub location: String,
    /// Deduplication key across a whole run.
    #[serde(default = "default_url")]
    pub url: String,
    #[serde(default)]
    pub salary_min: Option<f64>,
    #[serde(default)]
    pub salary_max: Option<f64>,
    #[serde(default)]
    pub salary_type: Option<SalaryType>,
    pub source: String,
    #[serde(default)]
    pub logo_url: Option<String>,
    /// Posting date as displayed by the source, when it shows one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    /// Source-specific fields that don't belong on the core record.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

fn default_title() -> String {
    NO_TITLE.to_string()
}

fn default_company() -> String {
    NO_COMPANY.to_string()
}

fn default_location() -> String {
    NO_LOCATION.to_string()
}

fn default_url() -> String {
    NO_URL.to_string()
}

impl Posting {
    /// A posting with every text field at its sentinel.
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            title: default_title(),
            company: default_company(),
            location: default_location(),
            url: default_url(),
            salary_min: None,
            salary_max: None,
            salary_type: None,
            source: source.into(),
            logo_url: None,
            date: None,
            extra: BTreeMap::new(),
        }
    }

    pub fn has_url(&self) -> bool {
        !self.url.is_empty() && self.url != NO_URL
    }

    pub fn has_title(&self) -> bool {
        !self.title.is_empty() && self.title != NO_TITLE
    }

    /// True when the company field holds a real name rather than a sentinel.
    pub fn has_company(&self) -> bool {
        is_real_company(&self.company)
    }
}

pub fn is_real_company(name: &str) -> bool {
    let name = name.trim();
    !name.is_empty() && name != NO_COMPANY && name != UNKNOWN_COMPANY
}

/// Contents of one `{source}-jobs.json` file.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SourceSnapshot {
    pub source: String,
    pub last_updated: DateTime<Utc>,
    pub count: usize,
    pub jobs: Vec<Posting>,
}

impl SourceSnapshot {
    pub fn new(source: impl Into<String>, jobs: Vec<Posting>) -> Self {
        Self {
            source: source.into(),
            last_updated: Utc::now(),
            count: jobs.len(),
            jobs,
        }
    }

    pub fn file_name(source: &str) -> String {
        format!("{}{}", source, SOURCE_FILE_SUFFIX)
    }
}

/// Contents of `all-jobs.json`, the only file the server reads.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CombinedSnapshot {
    pub last_updated: DateTime<Utc>,
    pub total_count: usize,
    pub sources: usize,
    pub jobs: Vec<Posting>,
}

impl CombinedSnapshot {
    pub fn new(jobs: Vec<Posting>, sources: usize) -> Self {
        Self {
            last_updated: Utc::now(),
            total_count: jobs.len(),
            sources,
            jobs,
        }
    }
}

/// Postings keyed by URL with insert-or-replace semantics.
///
/// Iteration follows first-insertion order while the stored value is always
/// the most recently inserted one for its URL.
#[derive(Debug, Default, Clone)]
pub struct PostingSet {
    index: HashMap<String, usize>,
    items: Vec<Posting>,
}

impl PostingSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces by URL. Returns `true` if the URL was not seen before.
    pub fn insert(&mut self, posting: Posting) -> bool {
        match self.index.get(&posting.url) {
            Some(&slot) => {
                self.items[slot] = posting;
                false
            }
            None => {
                self.index.insert(posting.url.clone(), self.items.len());
                self.items.push(posting);
                true
            }
        }
    }

    /// Inserts every posting and returns how many URLs were new.
    pub fn extend<I: IntoIterator<Item = Posting>>(&mut self, postings: I) -> usize {
        postings
            .into_iter()
            .map(|p| self.insert(p))
            .filter(|added| *added)
            .count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<Posting> {
        self.items
    }
}

impl FromIterator<Posting> for PostingSet {
    fn from_iter<I: IntoIterator<Item = Posting>>(iter: I) -> Self {
        let mut set = PostingSet::new();
        set.extend(iter);
        set
    }
}
