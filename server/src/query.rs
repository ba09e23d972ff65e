//! Search, facet filters and pagination over the combined snapshot.
//!
//! Everything here is a pure function of the posting list, the request
//! and today's date.

use chrono::{Duration, NaiveDate};
use common::Posting;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkType {
    Internship,
    FullTime,
    PartTime,
    Contract,
}

impl WorkType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "internship" => Some(Self::Internship),
            "full-time" => Some(Self::FullTime),
            "part-time" => Some(Self::PartTime),
            "contract" => Some(Self::Contract),
            _ => None,
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Internship => &["intern", "staż", "staz", "praktyk", "trainee", "apprentice"],
            Self::FullTime => &["full-time", "full time", "pełny etat", "pełen etat", "umowa o pracę"],
            Self::PartTime => &["part-time", "part time", "pół etatu", "niepełny etat", "1/2 etatu"],
            Self::Contract => &["b2b", "contract", "kontrakt", "zlecenie", "umowa o dzieło"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationType {
    Wroclaw,
    Remote,
    Hybrid,
}

impl LocationType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "wroclaw" | "wrocław" => Some(Self::Wroclaw),
            "remote" => Some(Self::Remote),
            "hybrid" => Some(Self::Hybrid),
            _ => None,
        }
    }

    fn keywords(self) -> &'static [&'static str] {
        match self {
            Self::Wroclaw => &["wrocław", "wroclaw"],
            Self::Remote => &["remote", "zdaln"],
            Self::Hybrid => &["hybrid", "hybrydow"],
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateRange {
    Today,
    Week,
    Month,
    #[default]
    All,
}

impl DateRange {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "today" => Self::Today,
            "week" => Self::Week,
            "month" => Self::Month,
            _ => Self::All,
        }
    }

    fn oldest(self, today: NaiveDate) -> Option<NaiveDate> {
        match self {
            Self::Today => Some(today),
            Self::Week => Some(today - Duration::days(7)),
            Self::Month => Some(today - Duration::days(30)),
            Self::All => None,
        }
    }
}

/// A parsed `/jobs` request.
#[derive(Debug, Clone, PartialEq)]
pub struct JobQuery {
    pub page: usize,
    pub limit: usize,
    pub search: Option<String>,
    pub sources: Vec<String>,
    pub work_types: Vec<WorkType>,
    pub locations: Vec<LocationType>,
    pub date_range: DateRange,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
            search: None,
            sources: Vec::new(),
            work_types: Vec::new(),
            locations: Vec::new(),
            date_range: DateRange::All,
        }
    }
}

impl JobQuery {
    /// Builds a query from raw `key=value` pairs. Facet keys may repeat and
    /// may hold comma separated values; unknown keys and values are ignored.
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        let mut query = JobQuery::default();

        for (key, value) in pairs {
            let values = || value.split(',').map(str::trim).filter(|v| !v.is_empty());
            match key.as_str() {
                "page" => {
                    if let Ok(page) = value.trim().parse::<usize>() {
                        query.page = page.max(1);
                    }
                }
                "limit" => {
                    if let Ok(limit) = value.trim().parse::<usize>() {
                        query.limit = limit.clamp(1, MAX_LIMIT);
                    }
                }
                "search" => {
                    let search = value.trim();
                    if !search.is_empty() {
                        query.search = Some(search.to_lowercase());
                    }
                }
                "source" => query.sources.extend(values().map(str::to_lowercase)),
                "workType" => query.work_types.extend(values().filter_map(WorkType::parse)),
                "location" => query.locations.extend(values().filter_map(LocationType::parse)),
                "dateRange" => query.date_range = DateRange::parse(value),
                _ => {}
            }
        }
        query
    }

    pub fn matches(&self, posting: &Posting, today: NaiveDate) -> bool {
        if let Some(search) = &self.search {
            if !matches_search(posting, search) {
                return false;
            }
        }
        if !self.sources.is_empty() && !self.sources.iter().any(|s| source_matches(&posting.source, s)) {
            return false;
        }
        if !self.work_types.is_empty() {
            let kinds = work_types(posting);
            if !self.work_types.iter().any(|w| kinds.contains(w)) {
                return false;
            }
        }
        if !self.locations.is_empty() {
            let kinds = location_types(posting);
            if !self.locations.iter().any(|l| kinds.contains(l)) {
                return false;
            }
        }
        match (self.date_range.oldest(today), posting.date.as_deref().and_then(parse_date)) {
            (Some(oldest), Some(date)) => date >= oldest,
            // no range, or a date we can't read
            _ => true,
        }
    }
}

fn matches_search(posting: &Posting, needle: &str) -> bool {
    [
        Some(posting.title.as_str()),
        Some(posting.company.as_str()),
        Some(posting.location.as_str()),
        posting.extra.get("description").map(String::as_str),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

/// Filter ids are short names ("pracuj", "justjoinit"), tags may carry a
/// domain ("pracuj.pl", "justjoin.it").
pub fn source_matches(tag: &str, id: &str) -> bool {
    let tag = tag.to_lowercase();
    tag == id || tag.replace('.', "") == id || tag.split('.').next() == Some(id)
}

/// Work types whose keywords show up in the title or source-specific
/// fields. A posting that mentions none counts as full-time.
pub fn work_types(posting: &Posting) -> Vec<WorkType> {
    let mut haystack = posting.title.to_lowercase();
    for value in posting.extra.values() {
        haystack.push(' ');
        haystack.push_str(&value.to_lowercase());
    }

    let found: Vec<WorkType> = [
        WorkType::Internship,
        WorkType::FullTime,
        WorkType::PartTime,
        WorkType::Contract,
    ]
    .into_iter()
    .filter(|w| w.keywords().iter().any(|k| haystack.contains(k)))
    .collect();

    if found.is_empty() {
        vec![WorkType::FullTime]
    } else {
        found
    }
}

pub fn location_types(posting: &Posting) -> Vec<LocationType> {
    let haystack = format!("{} {}", posting.location, posting.title).to_lowercase();
    [LocationType::Wroclaw, LocationType::Remote, LocationType::Hybrid]
        .into_iter()
        .filter(|l| l.keywords().iter().any(|k| haystack.contains(k)))
        .collect()
}

const POLISH_MONTHS: [&str; 12] = [
    "stycznia",
    "lutego",
    "marca",
    "kwietnia",
    "maja",
    "czerwca",
    "lipca",
    "sierpnia",
    "września",
    "października",
    "listopada",
    "grudnia",
];

/// Best-effort parse of the date strings boards display.
///
/// Handles ISO dates and timestamps, "March 4, 2025" and "4 marca 2025"
/// anywhere in the text. Relative phrases are not resolved.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(ts) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(ts.date_naive());
    }
    if let Some(date) = raw.get(..10).and_then(|p| NaiveDate::parse_from_str(p, "%Y-%m-%d").ok()) {
        return Some(date);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%B %d, %Y") {
        return Some(date);
    }

    let words: Vec<String> = raw
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| c == ',' || c == '.').to_lowercase())
        .collect();
    words.windows(3).find_map(|w| {
        let day = w[0].parse::<u32>().ok()?;
        let month = POLISH_MONTHS.iter().position(|m| *m == w[1])? as u32 + 1;
        let year = w[2].parse::<i32>().ok()?;
        NaiveDate::from_ymd_opt(year, month, day)
    })
}

/// One page of results; `total_pages` is 0 for an empty list.
#[derive(Debug, Clone, PartialEq)]
pub struct PageSlice<T> {
    pub total_items: usize,
    pub total_pages: usize,
    pub items: Vec<T>,
}

pub fn paginate<T>(items: Vec<T>, page: usize, limit: usize) -> PageSlice<T> {
    let limit = limit.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(limit);
    let start = page.saturating_sub(1).saturating_mul(limit);
    let items = items.into_iter().skip(start).take(limit).collect();
    PageSlice {
        total_items,
        total_pages,
        items,
    }
}
