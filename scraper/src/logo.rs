//! Best-effort company logos.
//!
//! There is no lookup table: the company name is turned into a handful of
//! guessed domains and each one is checked against the logo service until
//! one answers 200.

use common::{is_real_company, Posting};
use futures::stream::{self, StreamExt};
use regex::Regex;
use reqwest::{Client, StatusCode};
use std::collections::HashMap;
use std::sync::OnceLock;
use tracing::{debug, info};
use url::Url;

use crate::config::LogoConfig;
use crate::error::{Result, ScrapeError};

fn legal_suffix() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\s+(sp\.?\s*z\s*o\.?o\.?|s\.?a\.?|ltd\.?|inc\.?|llc\.?|corp\.?|gmbh|ag|s\.r\.o\.?|a\.s\.?)$")
            .unwrap()
    })
}

/// Drops one trailing legal-entity suffix: "Acme sp. z o.o." -> "Acme".
pub fn normalize_company(name: &str) -> String {
    legal_suffix().replace(name.trim(), "").trim().to_string()
}

pub struct LogoResolver {
    client: Client,
    service: Url,
    tlds: Vec<String>,
    concurrency: usize,
}

impl LogoResolver {
    pub fn new(config: &LogoConfig) -> Result<Self> {
        let service = Url::parse(&config.service_url)
            .map_err(|e| ScrapeError::Config(format!("logo.service_url: {}", e)))?;
        if service.cannot_be_a_base() {
            return Err(ScrapeError::Config(format!(
                "logo.service_url `{}` cannot take a path",
                config.service_url
            )));
        }

        let client = Client::builder().timeout(config.timeout()).build()?;

        Ok(Self {
            client,
            service,
            tlds: config.tlds.clone(),
            concurrency: config.concurrency.max(1),
        })
    }

    /// Candidate logo URLs for `company`, in TLD order.
    fn candidates(&self, company: &str) -> Vec<Url> {
        let stem = normalize_company(company).to_lowercase();
        if stem.is_empty() {
            return Vec::new();
        }

        self.tlds
            .iter()
            .filter_map(|tld| {
                let mut url = self.service.clone();
                url.path_segments_mut()
                    .ok()?
                    .pop_if_empty()
                    .push(&format!("{}.{}", stem, tld));
                Some(url)
            })
            .collect()
    }

    async fn exists(&self, url: &Url) -> bool {
        match self.client.get(url.clone()).send().await {
            Ok(response) => response.status() == StatusCode::OK,
            Err(e) => {
                debug!(%url, error = %e, "Logo lookup failed");
                false
            }
        }
    }

    /// First logo URL the service confirms, or `None`.
    pub async fn resolve(&self, company: &str) -> Option<String> {
        if !is_real_company(company) {
            return None;
        }

        for url in self.candidates(company) {
            if self.exists(&url).await {
                debug!(company, logo = %url, "Found logo");
                return Some(url.to_string());
            }
        }
        None
    }

    /// Sets `logo_url` on every posting. Each distinct company is looked up
    /// once, with up to `concurrency` lookups in flight.
    pub async fn attach(&self, postings: &mut [Posting]) -> usize {
        let mut companies: Vec<String> = postings
            .iter()
            .filter(|p| p.has_company())
            .map(|p| p.company.clone())
            .collect();
        companies.sort();
        companies.dedup();

        info!(jobs = postings.len(), companies = companies.len(), "🖼️ Looking up logos");

        let found: HashMap<String, Option<String>> = stream::iter(companies)
            .map(|company| async move {
                let logo = self.resolve(&company).await;
                (company, logo)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        let mut with_logo = 0;
        for posting in postings.iter_mut() {
            posting.logo_url = found.get(&posting.company).cloned().flatten();
            if posting.logo_url.is_some() {
                with_logo += 1;
            }
        }

        info!(with_logo, total = postings.len(), "Logos attached");
        with_logo
    }
}
