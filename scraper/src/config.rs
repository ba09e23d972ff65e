//! Run configuration.
//!
//! Loaded once at start-up from a TOML file and handed to the driver, the
//! browser session and the logo resolver. Every field has a default so an
//! empty or missing file gives a working run over all eight sources.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

use crate::error::{Result, ScrapeError};
use crate::sources;

pub const DEFAULT_CONFIG_PATH: &str = "scraper.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data_dir: PathBuf,
    pub user_agent: String,
    pub headless: bool,
    pub navigation_timeout_secs: u64,
    pub scroll: ScrollConfig,
    pub logo: LogoConfig,
    pub sources: Vec<SourceConfig>,
}

/// Bounds for the pagination loop shared by every paginated source.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    /// Hard cap on iterations for infinite-scroll sources.
    pub max_rounds: usize,
    /// Hard cap on iterations for load-more and next-page sources.
    pub max_clicks: usize,
    /// Consecutive iterations without a new URL before giving up.
    pub stall_rounds: usize,
    pub step_px: i64,
    pub settle_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LogoConfig {
    pub enabled: bool,
    pub service_url: String,
    pub tlds: Vec<String>,
    pub timeout_secs: u64,
    /// Upper bound on in-flight company lookups.
    pub concurrency: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Overrides the profile's container wait budget.
    #[serde(default)]
    pub wait_secs: Option<u64>,
}

fn default_enabled() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36".to_string(),
            headless: true,
            navigation_timeout_secs: 30,
            scroll: ScrollConfig::default(),
            logo: LogoConfig::default(),
            sources: default_sources(),
        }
    }
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            max_rounds: 20,
            max_clicks: 10,
            stall_rounds: 3,
            step_px: 300,
            settle_ms: 500,
        }
    }
}

impl Default for LogoConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            service_url: "https://logo.clearbit.com".to_string(),
            tlds: ["com", "pl", "eu", "org", "net", "de", "fr"]
                .iter()
                .map(|t| t.to_string())
                .collect(),
            timeout_secs: 5,
            concurrency: 32,
        }
    }
}

impl ScrollConfig {
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}

impl LogoConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Config {
    /// Reads `path` if it exists, otherwise falls back to the built-in defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|e| ScrapeError::io(path, e))?;
            let config: Config = toml::from_str(&raw)
                .map_err(|e| ScrapeError::Config(format!("{}: {}", path.display(), e)))?;
            info!(path = %path.display(), "Loaded config");
            config
        } else {
            info!(path = %path.display(), "No config file, using defaults");
            Config::default()
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for source in &self.sources {
            if sources::profile(&source.name).is_none() {
                return Err(ScrapeError::Config(format!(
                    "unknown source `{}` (known: {})",
                    source.name,
                    sources::names().join(", ")
                )));
            }
        }
        if self.logo.concurrency == 0 {
            return Err(ScrapeError::Config("logo.concurrency must be at least 1".into()));
        }
        Ok(())
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    /// Sources that take part in this run, optionally narrowed to `only`.
    pub fn active_sources(&self, only: &[String]) -> Vec<&SourceConfig> {
        self.sources
            .iter()
            .filter(|s| s.enabled)
            .filter(|s| only.is_empty() || only.iter().any(|o| o == &s.name))
            .collect()
    }
}

fn default_sources() -> Vec<SourceConfig> {
    let source = |name: &str, url: &str| SourceConfig {
        name: name.to_string(),
        url: url.to_string(),
        enabled: true,
        wait_secs: None,
    };

    vec![
        source("pracuj", "https://www.pracuj.pl/praca/wroclaw;wp?rd=10&et=1,3,17&wm=hybrid,full-office"),
        source("justjoinit", "https://justjoin.it/job-offers/wroclaw?experience-level=junior&orderBy=DESC&sortBy=published"),
        source("rocketjobs", "https://rocketjobs.pl/oferty-pracy/wroclaw?doswiadczenie=staz-junior&orderBy=DESC&sortBy=published"),
        source("google", "https://www.google.com/about/careers/applications/jobs/results?location=Wroclaw%20Poland&target_level=EARLY&target_level=INTERN_AND_APPRENTICE"),
        source("amazon", "https://amazon.jobs/en/search?offset=0&result_limit=10&sort=relevant&distanceType=Mi&radius=24km&industry_experience=less_than_1_year&latitude=51.10825&longitude=17.02691&loc_query=Wroclaw,%20Lower%20Silesian%20Voivodeship,%20Poland&city=Wroclaw&country=POL&region=Lower%20Silesian%20Voivodeship&county=Wroclaw"),
        source("nofluffjobs", "https://nofluffjobs.com/pl/wroclaw?criteria=seniority%3Dtrainee,junior"),
        source("linkedin", "https://www.linkedin.com/jobs/search/?distance=25&f_E=1,2&f_PP=101832192&geoId=90009834&sortBy=R"),
        source("olx", "https://www.olx.pl/praca/wroclaw/?search%5Bdist%5D=2&search%5Bfilter_enum_agreement%5D%5B0%5D=practice"),
    ]
}
