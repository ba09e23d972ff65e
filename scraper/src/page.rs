//! Browser page abstraction.
//!
//! Extractors only ever talk to a [`Page`]: wait for a selector, read the
//! rendered HTML, scroll, click. The Chrome implementation drives one
//! `headless_chrome` tab per source; tests use the fake in [`fake`].

use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Result, ScrapeError};

/// A loaded page that an extractor can inspect and drive.
///
/// All calls block; the driver runs each source on its own blocking task.
pub trait Page {
    /// Current URL, used to resolve relative links.
    fn url(&self) -> String;

    /// Waits up to `timeout` for `selector` to match. Any failure counts as a miss.
    fn wait_for(&self, selector: &str, timeout: Duration) -> bool;

    /// The rendered document as HTML.
    fn content(&self) -> Result<String>;

    fn scroll_by(&self, dy: i64) -> Result<()>;

    /// Whether the first element matching `selector` has reached the viewport.
    fn in_viewport(&self, selector: &str) -> Result<bool>;

    /// Clicks the first enabled element matching `selector`.
    /// `Ok(false)` means there was nothing to click.
    fn click(&self, selector: &str) -> Result<bool>;

    /// Lets the page load whatever the last scroll or click triggered.
    fn settle(&self, delay: Duration) {
        if !delay.is_zero() {
            std::thread::sleep(delay);
        }
    }
}

/// Opens pages. Shared by every source task of a run.
pub trait Session: Send + Sync + 'static {
    type Page: Page;

    fn open(&self, url: &str) -> Result<Self::Page>;
}

/// A Chrome instance; each `open` creates a fresh tab.
pub struct ChromeSession {
    browser: Browser,
    user_agent: String,
    navigation_timeout: Duration,
}

impl ChromeSession {
    pub fn launch(config: &Config) -> Result<Self> {
        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .idle_browser_timeout(Duration::from_secs(600))
            .build()
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| ScrapeError::Browser(e.to_string()))?;

        Ok(Self {
            browser,
            user_agent: config.user_agent.clone(),
            navigation_timeout: config.navigation_timeout(),
        })
    }
}

impl Session for ChromeSession {
    type Page = ChromePage;

    fn open(&self, url: &str) -> Result<ChromePage> {
        let tab = self
            .browser
            .new_tab()
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;
        tab.set_default_timeout(self.navigation_timeout);
        tab.set_user_agent(&self.user_agent, None, None)
            .map_err(|e| ScrapeError::Browser(e.to_string()))?;

        tab.navigate_to(url)
            .map_err(|e| ScrapeError::Browser(format!("navigation to {} failed: {}", url, e)))?;

        // A slow page is still worth extracting from.
        if let Err(e) = tab.wait_until_navigated() {
            warn!(url, error = %e, "Page did not finish loading, continuing with partial state");
        }

        Ok(ChromePage { tab })
    }
}

pub struct ChromePage {
    tab: Arc<Tab>,
}

impl ChromePage {
    fn eval_bool(&self, script: &str) -> Result<bool> {
        let result = self
            .tab
            .evaluate(script, false)
            .map_err(|e| ScrapeError::invalidated(e.to_string()))?;
        Ok(result
            .value
            .and_then(|v| v.as_bool())
            .unwrap_or(false))
    }
}

/// Quotes a selector for embedding in a script.
fn js_string(selector: &str) -> String {
    serde_json::to_string(selector).unwrap_or_else(|_| "\"\"".to_string())
}

impl Page for ChromePage {
    fn url(&self) -> String {
        self.tab.get_url()
    }

    fn wait_for(&self, selector: &str, timeout: Duration) -> bool {
        match self.tab.wait_for_element_with_custom_timeout(selector, timeout) {
            Ok(_) => true,
            Err(e) => {
                debug!(selector, error = %e, "Selector not found");
                false
            }
        }
    }

    fn content(&self) -> Result<String> {
        self.tab
            .get_content()
            .map_err(|e| ScrapeError::invalidated(e.to_string()))
    }

    fn scroll_by(&self, dy: i64) -> Result<()> {
        self.eval_bool(&format!("window.scrollBy(0, {}); true", dy))
            .map(|_| ())
    }

    fn in_viewport(&self, selector: &str) -> Result<bool> {
        self.eval_bool(&format!(
            "(() => {{ const el = document.querySelector({}); \
             return !!el && el.getBoundingClientRect().top < window.innerHeight; }})()",
            js_string(selector)
        ))
    }

    fn click(&self, selector: &str) -> Result<bool> {
        self.eval_bool(&format!(
            "(() => {{ const el = document.querySelector({}); \
             if (!el || el.disabled) return false; el.click(); return true; }})()",
            js_string(selector)
        ))
    }
}

impl Drop for ChromePage {
    fn drop(&mut self) {
        if let Err(e) = self.tab.close(false) {
            debug!(error = %e, "Failed to close tab");
        }
    }
}
