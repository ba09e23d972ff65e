//! The generic extraction engine every site profile runs through.
//!
//! A [`SiteProfile`] is pure data: ordered selector candidates for the
//! listing container, the items, and each field. This module turns a
//! profile plus a [`Page`] into postings, including the scroll / load-more
//! loop for sources that paginate in place.

use common::{Posting, PostingSet};
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::{ScrollConfig, SourceConfig};
use crate::error::{Result, ScrapeError};
use crate::page::Page;
use crate::salary::parse_salary;

/// One way of locating a field inside an item.
#[derive(Debug, Clone, Copy)]
pub enum Matcher {
    /// First descendant matching the selector.
    Css(&'static str),
    /// Every descendant matching the selector, text joined with spaces.
    Joined(&'static str),
    /// First `target` under the closest ancestor of `icon`, i.e. the label next to an icon.
    BesideIcon {
        icon: &'static str,
        target: &'static str,
    },
    /// The item element itself.
    Itself,
}

#[derive(Debug, Clone, Copy)]
pub enum Read {
    Text,
    Attr(&'static str),
}

/// Ordered matchers for one field; the first non-empty hit wins.
#[derive(Debug, Clone, Copy)]
pub struct Field {
    pub matchers: &'static [Matcher],
    pub read: Read,
}

pub const fn text(matchers: &'static [Matcher]) -> Field {
    Field {
        matchers,
        read: Read::Text,
    }
}

pub const fn attr(name: &'static str, matchers: &'static [Matcher]) -> Field {
    Field {
        matchers,
        read: Read::Attr(name),
    }
}

pub const NONE: Field = text(&[]);

#[derive(Debug, Clone, Copy)]
pub enum Pagination {
    /// Only the first rendered page is read.
    None,
    /// Virtualized list: scroll until the footer shows up.
    Scroll { footer: &'static str },
    /// A button that appends the next batch in place.
    LoadMore { button: &'static str },
    /// A button that navigates to the next result page.
    NextPage { button: &'static str },
}

/// Everything needed to scrape one job board.
#[derive(Debug)]
pub struct SiteProfile {
    /// Config key and file stem.
    pub name: &'static str,
    /// Value written to `Posting::source`.
    pub tag: &'static str,
    pub containers: &'static [&'static str],
    pub container_wait: Duration,
    pub items: &'static [&'static str],
    pub title: Field,
    pub company: Field,
    pub location: Field,
    pub url: Field,
    pub salary: Field,
    pub date: Field,
    pub extras: &'static [(&'static str, Field)],
    pub company_default: &'static str,
    /// Single-employer boards always report this company.
    pub fixed_company: Option<&'static str>,
    pub pagination: Pagination,
    /// Drop items that resolve to no title or no URL.
    pub require_title_and_url: bool,
    /// Source-specific cleanup applied to every posting.
    pub finish: Option<fn(&mut Posting)>,
}

enum CompiledMatcher {
    Css(Selector),
    Joined(Selector),
    BesideIcon { icon: Selector, target: Selector },
    Itself,
}

struct CompiledField {
    matchers: Vec<CompiledMatcher>,
    read: Read,
}

fn css(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| ScrapeError::Selector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })
}

impl CompiledField {
    fn compile(field: &Field) -> Result<Self> {
        let matchers = field
            .matchers
            .iter()
            .map(|m| {
                Ok(match *m {
                    Matcher::Css(s) => CompiledMatcher::Css(css(s)?),
                    Matcher::Joined(s) => CompiledMatcher::Joined(css(s)?),
                    Matcher::BesideIcon { icon, target } => CompiledMatcher::BesideIcon {
                        icon: css(icon)?,
                        target: css(target)?,
                    },
                    Matcher::Itself => CompiledMatcher::Itself,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            matchers,
            read: field.read,
        })
    }

    fn read(&self, item: ElementRef<'_>, base: Option<&Url>) -> Option<String> {
        self.matchers.iter().find_map(|matcher| {
            let value = match matcher {
                CompiledMatcher::Css(sel) => item.select(sel).next().and_then(|el| self.value(el, base)),
                CompiledMatcher::Joined(sel) => {
                    let joined = item
                        .select(sel)
                        .map(inner_text)
                        .filter(|t| !t.is_empty())
                        .collect::<Vec<_>>()
                        .join(" ");
                    Some(joined)
                }
                CompiledMatcher::BesideIcon { icon, target } => item
                    .select(icon)
                    .next()
                    .and_then(|icon| beside(item, icon, target))
                    .and_then(|el| self.value(el, base)),
                CompiledMatcher::Itself => self.value(item, base),
            };
            value.filter(|v| !v.is_empty())
        })
    }

    fn value(&self, el: ElementRef<'_>, base: Option<&Url>) -> Option<String> {
        match self.read {
            Read::Text => Some(inner_text(el)),
            Read::Attr(name) => {
                let raw = el.value().attr(name)?.trim();
                if name == "href" {
                    Some(absolutize(raw, base))
                } else {
                    Some(raw.to_string())
                }
            }
        }
    }
}

/// Walks up from `icon` (not past `item`) to the first ancestor holding a `target`.
fn beside<'a>(item: ElementRef<'a>, icon: ElementRef<'a>, target: &Selector) -> Option<ElementRef<'a>> {
    let mut node = icon.parent();
    while let Some(current) = node {
        if let Some(el) = ElementRef::wrap(current) {
            if let Some(found) = el.select(target).next() {
                return Some(found);
            }
            if el.id() == item.id() {
                break;
            }
        }
        node = current.parent();
    }
    None
}

/// Visible text with whitespace collapsed, roughly what `innerText` gives.
pub fn inner_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn absolutize(href: &str, base: Option<&Url>) -> String {
    match base.map(|b| b.join(href)) {
        Some(Ok(url)) => url.to_string(),
        _ => href.to_string(),
    }
}

/// A profile with its selectors parsed, ready to run over page snapshots.
pub struct Extractor {
    profile: &'static SiteProfile,
    base: Selector,
    items: Vec<Selector>,
    title: CompiledField,
    company: CompiledField,
    location: CompiledField,
    url: CompiledField,
    salary: CompiledField,
    date: CompiledField,
    extras: Vec<(&'static str, CompiledField)>,
}

impl Extractor {
    pub fn new(profile: &'static SiteProfile) -> Result<Self> {
        Ok(Self {
            profile,
            base: css("base[href]")?,
            items: profile.items.iter().map(|s| css(s)).collect::<Result<_>>()?,
            title: CompiledField::compile(&profile.title)?,
            company: CompiledField::compile(&profile.company)?,
            location: CompiledField::compile(&profile.location)?,
            url: CompiledField::compile(&profile.url)?,
            salary: CompiledField::compile(&profile.salary)?,
            date: CompiledField::compile(&profile.date)?,
            extras: profile
                .extras
                .iter()
                .map(|(key, field)| Ok((*key, CompiledField::compile(field)?)))
                .collect::<Result<_>>()?,
        })
    }

    pub fn profile(&self) -> &'static SiteProfile {
        self.profile
    }

    /// Postings visible in one HTML snapshot.
    pub fn extract(&self, html: &str, page_url: &str) -> Vec<Posting> {
        let document = Html::parse_document(html);
        let page_url = Url::parse(page_url).ok();
        // relative links resolve against <base href> when the page declares one
        let base = document
            .select(&self.base)
            .next()
            .and_then(|el| el.value().attr("href"))
            .and_then(|href| match &page_url {
                Some(url) => url.join(href).ok(),
                None => Url::parse(href).ok(),
            })
            .or(page_url);

        let Some(items) = self
            .items
            .iter()
            .map(|sel| document.select(sel).collect::<Vec<_>>())
            .find(|found| !found.is_empty())
        else {
            debug!(source = self.profile.name, "No item selector matched");
            return Vec::new();
        };

        items
            .into_iter()
            .filter_map(|item| self.posting(item, base.as_ref()))
            .collect()
    }

    fn posting(&self, item: ElementRef<'_>, base: Option<&Url>) -> Option<Posting> {
        let profile = self.profile;
        let mut posting = Posting::new(profile.tag);

        if let Some(title) = self.title.read(item, base) {
            posting.title = title;
        }
        posting.company = match profile.fixed_company {
            Some(company) => company.to_string(),
            None => self
                .company
                .read(item, base)
                .unwrap_or_else(|| profile.company_default.to_string()),
        };
        if let Some(location) = self.location.read(item, base) {
            posting.location = location;
        }
        if let Some(url) = self.url.read(item, base) {
            posting.url = url;
        }
        if let Some(salary_text) = self.salary.read(item, base) {
            let salary = parse_salary(&salary_text);
            posting.salary_min = salary.min;
            posting.salary_max = salary.max;
            posting.salary_type = salary.kind;
            posting.extra.insert("salaryText".to_string(), salary_text);
        }
        posting.date = self.date.read(item, base);
        for (key, field) in &self.extras {
            if let Some(value) = field.read(item, base) {
                posting.extra.insert(key.to_string(), value);
            }
        }

        if let Some(finish) = profile.finish {
            finish(&mut posting);
        }

        if profile.require_title_and_url && !(posting.has_title() && posting.has_url()) {
            return None;
        }
        Some(posting)
    }
}

/// Tries each container candidate in order, waiting up to `wait` for each.
pub fn discover_container<P: Page>(page: &P, profile: &SiteProfile, wait: Duration) -> Option<&'static str> {
    for &selector in profile.containers {
        if page.wait_for(selector, wait) {
            info!(source = profile.name, selector, "Job list container found");
            return Some(selector);
        }
        debug!(source = profile.name, selector, "Container selector not found, trying next");
    }
    None
}

/// Why a pagination loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    SinglePage,
    FooterVisible,
    RoundsExhausted,
    Stalled,
    NoMoreControl,
    PageInvalidated,
}

/// Extracts, then scrolls or clicks, until the stop policy fires.
///
/// Stops on: footer in view, `max_rounds` / `max_clicks` reached,
/// `stall_rounds` rounds without a new URL, no clickable control, or any
/// page failure. Everything collected up to that point is returned.
pub fn paginate<P: Page>(page: &P, extractor: &Extractor, scroll: &ScrollConfig) -> (Vec<Posting>, StopReason) {
    let profile = extractor.profile();
    let max_rounds = match profile.pagination {
        Pagination::None => 1,
        Pagination::Scroll { .. } => scroll.max_rounds,
        Pagination::LoadMore { .. } | Pagination::NextPage { .. } => scroll.max_clicks,
    }
    .max(1);

    let mut seen = PostingSet::new();
    let mut stalled = 0;

    for round in 1..=max_rounds {
        let html = match page.content() {
            Ok(html) => html,
            Err(e) => {
                warn!(source = profile.name, round, error = %e, "Page went away, keeping what we have");
                return (seen.into_vec(), StopReason::PageInvalidated);
            }
        };

        let batch = extractor.extract(&html, &page.url());
        let visible = batch.len();
        let added = seen.extend(batch);
        debug!(source = profile.name, round, visible, added, total = seen.len(), "Extracted round");

        if added == 0 {
            stalled += 1;
            if stalled >= scroll.stall_rounds.max(1) && !matches!(profile.pagination, Pagination::None) {
                info!(source = profile.name, rounds = stalled, "No new postings, stopping");
                return (seen.into_vec(), StopReason::Stalled);
            }
        } else {
            stalled = 0;
        }

        let advanced = match profile.pagination {
            Pagination::None => return (seen.into_vec(), StopReason::SinglePage),
            _ if round == max_rounds => break,
            Pagination::Scroll { footer } => match page.in_viewport(footer) {
                Ok(true) => {
                    info!(source = profile.name, round, "Reached the footer");
                    return (seen.into_vec(), StopReason::FooterVisible);
                }
                Ok(false) => page.scroll_by(scroll.step_px).map(|_| true),
                Err(e) => Err(e),
            },
            Pagination::LoadMore { button } | Pagination::NextPage { button } => page.click(button),
        };

        match advanced {
            Ok(true) => {
                page.settle(scroll.settle());
                if let (Pagination::NextPage { .. }, Some(items)) = (profile.pagination, profile.items.first()) {
                    page.wait_for(items, profile.container_wait);
                }
            }
            Ok(false) => {
                info!(source = profile.name, round, "No more pages to load");
                return (seen.into_vec(), StopReason::NoMoreControl);
            }
            Err(e) => {
                warn!(source = profile.name, round, error = %e, "Page went away, keeping what we have");
                return (seen.into_vec(), StopReason::PageInvalidated);
            }
        }
    }

    info!(source = profile.name, rounds = max_rounds, "Round limit reached");
    (seen.into_vec(), StopReason::RoundsExhausted)
}

/// Runs one source end to end on an already-navigated page.
///
/// Never fails: a broken profile or a dead page yields an empty or partial
/// list, so one source can't take the whole run down.
pub fn run_source<P: Page>(
    page: &P,
    profile: &'static SiteProfile,
    source: &SourceConfig,
    scroll: &ScrollConfig,
) -> Vec<Posting> {
    let extractor = match Extractor::new(profile) {
        Ok(extractor) => extractor,
        Err(e) => {
            warn!(source = profile.name, error = %e, "Profile failed to compile");
            return Vec::new();
        }
    };

    let wait = source
        .wait_secs
        .map(Duration::from_secs)
        .unwrap_or(profile.container_wait);

    if discover_container(page, profile, wait).is_none() {
        warn!(source = profile.name, "No job container found, extracting whatever is there");
        page.settle(scroll.settle());
    }

    let (postings, reason) = paginate(page, &extractor, scroll);
    info!(source = profile.name, count = postings.len(), stop = ?reason, "Extraction finished");
    postings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::fake::{FakePage, FakeSpec};
    use common::{SalaryType, NO_LOCATION, NO_TITLE};

    fn profile(pagination: Pagination) -> &'static SiteProfile {
        Box::leak(Box::new(SiteProfile {
            name: "test",
            tag: "test.example",
            containers: &["ul.missing", "ul.jobs"],
            container_wait: Duration::from_millis(1),
            items: &["ul.nope > li", "ul.jobs > li"],
            title: text(&[Matcher::Css("h2"), Matcher::Css("h3")]),
            company: text(&[Matcher::BesideIcon {
                icon: "svg[data-testid=\"ApartmentRoundedIcon\"]",
                target: "span",
            }]),
            location: text(&[Matcher::Css(".city")]),
            url: attr("href", &[Matcher::Css("a")]),
            salary: text(&[Matcher::Css(".salary")]),
            date: NONE,
            extras: &[],
            company_default: "No company",
            fixed_company: None,
            pagination,
            require_title_and_url: false,
            finish: None,
        }))
    }

    fn item(id: u32) -> String {
        format!(
            r#"<li><a href="/offer/{id}"><h3>Job {id}</h3></a>
               <div><svg data-testid="ApartmentRoundedIcon"></svg><span>Acme {id}</span></div>
               <span class="salary">5 000 - 8 000 PLN/mies</span></li>"#
        )
    }

    fn frame(ids: &[u32]) -> String {
        let items: String = ids.iter().map(|&id| item(id)).collect();
        format!("<html><body><ul class=\"jobs\">{items}</ul><footer>f</footer></body></html>")
    }

    fn scroll_config() -> ScrollConfig {
        ScrollConfig {
            max_rounds: 20,
            max_clicks: 10,
            stall_rounds: 3,
            step_px: 300,
            settle_ms: 0,
        }
    }

    #[test]
    fn test_extract_fields_and_fallbacks() {
        let extractor = Extractor::new(profile(Pagination::None)).unwrap();
        let html = r#"<ul class="jobs">
            <li><a href="/offer/1"><h3>Rust Developer</h3></a>
                <div><svg data-testid="ApartmentRoundedIcon"></svg><span>Acme</span></div>
                <span class="salary">40 PLN/godz</span></li>
            <li><p>nothing useful</p></li>
        </ul>"#;

        let postings = extractor.extract(html, "https://jobs.example/search?q=x");
        assert_eq!(postings.len(), 2);

        let first = &postings[0];
        assert_eq!(first.title, "Rust Developer");
        assert_eq!(first.company, "Acme");
        assert_eq!(first.url, "https://jobs.example/offer/1");
        assert_eq!(first.location, NO_LOCATION);
        assert_eq!(first.salary_min, Some(40.0));
        assert_eq!(first.salary_type, Some(SalaryType::Hourly));
        assert_eq!(first.source, "test.example");

        let second = &postings[1];
        assert_eq!(second.title, NO_TITLE);
        assert_eq!(second.company, "No company");
        assert!(!second.has_url());
        assert_eq!(second.salary_min, None);
    }

    #[test]
    fn test_extract_no_items_is_empty() {
        let extractor = Extractor::new(profile(Pagination::None)).unwrap();
        assert!(extractor.extract("<html><body><p>captcha</p></body></html>", "https://x").is_empty());
    }

    #[test]
    fn test_discover_container_falls_through_candidates() {
        let page = FakePage::new("https://x", FakeSpec::frames([frame(&[1])]));
        assert_eq!(
            discover_container(&page, profile(Pagination::None), Duration::ZERO),
            Some("ul.jobs")
        );

        let empty = FakePage::new("https://x", FakeSpec::frames(["<p>blocked</p>"]));
        assert_eq!(discover_container(&empty, profile(Pagination::None), Duration::ZERO), None);
    }

    #[test]
    fn test_scroll_stops_at_footer() {
        let spec = FakeSpec::frames([frame(&[1, 2]), frame(&[2, 3]), frame(&[3, 4])]).footer_from(2);
        let page = FakePage::new("https://x", spec);
        let extractor = Extractor::new(profile(Pagination::Scroll { footer: "footer" })).unwrap();

        let (postings, reason) = paginate(&page, &extractor, &scroll_config());
        assert_eq!(reason, StopReason::FooterVisible);
        assert_eq!(postings.len(), 4);
    }

    #[test]
    fn test_scroll_stops_after_stalled_rounds() {
        let spec = FakeSpec::frames([frame(&[1, 2])]);
        let page = FakePage::new("https://x", spec);
        let extractor = Extractor::new(profile(Pagination::Scroll { footer: "footer" })).unwrap();

        let (postings, reason) = paginate(&page, &extractor, &scroll_config());
        assert_eq!(reason, StopReason::Stalled);
        assert_eq!(postings.len(), 2);
        // one productive round, then three without growth
        assert_eq!(page.scrolls.load(std::sync::atomic::Ordering::SeqCst), 3);
    }

    #[test]
    fn test_scroll_respects_round_limit() {
        let frames: Vec<String> = (0..30).map(|i| frame(&[i])).collect();
        let page = FakePage::new("https://x", FakeSpec::frames(frames));
        let extractor = Extractor::new(profile(Pagination::Scroll { footer: "footer" })).unwrap();
        let mut config = scroll_config();
        config.max_rounds = 5;

        let (postings, reason) = paginate(&page, &extractor, &config);
        assert_eq!(reason, StopReason::RoundsExhausted);
        assert_eq!(postings.len(), 5);
    }

    #[test]
    fn test_load_more_until_button_gone() {
        let spec = FakeSpec::frames([frame(&[1]), frame(&[1, 2]), frame(&[1, 2, 3])]);
        let page = FakePage::new("https://x", spec);
        let extractor = Extractor::new(profile(Pagination::LoadMore { button: "button" })).unwrap();

        let (postings, reason) = paginate(&page, &extractor, &scroll_config());
        assert_eq!(reason, StopReason::NoMoreControl);
        assert_eq!(postings.len(), 3);
    }

    #[test]
    fn test_load_more_respects_click_limit() {
        let frames: Vec<String> = (0..15u32).map(|i| frame(&(0..=i).collect::<Vec<_>>())).collect();
        let page = FakePage::new("https://x", FakeSpec::frames(frames));
        let extractor = Extractor::new(profile(Pagination::LoadMore { button: "button" })).unwrap();

        let (postings, reason) = paginate(&page, &extractor, &scroll_config());
        assert_eq!(reason, StopReason::RoundsExhausted);
        assert_eq!(postings.len(), 10);
        // the last round extracts without clicking again
        assert_eq!(page.clicks.load(std::sync::atomic::Ordering::SeqCst), 9);
    }

    #[test]
    fn test_next_page_accumulates_and_dedups() {
        let spec = FakeSpec::frames([frame(&[1, 2]), frame(&[2, 3]), frame(&[3, 4])]);
        let page = FakePage::new("https://x", spec);
        let extractor = Extractor::new(profile(Pagination::NextPage { button: "a.next" })).unwrap();

        let (postings, reason) = paginate(&page, &extractor, &scroll_config());
        assert_eq!(reason, StopReason::NoMoreControl);
        let urls: Vec<&str> = postings.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://x/offer/1",
                "https://x/offer/2",
                "https://x/offer/3",
                "https://x/offer/4"
            ]
        );
        // items are awaited again after each successful navigation
        assert_eq!(page.waits.load(std::sync::atomic::Ordering::SeqCst), 2);
        assert_eq!(page.scrolls.load(std::sync::atomic::Ordering::SeqCst), 0);
    }

    #[test]
    fn test_next_page_respects_click_limit() {
        let frames: Vec<String> = (0..15u32).map(|i| frame(&[i])).collect();
        let page = FakePage::new("https://x", FakeSpec::frames(frames));
        let extractor = Extractor::new(profile(Pagination::NextPage { button: "a.next" })).unwrap();
        let mut config = scroll_config();
        config.max_clicks = 4;

        let (postings, reason) = paginate(&page, &extractor, &config);
        assert_eq!(reason, StopReason::RoundsExhausted);
        assert_eq!(postings.len(), 4);
    }

    #[test]
    fn test_page_invalidated_mid_loop_keeps_collected() {
        // content, in_viewport, scroll, content, in_viewport -> then dead
        let spec = FakeSpec::frames([frame(&[1, 2]), frame(&[3]), frame(&[4])]).fail_after(5);
        let page = FakePage::new("https://x", spec);
        let extractor = Extractor::new(profile(Pagination::Scroll { footer: "footer" })).unwrap();

        let (postings, reason) = paginate(&page, &extractor, &scroll_config());
        assert_eq!(reason, StopReason::PageInvalidated);
        assert_eq!(postings.len(), 3);
    }

    #[test]
    fn test_run_source_on_dead_page_is_empty() {
        let page = FakePage::new("https://x", FakeSpec::frames([frame(&[1])]).fail_after(0));
        let source = SourceConfig {
            name: "test".into(),
            url: "https://x".into(),
            enabled: true,
            wait_secs: Some(0),
        };
        let postings = run_source(&page, profile(Pagination::None), &source, &scroll_config());
        assert!(postings.is_empty());
    }

    #[test]
    fn test_bad_selector_is_reported() {
        let broken: &'static SiteProfile = Box::leak(Box::new(SiteProfile {
            items: &["li[[["],
            ..clone_profile(profile(Pagination::None))
        }));
        assert!(matches!(Extractor::new(broken), Err(ScrapeError::Selector { .. })));
    }

    fn clone_profile(p: &SiteProfile) -> SiteProfile {
        SiteProfile {
            name: p.name,
            tag: p.tag,
            containers: p.containers,
            container_wait: p.container_wait,
            items: p.items,
            title: p.title,
            company: p.company,
            location: p.location,
            url: p.url,
            salary: p.salary,
            date: p.date,
            extras: p.extras,
            company_default: p.company_default,
            fixed_company: p.fixed_company,
            pagination: p.pagination,
            require_title_and_url: p.require_title_and_url,
            finish: p.finish,
        }
    }
}
