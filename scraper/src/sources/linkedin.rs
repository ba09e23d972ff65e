//! LinkedIn's public (logged-out) job search.

use common::{Posting, NO_COMPANY};
use std::time::Duration;

use super::strip_query;
use crate::extract::{attr, text, Matcher::Css, Pagination, SiteProfile};

pub static PROFILE: SiteProfile = SiteProfile {
    name: "linkedin",
    tag: "linkedin",
    containers: &[
        "ul.jobs-search__results-list",
        ".jobs-search__results-list",
        "section.two-pane-serp-page__results-list",
    ],
    container_wait: Duration::from_secs(20),
    items: &["ul.jobs-search__results-list > li", ".base-card"],
    title: text(&[Css(".base-search-card__title"), Css("h3")]),
    company: text(&[
        Css(".base-search-card__subtitle a"),
        Css(".base-search-card__subtitle"),
        Css("h4"),
    ]),
    location: text(&[Css(".job-search-card__location")]),
    url: attr("href", &[Css("a.base-card__full-link"), Css("a")]),
    salary: text(&[Css(".job-search-card__salary-info")]),
    date: attr("datetime", &[Css("time")]),
    extras: &[],
    company_default: NO_COMPANY,
    fixed_company: None,
    pagination: Pagination::Scroll { footer: "footer" },
    require_title_and_url: false,
    finish: Some(finish),
};

fn finish(posting: &mut Posting) {
    // refId/trackingId change on every render and would defeat dedup
    strip_query(&mut posting.url);
}
