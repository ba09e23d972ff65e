use common::{Posting, NO_COMPANY};
use std::time::Duration;

use crate::extract::{attr, text, Matcher::Css, Pagination, SiteProfile, NONE};

pub static PROFILE: SiteProfile = SiteProfile {
    name: "amazon",
    tag: "amazon",
    containers: &[
        ".job-tile-lists",
        "[data-testid=\"job-list\"]",
        ".job-list",
        "[role=\"list\"]",
        ".jobs-container",
        "ul[class*=\"job\"]",
        "div[class*=\"job\"]",
        ".search-results",
        ".results-container",
    ],
    container_wait: Duration::from_secs(15),
    items: &[
        ".job-tile",
        "[data-testid=\"job-card\"]",
        ".job-card",
        "[role=\"listitem\"]",
        "li[class*=\"job\"]",
        "div[class*=\"job\"]",
        "article",
        ".job-item",
        ".search-result-item",
    ],
    title: text(&[
        Css("h3.job-title a.job-link"),
        Css("h3 a"),
        Css("h2 a"),
        Css(".job-title a"),
        Css("a[href*=\"/job/\"]"),
    ]),
    company: NONE,
    location: text(&[
        Css(".location-and-id ul li.text-nowrap"),
        Css(".location"),
        Css(".job-location"),
    ]),
    url: attr("href", &[
        Css("h3.job-title a.job-link"),
        Css("h3 a"),
        Css("h2 a"),
        Css(".job-title a"),
        Css("a[href*=\"/job/\"]"),
    ]),
    salary: NONE,
    date: text(&[Css("h2.posting-date"), Css(".posting-date"), Css(".date")]),
    extras: &[(
        "jobId",
        text(&[Css(".location-and-id ul li:nth-child(3)"), Css(".job-id")]),
    )],
    company_default: NO_COMPANY,
    fixed_company: Some("Amazon"),
    pagination: Pagination::None,
    require_title_and_url: false,
    finish: Some(finish),
};

fn finish(posting: &mut Posting) {
    if let Some(id) = posting.extra.get_mut("jobId") {
        *id = id.trim_start_matches("Job ID:").trim().to_string();
    }
    if let Some(date) = posting.date.as_mut() {
        *date = date.trim_start_matches("Posted").trim().to_string();
    }
}
