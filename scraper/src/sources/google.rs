use std::time::Duration;

use crate::extract::{attr, text, Matcher::Css, Pagination, SiteProfile, NONE};

pub static PROFILE: SiteProfile = SiteProfile {
    name: "google",
    tag: "google",
    containers: &[
        "ul.spHGqe",
        "[data-testid=\"job-card\"]",
        ".job-card",
        "ul[role=\"list\"]",
        ".job-listing",
    ],
    container_wait: Duration::from_secs(10),
    items: &[
        "ul.spHGqe > li.lLd3Je",
        "[data-testid=\"job-card\"]",
        ".job-card",
        "ul[role=\"list\"] > li",
        ".job-listing",
    ],
    title: text(&[
        Css("h3"),
        Css("h2"),
        Css(".job-title"),
        Css("[data-testid=\"job-title\"]"),
    ]),
    company: text(&[Css(".company"), Css("[data-testid=\"company\"]")]),
    location: text(&[
        Css("span.r0wTof"),
        Css(".location"),
        Css("[data-testid=\"location\"]"),
    ]),
    url: attr("href", &[Css("a")]),
    salary: NONE,
    date: NONE,
    extras: &[],
    company_default: "Google",
    fixed_company: None,
    pagination: Pagination::None,
    require_title_and_url: false,
    finish: None,
};
