use common::{Posting, UNKNOWN_COMPANY};
use std::time::Duration;

use crate::extract::{attr, text, Matcher::Css, Pagination, SiteProfile};

pub static PROFILE: SiteProfile = SiteProfile {
    name: "pracuj",
    tag: "pracuj.pl",
    containers: &["[data-test=\"section-offers\"]"],
    container_wait: Duration::from_secs(60),
    items: &["[data-test=\"section-offers\"] [data-test=\"default-offer\"]"],
    title: text(&[Css("[data-test=\"offer-title\"]")]),
    company: text(&[
        Css("[data-test=\"section-company\"] [data-test=\"text-company-name\"]"),
        Css("[data-test=\"text-company-name\"]"),
    ]),
    location: text(&[Css("[data-test=\"text-region\"]")]),
    url: attr("href", &[Css("a[data-test=\"link-offer\"]"), Css("a")]),
    salary: text(&[Css("[data-test=\"offer-salary\"]")]),
    date: text(&[Css("[data-test=\"text-added\"]")]),
    extras: &[],
    company_default: UNKNOWN_COMPANY,
    fixed_company: None,
    pagination: Pagination::NextPage {
        button: "button[data-test=\"bottom-pagination-button-next\"]",
    },
    require_title_and_url: false,
    finish: Some(finish),
};

fn finish(posting: &mut Posting) {
    if let Some(date) = posting.date.take() {
        let date = date.trim_start_matches("Opublikowana:").trim().to_string();
        posting.date = Some(date).filter(|d| !d.is_empty());
    }
}
