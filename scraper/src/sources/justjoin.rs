//! justjoin.it. Rocketjobs runs on the same front-end, so the virtualized
//! list fields here are shared with it.

use common::{Posting, NO_COMPANY};
use std::time::Duration;

use crate::extract::{attr, text, Field, Matcher, Pagination, SiteProfile, NONE};
use crate::salary::parse_thousands_salary;

pub(super) const LIST: &str = "[data-test-id=\"virtuoso-item-list\"]";
pub(super) const ITEMS: &[&str] = &[
    "[data-test-id=\"virtuoso-item-list\"] [item=\"[object Object]\"]",
    "[data-test-id=\"virtuoso-item-list\"] > div",
];

pub(super) const TITLE: Field = text(&[Matcher::Css("h3"), Matcher::Css("h2")]);
pub(super) const COMPANY: Field = text(&[Matcher::BesideIcon {
    icon: "svg[data-testid=\"ApartmentRoundedIcon\"]",
    target: "span",
}]);
pub(super) const LOCATION: Field = text(&[Matcher::BesideIcon {
    icon: "svg[data-testid=\"PlaceOutlinedIcon\"]",
    target: "span",
}]);
pub(super) const URL: Field = attr("href", &[Matcher::Css("a")]);
// the salary badge has no stable hook; every span in the card is scanned
// and justjoin's own `finish` keeps only the K figures
pub(super) const SALARY: Field = text(&[Matcher::Joined("span")]);

pub static PROFILE: SiteProfile = SiteProfile {
    name: "justjoinit",
    tag: "justjoin.it",
    containers: &[LIST],
    container_wait: Duration::from_secs(60),
    items: ITEMS,
    title: TITLE,
    company: COMPANY,
    location: LOCATION,
    url: URL,
    salary: SALARY,
    date: NONE,
    extras: &[],
    company_default: NO_COMPANY,
    fixed_company: None,
    pagination: Pagination::Scroll { footer: "footer" },
    require_title_and_url: false,
    finish: Some(finish),
};

/// Salaries on justjoin are always written as "12K - 15K", so plain
/// numbers in the joined card text belong to other labels.
fn finish(posting: &mut Posting) {
    let Some(text) = posting.extra.get("salaryText") else {
        return;
    };
    let salary = parse_thousands_salary(text);
    posting.salary_min = salary.min;
    posting.salary_max = salary.max;
    posting.salary_type = salary.kind;
}
