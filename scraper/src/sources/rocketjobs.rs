use common::NO_COMPANY;
use std::time::Duration;

use super::justjoin::{COMPANY, ITEMS, LIST, LOCATION, SALARY, TITLE, URL};
use crate::extract::{Pagination, SiteProfile, NONE};

pub static PROFILE: SiteProfile = SiteProfile {
    name: "rocketjobs",
    tag: "rocketjobs.pl",
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
    finish: None,
};
