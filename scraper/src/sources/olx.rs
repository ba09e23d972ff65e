use common::{Posting, NO_COMPANY, NO_LOCATION};
use std::time::Duration;

use crate::extract::{attr, text, Matcher::Css, Pagination, SiteProfile, NONE};

pub static PROFILE: SiteProfile = SiteProfile {
    name: "olx",
    tag: "olx",
    containers: &["[data-testid=\"listing-grid\"]", "[data-cy=\"l-card\"]"],
    container_wait: Duration::from_secs(20),
    items: &["[data-cy=\"l-card\"]", "[data-testid=\"l-card\"]"],
    title: text(&[Css("h4"), Css("h6"), Css("h3")]),
    company: NONE,
    location: text(&[Css("[data-testid=\"location-date\"]"), Css(".location")]),
    url: attr("href", &[Css("a")]),
    salary: text(&[Css("[data-testid=\"ad-price\"]"), Css("[data-testid=\"job-card-salary\"]")]),
    date: NONE,
    extras: &[],
    company_default: NO_COMPANY,
    fixed_company: None,
    pagination: Pagination::NextPage {
        button: "[data-testid=\"pagination-forward\"]",
    },
    require_title_and_url: false,
    finish: Some(finish),
};

/// OLX prints "Wrocław, Krzyki - Odświeżono dnia 4 marca 2025" in one line.
fn finish(posting: &mut Posting) {
    if posting.location == NO_LOCATION {
        return;
    }
    if let Some((location, date)) = posting.location.split_once(" - ") {
        let (location, date) = (location.trim().to_string(), date.trim().to_string());
        if !date.is_empty() {
            posting.date = Some(date);
        }
        posting.location = location;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extractor;
    use common::SalaryType;

    #[test]
    fn test_olx_cards_split_location_and_date() {
        let page = r#"
            <div data-testid="listing-grid">
              <div data-cy="l-card">
                <a href="/oferta/praca/praktykant-ds-magazynu-CID4-ID10abc.html">
                  <h4>Praktykant / stażysta ds. magazynu</h4>
                </a>
                <p data-testid="job-card-salary">25 - 28 zł / godz. brutto</p>
                <p data-testid="location-date">Wrocław, Krzyki - Odświeżono dnia 4 marca 2025</p>
              </div>
              <div data-cy="l-card">
                <a href="/oferta/praca/staz-biuro-CID4-ID10def.html"><h4>Staż w biurze</h4></a>
              </div>
            </div>"#;

        let postings = Extractor::new(&PROFILE)
            .unwrap()
            .extract(page, "https://www.olx.pl/praca/wroclaw/");
        assert_eq!(postings.len(), 2);

        let job = &postings[0];
        assert_eq!(job.url, "https://www.olx.pl/oferta/praca/praktykant-ds-magazynu-CID4-ID10abc.html");
        assert_eq!(job.location, "Wrocław, Krzyki");
        assert_eq!(job.date.as_deref(), Some("Odświeżono dnia 4 marca 2025"));
        assert_eq!(job.company, NO_COMPANY);
        assert_eq!((job.salary_min, job.salary_max), (Some(25.0), Some(28.0)));
        assert_eq!(job.salary_type, Some(SalaryType::Hourly));

        assert_eq!(postings[1].location, NO_LOCATION);
        assert_eq!(postings[1].date, None);
    }
}
