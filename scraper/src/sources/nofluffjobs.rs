use common::NO_COMPANY;
use std::time::Duration;

use crate::extract::{attr, text, Matcher::Css, Matcher::Itself, Pagination, SiteProfile, NONE};

pub static PROFILE: SiteProfile = SiteProfile {
    name: "nofluffjobs",
    tag: "nofluffjobs.com",
    containers: &["nfj-main-content"],
    container_wait: Duration::from_secs(60),
    items: &["nfj-main-content a.posting-list-item"],
    title: text(&[
        Css("h3.posting-title__position"),
        Css("h2 a"),
        Css("h3 a"),
        Css("[data-testid=\"job-title\"] a"),
        Css(".posting-title__position"),
    ]),
    company: text(&[
        Css("h4.company-name"),
        Css("[data-testid=\"company-name\"]"),
        Css(".company-name"),
        Css("h4"),
    ]),
    location: text(&[
        Css("nfj-posting-item-city span"),
        Css("[data-testid=\"location\"]"),
        Css(".location"),
        Css(".city"),
    ]),
    url: attr("href", &[Css("a[href*=\"/job/\"]"), Css("a"), Itself]),
    salary: text(&[
        Css("span[data-cy=\"salary ranges on the job offer listing\"]"),
        Css("[data-testid=\"salary\"]"),
        Css(".salary"),
        Css("[data-cy*=\"salary\"]"),
    ]),
    date: NONE,
    extras: &[],
    company_default: NO_COMPANY,
    fixed_company: None,
    pagination: Pagination::LoadMore {
        button: "button[data-testid=\"load-more\"], .load-more-button",
    },
    require_title_and_url: true,
    finish: None,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::Extractor;
    use common::SalaryType;

    #[test]
    fn test_nofluffjobs_cards_link_from_the_card_itself() {
        let page = r#"
            <nfj-main-content>
              <a class="posting-list-item" href="/pl/job/junior-java-developer-acme-wroclaw">
                <h3 class="posting-title__position">Junior Java Developer</h3>
                <h4 class="company-name">Acme</h4>
                <span data-cy="salary ranges on the job offer listing">8 000 – 11 000 PLN</span>
                <nfj-posting-item-city><span>Wrocław</span></nfj-posting-item-city>
              </a>
              <a class="posting-list-item" href="/pl/job/no-title">
                <h4 class="company-name">Ghost</h4>
              </a>
            </nfj-main-content>"#;

        let postings = Extractor::new(&PROFILE)
            .unwrap()
            .extract(page, "https://nofluffjobs.com/pl/wroclaw");
        assert_eq!(postings.len(), 1, "untitled cards are dropped");

        let job = &postings[0];
        assert_eq!(job.url, "https://nofluffjobs.com/pl/job/junior-java-developer-acme-wroclaw");
        assert_eq!(job.company, "Acme");
        assert_eq!(job.location, "Wrocław");
        assert_eq!((job.salary_min, job.salary_max), (Some(8000.0), Some(11000.0)));
        assert_eq!(job.salary_type, Some(SalaryType::Monthly));
    }
}
