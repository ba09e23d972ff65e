//! Salary parsing for the free-text salary blocks job boards render.
//!
//! The first two figures in reading order become (min, max); a single
//! figure is both. Figures that belong to a "+3 locations" badge are
//! removed before scanning.

use common::SalaryType;
use regex::Regex;
use std::sync::OnceLock;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Salary {
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub kind: Option<SalaryType>,
}

const HOURLY_MARKERS: &[&str] = &["/godz", "/h", "/hr", "godz", "hour", "na godzin"];
const MONTHLY_MARKERS: &[&str] = &["/mies", "/month", "/mc", "mies", "month", "mth"];
const CURRENCY_MARKERS: &[&str] = &["pln", "zł", "zl", "eur", "€", "usd", "$", "gbp", "£", "chf"];

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        // thousands-separated | plain, optional decimals, optional thousands marker
        Regex::new(r"(\d{1,3}(?:[ .,]\d{3})+|\d+)(?:[.,](\d{1,2}))?(\s?[kK])?").unwrap()
    })
}

fn location_badge_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)\+\s*\d+\s*(?:lokalizac\w*|locations?)").unwrap())
}

/// Parses a salary string such as `"5 000 - 8 000 PLN/mies"` or `"12.5K-15K/month"`.
///
/// A range written without a separator between its ends reads as one
/// number: `"100 200 PLN/h"` is 100200, since `"100 200"` is also how a
/// thousands-grouped figure looks.
pub fn parse_salary(text: &str) -> Salary {
    parse_with(text, |_| true)
}

/// Like [`parse_salary`], but only figures carrying a `K` marker count.
/// For cards where the salary badge shares its markup with other labels.
pub fn parse_thousands_salary(text: &str) -> Salary {
    parse_with(text, |figure| figure.thousands)
}

fn parse_with(text: &str, keep: impl Fn(&Figure) -> bool) -> Salary {
    let text = text.replace(['\u{a0}', '\u{202f}'], " ");
    let text = location_badge_re().replace_all(&text, " ");

    let figures: Vec<f64> = extract_figures(&text)
        .into_iter()
        .filter(|f| keep(f))
        .map(|f| f.value)
        .collect();
    let (min, max) = match figures.as_slice() {
        [] => return Salary::default(),
        [only] => (*only, *only),
        [first, second, ..] => (*first, *second),
    };

    Salary {
        min: Some(min),
        max: Some(max),
        kind: salary_type(&text),
    }
}

struct Figure {
    value: f64,
    thousands: bool,
}

/// Currency codes may touch a figure ("PLN5000", "5000zł"); any other word
/// glued to digits ("B2B", "10Clouds") means they are not an amount.
fn is_unit(word: &str) -> bool {
    let word = word.to_lowercase();
    CURRENCY_MARKERS.contains(&word.as_str())
}

fn word_before(text: &str, at: usize) -> Option<String> {
    let mut word: Vec<char> = text[..at]
        .chars()
        .rev()
        .take_while(|c| c.is_alphabetic())
        .collect();
    word.reverse();
    (!word.is_empty()).then(|| word.into_iter().collect())
}

fn word_after(text: &str, at: usize) -> Option<String> {
    let word: String = text[at..].chars().take_while(|c| c.is_alphabetic()).collect();
    (!word.is_empty()).then_some(word)
}

/// Every numeric figure in reading order, with thousands markers applied.
fn extract_figures(text: &str) -> Vec<Figure> {
    let mut figures = Vec::new();

    for caps in number_re().captures_iter(text) {
        let Some(whole) = caps.get(0) else { continue };
        let digits_end = caps.get(2).or_else(|| caps.get(1)).map_or(whole.end(), |m| m.end());

        if word_before(text, whole.start()).is_some_and(|w| !is_unit(&w)) {
            continue;
        }

        // a "k" that starts a word ("40 kraków") is not a thousands marker
        let thousands = caps.get(3).is_some() && word_after(text, whole.end()).is_none();
        if !thousands && word_after(text, digits_end).is_some_and(|w| !is_unit(&w)) {
            continue;
        }

        let integer: String = caps[1].chars().filter(|c| c.is_ascii_digit()).collect();
        let mut value = match integer.parse::<f64>() {
            Ok(v) => v,
            Err(_) => continue,
        };
        if let Some(decimals) = caps.get(2) {
            if let Ok(fraction) = format!("0.{}", decimals.as_str()).parse::<f64>() {
                value += fraction;
            }
        }
        if thousands {
            value *= 1000.0;
        }

        figures.push(Figure { value, thousands });
    }

    figures
}

/// Period inferred from markers; a bare currency means a monthly figure.
pub fn salary_type(text: &str) -> Option<SalaryType> {
    let lower = text.to_lowercase();
    let has_any = |markers: &[&str]| markers.iter().any(|m| lower.contains(m));

    if has_any(HOURLY_MARKERS) {
        Some(SalaryType::Hourly)
    } else if has_any(MONTHLY_MARKERS) || has_any(CURRENCY_MARKERS) {
        Some(SalaryType::Monthly)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_salary_monthly_range() {
        let s = parse_salary("5 000 - 8 000 PLN/mies");
        assert_eq!(s.min, Some(5000.0));
        assert_eq!(s.max, Some(8000.0));
        assert_eq!(s.kind, Some(SalaryType::Monthly));
    }

    #[test]
    fn test_parse_salary_single_hourly_figure() {
        let s = parse_salary("40 PLN/godz");
        assert_eq!(s.min, Some(40.0));
        assert_eq!(s.max, Some(40.0));
        assert_eq!(s.kind, Some(SalaryType::Hourly));
    }

    #[test]
    fn test_parse_salary_no_figures() {
        assert_eq!(parse_salary("Undisclosed salary"), Salary::default());
        assert_eq!(parse_salary("Competitive, PLN/mies"), Salary::default());
    }

    #[test]
    fn test_parse_salary_thousands_marker() {
        let s = parse_salary("12.5K - 15K PLN/month");
        assert_eq!(s.min, Some(12500.0));
        assert_eq!(s.max, Some(15000.0));
        assert_eq!(s.kind, Some(SalaryType::Monthly));
    }

    #[test]
    fn test_parse_salary_ignores_location_badge() {
        let s = parse_salary("+3 Lokalizacje 7 000–9 500 zł/mies.");
        assert_eq!(s.min, Some(7000.0));
        assert_eq!(s.max, Some(9500.0));
    }

    #[test]
    fn test_parse_salary_comma_and_period_variants() {
        let s = parse_salary("12,000 - 15.000 EUR");
        assert_eq!(s.min, Some(12000.0));
        assert_eq!(s.max, Some(15000.0));
        assert_eq!(s.kind, Some(SalaryType::Monthly));

        let s = parse_salary("32,50 zł/h");
        assert_eq!(s.min, Some(32.5));
        assert_eq!(s.kind, Some(SalaryType::Hourly));
    }

    #[test]
    fn test_parse_salary_nbsp_separators() {
        let s = parse_salary("10\u{a0}000 – 14\u{a0}000 PLN");
        assert_eq!(s.min, Some(10000.0));
        assert_eq!(s.max, Some(14000.0));
    }

    #[test]
    fn test_parse_salary_skips_b2b_token() {
        let s = parse_salary("B2B 20 000 PLN/month");
        assert_eq!(s.min, Some(20000.0));
        assert_eq!(s.max, Some(20000.0));
    }

    #[test]
    fn test_first_two_figures_win() {
        let s = parse_salary("4000 5000 6000 PLN");
        assert_eq!((s.min, s.max), (Some(4000.0), Some(5000.0)));
    }

    #[test]
    fn test_parse_salary_skips_digits_glued_to_words() {
        assert_eq!(parse_salary("Undisclosed Salary 10Clouds Wrocław"), Salary::default());

        let s = parse_salary("Team of 5 at 3DStudio, 9000 PLN");
        assert_eq!((s.min, s.max), (Some(5.0), Some(9000.0)));
    }

    #[test]
    fn test_parse_salary_keeps_currency_glued_figures() {
        let s = parse_salary("PLN5000 - PLN7000");
        assert_eq!((s.min, s.max), (Some(5000.0), Some(7000.0)));

        let s = parse_salary("6000zł/mies");
        assert_eq!(s.min, Some(6000.0));
        assert_eq!(s.kind, Some(SalaryType::Monthly));
    }

    #[test]
    fn test_parse_salary_space_grouped_pair_reads_as_one_figure() {
        let s = parse_salary("100 200 PLN/h");
        assert_eq!((s.min, s.max), (Some(100200.0), Some(100200.0)));

        let s = parse_salary("100 - 200 PLN/h");
        assert_eq!((s.min, s.max), (Some(100.0), Some(200.0)));
    }

    #[test]
    fn test_parse_thousands_salary_ignores_plain_figures() {
        let s = parse_thousands_salary("12K - 15K PLN/month Acme 2 Wrocław");
        assert_eq!((s.min, s.max), (Some(12000.0), Some(15000.0)));
        assert_eq!(s.kind, Some(SalaryType::Monthly));

        assert_eq!(parse_thousands_salary("Undisclosed Salary Studio 42 Wrocław"), Salary::default());
    }

    #[test]
    fn test_salary_type_unknown_without_markers() {
        assert_eq!(salary_type("5000 - 6000"), None);
    }
}
