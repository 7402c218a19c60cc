use std::fs;
use std::path::Path;

use chrono::NaiveDate;
use scraper::{Html, Selector};
use tracing::{info, warn};

use crate::error::{PipelineError, Result};
use crate::profiles::ProfileRecord;

const MONTHS: &[&str] = &[
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Extracts one athlete profile from a saved biography page.
///
/// The pages carry label/value pairs inside `div.biography-element-wrapper`
/// blocks and the athlete's name in `div.first-name` / `div.last-name`.
/// Height and weight values keep only their digits ("1.93 m" and "86 kg"
/// style markup); the date of birth is normalized to an ISO date.
pub fn parse_profile(html: &str) -> Result<ProfileRecord> {
    let document = Html::parse_document(html);

    let wrapper_selector = Selector::parse("div.biography-element-wrapper").unwrap();
    let label_selector = Selector::parse("div.label").unwrap();
    let value_selector = Selector::parse("div.value").unwrap();

    let mut height = None;
    let mut weight = None;
    let mut birthdate = None;

    for wrapper in document.select(&wrapper_selector) {
        let label = match wrapper.select(&label_selector).next() {
            Some(element) => element.text().collect::<String>().trim().to_lowercase(),
            None => continue,
        };
        let value = match wrapper.select(&value_selector).next() {
            Some(element) => element.text().collect::<String>().trim().to_string(),
            None => continue,
        };

        match label.as_str() {
            "height" => height = digits(&value).parse::<f64>().ok(),
            "weight" => weight = digits(&value).parse::<f64>().ok(),
            "date of birth" => birthdate = parse_birthdate(&value),
            _ => {}
        }
    }

    let firstname = div_text(&document, "div.first-name")
        .ok_or_else(|| PipelineError::MissingField("first-name".to_string()))?;
    let lastname = div_text(&document, "div.last-name")
        .ok_or_else(|| PipelineError::MissingField("last-name".to_string()))?;

    Ok(ProfileRecord {
        firstname,
        lastname,
        height: height.ok_or_else(|| PipelineError::MissingField("height".to_string()))?,
        weight: weight.ok_or_else(|| PipelineError::MissingField("weight".to_string()))?,
        birthdate: birthdate
            .ok_or_else(|| PipelineError::MissingField("date of birth".to_string()))?,
    })
}

/// Parses every biography page in `directory` (sorted filename order).
/// Pages missing a vital field are skipped and counted, not fatal.
pub fn scrape_directory(directory: &Path) -> Result<Vec<ProfileRecord>> {
    let mut paths: Vec<_> = fs::read_dir(directory)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file())
        .collect();
    paths.sort();

    let mut records = Vec::new();
    let mut skipped = 0u64;
    for path in &paths {
        let html = fs::read_to_string(path)?;
        match parse_profile(&html) {
            Ok(record) => records.push(record),
            Err(error) => {
                warn!(file = %path.display(), %error, "skipping biography page");
                skipped += 1;
            }
        }
    }

    info!(profiles = records.len(), skipped, "biography pages scraped");
    Ok(records)
}

fn div_text(document: &Html, selector: &str) -> Option<String> {
    let selector = Selector::parse(selector).unwrap();
    document
        .select(&selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|text| !text.is_empty())
}

fn digits(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// "14 August 1995" style dates; month names match on their first three
/// letters.
fn parse_birthdate(value: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = value.split_whitespace().collect();
    if parts.len() != 3 {
        return None;
    }
    let day: u32 = parts[0].parse().ok()?;
    let month_key = parts[1].to_lowercase();
    let month = MONTHS
        .iter()
        .position(|m| month_key.starts_with(m))
        .map(|index| index as u32 + 1)?;
    let year: i32 = parts[2].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
        <div class="first-name">Michael</div>
        <div class="last-name">Phelps</div>
        <div class="biography-element-wrapper">
            <div class="label">Height</div>
            <div class="value">193 cm</div>
        </div>
        <div class="biography-element-wrapper">
            <div class="label">Weight</div>
            <div class="value">88 kg</div>
        </div>
        <div class="biography-element-wrapper">
            <div class="label">Date of Birth</div>
            <div class="value">30 June 1985</div>
        </div>
        </body></html>
    "#;

    #[test]
    fn parses_biography_page() {
        let profile = parse_profile(PAGE).unwrap();
        assert_eq!(profile.firstname, "Michael");
        assert_eq!(profile.lastname, "Phelps");
        assert_eq!(profile.height, 193.0);
        assert_eq!(profile.weight, 88.0);
        assert_eq!(profile.birthdate, "1985-06-30".parse().unwrap());
    }

    #[test]
    fn missing_vitals_is_an_error() {
        let page = r#"<div class="first-name">Jo</div><div class="last-name">Roe</div>"#;
        assert!(parse_profile(page).is_err());
    }

    #[test]
    fn birthdate_parsing() {
        assert_eq!(
            parse_birthdate("14 August 1995"),
            NaiveDate::from_ymd_opt(1995, 8, 14)
        );
        assert_eq!(parse_birthdate("August 1995"), None);
        assert_eq!(parse_birthdate("14 Smarch 1995"), None);
    }
}
