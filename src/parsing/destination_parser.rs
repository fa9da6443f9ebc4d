/// # Destination blocks
///
/// Multi-city itineraries introduce each stay with a `الوجهة (<city>)` marker. The text that
/// follows, up to the next marker, describes that stay and usually carries its start date.
///
/// ## Example (excerpt):
///
/// `
/// الوجهة (المدينة المنورة)
/// تاريخ الدخول 2025-12-19
/// ...
/// الوجهة (مكة المكرمة)
/// تاريخ الدخول 2025-12-23
/// `
///
/// gives `[(المدينة المنورة, 2025-12-19), (مكة المكرمة, 2025-12-23)]` in visiting order.
use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    models::DateFormat,
    parsing::helpers::{DATE_TOKEN, normalize_date},
};

lazy_static! {
    static ref DESTINATION_REGEX: Regex = Regex::new(r"الوجهة\s*\(([^)]+)\)").unwrap();
    static ref DATE_REGEX: Regex = Regex::new(DATE_TOKEN).unwrap();
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DestinationBlock {
    city: String,
    start_date: String,
}

impl DestinationBlock {
    pub fn new(city: String, start_date: String) -> Self {
        Self { city, start_date }
    }

    // Getters/Setters

    pub fn city(&self) -> &str {
        &self.city
    }

    /// Empty when the block carries no date.
    pub fn start_date(&self) -> &str {
        &self.start_date
    }
}

/// Finds every destination marker in visiting order, each paired with the first date found
/// between it and the next marker.
pub fn parse(text: &str, date_format: DateFormat) -> Vec<DestinationBlock> {
    let markers = DESTINATION_REGEX
        .captures_iter(text)
        .filter_map(|captures| {
            let start = captures.get(0)?.start();
            let city = captures.get(1)?.as_str().trim().to_string();
            Some((start, city))
        })
        .collect::<Vec<_>>();

    let blocks = markers
        .iter()
        .enumerate()
        .map(|(i, (start, city))| {
            let end = markers.get(i + 1).map_or(text.len(), |(next, _)| *next);
            let start_date = DATE_REGEX
                .find(&text[*start..end])
                .map(|m| normalize_date(m.as_str(), date_format))
                .unwrap_or_default();
            DestinationBlock::new(city.clone(), start_date)
        })
        .collect::<Vec<_>>();

    log::debug!("Found {} destination block(s).", blocks.len());
    blocks
}
