/// # Arrival and departure sections
///
/// An itinerary carries at most one `رحلة الوصول` (arrival trip) section and one
/// `رحلة المغادرة` (departure trip) section. The arrival section runs up to the departure
/// marker (or the end of the text), the departure section runs to the end of the text.
///
/// Inside a section each field is looked up by its label first and by shape second:
///
/// - date: `تاريخ الوصول` / `تاريخ المغادرة`, else the first date in the section
/// - time: `وقت الوصول` / `وقت المغادرة`
/// - flight: `رقم الرحلة`, else a known airline code followed by at least 3 digits, else `-`
/// - airport: `المطار`
/// - origin phrase (arrival only): `قادم من` up to the end of the line or a comma
///
/// ## Example (excerpt):
///
/// `
/// رحلة الوصول
/// تاريخ الوصول 2025-12-19
/// وقت الوصول 14:30
/// رقم الرحلة SV1234
/// المطار مطار الملك عبدالعزيز
/// `
use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    models::DateFormat,
    parsing::helpers::{DATE_TOKEN, TIME_TOKEN, fold_digits, normalize_date, normalize_time},
};

pub const ARRIVAL_MARKER: &str = "رحلة الوصول";
pub const DEPARTURE_MARKER: &str = "رحلة المغادرة";

/// Placeholder for an unknown flight.
pub const NO_FLIGHT: &str = "-";

lazy_static! {
    static ref ARRIVAL_DATE_REGEX: Regex =
        Regex::new(&format!(r"تاريخ الوصول[\s:]*({DATE_TOKEN})")).unwrap();
    static ref DEPARTURE_DATE_REGEX: Regex =
        Regex::new(&format!(r"تاريخ المغادرة[\s:]*({DATE_TOKEN})")).unwrap();
    static ref ANY_DATE_REGEX: Regex = Regex::new(DATE_TOKEN).unwrap();
    static ref ARRIVAL_TIME_REGEX: Regex =
        Regex::new(&format!(r"وقت الوصول[\s:]*({TIME_TOKEN})")).unwrap();
    static ref DEPARTURE_TIME_REGEX: Regex =
        Regex::new(&format!(r"وقت المغادرة[\s:]*({TIME_TOKEN})")).unwrap();
    static ref FLIGHT_LABEL_REGEX: Regex =
        Regex::new(r"(?i)رقم الرحلة[\s:]*([A-Z0-9]{2,}\s?[0-9]{3,})").unwrap();
    static ref AIRLINE_CODE_REGEX: Regex = Regex::new(
        r"(?i)(?-u:\b)(?:SV|TK|MS|EK|QR|AI|KU|WY|RJ|ME|PA|EY|FZ|XY|G9|F3)\s?[0-9]{3,}(?-u:\b)"
    )
    .unwrap();
    static ref AIRPORT_REGEX: Regex = Regex::new(r"المطار[\s:]*([^\r\n]+)").unwrap();
    static ref COMING_FROM_REGEX: Regex =
        Regex::new(r"قادم(?:ون|ين|ة)?\s+من[\s:]*([^\r\n,،]+)").unwrap();
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SegmentKind {
    Arrival,
    Departure,
}

impl SegmentKind {
    pub fn marker(&self) -> &'static str {
        match self {
            SegmentKind::Arrival => ARRIVAL_MARKER,
            SegmentKind::Departure => DEPARTURE_MARKER,
        }
    }

    fn date_regex(&self) -> &'static Regex {
        match self {
            SegmentKind::Arrival => &ARRIVAL_DATE_REGEX,
            SegmentKind::Departure => &DEPARTURE_DATE_REGEX,
        }
    }

    fn time_regex(&self) -> &'static Regex {
        match self {
            SegmentKind::Arrival => &ARRIVAL_TIME_REGEX,
            SegmentKind::Departure => &DEPARTURE_TIME_REGEX,
        }
    }
}

/// Fields read from one section. Absent values are left for the caller to default.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Segment {
    date: Option<String>,
    time: String,
    flight: String,
    airport: Option<String>,
    coming_from: Option<String>,
}

impl Segment {
    // Getters/Setters

    pub fn date(&self) -> Option<&str> {
        self.date.as_deref()
    }

    pub fn time(&self) -> &str {
        &self.time
    }

    pub fn flight(&self) -> &str {
        &self.flight
    }

    pub fn airport(&self) -> Option<&str> {
        self.airport.as_deref()
    }

    pub fn coming_from(&self) -> Option<&str> {
        self.coming_from.as_deref()
    }
}

/// Returns the section introduced by the first marker of `kind`, if any.
pub fn find_block(text: &str, kind: SegmentKind) -> Option<&str> {
    let start = text.find(kind.marker())?;
    let end = match kind {
        SegmentKind::Arrival => text[start..]
            .find(DEPARTURE_MARKER)
            .map_or(text.len(), |offset| start + offset),
        SegmentKind::Departure => text.len(),
    };
    Some(&text[start..end])
}

fn capture<'a>(regex: &Regex, block: &'a str) -> Option<&'a str> {
    regex
        .captures(block)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().trim())
}

/// Word boundaries around airline codes are ASCII-only, so a code glued to Arabic text
/// (`الرحلةSV1234`) is still found.
fn find_flight(block: &str) -> String {
    let block = fold_digits(block);
    let block: &str = &block;
    capture(&FLIGHT_LABEL_REGEX, block)
        .or_else(|| AIRLINE_CODE_REGEX.find(block).map(|m| m.as_str().trim()))
        .unwrap_or(NO_FLIGHT)
        .to_string()
}

pub fn parse(block: &str, kind: SegmentKind, date_format: DateFormat) -> Segment {
    let date = capture(kind.date_regex(), block)
        .or_else(|| ANY_DATE_REGEX.find(block).map(|m| m.as_str()))
        .map(|token| normalize_date(token, date_format));
    let time = capture(kind.time_regex(), block)
        .map(normalize_time)
        .unwrap_or_default();
    let airport = capture(&AIRPORT_REGEX, block)
        .filter(|airport| !airport.is_empty())
        .map(String::from);
    let coming_from = match kind {
        SegmentKind::Arrival => capture(&COMING_FROM_REGEX, block)
            .filter(|origin| !origin.is_empty())
            .map(String::from),
        SegmentKind::Departure => None,
    };

    let segment = Segment {
        date,
        time,
        flight: find_flight(block),
        airport,
        coming_from,
    };
    log::debug!("{kind:?} segment: {segment:?}");
    segment
}
