/// Here we define the primitive parsers shared by the itinerary parsers:
/// digit folding, date and time tokens, and passenger counts.
use std::borrow::Cow;

use chrono::{NaiveDate, NaiveTime};
use nom::{
    IResult, Parser,
    character::complete::{digit1, i64, multispace0, one_of, u32},
    sequence::preceded,
};

use crate::models::DateFormat;

/// A date token in any accepted layout: `YYYY-MM-DD`, `YYYY/MM/DD`, `DD-MM-YYYY`, `DD/MM/YYYY`.
/// Separators are interchangeable and digits may be ASCII or Arabic-Indic.
pub(crate) const DATE_TOKEN: &str = r"[0-9٠-٩۰-۹]{4}[-/][0-9٠-٩۰-۹]{1,2}[-/][0-9٠-٩۰-۹]{1,2}|[0-9٠-٩۰-۹]{1,2}[-/][0-9٠-٩۰-۹]{1,2}[-/][0-9٠-٩۰-۹]{4}";

/// A clock token `H:MM` or `HH:MM` with ASCII or Arabic-Indic digits.
pub(crate) const TIME_TOKEN: &str = r"[0-9٠-٩۰-۹]{1,2}:[0-9٠-٩۰-۹]{2}";

/// Folds Arabic-Indic and Extended Arabic-Indic digits to ASCII.
pub(crate) fn fold_digits(text: &str) -> Cow<'_, str> {
    if !text.chars().any(|c| arabic_digit(c).is_some()) {
        return Cow::Borrowed(text);
    }
    Cow::Owned(
        text.chars()
            .map(|c| arabic_digit(c).unwrap_or(c))
            .collect(),
    )
}

fn arabic_digit(c: char) -> Option<char> {
    let offset = match c {
        '\u{0660}'..='\u{0669}' => c as u32 - 0x0660,
        '\u{06F0}'..='\u{06F9}' => c as u32 - 0x06F0,
        _ => return None,
    };
    char::from_digit(offset, 10)
}

fn date_parts_parser(input: &str) -> IResult<&str, (&str, &str, &str)> {
    (
        digit1,
        preceded(one_of("-/"), digit1),
        preceded(one_of("-/"), digit1),
    )
        .parse(input)
}

/// Resolves the three numeric parts of a date token into a calendar date.
/// Year-first tokens are read as Y-M-D. Year-last tokens are read day-first unless only the
/// second part can be a day.
fn resolve_date(first: &str, second: &str, third: &str) -> Option<NaiveDate> {
    let a = first.parse::<u32>().ok()?;
    let b = second.parse::<u32>().ok()?;
    let c = third.parse::<u32>().ok()?;

    if first.len() == 4 {
        return NaiveDate::from_ymd_opt(i32::try_from(a).ok()?, b, c);
    }
    if third.len() != 4 {
        return None;
    }
    let year = i32::try_from(c).ok()?;
    if a <= 12 && b > 12 {
        NaiveDate::from_ymd_opt(year, a, b)
    } else {
        NaiveDate::from_ymd_opt(year, b, a)
    }
}

/// Parses a date token at the start of `token` into a calendar date.
pub(crate) fn parse_date(token: &str) -> Option<NaiveDate> {
    let folded = fold_digits(token.trim());
    let input: &str = &folded;
    let (_, (first, second, third)) = date_parts_parser(input).ok()?;
    resolve_date(first, second, third)
}

/// Renders a date token in the canonical format. Tokens that are not real calendar dates
/// are returned trimmed but otherwise untouched.
pub fn normalize_date(token: &str, format: DateFormat) -> String {
    match parse_date(token) {
        Some(date) => date.format(format.pattern()).to_string(),
        None => {
            let token = token.trim();
            if !token.is_empty() {
                log::warn!("Unrecognized date '{token}', kept as is.");
            }
            token.to_string()
        }
    }
}

fn time_parser(input: &str) -> IResult<&str, (u32, u32)> {
    let (rest, (hour, minute)) =
        (u32, preceded(nom::character::complete::char(':'), digit1)).parse(input)?;
    // Minutes are exactly two digits.
    match (minute.len(), minute.parse::<u32>()) {
        (2, Ok(minute)) => Ok((rest, (hour, minute))),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Digit,
        ))),
    }
}

/// Renders `H:MM` or `HH:MM` as zero-padded 24-hour `HH:MM`. Anything else is returned trimmed.
pub fn normalize_time(token: &str) -> String {
    let folded = fold_digits(token.trim());
    let input: &str = &folded;
    time_parser(input)
        .ok()
        .and_then(|(_, (hour, minute))| NaiveTime::from_hms_opt(hour, minute, 0))
        .map(|time| time.format("%H:%M").to_string())
        .unwrap_or_else(|| token.trim().to_string())
}

/// Leading-integer read of a passenger count: leading whitespace is skipped and anything
/// after the digits is ignored ("5 pax" is 5).
pub(crate) fn passenger_count(count: &str) -> Option<i64> {
    let folded = fold_digits(count);
    let input: &str = &folded;
    let parsed: IResult<&str, i64> = preceded(multispace0, i64).parse(input);
    parsed.ok().map(|(_, n)| n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn folds_arabic_digits() {
        assert_eq!("2025-12-19", fold_digits("٢٠٢٥-١٢-١٩"));
        assert_eq!("14:30", fold_digits("۱۴:۳۰"));
        assert!(matches!(fold_digits("SV1234"), Cow::Borrowed(_)));
    }

    #[test]
    fn date_layouts() {
        let iso = DateFormat::Iso;
        assert_eq!("2025-12-19", normalize_date("2025-12-19", iso));
        assert_eq!("2025-12-19", normalize_date("2025/12/19", iso));
        assert_eq!("2025-12-19", normalize_date("19-12-2025", iso));
        assert_eq!("2025-12-19", normalize_date("19/12/2025", iso));
        assert_eq!("2025-01-05", normalize_date("2025-1-5", iso));
        assert_eq!("2025-12-19", normalize_date("٢٠٢٥-١٢-١٩", iso));
    }

    #[test]
    fn tokens_match_arabic_indic_digits() {
        let date = regex::Regex::new(DATE_TOKEN).unwrap();
        let time = regex::Regex::new(TIME_TOKEN).unwrap();
        assert_eq!(Some("١٩/١٢/٢٠٢٥"), date.find("يوم ١٩/١٢/٢٠٢٥").map(|m| m.as_str()));
        assert_eq!(Some("2025-12-19"), date.find("on 2025-12-19").map(|m| m.as_str()));
        assert_eq!(Some("۱۴:۳۰"), time.find("الساعة ۱۴:۳۰").map(|m| m.as_str()));
    }

    #[test]
    fn day_first_output() {
        let day_first = DateFormat::DayFirst;
        assert_eq!("19/12/2025", normalize_date("2025-12-19", day_first));
        assert_eq!("05/01/2025", normalize_date("5/1/2025", day_first));
    }

    #[test]
    fn ambiguous_dates() {
        let iso = DateFormat::Iso;
        // Day first by default.
        assert_eq!("2025-02-03", normalize_date("03/02/2025", iso));
        // Second part can only be a day.
        assert_eq!("2025-12-25", normalize_date("12/25/2025", iso));
        // First part can only be a day.
        assert_eq!("2025-12-25", normalize_date("25/12/2025", iso));
    }

    #[test]
    fn unrecognized_dates_pass_through() {
        let iso = DateFormat::Iso;
        assert_eq!("2025-13-40", normalize_date("2025-13-40", iso));
        assert_eq!("tomorrow", normalize_date(" tomorrow ", iso));
        assert_eq!("", normalize_date("", iso));
    }

    #[test]
    fn times() {
        assert_eq!("14:30", normalize_time("14:30"));
        assert_eq!("07:05", normalize_time("7:05"));
        assert_eq!("09:15", normalize_time("٩:١٥"));
        assert_eq!("25:00", normalize_time("25:00"));
        assert_eq!("", normalize_time(""));
    }

    #[test]
    fn passenger_counts() {
        assert_eq!(Some(4), passenger_count("4"));
        assert_eq!(Some(5), passenger_count(" 5 pax"));
        assert_eq!(Some(12), passenger_count("١٢"));
        assert_eq!(None, passenger_count("abc"));
        assert_eq!(None, passenger_count(""));
    }
}
