//! Value classification for raw text
//!
//! Classification follows a fixed priority: empty, boolean, decimal number,
//! ISO-8601 date/time/duration/interval, a few legacy timestamp and clock
//! span forms, and finally plain string. It never fails.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, TimeZone, Utc, Weekday,
};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;

use super::types::SchemaValue;

/// A primitive subtype already known from the tokenizer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Declared<'a> {
    Null,
    Boolean(bool),
    Integer(i128),
    Float(f64),
    Date(DateTime<Utc>),
    Text(&'a str),
}

// ISO-8601 building blocks
const DATE: &str = r"(?:(?:[+-]\d+)?\d{4}(?:(?:-\d{2}){0,2}|(?:\d{2}){0,2}|-W\d{2}(?:-\d)?|W\d{2}\d?|-?\d{3})|--\d{2}-?\d{2})";
const TIME: &str =
    r"(?:\d{2}(?:(?::\d{2}){2}(?:[.,]\d+)?|(?:\d{2}){2}(?:[.,]\d+)?|:\d{2}|\d{2})?(?:Z|[+-]\d{2}(?::?\d{2})?)?)";
const DESIGNATED_DATE: &str = r"(?:\d+Y(?:\d+M)?(?:\d+D)?|\d+M(?:\d+D)?|\d+D)";
const DESIGNATED_TIME: &str =
    r"(?:\d+H(?:\d+M)?(?:\d+(?:[.,]\d+)?S)?|\d+M(?:\d+(?:[.,]\d+)?S)?|\d+(?:[.,]\d+)?S)";

fn date_time_pattern() -> String {
    format!("(?:{DATE}|{TIME}|{DATE}T{TIME})")
}

fn duration_pattern() -> String {
    format!(
        "(?:P(?:{DESIGNATED_DATE}(?:T{DESIGNATED_TIME})?|T{DESIGNATED_TIME}|\\d+W|{DATE}(?:T{TIME})?))"
    )
}

static ISO8601_REGEX: Lazy<Regex> = Lazy::new(|| {
    let dt = date_time_pattern();
    let dur = duration_pattern();
    let interval = format!("(?:(?:R\\d*/)?(?:{dt}/{dt}|{dt}/{dur}|{dur}/{dt}|{dur}))");
    Regex::new(&format!("^(?:{dt}|{interval})$")).unwrap()
});

static ISO8601_DURATION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("^{}$", duration_pattern())).unwrap());

static DECIMAL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*[+-]?(?:(?:\d{1,3}(?:,\d{3})+|\d+)(?:\.\d*)?|\.\d+)\s*$").unwrap()
});

static DESIGNATOR_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+(?:[.,]\d+)?)([YMWDHS])").unwrap());

static CLOCK_SPAN_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(-)?(?:(\d+)\.)?(\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d{1,7}))?)?$").unwrap()
});

/// Classify free text into a semantic value
pub fn classify(value: &str) -> SchemaValue {
    if value.trim().is_empty() {
        return SchemaValue::Empty;
    }

    if value.eq_ignore_ascii_case("true") {
        return SchemaValue::Boolean(true);
    }
    if value.eq_ignore_ascii_case("false") {
        return SchemaValue::Boolean(false);
    }

    if let Some(number) = parse_decimal(value) {
        return number;
    }

    if ISO8601_REGEX.is_match(value) {
        if ISO8601_DURATION_REGEX.is_match(value) {
            if let Some(span) = parse_iso_duration(value) {
                return SchemaValue::TimeSpan(span);
            }
        }
        return SchemaValue::DateTime(resolve_instant(value));
    }

    if let Ok(instant) = DateTime::parse_from_rfc2822(value.trim()) {
        return SchemaValue::DateTime(Some(instant.with_timezone(&Utc)));
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value.trim(), format) {
            return SchemaValue::DateTime(Some(naive.and_utc()));
        }
    }

    if let Some(span) = parse_clock_span(value.trim()) {
        return SchemaValue::TimeSpan(span);
    }

    SchemaValue::String(value.to_string())
}

/// Classify a value whose primitive subtype is already known.
///
/// Declared text is recorded as a plain string; callers that want the
/// semantic type of the text run it through [`classify`] as well.
pub fn classify_declared(declared: Declared<'_>) -> SchemaValue {
    match declared {
        Declared::Null => SchemaValue::Empty,
        Declared::Boolean(b) => SchemaValue::Boolean(b),
        // Beyond the decimal range the number is kept as text
        Declared::Integer(i) => match Decimal::from_i128(i) {
            Some(number) => SchemaValue::Integer(number),
            None => SchemaValue::String(i.to_string()),
        },
        Declared::Float(f) => match Decimal::from_f64(f) {
            Some(number) => SchemaValue::numeric(number),
            None => SchemaValue::String(f.to_string()),
        },
        Declared::Date(instant) => SchemaValue::DateTime(Some(instant)),
        Declared::Text(text) => SchemaValue::String(text.to_string()),
    }
}

fn parse_decimal(value: &str) -> Option<SchemaValue> {
    if !DECIMAL_REGEX.is_match(value) {
        return None;
    }

    let cleaned: String = value
        .trim()
        .chars()
        .filter(|c| !matches!(c, ',' | '+'))
        .collect();
    let (sign, digits) = match cleaned.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", cleaned.as_str()),
    };
    let digits = digits.trim_end_matches('.');
    let literal = if digits.starts_with('.') {
        format!("{sign}0{digits}")
    } else {
        format!("{sign}{digits}")
    };

    // More digits than a decimal holds is not a number
    let number = Decimal::from_str_exact(&literal).ok()?;
    Some(SchemaValue::numeric(number))
}

/// Convert an ISO-8601 duration to a time delta.
///
/// Years count as 365 days and months as 30 days.
fn parse_iso_duration(value: &str) -> Option<TimeDelta> {
    let body = value.strip_prefix('P')?;

    let (date_part, time_part) = match body.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (body, None),
    };

    // Alternative format, e.g. P0003-06-04T12:30:05
    if date_part.chars().next().is_some_and(|c| c.is_ascii_digit())
        && !date_part.chars().any(|c| c.is_ascii_alphabetic())
        && time_part.is_none_or(|t| !t.chars().any(|c| c.is_ascii_alphabetic()))
    {
        return parse_alternative_duration(date_part, time_part);
    }

    let mut millis: i64 = 0;
    let mut components = 0;
    for (part, in_time) in [(date_part, false), (time_part.unwrap_or(""), true)] {
        for caps in DESIGNATOR_REGEX.captures_iter(part) {
            components += 1;
            let amount: f64 = caps[1].replace(',', ".").parse().ok()?;
            let unit_ms: f64 = match (&caps[2], in_time) {
                ("Y", false) => 365.0 * 86_400_000.0,
                ("M", false) => 30.0 * 86_400_000.0,
                ("W", false) => 7.0 * 86_400_000.0,
                ("D", false) => 86_400_000.0,
                ("H", true) => 3_600_000.0,
                ("M", true) => 60_000.0,
                ("S", true) => 1_000.0,
                _ => return None,
            };
            let delta = amount * unit_ms;
            if !delta.is_finite() || delta > i64::MAX as f64 {
                return None;
            }
            millis = millis.checked_add(delta.round() as i64)?;
        }
    }
    if components == 0 {
        return None;
    }

    TimeDelta::try_milliseconds(millis)
}

fn parse_alternative_duration(date_part: &str, time_part: Option<&str>) -> Option<TimeDelta> {
    let digits: String = date_part.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() != 8 {
        return None;
    }
    let years: i64 = digits[0..4].parse().ok()?;
    let months: i64 = digits[4..6].parse().ok()?;
    let days: i64 = digits[6..8].parse().ok()?;

    let mut seconds = ((years * 365) + (months * 30) + days).checked_mul(86_400)?;
    if let Some(time) = time_part {
        let digits: String = time.chars().filter(|c| c.is_ascii_digit()).collect();
        if digits.len() != 6 {
            return None;
        }
        let h: i64 = digits[0..2].parse().ok()?;
        let m: i64 = digits[2..4].parse().ok()?;
        let s: i64 = digits[4..6].parse().ok()?;
        seconds = seconds.checked_add(h * 3600 + m * 60 + s)?;
    }

    TimeDelta::try_seconds(seconds)
}

/// Parse `[-][d.]hh:mm[:ss[.fffffff]]` clock spans
fn parse_clock_span(value: &str) -> Option<TimeDelta> {
    let caps = CLOCK_SPAN_REGEX.captures(value)?;

    let days: i64 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
    let hours: i64 = caps[3].parse().ok()?;
    let minutes: i64 = caps[4].parse().ok()?;
    let seconds: i64 = caps.get(5).map_or(Some(0), |m| m.as_str().parse().ok())?;
    if hours > 23 || minutes > 59 || seconds > 59 {
        return None;
    }

    let nanos: i64 = match caps.get(6) {
        Some(m) => format!("{:0<9}", m.as_str()).parse().ok()?,
        None => 0,
    };

    let total = TimeDelta::try_days(days)?
        .checked_add(&TimeDelta::try_hours(hours)?)?
        .checked_add(&TimeDelta::try_minutes(minutes)?)?
        .checked_add(&TimeDelta::try_seconds(seconds)?)?
        .checked_add(&TimeDelta::nanoseconds(nanos))?;

    Some(if caps.get(1).is_some() { -total } else { total })
}

/// Resolve an ISO-8601 lexical form to an instant when it names a calendar
/// day. Values without a zone designator are taken as UTC.
fn resolve_instant(value: &str) -> Option<DateTime<Utc>> {
    if value.contains('/') || value.starts_with('P') || value.starts_with("--") {
        return None;
    }

    let (date_part, time_part) = match value.split_once('T') {
        Some((d, t)) => (d, Some(t)),
        None => (value, None),
    };

    let date = resolve_date(date_part)?;
    let (time, offset) = match time_part {
        Some(t) => resolve_time(t)?,
        None => (NaiveTime::from_hms_opt(0, 0, 0)?, FixedOffset::east_opt(0)?),
    };

    offset
        .from_local_datetime(&date.and_time(time))
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn resolve_date(text: &str) -> Option<NaiveDate> {
    let (sign, rest) = match text.chars().next()? {
        '-' => (-1, &text[1..]),
        '+' => (1, &text[1..]),
        _ => (1, text),
    };

    // Extended forms carry '-' separators, basic forms are digits only
    if let Some((year, week)) = rest.split_once('W') {
        let year = parse_year(year.trim_end_matches('-'))?;
        let week_digits: String = week.chars().filter(|c| c.is_ascii_digit()).collect();
        let week_no: u32 = week_digits.get(0..2)?.parse().ok()?;
        let weekday = match week_digits.get(2..3) {
            Some(d) => weekday_from_iso(d.parse().ok()?)?,
            None => Weekday::Mon,
        };
        return NaiveDate::from_isoywd_opt(sign * year, week_no, weekday);
    }

    let fields: Vec<&str> = rest.split('-').collect();
    match fields.as_slice() {
        [year] if year.len() == 4 => NaiveDate::from_ymd_opt(sign * parse_year(year)?, 1, 1),
        [digits] if digits.len() == 6 => NaiveDate::from_ymd_opt(
            sign * parse_year(&digits[0..4])?,
            digits[4..6].parse().ok()?,
            1,
        ),
        [digits] if digits.len() == 7 => {
            NaiveDate::from_yo_opt(sign * parse_year(&digits[0..4])?, digits[4..7].parse().ok()?)
        }
        [digits] if digits.len() == 8 => NaiveDate::from_ymd_opt(
            sign * parse_year(&digits[0..4])?,
            digits[4..6].parse().ok()?,
            digits[6..8].parse().ok()?,
        ),
        [year, ordinal] if ordinal.len() == 3 => {
            NaiveDate::from_yo_opt(sign * parse_year(year)?, ordinal.parse().ok()?)
        }
        [year, month] => NaiveDate::from_ymd_opt(sign * parse_year(year)?, month.parse().ok()?, 1),
        [year, month, day] => NaiveDate::from_ymd_opt(
            sign * parse_year(year)?,
            month.parse().ok()?,
            day.parse().ok()?,
        ),
        _ => None,
    }
}

/// Years have at least four digits; shorter runs are clock fields
fn parse_year(text: &str) -> Option<i32> {
    if text.len() < 4 {
        return None;
    }
    text.parse().ok()
}

fn resolve_time(text: &str) -> Option<(NaiveTime, FixedOffset)> {
    let (clock, offset) = if let Some(clock) = text.strip_suffix('Z') {
        (clock, FixedOffset::east_opt(0)?)
    } else if let Some(idx) = text.rfind(['+', '-']) {
        (&text[..idx], parse_offset(&text[idx..])?)
    } else {
        (text, FixedOffset::east_opt(0)?)
    };

    let (whole, fraction) = match clock.split_once(['.', ',']) {
        Some((w, f)) => (w, Some(f)),
        None => (clock, None),
    };
    let digits: String = whole.chars().filter(|c| c.is_ascii_digit()).collect();
    let hour: u32 = digits.get(0..2)?.parse().ok()?;
    let minute: u32 = digits.get(2..4).map_or(Some(0), |m| m.parse().ok())?;
    let second: u32 = digits.get(4..6).map_or(Some(0), |s| s.parse().ok())?;
    let nanos: u32 = match fraction {
        Some(f) => format!("{:0<9}", &f[..f.len().min(9)]).parse().ok()?,
        None => 0,
    };

    Some((NaiveTime::from_hms_nano_opt(hour, minute, second, nanos)?, offset))
}

fn parse_offset(text: &str) -> Option<FixedOffset> {
    let sign = if text.starts_with('-') { -1 } else { 1 };
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..4).map_or(Some(0), |m| m.parse().ok())?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn weekday_from_iso(day: u32) -> Option<Weekday> {
    match day {
        1 => Some(Weekday::Mon),
        2 => Some(Weekday::Tue),
        3 => Some(Weekday::Wed),
        4 => Some(Weekday::Thu),
        5 => Some(Weekday::Fri),
        6 => Some(Weekday::Sat),
        7 => Some(Weekday::Sun),
        _ => None,
    }
}
