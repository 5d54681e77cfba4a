//! Ordered, first-match classification of loosely-typed text.
//!
//! The rules overlap (`"1"` is both an integer and a boolean, a datetime
//! contains a date), so their order is part of the contract:
//!
//! 1. n-tuple (`1;2`, optionally parenthesized)
//! 2. date (`yyyy-mm-dd`, calendar-checked)
//! 3. time (`hh:mm:ss`, 24h/60m/60s bounds)
//! 4. integer
//! 5. float
//! 6. boolean
//! 7. datetime (date, one space, time)
//! 8. text if the input contains whitespace, otherwise string

use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;

use crate::kind::ValueKind;

static TUPLE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\(?\s*[+-]?\d+(?:\.\d+)?(?:\s*;\s*[+-]?\d+(?:\.\d+)?)+\s*\)?$")
        .expect("tuple pattern is valid")
});
static DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{4})-(\d{2})-(\d{2})$").expect("date pattern is valid"));
static TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d{2}):(\d{2}):(\d{2})$").expect("time pattern is valid"));
static INT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+$").expect("int pattern is valid"));
static FLOAT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[+-]?\d+\.\d+$").expect("float pattern is valid"));
static BOOL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?i:true|false|1|0)$").expect("bool pattern is valid"));

/// Classify `text` into the first matching kind.
pub fn classify(text: &str) -> ValueKind {
    let text = text.trim();
    if let Some(parts) = parse_tuple(text) {
        return ValueKind::Tuple(Some(parts.len()));
    }
    if parse_date(text).is_some() {
        return ValueKind::Date;
    }
    if parse_time(text).is_some() {
        return ValueKind::Time;
    }
    if INT_RE.is_match(text) {
        return ValueKind::Int;
    }
    if FLOAT_RE.is_match(text) {
        return ValueKind::Float;
    }
    if BOOL_RE.is_match(text) {
        return ValueKind::Boolean;
    }
    if parse_datetime(text).is_some() {
        return ValueKind::Datetime;
    }
    if text.chars().any(char::is_whitespace) {
        ValueKind::Text
    } else {
        ValueKind::String
    }
}

/// Split an n-tuple literal into its trimmed components.
pub fn parse_tuple(text: &str) -> Option<Vec<String>> {
    let text = text.trim();
    if !TUPLE_RE.is_match(text) {
        return None;
    }
    let inner = text.trim_start_matches('(').trim_end_matches(')');
    Some(inner.split(';').map(|p| p.trim().to_string()).collect())
}

/// Parse `yyyy-mm-dd`, rejecting impossible calendar days.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE_RE.captures(text.trim())?;
    let year: i32 = caps[1].parse().ok()?;
    let month: u32 = caps[2].parse().ok()?;
    let day: u32 = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse `hh:mm:ss` on a 24-hour clock.
pub fn parse_time(text: &str) -> Option<NaiveTime> {
    let caps = TIME_RE.captures(text.trim())?;
    let hour: u32 = caps[1].parse().ok()?;
    let minute: u32 = caps[2].parse().ok()?;
    let second: u32 = caps[3].parse().ok()?;
    NaiveTime::from_hms_opt(hour, minute, second)
}

/// Parse a date and a time separated by exactly one space.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let (date, time) = text.trim().split_once(' ')?;
    Some(parse_date(date)?.and_time(parse_time(time)?))
}

/// Parse `true`/`false`/`1`/`0`, case-insensitively.
pub fn parse_bool(text: &str) -> Option<bool> {
    let text = text.trim();
    if !BOOL_RE.is_match(text) {
        return None;
    }
    Some(text.eq_ignore_ascii_case("true") || text == "1")
}
