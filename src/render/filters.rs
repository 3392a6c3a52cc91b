//! Template filters registered into the composer's environment

use crate::error::{GendokuError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};
use minijinja::value::{Value, ValueKind};
use minijinja::ErrorKind;
use std::fmt::Write;

/// Day with ordinal suffix, full month name, full year: `21st March 2024`
pub const DEFAULT_DATE_FORMAT: &str = "%o %B %Y";

const DATETIME_FORMATS: [&str; 3] = ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d.%m.%Y",
    "%d/%m/%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%d %B %Y",
    "%d %b %Y",
];

/// English ordinal suffix for a day of the month
pub fn ordinal_suffix(day: u32) -> &'static str {
    match day % 100 {
        11..=13 => "th",
        _ => match day % 10 {
            1 => "st",
            2 => "nd",
            3 => "rd",
            _ => "th",
        },
    }
}

/// Read a date from text, trying the common notations in turn
pub fn parse_date(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Ok(dt.naive_local());
    }
    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(input, format) {
            return Ok(dt);
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(input, format).ok())
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| GendokuError::date_parse(input))
}

/// Format a date with a strftime pattern.
///
/// `%o` is the day of the month with its ordinal suffix.
pub fn format_date(date: &NaiveDateTime, pattern: &str) -> Result<String> {
    let day = date.day();
    let mut expanded = String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
        if ch != '%' {
            expanded.push(ch);
            continue;
        }
        match chars.next() {
            Some('o') => expanded.push_str(&format!("{day}{}", ordinal_suffix(day))),
            Some(next) => {
                expanded.push('%');
                expanded.push(next);
            }
            None => expanded.push('%'),
        }
    }

    let mut out = String::new();
    write!(out, "{}", date.format(&expanded)).map_err(|_| {
        GendokuError::template_render("dateformat", format!("invalid date format {pattern:?}"))
    })?;
    Ok(out)
}

/// Interpret a template value as a date and format it
pub fn dateformat(value: &Value, pattern: Option<&str>) -> Result<String> {
    let date = match value.kind() {
        ValueKind::String => parse_date(value.as_str().unwrap_or_default())?,
        ValueKind::Number => i64::try_from(value.clone())
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
            .map(|dt| dt.naive_utc())
            .ok_or_else(|| GendokuError::date_parse(value.to_string()))?,
        _ => return Err(GendokuError::date_parse(value.to_string())),
    };
    format_date(&date, pattern.unwrap_or(DEFAULT_DATE_FORMAT))
}

/// `dateformat` as registered in the template environment
pub(crate) fn dateformat_filter(
    value: Value,
    pattern: Option<String>,
) -> std::result::Result<String, minijinja::Error> {
    dateformat(&value, pattern.as_deref()).map_err(|e| {
        minijinja::Error::new(ErrorKind::InvalidOperation, e.to_string()).with_source(e)
    })
}
