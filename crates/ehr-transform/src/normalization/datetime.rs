//! Multi-format date parsing.
//!
//! Raw extracts mix `2021-03-14`, `03/14/2021`, `14-03-2021`, and more. Each
//! value is tried against an ordered list of [`DateFormat`]s and the first
//! format that yields a real calendar date wins; the result is always
//! rendered as `YYYY-MM-DD`. Values no format accepts become null.
//!
//! Field rules follow strptime: the year is exactly four decimal digits of
//! any script, the month is one or two ASCII digits, the day is one or two
//! digits or a space-padded single digit, and nothing but the separator may
//! appear between them.
//!
//! Ordering matters. With the default list, `01/02/2021` is read as
//! `MM/DD/YYYY` (January 2nd) because that format precedes `DD/MM/YYYY`.

use chrono::NaiveDate;
use polars::prelude::{DataFrame, IntoColumn, StringChunkedBuilder};
use serde::Serialize;

use ehr_model::{DateFormat, FieldOrder};

use crate::error::Result;
use crate::normalization::string_column;

/// Counts from rewriting one date column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DateColumnStats {
    /// Non-null inputs rewritten to canonical form.
    pub parsed: usize,
    /// Non-null inputs no format accepted (now null).
    pub dropped: usize,
}

/// First code point of every Unicode decimal digit (`Nd`) run. Each run holds
/// the ten digits zero through nine in order.
const DECIMAL_ZEROS: [u32; 66] = [
    0x30, 0x660, 0x6F0, 0x7C0, 0x966, 0x9E6, 0xA66, 0xAE6, 0xB66, 0xBE6, 0xC66, 0xCE6, 0xD66,
    0xDE6, 0xE50, 0xED0, 0xF20, 0x1040, 0x1090, 0x17E0, 0x1810, 0x1946, 0x19D0, 0x1A80, 0x1A90,
    0x1B50, 0x1BB0, 0x1C40, 0x1C50, 0xA620, 0xA8D0, 0xA900, 0xA9D0, 0xA9F0, 0xAA50, 0xABF0,
    0xFF10, 0x104A0, 0x10D30, 0x11066, 0x110F0, 0x11136, 0x111D0, 0x112F0, 0x11450, 0x114D0,
    0x11650, 0x116C0, 0x11730, 0x118E0, 0x11950, 0x11C50, 0x11D50, 0x11DA0, 0x16A60, 0x16AC0,
    0x16B50, 0x1D7CE, 0x1D7D8, 0x1D7E2, 0x1D7EC, 0x1D7F6, 0x1E140, 0x1E2F0, 0x1E950, 0x1FBF0,
];

/// Value of a decimal digit from any script.
fn decimal_digit(c: char) -> Option<u32> {
    let code = u32::from(c);
    DECIMAL_ZEROS
        .iter()
        .find_map(|&zero| code.checked_sub(zero).filter(|&digit| digit < 10))
}

/// Four decimal digits of any script, at least year 1.
fn parse_year(field: &str) -> Option<i32> {
    let mut year = 0u32;
    let mut count = 0usize;
    for c in field.chars() {
        year = year * 10 + decimal_digit(c)?;
        count += 1;
        if count > 4 {
            return None;
        }
    }
    if count != 4 || year == 0 {
        return None;
    }
    i32::try_from(year).ok()
}

/// One or two ASCII digits.
fn parse_month(field: &str) -> Option<u32> {
    if field.is_empty() || field.len() > 2 || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// Like a month, plus a space-padded single digit (` 5`) and a tens digit of
/// `1` or `2` followed by a decimal digit of any script.
fn parse_day(field: &str) -> Option<u32> {
    if let Some(day) = parse_month(field) {
        return Some(day);
    }
    let mut chars = field.chars();
    let (first, second) = (chars.next()?, chars.next()?);
    if chars.next().is_some() {
        return None;
    }
    match (first, second) {
        (' ', '1'..='9') => second.to_digit(10),
        ('1' | '2', _) => Some(first.to_digit(10)? * 10 + decimal_digit(second)?),
        _ => None,
    }
}

/// Parse `value` with a single format. `value` must already be trimmed.
pub fn parse_with_format(value: &str, format: &DateFormat) -> Option<NaiveDate> {
    let mut fields = value.split(format.separator());
    let (first, second, third) = (fields.next()?, fields.next()?, fields.next()?);
    if fields.next().is_some() {
        return None;
    }
    let (year, month, day) = match format.order() {
        FieldOrder::YearMonthDay => (first, second, third),
        FieldOrder::MonthDayYear => (third, first, second),
        FieldOrder::DayMonthYear => (third, second, first),
    };
    NaiveDate::from_ymd_opt(
        parse_year(year)?,
        parse_month(month)?,
        parse_day(day)?,
    )
}

/// Normalize a raw cell to a calendar date.
///
/// Null, blank, and unparseable inputs yield `None`; none of them is an error.
pub fn normalize_date(raw: Option<&str>, formats: &[DateFormat]) -> Option<NaiveDate> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    formats
        .iter()
        .find_map(|format| parse_with_format(trimmed, format))
}

/// Render a date as `YYYY-MM-DD`.
pub fn render_canonical(date: NaiveDate) -> String {
    format_date(date, &DateFormat::canonical())
}

/// Render a date with the given format (zero-padded fields).
pub fn format_date(date: NaiveDate, format: &DateFormat) -> String {
    date.format(&format.pattern()).to_string()
}

/// Rewrite a column in place to canonical date strings or null.
pub fn normalize_date_column(
    df: &mut DataFrame,
    field: &str,
    formats: &[DateFormat],
) -> Result<DateColumnStats> {
    let column = string_column(df, field)?;
    let values = column.str()?;
    let mut builder = StringChunkedBuilder::new(column.name().clone(), values.len());
    let mut stats = DateColumnStats::default();

    for value in values {
        match (value, normalize_date(value, formats)) {
            (_, Some(date)) => {
                builder.append_value(render_canonical(date));
                stats.parsed += 1;
            }
            (Some(_), None) => {
                builder.append_null();
                stats.dropped += 1;
            }
            (None, None) => builder.append_null(),
        }
    }

    df.with_column(builder.finish().into_column())?;
    Ok(stats)
}
