//! Candidate date formats for field normalization.
//!
//! A format is a field order plus a single separator character, written in
//! configuration as a strftime-style pattern such as `%m/%d/%Y`. Only the
//! three-field shapes below are supported; anything else is rejected when
//! the configuration is loaded.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Order of the year, month, and day fields in a date string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldOrder {
    /// `YYYY?MM?DD`
    YearMonthDay,
    /// `MM?DD?YYYY`
    MonthDayYear,
    /// `DD?MM?YYYY`
    DayMonthYear,
}

impl FieldOrder {
    fn directives(self) -> [char; 3] {
        match self {
            FieldOrder::YearMonthDay => ['Y', 'm', 'd'],
            FieldOrder::MonthDayYear => ['m', 'd', 'Y'],
            FieldOrder::DayMonthYear => ['d', 'm', 'Y'],
        }
    }

    fn from_directives(directives: [char; 3]) -> Option<Self> {
        match directives {
            ['Y', 'm', 'd'] => Some(FieldOrder::YearMonthDay),
            ['m', 'd', 'Y'] => Some(FieldOrder::MonthDayYear),
            ['d', 'm', 'Y'] => Some(FieldOrder::DayMonthYear),
            _ => None,
        }
    }
}

/// A three-field date format with a single separator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DateFormat {
    order: FieldOrder,
    separator: char,
}

/// Candidate formats in match order; the first successful parse wins.
///
/// `MM/DD/YYYY` precedes `DD/MM/YYYY` (and `MM-DD-YYYY` precedes
/// `DD-MM-YYYY`), so a date with both fields ≤ 12 is read month-first.
pub const DEFAULT_DATE_FORMATS: [DateFormat; 8] = [
    DateFormat::new(FieldOrder::YearMonthDay, '-'),
    DateFormat::new(FieldOrder::MonthDayYear, '/'),
    DateFormat::new(FieldOrder::YearMonthDay, '/'),
    DateFormat::new(FieldOrder::MonthDayYear, '.'),
    DateFormat::new(FieldOrder::MonthDayYear, '-'),
    DateFormat::new(FieldOrder::YearMonthDay, '.'),
    DateFormat::new(FieldOrder::DayMonthYear, '-'),
    DateFormat::new(FieldOrder::DayMonthYear, '/'),
];

impl DateFormat {
    pub const fn new(order: FieldOrder, separator: char) -> Self {
        Self { order, separator }
    }

    /// The canonical output format, `YYYY-MM-DD`.
    pub const fn canonical() -> Self {
        Self::new(FieldOrder::YearMonthDay, '-')
    }

    pub fn order(&self) -> FieldOrder {
        self.order
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// strftime-style pattern, e.g. `%m/%d/%Y`.
    pub fn pattern(&self) -> String {
        let [first, second, third] = self.order.directives();
        let sep = self.separator;
        format!("%{first}{sep}%{second}{sep}%{third}")
    }
}

impl fmt::Display for DateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.pattern())
    }
}

impl FromStr for DateFormat {
    type Err = ConfigError;

    fn from_str(pattern: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: &'static str| ConfigError::DateFormat {
            pattern: pattern.to_string(),
            reason,
        };
        let chars: Vec<char> = pattern.trim().chars().collect();
        let &[p1, d1, s1, p2, d2, s2, p3, d3] = chars.as_slice() else {
            return Err(invalid("expected three directives joined by one separator"));
        };
        if [p1, p2, p3].iter().any(|ch| *ch != '%') {
            return Err(invalid("directives must start with '%'"));
        }
        if s1 != s2 {
            return Err(invalid("separators must match"));
        }
        if s1 == '%' || s1.is_alphanumeric() || s1.is_whitespace() {
            return Err(invalid("separator must be punctuation"));
        }
        let order = FieldOrder::from_directives([d1, d2, d3])
            .ok_or_else(|| invalid("field order must be %Y%m%d, %m%d%Y, or %d%m%Y"))?;
        Ok(Self::new(order, s1))
    }
}

impl TryFrom<String> for DateFormat {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<DateFormat> for String {
    fn from(value: DateFormat) -> Self {
        value.pattern()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_patterns_in_order() {
        let patterns: Vec<String> = DEFAULT_DATE_FORMATS.iter().map(DateFormat::pattern).collect();
        assert_eq!(
            patterns,
            vec![
                "%Y-%m-%d", "%m/%d/%Y", "%Y/%m/%d", "%m.%d.%Y", "%m-%d-%Y", "%Y.%m.%d",
                "%d-%m-%Y", "%d/%m/%Y",
            ]
        );
    }

    #[test]
    fn parses_supported_patterns() {
        let format: DateFormat = "%d/%m/%Y".parse().unwrap();
        assert_eq!(format.order(), FieldOrder::DayMonthYear);
        assert_eq!(format.separator(), '/');
        assert_eq!(format.to_string(), "%d/%m/%Y");
    }

    #[test]
    fn rejects_unsupported_patterns() {
        for pattern in ["%Y-%d-%m", "%Y-%m/%d", "%Y%m%d", "%d-%b-%Y", "%Y %m %d", ""] {
            assert!(
                pattern.parse::<DateFormat>().is_err(),
                "{pattern} should be rejected"
            );
        }
    }
}
