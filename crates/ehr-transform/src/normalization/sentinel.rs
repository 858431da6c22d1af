//! Placeholder ("sentinel") token normalization.
//!
//! Extracts spell "no data" in many ways: `N/A`, `unknown`, `??`, a literal
//! `DOB` left in the birth date column. Any cell whose trimmed, lower-cased
//! value is exactly one of the configured tokens becomes null. Substrings do
//! not match, so `NAncy` survives while `na` does not.

use std::collections::HashSet;

use polars::prelude::{DataFrame, DataType, IntoColumn, PlSmallStr, StringChunkedBuilder};
use tracing::debug;

use ehr_model::DEFAULT_PLACEHOLDERS;

use crate::error::Result;

/// Case-insensitive set of placeholder tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceholderSet {
    tokens: HashSet<String>,
}

impl Default for PlaceholderSet {
    fn default() -> Self {
        Self::new(DEFAULT_PLACEHOLDERS)
    }
}

impl PlaceholderSet {
    pub fn new<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tokens: tokens
                .into_iter()
                .map(|token| token.as_ref().trim().to_lowercase())
                .collect(),
        }
    }

    /// True when the trimmed, lower-cased value is exactly a token.
    pub fn matches(&self, value: &str) -> bool {
        self.tokens.contains(&value.trim().to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Replace placeholder cells with null in every `String` column.
///
/// Returns the number of cells rewritten. Null cells and non-string columns
/// are left untouched.
pub fn normalize_sentinels(df: &mut DataFrame, placeholders: &PlaceholderSet) -> Result<usize> {
    let names: Vec<PlSmallStr> = df.get_column_names_owned();
    let mut total = 0usize;

    for name in names {
        let column = df.column(name.as_str())?;
        if column.dtype() != &DataType::String {
            continue;
        }
        let values = column.str()?;
        let mut builder = StringChunkedBuilder::new(name.clone(), values.len());
        let mut replaced = 0usize;
        for value in values {
            match value {
                Some(text) if placeholders.matches(text) => {
                    builder.append_null();
                    replaced += 1;
                }
                Some(text) => builder.append_value(text),
                None => builder.append_null(),
            }
        }

        if replaced > 0 {
            debug!(column = %name, replaced, "nulled placeholder tokens");
            df.with_column(builder.finish().into_column())?;
            total += replaced;
        }
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{NamedFrom, Series};

    #[test]
    fn matches_exact_tokens_only() {
        let set = PlaceholderSet::default();
        assert!(set.matches("N/A"));
        assert!(set.matches(" unknown "));
        assert!(set.matches("??"));
        assert!(set.matches("DOB"));
        assert!(set.matches("   "));
        assert!(!set.matches("NAncy"));
        assert!(!set.matches("n/a/b"));
        assert!(!set.matches("?"));
    }

    #[test]
    fn custom_tokens_are_normalized() {
        let set = PlaceholderSet::new([" TBD ", "Missing"]);
        assert_eq!(set.len(), 2);
        assert!(set.matches("tbd"));
        assert!(set.matches("MISSING"));
        assert!(!set.matches("n/a"));
    }

    #[test]
    fn rewrites_every_string_column() {
        let mut df = DataFrame::new(vec![
            Series::new("first_name".into(), [Some("NAncy"), Some("none"), None]).into(),
            Series::new("insurance_id".into(), [Some("??"), Some("INS1"), Some("Invalid")]).into(),
        ])
        .unwrap();

        let replaced = normalize_sentinels(&mut df, &PlaceholderSet::default()).unwrap();

        assert_eq!(replaced, 3);
        let first = df.column("first_name").unwrap().str().unwrap();
        assert_eq!(first.get(0), Some("NAncy"));
        assert_eq!(first.get(1), None);
        assert_eq!(first.get(2), None);
        let insurance = df.column("insurance_id").unwrap().str().unwrap();
        assert_eq!(insurance.get(0), None);
        assert_eq!(insurance.get(1), Some("INS1"));
        assert_eq!(insurance.get(2), None);
    }

    #[test]
    fn leaves_non_string_columns_untouched() {
        let mut df = DataFrame::new(vec![
            Series::new("lab_id".into(), ["L1", "unknown"]).into(),
            Series::new("billable_amount".into(), [Some(42.5f64), None]).into(),
            Series::new("status".into(), ["??", "Active"]).into(),
        ])
        .unwrap();

        let replaced = normalize_sentinels(&mut df, &PlaceholderSet::default()).unwrap();

        assert_eq!(replaced, 2);
        let amounts = df.column("billable_amount").unwrap();
        assert_eq!(amounts.dtype(), &DataType::Float64);
        assert_eq!(amounts.f64().unwrap().get(0), Some(42.5));
        assert_eq!(amounts.f64().unwrap().get(1), None);
        assert_eq!(df.column("lab_id").unwrap().str().unwrap().get(1), None);
        assert_eq!(df.column("status").unwrap().str().unwrap().get(0), None);
    }

    #[test]
    fn preserves_column_order() {
        let mut df = DataFrame::new(vec![
            Series::new("a".into(), ["x", "na"]).into(),
            Series::new("b".into(), ["unknown", "y"]).into(),
            Series::new("c".into(), ["z", "w"]).into(),
        ])
        .unwrap();

        normalize_sentinels(&mut df, &PlaceholderSet::default()).unwrap();

        let names: Vec<&str> = df
            .get_column_names()
            .into_iter()
            .map(|name| name.as_str())
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }
}
