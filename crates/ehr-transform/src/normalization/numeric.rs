//! Monetary coercion.

use polars::prelude::{DataFrame, IntoColumn, NamedFrom, Series};

use crate::error::Result;
use crate::normalization::string_column;

/// Parses a string as f64, returning None for invalid or empty strings.
pub fn parse_f64(value: &str) -> Option<f64> {
    if value.trim().is_empty() {
        return None;
    }
    value.trim().parse::<f64>().ok()
}

/// Coerce a raw cell to an amount. Anything unparseable (or NaN) is `0.0`.
pub fn coerce_amount(raw: Option<&str>) -> f64 {
    raw.and_then(parse_f64)
        .filter(|amount| !amount.is_nan())
        .unwrap_or(0.0)
}

/// Replace a column with a non-null `Float64` column.
///
/// Returns how many cells fell back to `0.0` because they were null or
/// could not be parsed.
pub fn coerce_amount_column(df: &mut DataFrame, field: &str) -> Result<usize> {
    let column = string_column(df, field)?;
    let values = column.str()?;
    let mut defaulted = 0usize;
    let amounts: Vec<f64> = values
        .into_iter()
        .map(|value| {
            let parsed = value.and_then(parse_f64).filter(|amount| !amount.is_nan());
            if parsed.is_none() {
                defaulted += 1;
            }
            parsed.unwrap_or(0.0)
        })
        .collect();

    let series = Series::new(column.name().clone(), amounts);
    df.with_column(series.into_column())?;
    Ok(defaulted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerces_with_fallback() {
        assert_eq!(coerce_amount(Some("abc")), 0.0);
        assert_eq!(coerce_amount(Some(" 42.50 ")), 42.5);
        assert_eq!(coerce_amount(None), 0.0);
        assert_eq!(coerce_amount(Some("")), 0.0);
        assert_eq!(coerce_amount(Some("NaN")), 0.0);
        assert_eq!(coerce_amount(Some("1e3")), 1000.0);
        assert_eq!(coerce_amount(Some("$12")), 0.0);
    }

    #[test]
    fn column_is_float_and_never_null() {
        let mut df = DataFrame::new(vec![
            Series::new(
                "billable_amount".into(),
                [Some("120.00"), None, Some("n/a"), Some("-5")],
            )
            .into(),
        ])
        .unwrap();

        let defaulted = coerce_amount_column(&mut df, "billable_amount").unwrap();

        assert_eq!(defaulted, 2);
        let amounts = df.column("billable_amount").unwrap().f64().unwrap();
        assert_eq!(amounts.null_count(), 0);
        let values: Vec<Option<f64>> = amounts.into_iter().collect();
        assert_eq!(values, vec![Some(120.0), Some(0.0), Some(0.0), Some(-5.0)]);
    }

    #[test]
    fn already_numeric_column_survives_recoercion() {
        let mut df =
            DataFrame::new(vec![Series::new("billable_amount".into(), [42.5f64, 0.0]).into()])
                .unwrap();

        let defaulted = coerce_amount_column(&mut df, "billable_amount").unwrap();

        assert_eq!(defaulted, 0);
        let amounts = df.column("billable_amount").unwrap().f64().unwrap();
        assert_eq!(amounts.get(0), Some(42.5));
        assert_eq!(amounts.get(1), Some(0.0));
    }
}
