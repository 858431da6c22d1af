//! Normalization functions for extract cleaning.
//!
//! - **sentinel**: placeholder tokens to null
//! - **datetime**: multi-format date parsing to `YYYY-MM-DD`
//! - **numeric**: monetary coercion with a `0.0` fallback

pub mod datetime;
pub mod numeric;
pub mod sentinel;

use polars::prelude::{Column, DataFrame, DataType};

use crate::error::{Result, TransformError};

pub use datetime::{
    DateColumnStats, format_date, normalize_date, normalize_date_column, parse_with_format,
    render_canonical,
};
pub use numeric::{coerce_amount, coerce_amount_column, parse_f64};
pub use sentinel::{PlaceholderSet, normalize_sentinels};

/// Fetch a column as a `String` column, casting when it holds another type.
pub(crate) fn string_column(df: &DataFrame, field: &str) -> Result<Column> {
    let column = df.column(field).map_err(|_| TransformError::ColumnNotFound {
        column: field.to_string(),
    })?;
    Ok(column.cast(&DataType::String)?)
}
