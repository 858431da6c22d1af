//! Invariant checks over a cleaned collection.
//!
//! Invariants run in the order the rule set lists them and the first failure
//! is returned. Values are compared exactly as stored after normalization.

use std::collections::HashMap;

use polars::prelude::{DataFrame, DataType, StringChunked};
use tracing::debug;

use ehr_model::{CollectionKind, CollectionRules, Invariant};

use crate::error::{Result, ValidationError};

/// Marker used for a null value in violation messages.
const NULL_DISPLAY: &str = "null";

/// Check every invariant of `rules` against `df`.
pub fn validate_collection(df: &DataFrame, rules: &CollectionRules) -> Result<()> {
    for invariant in &rules.invariants {
        check_invariant(df, rules.kind, invariant)?;
        debug!(collection = %rules.kind, invariant = %invariant, "invariant holds");
    }
    Ok(())
}

/// Check a single invariant.
pub fn check_invariant(
    df: &DataFrame,
    collection: CollectionKind,
    invariant: &Invariant,
) -> Result<()> {
    let values = field_values(df, collection, invariant.field())?;
    match invariant {
        Invariant::Unique { field } => check_unique(&values, collection, field),
        Invariant::NotNull { field } => match values.null_count() {
            0 => Ok(()),
            null_count => Err(ValidationError::NullValue {
                collection,
                field: field.clone(),
                null_count,
            }),
        },
        Invariant::OneOf { field, allowed } => {
            let offending = values
                .into_iter()
                .find(|value| !value.is_some_and(|text| allowed.iter().any(|a| a == text)));
            match offending {
                None => Ok(()),
                Some(value) => Err(ValidationError::InvalidValue {
                    collection,
                    field: field.clone(),
                    value: value.unwrap_or(NULL_DISPLAY).to_string(),
                    allowed: allowed.clone(),
                }),
            }
        }
    }
}

/// Reports the first value (in row order) that occurs more than once.
/// Nulls are ignored here; the not-null invariant covers them.
fn check_unique(values: &StringChunked, collection: CollectionKind, field: &str) -> Result<()> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for value in values.into_iter().flatten() {
        *counts.entry(value).or_default() += 1;
    }
    let duplicate = values
        .into_iter()
        .flatten()
        .find(|value| counts.get(value).copied().unwrap_or(0) > 1);
    match duplicate {
        None => Ok(()),
        Some(value) => Err(ValidationError::DuplicateValue {
            collection,
            field: field.to_string(),
            value: value.to_string(),
            occurrences: counts.get(value).copied().unwrap_or(0),
        }),
    }
}

fn field_values(df: &DataFrame, collection: CollectionKind, field: &str) -> Result<StringChunked> {
    let column = df
        .column(field)
        .map_err(|_| ValidationError::MissingColumn {
            collection,
            field: field.to_string(),
        })?;
    let column = column.cast(&DataType::String)?;
    Ok(column.str()?.clone())
}
