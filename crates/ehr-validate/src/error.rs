use polars::prelude::PolarsError;
use thiserror::Error;

use ehr_model::CollectionKind;

/// An invariant violation. Always fatal to the run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{collection}.{field} must be unique: {value:?} appears {occurrences} times")]
    DuplicateValue {
        collection: CollectionKind,
        field: String,
        value: String,
        occurrences: usize,
    },

    #[error("{collection}.{field} must not be null: found {null_count} null values")]
    NullValue {
        collection: CollectionKind,
        field: String,
        null_count: usize,
    },

    #[error(
        "{collection}.{field} must be one of [{}]: found {value:?}",
        .allowed.join(", ")
    )]
    InvalidValue {
        collection: CollectionKind,
        field: String,
        value: String,
        allowed: Vec<String>,
    },

    #[error("{collection} has no column {field:?}")]
    MissingColumn {
        collection: CollectionKind,
        field: String,
    },

    #[error("data frame error: {message}")]
    DataFrame { message: String },
}

impl ValidationError {
    pub fn collection(&self) -> Option<CollectionKind> {
        match self {
            Self::DuplicateValue { collection, .. }
            | Self::NullValue { collection, .. }
            | Self::InvalidValue { collection, .. }
            | Self::MissingColumn { collection, .. } => Some(*collection),
            Self::DataFrame { .. } => None,
        }
    }
}

impl From<PolarsError> for ValidationError {
    fn from(err: PolarsError) -> Self {
        ValidationError::DataFrame {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ValidationError>;
