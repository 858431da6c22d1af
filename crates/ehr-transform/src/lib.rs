//! Field normalization for healthcare extracts.
//!
//! The cleaning routine is the same for every collection: placeholder
//! tokens become null, date fields are rewritten to `YYYY-MM-DD`, and
//! monetary fields are coerced to `f64`. Which fields get which treatment is
//! read from the collection's [`ehr_model::CollectionRules`].

pub mod error;
pub mod normalization;
pub mod pipeline;

pub use error::{Result, TransformError};
pub use normalization::{
    DateColumnStats, PlaceholderSet, coerce_amount, coerce_amount_column, format_date,
    normalize_date, normalize_date_column, normalize_sentinels, parse_f64, parse_with_format,
    render_canonical,
};
pub use pipeline::{
    AmountStep, CleaningOptions, CleaningStats, CleaningStep, DateStep, SentinelStep,
    TablePipeline,
};
