//! Data model for the healthcare extract cleaning pipeline.
//!
//! This crate holds the shared vocabulary used by every pipeline stage:
//!
//! - [`CollectionKind`]: the four record collections and their file names
//! - [`CollectionRules`]: per-collection date fields, amount fields,
//!   invariants, and anomaly rules
//! - [`DateFormat`]: the ordered candidate formats for date normalization
//! - [`PipelineConfig`]: the configuration passed to the pipeline entry point

pub mod collection;
pub mod config;
pub mod date_format;
pub mod error;
pub mod rules;

pub use collection::CollectionKind;
pub use config::{
    DEFAULT_PLACEHOLDERS, DEFAULT_READER_NULL_VALUES, PipelineConfig, default_placeholders,
    default_reader_null_values,
};
pub use date_format::{DEFAULT_DATE_FORMATS, DateFormat, FieldOrder};
pub use error::{ConfigError, Result};
pub use rules::{CollectionRules, Invariant, PresenceRule};
