//! Raw extract ingestion.
//!
//! Reads each delimited source into a Polars `DataFrame` in which every
//! column is a nullable `String`. No type inference happens here; typing is
//! the job of the field normalizers downstream.
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use ehr_ingest::{ReadOptions, read_collection, require_columns};
//!
//! let path = Path::new("data/raw/patient_data.csv");
//! let df = read_collection(path, &ReadOptions::default())?;
//! require_columns(&df, &["patient_id"], path)?;
//! ```

mod error;
mod reader;

pub use error::{IngestError, Result};
pub use reader::{ReadOptions, read_collection, require_columns};
