//! Output generation for the cleaning pipeline.
//!
//! - **CSV**: one delimited file per cleaned collection, nulls written as an
//!   explicit marker, optionally staged so a run never leaves a partial set
//! - **Anomaly report**: the plain-text report sink, overwritten each run

mod csv;
mod sink;

pub use csv::{WriteOptions, write_collection, write_collections};
pub use sink::write_report;
