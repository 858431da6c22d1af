//! CLI library components for the healthcare extract cleaner.

pub mod logging;
pub mod pipeline;
pub mod types;
