//! Post-normalization checks.
//!
//! - [`validate_collection`] enforces a rule set's invariants. Any violation
//!   is a [`ValidationError`] and must abort the run before anything is
//!   written.
//! - [`detect_anomalies`] evaluates presence rules and returns
//!   [`AnomalyFinding`]s, which are advisory and collected into an
//!   [`AnomalyReport`].

pub mod anomaly;
pub mod error;
pub mod invariants;

pub use anomaly::{AnomalyFinding, AnomalyReport, detect_anomalies, matching_rows};
pub use error::{Result, ValidationError};
pub use invariants::{check_invariant, validate_collection};
