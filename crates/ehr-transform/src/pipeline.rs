//! Table cleaning pipeline with ordered step execution.
//!
//! Every collection runs through the same steps; only the
//! [`CollectionRules`] differ.
//!
//! # Standard Pipeline Order
//!
//! 1. **SentinelStep** - Null out placeholder tokens in every column
//! 2. **DateStep** - Rewrite the rule set's date fields to `YYYY-MM-DD`
//! 3. **AmountStep** - Coerce the rule set's amount fields to `f64`
//!
//! # Example
//!
//! ```ignore
//! use ehr_transform::{CleaningOptions, TablePipeline};
//!
//! let pipeline = TablePipeline::standard(CleaningOptions::from_config(&config));
//! let stats = pipeline.execute(&mut df, &rules)?;
//! ```

use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::debug;

use ehr_model::{CollectionRules, DateFormat, PipelineConfig};

use crate::error::Result;
use crate::normalization::{
    PlaceholderSet, coerce_amount_column, normalize_date_column, normalize_sentinels,
};

/// Counts accumulated while cleaning one collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CleaningStats {
    pub rows: usize,
    pub placeholders_nulled: usize,
    pub dates_parsed: usize,
    pub dates_dropped: usize,
    pub amounts_defaulted: usize,
}

/// Settings shared by every collection.
#[derive(Debug, Clone)]
pub struct CleaningOptions {
    pub placeholders: PlaceholderSet,
    pub date_formats: Vec<DateFormat>,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            placeholders: PlaceholderSet::default(),
            date_formats: ehr_model::DEFAULT_DATE_FORMATS.to_vec(),
        }
    }
}

impl CleaningOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            placeholders: PlaceholderSet::new(&config.placeholders),
            date_formats: config.date_formats.clone(),
        }
    }
}

/// A single cleaning step applied to a collection's table.
pub trait CleaningStep {
    /// Apply this step to `df` (modified in place), recording counts in `stats`.
    fn apply(
        &self,
        df: &mut DataFrame,
        rules: &CollectionRules,
        stats: &mut CleaningStats,
    ) -> Result<()>;

    /// Human-readable name for this step (for logging/debugging).
    fn step_name(&self) -> &str;
}

pub struct SentinelStep {
    placeholders: PlaceholderSet,
}

impl SentinelStep {
    pub fn new(placeholders: PlaceholderSet) -> Self {
        Self { placeholders }
    }
}

impl CleaningStep for SentinelStep {
    fn apply(
        &self,
        df: &mut DataFrame,
        _rules: &CollectionRules,
        stats: &mut CleaningStats,
    ) -> Result<()> {
        stats.placeholders_nulled += normalize_sentinels(df, &self.placeholders)?;
        Ok(())
    }

    fn step_name(&self) -> &str {
        "sentinels"
    }
}

pub struct DateStep {
    formats: Vec<DateFormat>,
}

impl DateStep {
    pub fn new(formats: Vec<DateFormat>) -> Self {
        Self { formats }
    }
}

impl CleaningStep for DateStep {
    fn apply(
        &self,
        df: &mut DataFrame,
        rules: &CollectionRules,
        stats: &mut CleaningStats,
    ) -> Result<()> {
        for field in &rules.date_fields {
            let column = normalize_date_column(df, field, &self.formats)?;
            debug!(
                collection = %rules.kind,
                field = %field,
                parsed = column.parsed,
                dropped = column.dropped,
                "normalized date field"
            );
            stats.dates_parsed += column.parsed;
            stats.dates_dropped += column.dropped;
        }
        Ok(())
    }

    fn step_name(&self) -> &str {
        "dates"
    }
}

pub struct AmountStep;

impl CleaningStep for AmountStep {
    fn apply(
        &self,
        df: &mut DataFrame,
        rules: &CollectionRules,
        stats: &mut CleaningStats,
    ) -> Result<()> {
        for field in &rules.amount_fields {
            let defaulted = coerce_amount_column(df, field)?;
            debug!(
                collection = %rules.kind,
                field = %field,
                defaulted,
                "coerced amount field"
            );
            stats.amounts_defaulted += defaulted;
        }
        Ok(())
    }

    fn step_name(&self) -> &str {
        "amounts"
    }
}

/// An ordered pipeline of cleaning steps.
pub struct TablePipeline {
    steps: Vec<Box<dyn CleaningStep>>,
}

impl Default for TablePipeline {
    fn default() -> Self {
        Self::standard(CleaningOptions::default())
    }
}

impl TablePipeline {
    /// Create an empty pipeline.
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Sentinels, then dates, then amounts.
    pub fn standard(options: CleaningOptions) -> Self {
        Self::new()
            .add_step(Box::new(SentinelStep::new(options.placeholders)))
            .add_step(Box::new(DateStep::new(options.date_formats)))
            .add_step(Box::new(AmountStep))
    }

    /// Add a step to the end of the pipeline.
    #[must_use]
    pub fn add_step(mut self, step: Box<dyn CleaningStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|step| step.step_name()).collect()
    }

    /// Execute all steps in order.
    pub fn execute(&self, df: &mut DataFrame, rules: &CollectionRules) -> Result<CleaningStats> {
        let mut stats = CleaningStats {
            rows: df.height(),
            ..CleaningStats::default()
        };
        for step in &self.steps {
            step.apply(df, rules, &mut stats)?;
            debug!(collection = %rules.kind, step = step.step_name(), "cleaning step complete");
        }
        Ok(stats)
    }
}
