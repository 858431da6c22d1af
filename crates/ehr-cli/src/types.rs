use std::path::PathBuf;

use serde::Serialize;

use ehr_model::CollectionKind;
use ehr_transform::CleaningStats;

/// Outcome of a complete pipeline run.
#[derive(Debug, Clone, Serialize)]
pub struct RunResult {
    pub dry_run: bool,
    pub collections: Vec<CollectionSummary>,
    pub anomalies: Vec<AnomalySummary>,
    /// Full anomaly report text as written to the sink.
    pub report: String,
    /// `None` on a dry run.
    pub report_path: Option<PathBuf>,
}

impl RunResult {
    pub fn total_rows(&self) -> usize {
        self.collections.iter().map(|summary| summary.stats.rows).sum()
    }

    pub fn anomaly_rows(&self) -> usize {
        self.anomalies.iter().map(|anomaly| anomaly.rows).sum()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CollectionSummary {
    pub collection: CollectionKind,
    pub source: PathBuf,
    #[serde(flatten)]
    pub stats: CleaningStats,
    /// `None` on a dry run.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnomalySummary {
    pub collection: CollectionKind,
    pub rule: String,
    pub headline: String,
    pub rows: usize,
}
