//! Pipeline orchestration.
//!
//! Load → Normalize → Validate → Detect → Write, over every configured
//! collection. Validation failures abort the run before anything is written,
//! so either all four cleaned files (and the report) are produced or none.

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use polars::prelude::DataFrame;
use tracing::{error, info, info_span, warn};

use ehr_ingest::{ReadOptions, read_collection, require_columns};
use ehr_model::{CollectionKind, CollectionRules, Invariant, PipelineConfig};
use ehr_report::{WriteOptions, write_collections, write_report};
use ehr_transform::{CleaningOptions, CleaningStats, TablePipeline};
use ehr_validate::{AnomalyFinding, AnomalyReport, detect_anomalies, validate_collection};

use crate::logging::redact_value;
use crate::types::{AnomalySummary, CollectionSummary, RunResult};

/// Options that change what a run does, not how data is cleaned.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Run every stage but write no files.
    pub dry_run: bool,
}

/// A collection carried through the stages.
struct LoadedCollection<'a> {
    rules: &'a CollectionRules,
    source: PathBuf,
    data: DataFrame,
    stats: CleaningStats,
}

/// Run the full cleaning pipeline described by `config`.
///
/// Invariant violations are returned as [`ehr_validate::ValidationError`]
/// (retrievable with `downcast_ref`).
pub fn run_pipeline(config: &PipelineConfig, options: &RunOptions) -> Result<RunResult> {
    config.validate().context("invalid configuration")?;
    let run_start = Instant::now();

    let mut collections = load(config)?;
    normalize(config, &mut collections)?;
    validate(&collections)?;
    let report = detect(&collections)?;
    let report_text = report
        .render(&config.null_marker)
        .context("render anomaly report")?;

    let (outputs, report_path) = if options.dry_run {
        info!("dry run: skipping writes");
        (vec![None; collections.len()], None)
    } else {
        let outputs = write(config, &mut collections, &report_text)?;
        (
            outputs.into_iter().map(Some).collect(),
            Some(config.report_path.clone()),
        )
    };

    let anomalies = report
        .findings()
        .iter()
        .map(|finding| AnomalySummary {
            collection: finding.collection,
            rule: finding.rule.name.clone(),
            headline: finding.headline(),
            rows: finding.row_count(),
        })
        .collect();
    let collections = collections
        .into_iter()
        .zip(outputs)
        .map(|(collection, output)| CollectionSummary {
            collection: collection.rules.kind,
            source: collection.source,
            stats: collection.stats,
            output,
        })
        .collect::<Vec<_>>();

    info!(
        collections = collections.len(),
        dry_run = options.dry_run,
        duration_ms = run_start.elapsed().as_millis(),
        "pipeline complete"
    );
    Ok(RunResult {
        dry_run: options.dry_run,
        collections,
        anomalies,
        report: report_text,
        report_path,
    })
}

fn load(config: &PipelineConfig) -> Result<Vec<LoadedCollection<'_>>> {
    let _span = info_span!("load", input_dir = %config.input_dir.display()).entered();
    let start = Instant::now();
    let read_options = ReadOptions::default().with_null_values(config.reader_null_values.clone());

    let mut collections = Vec::with_capacity(config.collections.len());
    for rules in &config.collections {
        let kind = rules.kind;
        let _collection = info_span!("collection", collection = %kind).entered();
        let source = config.source_path(kind);
        let data = read_collection(&source, &read_options)
            .with_context(|| format!("load {kind} from {}", source.display()))?;
        require_columns(&data, &rules.required_columns(), &source)
            .with_context(|| format!("load {kind}"))?;
        collections.push(LoadedCollection {
            rules,
            source,
            data,
            stats: CleaningStats::default(),
        });
    }

    info!(
        collections = collections.len(),
        rows = collections.iter().map(|c| c.data.height()).sum::<usize>(),
        duration_ms = start.elapsed().as_millis(),
        "load complete"
    );
    Ok(collections)
}

fn normalize(config: &PipelineConfig, collections: &mut [LoadedCollection<'_>]) -> Result<()> {
    let _span = info_span!("normalize").entered();
    let start = Instant::now();
    let pipeline = TablePipeline::standard(CleaningOptions::from_config(config));

    for collection in collections.iter_mut() {
        let kind = collection.rules.kind;
        let _collection = info_span!("collection", collection = %kind).entered();
        collection.stats = pipeline
            .execute(&mut collection.data, collection.rules)
            .with_context(|| format!("normalize {kind}"))?;
        info!(
            collection = %kind,
            rows = collection.stats.rows,
            placeholders_nulled = collection.stats.placeholders_nulled,
            dates_parsed = collection.stats.dates_parsed,
            dates_dropped = collection.stats.dates_dropped,
            amounts_defaulted = collection.stats.amounts_defaulted,
            "collection normalized"
        );
    }

    info!(
        duration_ms = start.elapsed().as_millis(),
        "normalize complete"
    );
    Ok(())
}

fn validate(collections: &[LoadedCollection<'_>]) -> Result<()> {
    let _span = info_span!("validate").entered();
    let start = Instant::now();

    for collection in collections {
        let kind = collection.rules.kind;
        let _collection = info_span!("collection", collection = %kind).entered();
        if let Err(violation) = validate_collection(&collection.data, collection.rules) {
            error!(collection = %kind, error = %violation, "invariant violated");
            return Err(violation.into());
        }
    }

    info!(
        invariants = collections
            .iter()
            .map(|c| c.rules.invariants.len())
            .sum::<usize>(),
        duration_ms = start.elapsed().as_millis(),
        "validate complete"
    );
    Ok(())
}

fn detect(collections: &[LoadedCollection<'_>]) -> Result<AnomalyReport> {
    let _span = info_span!("detect").entered();
    let start = Instant::now();
    let mut report = AnomalyReport::new();

    for collection in collections {
        let kind = collection.rules.kind;
        let _collection = info_span!("collection", collection = %kind).entered();
        let findings = detect_anomalies(collection.rules, &collection.data)
            .with_context(|| format!("detect anomalies in {kind}"))?;
        for finding in &findings {
            log_finding(finding, identifier_field(collection.rules, &collection.data))?;
        }
        report.extend(findings);
    }

    info!(
        rows = report.total_rows(),
        duration_ms = start.elapsed().as_millis(),
        "detect complete"
    );
    Ok(report)
}

/// Field used to name anomalous rows in logs: the first unique field of the
/// rule set, else the first column.
fn identifier_field<'a>(rules: &'a CollectionRules, df: &'a DataFrame) -> Option<&'a str> {
    rules
        .invariants
        .iter()
        .find_map(|invariant| match invariant {
            Invariant::Unique { field } => Some(field.as_str()),
            _ => None,
        })
        .or_else(|| df.get_columns().first().map(|column| column.name().as_str()))
}

fn log_finding(finding: &AnomalyFinding, identifier: Option<&str>) -> Result<()> {
    if finding.is_empty() {
        info!(rule = %finding.rule.name, "{}", finding.headline());
        return Ok(());
    }
    warn!(
        collection = %finding.collection,
        rule = %finding.rule.name,
        rows = finding.row_count(),
        "{}",
        finding.headline()
    );
    let Some(field) = identifier else {
        return Ok(());
    };
    let values = finding
        .values(field)
        .with_context(|| format!("read {field} of anomalous rows"))?;
    for value in values {
        let value = value.unwrap_or_else(|| "null".to_string());
        warn!(
            collection = %finding.collection,
            rule = %finding.rule.name,
            field,
            value = redact_value(&value),
            "anomalous row"
        );
    }
    Ok(())
}

fn write(
    config: &PipelineConfig,
    collections: &mut [LoadedCollection<'_>],
    report_text: &str,
) -> Result<Vec<PathBuf>> {
    let _span = info_span!("write", output_dir = %config.output_dir.display()).entered();
    let start = Instant::now();

    let mut tables: Vec<(CollectionKind, DataFrame)> = collections
        .iter_mut()
        .map(|collection| {
            (
                collection.rules.kind,
                std::mem::take(&mut collection.data),
            )
        })
        .collect();
    let outputs = write_collections(
        &mut tables,
        &config.output_dir,
        &WriteOptions::from_config(config),
    )
    .context("write cleaned collections")?;
    write_report(&config.report_path, report_text).context("write anomaly report")?;

    info!(
        files = outputs.len(),
        report = %config.report_path.display(),
        duration_ms = start.elapsed().as_millis(),
        "write complete"
    );
    Ok(outputs)
}
