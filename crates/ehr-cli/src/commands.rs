use std::fs;

use anyhow::{Context, Result};
use comfy_table::Table;

use ehr_cli::pipeline::{RunOptions, run_pipeline};
use ehr_cli::types::RunResult;
use ehr_model::{CollectionRules, PipelineConfig};

use crate::cli::RunArgs;
use crate::summary::apply_table_style;

pub fn run_collections() -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec![
        "Collection",
        "Source",
        "Output",
        "Date fields",
        "Amount fields",
        "Invariants",
    ]);
    apply_table_style(&mut table);
    for rules in CollectionRules::defaults() {
        let invariants = rules
            .invariants
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>();
        table.add_row(vec![
            rules.kind.to_string(),
            rules.kind.source_file_name().to_string(),
            rules.kind.output_file_name().to_string(),
            rules.date_fields.join(", "),
            rules.amount_fields.join(", "),
            invariants.join("\n"),
        ]);
    }
    println!("{table}");
    Ok(())
}

pub fn run_clean(args: &RunArgs) -> Result<RunResult> {
    let config = build_config(args)?;
    let result = run_pipeline(
        &config,
        &RunOptions {
            dry_run: args.dry_run,
        },
    )?;
    if let Some(path) = &args.summary_json {
        let json = serde_json::to_string_pretty(&result).context("serialize run summary")?;
        fs::write(path, json).with_context(|| format!("write {}", path.display()))?;
    }
    Ok(result)
}

/// Configuration file (or defaults) with command-line overrides applied.
fn build_config(args: &RunArgs) -> Result<PipelineConfig> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_toml_file(path)
            .with_context(|| format!("load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(dir) = &args.input_dir {
        config = config.with_input_dir(dir);
    }
    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(path) = &args.report {
        config = config.with_report_path(path);
    }
    Ok(config)
}
