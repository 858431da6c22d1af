//! CLI argument definitions for the extract cleaner.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "ehr-clean",
    version,
    about = "Clean raw healthcare extracts into validated CSV collections",
    long_about = "Clean raw healthcare extracts (patients, visits, lab results, ICD codes).\n\n\
                  Placeholder tokens become null, dates are normalized to YYYY-MM-DD,\n\
                  billable amounts are coerced to numbers, and integrity rules are\n\
                  enforced before any cleaned file is written."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Include patient-level values (identifiers of anomalous rows) in logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Clean, validate, and write every collection.
    Run(RunArgs),

    /// List the built-in collection rule sets.
    Collections,
}

#[derive(Parser)]
pub struct RunArgs {
    /// TOML configuration file (missing keys take defaults).
    #[arg(long = "config", value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Directory holding the raw extracts (default: data/raw).
    #[arg(long = "input-dir", value_name = "DIR")]
    pub input_dir: Option<PathBuf>,

    /// Directory receiving the cleaned files (default: data/cleaned).
    #[arg(long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Anomaly report file (default: data/monitoring/orphaned_insurance_ids_log.txt).
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,

    /// Run every stage, including validation, without writing files.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Also write the run summary as JSON.
    #[arg(long = "summary-json", value_name = "PATH")]
    pub summary_json: Option<PathBuf>,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_run_flags() {
        let cli = Cli::parse_from([
            "ehr-clean",
            "--log-data",
            "run",
            "--input-dir",
            "in",
            "--dry-run",
            "--log-format",
            "json",
        ]);
        assert!(cli.log_data);
        assert!(matches!(cli.log_format, LogFormatArg::Json));
        let Command::Run(args) = cli.command else {
            panic!("expected run");
        };
        assert_eq!(args.input_dir, Some(PathBuf::from("in")));
        assert!(args.dry_run);
        assert!(args.config.is_none());
    }
}
