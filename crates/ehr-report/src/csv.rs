//! Cleaned collection CSV output.

use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use polars::prelude::{CsvWriter, DataFrame, SerWriter};
use tracing::{debug, warn};

use ehr_model::{CollectionKind, PipelineConfig};

/// Directory created inside the output directory while staging.
const STAGING_DIR: &str = ".staging";

/// Options for writing cleaned collections.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteOptions {
    /// Literal written for null cells.
    pub null_marker: String,
    /// Write into a staging directory, then move every file into place.
    pub staged: bool,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            null_marker: "null".to_string(),
            staged: true,
        }
    }
}

impl WriteOptions {
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self {
            null_marker: config.null_marker.clone(),
            staged: config.staged_writes,
        }
    }
}

/// Write one table with a header row, preserving column order.
pub fn write_collection(df: &mut DataFrame, path: &Path, null_marker: &str) -> Result<()> {
    let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .with_null_value(null_marker.to_string())
        .finish(df)
        .with_context(|| format!("write {}", path.display()))?;
    debug!(path = %path.display(), rows = df.height(), "wrote collection");
    Ok(())
}

/// Write every cleaned collection into `output_dir` under its output file name.
///
/// With staging enabled all files are serialized into `output_dir/.staging`
/// first; the existing outputs are only replaced once every file has been
/// written successfully.
pub fn write_collections(
    tables: &mut [(CollectionKind, DataFrame)],
    output_dir: &Path,
    options: &WriteOptions,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("create {}", output_dir.display()))?;

    if !options.staged {
        let mut outputs = Vec::with_capacity(tables.len());
        for (kind, df) in tables.iter_mut() {
            let path = output_dir.join(kind.output_file_name());
            write_collection(df, &path, &options.null_marker)
                .with_context(|| format!("write {kind}"))?;
            outputs.push(path);
        }
        return Ok(outputs);
    }

    let staging = output_dir.join(STAGING_DIR);
    if staging.exists() {
        fs::remove_dir_all(&staging)
            .with_context(|| format!("remove stale {}", staging.display()))?;
    }
    fs::create_dir_all(&staging).with_context(|| format!("create {}", staging.display()))?;

    if let Err(err) = stage_all(tables, &staging, &options.null_marker) {
        discard_staging(&staging);
        return Err(err);
    }

    let mut outputs = Vec::with_capacity(tables.len());
    for (kind, _) in tables.iter() {
        let file_name = kind.output_file_name();
        let staged = staging.join(file_name);
        let target = output_dir.join(file_name);
        fs::rename(&staged, &target).with_context(|| {
            format!("move {} to {}", staged.display(), target.display())
        })?;
        outputs.push(target);
    }
    fs::remove_dir_all(&staging).with_context(|| format!("remove {}", staging.display()))?;
    Ok(outputs)
}

fn stage_all(
    tables: &mut [(CollectionKind, DataFrame)],
    staging: &Path,
    null_marker: &str,
) -> Result<()> {
    for (kind, df) in tables.iter_mut() {
        let path = staging.join(kind.output_file_name());
        write_collection(df, &path, null_marker).with_context(|| format!("stage {kind}"))?;
    }
    Ok(())
}

fn discard_staging(staging: &Path) {
    if let Err(err) = fs::remove_dir_all(staging) {
        warn!(path = %staging.display(), error = %err, "could not remove staging directory");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{NamedFrom, Series};

    #[test]
    fn nulls_use_marker_and_header_is_kept() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        let mut df = DataFrame::new(vec![
            Series::new("patient_id".into(), ["P1", "P2"]).into(),
            Series::new("first_name".into(), [Some("Ann"), None]).into(),
        ])
        .unwrap();

        write_collection(&mut df, &path, "null").unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "patient_id,first_name\nP1,Ann\nP2,null\n");
    }
}
