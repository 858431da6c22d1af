//! CSV loading into all-string DataFrames.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use polars::prelude::{
    CsvParseOptions, CsvReadOptions, DataFrame, NullValues, PlSmallStr, SerReader,
};
use tracing::debug;

use ehr_model::default_reader_null_values;

use crate::error::{IngestError, Result};

/// Options controlling how raw extracts are read.
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Raw field values read as null (exact match). Empty fields are always null.
    pub null_values: Vec<String>,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            null_values: default_reader_null_values(),
        }
    }
}

impl ReadOptions {
    #[must_use]
    pub fn with_null_values(mut self, values: Vec<String>) -> Self {
        self.null_values = values;
        self
    }
}

fn open_file(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            IngestError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IngestError::FileRead {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })
}

/// Reads the first line, stripped of a UTF-8 BOM.
fn read_header_line(path: &Path) -> Result<Option<String>> {
    let reader = BufReader::new(open_file(path)?);
    let Some(line) = reader.lines().next() else {
        return Ok(None);
    };
    let line = line.map_err(|e| IngestError::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(Some(line.strip_prefix('\u{feff}').unwrap_or(&line).to_string()))
}

fn normalize_header(raw: &str) -> &str {
    raw.trim().trim_matches('\u{feff}')
}

/// Reads a delimited extract with a single header row.
///
/// Every column is loaded as `String`; empty fields and fields matching one
/// of `options.null_values` become null.
pub fn read_collection(path: &Path, options: &ReadOptions) -> Result<DataFrame> {
    let header = read_header_line(path)?;
    if header.as_deref().is_none_or(|line| line.trim().is_empty()) {
        return Err(IngestError::EmptyCsv {
            path: path.to_path_buf(),
        });
    }

    let null_values: Vec<PlSmallStr> = options
        .null_values
        .iter()
        .filter(|value| !value.is_empty())
        .map(|value| PlSmallStr::from(value.as_str()))
        .collect();
    let parse_options = CsvParseOptions::default()
        .with_null_values((!null_values.is_empty()).then_some(NullValues::AllColumns(null_values)));

    // Schema inference over zero rows reads every column as String.
    let mut df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
        .with_parse_options(parse_options)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
        .finish()
        .map_err(|e| IngestError::CsvParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let renames: Vec<(String, String)> = df
        .get_column_names()
        .into_iter()
        .filter_map(|name| {
            let normalized = normalize_header(name.as_str());
            (normalized != name.as_str()).then(|| (name.to_string(), normalized.to_string()))
        })
        .collect();
    for (from, to) in renames {
        df.rename(&from, to.into())?;
    }

    debug!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "loaded extract"
    );
    Ok(df)
}

/// Fails when any of `columns` is absent from `df`.
pub fn require_columns(df: &DataFrame, columns: &[&str], path: &Path) -> Result<()> {
    for column in columns {
        if df.column(column).is_err() {
            return Err(IngestError::MissingColumn {
                column: (*column).to_string(),
                path: path.to_path_buf(),
            });
        }
    }
    Ok(())
}
