use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use tracing::debug;

/// Overwrite the report sink with `text`, creating parent directories.
pub fn write_report(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).with_context(|| format!("create {}", parent.display()))?;
    }
    fs::write(path, text).with_context(|| format!("write report {}", path.display()))?;
    debug!(path = %path.display(), bytes = text.len(), "wrote anomaly report");
    Ok(())
}
