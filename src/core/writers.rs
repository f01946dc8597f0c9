//! Output locations for rendered charts.

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Suffix appended to the input stem for the distribution chart.
const HISTOGRAM_SUFFIX: &str = "_histogram.png";

/// Suffix appended to the input stem for the trend chart.
const SCATTER_SUFFIX: &str = "_scatter.png";

/// Errors that can occur while preparing outputs.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Failed to create the output directory.
    #[error("failed to create output directory '{path}': {source}")]
    CreateDirectory {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for write operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Destination pair for the two charts of one input file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPaths {
    pub histogram: PathBuf,
    pub scatter: PathBuf,
}

/// Create the output directory (and parents) if it does not exist.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    if dir.as_os_str().is_empty() || dir.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|e| WriteError::CreateDirectory {
        path: dir.display().to_string(),
        source: e,
    })
}

/// File stem of an input export, e.g. `augenmass-0001-measurements`.
pub fn input_stem(input: &Path) -> String {
    input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "measurements".to_string())
}

/// Build `{stem}_histogram.png` and `{stem}_scatter.png` inside `output_dir`.
pub fn chart_paths(output_dir: &Path, stem: &str) -> ChartPaths {
    ChartPaths {
        histogram: output_dir.join(format!("{}{}", stem, HISTOGRAM_SUFFIX)),
        scatter: output_dir.join(format!("{}{}", stem, SCATTER_SUFFIX)),
    }
}
