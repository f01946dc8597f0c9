//! Discovery of measurement exports in the input folder.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;
use thiserror::Error;

/// Errors that can occur while scanning for input files.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Failed to read directory {path}: {source}")]
    ReadDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid file pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// List files in `directory` whose name matches the glob `pattern`.
///
/// Only the directory itself is scanned, not its subdirectories. The result
/// is sorted by path. A missing or unreadable directory is an error; a
/// directory without matches yields an empty list.
///
/// # Arguments
///
/// * `directory` - Folder holding the exports
/// * `pattern` - File-name glob, e.g. `augenmass-*-measurements.csv`
pub fn find_measurement_files(
    directory: &Path,
    pattern: &str,
) -> Result<Vec<PathBuf>, DiscoveryError> {
    let matcher = Pattern::new(pattern).map_err(|source| DiscoveryError::InvalidPattern {
        pattern: pattern.to_string(),
        source,
    })?;

    let entries = fs::read_dir(directory).map_err(|source| DiscoveryError::ReadDir {
        path: directory.to_path_buf(),
        source,
    })?;

    let mut files: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.is_file()
                && path
                    .file_name()
                    .map(|name| matcher.matches(&name.to_string_lossy()))
                    .unwrap_or(false)
        })
        .collect();

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    const PATTERN: &str = "augenmass-*-measurements.csv";

    #[test]
    fn test_find_matching_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        for name in [
            "augenmass-0002-measurements.csv",
            "augenmass-0001-measurements.csv",
            "augenmass-0001-measurements.txt",
            "other.csv",
        ] {
            File::create(temp_dir.path().join(name)).unwrap();
        }
        fs::create_dir(temp_dir.path().join("augenmass-dir-measurements.csv")).unwrap();

        let files = find_measurement_files(temp_dir.path(), PATTERN).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();

        assert_eq!(
            names,
            vec![
                "augenmass-0001-measurements.csv",
                "augenmass-0002-measurements.csv"
            ]
        );
    }

    #[test]
    fn test_find_no_matches() {
        let temp_dir = TempDir::new().unwrap();
        File::create(temp_dir.path().join("notes.csv")).unwrap();

        let files = find_measurement_files(temp_dir.path(), PATTERN).unwrap();
        assert!(files.is_empty());
    }

    #[test]
    fn test_missing_directory_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("pliki");

        let result = find_measurement_files(&missing, PATTERN);
        assert!(matches!(result, Err(DiscoveryError::ReadDir { .. })));
    }

    #[test]
    fn test_invalid_pattern() {
        let temp_dir = TempDir::new().unwrap();
        let result = find_measurement_files(temp_dir.path(), "augenmass-[");
        assert!(matches!(result, Err(DiscoveryError::InvalidPattern { .. })));
    }
}
