//! File-by-file chart generation.
//!
//! For every export found in the input folder the pipeline parses the
//! measurements, computes summary statistics, and writes a histogram and a
//! scatter chart. Files without usable measurements are reported and skipped.

use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use log::{debug, info, warn};

use crate::config::PipelineConfig;
use crate::core::loaders::{load_measurements, MeasurementLog};
use crate::core::writers::{chart_paths, ensure_output_dir, input_stem, ChartPaths};
use crate::processors::discovery::find_measurement_files;
use crate::processors::statistics::{histogram, linear_fit, outliers, Summary, TrendLine};
use crate::visualization::{self, ScatterData};

/// Why a file produced no charts.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// The file could not be opened or read.
    Unreadable(String),
    /// No line matched a measurement layout.
    NoMeasurements,
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unreadable(e) => write!(f, "unreadable ({})", e),
            SkipReason::NoMeasurements => write!(f, "no measurements"),
        }
    }
}

/// Charts and statistics produced for one input file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub source: PathBuf,
    pub summary: Summary,
    pub trend: Option<TrendLine>,
    pub outlier_count: usize,
    pub scale_mm_per_px: Option<f64>,
    pub charts: ChartPaths,
}

/// Result of processing one input file.
#[derive(Debug, Clone)]
pub enum FileOutcome {
    Rendered(FileReport),
    Skipped { path: PathBuf, reason: SkipReason },
}

/// Totals for a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub files_found: usize,
    pub outcomes: Vec<FileOutcome>,
    /// Message printed when the run stopped early, e.g. no matching files.
    pub notice: Option<String>,
}

impl RunReport {
    pub fn rendered(&self) -> impl Iterator<Item = &FileReport> {
        self.outcomes.iter().filter_map(|o| match o {
            FileOutcome::Rendered(report) => Some(report),
            FileOutcome::Skipped { .. } => None,
        })
    }

    pub fn rendered_count(&self) -> usize {
        self.rendered().count()
    }

    pub fn skipped_count(&self) -> usize {
        self.outcomes.len() - self.rendered_count()
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Render both charts for an already parsed log.
///
/// # Errors
///
/// Returns an error if the log is empty or a chart cannot be written.
pub fn render_log(
    log: &MeasurementLog,
    source: &Path,
    config: &PipelineConfig,
) -> Result<FileReport> {
    let values = log.values();
    let points = log.points();
    let summary = Summary::from_values(&values)
        .with_context(|| format!("No measurements to render for {}", source.display()))?;

    let stem = input_stem(source);
    let charts = chart_paths(&config.paths.output_dir, &stem);

    let bins = histogram(&values, config.histogram.bins)
        .with_context(|| format!("Cannot bin values into {} bins", config.histogram.bins))?;

    visualization::plot_histogram(
        &charts.histogram,
        &bins,
        &summary,
        &visualization::histogram_title(&stem),
        &config.histogram,
        &config.render,
    )
    .with_context(|| format!("Failed to render {}", charts.histogram.display()))?;

    let trend = linear_fit(&points);
    if trend.is_none() {
        warn!(
            "Trend line undefined for {} (need at least two distinct measurement numbers)",
            source.display()
        );
    }
    let flagged = outliers(&values, &summary, config.scatter.outlier_sigma);
    if !flagged.is_empty() {
        debug!(
            "{} outliers beyond {}σ in {}",
            flagged.len(),
            config.scatter.outlier_sigma,
            source.display()
        );
    }

    let data = ScatterData {
        points: &points,
        summary: &summary,
        trend,
        outliers: &flagged,
        outlier_sigma: config.scatter.outlier_sigma,
    };
    visualization::plot_scatter(
        &charts.scatter,
        &data,
        &visualization::scatter_title(&stem),
        &config.scatter,
        &config.render,
    )
    .with_context(|| format!("Failed to render {}", charts.scatter.display()))?;

    Ok(FileReport {
        source: source.to_path_buf(),
        summary,
        trend,
        outlier_count: flagged.len(),
        scale_mm_per_px: log.scale_mm_per_px,
        charts,
    })
}

/// Parse one export and render its charts.
///
/// Unreadable files and files without measurements are returned as
/// [`FileOutcome::Skipped`]; rendering failures are errors.
pub fn process_file(path: &Path, config: &PipelineConfig) -> Result<FileOutcome> {
    let log = match load_measurements(path) {
        Ok(log) => log,
        Err(e) => {
            warn!("Failed to read {}: {}", path.display(), e);
            return Ok(FileOutcome::Skipped {
                path: path.to_path_buf(),
                reason: SkipReason::Unreadable(e.to_string()),
            });
        }
    };

    debug!(
        "{}: {} measurements, {} ignored lines",
        path.display(),
        log.len(),
        log.ignored_lines
    );
    if let Some(scale) = log.scale_mm_per_px {
        debug!("{}: scale 1 px = {} mm", path.display(), scale);
    }

    if log.is_empty() {
        return Ok(FileOutcome::Skipped {
            path: path.to_path_buf(),
            reason: SkipReason::NoMeasurements,
        });
    }

    let report = render_log(&log, path, config)?;
    Ok(FileOutcome::Rendered(report))
}

/// Run the pipeline without progress display.
pub fn run(config: &PipelineConfig) -> Result<RunReport> {
    run_with_progress(config, &ProgressBar::hidden())
}

/// Run the pipeline over every matching file in the input folder.
///
/// Status lines are printed to stdout through `progress` so they do not
/// collide with the bar. A folder without matching files prints a message and
/// returns an empty report.
///
/// # Errors
///
/// Returns an error if the input folder cannot be read, the output folder
/// cannot be created, or a chart fails to render.
pub fn run_with_progress(config: &PipelineConfig, progress: &ProgressBar) -> Result<RunReport> {
    let paths = &config.paths;

    ensure_output_dir(&paths.output_dir)?;

    let files = find_measurement_files(&paths.input_dir, &paths.file_pattern)?;
    let mut report = RunReport {
        files_found: files.len(),
        outcomes: Vec::with_capacity(files.len()),
        notice: None,
    };

    if files.is_empty() {
        let notice = format!("No measurement files found in {}", paths.input_dir.display());
        progress.suspend(|| println!("{}", notice));
        report.notice = Some(notice);
        return Ok(report);
    }

    info!(
        "Processing {} files from {} into {}",
        files.len(),
        paths.input_dir.display(),
        paths.output_dir.display()
    );
    progress.set_length(files.len() as u64);
    progress.suspend(|| println!("Found {} measurement files\n", files.len()));

    for path in &files {
        let name = file_name(path);
        progress.set_message(name.clone());
        progress.suspend(|| println!("Processing: {}", name));

        let outcome = process_file(path, config)?;

        progress.suspend(|| match &outcome {
            FileOutcome::Rendered(file) => {
                println!("  Found {} measurements", file.summary.count);
                println!("  Saved histogram: {}", file.charts.histogram.display());
                println!("  Saved scatter plot: {}", file.charts.scatter.display());
                println!();
            }
            FileOutcome::Skipped {
                reason: SkipReason::NoMeasurements,
                ..
            } => {
                println!("  No measurements in file {}", name);
            }
            FileOutcome::Skipped { reason, .. } => {
                println!("  Skipping {}: {}", name, reason);
            }
        });

        report.outcomes.push(outcome);
        progress.inc(1);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn test_config(root: &Path) -> PipelineConfig {
        let mut config = PipelineConfig::default();
        config.paths.input_dir = root.join("pliki");
        config.paths.output_dir = root.join("wykresy");
        config.render.annotate = false;
        config.histogram.width = 320;
        config.histogram.height = 200;
        config.scatter.width = 320;
        config.scatter.height = 200;
        config
    }

    fn write_export(dir: &Path, name: &str, content: &str) -> PathBuf {
        fs::create_dir_all(dir).unwrap();
        let path = dir.join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_run_no_matching_files() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        fs::create_dir_all(&config.paths.input_dir).unwrap();
        write_export(&config.paths.input_dir, "unrelated.csv", "Pomiar 1: 1.0 mm\n");

        let report = run(&config).unwrap();
        assert_eq!(report.files_found, 0);
        assert!(report.outcomes.is_empty());
        let notice = report.notice.unwrap();
        assert!(notice.starts_with("No measurement files found in"));
        assert!(notice.contains("pliki"));
        assert_eq!(fs::read_dir(&config.paths.output_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_run_missing_input_dir_fails() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());

        assert!(run(&config).is_err());
    }

    #[test]
    fn test_process_file_without_measurements_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        fs::create_dir_all(&config.paths.output_dir).unwrap();
        let path = write_export(
            &config.paths.input_dir,
            "augenmass-0001-measurements.csv",
            "Scale: 1 px = 0.05 mm\n\nPomiar do skali 1: 10.0 mm\nnothing here\n",
        );

        let outcome = process_file(&path, &config).unwrap();
        assert!(matches!(
            outcome,
            FileOutcome::Skipped {
                reason: SkipReason::NoMeasurements,
                ..
            }
        ));
        assert_eq!(fs::read_dir(&config.paths.output_dir).unwrap().count(), 0);
    }

    #[test]
    fn test_process_unreadable_file_is_skipped() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let path = write_export(
            &config.paths.input_dir,
            "augenmass-0002-measurements.csv",
            "",
        );
        fs::write(&path, [0xff, 0xfe, 0x00, 0x9f, b'\n']).unwrap();

        let outcome = process_file(&path, &config).unwrap();
        assert!(matches!(
            outcome,
            FileOutcome::Skipped {
                reason: SkipReason::Unreadable(_),
                ..
            }
        ));
    }

    #[test]
    fn test_run_renders_charts_per_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());
        let input = &config.paths.input_dir;

        write_export(
            input,
            "augenmass-0001-measurements.csv",
            "Scale: 1 px = 0.0500 mm\n\n\
             Pomiar 1: 2.000 mm\n\
             \"Pomiar 2: 4.000 mm (dx=1.0 mm, dy=2.0 mm)\"\n\
             Pomiar 3: 6.000 mm\n",
        );
        write_export(input, "augenmass-0002-measurements.csv", "header\nno data\n");
        write_export(input, "augenmass-0003-measurements.csv", "Pomiar,3,5.25,x\n");

        let report = run(&config).unwrap();
        assert_eq!(report.files_found, 3);
        assert_eq!(report.rendered_count(), 2);
        assert_eq!(report.skipped_count(), 1);

        let first = report.rendered().next().unwrap();
        assert_eq!(first.summary.count, 3);
        assert!((first.summary.mean - 4.0).abs() < 1e-9);
        assert_eq!(first.scale_mm_per_px, Some(0.05));
        let trend = first.trend.unwrap();
        assert!((trend.slope - 2.0).abs() < 1e-9);
        assert!(trend.intercept.abs() < 1e-9);

        let out = &config.paths.output_dir;
        assert!(out.join("augenmass-0001-measurements_histogram.png").is_file());
        assert!(out.join("augenmass-0001-measurements_scatter.png").is_file());
        assert!(!out.join("augenmass-0002-measurements_histogram.png").exists());
        assert!(!out.join("augenmass-0002-measurements_scatter.png").exists());
        assert!(out.join("augenmass-0003-measurements_scatter.png").is_file());

        // Single measurement has no defined trend
        let single = report.rendered().nth(1).unwrap();
        assert!(single.trend.is_none());
    }

    #[test]
    fn test_render_log_empty_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = test_config(temp_dir.path());

        let result = render_log(
            &MeasurementLog::default(),
            Path::new("augenmass-0001-measurements.csv"),
            &config,
        );
        assert!(result.is_err());
    }
}
