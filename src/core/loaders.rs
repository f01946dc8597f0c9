//! Loader for weld measurement exports.
//!
//! The exporter writes one measurement per line in one of two layouts:
//! - `Pomiar 3: 5.250 mm` (optionally followed by `(dx=..., dy=...)`)
//! - legacy `Pomiar,3,5.25,...`
//!
//! Cells containing commas are quoted by the exporter, so every line is split
//! as a single CSV record before matching. A `Scale: 1 px = X mm` header may
//! precede the measurements.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use csv::ReaderBuilder;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static MEASUREMENT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Pomiar (\d+): ([\d.]+) mm").expect("valid measurement regex"));

static SCALE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^Scale: 1 px = ([\d.eE+-]+) mm").expect("valid scale regex"));

/// Label of the legacy column layout.
const LEGACY_LABEL: &str = "Pomiar";

/// Errors that can occur while loading a measurement file.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for loader operations.
pub type Result<T> = std::result::Result<T, LoaderError>;

/// One weld-seam dimension in millimeters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// Measurement number as written in the export.
    pub index: i64,
    /// Dimension in millimeters.
    pub value: f64,
}

impl Measurement {
    pub fn new(index: i64, value: f64) -> Self {
        Self { index, value }
    }
}

/// All measurements parsed from one export, in file line order.
#[derive(Debug, Clone, Default)]
pub struct MeasurementLog {
    pub measurements: Vec<Measurement>,
    /// Millimeters per pixel from the `Scale:` header, if present.
    pub scale_mm_per_px: Option<f64>,
    /// Non-blank lines that matched neither layout.
    pub ignored_lines: usize,
}

impl MeasurementLog {
    #[inline]
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Measurement values in file order.
    pub fn values(&self) -> Vec<f64> {
        self.measurements.iter().map(|m| m.value).collect()
    }

    /// (index, value) pairs as floats, ready for plotting and fitting.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.measurements
            .iter()
            .map(|m| (m.index as f64, m.value))
            .collect()
    }
}

/// Split one line into CSV fields, removing exporter quoting.
fn split_fields(line: &str) -> Vec<String> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes());

    match reader.records().next() {
        Some(Ok(record)) => record.iter().map(str::to_string).collect(),
        _ => vec![line.to_string()],
    }
}

fn parse_fields(fields: &[String]) -> Option<Measurement> {
    let first = fields.first()?;

    if let Some(caps) = MEASUREMENT_LINE.captures(first) {
        let index = caps[1].parse().ok()?;
        let value = caps[2].parse::<f64>().ok().filter(|v| v.is_finite())?;
        return Some(Measurement::new(index, value));
    }

    if first == LEGACY_LABEL && fields.len() >= 3 {
        let index = fields[1].trim().parse().ok()?;
        let value = fields[2].trim().parse::<f64>().ok().filter(|v| v.is_finite())?;
        return Some(Measurement::new(index, value));
    }

    None
}

/// Parse a single export line into a measurement.
///
/// Returns `None` for headers, scale-reference lines (`Pomiar do skali ...`),
/// blank lines and anything malformed.
pub fn parse_line(line: &str) -> Option<Measurement> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    parse_fields(&split_fields(line))
}

/// Parse every line of an export.
///
/// Lines that do not yield a measurement are skipped; only I/O failures are
/// reported as errors.
pub fn parse_measurements<R: BufRead>(reader: R) -> Result<MeasurementLog> {
    let mut log = MeasurementLog::default();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let fields = split_fields(line);
        if let Some(measurement) = parse_fields(&fields) {
            log.measurements.push(measurement);
            continue;
        }

        let scale = fields
            .first()
            .and_then(|f| SCALE_LINE.captures(f))
            .and_then(|caps| caps[1].parse::<f64>().ok());
        match scale {
            Some(scale) if log.scale_mm_per_px.is_none() => log.scale_mm_per_px = Some(scale),
            _ => log.ignored_lines += 1,
        }
    }

    Ok(log)
}

/// Load and parse a measurement export from disk.
pub fn load_measurements<P: AsRef<Path>>(path: P) -> Result<MeasurementLog> {
    let file = File::open(path.as_ref())?;
    parse_measurements(BufReader::new(file))
}
