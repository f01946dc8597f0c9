//! Configuration types for the weld chart pipeline.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Input and output locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Folder scanned for measurement exports
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Folder receiving the rendered charts (created if absent)
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Glob matched against file names inside `input_dir`
    #[serde(default = "default_file_pattern")]
    pub file_pattern: String,
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("pliki")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("wykresy")
}

fn default_file_pattern() -> String {
    "augenmass-*-measurements.csv".to_string()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            input_dir: default_input_dir(),
            output_dir: default_output_dir(),
            file_pattern: default_file_pattern(),
        }
    }
}

/// Histogram chart parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistogramConfig {
    /// Number of equal-width bins
    #[serde(default = "default_bins")]
    pub bins: usize,

    /// Image width in pixels
    #[serde(default = "default_histogram_width")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_chart_height")]
    pub height: u32,
}

fn default_bins() -> usize {
    15
}

fn default_histogram_width() -> u32 {
    1500
}

fn default_chart_height() -> u32 {
    900
}

impl Default for HistogramConfig {
    fn default() -> Self {
        Self {
            bins: default_bins(),
            width: default_histogram_width(),
            height: default_chart_height(),
        }
    }
}

/// Scatter chart parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScatterConfig {
    /// Image width in pixels
    #[serde(default = "default_scatter_width")]
    pub width: u32,

    /// Image height in pixels
    #[serde(default = "default_chart_height")]
    pub height: u32,

    /// Points further than this many standard deviations from the mean are highlighted
    #[serde(default = "default_outlier_sigma")]
    pub outlier_sigma: f64,

    /// Marker radius in pixels
    #[serde(default = "default_point_size")]
    pub point_size: u32,
}

fn default_scatter_width() -> u32 {
    1800
}

fn default_outlier_sigma() -> f64 {
    2.0
}

fn default_point_size() -> u32 {
    6
}

impl Default for ScatterConfig {
    fn default() -> Self {
        Self {
            width: default_scatter_width(),
            height: default_chart_height(),
            outlier_sigma: default_outlier_sigma(),
            point_size: default_point_size(),
        }
    }
}

/// Options shared by both renderers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Draw titles, axis labels, legends and stats boxes.
    ///
    /// Text rendering needs a system font; turning this off draws geometry only.
    #[serde(default = "default_annotate")]
    pub annotate: bool,

    /// Font family used for all chart text
    #[serde(default = "default_font_family")]
    pub font_family: String,
}

fn default_annotate() -> bool {
    true
}

fn default_font_family() -> String {
    "sans-serif".to_string()
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            annotate: default_annotate(),
            font_family: default_font_family(),
        }
    }
}

/// Main pipeline configuration combining all sub-configs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub paths: PathsConfig,

    #[serde(default)]
    pub histogram: HistogramConfig,

    #[serde(default)]
    pub scatter: ScatterConfig,

    #[serde(default)]
    pub render: RenderConfig,
}

impl PipelineConfig {
    /// Load configuration from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let content = std::fs::read_to_string(path)?;
        let config: PipelineConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to a YAML file.
    pub fn to_yaml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
