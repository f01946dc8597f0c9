//! Weld-seam measurement chart generator.
//!
//! This crate provides tools for:
//! - Discovering `augenmass-*-measurements.csv` exports in an input folder
//! - Parsing `Pomiar N: V mm` lines (and the legacy `Pomiar,N,V` layout)
//! - Computing summary statistics, histogram bins and a least-squares trend
//! - Rendering a distribution histogram and a trend scatter plot per file
//!
//! # Example
//!
//! ```no_run
//! use weld_charts::{processors::pipeline, PipelineConfig};
//!
//! let report = pipeline::run(&PipelineConfig::default()).unwrap();
//! println!("rendered {} files", report.rendered_count());
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod processors;
pub mod visualization;

pub use config::{HistogramConfig, PathsConfig, PipelineConfig, RenderConfig, ScatterConfig};
pub use core::loaders::{Measurement, MeasurementLog};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
