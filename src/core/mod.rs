//! Core data types and I/O operations.

pub mod loaders;
pub mod writers;

pub use loaders::{
    load_measurements, parse_line, parse_measurements, LoaderError, Measurement, MeasurementLog,
};
pub use writers::{chart_paths, ensure_output_dir, input_stem, ChartPaths, WriteError};
