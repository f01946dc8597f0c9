//! Data processing modules.

pub mod discovery;
pub mod pipeline;
pub mod statistics;

// Re-export key types for convenience
pub use discovery::{find_measurement_files, DiscoveryError};
pub use pipeline::{
    process_file, render_log, run, run_with_progress, FileOutcome, FileReport, RunReport,
    SkipReason,
};
pub use statistics::{histogram, linear_fit, outliers, Histogram, Summary, TrendLine};
