//! Command-line interface for the weld chart generator.

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::PathBuf;
use std::time::Instant;

use crate::processors::pipeline::{self, RunReport};
use crate::PipelineConfig;

#[derive(Parser)]
#[command(name = "weld-charts")]
#[command(
    about = "Render histogram and trend charts for weld-seam measurement exports",
    version
)]
pub struct Cli {
    /// Path to YAML config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Increase verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// Create a progress bar for the per-file loop
fn create_progress() -> ProgressBar {
    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    pb
}

/// Print a summary box
fn print_summary(title: &str, items: &[(&str, String)]) {
    println!();
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║ {:<60} ║", title);
    println!("╠══════════════════════════════════════════════════════════════╣");
    for (key, value) in items {
        let display_value = if value.chars().count() > 38 {
            let head: String = value.chars().take(35).collect();
            format!("{}...", head)
        } else {
            value.clone()
        };
        println!("║ {:<20}: {:<38} ║", key, display_value);
    }
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
}

fn summary_items(
    config: &PipelineConfig,
    report: &RunReport,
    start: Instant,
) -> Vec<(&'static str, String)> {
    let outliers: usize = report.rendered().map(|r| r.outlier_count).sum();
    vec![
        ("Input directory", config.paths.input_dir.display().to_string()),
        ("Output directory", config.paths.output_dir.display().to_string()),
        ("Files found", report.files_found.to_string()),
        ("Files rendered", report.rendered_count().to_string()),
        ("Files skipped", report.skipped_count().to_string()),
        ("Outliers flagged", outliers.to_string()),
        ("Duration", format!("{:.2?}", start.elapsed())),
    ]
}

pub fn run() {
    let cli = Cli::parse();

    // Initialize logging based on verbosity (must come first)
    env_logger::Builder::new()
        .filter_level(match cli.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        })
        .format_timestamp_secs()
        .init();

    // Load config
    let config = match &cli.config {
        Some(path) => match PipelineConfig::from_yaml(path) {
            Ok(cfg) => {
                info!("Loaded config from: {}", path.display());
                cfg
            }
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}, using defaults",
                    path.display(),
                    e
                );
                PipelineConfig::default()
            }
        },
        None => PipelineConfig::default(),
    };

    let start = Instant::now();
    let progress = create_progress();

    match pipeline::run_with_progress(&config, &progress) {
        Ok(report) => {
            progress.finish_and_clear();

            if report.files_found == 0 {
                return;
            }

            println!(
                "All charts saved in folder: {}",
                config.paths.output_dir.display()
            );
            print_summary(
                "Weld Charts Complete",
                &summary_items(&config, &report, start),
            );
        }
        Err(e) => {
            progress.finish_and_clear();
            error!("Chart generation failed: {:#}", e);
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_flags() {
        let cli = Cli::try_parse_from(["weld-charts", "-vv", "--config", "charts.yaml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.config, Some(PathBuf::from("charts.yaml")));

        let cli = Cli::try_parse_from(["weld-charts"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_summary_items_empty_report() {
        let config = PipelineConfig::default();
        let items = summary_items(&config, &RunReport::default(), Instant::now());
        assert_eq!(items[0], ("Input directory", "pliki".to_string()));
        assert_eq!(items[2].1, "0");
        assert_eq!(items[5].1, "0");
    }
}
