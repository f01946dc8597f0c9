//! Chart rendering for weld measurement logs.
//!
//! Two PNG charts are produced per input file using the plotters library:
//! a distribution histogram with a mean marker, and an index-ordered scatter
//! plot with the least-squares trend line and a mean reference line.

use std::collections::HashSet;
use std::ops::Range;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters_bitmap::BitMapBackend;
use thiserror::Error;

use crate::config::{HistogramConfig, RenderConfig, ScatterConfig};
use crate::processors::statistics::{Histogram, Summary, TrendLine};

/// Errors that can occur during visualization.
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("Plotting error: {0}")]
    PlottingError(String),

    #[error("Nothing to plot")]
    EmptyData,
}

/// Result type for visualization operations.
pub type Result<T> = std::result::Result<T, VisualizationError>;

const STEEL_BLUE: RGBColor = RGBColor(70, 130, 180);
const WHEAT: RGBColor = RGBColor(245, 222, 179);
const LIGHT_BLUE: RGBColor = RGBColor(173, 216, 230);
const MEAN_GREEN: RGBColor = RGBColor(0, 128, 0);
const OUTLIER_RED: RGBColor = RGBColor(220, 20, 60);

const X_DESC_DIMENSION: &str = "Weld dimension [mm]";
const Y_DESC_COUNT: &str = "Number of measurements";
const X_DESC_INDEX: &str = "Measurement number";

/// Corner of the plotting area where a stats box is anchored.
#[derive(Debug, Clone, Copy)]
enum Corner {
    TopLeft,
    TopRight,
}

/// Title of the distribution chart for an input stem.
pub fn histogram_title(stem: &str) -> String {
    format!("Weld dimension distribution - {}", stem)
}

/// Title of the trend chart for an input stem.
pub fn scatter_title(stem: &str) -> String {
    format!("Weld dimension by measurement number - {}", stem)
}

/// Inputs for the scatter chart.
#[derive(Debug, Clone, Copy)]
pub struct ScatterData<'a> {
    /// (index, value) pairs in file order
    pub points: &'a [(f64, f64)],
    pub summary: &'a Summary,
    /// Fitted trend; `None` when the fit is undefined
    pub trend: Option<TrendLine>,
    /// Positions in `points` to highlight
    pub outliers: &'a [usize],
    /// Threshold the outliers were selected with, for the legend
    pub outlier_sigma: f64,
}

/// Plot the distribution histogram and save as PNG.
///
/// # Arguments
///
/// * `output_path` - Path to save the PNG image
/// * `histogram` - Binned values
/// * `summary` - Statistics shown in the text box and as the mean marker
/// * `title` - Chart caption
/// * `config` - Image size
/// * `render` - Text options
pub fn plot_histogram(
    output_path: &Path,
    histogram: &Histogram,
    summary: &Summary,
    title: &str,
    config: &HistogramConfig,
    render: &RenderConfig,
) -> Result<()> {
    if histogram.num_bins() == 0 || summary.count == 0 {
        return Err(VisualizationError::EmptyData);
    }

    let x_min = histogram.edges[0];
    let x_max = histogram.edges[histogram.edges.len() - 1];
    let x_padding = (x_max - x_min) * 0.05;
    let y_max = (histogram.max_count() as f64 * 1.15).max(1.0);
    let font = render.font_family.as_str();

    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();

    root.fill(&WHITE).map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if render.annotate {
        builder
            .caption(title, (font, 30).into_font().style(FontStyle::Bold))
            .x_label_area_size(60)
            .y_label_area_size(80);
    }
    let mut chart = builder
        .build_cartesian_2d((x_min - x_padding)..(x_max + x_padding), 0.0..y_max)
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    if render.annotate {
        chart
            .configure_mesh()
            .light_line_style(&BLACK.mix(0.05))
            .bold_line_style(&BLACK.mix(0.15))
            .x_desc(X_DESC_DIMENSION)
            .y_desc(Y_DESC_COUNT)
            .axis_desc_style((font, 22))
            .label_style((font, 16))
            .x_label_formatter(&|v| format!("{:.2}", v))
            .y_label_formatter(&|v| format!("{:.0}", v))
            .draw()
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    // Bars, then their outlines on top
    chart
        .draw_series(histogram.bins().map(|(left, right, count)| {
            Rectangle::new([(left, 0.0), (right, count as f64)], STEEL_BLUE.mix(0.7).filled())
        }))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .draw_series(histogram.bins().map(|(left, right, count)| {
            Rectangle::new([(left, 0.0), (right, count as f64)], BLACK.stroke_width(1))
        }))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    chart
        .draw_series(DashedLineSeries::new(
            vec![(summary.mean, 0.0), (summary.mean, y_max)],
            14,
            8,
            RED.stroke_width(3),
        ))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?
        .label(format!("Mean: {:.3} mm", summary.mean))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], RED.stroke_width(3)));

    if render.annotate {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK.mix(0.3))
            .label_font((font, 18))
            .position(SeriesLabelPosition::UpperLeft)
            .draw()
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

        let lines = vec![
            format!("n = {}", summary.count),
            format!("μ = {:.3} mm", summary.mean),
            format!("σ = {:.3} mm", summary.std_dev),
            format!("min = {:.3} mm", summary.min),
            format!("max = {:.3} mm", summary.max),
        ];
        draw_stats_box(
            &root,
            chart.plotting_area().get_pixel_range(),
            Corner::TopRight,
            &lines,
            WHEAT,
            font,
        )?;
    }

    root.present().map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}

/// Plot measurements against their index with the fitted trend and save as PNG.
///
/// Outliers are drawn in red on top of the regular points. The trend line is
/// omitted when `data.trend` is `None`.
pub fn plot_scatter(
    output_path: &Path,
    data: &ScatterData<'_>,
    title: &str,
    config: &ScatterConfig,
    render: &RenderConfig,
) -> Result<()> {
    if data.points.is_empty() {
        return Err(VisualizationError::EmptyData);
    }

    let summary = data.summary;
    let (x_min, x_max, y_min, y_max) = compute_bounds(data);
    let x_padding = (x_max - x_min) * 0.05;
    let y_padding = (y_max - y_min) * 0.1;
    let x_range = (x_min - x_padding)..(x_max + x_padding);
    let font = render.font_family.as_str();

    let root = BitMapBackend::new(output_path, (config.width, config.height)).into_drawing_area();

    root.fill(&WHITE).map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    let mut builder = ChartBuilder::on(&root);
    builder.margin(20);
    if render.annotate {
        builder
            .caption(title, (font, 30).into_font().style(FontStyle::Bold))
            .x_label_area_size(60)
            .y_label_area_size(80);
    }
    let mut chart = builder
        .build_cartesian_2d(x_range.clone(), (y_min - y_padding)..(y_max + y_padding))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    if render.annotate {
        chart
            .configure_mesh()
            .light_line_style(&BLACK.mix(0.05))
            .bold_line_style(&BLACK.mix(0.15))
            .x_desc(X_DESC_INDEX)
            .y_desc(X_DESC_DIMENSION)
            .axis_desc_style((font, 22))
            .label_style((font, 16))
            .x_label_formatter(&|v| format!("{:.0}", v))
            .y_label_formatter(&|v| format!("{:.2}", v))
            .draw()
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    let outliers: HashSet<usize> = data.outliers.iter().copied().collect();
    let radius = config.point_size;

    chart
        .draw_series(
            data.points
                .iter()
                .enumerate()
                .filter(|(i, _)| !outliers.contains(i))
                .map(|(_, &(x, y))| Circle::new((x, y), radius, STEEL_BLUE.mix(0.6).filled())),
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?
        .label("Measurements")
        .legend(|(x, y)| Circle::new((x + 12, y), 5, STEEL_BLUE.mix(0.6).filled()));

    if !outliers.is_empty() {
        chart
            .draw_series(
                data.outliers
                    .iter()
                    .filter_map(|&i| data.points.get(i))
                    .map(|&(x, y)| Circle::new((x, y), radius + 2, OUTLIER_RED.mix(0.8).filled())),
            )
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?
            .label(format!("Outliers (> {}σ)", data.outlier_sigma))
            .legend(|(x, y)| Circle::new((x + 12, y), 6, OUTLIER_RED.mix(0.8).filled()));
    }

    // Black edge around every marker
    chart
        .draw_series(
            data.points
                .iter()
                .map(|&(x, y)| Circle::new((x, y), radius, BLACK.mix(0.8).stroke_width(1))),
        )
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    if let Some(trend) = data.trend {
        chart
            .draw_series(DashedLineSeries::new(
                vec![(x_min, trend.at(x_min)), (x_max, trend.at(x_max))],
                14,
                8,
                RED.stroke_width(3),
            ))
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?
            .label(format!(
                "Trend: y = {:.4}x + {:.3}",
                trend.slope, trend.intercept
            ))
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], RED.stroke_width(3)));
    }

    chart
        .draw_series(DashedLineSeries::new(
            vec![(x_range.start, summary.mean), (x_range.end, summary.mean)],
            3,
            6,
            MEAN_GREEN.stroke_width(3),
        ))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?
        .label(format!("Mean: {:.3} mm", summary.mean))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 24, y)], MEAN_GREEN.stroke_width(3)));

    if render.annotate {
        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK.mix(0.3))
            .label_font((font, 18))
            .position(SeriesLabelPosition::UpperRight)
            .draw()
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

        let lines = vec![
            format!("n = {}", summary.count),
            format!("μ = {:.3} mm", summary.mean),
            format!("σ = {:.3} mm", summary.std_dev),
            format!("range = {:.3} - {:.3} mm", summary.min, summary.max),
        ];
        draw_stats_box(
            &root,
            chart.plotting_area().get_pixel_range(),
            Corner::TopLeft,
            &lines,
            LIGHT_BLUE,
            font,
        )?;
    }

    root.present().map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    Ok(())
}

/// Draw a translucent box of text lines inside a corner of the plotting area.
fn draw_stats_box(
    root: &DrawingArea<BitMapBackend<'_>, Shift>,
    (x_px, y_px): (Range<i32>, Range<i32>),
    corner: Corner,
    lines: &[String],
    background: RGBColor,
    font: &str,
) -> Result<()> {
    const INSET: i32 = 12;
    const PADDING: i32 = 10;
    const LINE_GAP: i32 = 6;

    let style = (font, 18).into_font().color(&BLACK);

    let mut width = 0i32;
    let mut line_height = 0i32;
    for line in lines {
        let (w, h) = root
            .estimate_text_size(line, &style)
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
        width = width.max(w as i32);
        line_height = line_height.max(h as i32);
    }

    let box_width = width + 2 * PADDING;
    let box_height = lines.len() as i32 * (line_height + LINE_GAP) - LINE_GAP + 2 * PADDING;
    let left = match corner {
        Corner::TopLeft => x_px.start + INSET,
        Corner::TopRight => x_px.end - INSET - box_width,
    };
    let top = y_px.start + INSET;

    let upper_left = (left, top);
    let lower_right = (left + box_width, top + box_height);

    root.draw(&Rectangle::new([upper_left, lower_right], background.mix(0.5).filled()))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    root.draw(&Rectangle::new([upper_left, lower_right], BLACK.mix(0.4).stroke_width(1)))
        .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;

    for (i, line) in lines.iter().enumerate() {
        let y = top + PADDING + i as i32 * (line_height + LINE_GAP);
        root.draw(&Text::new(line.as_str(), (left + PADDING, y), style.clone()))
            .map_err(|e| VisualizationError::PlottingError(e.to_string()))?;
    }

    Ok(())
}

/// Compute the data bounds (min/max) for index and value axes.
///
/// The trend line endpoints are included so the line never leaves the frame.
fn compute_bounds(data: &ScatterData<'_>) -> (f64, f64, f64, f64) {
    let mut x_min = f64::MAX;
    let mut x_max = f64::MIN;
    let mut y_min = f64::MAX;
    let mut y_max = f64::MIN;

    for &(x, y) in data.points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if let Some(trend) = data.trend {
        for y in [trend.at(x_min), trend.at(x_max)] {
            y_min = y_min.min(y);
            y_max = y_max.max(y);
        }
    }

    if (x_max - x_min).abs() < f64::EPSILON {
        x_min -= 1.0;
        x_max += 1.0;
    }
    if (y_max - y_min).abs() < f64::EPSILON {
        y_min -= 0.5;
        y_max += 0.5;
    }

    (x_min, x_max, y_min, y_max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::processors::statistics::{histogram, linear_fit, outliers};
    use tempfile::tempdir;

    fn geometry_only() -> RenderConfig {
        RenderConfig {
            annotate: false,
            ..RenderConfig::default()
        }
    }

    fn small_histogram_config() -> HistogramConfig {
        HistogramConfig {
            width: 320,
            height: 200,
            ..HistogramConfig::default()
        }
    }

    fn small_scatter_config() -> ScatterConfig {
        ScatterConfig {
            width: 320,
            height: 200,
            ..ScatterConfig::default()
        }
    }

    #[test]
    fn test_titles() {
        assert_eq!(
            histogram_title("augenmass-0001-measurements"),
            "Weld dimension distribution - augenmass-0001-measurements"
        );
        assert!(scatter_title("x").ends_with("- x"));
    }

    #[test]
    fn test_compute_bounds_includes_trend() {
        let points = [(1.0, 2.0), (2.0, 2.0)];
        let summary = Summary::from_values(&[2.0, 2.0]).unwrap();
        let data = ScatterData {
            points: &points,
            summary: &summary,
            trend: Some(TrendLine {
                slope: 1.0,
                intercept: 0.0,
            }),
            outliers: &[],
            outlier_sigma: 2.0,
        };

        let (x_min, x_max, y_min, y_max) = compute_bounds(&data);
        assert_eq!((x_min, x_max), (1.0, 2.0));
        assert_eq!((y_min, y_max), (1.0, 2.0));
    }

    #[test]
    fn test_compute_bounds_single_point() {
        let points = [(3.0, 4.0)];
        let summary = Summary::from_values(&[4.0]).unwrap();
        let data = ScatterData {
            points: &points,
            summary: &summary,
            trend: None,
            outliers: &[],
            outlier_sigma: 2.0,
        };

        assert_eq!(compute_bounds(&data), (2.0, 4.0, 3.5, 4.5));
    }

    #[test]
    fn test_plot_histogram_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("hist.png");
        let values = [5.0, 5.2, 5.1, 4.9, 5.3, 5.0];
        let hist = histogram(&values, 15).unwrap();
        let summary = Summary::from_values(&values).unwrap();

        plot_histogram(
            &path,
            &hist,
            &summary,
            "test",
            &small_histogram_config(),
            &geometry_only(),
        )
        .unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_plot_scatter_writes_png() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("scatter.png");
        let points = [(1.0, 5.0), (2.0, 5.1), (3.0, 5.05), (4.0, 5.2), (5.0, 9.0)];
        let values: Vec<f64> = points.iter().map(|p| p.1).collect();
        let summary = Summary::from_values(&values).unwrap();
        let flagged = outliers(&values, &summary, 1.5);
        let data = ScatterData {
            points: &points,
            summary: &summary,
            trend: linear_fit(&points),
            outliers: &flagged,
            outlier_sigma: 1.5,
        };

        plot_scatter(&path, &data, "test", &small_scatter_config(), &geometry_only()).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_plot_scatter_empty() {
        let dir = tempdir().unwrap();
        let summary = Summary::from_values(&[1.0]).unwrap();
        let data = ScatterData {
            points: &[],
            summary: &summary,
            trend: None,
            outliers: &[],
            outlier_sigma: 2.0,
        };

        let result = plot_scatter(
            &dir.path().join("empty.png"),
            &data,
            "empty",
            &small_scatter_config(),
            &geometry_only(),
        );
        assert!(matches!(result, Err(VisualizationError::EmptyData)));
    }
}
