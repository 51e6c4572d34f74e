//! Plotting infrastructure for the astronaut charts
//!
//! This module provides the drawing primitives used by the analysis modules, built on
//! the [`plotters`] crate: a line chart, a stacked histogram and a box plot. Charts are
//! saved as PNG files with fixed 1200x800 resolution.
//!
//! The analysis modules compute the data (cumulative sums, bins, quartiles); functions
//! here only validate it and draw it.

use crate::common::statistics::{BoxStatistics, HistogramCounts};
use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during plot generation
#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Failed to create drawing area: {0}")]
    DrawingArea(String),

    #[error("Failed to configure chart: {0}")]
    ChartConfig(String),

    #[error("Failed to draw chart elements: {0}")]
    Drawing(String),

    #[error("Failed to save plot to {}: {reason}", .path.display())]
    FileSave { path: PathBuf, reason: String },

    #[error("Invalid data: {0}")]
    InvalidData(String),
}

type Result<T> = core::result::Result<T, PlotError>;

/// Output resolution of every chart
pub const CHART_SIZE: (u32, u32) = (1200, 800);

const FONT: &str = "sans-serif";

/// Series colours, in drawing order
const PALETTE: [RGBColor; 3] = [
    RGBColor(226, 74, 51),
    RGBColor(52, 138, 189),
    RGBColor(152, 142, 213),
];

/// Median line colour in box plots
const MEDIAN_COLOR: RGBColor = RGBColor(251, 193, 94);

/// Caption and axis descriptions of a chart
#[derive(Debug, Clone, Copy)]
pub struct ChartLabels<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
}

/// One layer of a stacked histogram
#[derive(Debug, Clone, Copy)]
pub struct HistogramLayer<'a> {
    /// Legend entry
    pub label: &'a str,
    pub counts: &'a HistogramCounts,
}

/// One category of a box plot; `None` statistics leave the slot empty
#[derive(Debug, Clone, Copy)]
pub struct BoxPlotGroup<'a> {
    pub label: &'a str,
    pub statistics: Option<&'a BoxStatistics>,
}

/// Formats an axis tick as a whole number; fractional ticks get no label
///
/// Counts, days and years are integral, so a tick at 0.5 rounded to "0" or "1"
/// would repeat its neighbours.
fn integral_label(value: &f64) -> String {
    let rounded = value.round();
    if (value - rounded).abs() > 1e-6 {
        return String::new();
    }
    // Adding zero turns -0.0 into 0.0
    format!("{:.0}", rounded + 0.0)
}

/// Writes the finished bitmap to its file
fn save_chart(
    drawing_area: &DrawingArea<BitMapBackend<'_>, Shift>,
    output_path: &Path,
) -> Result<()> {
    drawing_area.present().map_err(|e| PlotError::FileSave {
        path: output_path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Returns a range that plotters can draw even when all values coincide
fn padded_range(min: f64, max: f64) -> (f64, f64) {
    if min >= max {
        (min - 1.0, max + 1.0)
    } else {
        (min, max)
    }
}

/// Creates a line chart and saves it as a PNG file
///
/// # Arguments
/// * `data` - `(x, y)` points, drawn in the given order
/// * `labels` - Chart title and axis descriptions
/// * `output_path` - Path where the PNG file should be saved
///
/// # Chart Properties
/// * Resolution: 1200x800 pixels
/// * Y-axis: starts at 0
/// * X-axis: spans the data, labels printed without decimals
///
/// # Returns
/// * `Ok(())` - If the chart was successfully created and saved
/// * `Err(PlotError)` - If the data is empty or drawing failed
pub fn create_line_plot(
    data: &[(f64, f64)],
    labels: &ChartLabels<'_>,
    output_path: &Path,
) -> Result<()> {
    if data.is_empty() {
        return Err(PlotError::InvalidData("Data cannot be empty".to_string()));
    }
    if data.iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(PlotError::InvalidData(
            "Data points must be finite".to_string(),
        ));
    }

    let x_min = data.iter().map(|(x, _)| *x).fold(f64::INFINITY, f64::min);
    let x_max = data.iter().map(|(x, _)| *x).fold(f64::NEG_INFINITY, f64::max);
    let (x_min, x_max) = padded_range(x_min, x_max);

    let y_max = data.iter().map(|(_, y)| *y).fold(0.0, f64::max);
    let y_max = if y_max > 0.0 { y_max * 1.05 } else { 1.0 };

    let drawing_area = BitMapBackend::new(output_path, CHART_SIZE).into_drawing_area();
    drawing_area
        .fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart_context = ChartBuilder::on(&drawing_area)
        .caption(labels.title, (FONT, 40))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart_context
        .configure_mesh()
        .x_desc(labels.x_label)
        .y_desc(labels.y_label)
        .axis_desc_style((FONT, 30))
        .label_style((FONT, 25))
        .x_label_formatter(&integral_label)
        .y_label_formatter(&integral_label)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    chart_context
        .draw_series(LineSeries::new(
            data.iter().copied(),
            PALETTE[1].stroke_width(2),
        ))
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    save_chart(&drawing_area, output_path)
}

/// Creates a stacked histogram and saves it as a PNG file
///
/// The first layer is drawn at the bottom of each bar, later layers on top of it.
/// All layers must share the same bin edges.
///
/// # Arguments
/// * `layers` - Histogram layers, bottom first
/// * `labels` - Chart title and axis descriptions
/// * `output_path` - Path where the PNG file should be saved
///
/// # Returns
/// * `Ok(())` - If the chart was successfully created and saved
/// * `Err(PlotError)` - If the layers are missing or inconsistent, or drawing failed
pub fn create_stacked_histogram_plot(
    layers: &[HistogramLayer<'_>],
    labels: &ChartLabels<'_>,
    output_path: &Path,
) -> Result<()> {
    let Some(first) = layers.first() else {
        return Err(PlotError::InvalidData(
            "At least one histogram layer is required".to_string(),
        ));
    };
    let edges = &first.counts.edges;
    if edges.len() < 2 {
        return Err(PlotError::InvalidData(
            "Histogram needs at least one bin".to_string(),
        ));
    }
    if layers.iter().any(|layer| layer.counts.edges != *edges) {
        return Err(PlotError::InvalidData(
            "Histogram layers must share bin edges".to_string(),
        ));
    }

    let bin_count = edges.len() - 1;
    let stacked_max = (0..bin_count)
        .map(|bin| layers.iter().map(|layer| layer.counts.counts[bin]).sum::<usize>())
        .max()
        .unwrap_or(0);
    let y_max = (stacked_max.max(1) as f64) * 1.1;
    let (x_min, x_max) = (edges[0], edges[bin_count]);

    let drawing_area = BitMapBackend::new(output_path, CHART_SIZE).into_drawing_area();
    drawing_area
        .fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart_context = ChartBuilder::on(&drawing_area)
        .caption(labels.title, (FONT, 40))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart_context
        .configure_mesh()
        .x_desc(labels.x_label)
        .y_desc(labels.y_label)
        .axis_desc_style((FONT, 30))
        .label_style((FONT, 25))
        .x_label_formatter(&integral_label)
        .y_label_formatter(&integral_label)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let mut base = vec![0usize; bin_count];
    for (layer_index, layer) in layers.iter().enumerate() {
        let color = PALETTE[layer_index % PALETTE.len()];

        let bars: Vec<Rectangle<(f64, f64)>> = layer
            .counts
            .bins()
            .enumerate()
            .filter(|(_, (_, _, count))| *count > 0)
            .map(|(bin, (left, right, count))| {
                let bottom = base[bin] as f64;
                let top = bottom + count as f64;
                Rectangle::new([(left, bottom), (right, top)], color.filled())
            })
            .collect();

        for (bin, count) in layer.counts.counts.iter().enumerate() {
            base[bin] += count;
        }

        chart_context
            .draw_series(bars)
            .map_err(|e| PlotError::Drawing(e.to_string()))?
            .label(layer.label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 8), (x + 16, y + 8)], color.filled()));
    }

    chart_context
        .configure_series_labels()
        .label_font((FONT, 25))
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    save_chart(&drawing_area, output_path)
}

/// Creates a vertical box plot with one box per group and saves it as a PNG file
///
/// Groups are placed left to right at x = 1, 2, ... and labelled on the X-axis.
///
/// # Arguments
/// * `groups` - Categories in display order
/// * `labels` - Chart title and axis descriptions
/// * `output_path` - Path where the PNG file should be saved
///
/// # Returns
/// * `Ok(())` - If the chart was successfully created and saved
/// * `Err(PlotError)` - If no group has data, or drawing failed
pub fn create_box_plot(
    groups: &[BoxPlotGroup<'_>],
    labels: &ChartLabels<'_>,
    output_path: &Path,
) -> Result<()> {
    let populated: Vec<(f64, &BoxStatistics)> = groups
        .iter()
        .enumerate()
        .filter_map(|(index, group)| group.statistics.map(|stats| ((index + 1) as f64, stats)))
        .collect();

    if populated.is_empty() {
        return Err(PlotError::InvalidData(
            "Box plot needs at least one group with data".to_string(),
        ));
    }

    let values = populated.iter().flat_map(|(_, stats)| {
        [stats.lower_whisker, stats.upper_whisker]
            .into_iter()
            .chain(stats.outliers.iter().copied())
    });
    let (y_min, y_max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    let (y_min, y_max) = padded_range(y_min, y_max);
    let padding = (y_max - y_min) * 0.05;

    let label_for = |x: &f64| -> String {
        let rounded = x.round();
        if (x - rounded).abs() > 1e-6 || rounded < 1.0 {
            return String::new();
        }
        groups
            .get(rounded as usize - 1)
            .map(|group| group.label.to_string())
            .unwrap_or_default()
    };

    let drawing_area = BitMapBackend::new(output_path, CHART_SIZE).into_drawing_area();
    drawing_area
        .fill(&WHITE)
        .map_err(|e| PlotError::DrawingArea(e.to_string()))?;

    let mut chart_context = ChartBuilder::on(&drawing_area)
        .caption(labels.title, (FONT, 40))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(85)
        .build_cartesian_2d(
            0.5..(groups.len() as f64 + 0.5),
            (y_min - padding)..(y_max + padding),
        )
        .map_err(|e| PlotError::ChartConfig(e.to_string()))?;

    chart_context
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(groups.len() + 1)
        .x_desc(labels.x_label)
        .y_desc(labels.y_label)
        .axis_desc_style((FONT, 30))
        .label_style((FONT, 25))
        .x_label_formatter(&label_for)
        .y_label_formatter(&integral_label)
        .draw()
        .map_err(|e| PlotError::Drawing(e.to_string()))?;

    let box_style = PALETTE[1].stroke_width(2);
    let half_width = 0.25;

    for (x, stats) in &populated {
        let x = *x;

        chart_context
            .draw_series(std::iter::once(Rectangle::new(
                [
                    (x - half_width, stats.first_quartile),
                    (x + half_width, stats.third_quartile),
                ],
                box_style,
            )))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        let cap = half_width / 2.0;
        let whiskers = [
            vec![(x, stats.first_quartile), (x, stats.lower_whisker)],
            vec![(x, stats.third_quartile), (x, stats.upper_whisker)],
            vec![(x - cap, stats.lower_whisker), (x + cap, stats.lower_whisker)],
            vec![(x - cap, stats.upper_whisker), (x + cap, stats.upper_whisker)],
        ];
        chart_context
            .draw_series(
                whiskers
                    .into_iter()
                    .map(|points| PathElement::new(points, box_style)),
            )
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        chart_context
            .draw_series(std::iter::once(PathElement::new(
                vec![(x - half_width, stats.median), (x + half_width, stats.median)],
                MEDIAN_COLOR.stroke_width(3),
            )))
            .map_err(|e| PlotError::Drawing(e.to_string()))?;

        chart_context
            .draw_series(
                stats
                    .outliers
                    .iter()
                    .map(|&value| Circle::new((x, value), 4, BLACK.stroke_width(1))),
            )
            .map_err(|e| PlotError::Drawing(e.to_string()))?;
    }

    save_chart(&drawing_area, output_path)
}
