//! Cumulative time in space analysis
//!
//! This module sums up the time astronauts have spent in space, ordered by their
//! birthdate, and plots the running total for men, women and everyone.

use crate::common::plots::{create_line_plot, ChartLabels};
use crate::common::{AstronautRecord, AstronautTable, PlotError};
use chrono::{Datelike, NaiveDate};
use indicatif::ProgressBar;
use std::path::Path;
use tracing::info;

/// Errors that can occur during time in space analysis
#[derive(Debug)]
pub enum TimeInSpaceError {
    PlotGeneration(PlotError),
}

impl std::fmt::Display for TimeInSpaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeInSpaceError::PlotGeneration(e) => write!(f, "Failed to generate plot: {}", e),
        }
    }
}

impl std::error::Error for TimeInSpaceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TimeInSpaceError::PlotGeneration(e) => Some(e),
        }
    }
}

impl From<PlotError> for TimeInSpaceError {
    fn from(err: PlotError) -> Self {
        TimeInSpaceError::PlotGeneration(err)
    }
}

type Result<T> = core::result::Result<T, TimeInSpaceError>;

/// Which astronauts a cumulative chart covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cohort {
    /// Only astronauts whose `sex_or_gender` matches the label
    SexOrGender(&'static str),
    /// The whole table
    Everyone,
}

/// Definition of one cumulative time in space chart
#[derive(Debug, Clone, Copy)]
pub struct TimeInSpaceChart {
    pub cohort: Cohort,
    pub filename: &'static str,
    pub title: &'static str,
}

/// The cumulative charts produced by every run, in rendering order
pub const TIME_IN_SPACE_CHARTS: [TimeInSpaceChart; 3] = [
    TimeInSpaceChart {
        cohort: Cohort::SexOrGender("male"),
        filename: "male_humans_in_space.png",
        title: "Total time male humans have spend in space",
    },
    TimeInSpaceChart {
        cohort: Cohort::SexOrGender("female"),
        filename: "female_humans_in_space.png",
        title: "Total time female humans have spend in space",
    },
    TimeInSpaceChart {
        cohort: Cohort::Everyone,
        filename: "humans_in_space.png",
        title: "Total time humans have spend in space",
    },
];

const X_LABEL: &str = "Years";
const Y_LABEL: &str = "t in days";

/// Running totals after adding one astronaut
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CumulativePoint {
    pub birthdate: NaiveDate,
    /// Sum of `time_in_space` in minutes up to and including this astronaut
    pub accumulated_minutes: i64,
    /// Sum of the per-astronaut whole days up to and including this astronaut
    pub accumulated_days: i64,
}

/// Computes running totals of time in space in the order the records are given
///
/// Records must already be in birthdate order for the totals to be meaningful,
/// which is how [`AstronautTable`] yields them. Days are accumulated from each
/// astronaut's truncated day count, not by truncating the minute total.
pub fn accumulate_time_in_space<'a, I>(records: I) -> Vec<CumulativePoint>
where
    I: IntoIterator<Item = &'a AstronautRecord>,
{
    let mut accumulated_minutes = 0i64;
    let mut accumulated_days = 0i64;

    records
        .into_iter()
        .map(|record| {
            accumulated_minutes += record.time_in_space.num_minutes();
            accumulated_days += record.time_in_space_days;
            CumulativePoint {
                birthdate: record.birthdate,
                accumulated_minutes,
                accumulated_days,
            }
        })
        .collect()
}

/// Converts a date into a fractional year, e.g. 1970-07-02 is roughly 1970.5
pub fn decimal_year(date: NaiveDate) -> f64 {
    let days_in_year = if NaiveDate::from_ymd_opt(date.year(), 2, 29).is_some() {
        366.0
    } else {
        365.0
    };
    f64::from(date.year()) + f64::from(date.ordinal0()) / days_in_year
}

/// Plots the cumulative time in space of `records` against their birthdates
///
/// # Arguments
/// * `records` - Astronauts in birthdate order
/// * `output_path` - Path where the PNG file should be saved
/// * `title` - Chart title
///
/// # Returns
/// * `Ok(())` - If the chart was written
/// * `Err(PlotError)` - If there are no records or drawing failed
pub fn time_in_space_chart<'a, I>(
    records: I,
    output_path: &Path,
    title: &str,
) -> core::result::Result<(), PlotError>
where
    I: IntoIterator<Item = &'a AstronautRecord>,
{
    let cumulative = accumulate_time_in_space(records);
    let points: Vec<(f64, f64)> = cumulative
        .iter()
        .map(|point| (decimal_year(point.birthdate), point.accumulated_days as f64))
        .collect();

    let labels = ChartLabels {
        title,
        x_label: X_LABEL,
        y_label: Y_LABEL,
    };
    create_line_plot(&points, &labels, output_path)?;

    if let Some(last) = cumulative.last() {
        info!(
            path = %output_path.display(),
            astronauts = cumulative.len(),
            total_days = last.accumulated_days,
            total_minutes = last.accumulated_minutes,
            "wrote cumulative time in space chart"
        );
    }
    Ok(())
}

/// Generate all cumulative time in space charts
///
/// Creates, in `output_dir`:
/// - `male_humans_in_space.png`
/// - `female_humans_in_space.png`
/// - `humans_in_space.png`
///
/// # Arguments
/// * `table` - The prepared astronaut table
/// * `output_dir` - Directory where PNG files should be saved
/// * `progress` - Advanced by one per chart written
pub fn generate_time_in_space_plots(
    table: &AstronautTable,
    output_dir: &Path,
    progress: &ProgressBar,
) -> Result<()> {
    for chart in &TIME_IN_SPACE_CHARTS {
        progress.set_message(chart.filename);

        let records: Vec<&AstronautRecord> = match chart.cohort {
            Cohort::SexOrGender(label) => table.by_sex_or_gender(label),
            Cohort::Everyone => table.iter().collect(),
        };
        time_in_space_chart(records, &output_dir.join(chart.filename), chart.title)?;

        progress.inc(1);
    }

    Ok(())
}
