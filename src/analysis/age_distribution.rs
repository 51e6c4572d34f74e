//! Age distribution analysis of living and deceased astronauts
//!
//! Compares the current age of living astronauts with the age at death of deceased
//! ones, as a stacked histogram and as a box plot.

use crate::common::plots::{
    create_box_plot, create_stacked_histogram_plot, BoxPlotGroup, ChartLabels, HistogramLayer,
};
use crate::common::statistics::{histogram, BoxStatistics, HistogramCounts};
use crate::common::{AstronautTable, PlotError};
use indicatif::ProgressBar;
use std::path::Path;
use tracing::info;

/// Errors that can occur during age distribution analysis
#[derive(Debug)]
pub enum AgeDistributionError {
    PlotGeneration(PlotError),
}

impl std::fmt::Display for AgeDistributionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AgeDistributionError::PlotGeneration(e) => write!(f, "Failed to generate plot: {}", e),
        }
    }
}

impl std::error::Error for AgeDistributionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AgeDistributionError::PlotGeneration(e) => Some(e),
        }
    }
}

impl From<PlotError> for AgeDistributionError {
    fn from(err: PlotError) -> Self {
        AgeDistributionError::PlotGeneration(err)
    }
}

type Result<T> = core::result::Result<T, AgeDistributionError>;

/// Number of histogram bins
pub const HISTOGRAM_BINS: usize = 70;

/// Inclusive age range covered by the histogram
pub const HISTOGRAM_RANGE: (f64, f64) = (31.0, 100.0);

pub const HISTOGRAM_FILENAME: &str = "combined_histogram.png";
pub const BOXPLOT_FILENAME: &str = "boxplot.png";

const DEAD_LABEL: &str = "Dead";
const ALIVE_LABEL: &str = "Alive";

/// Histogram counts of both groups over the same bins
#[derive(Debug, Clone, PartialEq)]
pub struct AgeHistogram {
    /// Ages at death, the bottom layer
    pub dead: HistogramCounts,
    /// Current ages of the living, stacked on top
    pub alive: HistogramCounts,
}

/// Bins both age lists into [`HISTOGRAM_BINS`] bins over [`HISTOGRAM_RANGE`]
pub fn age_histogram_counts(alive_ages: &[i32], death_ages: &[i32]) -> AgeHistogram {
    AgeHistogram {
        dead: histogram(&to_f64(death_ages), HISTOGRAM_BINS, HISTOGRAM_RANGE),
        alive: histogram(&to_f64(alive_ages), HISTOGRAM_BINS, HISTOGRAM_RANGE),
    }
}

fn to_f64(ages: &[i32]) -> Vec<f64> {
    ages.iter().copied().map(f64::from).collect()
}

/// Draws the stacked "Dead vs. Alive" age histogram
///
/// Fails with [`PlotError::InvalidData`] when both age lists are empty.
///
/// # Arguments
/// * `alive_ages` - Current ages of living astronauts
/// * `death_ages` - Ages at death of deceased astronauts
/// * `output_path` - Path where the PNG file should be saved
pub fn age_histogram(
    alive_ages: &[i32],
    death_ages: &[i32],
    output_path: &Path,
) -> core::result::Result<(), PlotError> {
    if alive_ages.is_empty() && death_ages.is_empty() {
        return Err(PlotError::InvalidData(
            "Age histogram needs at least one age".to_string(),
        ));
    }

    let counts = age_histogram_counts(alive_ages, death_ages);
    let layers = [
        HistogramLayer {
            label: DEAD_LABEL,
            counts: &counts.dead,
        },
        HistogramLayer {
            label: ALIVE_LABEL,
            counts: &counts.alive,
        },
    ];
    let labels = ChartLabels {
        title: "Dead vs. Alive astronauts",
        x_label: "Age",
        y_label: "Number of astronauts",
    };

    create_stacked_histogram_plot(&layers, &labels, output_path)?;

    info!(
        path = %output_path.display(),
        dead = counts.dead.total(),
        alive = counts.alive.total(),
        "wrote age histogram"
    );
    Ok(())
}

/// Draws the "Dead" / "Alive" age box plot
///
/// A group without any ages is left empty; both groups empty is an error.
///
/// # Arguments
/// * `alive_ages` - Current ages of living astronauts
/// * `death_ages` - Ages at death of deceased astronauts
/// * `output_path` - Path where the PNG file should be saved
pub fn age_boxplot(
    alive_ages: &[i32],
    death_ages: &[i32],
    output_path: &Path,
) -> core::result::Result<(), PlotError> {
    let dead = BoxStatistics::from_values(&to_f64(death_ages));
    let alive = BoxStatistics::from_values(&to_f64(alive_ages));

    let groups = [
        BoxPlotGroup {
            label: DEAD_LABEL,
            statistics: dead.as_ref(),
        },
        BoxPlotGroup {
            label: ALIVE_LABEL,
            statistics: alive.as_ref(),
        },
    ];
    let labels = ChartLabels {
        title: "Age distribution; Dead vs. Alive astronauts",
        x_label: "Category",
        y_label: "Age",
    };

    create_box_plot(&groups, &labels, output_path)?;

    info!(
        path = %output_path.display(),
        dead_median = ?dead.as_ref().map(|stats| stats.median),
        alive_median = ?alive.as_ref().map(|stats| stats.median),
        "wrote age box plot"
    );
    Ok(())
}

/// Generate the age histogram and box plot
///
/// Creates `combined_histogram.png` and `boxplot.png` in `output_dir`.
///
/// # Arguments
/// * `table` - The prepared astronaut table
/// * `output_dir` - Directory where PNG files should be saved
/// * `progress` - Advanced by one per chart written
pub fn generate_age_plots(
    table: &AstronautTable,
    output_dir: &Path,
    progress: &ProgressBar,
) -> Result<()> {
    let partition = table.partition_by_living_status();

    progress.set_message(HISTOGRAM_FILENAME);
    age_histogram(
        &partition.alive_ages,
        &partition.death_ages,
        &output_dir.join(HISTOGRAM_FILENAME),
    )?;
    progress.inc(1);

    progress.set_message(BOXPLOT_FILENAME);
    age_boxplot(
        &partition.alive_ages,
        &partition.death_ages,
        &output_dir.join(BOXPLOT_FILENAME),
    )?;
    progress.inc(1);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_age_histogram_counts() {
        let counts = age_histogram_counts(&[45, 45, 100, 101], &[30, 31, 82]);

        assert_eq!(counts.dead.counts.len(), HISTOGRAM_BINS);
        assert_eq!(counts.dead.edges.first(), Some(&31.0));
        assert_eq!(counts.dead.edges.last(), Some(&100.0));

        // 30 and 101 fall outside 31..=100
        assert_eq!(counts.dead.total(), 2);
        assert_eq!(counts.alive.total(), 3);
        assert_eq!(counts.dead.counts[0], 1);
        assert_eq!(counts.alive.counts[HISTOGRAM_BINS - 1], 1);
        assert_eq!(counts.dead.edges, counts.alive.edges);
    }

    #[test]
    fn test_age_charts_require_data() {
        let temp_dir = TempDir::new().unwrap();
        let result = age_boxplot(&[], &[], &temp_dir.path().join(BOXPLOT_FILENAME));
        assert!(matches!(result, Err(PlotError::InvalidData(_))));

        let result = age_histogram(&[], &[], &temp_dir.path().join(HISTOGRAM_FILENAME));
        assert!(matches!(result, Err(PlotError::InvalidData(_))));
        assert!(!temp_dir.path().join(HISTOGRAM_FILENAME).exists());
    }

    #[test]
    #[ignore = "Font rendering not available in test environment"]
    fn test_age_charts_written() {
        let temp_dir = TempDir::new().unwrap();
        let alive = [45, 52, 61, 61, 70, 88];
        let dead = [34, 58, 82, 90];

        age_histogram(&alive, &dead, &temp_dir.path().join(HISTOGRAM_FILENAME)).unwrap();
        age_boxplot(&alive, &[], &temp_dir.path().join(BOXPLOT_FILENAME)).unwrap();

        assert!(temp_dir.path().join(HISTOGRAM_FILENAME).exists());
        assert!(temp_dir.path().join(BOXPLOT_FILENAME).exists());
    }
}
