//! # Astronaut Analysis
//!
//! Descriptive statistics and charts for the astronaut data set.
//!
//! A run loads the data set ([`parsing`]), prepares it into a typed table sorted by
//! birthdate ([`preparation`]), prints a short summary and renders five charts
//! ([`analysis`]):
//!
//! - `male_humans_in_space.png`, `female_humans_in_space.png`, `humans_in_space.png`:
//!   cumulative time in space by birthdate
//! - `combined_histogram.png`: stacked age histogram, dead vs. alive
//! - `boxplot.png`: age box plot, dead vs. alive

pub mod analysis;
pub mod common;
pub mod config;
pub mod parsing;
pub mod preparation;

use analysis::{generate_age_plots, generate_dataset_summary, generate_time_in_space_plots};
use config::AnalysisConfig;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use thiserror::Error;
use tracing::info;

/// Number of charts written by [`perform_analysis`]
pub const CHART_COUNT: u64 = 5;

/// Errors that can occur during analysis
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Parsing error: {0}")]
    Parsing(#[from] parsing::ParsingError),

    #[error("Preparation error: {0}")]
    Preparation(#[from] preparation::PrepareError),

    #[error("Failed to create output directory: {0}")]
    OutputDir(#[source] std::io::Error),

    #[error("Time in space analysis error: {0}")]
    TimeInSpace(#[from] analysis::time_in_space::TimeInSpaceError),

    #[error("Age distribution analysis error: {0}")]
    AgeDistribution(#[from] analysis::age_distribution::AgeDistributionError),
}

type Result<T> = core::result::Result<T, AnalysisError>;

fn chart_progress_bar() -> ProgressBar {
    let progress = ProgressBar::new(CHART_COUNT);
    let style = ProgressStyle::with_template("{spinner} [{bar:30}] {pos}/{len} {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar());
    progress.set_style(style);
    progress
}

/// Glues data preparation and plotting
///
/// Loads and prepares the data set named by `config`, prints the summary to stdout
/// and writes the five charts into the output directory. Stops at the first failure.
pub fn perform_analysis(config: &AnalysisConfig) -> Result<()> {
    info!(
        input = %config.input_file.display(),
        output = %config.output_dir.display(),
        today = %config.today,
        "starting astronaut analysis"
    );

    let raw = parsing::parse_astronauts(&config.input_file)?;
    let table = preparation::prepare(raw, config.today)?;

    println!("{}", generate_dataset_summary(&table));

    fs::create_dir_all(&config.output_dir).map_err(AnalysisError::OutputDir)?;

    let progress = chart_progress_bar();
    generate_time_in_space_plots(&table, &config.output_dir, &progress)?;
    generate_age_plots(&table, &config.output_dir, &progress)?;
    progress.finish_with_message("done");

    info!(charts = CHART_COUNT, "analysis complete");
    Ok(())
}
