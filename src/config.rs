//! Run configuration and command line arguments

use argh::FromArgs;
use chrono::{Local, NaiveDate};
use std::path::PathBuf;
use thiserror::Error;

/// Dataset location used when no `--input` is given, relative to the working directory
pub const DEFAULT_INPUT_FILE: &str = "data/astronauts.json";

/// Errors that can occur while building the configuration
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid reference date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// Analyse the astronaut data set and render its charts
#[derive(FromArgs, Debug, Default)]
pub struct Args {
    /// astronaut data set, plain or zstd compressed JSON (default: data/astronauts.json)
    #[argh(option, short = 'i')]
    pub input: Option<PathBuf>,

    /// directory the charts are written to (default: current directory)
    #[argh(option, short = 'o')]
    pub output_dir: Option<PathBuf>,

    /// reference date for current ages, YYYY-MM-DD (default: today)
    #[argh(option, short = 't')]
    pub today: Option<String>,
}

/// Configuration for an analysis run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisConfig {
    /// Input data set
    pub input_file: PathBuf,
    /// Directory receiving the PNG charts; created if missing
    pub output_dir: PathBuf,
    /// Date the `age` column is computed against
    pub today: NaiveDate,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            input_file: PathBuf::from(DEFAULT_INPUT_FILE),
            output_dir: PathBuf::from("."),
            today: Local::now().date_naive(),
        }
    }
}

impl TryFrom<Args> for AnalysisConfig {
    type Error = ConfigError;

    fn try_from(args: Args) -> Result<Self, Self::Error> {
        let defaults = AnalysisConfig::default();
        let today = match args.today {
            Some(text) => parse_reference_date(&text)?,
            None => defaults.today,
        };

        Ok(Self {
            input_file: args.input.unwrap_or(defaults.input_file),
            output_dir: args.output_dir.unwrap_or(defaults.output_dir),
            today,
        })
    }
}

/// Parses a `YYYY-MM-DD` reference date
pub fn parse_reference_date(text: &str) -> Result<NaiveDate, ConfigError> {
    NaiveDate::parse_from_str(text.trim(), "%Y-%m-%d")
        .map_err(|_| ConfigError::InvalidDate(text.to_string()))
}
