//! Domain-specific analysis modules
//!
//! This module contains domain-specific analysis logic for:
//! - Cumulative time in space by birthdate
//! - Age distribution of living and deceased astronauts
//! - The console summary

pub mod age_distribution;
pub mod summary;
pub mod time_in_space;

// Re-export analysis functions for convenience
pub use age_distribution::{age_boxplot, age_histogram, generate_age_plots};
pub use summary::generate_dataset_summary;
pub use time_in_space::{generate_time_in_space_plots, time_in_space_chart};
