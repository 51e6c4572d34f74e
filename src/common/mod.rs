//! Common infrastructure modules shared across analysis phases
//!
//! This module provides reusable infrastructure for:
//! - Age buckets and ASCII table formatting
//! - The prepared astronaut table
//! - Histogram and box plot statistics
//! - Drawing line charts, stacked histograms and box plots

pub mod buckets;
pub mod data_structures;
pub mod plots;
pub mod statistics;

// Re-export commonly used items
pub use data_structures::{AstronautRecord, AstronautTable, LivingStatusPartition};
pub use plots::PlotError;
