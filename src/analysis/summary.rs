//! Console summary of the prepared astronaut table
//!
//! Headline counts plus an age bucket table comparing living and deceased astronauts.

use crate::common::buckets::{format_bucket_table, AgeBucket};
use crate::common::AstronautTable;

/// Age buckets as `(min, max, label)`, both bounds inclusive
const AGE_RANGES: [(i32, i32, &str); 7] = [
    (i32::MIN, 39, "<40"),
    (40, 49, "40-49"),
    (50, 59, "50-59"),
    (60, 69, "60-69"),
    (70, 79, "70-79"),
    (80, 89, "80-89"),
    (90, i32::MAX, "90+"),
];

/// Buckets current ages of the living and ages at death of the dead
pub fn create_age_buckets(alive_ages: &[i32], death_ages: &[i32]) -> Vec<AgeBucket> {
    let total = alive_ages.len() + death_ages.len();
    let count_in = |ages: &[i32], min: i32, max: i32| {
        ages.iter().filter(|&&age| (min..=max).contains(&age)).count()
    };

    AGE_RANGES
        .iter()
        .map(|&(min, max, label)| {
            AgeBucket::new(
                label,
                count_in(alive_ages, min, max),
                count_in(death_ages, min, max),
                total,
            )
        })
        .collect()
}

/// Renders the headline counts and age table of `table`
pub fn generate_dataset_summary(table: &AstronautTable) -> String {
    let partition = table.partition_by_living_status();
    let total_days: i64 = table.iter().map(|record| record.time_in_space_days).sum();

    let headline = format!(
        "Summary\n{}\n\
         Astronauts: {}\n\
         └─ alive: {}\n\
         └─ dead: {}\n\
         Male: {}\n\
         Female: {}\n\
         Total time in space: {} days",
        "=".repeat(7),
        table.len(),
        partition.alive_ages.len(),
        partition.death_ages.len(),
        table.by_sex_or_gender("male").len(),
        table.by_sex_or_gender("female").len(),
        total_days
    );

    let buckets = if partition.is_empty() {
        Vec::new()
    } else {
        create_age_buckets(&partition.alive_ages, &partition.death_ages)
    };
    let age_table = format_bucket_table(&buckets, Some("Ages (current or at death)"));

    format!("{}\n\n{}", headline, age_table)
}
