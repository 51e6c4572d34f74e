//! Age buckets and their ASCII table rendering for the console summary
//!
//! The bucket ranges themselves live in [`crate::analysis::summary`]; this module only
//! holds the row type and formats it with the [`tabled`] crate.

use tabled::{Table, Tabled};

/// One row of the age summary: how many living and deceased astronauts fall in a range
#[derive(Debug, Clone, PartialEq, Eq, Tabled)]
pub struct AgeBucket {
    /// Human-readable range description (e.g., "40-49", "90+")
    #[tabled(rename = "Age")]
    pub range: String,
    /// Living astronauts whose current age is in range
    #[tabled(rename = "Alive")]
    pub alive: usize,
    /// Deceased astronauts whose age at death is in range
    #[tabled(rename = "Dead")]
    pub dead: usize,
    /// Share of all astronauts in this bucket
    #[tabled(rename = "Share")]
    pub share: String,
}

impl AgeBucket {
    /// Creates a bucket row; `total` is the number of astronauts across all buckets
    pub fn new(range: &str, alive: usize, dead: usize, total: usize) -> Self {
        let share = if total == 0 {
            "0.00%".to_string()
        } else {
            format!("{:.2}%", ((alive + dead) as f64 / total as f64) * 100.0)
        };

        Self {
            range: range.to_string(),
            alive,
            dead,
            share,
        }
    }
}

/// Formats age buckets as an ASCII table, optionally underlined with a title
pub fn format_bucket_table(buckets: &[AgeBucket], title: Option<&str>) -> String {
    if buckets.is_empty() {
        return "No astronauts to summarise".to_string();
    }

    let table = Table::new(buckets).to_string();
    match title {
        Some(title) => format!("{}\n{}\n{}", title, "=".repeat(title.len()), table),
        None => table,
    }
}
