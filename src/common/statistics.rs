//! Descriptive statistics used by the charts
//!
//! - Fixed-width histogram binning over a closed range
//! - Box plot statistics (quartiles, 1.5 IQR whiskers, outliers)

/// Counts per bin for a fixed-width histogram
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramCounts {
    /// `bins + 1` ascending bin edges
    pub edges: Vec<f64>,
    /// Number of values in each bin
    pub counts: Vec<usize>,
}

impl HistogramCounts {
    /// Sum of all bin counts (values outside the range are not counted)
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    /// Iterates `(left_edge, right_edge, count)` for each bin
    pub fn bins(&self) -> impl Iterator<Item = (f64, f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(edge, &count)| (edge[0], edge[1], count))
    }
}

/// Computes `bins + 1` equally spaced edges spanning `range`
pub fn bin_edges(bins: usize, range: (f64, f64)) -> Vec<f64> {
    let (start, end) = range;
    let width = (end - start) / bins as f64;
    (0..=bins)
        .map(|i| if i == bins { end } else { start + width * i as f64 })
        .collect()
}

/// Bins `values` into `bins` equal-width bins over `range`
///
/// Every bin is half-open `[left, right)` except the last, which also includes
/// the upper edge. Values outside `range` are ignored.
pub fn histogram(values: &[f64], bins: usize, range: (f64, f64)) -> HistogramCounts {
    let edges = bin_edges(bins, range);
    let mut counts = vec![0usize; bins];
    if bins == 0 {
        return HistogramCounts { edges, counts };
    }

    let (start, end) = range;
    let width = (end - start) / bins as f64;

    for &value in values {
        if !(start..=end).contains(&value) {
            continue;
        }

        let mut index = (((value - start) / width).floor() as usize).min(bins - 1);
        // Snap to the edge table in case the division landed one bin off.
        while index + 1 < bins && value >= edges[index + 1] {
            index += 1;
        }
        while index > 0 && value < edges[index] {
            index -= 1;
        }
        counts[index] += 1;
    }

    HistogramCounts { edges, counts }
}

/// Percentile of already sorted data using linear interpolation between ranks
///
/// `fraction` is in `0.0..=1.0`. Returns `None` for empty input.
pub fn percentile(sorted: &[f64], fraction: f64) -> Option<f64> {
    if sorted.is_empty() {
        return None;
    }

    let position = fraction.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let weight = position - lower as f64;
    Some(sorted[lower] + (sorted[upper] - sorted[lower]) * weight)
}

/// Summary of a distribution as drawn by a box plot
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStatistics {
    pub lower_whisker: f64,
    pub first_quartile: f64,
    pub median: f64,
    pub third_quartile: f64,
    pub upper_whisker: f64,
    /// Values beyond 1.5 IQR from the box, ascending
    pub outliers: Vec<f64>,
}

impl BoxStatistics {
    /// Computes box plot statistics; `None` for empty input
    ///
    /// Whiskers reach the most extreme data points that are still within
    /// 1.5 times the interquartile range of the box.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let first_quartile = percentile(&sorted, 0.25)?;
        let median = percentile(&sorted, 0.5)?;
        let third_quartile = percentile(&sorted, 0.75)?;

        let reach = 1.5 * (third_quartile - first_quartile);
        let low_fence = first_quartile - reach;
        let high_fence = third_quartile + reach;

        let lower_whisker = sorted
            .iter()
            .copied()
            .find(|&value| value >= low_fence)
            .unwrap_or(first_quartile);
        let upper_whisker = sorted
            .iter()
            .rev()
            .copied()
            .find(|&value| value <= high_fence)
            .unwrap_or(third_quartile);
        let outliers = sorted
            .iter()
            .copied()
            .filter(|&value| value < low_fence || value > high_fence)
            .collect();

        Some(Self {
            lower_whisker,
            first_quartile,
            median,
            third_quartile,
            upper_whisker,
            outliers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_edges() {
        let edges = bin_edges(4, (0.0, 2.0));
        assert_eq!(edges, vec![0.0, 0.5, 1.0, 1.5, 2.0]);

        let edges = bin_edges(70, (31.0, 100.0));
        assert_eq!(edges.len(), 71);
        assert_eq!(edges[0], 31.0);
        assert_eq!(edges[70], 100.0);
    }

    #[test]
    fn test_histogram_counts() {
        let values = [0.0, 0.4, 0.5, 1.99, 2.0, 2.5, -1.0];
        let result = histogram(&values, 4, (0.0, 2.0));

        // 2.0 falls into the last bin, 2.5 and -1.0 are out of range
        assert_eq!(result.counts, vec![2, 1, 0, 2]);
        assert_eq!(result.total(), 5);

        let bins: Vec<_> = result.bins().collect();
        assert_eq!(bins[0], (0.0, 0.5, 2));
        assert_eq!(bins[3], (1.5, 2.0, 2));
    }

    #[test]
    fn test_histogram_age_range() {
        let ages: Vec<f64> = (25..=105).map(f64::from).collect();
        let result = histogram(&ages, 70, (31.0, 100.0));

        // 31..=100 is 70 distinct whole ages, each in its own bin
        assert_eq!(result.total(), 70);
        assert!(result.counts.iter().all(|&count| count == 1));
    }

    #[test]
    fn test_histogram_zero_bins() {
        let result = histogram(&[1.0, 2.0], 0, (0.0, 2.0));
        assert!(result.counts.is_empty());
        assert_eq!(result.total(), 0);
    }

    #[test]
    fn test_percentile() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(percentile(&sorted, 0.0), Some(1.0));
        assert_eq!(percentile(&sorted, 0.5), Some(2.5));
        assert_eq!(percentile(&sorted, 0.25), Some(1.75));
        assert_eq!(percentile(&sorted, 1.0), Some(4.0));
        assert_eq!(percentile(&[], 0.5), None);
    }

    #[test]
    fn test_box_statistics() {
        let stats = BoxStatistics::from_values(&[5.0, 1.0, 4.0, 2.0, 3.0]).unwrap();
        assert_eq!(stats.first_quartile, 2.0);
        assert_eq!(stats.median, 3.0);
        assert_eq!(stats.third_quartile, 4.0);
        assert_eq!(stats.lower_whisker, 1.0);
        assert_eq!(stats.upper_whisker, 5.0);
        assert!(stats.outliers.is_empty());
    }

    #[test]
    fn test_box_statistics_outliers() {
        let stats = BoxStatistics::from_values(&[1.0, 2.0, 3.0, 4.0, 100.0]).unwrap();
        assert_eq!(stats.upper_whisker, 4.0);
        assert_eq!(stats.outliers, vec![100.0]);
    }

    #[test]
    fn test_box_statistics_single_value_and_empty() {
        let stats = BoxStatistics::from_values(&[42.0]).unwrap();
        assert_eq!(stats.median, 42.0);
        assert_eq!(stats.lower_whisker, 42.0);
        assert_eq!(stats.upper_whisker, 42.0);

        assert_eq!(BoxStatistics::from_values(&[]), None);
    }
}
