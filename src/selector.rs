//! Representative frame selection.
//!
//! The representative frame is the one whose histogram lies closest, by sum
//! of squared bin differences, to the bin-wise mean of all candidate
//! histograms. Black frames, title cards, and transition artifacts sit far
//! from that mean and lose.

use crate::histogram::{HISTOGRAM_BINS, Histogram};

/// Bin-wise arithmetic mean of a set of histograms.
#[derive(Debug, Clone, PartialEq)]
pub struct AverageHistogram {
    bins: [f64; HISTOGRAM_BINS],
}

impl AverageHistogram {
    /// Average `histograms` bin by bin.
    ///
    /// Every histogram contributes to every bin; the divisor is the number of
    /// histograms supplied. An empty slice yields an all-zero average.
    pub fn of(histograms: &[Histogram]) -> Self {
        let mut sums = [0u64; HISTOGRAM_BINS];
        for histogram in histograms {
            for (sum, &count) in sums.iter_mut().zip(histogram.bins()) {
                *sum += count as u64;
            }
        }

        let mut bins = [0.0; HISTOGRAM_BINS];
        if !histograms.is_empty() {
            let count = histograms.len() as f64;
            for (mean, &sum) in bins.iter_mut().zip(&sums) {
                *mean = sum as f64 / count;
            }
        }
        Self { bins }
    }

    /// Mean value of every bin.
    pub fn bins(&self) -> &[f64; HISTOGRAM_BINS] {
        &self.bins
    }

    /// Σ (average − observed)² over all bins.
    pub fn sum_squared_error(&self, histogram: &Histogram) -> f64 {
        self.bins
            .iter()
            .zip(histogram.bins())
            .map(|(&mean, &count)| {
                let error = mean - count as f64;
                error * error
            })
            .sum()
    }
}

/// Index of the histogram closest to the average.
///
/// Exact ties resolve to the lowest index.
///
/// # Panics
///
/// Panics if `histograms` is empty. Frame acquisition never reports success
/// without at least one frame, so the pipeline cannot reach this.
pub fn select_representative(histograms: &[Histogram]) -> usize {
    assert!(
        !histograms.is_empty(),
        "select_representative called with no histograms"
    );

    let average = AverageHistogram::of(histograms);
    let mut best_index = 0;
    let mut best_error = f64::INFINITY;

    for (index, histogram) in histograms.iter().enumerate() {
        let error = average.sum_squared_error(histogram);
        log::trace!("Frame {index}: sum-squared error {error:.1}");
        if error < best_error {
            best_index = index;
            best_error = error;
        }
    }

    log::debug!(
        "Selected frame {best_index} of {} (sum-squared error {best_error:.1})",
        histograms.len()
    );
    best_index
}
