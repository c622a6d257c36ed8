//! A histogram with uniform bins over a finite range.
use crate::error::SNNError;

/// Counts of real values falling into `num_bins` uniform bins covering `[min, max)`.
/// Bin `j` covers `[min + j * width, min + (j + 1) * width)`; values outside the range are dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    counts: Vec<u64>,
    min: f64,
    max: f64,
}

impl Histogram {
    /// Create an empty histogram.
    /// Returns an error if there are no bins or if the range is empty.
    pub fn new(num_bins: usize, min: f64, max: f64) -> Result<Self, SNNError> {
        if num_bins == 0 {
            return Err(SNNError::InvalidParameter(
                "A histogram needs at least one bin".to_string(),
            ));
        }
        if !(min < max) || !min.is_finite() || !max.is_finite() {
            return Err(SNNError::InvalidParameter(format!(
                "Invalid histogram range [{}, {})",
                min, max
            )));
        }
        Ok(Histogram {
            counts: vec![0; num_bins],
            min,
            max,
        })
    }

    pub fn num_bins(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        (self.max - self.min) / self.counts.len() as f64
    }

    /// The range `[lower, upper)` of the j-th bin.
    pub fn range(&self, j: usize) -> (f64, f64) {
        let width = self.bin_width();
        (
            self.min + j as f64 * width,
            self.min + (j + 1) as f64 * width,
        )
    }

    /// Count one occurrence of `x`, if it falls into the range.
    pub fn increment(&mut self, x: f64) {
        if !(x >= self.min && x < self.max) {
            return;
        }
        let j = ((x - self.min) / self.bin_width()).floor() as usize;
        // rounding can push values right below max into the next bin
        let j = j.min(self.counts.len() - 1);
        self.counts[j] += 1;
    }

    pub fn get(&self, j: usize) -> u64 {
        self.counts[j]
    }

    pub fn counts(&self) -> &[u64] {
        &self.counts
    }

    /// Total number of counted values.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Add the counts of another histogram with the same bins.
    pub fn merge(mut self, other: &Histogram) -> Self {
        self.counts
            .iter_mut()
            .zip(other.counts.iter())
            .for_each(|(count, &other_count)| *count += other_count);
        self
    }
}
