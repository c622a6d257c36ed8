//! Autocorrelation estimators for spike trains.
//!
//! The pairs of spikes are counted with a sliding window over the (sorted) trains:
//! for every reference spike at time `t`, the spikes in `[t - max_lag, t + max_lag)` are located by two
//! monotone cursors, which keeps the cost proportional to the number of pairs within the window.
//! The counts are then corrected for the truncation at the recording boundaries and the baseline of
//! uncorrelated activity is subtracted, so that a Poisson source yields a flat zero autocorrelation.
use itertools::Itertools;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::histogram::Histogram;
use crate::error::SNNError;

/// The lag window and the neuron sample of an estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutocorrelationSettings {
    /// Maximal lag (in ms); the histogram covers `[-max_lag, max_lag)`.
    pub max_lag: f64,
    pub num_bins: usize,
    /// Maximal number of neurons used, taken from the first indices.
    pub num_neurons_sample: usize,
}

impl AutocorrelationSettings {
    /// Settings of the spike-time autocorrelation averaged over neurons.
    pub fn average() -> Self {
        AutocorrelationSettings {
            max_lag: 50.0,
            num_bins: 201,
            num_neurons_sample: 1000,
        }
    }

    /// Settings of the population rate autocorrelation.
    pub fn population() -> Self {
        AutocorrelationSettings {
            max_lag: 100.0,
            num_bins: 201,
            num_neurons_sample: 100,
        }
    }

    fn histogram(&self) -> Result<Histogram, SNNError> {
        Histogram::new(self.num_bins, -self.max_lag, self.max_lag)
    }
}

/// One bin of a corrected autocorrelation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AutocorrelationBin {
    pub lower: f64,
    pub upper: f64,
    pub value: f64,
}

/// Count the differences `t - s` for all pairs of spikes of a sorted train with `|t - s| < max_lag`
/// (zero lag included).
pub fn accumulate(histogram: &mut Histogram, spike_train: &[f64], max_lag: f64) {
    let (mut l, mut r) = (0, 0);
    for &t in spike_train.iter() {
        while l < spike_train.len() && spike_train[l] < t - max_lag {
            l += 1;
        }
        while r < spike_train.len() && spike_train[r] < t + max_lag {
            r += 1;
        }
        for &s in spike_train[l..r].iter() {
            histogram.increment(t - s);
        }
    }
}

/// Spike-time autocorrelation of the individual spike trains, averaged over the trains.
///
/// `duration` is the length of the recording (in ms). At most `settings.num_neurons_sample` trains are used.
pub fn average_autocorrelation(
    spike_trains: &[&[f64]],
    duration: f64,
    settings: &AutocorrelationSettings,
) -> Result<Vec<AutocorrelationBin>, SNNError> {
    let empty = settings.histogram()?;
    let spike_trains = &spike_trains[..spike_trains.len().min(settings.num_neurons_sample)];

    let histogram = spike_trains
        .par_iter()
        .map(|spike_train| {
            let mut histogram = empty.clone();
            accumulate(&mut histogram, spike_train, settings.max_lag);
            histogram
        })
        .reduce(|| empty.clone(), |h1, h2| h1.merge(&h2));

    let num_spikes: usize = spike_trains.iter().map(|spike_train| spike_train.len()).sum();
    Ok(correct(&histogram, num_spikes, spike_trains.len(), duration))
}

/// Autocorrelation of the pooled spike train of the neuron sample, i.e., of the population rate.
pub fn population_autocorrelation(
    spike_trains: &[&[f64]],
    duration: f64,
    settings: &AutocorrelationSettings,
) -> Result<Vec<AutocorrelationBin>, SNNError> {
    let mut histogram = settings.histogram()?;
    let spike_trains = &spike_trains[..spike_trains.len().min(settings.num_neurons_sample)];

    let pooled: Vec<f64> = spike_trains
        .iter()
        .map(|spike_train| spike_train.iter().copied())
        .kmerge_by(|a: &f64, b: &f64| a < b)
        .collect();
    accumulate(&mut histogram, &pooled, settings.max_lag);

    Ok(correct(&histogram, pooled.len(), spike_trains.len(), duration))
}

/// Normalize the pair counts by the usable recording time of every bin and subtract the squared mean rate.
fn correct(
    histogram: &Histogram,
    num_spikes: usize,
    num_neurons_sample: usize,
    duration: f64,
) -> Vec<AutocorrelationBin> {
    let num_bins = histogram.num_bins();
    let bin_width = histogram.bin_width();
    let n_sample = num_neurons_sample as f64;
    let center = (num_bins as f64 - 1.0) / 2.0;

    (0..num_bins)
        .map(|j| {
            let (lower, upper) = histogram.range(j);
            let w = duration - (center - j as f64).abs() * bin_width;
            let value = if w <= 0.0 || num_neurons_sample == 0 {
                0.0
            } else {
                let rate = num_spikes as f64 / (duration * n_sample);
                histogram.get(j) as f64 / (w * n_sample) - rate * rate * bin_width
            };
            AutocorrelationBin {
                lower,
                upper,
                value,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RandomSource;
    use approx::assert_relative_eq;

    fn poisson_train(rate: f64, duration: f64, rng: &mut RandomSource) -> Vec<f64> {
        let mut spike_train = vec![];
        let mut t = rng.exponential() / rate;
        while t < duration {
            spike_train.push(t);
            t += rng.exponential() / rate;
        }
        spike_train
    }

    #[test]
    fn test_accumulate_pairs() {
        let mut histogram = Histogram::new(10, -5.0, 5.0).unwrap();
        accumulate(&mut histogram, &[0.0, 1.5, 10.0], 5.0);
        // zero lags: 3, lags +-1.5: one each, the spike at 10 is out of reach
        assert_eq!(histogram.total(), 5);
        assert_eq!(histogram.get(5), 3);
        assert_eq!(histogram.get(6), 1);
        assert_eq!(histogram.get(3), 1);
    }

    #[test]
    fn test_accumulate_drops_max_lag() {
        let mut histogram = Histogram::new(10, -5.0, 5.0).unwrap();
        accumulate(&mut histogram, &[0.0, 5.0], 5.0);
        // only the zero lags remain
        assert_eq!(histogram.total(), 2);
        assert_eq!(histogram.get(0), 0);
        assert_eq!(histogram.get(5), 2);
    }

    #[test]
    fn test_symmetry() {
        let mut rng = RandomSource::seed_from_u64(17);
        let spike_train = poisson_train(0.05, 2000.0, &mut rng);
        let settings = AutocorrelationSettings {
            max_lag: 10.0,
            num_bins: 20,
            num_neurons_sample: 1,
        };
        let mut histogram = settings.histogram().unwrap();
        accumulate(&mut histogram, &spike_train, settings.max_lag);
        // the lag window is centered, so bin j and bin 19 - j see opposite lags
        for j in 1..10 {
            assert_eq!(histogram.get(j), histogram.get(19 - j));
        }
    }

    #[test]
    fn test_poisson_is_flat() {
        let rate = 0.02;
        let duration = 100_000.0;
        let mut rng = RandomSource::seed_from_u64(42);
        let spike_trains: Vec<Vec<f64>> = (0..50)
            .map(|_| poisson_train(rate, duration, &mut rng))
            .collect();
        let spike_trains: Vec<&[f64]> = spike_trains.iter().map(|t| t.as_slice()).collect();

        let settings = AutocorrelationSettings::average();
        let bins = average_autocorrelation(&spike_trains, duration, &settings).unwrap();
        assert_eq!(bins.len(), 201);

        let bin_width = 100.0 / 201.0;
        for (j, bin) in bins.iter().enumerate() {
            assert_relative_eq!(bin.upper - bin.lower, bin_width, epsilon = 1e-9);
            if j != 100 {
                assert!(bin.value.abs() < 0.3 * rate * rate * bin_width);
            }
        }
        // the zero lag bin holds the spikes themselves
        assert!(bins[100].value > 10.0 * rate * rate * bin_width);
    }

    #[test]
    fn test_population_merges_trains() {
        let trains: Vec<&[f64]> = vec![&[1.0, 3.0][..], &[2.0][..]];
        let settings = AutocorrelationSettings {
            max_lag: 4.0,
            num_bins: 8,
            num_neurons_sample: 100,
        };
        let pooled = population_autocorrelation(&trains, 10.0, &settings).unwrap();
        let separate = average_autocorrelation(&trains, 10.0, &settings).unwrap();
        // the cross-train pairs at lag +-1 only show up in the pooled train
        let pooled_sum: f64 = pooled.iter().map(|bin| bin.value).sum();
        let separate_sum: f64 = separate.iter().map(|bin| bin.value).sum();
        assert!(pooled_sum > separate_sum);
        assert_eq!(pooled.len(), 8);
    }

    #[test]
    fn test_sample_size() {
        let trains: Vec<&[f64]> = vec![&[1.0][..], &[2.0][..], &[3.0][..]];
        let settings = AutocorrelationSettings {
            max_lag: 1.0,
            num_bins: 2,
            num_neurons_sample: 2,
        };
        // only the first two trains are used: 2 zero lags over 2 neurons
        let bins = average_autocorrelation(&trains, 10.0, &settings).unwrap();
        let rate: f64 = 2.0 / (10.0 * 2.0);
        // the bin is half a bin width off center
        assert_relative_eq!(bins[1].value, 2.0 / (9.5 * 2.0) - rate * rate, epsilon = 1e-12);
    }

    #[test]
    fn test_degenerate_inputs() {
        let settings = AutocorrelationSettings::population();
        let bins = population_autocorrelation(&[], 100.0, &settings).unwrap();
        assert!(bins.iter().all(|bin| bin.value == 0.0));

        // the recording is shorter than the lag window
        let trains: Vec<&[f64]> = vec![&[1.0, 2.0][..]];
        let bins = average_autocorrelation(&trains, 10.0, &settings).unwrap();
        assert_eq!(bins[0].value, 0.0);
        assert_eq!(bins[200].value, 0.0);
    }
}
