//! Sampling primitives built on top of the [`RandomSource`].
//!
//! - [`shuffle`] produces a uniformly random permutation in place,
//! - [`sample_without_replacement`] draws distinct indices with selection sampling (Knuth, TAOCP 3.4.2).
//!
//! # Examples
//!
//! ```rust
//! use rusty_lif::random::RandomSource;
//! use rusty_lif::sampler::sample_without_replacement;
//!
//! let mut rng = RandomSource::seed_from_u64(42);
//! let mut indices = vec![0; 5];
//!
//! // Draw 5 distinct indices out of 10, never picking index 3
//! sample_without_replacement(10, Some(3), &mut indices, &mut rng).unwrap();
//!
//! assert!(indices.windows(2).all(|w| w[0] < w[1]));
//! assert!(!indices.contains(&3));
//! ```
use crate::error::SNNError;
use crate::random::RandomSource;

/// Shuffle the slice in place (Fisher-Yates).
///
/// Position `j` swaps with an index drawn from `0..=j`, so each permutation is equally likely.
/// Drawing from `0..j` instead would only produce cyclic permutations. Both consume one uniform
/// variate per position, but the same seed yields a different order under each.
pub fn shuffle<T>(v: &mut [T], rng: &mut RandomSource) {
    for j in (1..v.len()).rev() {
        let k = ((j + 1) as f64 * rng.uniform()).floor() as usize;
        v.swap(j, k.min(j));
    }
}

/// Fill `out` with `out.len()` distinct indices drawn uniformly from `[0, pool_size)`.
///
/// The indices are written in increasing order. An `exclude` index inside the pool is never selected;
/// it is skipped without consuming a variate and removed from the count of records left to deal with,
/// so every admissible combination stays equally likely.
/// Returns an error if the pool (after exclusion) cannot supply the requested number of records.
pub fn sample_without_replacement(
    pool_size: usize,
    exclude: Option<usize>,
    out: &mut [usize],
    rng: &mut RandomSource,
) -> Result<(), SNNError> {
    let requested = out.len();
    let excluded = exclude.filter(|&i| i < pool_size);
    let exhausted = SNNError::SamplingExhausted {
        pool_size,
        requested,
        excluded,
    };

    if requested > pool_size - excluded.map_or(0, |_| 1) {
        return Err(exhausted);
    }

    let mut t = 0; // records dealt with
    let mut m = 0; // records selected
    while m < requested {
        if t >= pool_size {
            return Err(exhausted);
        }
        if Some(t) == excluded {
            t += 1;
            continue;
        }
        let remaining = pool_size - t - excluded.map_or(0, |i| (i > t) as usize);
        if (remaining as f64) * rng.uniform() < (requested - m) as f64 {
            out[m] = t;
            m += 1;
        }
        t += 1;
    }

    Ok(())
}
