//! Random variate source shared by the connectivity builder and the neuron initialization.
use rand::distributions::OpenClosed01;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, StandardNormal};

/// A seedable stream of uniform, Gaussian and exponential variates.
///
/// # Examples
///
/// ```rust
/// use rusty_lif::random::RandomSource;
///
/// let mut rng = RandomSource::seed_from_u64(42);
/// let u = rng.uniform();
/// assert!((0.0..1.0).contains(&u));
/// assert!(rng.exponential() >= 0.0);
/// ```
#[derive(Debug, Clone)]
pub struct RandomSource {
    rng: ChaCha8Rng,
}

impl RandomSource {
    /// Create a new random source from a seed.
    pub fn seed_from_u64(seed: u64) -> Self {
        RandomSource {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// A uniform variate in [0, 1).
    pub fn uniform(&mut self) -> f64 {
        self.rng.gen::<f64>()
    }

    /// A standard normal variate.
    pub fn gaussian(&mut self) -> f64 {
        StandardNormal.sample(&mut self.rng)
    }

    /// An exponential variate with rate 1. For an arbitrary rate r, divide by r.
    pub fn exponential(&mut self) -> f64 {
        // (0, 1] keeps the logarithm finite
        let u: f64 = self.rng.sample(OpenClosed01);
        -u.ln()
    }
}

impl RngCore for RandomSource {
    fn next_u32(&mut self) -> u32 {
        self.rng.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.rng.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.rng.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.rng.try_fill_bytes(dest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_stream() {
        let mut rng_1 = RandomSource::seed_from_u64(7);
        let mut rng_2 = RandomSource::seed_from_u64(7);
        for _ in 0..100 {
            assert_eq!(rng_1.uniform(), rng_2.uniform());
            assert_eq!(rng_1.gaussian(), rng_2.gaussian());
            assert_eq!(rng_1.exponential(), rng_2.exponential());
        }
    }

    #[test]
    fn test_moments() {
        let mut rng = RandomSource::seed_from_u64(42);
        let n = 100_000;

        let mean_uniform = (0..n).map(|_| rng.uniform()).sum::<f64>() / n as f64;
        assert!((mean_uniform - 0.5).abs() < 0.01);

        let samples: Vec<f64> = (0..n).map(|_| rng.gaussian()).collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / n as f64;
        assert!(mean.abs() < 0.02);
        assert!((var - 1.0).abs() < 0.03);

        let mean_exp = (0..n).map(|_| rng.exponential()).sum::<f64>() / n as f64;
        assert!((mean_exp - 1.0).abs() < 0.02);
    }

    #[test]
    fn test_exponential_is_finite() {
        let mut rng = RandomSource::seed_from_u64(0);
        assert!((0..10_000).map(|_| rng.exponential()).all(|x| x.is_finite() && x >= 0.0));
    }
}
