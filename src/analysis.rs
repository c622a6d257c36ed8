//! Statistics of the recorded spike trains.
//!
//! - `histogram`: uniform-bin histogram of real values,
//! - `autocorrelation`: spike-time and population rate autocorrelation estimators.

pub mod autocorrelation;
pub mod histogram;
