//! The discrete simulation clock.
use crate::error::SNNError;
use crate::TIME_TOLERANCE;

/// Keeps track of the simulated time as an integer number of timesteps.
#[derive(Debug, Clone, PartialEq)]
pub struct SimulationClock {
    /// Timestep (in ms).
    dt: f64,
    total_time: f64,
    /// Spikes before the offset are not counted.
    offset: f64,
    /// Width of the population rate window (in ms).
    time_window_size: f64,
    step: usize,
    num_steps: usize,
}

impl SimulationClock {
    /// Create a clock at time zero.
    /// Returns an error for a non-positive timestep or simulated time, or an offset outside [0, total time).
    pub fn build(
        dt: f64,
        total_time: f64,
        offset: f64,
        time_window_size: f64,
    ) -> Result<Self, SNNError> {
        if !(dt > 0.0 && dt.is_finite()) {
            return Err(SNNError::InvalidParameter(
                "The timestep must be positive".to_string(),
            ));
        }
        if !(total_time > 0.0 && total_time.is_finite()) {
            return Err(SNNError::InvalidParameter(
                "The total simulated time must be positive".to_string(),
            ));
        }
        if !(0.0..total_time).contains(&offset) {
            return Err(SNNError::InvalidParameter(
                "The offset must lie in [0, total_time)".to_string(),
            ));
        }
        if !(time_window_size >= dt) {
            return Err(SNNError::InvalidParameter(
                "The time window must be at least one timestep".to_string(),
            ));
        }

        Ok(SimulationClock {
            dt,
            total_time,
            offset,
            time_window_size,
            step: 0,
            num_steps: (total_time / dt - TIME_TOLERANCE).ceil() as usize,
        })
    }

    /// The current time (in ms).
    pub fn time(&self) -> f64 {
        self.step as f64 * self.dt
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn total_time(&self) -> f64 {
        self.total_time
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn time_window_size(&self) -> f64 {
        self.time_window_size
    }

    /// Number of timesteps simulated so far.
    pub fn step_index(&self) -> usize {
        self.step
    }

    /// Total number of timesteps of a run.
    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    /// Number of timesteps between two population rate samples.
    pub fn steps_per_window(&self) -> usize {
        ((self.time_window_size / self.dt + TIME_TOLERANCE).floor() as usize).max(1)
    }

    /// Length of the recording, i.e., the simulated time after the offset.
    pub fn recording_duration(&self) -> f64 {
        self.total_time - self.offset
    }

    pub fn is_finished(&self) -> bool {
        self.step >= self.num_steps
    }

    pub(crate) fn advance(&mut self) {
        self.step += 1;
    }

    pub(crate) fn reset(&mut self) {
        self.step = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_steps() {
        let clock = SimulationClock::build(0.05, 50.0, 0.0, 0.5).unwrap();
        assert_eq!(clock.num_steps(), 1000);
        assert_eq!(clock.steps_per_window(), 10);

        let clock = SimulationClock::build(0.05, 20000.0, 1000.0, 1.0).unwrap();
        assert_eq!(clock.num_steps(), 400_000);
        assert_eq!(clock.steps_per_window(), 20);
        assert_eq!(clock.recording_duration(), 19000.0);
    }

    #[test]
    fn test_time_does_not_drift() {
        let mut clock = SimulationClock::build(0.1, 100.0, 0.0, 1.0).unwrap();
        while !clock.is_finished() {
            clock.advance();
        }
        assert_eq!(clock.step_index(), 1000);
        assert_eq!(clock.time(), 100.0);
        clock.reset();
        assert_eq!(clock.time(), 0.0);
    }

    #[test]
    fn test_invalid_clock() {
        assert!(SimulationClock::build(0.0, 10.0, 0.0, 1.0).is_err());
        assert!(SimulationClock::build(0.1, -1.0, 0.0, 1.0).is_err());
        assert!(SimulationClock::build(0.1, 10.0, 10.0, 1.0).is_err());
        assert!(SimulationClock::build(0.1, 10.0, 0.0, 0.01).is_err());
    }
}
