//! Parameter record and configuration file loading.
//!
//! The configuration file is a list of `key = value` pairs with `#` comments, e.g.,
//!
//! ```text
//! # Brunel (2000), network of 10,000 neurons
//! N = 10000
//! f = 0.8
//! C = 1000
//! tau_slow = 100.0  # enables slow synapses
//! ```
//!
//! Unknown keys and malformed values are rejected.
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

use crate::error::SNNError;

/// The configuration file read when none is provided explicitly.
pub const DEFAULT_CONFIG_FILE: &str = "brunel2000.conf";

/// The flat parameter record populated from defaults, the configuration file, and the command line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Parameters {
    /// Total number of neurons.
    #[serde(rename = "N")]
    pub num_neurons: usize,
    /// Fraction of excitatory neurons, in [0, 1].
    #[serde(rename = "f")]
    pub fraction_excitatory: f64,
    /// Number of connections received by each neuron.
    #[serde(rename = "C")]
    pub num_connections: usize,
    /// Efficacy of the excitatory synapses (in mV).
    #[serde(rename = "J")]
    pub efficacy: f64,
    /// Ratio between inhibitory and excitatory efficacies (absolute value).
    #[serde(rename = "g")]
    pub inh_exc_ratio: f64,
    /// Membrane time constant (in ms).
    pub tau_m: f64,
    /// Refractory period (in ms).
    pub tau_rp: f64,
    /// Fast synaptic time constant (in ms).
    pub tau_fast: f64,
    /// Slow synaptic time constant (in ms). Slow synapses are enabled iff it is set.
    pub tau_slow: Option<f64>,
    /// Transmission delay (in ms).
    pub delay: f64,
    /// Homogeneous external current (in mV).
    pub ext_current: f64,
    /// Total simulated time (in ms).
    pub total_time: f64,
    /// Timestep (in ms).
    pub dt: f64,
    /// Warm-up time before which spikes are not counted (in ms).
    pub offset: f64,
    /// Width of the window over which the population rate is sampled (in ms).
    pub time_window_size: f64,
    /// Seed of the random variate source.
    pub seed: u64,
}

impl Default for Parameters {
    fn default() -> Self {
        Parameters {
            num_neurons: 1000,
            fraction_excitatory: 0.8,
            num_connections: 100,
            efficacy: 0.1,
            inh_exc_ratio: 5.0,
            tau_m: 20.0,
            tau_rp: 2.0,
            tau_fast: 1.0,
            tau_slow: None,
            delay: 1.5,
            ext_current: 20.0,
            total_time: 20000.0,
            dt: 0.05,
            offset: 0.0,
            time_window_size: 0.5,
            seed: 0,
        }
    }
}

impl Parameters {
    /// Parse a parameter record from the content of a configuration file.
    /// Keys absent from the file keep their default value.
    pub fn from_toml_str(content: &str) -> Result<Self, SNNError> {
        toml::from_str(content).map_err(|e| SNNError::ConfigError(e.to_string()))
    }

    /// Load a parameter record from a configuration file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SNNError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SNNError::ConfigError(format!("'{}' cannot be loaded: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
            .map_err(|e| SNNError::ConfigError(format!("{}: {}", path.display(), e)))
    }

    /// Number of excitatory neurons.
    pub fn num_excitatory(&self) -> usize {
        (self.num_neurons as f64 * self.fraction_excitatory).floor() as usize
    }

    /// Number of inhibitory neurons.
    pub fn num_inhibitory(&self) -> usize {
        self.num_neurons.saturating_sub(self.num_excitatory())
    }

    /// Number of inhibitory connections per neuron, proportional to the inhibitory population.
    pub fn num_inh_connections(&self) -> usize {
        if self.num_neurons == 0 {
            return 0;
        }
        let fraction_inh = self.num_inhibitory() as f64 / self.num_neurons as f64;
        (fraction_inh * self.num_connections as f64).round() as usize
    }

    /// Number of excitatory connections per neuron.
    pub fn num_exc_connections(&self) -> usize {
        self.num_connections - self.num_inh_connections()
    }

    /// Check that the record describes a network that can be built and simulated.
    pub fn validate(&self) -> Result<(), SNNError> {
        let reals = [
            ("f", self.fraction_excitatory),
            ("J", self.efficacy),
            ("g", self.inh_exc_ratio),
            ("tau_m", self.tau_m),
            ("tau_rp", self.tau_rp),
            ("tau_fast", self.tau_fast),
            ("tau_slow", self.tau_slow.unwrap_or(1.0)),
            ("delay", self.delay),
            ("ext_current", self.ext_current),
            ("total_time", self.total_time),
            ("dt", self.dt),
            ("offset", self.offset),
            ("time_window_size", self.time_window_size),
        ];
        if let Some((name, _)) = reals.iter().find(|(_, value)| !value.is_finite()) {
            return Err(SNNError::InvalidParameter(format!(
                "parameter {} must be finite",
                name
            )));
        }

        let invalid = |msg: &str| Err(SNNError::InvalidParameter(msg.to_string()));

        if self.num_neurons == 0 {
            return invalid("the number of neurons N must be positive");
        }
        if !(0.0..=1.0).contains(&self.fraction_excitatory) {
            return Err(SNNError::InvalidParameter(format!(
                "parameter f must be in the interval [0,1], got {}",
                self.fraction_excitatory
            )));
        }
        if self.tau_m <= 0.0 {
            return invalid("the membrane time constant tau_m must be positive");
        }
        if self.tau_fast <= 0.0 {
            return invalid("the fast synaptic time constant tau_fast must be positive");
        }
        if matches!(self.tau_slow, Some(tau) if tau <= 0.0) {
            return invalid("the slow synaptic time constant tau_slow must be positive");
        }
        if self.tau_rp < 0.0 {
            return invalid("the refractory period tau_rp must be non-negative");
        }
        if self.delay < 0.0 {
            return invalid("the transmission delay must be non-negative");
        }
        if self.dt <= 0.0 {
            return invalid("the timestep dt must be positive");
        }
        if self.total_time <= 0.0 {
            return invalid("the total simulated time must be positive");
        }
        if self.offset < 0.0 || self.offset >= self.total_time {
            return invalid("the offset must lie in [0, total_time)");
        }
        if self.time_window_size < self.dt {
            return invalid("the time window size must be at least one timestep");
        }

        let pools = [
            ("excitatory", self.num_excitatory(), self.num_exc_connections()),
            ("inhibitory", self.num_inhibitory(), self.num_inh_connections()),
        ];
        for (kind, pool, wanted) in pools {
            // neurons of a population cannot innervate themselves
            let available = pool.saturating_sub(1);
            if wanted > available {
                return Err(SNNError::InvalidParameter(format!(
                    "{} {} connections per neuron requested but only {} {} presynaptic candidates are available",
                    wanted, kind, available, kind
                )));
            }
        }

        Ok(())
    }
}

impl fmt::Display for Parameters {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Network parameters")?;
        writeln!(f, "    N, number of neurons           = {:>8}", self.num_neurons)?;
        writeln!(f, "    C, number of connections       = {:>8}", self.num_connections)?;
        writeln!(f, "    f, fraction of exc cells       = {:>8.2}", self.fraction_excitatory)?;
        writeln!(f, "    T, membrane time constant      = {:>8.2}", self.tau_m)?;
        writeln!(f, "    r, refractory period           = {:>8.2}", self.tau_rp)?;
        writeln!(f, "    J, synaptic efficacy           = {:>8.2}", self.efficacy)?;
        writeln!(f, "    g, |JI| / |JE|                 = {:>8.2}", self.inh_exc_ratio)?;
        writeln!(f, "    t, synaptic time constant      = {:>8.2}", self.tau_fast)?;
        if let Some(tau_slow) = self.tau_slow {
            writeln!(f, "    s, slow synaptic time constant = {:>8.2}", tau_slow)?;
        }
        writeln!(f, "    D, synaptic delay              = {:>8.2}", self.delay)?;
        writeln!(f, "    I, external input              = {:>8.2}", self.ext_current)?;
        writeln!(f, "Simulation parameters")?;
        writeln!(f, "    time step                      = {:>8.2}", self.dt)?;
        writeln!(f, "    total simulated time           = {:>8.0}", self.total_time)?;
        write!(f, "    offset                         = {:>8.0}", self.offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        let parameters = Parameters::default();
        assert!(parameters.validate().is_ok());
        assert_eq!(parameters.num_excitatory(), 800);
        assert_eq!(parameters.num_inhibitory(), 200);
        assert_eq!(parameters.num_exc_connections(), 80);
        assert_eq!(parameters.num_inh_connections(), 20);
    }

    #[test]
    fn test_parse_config() {
        let content = "
            # a comment line
            N = 500
            f = 0.75   # trailing comment
            tau_m = 10
            tau_slow = 100.0
        ";
        let parameters = Parameters::from_toml_str(content).unwrap();
        assert_eq!(parameters.num_neurons, 500);
        assert_eq!(parameters.fraction_excitatory, 0.75);
        assert_eq!(parameters.tau_m, 10.0);
        assert_eq!(parameters.tau_slow, Some(100.0));
        assert_eq!(parameters.num_connections, 100);
    }

    #[test]
    fn test_parse_unknown_key() {
        let result = Parameters::from_toml_str("N = 10\nbogus = 1\n");
        assert!(matches!(result, Err(SNNError::ConfigError(msg)) if msg.contains("bogus")));
    }

    #[test]
    fn test_parse_malformed_number() {
        assert!(matches!(
            Parameters::from_toml_str("J = 0.1.2\n"),
            Err(SNNError::ConfigError(_))
        ));
        assert!(matches!(
            Parameters::from_toml_str("N = ten\n"),
            Err(SNNError::ConfigError(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "N = 200\nC = 20\ndelay = 3.0").unwrap();
        let parameters = Parameters::load(file.path()).unwrap();
        assert_eq!(parameters.num_neurons, 200);
        assert_eq!(parameters.num_connections, 20);
        assert_eq!(parameters.delay, 3.0);
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            Parameters::load("/nonexistent/brunel2000.conf"),
            Err(SNNError::ConfigError(_))
        ));
    }

    #[test]
    fn test_fraction_out_of_range_is_fatal() {
        let parameters = Parameters {
            fraction_excitatory: 1.2,
            ..Parameters::default()
        };
        assert!(matches!(
            parameters.validate(),
            Err(SNNError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_infeasible_in_degree() {
        let parameters = Parameters {
            num_neurons: 10,
            num_connections: 10,
            ..Parameters::default()
        };
        assert!(parameters.validate().is_err());

        let parameters = Parameters {
            num_neurons: 10,
            num_connections: 0,
            ..Parameters::default()
        };
        assert!(parameters.validate().is_ok());
    }

    #[test]
    fn test_invalid_time_parameters() {
        let base = Parameters::default();
        assert!(Parameters { dt: 0.0, ..base.clone() }.validate().is_err());
        assert!(Parameters { offset: 20000.0, ..base.clone() }.validate().is_err());
        assert!(Parameters { tau_slow: Some(-1.0), ..base.clone() }.validate().is_err());
        assert!(Parameters { time_window_size: 0.01, ..base.clone() }.validate().is_err());
        assert!(Parameters { delay: f64::NAN, ..base }.validate().is_err());
    }
}
