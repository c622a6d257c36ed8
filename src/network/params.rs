//! Immutable network parameters derived from the configuration record.
use serde::{Deserialize, Serialize};

use crate::config::Parameters;
use crate::error::SNNError;

/// The parameters of the network, fixed once the simulation starts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkParameters {
    /// Total number of neurons, `num_excitatory + num_inhibitory`.
    pub num_neurons: usize,
    pub num_excitatory: usize,
    pub num_inhibitory: usize,
    /// Number of connections received by each neuron, `num_exc_connections + num_inh_connections`.
    pub num_connections: usize,
    pub num_exc_connections: usize,
    pub num_inh_connections: usize,
    /// Efficacy of the excitatory synapses (in mV).
    pub efficacy: f64,
    /// Ratio between inhibitory and excitatory efficacies (absolute value).
    pub inh_exc_ratio: f64,
    pub tau_m: f64,
    pub tau_rp: f64,
    pub tau_fast: f64,
    /// Slow synapses are enabled iff the slow time constant is set.
    pub tau_slow: Option<f64>,
    pub delay: f64,
    pub ext_current: f64,
}

impl NetworkParameters {
    /// Derive the network parameters from a validated configuration record.
    pub fn build(parameters: &Parameters) -> Result<Self, SNNError> {
        parameters.validate()?;
        Ok(NetworkParameters {
            num_neurons: parameters.num_neurons,
            num_excitatory: parameters.num_excitatory(),
            num_inhibitory: parameters.num_inhibitory(),
            num_connections: parameters.num_connections,
            num_exc_connections: parameters.num_exc_connections(),
            num_inh_connections: parameters.num_inh_connections(),
            efficacy: parameters.efficacy,
            inh_exc_ratio: parameters.inh_exc_ratio,
            tau_m: parameters.tau_m,
            tau_rp: parameters.tau_rp,
            tau_fast: parameters.tau_fast,
            tau_slow: parameters.tau_slow,
            delay: parameters.delay,
            ext_current: parameters.ext_current,
        })
    }

    /// Returns true if slow synapses are enabled.
    pub fn slow_synapses(&self) -> bool {
        self.tau_slow.is_some()
    }

    /// Returns true if the neuron is excitatory.
    pub fn is_excitatory(&self, neuron_id: usize) -> bool {
        neuron_id < self.num_excitatory
    }

    /// The efficacy of the synapses leaving the neuron: `J` if excitatory, `-g J` if inhibitory.
    pub fn efficacy_of(&self, neuron_id: usize) -> f64 {
        if self.is_excitatory(neuron_id) {
            self.efficacy
        } else {
            -self.inh_exc_ratio * self.efficacy
        }
    }

    /// Standard deviation of the initial synaptic currents, assuming a 10 Hz background activity.
    pub fn initial_current_std(&self) -> f64 {
        self.efficacy
            * (self.num_exc_connections as f64
                * self.tau_m
                * 0.01
                * (1.0 + self.inh_exc_ratio.powi(2) * 0.8))
                .sqrt()
    }
}
