//! Module implementing the leaky integrate-and-fire neurons.
use serde::{Deserialize, Serialize};

use crate::network::connection::ConnectionSet;
use crate::utils::{GrowableArray, GrowthPolicy};
use crate::{V_L, V_RESET, V_THR};

/// Initial capacity of the individual spike trains (100 Hz over 10 s).
pub const SPIKE_TRAIN_CAPACITY: usize = 1000;

/// The constants of the forward Euler integration, shared by all neurons.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntegrationConstants {
    /// Timestep (in ms).
    pub dt: f64,
    /// Membrane time constant (in ms).
    pub tau_m: f64,
    /// Homogeneous external current (in mV).
    pub ext_current: f64,
    /// Refractory period (in timesteps).
    pub top_ref_state: usize,
    /// Spikes emitted before this time are not logged.
    pub offset: f64,
}

/// The synaptic state of a neuron, e.g., at the end of a simulation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynapticState {
    pub v_m: f64,
    pub i_fast: f64,
    pub i_slow: f64,
}

/// Represents a leaky integrate-and-fire neuron with fast and (optional) slow synaptic currents.
#[derive(Debug, Clone, PartialEq)]
pub struct Neuron {
    /// Membrane potential (in mV).
    v_m: f64,
    /// Number of timesteps left in the refractory period.
    ref_state: usize,
    i_fast: f64,
    i_slow: f64,
    synapses: ConnectionSet,
    /// Logged firing times, increasing by construction.
    spike_train: GrowableArray<f64>,
}

impl Neuron {
    /// Create a neuron at rest with the given (empty) connectivity.
    pub fn new(synapses: ConnectionSet) -> Self {
        Neuron {
            v_m: V_L,
            ref_state: 0,
            i_fast: 0.0,
            i_slow: 0.0,
            synapses,
            spike_train: GrowableArray::with_capacity(SPIKE_TRAIN_CAPACITY, GrowthPolicy::Doubling),
        }
    }

    /// Set the dynamical state of the neuron.
    pub(crate) fn init_state(&mut self, v_m: f64, ref_state: usize, i_fast: f64, i_slow: f64) {
        self.v_m = v_m;
        self.ref_state = ref_state;
        self.i_fast = i_fast;
        self.i_slow = i_slow;
    }

    pub fn v_m(&self) -> f64 {
        self.v_m
    }

    pub fn ref_state(&self) -> usize {
        self.ref_state
    }

    pub fn i_fast(&self) -> f64 {
        self.i_fast
    }

    pub fn i_slow(&self) -> f64 {
        self.i_slow
    }

    pub fn synapses(&self) -> &ConnectionSet {
        &self.synapses
    }

    pub(crate) fn synapses_mut(&mut self) -> &mut ConnectionSet {
        &mut self.synapses
    }

    /// The logged firing times of the neuron.
    pub fn spike_train(&self) -> &[f64] {
        &self.spike_train
    }

    pub fn num_spikes(&self) -> usize {
        self.spike_train.len()
    }

    pub(crate) fn clear_spike_train(&mut self) {
        self.spike_train.clear();
    }

    pub fn synaptic_state(&self) -> SynapticState {
        SynapticState {
            v_m: self.v_m,
            i_fast: self.i_fast,
            i_slow: self.i_slow,
        }
    }

    /// Time derivative of the membrane potential at `v`.
    fn derivative(&self, v: f64, constants: &IntegrationConstants) -> f64 {
        (-(v - V_L) + constants.ext_current + self.i_fast + self.i_slow) / constants.tau_m
    }

    /// Advance the membrane potential by one timestep starting at `time`.
    ///
    /// Returns the (linearly interpolated) firing time if the threshold is crossed during the step.
    /// After a spike, the potential is reset and relaxes for the remaining fraction of the step.
    pub(crate) fn integrate(&mut self, time: f64, constants: &IntegrationConstants) -> Option<f64> {
        if self.ref_state > 0 {
            self.ref_state -= 1;
            return None;
        }

        let v_k = self.v_m;
        self.v_m += constants.dt * self.derivative(v_k, constants);
        if self.v_m < V_THR {
            return None;
        }

        let rise = self.v_m - v_k;
        let interpolator = if rise > 0.0 {
            ((V_THR - v_k) / rise).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let spike_time = time + interpolator * constants.dt;
        if spike_time > constants.offset {
            self.spike_train.push(spike_time);
        }

        self.ref_state = constants.top_ref_state;
        self.v_m =
            V_RESET + constants.dt * self.derivative(V_RESET, constants) * (1.0 - interpolator);
        Some(spike_time)
    }

    /// Exponential decay of the synaptic currents over one timestep.
    pub(crate) fn decay_currents(&mut self, decay_fast: f64, decay_slow: Option<f64>) {
        self.i_fast *= decay_fast;
        if let Some(decay_slow) = decay_slow {
            self.i_slow *= decay_slow;
        }
    }

    /// Receive a spike, scaled separately for the fast and (optional) slow currents.
    pub(crate) fn receive(&mut self, fast: f64, slow: Option<f64>) {
        self.i_fast += fast;
        if let Some(slow) = slow {
            self.i_slow += slow;
        }
    }
}
