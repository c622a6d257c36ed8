//! The network of excitatory and inhibitory neurons with fixed in-degree random connectivity.
//!
//! # Examples
//!
//! ```rust
//! use rusty_lif::config::Parameters;
//! use rusty_lif::network::network::Network;
//! use rusty_lif::network::params::NetworkParameters;
//! use rusty_lif::random::RandomSource;
//!
//! let parameters = Parameters { num_neurons: 200, num_connections: 20, ..Parameters::default() };
//! let params = NetworkParameters::build(&parameters).unwrap();
//! let mut rng = RandomSource::seed_from_u64(42);
//!
//! let network = Network::build(params, parameters.dt, &mut rng).unwrap();
//!
//! assert_eq!(network.num_neurons(), 200);
//! assert_eq!(network.num_connections(), 200 * 20);
//! assert_eq!(network.num_projections(), 200 * 20);
//! ```
use derivative::Derivative;
use log;

use crate::error::SNNError;
use crate::network::connection::ConnectionSet;
use crate::network::delay_queue::DelayQueue;
use crate::network::neuron::{Neuron, SynapticState};
use crate::network::params::NetworkParameters;
use crate::random::RandomSource;
use crate::sampler::sample_without_replacement;
use crate::{MAX_SPIKES_PER_DT, TIME_TOLERANCE, V_RESET, V_THR};

/// Probability for a neuron to start in its refractory period.
const INIT_REFRACTORY_PROB: f64 = 0.2;

#[derive(Derivative, Clone)]
#[derivative(Debug)]
pub struct Network {
    params: NetworkParameters,
    /// The network owns the neurons, stored contiguously and indexed by their ID.
    #[derivative(Debug = "ignore")]
    neurons: Vec<Neuron>,
    delay_queue: DelayQueue,
    /// Refractory period (in timesteps).
    top_ref_state: usize,
}

impl Network {
    /// Allocate a network with the default spike capacity per timestep and initialize the neuron states.
    /// The connectivity is left empty, see [`Network::fill_synaptic_matrix`].
    pub fn new(params: NetworkParameters, dt: f64, rng: &mut RandomSource) -> Self {
        Self::with_spike_capacity(params, dt, MAX_SPIKES_PER_DT, rng)
    }

    /// Allocate a network whose delay queue holds at most `spike_capacity` spikes per timestep.
    pub fn with_spike_capacity(
        params: NetworkParameters,
        dt: f64,
        spike_capacity: usize,
        rng: &mut RandomSource,
    ) -> Self {
        let lag = Self::lag_for(params.delay, dt);
        let top_ref_state = Self::top_ref_state_for(params.tau_rp, dt);
        let projection_capacity =
            ConnectionSet::projection_capacity(params.num_connections, params.num_neurons);

        let neurons = (0..params.num_neurons)
            .map(|_| Neuron::new(ConnectionSet::new(params.num_connections, projection_capacity)))
            .collect();

        let mut network = Network {
            params,
            neurons,
            delay_queue: DelayQueue::new(lag, spike_capacity),
            top_ref_state,
        };
        network.init_neurons(rng);
        network
    }

    /// Allocate the network, initialize the neuron states and sample the connectivity, in this order.
    pub fn build(
        params: NetworkParameters,
        dt: f64,
        rng: &mut RandomSource,
    ) -> Result<Self, SNNError> {
        let mut network = Self::new(params, dt, rng);
        network.fill_synaptic_matrix(rng)?;
        Ok(network)
    }

    /// Number of timesteps corresponding to the transmission delay.
    pub fn lag_for(delay: f64, dt: f64) -> usize {
        (delay / dt - TIME_TOLERANCE).ceil().max(0.0) as usize
    }

    /// Number of timesteps corresponding to the refractory period.
    pub fn top_ref_state_for(tau_rp: f64, dt: f64) -> usize {
        (tau_rp / dt).round().max(0.0) as usize
    }

    /// Random initial state: a fraction of the neurons starts refractory at the reset potential,
    /// the others are spread uniformly between reset and threshold.
    /// The currents are Gaussian with the fluctuations of a 10 Hz background activity.
    fn init_neurons(&mut self, rng: &mut RandomSource) {
        let std_current = self.params.initial_current_std();
        let slow_synapses = self.params.slow_synapses();
        let top_ref_state = self.top_ref_state;

        for neuron in self.neurons.iter_mut() {
            let (v_m, ref_state) = if rng.uniform() < INIT_REFRACTORY_PROB {
                let ref_state = (top_ref_state as f64 * rng.uniform()).floor() as usize;
                (V_RESET, ref_state.min(top_ref_state))
            } else {
                (V_RESET + (V_THR - V_RESET) * rng.uniform(), 0)
            };
            let i_fast = std_current * rng.gaussian();
            let i_slow = if slow_synapses {
                std_current * rng.gaussian()
            } else {
                0.0
            };
            neuron.init_state(v_m, ref_state, i_fast, i_slow);
        }
    }

    /// Sample the presynaptic neurons of every neuron and build the reverse (projection) lists.
    ///
    /// Neuron `i` receives `CE` inputs from distinct excitatory neurons and `CI` inputs from distinct
    /// inhibitory neurons, never from itself. The storage allocated by [`Network::new`] is reused,
    /// so the matrix can be resampled between trials.
    pub fn fill_synaptic_matrix(&mut self, rng: &mut RandomSource) -> Result<(), SNNError> {
        let num_excitatory = self.params.num_excitatory;
        let num_inhibitory = self.params.num_inhibitory;
        let num_exc_connections = self.params.num_exc_connections;

        self.neurons
            .iter_mut()
            .for_each(|neuron| neuron.synapses_mut().clear_projections());

        for i in 0..self.neurons.len() {
            {
                let innervations = self.neurons[i].synapses_mut().innervations_mut();
                let (exc, inh) = innervations.split_at_mut(num_exc_connections);
                sample_without_replacement(num_excitatory, Some(i), exc, rng)?;
                sample_without_replacement(
                    num_inhibitory,
                    i.checked_sub(num_excitatory),
                    inh,
                    rng,
                )?;
                inh.iter_mut().for_each(|j| *j += num_excitatory);
            }

            // if i is innervated by j, then j projects to i
            for k in 0..self.params.num_connections {
                let pre_id = self.neurons[i].synapses().innervations()[k];
                self.neurons[pre_id].synapses_mut().push_projection(i);
            }
        }

        log::info!(
            "Synaptic matrix generated: {} neurons, {} connections",
            self.num_neurons(),
            self.num_projections()
        );
        Ok(())
    }

    pub fn params(&self) -> &NetworkParameters {
        &self.params
    }

    pub fn top_ref_state(&self) -> usize {
        self.top_ref_state
    }

    /// A reference to a specific neuron in the network.
    /// Returns `None` if the neuron is not found.
    pub fn neuron_ref(&self, neuron_id: usize) -> Option<&Neuron> {
        self.neurons.get(neuron_id)
    }

    pub fn neurons(&self) -> &[Neuron] {
        &self.neurons
    }

    pub(crate) fn neurons_mut(&mut self) -> &mut [Neuron] {
        &mut self.neurons
    }

    pub fn neurons_iter(&self) -> impl Iterator<Item = &Neuron> + '_ {
        self.neurons.iter()
    }

    pub fn num_neurons(&self) -> usize {
        self.neurons.len()
    }

    /// Total number of innervations, i.e., connections counted at their target.
    pub fn num_connections(&self) -> usize {
        self.neurons
            .iter()
            .map(|neuron| neuron.synapses().num_innervations())
            .sum()
    }

    /// Total number of projections, i.e., connections counted at their source.
    pub fn num_projections(&self) -> usize {
        self.neurons
            .iter()
            .map(|neuron| neuron.synapses().num_projections())
            .sum()
    }

    pub fn delay_queue(&self) -> &DelayQueue {
        &self.delay_queue
    }

    pub(crate) fn delay_queue_mut(&mut self) -> &mut DelayQueue {
        &mut self.delay_queue
    }

    /// Split borrow of the parameters, the neurons and the delay queue.
    pub(crate) fn parts_mut(&mut self) -> (&NetworkParameters, &mut [Neuron], &mut DelayQueue) {
        (&self.params, &mut self.neurons, &mut self.delay_queue)
    }

    /// The logged spike trains of the first `num_neurons` neurons.
    pub fn spike_trains(&self, num_neurons: usize) -> Vec<&[f64]> {
        self.neurons
            .iter()
            .take(num_neurons)
            .map(|neuron| neuron.spike_train())
            .collect()
    }

    /// The synaptic state of every neuron.
    pub fn synaptic_snapshot(&self) -> Vec<SynapticState> {
        self.neurons
            .iter()
            .map(|neuron| neuron.synaptic_state())
            .collect()
    }
}
