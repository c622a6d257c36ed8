//! The simulation state and the timestep loop.
//!
//! Every timestep runs, in this order:
//! 1. the membrane potential update of all neurons, which writes the new spikes into the present slot of the delay queue,
//! 2. the decay of the synaptic currents,
//! 3. the delivery of the spikes emitted one transmission delay ago,
//! 4. the advance of the delay queue cursors and of the clock.
use log;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::analysis::autocorrelation::{
    average_autocorrelation, population_autocorrelation, AutocorrelationBin,
    AutocorrelationSettings,
};
use crate::config::Parameters;
use crate::error::SNNError;
use crate::network::network::Network;
use crate::network::neuron::IntegrationConstants;
use crate::network::params::NetworkParameters;
use crate::random::RandomSource;
use crate::simulator::clock::SimulationClock;
use crate::{MAX_SPIKES_PER_DT, MIN_NEURONS_PAR};

/// A sample of the population firing rate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateSample {
    /// Simulated time at the end of the window (in ms).
    pub time: f64,
    /// Population rate over the window (in Hz).
    pub rate: f64,
}

/// The whole simulation state: the network, the clock and the spike counters.
#[derive(Debug, Clone)]
pub struct Simulation {
    network: Network,
    clock: SimulationClock,
    /// Decay factor of the fast currents over one timestep.
    decay_fast: f64,
    /// Decay factor of the slow currents over one timestep, if slow synapses are enabled.
    decay_slow: Option<f64>,
    /// Number of spikes after the offset in the current rate window.
    window_spikes: usize,
    /// Number of spikes after the offset since the start of the trial.
    total_spikes: usize,
    /// Networks larger than this are integrated in parallel.
    min_neurons_par: usize,
}

impl Simulation {
    /// Create a simulation from an existing network and clock.
    pub fn new(network: Network, clock: SimulationClock) -> Self {
        let dt = clock.dt();
        let decay_fast = (-dt / network.params().tau_fast).exp();
        let decay_slow = network.params().tau_slow.map(|tau_slow| (-dt / tau_slow).exp());
        Simulation {
            network,
            clock,
            decay_fast,
            decay_slow,
            window_spikes: 0,
            total_spikes: 0,
            min_neurons_par: MIN_NEURONS_PAR,
        }
    }

    /// Build the network and the clock from a parameter record, with the default spike capacity per timestep.
    pub fn build(parameters: &Parameters) -> Result<Self, SNNError> {
        Self::build_with_spike_capacity(parameters, MAX_SPIKES_PER_DT)
    }

    /// Build the network and the clock from a parameter record.
    /// The random variate source is seeded from the record, so the same record always gives the same simulation.
    pub fn build_with_spike_capacity(
        parameters: &Parameters,
        spike_capacity: usize,
    ) -> Result<Self, SNNError> {
        let params = NetworkParameters::build(parameters)?;
        let clock = SimulationClock::build(
            parameters.dt,
            parameters.total_time,
            parameters.offset,
            parameters.time_window_size,
        )?;

        let mut rng = RandomSource::seed_from_u64(parameters.seed);
        let mut network =
            Network::with_spike_capacity(params, parameters.dt, spike_capacity, &mut rng);
        network.fill_synaptic_matrix(&mut rng)?;
        log::info!(
            "Network initialized: {} neurons ({} excitatory), lag of {} timesteps",
            network.num_neurons(),
            network.params().num_excitatory,
            network.delay_queue().lag()
        );

        Ok(Self::new(network, clock))
    }

    pub fn network(&self) -> &Network {
        &self.network
    }

    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// The current simulated time (in ms).
    pub fn time(&self) -> f64 {
        self.clock.time()
    }

    /// Number of spikes counted (after the offset) since the start of the trial.
    pub fn total_spikes(&self) -> usize {
        self.total_spikes
    }

    fn integration_constants(&self) -> IntegrationConstants {
        IntegrationConstants {
            dt: self.clock.dt(),
            tau_m: self.network.params().tau_m,
            ext_current: self.network.params().ext_current,
            top_ref_state: self.network.top_ref_state(),
            offset: self.clock.offset(),
        }
    }

    /// Simulate one timestep.
    pub fn step(&mut self) -> Result<(), SNNError> {
        self.update_membrane_potentials()?;
        self.send_away_spikes();
        self.update_pivots();
        Ok(())
    }

    /// Integrate the membrane potential of every neuron over one timestep, record the new spikes in the
    /// present slot of the delay queue, then decay the synaptic currents.
    ///
    /// Returns the number of neurons which fired, or an error if they do not fit in the delay queue slot.
    pub fn update_membrane_potentials(&mut self) -> Result<usize, SNNError> {
        let constants = self.integration_constants();
        let time = self.clock.time();
        let (decay_fast, decay_slow) = (self.decay_fast, self.decay_slow);
        let parallel = self.network.num_neurons() > self.min_neurons_par;
        let (_, neurons, delay_queue) = self.network.parts_mut();

        delay_queue.clear_current();

        // The neurons are independent during integration; the spikes are collected in neuron order.
        let spikes: Vec<(usize, f64)> = if parallel {
            neurons
                .par_iter_mut()
                .enumerate()
                .filter_map(|(id, neuron)| neuron.integrate(time, &constants).map(|t| (id, t)))
                .collect()
        } else {
            neurons
                .iter_mut()
                .enumerate()
                .filter_map(|(id, neuron)| neuron.integrate(time, &constants).map(|t| (id, t)))
                .collect()
        };

        for &(id, spike_time) in spikes.iter() {
            delay_queue.push(id)?;
            if spike_time > constants.offset {
                self.window_spikes += 1;
                self.total_spikes += 1;
            }
        }

        if parallel {
            neurons
                .par_iter_mut()
                .for_each(|neuron| neuron.decay_currents(decay_fast, decay_slow));
        } else {
            neurons
                .iter_mut()
                .for_each(|neuron| neuron.decay_currents(decay_fast, decay_slow));
        }

        Ok(spikes.len())
    }

    /// Deliver the spikes emitted one transmission delay ago to the targets of their sources.
    ///
    /// The efficacy is scaled by `tau_m / tau_syn` so that the total charge does not depend on the synaptic time constant.
    pub fn send_away_spikes(&mut self) {
        let (params, neurons, delay_queue) = self.network.parts_mut();
        let scale_fast = params.tau_m / params.tau_fast;
        let scale_slow = params.tau_slow.map(|tau_slow| params.tau_m / tau_slow);

        for &source_id in delay_queue.delayed() {
            let efficacy = params.efficacy_of(source_id);
            let fast = efficacy * scale_fast;
            let slow = scale_slow.map(|scale| efficacy * scale);
            for k in 0..neurons[source_id].synapses().num_projections() {
                let target_id = neurons[source_id].synapses().projections()[k];
                neurons[target_id].receive(fast, slow);
            }
        }
    }

    /// Move the delay queue cursors and the clock one timestep forward.
    pub fn update_pivots(&mut self) {
        self.network.delay_queue_mut().advance();
        self.clock.advance();
    }

    /// The population rate (in Hz) over the last window, restarting the window count.
    pub fn flush_population_rate(&mut self) -> RateSample {
        let num_neurons = self.network.num_neurons();
        let rate = if num_neurons == 0 {
            0.0
        } else {
            1e3 * self.window_spikes as f64
                / (self.clock.time_window_size() * num_neurons as f64)
        };
        self.window_spikes = 0;
        RateSample {
            time: self.clock.time(),
            rate,
        }
    }

    /// The mean population rate (in Hz) over the recording.
    pub fn population_rate(&self) -> f64 {
        let num_neurons = self.network.num_neurons();
        let duration = self.clock.recording_duration();
        if num_neurons == 0 || duration <= 0.0 {
            return 0.0;
        }
        1e3 * self.total_spikes as f64 / (num_neurons as f64 * duration)
    }

    /// Run the simulation until the end of the clock.
    /// Returns the population rate sampled at the end of every window.
    pub fn run(&mut self) -> Result<Vec<RateSample>, SNNError> {
        log::info!("Starting simulation...");

        let steps_per_window = self.clock.steps_per_window();
        let num_steps = self.clock.num_steps();
        let log_interval = (num_steps / 100).max(1);
        let mut rates = Vec::with_capacity(num_steps / steps_per_window);

        while !self.clock.is_finished() {
            self.step()?;

            let step_index = self.clock.step_index();
            if step_index % steps_per_window == 0 {
                rates.push(self.flush_population_rate());
            }

            if step_index % log_interval == 0 {
                log::debug!(
                    "Simulation progress: {:.0}% (Time: {:.2}/{:.2})",
                    100.0 * step_index as f64 / num_steps as f64,
                    self.clock.time(),
                    self.clock.total_time()
                );
            }
        }

        log::info!(
            "Simulation completed successfully! {} spikes, mean population rate {:.3} Hz",
            self.total_spikes,
            self.population_rate()
        );
        Ok(rates)
    }

    /// Prepare a new trial: the clock, the counters and the spike trains are reset.
    /// The in-flight spikes of the delay queue are kept iff `carry_over` is set, otherwise the queue is emptied.
    /// Potentials and currents carry over from the previous trial.
    pub fn reset(&mut self, carry_over: bool) {
        self.clock.reset();
        self.window_spikes = 0;
        self.total_spikes = 0;
        self.network
            .neurons_mut()
            .iter_mut()
            .for_each(|neuron| neuron.clear_spike_train());
        if !carry_over {
            self.network.delay_queue_mut().clear(true);
        }
    }

    /// Autocorrelation of the individual spike trains, averaged over a sample of neurons.
    pub fn average_autocorrelation(&self) -> Result<Vec<AutocorrelationBin>, SNNError> {
        let settings = AutocorrelationSettings::average();
        log::info!("Computing average autocorrelation...");
        let spike_trains = self.network.spike_trains(settings.num_neurons_sample);
        average_autocorrelation(&spike_trains, self.clock.recording_duration(), &settings)
    }

    /// Autocorrelation of the pooled spike train of a sample of neurons (population rate autocorrelation).
    pub fn population_autocorrelation(&self) -> Result<Vec<AutocorrelationBin>, SNNError> {
        let settings = AutocorrelationSettings::population();
        log::info!("Computing global (population rate) autocorrelation...");
        let spike_trains = self.network.spike_trains(settings.num_neurons_sample);
        population_autocorrelation(&spike_trains, self.clock.recording_duration(), &settings)
    }
}
