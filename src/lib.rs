//! This crate provides tools for simulating sparsely-connected networks of leaky integrate-and-fire (LIF) neurons in Rust.
//!
//! The network follows Brunel (2000): a population of excitatory and inhibitory neurons, each receiving a fixed number
//! of inputs drawn at random, with a homogeneous transmission delay and exponential synaptic currents.
//!
//! # Simulating Networks
//!
//! ```rust
//! use rusty_lif::config::Parameters;
//! use rusty_lif::simulator::simulator::Simulation;
//!
//! // A network of 500 neurons receiving 50 inputs each, simulated for 50 ms
//! let parameters = Parameters {
//!     num_neurons: 500,
//!     num_connections: 50,
//!     total_time: 50.0,
//!     seed: 42,
//!     ..Parameters::default()
//! };
//! parameters.validate().unwrap();
//!
//! let mut simulation = Simulation::build(&parameters).unwrap();
//! let rates = simulation.run().unwrap();
//!
//! assert_eq!(simulation.network().num_connections(), 500 * 50);
//! assert_eq!(rates.len(), 100);
//! ```
//!
//! # Analyzing Spike Trains
//!
//! ```rust
//! use rusty_lif::analysis::autocorrelation::{average_autocorrelation, AutocorrelationSettings};
//!
//! let spike_trains: Vec<&[f64]> = vec![&[1.0, 12.0, 40.0][..], &[5.0, 7.5][..]];
//! let bins = average_autocorrelation(&spike_trains, 100.0, &AutocorrelationSettings::average()).unwrap();
//!
//! assert_eq!(bins.len(), 201);
//! ```

pub mod analysis;
pub mod config;
pub mod error;
pub mod network;
pub mod output;
pub mod random;
pub mod sampler;
pub mod simulator;
pub mod utils;

/// The leak (resting) potential (in mV).
pub const V_L: f64 = 0.0;
/// The firing threshold (in mV).
pub const V_THR: f64 = 20.0;
/// The reset potential after a spike (in mV).
pub const V_RESET: f64 = 10.0;
/// The maximum number of spikes in a single timestep.
pub const MAX_SPIKES_PER_DT: usize = 4000;
/// The minimum number of neurons to integrate them in parallel.
pub const MIN_NEURONS_PAR: usize = 500;
/// The tolerance for a ratio of times to be considered an integer.
pub const TIME_TOLERANCE: f64 = 1e-9;
