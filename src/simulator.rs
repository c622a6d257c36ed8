//! Simulation framework for the network of leaky integrate-and-fire neurons.
//!
//! This module provides two main components:
//! - `clock`: the discrete simulation time,
//! - `simulator`: the simulation state and the timestep loop.
//!
//! # Example
//! ```rust
//! use rusty_lif::config::Parameters;
//! use rusty_lif::simulator::simulator::Simulation;
//!
//! // A small network simulated for 20 ms
//! let parameters = Parameters {
//!     num_neurons: 200,
//!     num_connections: 20,
//!     total_time: 20.0,
//!     ..Parameters::default()
//! };
//! let mut simulation = Simulation::build(&parameters).unwrap();
//! let rates = simulation.run().unwrap();
//!
//! // One population rate sample every 0.5 ms
//! assert_eq!(rates.len(), 40);
//! ```

pub mod clock;
pub mod simulator;
