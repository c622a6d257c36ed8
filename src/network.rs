//! Network (with neurons, connections and the delay queue) structure and utilities.
pub mod connection;
pub mod delay_queue;
pub mod network;
pub mod neuron;
pub mod params;
