//! Module implementing the synaptic connectivity of a single neuron.
use crate::utils::{GrowableArray, GrowthPolicy};

/// Number of extra slots added to a projection list once it is full.
pub const PROJECTION_CHUNK: usize = 1000;

/// The synaptic connections of a neuron, in both directions.
///
/// The same connectivity is shared by the fast and slow synapses.
#[derive(Debug, Clone, PartialEq)]
pub struct ConnectionSet {
    /// Indices of the neurons projecting to the neuron, excitatory block first (fixed length).
    innervations: Vec<usize>,
    /// Indices of the neurons innervated by the neuron (the reverse edge set).
    projections: GrowableArray<usize>,
}

impl ConnectionSet {
    /// Create a connection set with `num_innervations` slots and room for `projection_capacity` projections.
    pub fn new(num_innervations: usize, projection_capacity: usize) -> Self {
        ConnectionSet {
            innervations: vec![0; num_innervations],
            projections: GrowableArray::with_capacity(
                projection_capacity,
                GrowthPolicy::Chunked(PROJECTION_CHUNK),
            ),
        }
    }

    /// Expected out-degree plus a margin of about two binomial standard deviations,
    /// so that most projection lists never have to grow.
    pub fn projection_capacity(num_connections: usize, num_neurons: usize) -> usize {
        if num_neurons == 0 {
            return num_connections;
        }
        let epsilon = num_connections as f64 / num_neurons as f64;
        let dc = ((num_connections as f64 * (1.0 - epsilon)).max(0.0).sqrt() / 2.0) as usize;
        num_connections + 4 * dc
    }

    pub fn innervations(&self) -> &[usize] {
        &self.innervations
    }

    pub(crate) fn innervations_mut(&mut self) -> &mut [usize] {
        &mut self.innervations
    }

    pub fn projections(&self) -> &[usize] {
        &self.projections
    }

    /// Record that the neuron projects to `target_id`.
    pub(crate) fn push_projection(&mut self, target_id: usize) {
        self.projections.push(target_id);
    }

    /// Forget all projections, keeping the allocated storage.
    pub(crate) fn clear_projections(&mut self) {
        self.projections.clear();
    }

    pub fn num_innervations(&self) -> usize {
        self.innervations.len()
    }

    pub fn num_projections(&self) -> usize {
        self.projections.len()
    }
}
