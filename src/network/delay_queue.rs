//! Circular buffer implementing the transmission delays.
//!
//! Each slot stores the indices of the neurons that fired during one timestep.
//! The write cursor `i_curr` points to the present and the read cursor `i_delay` trails it by `lag` slots,
//! i.e., it points to the spikes emitted `lag` timesteps ago which are due for delivery.
//!
//! # Examples
//!
//! ```rust
//! use rusty_lif::network::delay_queue::DelayQueue;
//!
//! let mut queue = DelayQueue::new(2, 100);
//! queue.push(7).unwrap();
//!
//! // The spike is delivered two timesteps later
//! queue.advance();
//! queue.advance();
//! assert_eq!(queue.delayed(), &[7]);
//! ```
use crate::error::SNNError;

#[derive(Debug, Clone, PartialEq)]
pub struct DelayQueue {
    /// Neurons that fired at a particular time, one slot per timestep.
    slots: Vec<Vec<usize>>,
    /// Maximum number of spikes per slot.
    capacity: usize,
    /// Number of slots between past and present.
    lag: usize,
    /// Slot for the present time.
    i_curr: usize,
    /// Slot for the present time minus the transmission delay.
    i_delay: usize,
}

impl DelayQueue {
    /// Create a queue of `lag + 1` slots, each holding at most `capacity` spikes.
    /// The slots grow on demand up to their capacity.
    pub fn new(lag: usize, capacity: usize) -> Self {
        DelayQueue {
            slots: (0..=lag).map(|_| Vec::new()).collect(),
            capacity,
            lag,
            i_curr: lag,
            i_delay: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn lag(&self) -> usize {
        self.lag
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn i_curr(&self) -> usize {
        self.i_curr
    }

    pub fn i_delay(&self) -> usize {
        self.i_delay
    }

    /// Empty the slot of the present time, before the neurons of this timestep write into it.
    pub fn clear_current(&mut self) {
        self.slots[self.i_curr].clear();
    }

    /// Record that a neuron fired at the present time.
    /// Returns an error if the slot already holds `capacity` spikes.
    pub fn push(&mut self, neuron_id: usize) -> Result<(), SNNError> {
        let slot = &mut self.slots[self.i_curr];
        if slot.len() >= self.capacity {
            return Err(SNNError::SpikeBufferOverflow {
                slot: self.i_curr,
                capacity: self.capacity,
            });
        }
        slot.push(neuron_id);
        Ok(())
    }

    /// The neurons which fired during the present timestep.
    pub fn current(&self) -> &[usize] {
        &self.slots[self.i_curr]
    }

    /// The neurons which fired `lag` timesteps ago.
    pub fn delayed(&self) -> &[usize] {
        &self.slots[self.i_delay]
    }

    /// Move both cursors one timestep forward.
    pub fn advance(&mut self) {
        self.i_curr = (self.i_curr + 1) % self.size();
        self.i_delay = (self.i_delay + 1) % self.size();
    }

    /// Forget all recorded spikes. If `reset_cursors` is set, the cursors go back to their initial position.
    pub fn clear(&mut self, reset_cursors: bool) {
        self.slots.iter_mut().for_each(|slot| slot.clear());
        if reset_cursors {
            self.i_curr = self.lag;
            self.i_delay = 0;
        }
    }

    /// Total number of spikes currently stored in the queue.
    pub fn num_spikes(&self) -> usize {
        self.slots.iter().map(|slot| slot.len()).sum()
    }
}
