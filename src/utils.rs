//! Utility containers.
use serde::{Deserialize, Serialize};
use std::ops::Deref;

/// How a [`GrowableArray`] extends its storage once it is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GrowthPolicy {
    /// Grow by a fixed number of elements.
    Chunked(usize),
    /// Double the capacity.
    Doubling,
}

/// A growable sequence with an explicit growth policy.
///
/// # Examples
///
/// ```rust
/// use rusty_lif::utils::{GrowableArray, GrowthPolicy};
///
/// let mut array = GrowableArray::with_capacity(2, GrowthPolicy::Chunked(10));
/// array.push(1);
/// array.push(2);
/// array.push(3);
///
/// assert_eq!(array.as_slice(), &[1, 2, 3]);
/// assert!(array.capacity() >= 12);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct GrowableArray<T> {
    data: Vec<T>,
    policy: GrowthPolicy,
}

impl<T> GrowableArray<T> {
    /// Create an empty array with the given initial capacity.
    pub fn with_capacity(capacity: usize, policy: GrowthPolicy) -> Self {
        GrowableArray {
            data: Vec::with_capacity(capacity),
            policy,
        }
    }

    /// Append an element, growing the storage according to the policy if needed.
    pub fn push(&mut self, value: T) {
        if self.data.len() == self.data.capacity() {
            let additional = match self.policy {
                GrowthPolicy::Chunked(chunk) => chunk.max(1),
                GrowthPolicy::Doubling => self.data.capacity().max(1),
            };
            self.data.reserve_exact(additional);
        }
        self.data.push(value);
    }

    /// Remove all elements, keeping the allocated storage.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn policy(&self) -> GrowthPolicy {
        self.policy
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }
}

impl<T> Deref for GrowableArray<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunked_growth() {
        let mut array = GrowableArray::with_capacity(3, GrowthPolicy::Chunked(1000));
        (0..3).for_each(|i| array.push(i));
        assert_eq!(array.capacity(), 3);
        array.push(3);
        assert!(array.capacity() >= 1003);
        assert_eq!(array.len(), 4);
    }

    #[test]
    fn test_doubling_growth() {
        let mut array = GrowableArray::with_capacity(0, GrowthPolicy::Doubling);
        (0..100).for_each(|i| array.push(i as f64));
        assert_eq!(array.len(), 100);
        assert!(array.iter().enumerate().all(|(i, &x)| x == i as f64));
    }

    #[test]
    fn test_clear_keeps_storage() {
        let mut array = GrowableArray::with_capacity(8, GrowthPolicy::Doubling);
        (0..8).for_each(|i| array.push(i));
        array.clear();
        assert!(array.is_empty());
        assert_eq!(array.capacity(), 8);
    }
}
