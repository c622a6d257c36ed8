//! Error module for the Rusty LIF library.
use std::error::Error;
use std::fmt;

/// Exit code for configuration and parameter errors.
pub const EXIT_CONFIG: u8 = 1;
/// Exit code for violated simulation invariants (spike buffer overflow, sampling exhaustion).
pub const EXIT_INVARIANT: u8 = 2;
/// Exit code for I/O errors.
pub const EXIT_IO: u8 = 3;

/// Error types for the library.
#[derive(Debug, PartialEq)]
pub enum SNNError {
    /// Error for invalid parameters, e.g., a fraction of excitatory cells outside [0, 1].
    InvalidParameter(String),
    /// Error while reading the configuration file, e.g., unknown key or malformed number.
    ConfigError(String),
    /// Selection sampling ran out of records before the requested count was reached.
    SamplingExhausted {
        pool_size: usize,
        requested: usize,
        excluded: Option<usize>,
    },
    /// Too many spikes were emitted within a single timestep for the delay queue slot.
    SpikeBufferOverflow { slot: usize, capacity: usize },
    /// Error for I/O operations.
    IOError(String),
}

impl SNNError {
    /// The process exit code associated with the error.
    pub fn exit_code(&self) -> u8 {
        match self {
            SNNError::InvalidParameter(_) | SNNError::ConfigError(_) => EXIT_CONFIG,
            SNNError::SamplingExhausted { .. } | SNNError::SpikeBufferOverflow { .. } => {
                EXIT_INVARIANT
            }
            SNNError::IOError(_) => EXIT_IO,
        }
    }
}

impl fmt::Display for SNNError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SNNError::InvalidParameter(e) => write!(f, "Invalid parameters: {}", e),
            SNNError::ConfigError(e) => write!(f, "Configuration error: {}", e),
            SNNError::SamplingExhausted {
                pool_size,
                requested,
                excluded,
            } => match excluded {
                Some(i) => write!(
                    f,
                    "Cannot sample {} distinct records out of {} while excluding record {}",
                    requested, pool_size, i
                ),
                None => write!(
                    f,
                    "Cannot sample {} distinct records out of {}",
                    requested, pool_size
                ),
            },
            SNNError::SpikeBufferOverflow { slot, capacity } => write!(
                f,
                "More than {} spikes in a time step (slot {}): increase the spike capacity of the delay queue",
                capacity, slot
            ),
            SNNError::IOError(e) => write!(f, "I/O error: {}", e),
        }
    }
}

impl Error for SNNError {}

impl From<std::io::Error> for SNNError {
    fn from(e: std::io::Error) -> Self {
        SNNError::IOError(e.to_string())
    }
}
