//! Error types for timer pool operations

use thiserror::Error;

/// Errors returned by pool operations.
///
/// All three are synchronous caller errors reported without retrying; none
/// of them change pool state or terminate the worker.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PoolError {
    #[error("timer id {id} out of range (pool holds {capacity} slots)")]
    InvalidId { id: usize, capacity: usize },

    #[error("timer {id} is already armed")]
    AlreadyActive { id: usize },

    #[error("timer {id} is not armed")]
    NotActive { id: usize },
}
