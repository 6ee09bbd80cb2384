//! Fixed-capacity countdown timer pool
//!
//! This module provides:
//! - **Slots**: Pre-allocated per-id timer state
//! - **Pool**: The scheduler owning the slots and the worker thread
//! - **Handle**: Cloneable front door for sessions and for callbacks
//!
//! # Lifecycle
//!
//! 1. `arm` gives an inactive slot a deadline and a callback, and the slot
//!    joins the deadline-ordered active queue
//! 2. The worker waits for the nearest deadline, re-checking after every
//!    wake (arm/cancel/reset of any slot, shutdown, spurious wakeups)
//! 3. The deadline elapses: the slot leaves the queue and its callback runs
//!    exactly once, with the pool lock released

mod error;
mod pool;
mod slot;


pub use error::PoolError;
pub use pool::{PoolHandle, TimerPool};
