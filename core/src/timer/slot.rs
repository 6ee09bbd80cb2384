//! Per-id timer state

use std::time::Instant;

/// Callback invoked when a timer fires.
///
/// Runs on the pool's worker thread, at most once per arm, with the pool
/// lock released.
pub(crate) type TimerCallback = Box<dyn FnOnce() + Send + 'static>;

/// One pre-allocated timer identity.
///
/// Slots are created once at pool construction and never reallocated; the
/// same slot is reused every time its id is re-armed.
pub(crate) struct TimerSlot {
    /// Slot id, equal to its index in the pool
    pub id: usize,

    /// True iff a deadline is pending (not yet fired or cancelled)
    pub active: bool,

    /// Times this slot's callback has run; monotonic, survives re-arming
    pub fired_count: u64,

    /// Absolute fire time; meaningful only while `active`
    pub deadline: Instant,

    /// Owned by the slot until it fires or is cancelled, then dropped
    pub callback: Option<TimerCallback>,
}

impl TimerSlot {
    pub fn new(id: usize) -> Self {
        Self {
            id,
            active: false,
            fired_count: 0,
            deadline: Instant::now(),
            callback: None,
        }
    }
}
