//! Timer pool scheduler
//!
//! Architecture:
//! - `TimerPool`: owns the slots, the active queue, and the worker thread
//! - `PoolHandle`: cloneable front door for sessions and callbacks
//! - Worker: waits for the nearest deadline and fires due timers in
//!   deadline order, exactly once each
//!
//! All slot and queue state lives behind a single mutex. The worker
//! releases the lock before invoking a callback, so callbacks may call back
//! into the pool (including re-arming their own id) and unrelated callers
//! are never blocked for the duration of a callback.

use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use super::error::PoolError;
use super::slot::{TimerCallback, TimerSlot};

/// Fixed-capacity pool of one-shot countdown timers.
///
/// A pool owns `capacity` pre-allocated slots addressed by id in
/// `[0, capacity)` and a single worker thread that fires due timers in
/// ascending deadline order, arrival order on ties. Dropping the pool (or
/// calling [`TimerPool::shutdown`]) wakes the worker, waits for it to exit,
/// and guarantees no callback runs afterwards.
///
/// Callbacks run on the worker thread, one at a time, with no pool lock
/// held. They are required not to panic: the pool does not catch unwinds,
/// so a panicking callback tears down the worker and no later timer fires.
pub struct TimerPool {
    shared: Arc<Shared>,
    worker: Option<JoinHandle<()>>,
}

impl TimerPool {
    /// Create a pool with `capacity` slots and start its worker thread.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero or the worker thread cannot be spawned.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "timer pool needs at least one slot");

        let shared = Arc::new(Shared {
            state: Mutex::new(PoolState {
                slots: (0..capacity).map(TimerSlot::new).collect(),
                queue: Vec::with_capacity(capacity),
                running: true,
            }),
            wakeup: Condvar::new(),
        });

        let worker_shared = Arc::clone(&shared);
        let worker = thread::Builder::new()
            .name("timer-pool".into())
            .spawn(move || worker_loop(&worker_shared))
            .expect("failed to spawn timer pool worker thread");

        info!(capacity, "timer pool started");
        Self {
            shared,
            worker: Some(worker),
        }
    }

    /// Cloneable handle for callers that do not own the pool, including
    /// callbacks that want to re-arm their own id.
    pub fn handle(&self) -> PoolHandle {
        PoolHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Number of slots in the pool.
    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }

    /// Arm slot `id` to fire `timeout` from now.
    ///
    /// Fails with [`PoolError::AlreadyActive`] if the slot has a pending
    /// deadline; arming is not idempotent, callers must cancel (or
    /// [`TimerPool::reset`]) first.
    pub fn arm(
        &self,
        id: usize,
        timeout: Duration,
        callback: impl FnOnce() + Send + 'static,
    ) -> Result<(), PoolError> {
        self.shared.arm(id, timeout, Box::new(callback))
    }

    /// Cancel the pending deadline of slot `id`.
    ///
    /// Cancellation is race-free with respect to firing: either the
    /// callback never runs, or the worker already began firing and this
    /// returns [`PoolError::NotActive`].
    pub fn cancel(&self, id: usize) -> Result<(), PoolError> {
        self.shared.cancel(id)
    }

    /// Atomically replace slot `id`'s deadline and callback.
    ///
    /// Equivalent to cancel-then-arm under one lock acquisition: no other
    /// caller can observe the id disarmed in between, and a reset of an
    /// inactive id behaves like a plain arm.
    pub fn reset(
        &self,
        id: usize,
        timeout: Duration,
        callback: impl FnOnce() + Send + 'static,
    ) -> Result<(), PoolError> {
        self.shared.reset(id, timeout, Box::new(callback))
    }

    /// Whether slot `id` currently has a pending deadline.
    pub fn is_active(&self, id: usize) -> Result<bool, PoolError> {
        self.shared.is_active(id)
    }

    /// How many times slot `id` has fired since the pool was constructed.
    pub fn fired_count(&self, id: usize) -> Result<u64, PoolError> {
        self.shared.fired_count(id)
    }

    /// Stop the worker and wait for it to exit.
    ///
    /// Once this returns, no callback will ever run again; a timer whose
    /// deadline had not elapsed when shutdown began never fires. Idempotent,
    /// and also invoked by `Drop`.
    pub fn shutdown(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };

        {
            let mut state = self.shared.lock_state();
            state.running = false;
            self.shared.wakeup.notify_one();
        }

        if worker.join().is_err() {
            warn!("timer pool worker exited by panic (callback unwound)");
        } else {
            info!("timer pool shut down");
        }
    }
}

impl Drop for TimerPool {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Cloneable front door to a [`TimerPool`].
///
/// Handles expose everything except shutdown. They do not keep the worker
/// alive: operations performed after the owning pool shut down still update
/// slot state, but nothing will fire.
#[derive(Clone)]
pub struct PoolHandle {
    shared: Arc<Shared>,
}

impl PoolHandle {
    /// See [`TimerPool::arm`].
    pub fn arm(
        &self,
        id: usize,
        timeout: Duration,
        callback: impl FnOnce() + Send + 'static,
    ) -> Result<(), PoolError> {
        self.shared.arm(id, timeout, Box::new(callback))
    }

    /// See [`TimerPool::cancel`].
    pub fn cancel(&self, id: usize) -> Result<(), PoolError> {
        self.shared.cancel(id)
    }

    /// See [`TimerPool::reset`].
    pub fn reset(
        &self,
        id: usize,
        timeout: Duration,
        callback: impl FnOnce() + Send + 'static,
    ) -> Result<(), PoolError> {
        self.shared.reset(id, timeout, Box::new(callback))
    }

    pub fn is_active(&self, id: usize) -> Result<bool, PoolError> {
        self.shared.is_active(id)
    }

    pub fn fired_count(&self, id: usize) -> Result<u64, PoolError> {
        self.shared.fired_count(id)
    }

    pub fn capacity(&self) -> usize {
        self.shared.capacity()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Shared state
// ─────────────────────────────────────────────────────────────────────────────

struct Shared {
    state: Mutex<PoolState>,
    wakeup: Condvar,
}

struct PoolState {
    /// All slots, armed or not, indexed by id
    slots: Vec<TimerSlot>,

    /// Armed slot ids, ascending deadline; arrival order on equal deadlines
    queue: Vec<usize>,

    /// Cleared by shutdown to terminate the worker
    running: bool,
}

impl Shared {
    // Callbacks run with the lock released, so a poisoned lock can only
    // come from a panic inside the pool itself; recover the guard instead
    // of cascading panics into every caller.
    fn lock_state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn capacity(&self) -> usize {
        self.lock_state().slots.len()
    }

    fn arm(&self, id: usize, timeout: Duration, callback: TimerCallback) -> Result<(), PoolError> {
        let mut state = self.lock_state();
        state.check_id(id)?;
        if state.slots[id].active {
            return Err(PoolError::AlreadyActive { id });
        }

        state.arm_slot(id, timeout, callback);
        debug!(id, timeout_ms = timeout.as_millis() as u64, "timer armed");
        // The worker may now have a nearer deadline to wait for.
        self.wakeup.notify_one();
        Ok(())
    }

    fn cancel(&self, id: usize) -> Result<(), PoolError> {
        let mut state = self.lock_state();
        state.check_id(id)?;
        if !state.slots[id].active {
            return Err(PoolError::NotActive { id });
        }

        state.disarm_slot(id);
        debug!(id, "timer cancelled");
        // The worker may have been waiting on the deadline that just left
        // the queue.
        self.wakeup.notify_one();
        Ok(())
    }

    fn reset(
        &self,
        id: usize,
        timeout: Duration,
        callback: TimerCallback,
    ) -> Result<(), PoolError> {
        let mut state = self.lock_state();
        state.check_id(id)?;

        // Cancel-then-arm without releasing the lock; a reset of an
        // inactive id is just an arm.
        if state.slots[id].active {
            state.disarm_slot(id);
        }
        state.arm_slot(id, timeout, callback);
        debug!(id, timeout_ms = timeout.as_millis() as u64, "timer reset");
        self.wakeup.notify_one();
        Ok(())
    }

    fn is_active(&self, id: usize) -> Result<bool, PoolError> {
        let state = self.lock_state();
        state.check_id(id)?;
        Ok(state.slots[id].active)
    }

    fn fired_count(&self, id: usize) -> Result<u64, PoolError> {
        let state = self.lock_state();
        state.check_id(id)?;
        Ok(state.slots[id].fired_count)
    }
}

impl PoolState {
    fn check_id(&self, id: usize) -> Result<(), PoolError> {
        if id < self.slots.len() {
            Ok(())
        } else {
            Err(PoolError::InvalidId {
                id,
                capacity: self.slots.len(),
            })
        }
    }

    /// Caller has verified the id is in range and the slot is inactive.
    fn arm_slot(&mut self, id: usize, timeout: Duration, callback: TimerCallback) {
        let deadline = Instant::now() + timeout;
        let slot = &mut self.slots[id];
        slot.active = true;
        slot.deadline = deadline;
        slot.callback = Some(callback);

        // Stable insert: equal deadlines keep arrival order.
        let slots = &self.slots;
        let at = self
            .queue
            .partition_point(|&queued| slots[queued].deadline <= deadline);
        self.queue.insert(at, id);
    }

    fn disarm_slot(&mut self, id: usize) {
        self.slots[id].active = false;
        self.slots[id].callback = None;
        self.queue.retain(|&queued| queued != id);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Worker
// ─────────────────────────────────────────────────────────────────────────────

fn worker_loop(shared: &Shared) {
    let mut state = shared.lock_state();
    while state.running {
        let Some(&next) = state.queue.first() else {
            // Nothing armed: sleep until an arm or shutdown wakes us.
            state = shared
                .wakeup
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
            continue;
        };

        let deadline = state.slots[next].deadline;
        let now = Instant::now();
        if now < deadline {
            // Wakes early whenever the nearest deadline may have changed;
            // the next pass re-reads the queue head.
            let (guard, _timed_out) = shared
                .wakeup
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner);
            state = guard;
            continue;
        }

        // Due. Transition the slot out of the active set before running the
        // callback so a concurrent cancel sees NotActive and the callback
        // may re-arm its own id.
        state.queue.remove(0);
        let slot = &mut state.slots[next];
        slot.active = false;
        slot.fired_count += 1;
        let fired = slot.id;
        let callback = slot.callback.take();
        drop(state);

        debug!(id = fired, "timer fired");
        if let Some(callback) = callback {
            callback();
        }
        state = shared.lock_state();
    }
    debug!("timer pool worker exiting");
}
