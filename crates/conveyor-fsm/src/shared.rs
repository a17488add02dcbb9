//! The single authoritative pipeline state cell.
//!
//! [`SharedState`] stores the current [`State`] in one atomic byte. Readers
//! take snapshots with [`SharedState::load`]; writers go through
//! compare-and-swap so a write is always decided against the value it
//! replaces. Two independent writer paths exist (the dispatcher and the
//! watchdog timer). Their relative order is a race: the cell ends in one
//! writer's target state or the other's, never in a torn value.
//!
//! Idle actors suspend on a state-change signal instead of polling. Every
//! wait takes a timeout; a notification that lands between a waiter's
//! check and its park is absorbed by that bound.

use parking_lot::{Condvar, Mutex};
use portable_atomic::{AtomicU8, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::State;

/// Atomic, signal-carrying holder of the current [`State`].
///
/// # Real-Time Safety
///
/// [`load`](Self::load), [`store`](Self::store) and
/// [`transition_with`](Self::transition_with) never block and never
/// allocate: they are safe to call from a timer handler. Only the
/// `wait_*` methods suspend the caller.
#[derive(Debug)]
pub struct SharedState {
    raw: AtomicU8,
    writes: AtomicU64,
    signal: Mutex<()>,
    changed: Condvar,
}

impl SharedState {
    /// Create a cell holding `initial`.
    #[must_use]
    pub fn new(initial: State) -> Self {
        Self {
            raw: AtomicU8::new(initial.to_raw()),
            writes: AtomicU64::new(0),
            signal: Mutex::new(()),
            changed: Condvar::new(),
        }
    }

    /// Snapshot of the current state.
    #[must_use]
    pub fn load(&self) -> State {
        // Only valid discriminants are ever stored.
        State::from_raw(self.raw.load(Ordering::Acquire)).unwrap_or_default()
    }

    /// Unconditionally store `next`, returning the previous state.
    pub fn store(&self, next: State) -> State {
        let previous = self.raw.swap(next.to_raw(), Ordering::AcqRel);
        self.record_write();
        State::from_raw(previous).unwrap_or_default()
    }

    /// Store `next` only if the current state is `expected`.
    ///
    /// # Errors
    ///
    /// Returns `Err(actual)` with the observed state when it differs from
    /// `expected`; the cell is left untouched.
    pub fn compare_exchange(&self, expected: State, next: State) -> Result<State, State> {
        match self.raw.compare_exchange(
            expected.to_raw(),
            next.to_raw(),
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            Ok(previous) => {
                self.record_write();
                Ok(State::from_raw(previous).unwrap_or_default())
            }
            Err(actual) => Err(State::from_raw(actual).unwrap_or_default()),
        }
    }

    /// Atomically decide and apply a transition.
    ///
    /// `decide` sees the current state and returns the next one, or `None`
    /// to leave the cell alone. If another writer changes the state between
    /// the decision and the write, the decision is re-evaluated against the
    /// new value. Returns `(from, to)` when a write happened.
    pub fn transition_with<F>(&self, mut decide: F) -> Option<(State, State)>
    where
        F: FnMut(State) -> Option<State>,
    {
        let mut current = self.load();
        loop {
            let next = decide(current)?;
            match self.compare_exchange(current, next) {
                Ok(from) => return Some((from, next)),
                Err(actual) => current = actual,
            }
        }
    }

    /// Number of successful writes since creation.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.writes.load(Ordering::Relaxed)
    }

    /// Wake every waiter without changing the state.
    ///
    /// Used on shutdown so suspended actors re-check their exit condition.
    pub fn wake_all(&self) {
        self.changed.notify_all();
    }

    /// Suspend until the state differs from `seen` or `timeout` elapses.
    ///
    /// Returns the state observed on return.
    pub fn wait_for_change(&self, seen: State, timeout: Duration) -> State {
        self.wait_until(|state| state != seen, timeout)
            .unwrap_or_else(|| self.load())
    }

    /// Suspend until `predicate` holds or `timeout` elapses.
    ///
    /// Returns `Some(state)` with the satisfying state, or `None` on timeout.
    pub fn wait_until<P>(&self, mut predicate: P, timeout: Duration) -> Option<State>
    where
        P: FnMut(State) -> bool,
    {
        let deadline = Instant::now().checked_add(timeout);
        let mut guard = self.signal.lock();
        loop {
            let state = self.load();
            if predicate(state) {
                return Some(state);
            }
            let remaining = match deadline {
                Some(deadline) => deadline.saturating_duration_since(Instant::now()),
                None => timeout,
            };
            if remaining.is_zero() {
                return None;
            }
            if self.changed.wait_for(&mut guard, remaining).timed_out() {
                let state = self.load();
                return predicate(state).then_some(state);
            }
        }
    }

    fn record_write(&self) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.changed.notify_all();
    }
}

impl Default for SharedState {
    fn default() -> Self {
        Self::new(State::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_starts_at_given_state() {
        assert_eq!(SharedState::default().load(), State::Idle);
        assert_eq!(SharedState::new(State::Paused).load(), State::Paused);
    }

    #[test]
    fn test_store_returns_previous() {
        let shared = SharedState::default();
        assert_eq!(shared.store(State::Running), State::Idle);
        assert_eq!(shared.load(), State::Running);
        assert_eq!(shared.write_count(), 1);
    }

    #[test]
    fn test_compare_exchange_rejects_stale_expectation() {
        let shared = SharedState::new(State::Running);
        assert_eq!(
            shared.compare_exchange(State::Idle, State::Finished),
            Err(State::Running)
        );
        assert_eq!(shared.load(), State::Running);
        assert_eq!(shared.write_count(), 0);
    }

    #[test]
    fn test_transition_with_none_leaves_state() {
        let shared = SharedState::new(State::Error);
        let result = shared.transition_with(|_| None);
        assert_eq!(result, None);
        assert_eq!(shared.load(), State::Error);
    }

    #[test]
    fn test_wait_until_times_out() {
        let shared = SharedState::default();
        let result = shared.wait_until(State::is_runnable, Duration::from_millis(20));
        assert_eq!(result, None);
    }

    #[test]
    fn test_wait_for_change_wakes_on_store() {
        let shared = Arc::new(SharedState::default());
        let writer = Arc::clone(&shared);
        let handle = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.store(State::Running);
        });

        let observed = shared.wait_for_change(State::Idle, Duration::from_secs(5));
        assert_eq!(observed, State::Running);
        assert!(handle.join().is_ok(), "writer thread panicked");
    }

    #[test]
    fn test_concurrent_writers_never_tear() {
        let shared = Arc::new(SharedState::default());
        let handles: Vec<_> = [State::Running, State::Finished]
            .into_iter()
            .map(|target| {
                let shared = Arc::clone(&shared);
                thread::spawn(move || {
                    for _ in 0..1_000 {
                        shared.store(target);
                    }
                })
            })
            .collect();

        for handle in handles {
            assert!(handle.join().is_ok(), "writer thread panicked");
        }

        let last = shared.load();
        assert!(last == State::Running || last == State::Finished);
        assert_eq!(shared.write_count(), 2_000);
    }
}
