//! Bounded waits for threaded tests.
//!
//! Pipeline threads are paced by sleeps, so tests observe them by polling a
//! condition until it holds or a generous deadline passes.

use conveyor_fsm::{SharedState, State};
use std::time::{Duration, Instant};

/// Default deadline for [`eventually`].
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default polling interval for [`eventually`].
pub const DEFAULT_POLL: Duration = Duration::from_millis(2);

/// Poll `condition` until it returns `true` or `timeout` elapses.
///
/// Returns whether the condition held before the deadline.
///
/// # Example
///
/// ```rust
/// use conveyor_test_helpers::eventually;
/// use std::time::Duration;
///
/// let start = std::time::Instant::now();
/// assert!(eventually(Duration::from_secs(1), || start.elapsed() >= Duration::from_millis(5)));
/// ```
pub fn eventually<F>(timeout: Duration, mut condition: F) -> bool
where
    F: FnMut() -> bool,
{
    let deadline = Instant::now() + timeout;
    loop {
        if condition() {
            return true;
        }
        if Instant::now() >= deadline {
            return false;
        }
        std::thread::sleep(DEFAULT_POLL);
    }
}

/// Wait until `shared` holds `expected`, using the state-change signal.
///
/// Returns whether the state was reached before `timeout`.
pub fn wait_for_state(shared: &SharedState, expected: State, timeout: Duration) -> bool {
    shared
        .wait_until(|state| state == expected, timeout)
        .is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_eventually_false_after_timeout() {
        assert!(!eventually(Duration::from_millis(10), || false));
    }

    #[test]
    fn test_wait_for_state_sees_write() {
        let shared = Arc::new(SharedState::default());
        let writer = Arc::clone(&shared);
        let handle = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(10));
            writer.store(State::Finished);
        });
        assert!(wait_for_state(&shared, State::Finished, DEFAULT_TIMEOUT));
        assert!(handle.join().is_ok());
    }
}
