//! Process-hygiene shutdown signal.
//!
//! Shutdown is not a lifecycle state. It only exists so tests and the CLI
//! can stop the worker threads: dropping the [`ShutdownTrigger`] disconnects
//! a zero-capacity channel, and every [`ShutdownToken`] sleep or blocking
//! receive returns at once.

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::time::Duration;

/// Owner side of the shutdown signal.
#[derive(Debug)]
pub struct ShutdownTrigger {
    _tx: Sender<()>,
}

impl ShutdownTrigger {
    /// Signal shutdown to every token.
    pub fn trigger(self) {
        tracing::debug!("Shutdown triggered");
    }
}

/// Worker side of the shutdown signal.
#[derive(Debug, Clone)]
pub struct ShutdownToken {
    rx: Receiver<()>,
}

impl ShutdownToken {
    /// Whether shutdown has been triggered.
    #[must_use]
    pub fn is_shutdown(&self) -> bool {
        matches!(self.rx.try_recv(), Err(TryRecvError::Disconnected))
    }

    /// Sleep for `duration` unless shutdown arrives first.
    ///
    /// Returns `true` if the full duration elapsed, `false` on shutdown.
    pub fn sleep(&self, duration: Duration) -> bool {
        match self.rx.recv_timeout(duration) {
            Err(RecvTimeoutError::Timeout) => true,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => false,
        }
    }

    pub(crate) fn receiver(&self) -> &Receiver<()> {
        &self.rx
    }
}

/// Create a connected trigger and token.
#[must_use]
pub fn shutdown_signal() -> (ShutdownTrigger, ShutdownToken) {
    let (tx, rx) = channel::bounded(0);
    (ShutdownTrigger { _tx: tx }, ShutdownToken { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[test]
    fn test_sleep_completes_without_trigger() {
        let (_trigger, token) = shutdown_signal();
        assert!(token.sleep(Duration::from_millis(5)));
        assert!(!token.is_shutdown());
    }

    #[test]
    fn test_trigger_interrupts_sleep() {
        let (trigger, token) = shutdown_signal();
        let waiter = token.clone();
        let handle = std::thread::spawn(move || {
            let started = Instant::now();
            let completed = waiter.sleep(Duration::from_secs(30));
            (completed, started.elapsed())
        });

        std::thread::sleep(Duration::from_millis(10));
        trigger.trigger();

        let joined = handle.join();
        assert!(joined.is_ok(), "Thread should not panic");
        if let Ok((completed, elapsed)) = joined {
            assert!(!completed);
            assert!(elapsed < Duration::from_secs(5));
        }
        assert!(token.is_shutdown());
    }
}
