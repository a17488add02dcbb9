//! Watchdog timer thread and its control handle.

use conveyor_fsm::SharedState;
use crossbeam::channel::{self, RecvTimeoutError, Sender};
use portable_atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::config::WatchdogConfig;
use crate::error::{WatchdogError, WatchdogResult};
use crate::metrics::{WatchdogMetrics, WatchdogMetricsSnapshot};
use crate::policy::{FireAction, on_fire};

#[derive(Debug)]
struct ControlInner {
    armed: AtomicBool,
    metrics: WatchdogMetrics,
}

/// Shareable arm/disarm handle for a watchdog.
///
/// The dispatcher holds a clone so a Stop event can disarm the timer; the
/// timer thread holds another and calls [`fire`](Self::fire) on expiry.
#[derive(Debug, Clone)]
pub struct WatchdogControl {
    inner: Arc<ControlInner>,
}

impl WatchdogControl {
    fn with_armed(armed: bool) -> Self {
        let inner = ControlInner {
            armed: AtomicBool::new(armed),
            metrics: WatchdogMetrics::new(),
        };
        if armed {
            inner.metrics.record_arm();
        }
        Self {
            inner: Arc::new(inner),
        }
    }

    /// Create an armed control.
    #[must_use]
    pub fn armed() -> Self {
        Self::with_armed(true)
    }

    /// Create a disarmed control.
    #[must_use]
    pub fn disarmed() -> Self {
        Self::with_armed(false)
    }

    /// Whether expiries currently act on the state.
    #[must_use]
    pub fn is_armed(&self) -> bool {
        self.inner.armed.load(Ordering::Acquire)
    }

    /// Arm the timer. Returns `true` if it was disarmed before.
    pub fn arm(&self) -> bool {
        let was_disarmed = !self.inner.armed.swap(true, Ordering::AcqRel);
        if was_disarmed {
            self.inner.metrics.record_arm();
            tracing::debug!("Watchdog armed");
        }
        was_disarmed
    }

    /// Disarm the timer. Returns `true` if it was armed before.
    pub fn disarm(&self) -> bool {
        let was_armed = self.inner.armed.swap(false, Ordering::AcqRel);
        if was_armed {
            self.inner.metrics.record_disarm();
        }
        was_armed
    }

    /// Counter snapshot.
    #[must_use]
    pub fn metrics(&self) -> WatchdogMetricsSnapshot {
        self.inner.metrics.snapshot()
    }

    /// Handle one expiry.
    ///
    /// Returns `None` when disarmed. Otherwise the policy is evaluated
    /// against the state it actually replaces, and the timer disarms itself
    /// when the policy says so.
    ///
    /// # RT Safety
    ///
    /// Non-blocking and allocation-free.
    pub fn fire(&self, state: &SharedState) -> Option<FireAction> {
        if !self.is_armed() {
            return None;
        }
        self.inner.metrics.record_fire();

        let mut action = on_fire(state.load());
        let written = state.transition_with(|current| {
            action = on_fire(current);
            action.target()
        });
        if written.is_some() {
            self.inner.metrics.record_advance();
        }
        if action.disarms() {
            self.disarm();
        }

        match action {
            FireAction::Advance { from, to, .. } => {
                tracing::info!(%from, %to, path = "watchdog", "State changed");
            }
            FireAction::Disarm { state } => {
                tracing::debug!(%state, "Watchdog fired, no further state changes");
            }
        }
        Some(action)
    }
}

impl Default for WatchdogControl {
    fn default() -> Self {
        Self::armed()
    }
}

/// Periodic watchdog timer running on its own thread.
///
/// Every `period` the thread calls [`WatchdogControl::fire`]. A disarmed
/// timer keeps ticking but does nothing until re-armed through
/// [`control`](Self::control).
#[derive(Debug)]
pub struct WatchdogTimer {
    control: WatchdogControl,
    stop_tx: Option<Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl WatchdogTimer {
    /// Spawn the timer thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the thread
    /// cannot be spawned.
    pub fn spawn(config: WatchdogConfig, state: Arc<SharedState>) -> WatchdogResult<Self> {
        config.validate()?;

        let control = WatchdogControl::with_armed(config.start_armed);
        let (stop_tx, stop_rx) = channel::bounded::<()>(0);
        let thread_control = control.clone();
        let period = config.period;

        let handle = thread::Builder::new()
            .name("conveyor-watchdog".into())
            .spawn(move || {
                tracing::debug!(?period, "Watchdog timer running");
                loop {
                    match stop_rx.recv_timeout(period) {
                        Err(RecvTimeoutError::Timeout) => {
                            thread_control.fire(&state);
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                tracing::debug!("Watchdog timer stopped");
            })
            .map_err(|e| WatchdogError::spawn_failed(e.to_string()))?;

        Ok(Self {
            control,
            stop_tx: Some(stop_tx),
            handle: Some(handle),
        })
    }

    /// Handle for arming, disarming and reading counters.
    #[must_use]
    pub fn control(&self) -> &WatchdogControl {
        &self.control
    }

    /// Stop the timer thread and wait for it to exit.
    ///
    /// # Errors
    ///
    /// Returns [`WatchdogError::ThreadPanicked`] if the thread panicked.
    pub fn stop(mut self) -> WatchdogResult<WatchdogMetricsSnapshot> {
        self.stop_tx.take();
        if let Some(handle) = self.handle.take() {
            handle
                .join()
                .map_err(|_payload| WatchdogError::ThreadPanicked)?;
        }
        Ok(self.control.metrics())
    }
}

impl Drop for WatchdogTimer {
    fn drop(&mut self) {
        // Dropping the sender disconnects the channel and ends the thread.
        self.stop_tx.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conveyor_fsm::State;
    use std::time::Duration;

    #[test]
    fn test_disarmed_control_ignores_fire() {
        let state = SharedState::default();
        let control = WatchdogControl::disarmed();
        assert_eq!(control.fire(&state), None);
        assert_eq!(state.load(), State::Idle);
        assert_eq!(control.metrics().fires, 0);
    }

    #[test]
    fn test_arm_disarm_report_changes() {
        let control = WatchdogControl::disarmed();
        assert!(control.arm());
        assert!(!control.arm());
        assert!(control.disarm());
        assert!(!control.disarm());

        let metrics = control.metrics();
        assert_eq!(metrics.arms, 1);
        assert_eq!(metrics.disarms, 1);
    }

    #[test]
    fn test_fire_in_paused_disarms_only() {
        let state = SharedState::new(State::Paused);
        let control = WatchdogControl::armed();

        let action = control.fire(&state);
        assert_eq!(action, Some(FireAction::Disarm { state: State::Paused }));
        assert_eq!(state.load(), State::Paused);
        assert!(!control.is_armed());
        assert_eq!(control.metrics().advances, 0);
    }

    #[test]
    fn test_zero_period_is_rejected_before_spawn() {
        let config = WatchdogConfig {
            period: Duration::ZERO,
            start_armed: true,
        };
        let result = WatchdogTimer::spawn(config, Arc::new(SharedState::default()));
        assert!(matches!(
            result,
            Err(WatchdogError::InvalidConfiguration(_))
        ));
    }
}
