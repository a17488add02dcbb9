//! # conveyor-watchdog
//!
//! Periodic watchdog timer for the `conveyor` pipeline.
//!
//! The watchdog is a second, coarser path that advances the pipeline state
//! without going through the event channel. On every expiry it applies a
//! fixed policy to the current [`State`](conveyor_fsm::State):
//!
//! | Current | Effect |
//! |---|---|
//! | Idle | Running, stays armed |
//! | Running | Finished, then disarms |
//! | anything else | no state change, disarms |
//!
//! ## Ordering
//!
//! Watchdog writes and dispatcher writes are not ordered relative to each
//! other. Both go through [`SharedState`](conveyor_fsm::SharedState)
//! compare-and-swap, so the state always ends in one writer's target and is
//! never torn. Which writer wins is a race and is expected.
//!
//! ## RT Safety Notes
//!
//! [`WatchdogControl::fire`] is the timer handler. It never blocks and never
//! allocates: one atomic read of the arm flag, one compare-and-swap loop on
//! the state, a few relaxed counter increments.
//!
//! ## Modules
//!
//! - [`policy`] - the pure fire policy
//! - [`timer`] - [`WatchdogTimer`] thread and the shareable [`WatchdogControl`]
//! - [`metrics`] - fire/advance/disarm counters
//! - [`config`] - [`WatchdogConfig`] and its builder
//! - [`error`] - watchdog error types
//!
//! ## Example
//!
//! ```rust
//! use conveyor_fsm::{SharedState, State};
//! use conveyor_watchdog::prelude::*;
//!
//! let state = SharedState::default();
//! let control = WatchdogControl::armed();
//!
//! // Idle -> Running, timer stays armed.
//! control.fire(&state);
//! assert_eq!(state.load(), State::Running);
//! assert!(control.is_armed());
//!
//! // Running -> Finished, timer disarms itself.
//! control.fire(&state);
//! assert_eq!(state.load(), State::Finished);
//! assert!(!control.is_armed());
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod config;
pub mod error;
pub mod metrics;
pub mod policy;
pub mod timer;

pub mod prelude;

pub use config::{WatchdogConfig, WatchdogConfigBuilder};
pub use error::{WatchdogError, WatchdogResult};
pub use metrics::{WatchdogMetrics, WatchdogMetricsSnapshot};
pub use policy::{FireAction, on_fire};
pub use timer::{WatchdogControl, WatchdogTimer};
