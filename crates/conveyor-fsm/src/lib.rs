//! # conveyor-fsm
//!
//! Lifecycle state machine for the supervised `conveyor` pipeline.
//!
//! The crate holds everything about the pipeline's lifecycle that can be
//! reasoned about without threads:
//!
//! - [`state`] - the eight lifecycle [`State`]s and the [`StateSet`] bitmask
//! - [`event`] - the ten transition request [`Event`]s
//! - [`table`] - the declarative [`TransitionTable`] and its single [`apply`] function
//! - [`shared`] - [`SharedState`], the one authoritative, atomically accessed state cell
//! - [`error`] - conversion errors for raw and textual representations
//!
//! ## Transition Table
//!
//! ```text
//!  Idle ─┐                                   ┌──── Pause / Wait ────┐
//!        ├── Start ──► Running ──────────────┤                      ▼
//!  Paused┘               ▲  │                │                   Waiting
//!                        │  │ Error          └─ Resume/Continue ◄───┘
//!                        │  ▼
//!                        │ Error ── Recover / Retry ──► Retry
//!                        │
//!  Running, Paused ── Stop ──► Finished ── Reset ──► Reset ──(settle)──► Idle
//! ```
//!
//! Any `(state, event)` pair without a row is ignored: the state is left
//! unchanged and nothing is reported as an error.
//!
//! ## Example
//!
//! ```rust
//! use conveyor_fsm::prelude::*;
//!
//! let table = TransitionTable::standard();
//! let shared = SharedState::new(State::Idle);
//!
//! let outcome = table.apply_to(&shared, Event::Start);
//! assert_eq!(outcome.next_state(), State::Running);
//! assert_eq!(shared.load(), State::Running);
//!
//! // Not in the table: ignored, not an error.
//! let outcome = table.apply_to(&shared, Event::Recover);
//! assert!(outcome.is_ignored());
//! assert_eq!(shared.load(), State::Running);
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

pub mod error;
pub mod event;
pub mod shared;
pub mod state;
pub mod table;

pub mod prelude;

pub use error::{FsmError, FsmResult};
pub use event::Event;
pub use shared::SharedState;
pub use state::{State, StateSet};
pub use table::{Effect, Outcome, Transition, TransitionTable, apply};
