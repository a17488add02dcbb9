//! Prelude for conveyor-fsm.
//!
//! This module re-exports the most commonly used types for convenient importing.
//!
//! # Example
//!
//! ```rust
//! use conveyor_fsm::prelude::*;
//!
//! let shared = SharedState::default();
//! assert_eq!(shared.load(), State::Idle);
//! assert!(apply(State::Idle, Event::Start).next_state().is_runnable());
//! ```

pub use crate::error::{FsmError, FsmResult};
pub use crate::event::Event;
pub use crate::shared::SharedState;
pub use crate::state::{State, StateSet};
pub use crate::table::{Effect, Outcome, STANDARD_TRANSITIONS, Transition, TransitionTable, apply};
