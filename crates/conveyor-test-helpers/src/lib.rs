//! Shared test utilities for conveyor.
//!
//! # Modules
//!
//! - [`mod@must`] - Unwrap helpers with good error messages and `#[track_caller]`
//! - [`timing`] - Bounded waits for assertions on threaded behaviour
//! - [`prelude`] - Convenience re-exports
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! conveyor-test-helpers = { workspace = true }
//! ```
//!
//! ```rust,ignore
//! use conveyor_test_helpers::prelude::*;
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![allow(clippy::panic, reason = "test helpers panic by design")]

pub mod must;
pub mod prelude;
pub mod timing;

pub use must::*;
pub use timing::{eventually, wait_for_state};
