//! Convenience re-exports for tests.

pub use crate::must::{must, must_some, must_with};
pub use crate::timing::{DEFAULT_POLL, DEFAULT_TIMEOUT, eventually, wait_for_state};
