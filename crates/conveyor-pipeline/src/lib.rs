//! # conveyor-pipeline
//!
//! State-gated producer/consumer pipeline driven by asynchronous events.
//!
//! ## Architecture
//!
//! ```text
//!  EventSource x N ──┐
//!  Producer (Error) ─┼─► EventChannel ──► Dispatcher ──┐
//!  Pipeline::submit ─┘      (drop on full)             ▼
//!                                                  SharedState ◄── WatchdogTimer
//!                                                      │ (gates)
//!  MessagePool ──► Producer ──► DataChannel ──► Consumer ──► release
//!                  (release on full)
//! ```
//!
//! - The [`Dispatcher`] is the only consumer of the event channel and the
//!   only event-driven writer of the state.
//! - The watchdog timer writes the state directly. Its writes and the
//!   dispatcher's are not ordered; both are compare-and-swap, so the state
//!   is never torn.
//! - [`Producer`] and [`Consumer`] only observe the state. While it is not
//!   Running they suspend on the state-change signal.
//! - Messages come from a fixed [`MessagePool`]; a [`Message`] releases its
//!   slot when dropped, so each allocation is released exactly once.
//!
//! ## Degrade, don't fail
//!
//! A full event channel drops the event. A full data channel releases the
//! message. An event with no row for the current state is ignored. An empty
//! pool becomes an Error event. None of these is an `Err`; they are visible
//! in outcomes ([`SubmitOutcome`], [`ProduceOutcome`]) and in
//! [`CounterSnapshot`].
//!
//! ## Example
//!
//! ```rust,no_run
//! use conveyor_pipeline::prelude::*;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = PipelineConfig::builder().time_unit_ms(10).build()?;
//! let pipeline = Pipeline::start(config)?;
//!
//! pipeline.submit_event(Event::Start);
//! std::thread::sleep(std::time::Duration::from_millis(100));
//!
//! let counters = pipeline.shutdown()?;
//! println!("consumed {} messages", counters.messages_consumed);
//! # Ok(())
//! # }
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

pub mod channel;
pub mod config;
pub mod consumer;
pub mod counters;
pub mod dispatcher;
pub mod error;
pub mod pipeline;
pub mod pool;
pub mod producer;
pub mod shutdown;
pub mod source;

pub mod prelude;

pub use channel::{
    DataReceiver, DataSender, EventReceiver, EventSender, SubmitOutcome, data_channel,
    event_channel,
};
pub use config::{EventSourceConfig, PipelineConfig, PipelineConfigBuilder, WatchdogSettings};
pub use consumer::Consumer;
pub use counters::{CounterSnapshot, PipelineCounters};
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, PipelineError, PipelineResult};
pub use pipeline::{Pipeline, PipelineBuilder};
pub use pool::{MESSAGE_SIZE, Message, MessagePool, MessageTag, PoolStats};
pub use producer::{ProduceOutcome, Producer, ProducerTiming};
pub use shutdown::{ShutdownToken, ShutdownTrigger, shutdown_signal};
pub use source::{EventProducer, EventSource, run_source, tick};
