//! Prelude for conveyor-pipeline.
//!
//! Re-exports the pipeline runtime plus the state machine types needed to
//! drive and observe it.

pub use crate::channel::SubmitOutcome;
pub use crate::config::{EventSourceConfig, PipelineConfig, WatchdogSettings};
pub use crate::counters::CounterSnapshot;
pub use crate::error::{ConfigError, PipelineError, PipelineResult};
pub use crate::pipeline::{Pipeline, PipelineBuilder};
pub use crate::pool::{Message, MessagePool, PoolStats};
pub use crate::producer::ProduceOutcome;
pub use crate::source::{EventProducer, EventSource};

pub use conveyor_fsm::{Event, State, StateSet, TransitionTable};
