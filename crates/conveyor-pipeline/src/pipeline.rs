//! Pipeline runtime: wires the channels, pool and workers onto threads.

use conveyor_fsm::{Event, SharedState, State, TransitionTable};
use conveyor_watchdog::{WatchdogControl, WatchdogMetricsSnapshot, WatchdogTimer};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::channel::{EventSender, SubmitOutcome, data_channel, event_channel};
use crate::config::PipelineConfig;
use crate::consumer::Consumer;
use crate::counters::{CounterSnapshot, PipelineCounters};
use crate::dispatcher::Dispatcher;
use crate::error::{PipelineError, PipelineResult};
use crate::pool::MessagePool;
use crate::producer::{Producer, ProducerTiming};
use crate::shutdown::{ShutdownToken, ShutdownTrigger, shutdown_signal};
use crate::source::{EventProducer, EventSource, run_source};

/// Builder for a [`Pipeline`].
pub struct PipelineBuilder {
    config: PipelineConfig,
    table: TransitionTable,
    extra_sources: Vec<Box<dyn EventProducer>>,
    initial_state: State,
}

impl std::fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("config", &self.config)
            .field("table", &self.table)
            .field("extra_sources", &self.extra_sources.len())
            .field("initial_state", &self.initial_state)
            .finish()
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self {
            config: PipelineConfig::default(),
            table: TransitionTable::standard(),
            extra_sources: Vec::new(),
            initial_state: State::Idle,
        }
    }
}

impl PipelineBuilder {
    /// Use `config`.
    #[must_use]
    pub fn config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a custom transition table.
    #[must_use]
    pub fn table(mut self, table: TransitionTable) -> Self {
        self.table = table;
        self
    }

    /// Add an event producer alongside the configured sources.
    #[must_use]
    pub fn source(mut self, producer: impl EventProducer + 'static) -> Self {
        self.extra_sources.push(Box::new(producer));
        self
    }

    /// Start from `state` instead of Idle.
    #[must_use]
    pub fn initial_state(mut self, state: State) -> Self {
        self.initial_state = state;
        self
    }

    /// Validate the configuration and spawn every worker thread.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a thread cannot
    /// be spawned. Threads already running are signalled to stop.
    pub fn start(self) -> PipelineResult<Pipeline> {
        let Self {
            config,
            table,
            extra_sources,
            initial_state,
        } = self;
        config.validate()?;

        let state = Arc::new(SharedState::new(initial_state));
        let counters = Arc::new(PipelineCounters::new());
        let pool = MessagePool::new(config.pool_slots())?;
        let (event_tx, event_rx) = event_channel(config.event_capacity, Arc::clone(&counters));
        let (data_tx, data_rx) = data_channel(config.data_capacity);
        let payload_lock = Arc::new(Mutex::new(()));
        let (trigger, token) = shutdown_signal();

        let watchdog = if config.watchdog.enabled {
            Some(WatchdogTimer::spawn(
                config.watchdog_config()?,
                Arc::clone(&state),
            )?)
        } else {
            None
        };

        let mut pipeline = Pipeline {
            state: Arc::clone(&state),
            counters: Arc::clone(&counters),
            pool: pool.clone(),
            events: event_tx.clone(),
            watchdog,
            trigger: Some(trigger),
            threads: Vec::new(),
            config: config.clone(),
        };

        let mut dispatcher = Dispatcher::new(
            table,
            Arc::clone(&state),
            event_rx,
            config.reset_settle_duration(),
            Arc::clone(&counters),
        );
        if let Some(control) = pipeline.watchdog() {
            dispatcher = dispatcher.with_watchdog(control.clone());
        }
        pipeline.spawn("conveyor-dispatcher".into(), &token, move |token| {
            dispatcher.run(token);
        })?;

        let producer = Producer::new(
            Arc::clone(&state),
            pool,
            data_tx,
            event_tx.clone(),
            Arc::clone(&payload_lock),
            Arc::clone(&counters),
        );
        let timing = ProducerTiming {
            production: config.production_duration(),
            allocation_retry: config.allocation_retry_duration(),
            idle: config.idle_duration(),
        };
        pipeline.spawn("conveyor-producer".into(), &token, move |token| {
            producer.run(timing, token);
        })?;

        let consumer = Consumer::new(
            Arc::clone(&state),
            data_rx,
            payload_lock,
            Arc::clone(&counters),
        );
        let (interval, idle) = (config.consumption_duration(), config.idle_duration());
        pipeline.spawn("conveyor-consumer".into(), &token, move |token| {
            consumer.run(interval, idle, token);
        })?;

        let time_unit = config.units(1);
        let configured = config
            .sources
            .iter()
            .map(|source| Box::new(EventSource::from_config(source, time_unit)) as Box<dyn EventProducer>);
        for producer in configured.chain(extra_sources) {
            let name = format!("conveyor-source-{}", producer.name());
            let state = Arc::clone(&state);
            let events = event_tx.clone();
            pipeline.spawn(name, &token, move |token| {
                run_source(producer, &state, &events, token);
            })?;
        }

        tracing::info!(
            threads = pipeline.threads.len(),
            watchdog = pipeline.watchdog.is_some(),
            state = %pipeline.state(),
            "Pipeline started"
        );
        Ok(pipeline)
    }
}

/// A running pipeline.
///
/// Dropping a pipeline without calling [`shutdown`](Self::shutdown) still
/// signals every thread to stop, but does not wait for them.
#[derive(Debug)]
pub struct Pipeline {
    state: Arc<SharedState>,
    counters: Arc<PipelineCounters>,
    pool: MessagePool,
    events: EventSender,
    watchdog: Option<WatchdogTimer>,
    trigger: Option<ShutdownTrigger>,
    threads: Vec<(String, JoinHandle<()>)>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Start a pipeline with `config` and the standard transition table.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a thread cannot
    /// be spawned.
    pub fn start(config: PipelineConfig) -> PipelineResult<Self> {
        Self::builder().config(config).start()
    }

    fn spawn<F>(&mut self, name: String, token: &ShutdownToken, body: F) -> PipelineResult<()>
    where
        F: FnOnce(&ShutdownToken) + Send + 'static,
    {
        let token = token.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || body(&token))
            .map_err(|source| PipelineError::Spawn {
                thread: name.clone(),
                source,
            })?;
        tracing::debug!(thread = %name, "Spawned worker");
        self.threads.push((name, handle));
        Ok(())
    }

    /// Current state snapshot.
    #[must_use]
    pub fn state(&self) -> State {
        self.state.load()
    }

    /// The shared state cell, for waiting on changes.
    #[must_use]
    pub fn shared_state(&self) -> &Arc<SharedState> {
        &self.state
    }

    /// Queue `event` for the dispatcher; `false` if it was dropped.
    pub fn submit_event(&self, event: Event) -> bool {
        self.events.submit_event(event)
    }

    /// Queue `event` and report exactly what happened to it.
    pub fn submit(&self, event: Event) -> SubmitOutcome {
        self.events.submit(event)
    }

    /// Counter snapshot, including watchdog and pool accounting.
    #[must_use]
    pub fn counters(&self) -> CounterSnapshot {
        let mut snapshot = self.counters.snapshot();
        if let Some(watchdog) = &self.watchdog {
            snapshot.watchdog = watchdog.control().metrics();
        }
        snapshot.pool = self.pool.stats();
        snapshot
    }

    /// The message pool.
    #[must_use]
    pub fn pool(&self) -> &MessagePool {
        &self.pool
    }

    /// Watchdog control, if the watchdog is enabled.
    #[must_use]
    pub fn watchdog(&self) -> Option<&WatchdogControl> {
        self.watchdog.as_ref().map(WatchdogTimer::control)
    }

    /// Configuration the pipeline was started with.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stop every thread, wait for them and return the final counters.
    ///
    /// This is process teardown, not a lifecycle transition: the state is
    /// left as it is.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::ThreadPanicked`] naming the first thread
    /// that panicked. Every thread is joined regardless.
    pub fn shutdown(mut self) -> PipelineResult<CounterSnapshot> {
        tracing::info!(state = %self.state(), "Pipeline shutting down");
        let mut failures = Vec::new();

        let watchdog_metrics = match self.watchdog.take() {
            Some(timer) => match timer.stop() {
                Ok(metrics) => metrics,
                Err(e) => {
                    failures.push(PipelineError::from(e));
                    WatchdogMetricsSnapshot::default()
                }
            },
            None => WatchdogMetricsSnapshot::default(),
        };

        self.signal_stop();
        for (name, handle) in self.threads.drain(..) {
            if handle.join().is_err() {
                tracing::error!(thread = %name, "Worker thread panicked");
                failures.push(PipelineError::ThreadPanicked(name));
            }
        }

        let mut snapshot = self.counters.snapshot();
        snapshot.watchdog = watchdog_metrics;
        snapshot.pool = self.pool.stats();
        tracing::info!(?snapshot, "Pipeline stopped");

        match failures.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(snapshot),
        }
    }

    fn signal_stop(&mut self) {
        if let Some(trigger) = self.trigger.take() {
            trigger.trigger();
            self.state.wake_all();
        }
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        self.signal_stop();
    }
}
