//! Concurrency tests for the event path and the shared state.

use conveyor_fsm::{SharedState, TransitionTable};
use conveyor_pipeline::prelude::*;
use conveyor_pipeline::{PipelineCounters, event_channel};
use conveyor_watchdog::WatchdogControl;
use std::sync::Arc;
use std::thread;

#[test]
fn test_concurrent_submitters_account_for_every_event() {
    let counters = Arc::new(PipelineCounters::new());
    let (tx, rx) = event_channel(8, Arc::clone(&counters));
    let mut handles = vec![];

    for _ in 0..4 {
        let tx = tx.clone();
        handles.push(thread::spawn(move || {
            for _ in 0..50 {
                tx.submit(Event::Start);
            }
        }));
    }
    for handle in handles {
        assert!(handle.join().is_ok(), "Thread should not panic");
    }

    let snapshot = counters.snapshot();
    assert_eq!(snapshot.events_submitted + snapshot.events_dropped, 200);
    assert_eq!(snapshot.events_submitted, 8);
    assert_eq!(rx.len(), 8);
}

#[test]
fn test_watchdog_and_dispatcher_race_ends_in_a_target_state() {
    for _ in 0..200 {
        let state = Arc::new(SharedState::new(State::Running));
        let control = WatchdogControl::armed();

        let watchdog_state = Arc::clone(&state);
        let watchdog = thread::spawn(move || control.fire(&watchdog_state));
        let table = TransitionTable::standard();
        let dispatcher_state = Arc::clone(&state);
        let dispatcher = thread::spawn(move || table.apply_to(&dispatcher_state, Event::Pause));

        assert!(watchdog.join().is_ok(), "Thread should not panic");
        assert!(dispatcher.join().is_ok(), "Thread should not panic");

        // Either writer may win; the loser re-evaluates against the winner.
        let end = state.load();
        assert!(
            matches!(end, State::Finished | State::Waiting),
            "unexpected end state {end}"
        );
    }
}
