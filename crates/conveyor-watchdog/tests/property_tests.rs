//! Property tests for the fire policy.

use conveyor_fsm::{SharedState, State};
use conveyor_watchdog::prelude::*;
use proptest::prelude::*;

fn any_state() -> impl Strategy<Value = State> {
    prop::sample::select(State::ALL.to_vec())
}

proptest! {
    #[test]
    fn prop_fire_writes_policy_target(initial in any_state()) {
        let state = SharedState::new(initial);
        let control = WatchdogControl::armed();
        let action = control.fire(&state);

        prop_assert_eq!(action, Some(on_fire(initial)));
        prop_assert_eq!(state.load(), on_fire(initial).target().unwrap_or(initial));
        prop_assert_eq!(control.is_armed(), initial == State::Idle);
    }

    #[test]
    fn prop_fire_sequence_settles(initial in any_state(), fires in 1usize..10) {
        let state = SharedState::new(initial);
        let control = WatchdogControl::armed();
        for _ in 0..fires {
            control.fire(&state);
        }
        // At most two writes ever happen, and the timer only stays armed in Idle.
        prop_assert!(state.write_count() <= 2);
        if control.is_armed() {
            prop_assert_eq!(state.load(), State::Running);
        }
    }
}
