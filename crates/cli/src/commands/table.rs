//! `table` command: print the lifecycle policy

use conveyor_fsm::{State, TransitionTable};
use conveyor_watchdog::on_fire;

use crate::output;

pub fn execute(json: bool) {
    let table = TransitionTable::standard();
    let policy: Vec<_> = State::ALL
        .into_iter()
        .map(|state| (state, on_fire(state)))
        .collect();
    output::print_table(table.rows(), &policy, json);
}
