//! Benchmarks for transition dispatch.

use conveyor_fsm::prelude::*;
use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

fn bench_apply_pure(c: &mut Criterion) {
    let table = TransitionTable::standard();
    c.bench_function("table_apply_all_pairs", |b| {
        b.iter(|| {
            for state in State::ALL {
                for event in Event::ALL {
                    black_box(table.apply(black_box(state), black_box(event)));
                }
            }
        });
    });
}

fn bench_apply_shared(c: &mut Criterion) {
    let table = TransitionTable::standard();
    let shared = SharedState::default();
    c.bench_function("table_apply_to_shared_cycle", |b| {
        b.iter(|| {
            black_box(table.apply_to(&shared, Event::Start));
            black_box(table.apply_to(&shared, Event::Wait));
            black_box(table.apply_to(&shared, Event::Continue));
            black_box(table.apply_to(&shared, Event::Error));
            black_box(table.apply_to(&shared, Event::Retry));
            shared.store(State::Idle);
        });
    });
}

criterion_group!(benches, bench_apply_pure, bench_apply_shared);
criterion_main!(benches);
