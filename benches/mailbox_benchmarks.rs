//! Mailbox push/pop benchmarks (spec.md §4.3).
//!
//! Measures the FIFO's single-producer/single-consumer hot path in
//! isolation, independent of the directory, queue, or worker pool.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use theron::alloc::LocalCache;
use theron::{Address, Envelope, Mailbox, TypeTag};

fn bench_push_pop_cycle(c: &mut Criterion) {
    let mailbox = Mailbox::new();
    let cache = LocalCache::with_defaults();
    let sender = Address::local(1, 1).expect("in-range address");

    c.bench_function("mailbox_push_then_pop", |b| {
        b.iter(|| {
            let envelope = Envelope::new(&cache, TypeTag::of::<u64>(), sender, 1u64).expect("cache not exhausted");
            mailbox.push(envelope);
            let popped = mailbox.pop().expect("just pushed");
            black_box(&popped);
            popped.destroy(&cache);
        });
    });
}

fn bench_scheduled_bit_transitions(c: &mut Criterion) {
    let mailbox = Mailbox::new();

    c.bench_function("mailbox_mark_then_clear_scheduled", |b| {
        b.iter(|| {
            black_box(mailbox.mark_scheduled());
            mailbox.clear_scheduled();
        });
    });
}

criterion_group!(benches, bench_push_pop_cycle, bench_scheduled_bit_transitions);
criterion_main!(benches);
