//! End-to-end dispatch-loop benchmarks (spec.md §4.6, §4.7).
//!
//! Measures full `send` -> schedule -> worker dispatch -> handler
//! throughput through a live [`Framework`], the number that matters most
//! since it captures lock contention on the shared queue tier alongside
//! the allocator and directory lookups.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use theron::{ActorContext, Address, Envelope, Framework, FrameworkParams, HandlerTable, TypeTag};

struct Counting(Arc<AtomicU64>);

impl HandlerTable for Counting {
    fn handle(&mut self, envelope: &Envelope, _ctx: &ActorContext<'_>) -> bool {
        if envelope.type_tag() == TypeTag::of::<u64>() {
            self.0.fetch_add(1, Ordering::Relaxed);
            true
        } else {
            false
        }
    }
}

fn bench_single_actor_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("dispatch_single_actor");
    for worker_count in [1u32, 4, 8] {
        group.bench_with_input(
            BenchmarkId::from_parameter(worker_count),
            &worker_count,
            |b, &worker_count| {
                let framework = Framework::new(
                    FrameworkParams::builder()
                        .initial_thread_count(worker_count)
                        .max_threads_per_framework(worker_count)
                        .build()
                        .expect("valid params"),
                )
                .expect("framework index available");

                let processed = Arc::new(AtomicU64::new(0));
                let (address, _handle) = framework
                    .register_actor(Box::new(Counting(Arc::clone(&processed))), None, None)
                    .expect("directory has room");

                b.iter(|| {
                    let before = processed.load(Ordering::Relaxed);
                    framework.send(Address::NULL, address, 1u64);
                    while processed.load(Ordering::Relaxed) == before {
                        std::hint::spin_loop();
                    }
                });

                framework.shutdown();
            },
        );
    }
    group.finish();
}

fn bench_fan_out_across_actors(c: &mut Criterion) {
    const ACTORS: usize = 64;

    let framework = Framework::new(
        FrameworkParams::builder()
            .initial_thread_count(4)
            .max_threads_per_framework(4)
            .build()
            .expect("valid params"),
    )
    .expect("framework index available");

    let processed = Arc::new(AtomicU64::new(0));
    let mut addresses = Vec::with_capacity(ACTORS);
    let mut handles = Vec::with_capacity(ACTORS);
    for _ in 0..ACTORS {
        let (address, handle) = framework
            .register_actor(Box::new(Counting(Arc::clone(&processed))), None, None)
            .expect("directory has room");
        addresses.push(address);
        handles.push(handle);
    }

    c.bench_function("dispatch_fan_out_64_actors", |b| {
        b.iter(|| {
            let before = processed.load(Ordering::Relaxed);
            for address in &addresses {
                framework.send(Address::NULL, *address, 1u64);
            }
            while processed.load(Ordering::Relaxed) < before + ACTORS as u64 {
                std::hint::spin_loop();
            }
        });
    });

    drop(handles);
    framework.shutdown();
}

criterion_group! {
    name = benches;
    config = Criterion::default().measurement_time(Duration::from_secs(5));
    targets = bench_single_actor_throughput, bench_fan_out_across_actors
}
criterion_main!(benches);
