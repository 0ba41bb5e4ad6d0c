//! End-to-end scenarios from spec.md §8: GC and thread resizing.

#![allow(clippy::unwrap_used)]

mod common;

use std::sync::{Arc, Barrier};
use std::time::Duration;

use common::Capture;
use theron::{ActorContext, Address, Envelope, Framework, FrameworkParams, HandlerTable, TypeTag};

struct Greet {
    reply_to: Address,
}

impl HandlerTable for Greet {
    fn handle(&mut self, envelope: &Envelope, ctx: &ActorContext<'_>) -> bool {
        if envelope.type_tag() == TypeTag::of::<u32>() {
            ctx.send(self.reply_to, unsafe { *envelope.payload::<u32>() });
            true
        } else {
            false
        }
    }
}

/// Spec.md §8 "GC": dropping the last external reference while a message
/// is in flight still lets the handler run; the directory slot becomes
/// available again only once the handler has finished and the mailbox is
/// empty (spec.md §4.8's "schedule the mailbox one final time" rule).
#[test]
fn dropping_the_last_handle_gcs_the_actor_and_frees_its_slot() {
    let framework = Framework::new(
        FrameworkParams::builder().max_actors(1).build().unwrap(),
    )
    .unwrap();
    let (observer, capture) = Capture::<u32>::install(4);

    let (address, handle) = framework
        .register_actor(Box::new(Greet { reply_to: observer }), None, Some("greet".into()))
        .unwrap();

    assert!(framework.send(Address::NULL, address, 7u32));
    drop(handle);

    let received = capture.wait_for(1, Duration::from_secs(2));
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].1, 7);

    // The slot is now free; a fresh registration reuses it. `max_actors(4)`
    // keeps the directory to a single page, so index reuse is directly
    // observable rather than just "still within capacity".
    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    let mut reused = None;
    while std::time::Instant::now() < deadline {
        match framework.register_actor(Box::new(Greet { reply_to: Address::NULL }), None, None) {
            Ok((new_address, new_handle)) => {
                reused = Some((new_address, new_handle));
                break;
            }
            Err(_) => std::thread::yield_now(),
        }
    }
    let (new_address, new_handle) = reused.expect("directory slot freed in time");
    assert_eq!(new_address, address);
    drop(new_handle);
}

struct SlowEcho {
    barrier: Arc<Barrier>,
    reply_to: Address,
}

impl HandlerTable for SlowEcho {
    fn handle(&mut self, envelope: &Envelope, ctx: &ActorContext<'_>) -> bool {
        if envelope.type_tag() == TypeTag::of::<u32>() {
            self.barrier.wait();
            ctx.send(self.reply_to, unsafe { *envelope.payload::<u32>() });
            true
        } else {
            false
        }
    }
}

/// Spec.md §8 "Thread resizing": raising `min_threads` while enough
/// concurrent long-running work is in flight should converge
/// `get_num_threads()`/`get_peak_threads()` to the new floor.
#[test]
fn set_min_threads_grows_the_pool_to_serve_concurrent_work() {
    const WORKERS: u32 = 8;

    let framework = Framework::new(
        FrameworkParams::builder()
            .initial_thread_count(1)
            .max_threads_per_framework(16)
            .build()
            .unwrap(),
    )
    .unwrap();

    let (observer, capture) = Capture::<u32>::install(5);
    let barrier = Arc::new(Barrier::new(WORKERS as usize));
    let mut handles = Vec::new();
    let mut addresses = Vec::new();

    for i in 0..WORKERS {
        let (address, handle) = framework
            .register_actor(
                Box::new(SlowEcho {
                    barrier: Arc::clone(&barrier),
                    reply_to: observer,
                }),
                None,
                Some(format!("slow-{i}")),
            )
            .unwrap();
        addresses.push(address);
        handles.push(handle);
    }

    assert_eq!(framework.set_min_threads(WORKERS), WORKERS);

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while framework.get_num_threads() < WORKERS && std::time::Instant::now() < deadline {
        std::thread::yield_now();
    }
    assert_eq!(framework.get_num_threads(), WORKERS);

    for (i, address) in addresses.iter().enumerate() {
        assert!(framework.send(Address::NULL, *address, i as u32));
    }

    let received = capture.wait_for(WORKERS as usize, Duration::from_secs(5));
    assert_eq!(received.len(), WORKERS as usize);
    assert!(framework.get_peak_threads() >= WORKERS);

    for handle in handles {
        drop(handle);
    }
}
