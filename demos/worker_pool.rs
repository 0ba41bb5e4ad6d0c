//! Worker Pool Example
//!
//! Demonstrates the dynamic worker pool: start with one thread, raise the
//! floor under concurrent load, and watch `get_num_threads`/
//! `get_peak_threads` converge to the new target.
//!
//! Run with: cargo run --example worker_pool

#![allow(clippy::expect_used)]

use std::sync::{Arc, Barrier};
use std::time::Duration;

use theron::{ActorContext, Address, Envelope, Framework, FrameworkParams, HandlerTable, TypeTag};

struct SlowWorker {
    barrier: Arc<Barrier>,
    id: u32,
}

impl HandlerTable for SlowWorker {
    fn handle(&mut self, envelope: &Envelope, _ctx: &ActorContext<'_>) -> bool {
        if envelope.type_tag() != TypeTag::of::<u32>() {
            return false;
        }
        println!("   worker {} starting a long-running task", self.id);
        self.barrier.wait();
        println!("   worker {} done", self.id);
        true
    }
}

fn main() {
    const TARGET: u32 = 8;

    println!("=== Worker Pool Example ===\n");

    let framework = Framework::new(
        FrameworkParams::builder()
            .initial_thread_count(1)
            .max_threads_per_framework(16)
            .build()
            .expect("valid params"),
    )
    .expect("framework index available");

    println!("1. Starting with {} worker thread", framework.get_num_threads());

    let barrier = Arc::new(Barrier::new(TARGET as usize));
    let mut handles = Vec::new();
    let mut addresses = Vec::new();
    for id in 0..TARGET {
        let (address, handle) = framework
            .register_actor(
                Box::new(SlowWorker { barrier: Arc::clone(&barrier), id }),
                None,
                Some(format!("worker-{id}")),
            )
            .expect("directory has room");
        addresses.push(address);
        handles.push(handle);
    }

    println!("2. Raising the thread floor to {TARGET}...");
    framework.set_min_threads(TARGET);

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while framework.get_num_threads() < TARGET && std::time::Instant::now() < deadline {
        std::thread::yield_now();
    }
    println!("   num_threads now {}", framework.get_num_threads());

    println!("3. Submitting {TARGET} concurrent long-running tasks...");
    for address in &addresses {
        framework.send(Address::NULL, *address, 0u32);
    }

    std::thread::sleep(Duration::from_millis(200));
    println!(
        "\n4. peak_threads reached {} (target was {TARGET})",
        framework.get_peak_threads()
    );

    for handle in handles {
        drop(handle);
    }
    framework.shutdown();
    println!("\n=== Example Complete ===");
}
