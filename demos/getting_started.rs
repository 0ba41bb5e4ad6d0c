//! Getting Started Example - Your First Actor
//!
//! Demonstrates the complete workflow: start a framework, register a
//! handler table, send messages, observe replies, and shut down.
//!
//! Run with: cargo run --example getting_started

#![allow(clippy::expect_used)]

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use theron::{ActorContext, Address, Envelope, Framework, FrameworkParams, HandlerTable, TypeTag};

#[derive(Clone, Copy)]
enum CounterMessage {
    Increment,
    Decrement,
}

struct Query;

struct CounterActor {
    value: i32,
    reply_to: Address,
}

impl HandlerTable for CounterActor {
    fn handle(&mut self, envelope: &Envelope, ctx: &ActorContext<'_>) -> bool {
        if envelope.type_tag() == TypeTag::of::<CounterMessage>() {
            match unsafe { *envelope.payload::<CounterMessage>() } {
                CounterMessage::Increment => {
                    self.value += 1;
                    println!("   counter incremented to {}", self.value);
                }
                CounterMessage::Decrement => {
                    self.value -= 1;
                    println!("   counter decremented to {}", self.value);
                }
            }
            true
        } else if envelope.type_tag() == TypeTag::of::<Query>() {
            ctx.send(self.reply_to, self.value);
            true
        } else {
            false
        }
    }
}

fn main() {
    println!("=== Getting Started Example ===\n");

    let framework = Framework::new(FrameworkParams::builder().build().expect("valid defaults"))
        .expect("framework index available");

    let observed = Arc::new(AtomicI32::new(i32::MIN));
    let observer_slot = Arc::clone(&observed);
    let observer_index = 1;
    struct Observer(Arc<AtomicI32>);
    impl theron::framework::registry::Receiver for Observer {
        fn push(&self, envelope: Envelope) {
            let value = unsafe { *envelope.payload::<i32>() };
            self.0.store(value, Ordering::SeqCst);
            let cache = theron::alloc::LocalCache::with_defaults();
            envelope.destroy(&cache);
        }
    }
    Framework::register_receiver(observer_index, Arc::new(Observer(observer_slot)))
        .expect("receiver table has room");
    let observer = Address::receiver(observer_index).expect("receiver index in range");

    println!("1. Registering counter actor...");
    let (counter, handle) = framework
        .register_actor(
            Box::new(CounterActor { value: 0, reply_to: observer }),
            None,
            Some("counter".into()),
        )
        .expect("directory has room");

    println!("2. Sending messages...");
    framework.send(Address::NULL, counter, CounterMessage::Increment);
    framework.send(Address::NULL, counter, CounterMessage::Increment);
    framework.send(Address::NULL, counter, CounterMessage::Decrement);
    framework.send(Address::NULL, counter, Query);

    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while observed.load(Ordering::SeqCst) == i32::MIN && std::time::Instant::now() < deadline {
        std::thread::yield_now();
    }

    println!("\n3. Final value observed by the reply receiver: {}", observed.load(Ordering::SeqCst));

    drop(handle);
    framework.shutdown();
    println!("\n=== Example Complete ===");
}
