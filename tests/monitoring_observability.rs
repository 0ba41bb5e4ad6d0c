//! Exercises the observability layer (`SPEC_FULL.md` §1.2) end-to-end:
//! registering an actor, sending it a message, and dropping its last
//! handle should all show up as distinct events in an `InMemoryMonitor`.

#![allow(clippy::unwrap_used)]

mod common;

use std::time::Duration;

use theron::monitoring::event::DropReason;
use theron::{ActorContext, Address, Envelope, Framework, FrameworkEvent, FrameworkParams, HandlerTable, InMemoryMonitor, TypeTag};

struct Sink;

impl HandlerTable for Sink {
    fn handle(&mut self, envelope: &Envelope, _ctx: &ActorContext<'_>) -> bool {
        envelope.type_tag() == TypeTag::of::<u32>()
    }
}

#[test]
fn lifecycle_events_are_recorded_in_order() {
    let monitor = std::sync::Arc::new(InMemoryMonitor::new(64));
    let framework = Framework::with_monitor(
        FrameworkParams::builder().build().unwrap(),
        Box::new(CloningMonitor(std::sync::Arc::clone(&monitor))),
    )
    .unwrap();

    let (address, handle) = framework
        .register_actor(Box::new(Sink), None, Some("sink".into()))
        .unwrap();
    assert!(framework.send(Address::NULL, address, 1u32));
    drop(handle);

    let deadline = std::time::Instant::now() + Duration::from_secs(2);
    while monitor.count(|e| matches!(e, FrameworkEvent::ActorGarbageCollected { .. })) == 0
        && std::time::Instant::now() < deadline
    {
        std::thread::yield_now();
    }

    assert_eq!(monitor.count(|e| matches!(e, FrameworkEvent::ActorRegistered { .. })), 1);
    assert_eq!(monitor.count(|e| matches!(e, FrameworkEvent::MessageEnqueued { .. })), 1);
    assert_eq!(monitor.count(|e| matches!(e, FrameworkEvent::MessageDispatched { .. })), 1);
    assert_eq!(monitor.count(|e| matches!(e, FrameworkEvent::ActorGarbageCollected { .. })), 1);
}

#[test]
fn dropped_messages_record_the_reason() {
    let monitor = std::sync::Arc::new(InMemoryMonitor::new(16));
    let framework = Framework::with_monitor(
        FrameworkParams::builder().build().unwrap(),
        Box::new(CloningMonitor(std::sync::Arc::clone(&monitor))),
    )
    .unwrap();

    let bogus = Address::local(framework_index(&framework), 999_999).unwrap();
    assert!(!framework.send(Address::NULL, bogus, 1u32));

    assert_eq!(
        monitor.count(|e| matches!(
            e,
            FrameworkEvent::MessageDropped { reason: DropReason::UnknownDestination, .. }
        )),
        1
    );
}

/// Forwards to a shared `InMemoryMonitor` so the test can inspect it after
/// construction (`Framework::with_monitor` takes ownership of the boxed
/// monitor it is given).
struct CloningMonitor(std::sync::Arc<InMemoryMonitor>);

impl theron::Monitor for CloningMonitor {
    fn record(&self, event: FrameworkEvent) {
        self.0.record(event);
    }
}

fn framework_index(framework: &Framework) -> u16 {
    // A framework with no registered actors yet always has room at index 0
    // of its own space; round-trip through a throwaway registration to
    // read back the packed framework field without depending on crate
    // internals.
    let (address, handle) = framework
        .register_actor(Box::new(Sink), None, None)
        .expect("directory has room");
    drop(handle);
    address.framework()
}
