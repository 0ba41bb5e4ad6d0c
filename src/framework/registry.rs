//! Process-wide collaborators the core treats as external (spec.md §1):
//! the static directory of sibling frameworks used to forward addresses
//! that resolve to a different framework index, and the receiver table
//! addressed via framework-index 0.

// Layer 1: Standard library imports
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, OnceLock, Weak};

// Layer 2: Third-party crate imports
use dashmap::DashMap;

// Layer 3: Internal module imports
use super::config::DEFAULT_MAX_RECEIVERS;
use super::errors::FrameworkError;
use super::inner::FrameworkInner;
use crate::message::Envelope;
use crate::util::address::MAX_FRAMEWORK;
use crate::util::Address;

static NEXT_FRAMEWORK_INDEX: AtomicU32 = AtomicU32::new(1);

/// Capacity of the process-wide receiver table (spec.md §6
/// `MAX_RECEIVERS`). The table is shared by every [`FrameworkInner`] in
/// the process (spec.md §3: receivers live in framework slot 0,
/// independent of any single framework), so there is no single
/// `FrameworkParams::max_receivers` to defer to; each framework that
/// registers raises the shared ceiling to at least its own configured
/// value, so no framework is ever handed a stricter bound than it asked
/// for when constructed.
static RECEIVER_CAPACITY: AtomicU32 = AtomicU32::new(DEFAULT_MAX_RECEIVERS);

/// Raise the shared receiver-table capacity to at least `max_receivers`,
/// called once per framework at construction.
pub(super) fn raise_receiver_capacity(max_receivers: u32) {
    RECEIVER_CAPACITY.fetch_max(max_receivers, Ordering::AcqRel);
}

/// Claim the next process-wide framework index. Index 0 is reserved for
/// the receiver address space (spec.md §3) and is never handed out.
pub(super) fn allocate_framework_index() -> Option<u16> {
    let raw = NEXT_FRAMEWORK_INDEX.fetch_add(1, Ordering::Relaxed);
    if raw > MAX_FRAMEWORK as u32 {
        None
    } else {
        Some(raw as u16)
    }
}

/// The boundary interface a receiver presents to the sender path
/// (spec.md §6): `push(envelope)`, with ownership of the envelope
/// transferred to the receiver.
pub trait Receiver: Send + Sync {
    fn push(&self, envelope: Envelope);
}

static FRAMEWORKS: OnceLock<DashMap<u16, Weak<FrameworkInner>>> = OnceLock::new();
static RECEIVERS: OnceLock<DashMap<u32, Arc<dyn Receiver>>> = OnceLock::new();

fn frameworks() -> &'static DashMap<u16, Weak<FrameworkInner>> {
    FRAMEWORKS.get_or_init(DashMap::new)
}

fn receivers() -> &'static DashMap<u32, Arc<dyn Receiver>> {
    RECEIVERS.get_or_init(DashMap::new)
}

pub(super) fn register_framework(index: u16, inner: &Arc<FrameworkInner>) {
    frameworks().insert(index, Arc::downgrade(inner));
}

pub(super) fn unregister_framework(index: u16) {
    frameworks().remove(&index);
}

/// Register a receiver at `index` in the global receiver table.
///
/// # Errors
///
/// [`FrameworkError::ReceiverTableExhausted`] if the table already holds
/// `max_receivers` entries and `index` is not already one of them
/// (spec.md §6 `MAX_RECEIVERS`).
pub fn register_receiver(index: u32, receiver: Arc<dyn Receiver>) -> Result<(), FrameworkError> {
    let table = receivers();
    let capacity = RECEIVER_CAPACITY.load(Ordering::Acquire);
    if !table.contains_key(&index) && table.len() as u32 >= capacity {
        return Err(FrameworkError::ReceiverTableExhausted(capacity));
    }
    table.insert(index, receiver);
    Ok(())
}

/// Remove a previously registered receiver.
pub fn deregister_receiver(index: u32) {
    receivers().remove(&index);
}

/// Hand `envelope` off to the receiver at `index`, if one is registered.
/// Ownership transfers on success (spec.md §6 "deliver to receivers by
/// envelope handoff").
pub(super) fn deliver_to_receiver(index: u32, envelope: Envelope) -> Result<(), Envelope> {
    match receivers().get(&index) {
        Some(receiver) => {
            receiver.push(envelope);
            Ok(())
        }
        None => Err(envelope),
    }
}

/// Forward `envelope` to the framework at `framework_index`'s mailbox
/// `mailbox_index` (spec.md §4.6 step 1, the `DeliverForeign` hook).
pub(super) fn deliver_foreign(
    framework_index: u16,
    mailbox_index: u32,
    envelope: Envelope,
) -> Result<(), Envelope> {
    let target = match frameworks().get(&framework_index).and_then(|w| w.upgrade()) {
        Some(inner) => inner,
        None => return Err(envelope),
    };
    target.deliver_local_raw(mailbox_index, envelope)
}

/// Addresses this process knows it cannot serve: `framework_index` was
/// used by a framework since destructed.
pub fn is_known_framework(framework_index: u16) -> bool {
    frameworks()
        .get(&framework_index)
        .map(|w| w.upgrade().is_some())
        .unwrap_or(false)
}
