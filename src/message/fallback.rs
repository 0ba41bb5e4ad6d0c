// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::envelope::Envelope;
use crate::util::Address;

/// Per-framework handler invoked for undelivered or unmatched messages
/// (spec.md §6). Two forms are supported, matching the source:
///
/// - [`FallbackHandler::SenderOnly`] — invoked when no mailbox exists at
///   the destination at all (spec.md §4.6 step 6); only the sender is
///   known at that point.
/// - [`FallbackHandler::SenderAndPayload`] — invoked when a mailbox and
///   actor were found but no handler matched the envelope's type tag
///   (spec.md §4.7 step 7, §7 `UnhandledMessageType`).
///
/// Replacing the handler is synchronized (spec.md §9 "Open Questions"
/// flags the source as doing no locking here; this crate closes that gap
/// with a `parking_lot::RwLock` around the handler slot — see
/// `Framework::set_fallback_handler`).
pub enum FallbackHandler {
    /// Invoked with only the sender's address.
    SenderOnly(Box<dyn Fn(Address) + Send + Sync>),
    /// Invoked with the sender's address plus the undelivered payload's
    /// raw bytes.
    SenderAndPayload(Box<dyn Fn(Address, &[u8]) + Send + Sync>),
}

impl FallbackHandler {
    /// Invoke the handler for an envelope that had no destination mailbox.
    pub fn invoke_undeliverable(&self, sender: Address) {
        match self {
            FallbackHandler::SenderOnly(f) => f(sender),
            FallbackHandler::SenderAndPayload(f) => f(sender, &[]),
        }
    }

    /// Invoke the handler for an envelope whose type tag matched no
    /// registered handler.
    pub fn invoke_unhandled(&self, envelope: &Envelope) {
        match self {
            FallbackHandler::SenderOnly(f) => f(envelope.sender()),
            FallbackHandler::SenderAndPayload(f) => f(envelope.sender(), envelope.payload_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alloc::LocalCache;
    use crate::message::TypeTag;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::sync::Arc;

    #[test]
    fn sender_only_receives_address() {
        let seen = Arc::new(AtomicU64::new(0));
        let seen2 = Arc::clone(&seen);
        let handler = FallbackHandler::SenderOnly(Box::new(move |addr| {
            seen2.store(addr.raw(), Ordering::SeqCst);
        }));
        let sender = Address::local(3, 9).unwrap();
        handler.invoke_undeliverable(sender);
        assert_eq!(seen.load(Ordering::SeqCst), sender.raw());
    }

    #[test]
    fn sender_and_payload_receives_bytes() {
        let seen_len = Arc::new(AtomicU64::new(0));
        let seen_len2 = Arc::clone(&seen_len);
        let handler = FallbackHandler::SenderAndPayload(Box::new(move |_addr, bytes| {
            seen_len2.store(bytes.len() as u64, Ordering::SeqCst);
        }));

        let cache = LocalCache::with_defaults();
        let sender = Address::local(1, 1).unwrap();
        let envelope = Envelope::new(&cache, TypeTag::of::<u64>(), sender, 7u64).unwrap();
        handler.invoke_unhandled(&envelope);
        assert_eq!(seen_len.load(Ordering::SeqCst), std::mem::size_of::<u64>() as u64);
        envelope.destroy(&cache);
    }
}
