// Layer 1: Standard library imports
// (none)

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
use crate::alloc::AllocError;
use crate::directory::DirectoryError;
use crate::util::Address;

/// Errors surfaced by [`super::Framework`] (spec.md §7).
///
/// `send`/`tail_send` keep spec.md §6's public `bool` contract — internally
/// they call the fallible paths this enum describes and convert any error
/// into `false` plus (where spec.md §7 calls for it) a fallback-handler
/// invocation. `register_actor` surfaces its error directly, since spec.md
/// §7 says the caller "must not proceed" on `RegistrationExhausted`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FrameworkError {
    /// The directory's index space is full (spec.md §7
    /// `RegistrationExhausted`).
    #[error("actor registration exhausted: {0}")]
    RegistrationExhausted(DirectoryError),

    /// No mailbox is registered at the destination address, and no
    /// foreign framework or receiver claimed it either (spec.md §7
    /// `UnknownDestination`).
    #[error("no mailbox registered at address {0}")]
    UnknownDestination(Address),

    /// The message-envelope allocator was exhausted (spec.md §7
    /// `AllocationExhausted`).
    #[error("message allocation failed: {0}")]
    AllocationExhausted(#[from] AllocError),

    /// The framework is shutting down and rejects new registrations
    /// (spec.md §4.9 step 1).
    #[error("framework is shutting down")]
    ShuttingDown,

    /// A thread-count control method was called with an out-of-range
    /// value (spec.md §4.5 "clamp target_threads to [1,
    /// MAX_THREADS_PER_FRAMEWORK]").
    #[error("thread count {requested} is out of range [{min}, {max}]")]
    InvalidThreadCount { requested: u32, min: u32, max: u32 },

    /// The process-wide 12-bit framework index space is exhausted
    /// (spec.md §3 `Address` layout).
    #[error("framework index space exhausted")]
    FrameworkIndexExhausted,

    /// `deregister_actor` was called on a handle whose entry still has
    /// outstanding references or pending messages (spec.md §6
    /// "only valid when ref_count is zero").
    #[error("actor at {0} is not yet quiescent")]
    NotQuiescent(Address),

    /// `register_receiver` was called with the process-wide receiver
    /// table already at its configured `max_receivers` capacity
    /// (spec.md §6 `MAX_RECEIVERS`).
    #[error("receiver table exhausted (capacity {0})")]
    ReceiverTableExhausted(u32),
}

impl FrameworkError {
    /// Transient conditions a retry of the same call might clear (e.g. the
    /// allocator cache momentarily exhausted under load).
    pub fn is_transient(&self) -> bool {
        matches!(self, FrameworkError::AllocationExhausted(_))
    }

    /// Conditions that will never succeed without a different call
    /// (wrong address, wrong parameters).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            FrameworkError::UnknownDestination(_)
                | FrameworkError::InvalidThreadCount { .. }
                | FrameworkError::RegistrationExhausted(_)
                | FrameworkError::FrameworkIndexExhausted
                | FrameworkError::ReceiverTableExhausted(_)
        )
    }

    /// Whether the caller can reasonably retry (possibly after backing
    /// off), as opposed to needing to change what it is asking for.
    pub fn is_recoverable(&self) -> bool {
        self.is_transient() || matches!(self, FrameworkError::ShuttingDown)
    }
}
