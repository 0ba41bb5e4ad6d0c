//! Small-block caching allocator (spec.md §4.1).
//!
//! Every send path needs a fast way to get a block of heap memory sized for
//! a [`crate::message::Envelope`], and to give it back once the dispatcher
//! has destroyed the payload. Going to the global allocator on every
//! message is measurable overhead at millions of messages/sec, so this
//! module wraps the global allocator with a small, bounded, size-classed
//! free-list cache.
//!
//! Two flavors share the same [`BlockPool`] core:
//!
//! - [`LocalCache`] — unsynchronized, owned by exactly one worker thread;
//!   the hot path when the sender is running inside a worker.
//! - [`SharedCache`] — `parking_lot::Mutex`-guarded, used by sends from
//!   non-worker threads (client code, actor constructors running on the
//!   caller's thread). Hold time is one push/pop, short enough that
//!   `parking_lot`'s uncontended fast path behaves like the spinlock
//!   spec.md calls for.

pub mod pool;

mod local;
mod shared;

pub use local::LocalCache;
pub use pool::{AllocError, BlockPool, CACHELINE_ALIGNMENT, MAX_BLOCKS, MAX_POOLS};
pub use shared::SharedCache;

use std::ptr::NonNull;

/// Common interface implemented by [`LocalCache`] and [`SharedCache`].
///
/// `free` requires the caller to re-supply the size the block was
/// allocated with (spec.md §4.1); sizes the cache never classified are
/// handed straight back to the global allocator.
pub trait BlockAllocator {
    /// Allocate at least `size` bytes, `align`-aligned (the caller rounds
    /// neither; the cache rounds internally to its cache-line classes).
    fn allocate(&self, size: usize, align: usize) -> Result<NonNull<u8>, AllocError>;

    /// Return a block of `size` bytes (the size it was allocated with) to
    /// the cache, or to the global allocator on a cache miss/unknown size.
    ///
    /// # Safety
    ///
    /// `ptr` must have been produced by a prior `allocate(size, align)`
    /// call on this cache (or on a cache backed by the same global
    /// allocator) and must not be freed more than once.
    unsafe fn free(&self, ptr: NonNull<u8>, size: usize, align: usize);

    /// The minimum alignment this cache rounds every request up to
    /// (spec.md §6 `CACHELINE_ALIGNMENT`, as configured on
    /// [`crate::FrameworkParams`] for the cache that built this instance).
    fn min_alignment(&self) -> usize;
}
