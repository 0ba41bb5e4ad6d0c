// Layer 1: Standard library imports
use std::ptr::NonNull;

// Layer 2: Third-party crate imports
use parking_lot::Mutex;

// Layer 3: Internal module imports
use super::pool::{AllocError, BlockPool};
use super::BlockAllocator;

/// `parking_lot::Mutex`-guarded caching allocator shared across threads that
/// do not each own a [`super::LocalCache`] — client code and actor
/// constructors sending from outside a worker.
///
/// Hold time is a single push or pop against the pool, short enough that
/// `parking_lot`'s uncontended fast path behaves like the spinlock spec.md
/// calls for around the shared cache.
pub struct SharedCache {
    pool: Mutex<BlockPool>,
}

impl SharedCache {
    /// An empty cache with no size classes established yet, bounded by
    /// `max_pools`/`max_blocks`/`cacheline_alignment` (spec.md §6,
    /// surfaced on [`crate::FrameworkParams`]).
    pub fn new(max_pools: usize, max_blocks: usize, cacheline_alignment: usize) -> Self {
        Self {
            pool: Mutex::new(BlockPool::new(max_pools, max_blocks, cacheline_alignment)),
        }
    }

    /// An empty cache using the crate's default bounds, for call sites with
    /// no [`crate::FrameworkParams`] to draw from.
    pub fn with_defaults() -> Self {
        Self {
            pool: Mutex::new(BlockPool::with_defaults()),
        }
    }

    /// Total blocks currently cached.
    pub fn cached_block_count(&self) -> usize {
        self.pool.lock().cached_block_count()
    }
}

impl Default for SharedCache {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl BlockAllocator for SharedCache {
    fn allocate(&self, size: usize, align: usize) -> Result<NonNull<u8>, AllocError> {
        self.pool.lock().allocate(size, align)
    }

    unsafe fn free(&self, ptr: NonNull<u8>, size: usize, align: usize) {
        self.pool.lock().free(ptr, size, align)
    }

    fn min_alignment(&self) -> usize {
        self.pool.lock().cacheline_alignment()
    }
}

// SAFETY: all access to the underlying `BlockPool` is mediated by the
// `Mutex`; raw pointers it hands out are never dereferenced by `SharedCache`
// itself.
unsafe impl Send for SharedCache {}
unsafe impl Sync for SharedCache {}
