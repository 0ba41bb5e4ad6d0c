//! Size-classed free-list pool shared by [`super::LocalCache`] and
//! [`super::SharedCache`].

// Layer 1: Standard library imports
use std::alloc::{self, Layout};
use std::ptr::NonNull;

// Layer 2: Third-party crate imports
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

/// Default minimum block size/alignment (spec.md §6
/// `CACHELINE_ALIGNMENT`), used when a cache is built outside a
/// [`crate::Framework`] (tests, benches, demos) rather than from
/// [`crate::FrameworkParams`].
pub const CACHELINE_ALIGNMENT: usize = 64;

/// Default maximum number of distinct size classes a pool tracks
/// (spec.md §6 `MAX_POOLS`).
pub const MAX_POOLS: usize = 32;

/// Default maximum number of blocks cached per size class (spec.md §6
/// `MAX_BLOCKS`).
pub const MAX_BLOCKS: usize = 128;

/// Allocation failure: the wrapped global allocator returned null.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("allocation of {size} bytes (align {align}) failed")]
pub struct AllocError {
    pub size: usize,
    pub align: usize,
}

/// Round `size` up to the nearest multiple of `cacheline_alignment`, with
/// a floor of one cache line.
pub fn round_up(size: usize, cacheline_alignment: usize) -> usize {
    let size = size.max(1);
    size.div_ceil(cacheline_alignment) * cacheline_alignment
}

struct SizeClass {
    size: usize,
    blocks: Vec<NonNull<u8>>,
}

/// A bounded, size-classed free-list cache over the global allocator.
///
/// Up to `max_pools` size classes are tracked, each holding up to
/// `max_blocks` freed blocks. Classes are kept ordered most-recently-used
/// first: a cache hit at index `i` swaps the class to index `i - 1`; a
/// miss that needs a fresh class overwrites the tail class (flushing its
/// blocks back to the global allocator first). This approximates LRU
/// eviction over size classes without the bookkeeping of true LRU.
///
/// `BlockPool` itself holds no lock — [`super::LocalCache`] wraps it for
/// exclusive single-thread use, [`super::SharedCache`] wraps it in a
/// `parking_lot::Mutex`. `max_pools`/`max_blocks`/`cacheline_alignment` are
/// construction-time knobs (spec.md §6 `MAX_POOLS`/`MAX_BLOCKS`/
/// `CACHELINE_ALIGNMENT`, surfaced on [`crate::FrameworkParams`]).
pub struct BlockPool {
    classes: Vec<SizeClass>,
    max_pools: usize,
    max_blocks: usize,
    cacheline_alignment: usize,
}

impl BlockPool {
    /// An empty pool with no size classes yet established.
    pub fn new(max_pools: usize, max_blocks: usize, cacheline_alignment: usize) -> Self {
        Self {
            classes: Vec::with_capacity(max_pools),
            max_pools,
            max_blocks,
            cacheline_alignment,
        }
    }

    /// An empty pool using the crate's default bounds, for call sites with
    /// no [`crate::FrameworkParams`] to draw from.
    pub fn with_defaults() -> Self {
        Self::new(MAX_POOLS, MAX_BLOCKS, CACHELINE_ALIGNMENT)
    }

    /// The minimum alignment this pool rounds every request up to.
    pub fn cacheline_alignment(&self) -> usize {
        self.cacheline_alignment
    }

    /// Allocate a block of at least `size` bytes, `align`-aligned.
    ///
    /// Rounds the request to a cache-line class first, so a cache entry
    /// satisfies any request whose rounded size matches, regardless of the
    /// caller's exact `size`.
    pub fn allocate(&mut self, size: usize, align: usize) -> Result<NonNull<u8>, AllocError> {
        let rounded = round_up(size, self.cacheline_alignment);
        let align = align.max(self.cacheline_alignment);

        if let Some(index) = self.classes.iter().position(|c| c.size == rounded) {
            if let Some(block) = self.classes[index].blocks.pop() {
                self.move_toward_front(index);
                return Ok(block);
            }
            // Class exists but is empty: fall through to a fresh allocation,
            // still registered so future frees land in this class.
            self.move_toward_front(index);
        } else {
            self.register_class(rounded);
        }

        self.allocate_fresh(rounded, align)
    }

    /// Return a block to the pool, or straight to the global allocator if
    /// `size` does not round to a class this pool tracks, or the matching
    /// class is already at capacity.
    ///
    /// # Safety
    ///
    /// See [`super::BlockAllocator::free`].
    pub unsafe fn free(&mut self, ptr: NonNull<u8>, size: usize, align: usize) {
        let rounded = round_up(size, self.cacheline_alignment);
        let align = align.max(self.cacheline_alignment);

        if let Some(index) = self.classes.iter().position(|c| c.size == rounded) {
            if self.classes[index].blocks.len() < self.max_blocks {
                self.classes[index].blocks.push(ptr);
                return;
            }
        }

        // Unknown size class, or the class is saturated: fall back to the
        // wrapped allocator's plain free (spec.md §4.1 contract).
        let layout = Self::layout_for(rounded, align);
        alloc::dealloc(ptr.as_ptr(), layout);
    }

    /// Drain every cached block back to the global allocator. Used on
    /// framework shutdown (spec.md §4.9) to leave no memory owned by the
    /// cache once workers have joined.
    pub fn drain(&mut self) {
        let cacheline_alignment = self.cacheline_alignment;
        for class in self.classes.drain(..) {
            let layout = Self::layout_for(class.size, cacheline_alignment);
            for block in class.blocks {
                // SAFETY: every block in `blocks` was allocated with this
                // class's size/alignment and has not been freed elsewhere.
                unsafe { alloc::dealloc(block.as_ptr(), layout) };
            }
        }
    }

    /// Total blocks currently cached across all size classes.
    pub fn cached_block_count(&self) -> usize {
        self.classes.iter().map(|c| c.blocks.len()).sum()
    }

    fn register_class(&mut self, rounded: usize) {
        if self.classes.len() < self.max_pools {
            self.classes.push(SizeClass {
                size: rounded,
                blocks: Vec::new(),
            });
            return;
        }

        // Pool table full: evict the tail (least-recently-used) class,
        // flushing its cached blocks to the global allocator first.
        if let Some(mut tail) = self.classes.pop() {
            let layout = Self::layout_for(tail.size, self.cacheline_alignment);
            for block in tail.blocks.drain(..) {
                // SAFETY: blocks in this class were allocated at this layout.
                unsafe { alloc::dealloc(block.as_ptr(), layout) };
            }
        }
        self.classes.push(SizeClass {
            size: rounded,
            blocks: Vec::new(),
        });
    }

    fn move_toward_front(&mut self, index: usize) {
        if index > 0 {
            self.classes.swap(index, index - 1);
        }
    }

    fn allocate_fresh(&self, size: usize, align: usize) -> Result<NonNull<u8>, AllocError> {
        let layout = Self::layout_for(size, align);
        // SAFETY: layout has non-zero size (round_up floors at one cache
        // line) and a valid power-of-two alignment.
        let raw = unsafe { alloc::alloc(layout) };
        NonNull::new(raw).ok_or(AllocError { size, align })
    }

    fn layout_for(size: usize, align: usize) -> Layout {
        // `round_up`/`max` upstream guarantee a valid, non-zero, power-of-two
        // aligned layout; `unwrap_or_else` only matters for pathological
        // manual construction that never occurs in this module.
        Layout::from_size_align(size, align)
            .unwrap_or_else(|_| Layout::from_size_align(size, CACHELINE_ALIGNMENT).unwrap())
    }
}

impl Default for BlockPool {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl Drop for BlockPool {
    fn drop(&mut self) {
        self.drain();
    }
}
