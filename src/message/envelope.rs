// Layer 1: Standard library imports
use std::fmt::{self, Debug};
use std::mem;
use std::ptr::NonNull;

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
use super::tag::TypeTag;
use crate::alloc::{AllocError, BlockAllocator};
use crate::util::Address;

/// A heap cell combining a [`TypeTag`], the sender's [`Address`], a
/// size/alignment descriptor, and the payload bytes (spec.md §3, §4.6).
///
/// `Envelope` owns its payload: it is created by [`Envelope::new`] from the
/// sender's value (playing the role of spec.md's `CopyConstructInto`
/// callback via an ordinary move into the allocated block) and destroyed
/// exactly once by [`Envelope::destroy`], which runs the payload's
/// destructor and returns the block to an allocator.
///
/// An `Envelope` is not `Clone`: ownership transfers from sender to
/// mailbox to the dispatching worker, mirroring spec.md's "destroyed
/// exactly once, by the worker that dequeued it."
pub struct Envelope {
    type_tag: TypeTag,
    sender: Address,
    size: usize,
    align: usize,
    payload: NonNull<u8>,
    drop_in_place: unsafe fn(NonNull<u8>),
}

// SAFETY: `Envelope` is handed between worker threads by design (that is
// the entire point of the mailbox/work-queue machinery); the payload type
// it was constructed from is required to be `Send` by `Envelope::new`.
unsafe impl Send for Envelope {}

impl Envelope {
    /// Allocate an envelope for `value`, tagged `type_tag`, attributed to
    /// `sender`, using `allocator` (spec.md §4.6 steps 2-5).
    ///
    /// # Errors
    ///
    /// Returns [`AllocError`] if the allocator is exhausted; the caller
    /// (the `send` path) surfaces this as a `false` return (spec.md §7).
    pub fn new<T: Send + 'static>(
        allocator: &dyn BlockAllocator,
        type_tag: TypeTag,
        sender: Address,
        value: T,
    ) -> Result<Self, AllocError> {
        let size = mem::size_of::<T>();
        let align = mem::align_of::<T>().max(allocator.min_alignment());
        let block = allocator.allocate(size, align)?;

        // SAFETY: `block` is a fresh allocation of at least `size` bytes,
        // `align`-aligned, not yet holding a live `T`.
        unsafe { block.as_ptr().cast::<T>().write(value) };

        Ok(Envelope {
            type_tag,
            sender,
            size,
            align,
            payload: block,
            drop_in_place: drop_glue::<T>,
        })
    }

    /// The envelope's type tag.
    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// The address that originated this message.
    pub fn sender(&self) -> Address {
        self.sender
    }

    /// Payload size in bytes, as supplied at construction.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Payload alignment in bytes (at least the cache-line size).
    pub fn alignment(&self) -> usize {
        self.align
    }

    /// Borrow the payload as `T`.
    ///
    /// # Safety
    ///
    /// The caller must know (typically via [`Self::type_tag`] matching
    /// `TypeTag::of::<T>()`) that this envelope was constructed with
    /// `Envelope::new::<T>`.
    pub unsafe fn payload<T>(&self) -> &T {
        &*self.payload.as_ptr().cast::<T>()
    }

    /// Read the payload out of the envelope without running its
    /// destructor, consuming the envelope's ownership of it.
    ///
    /// # Safety
    ///
    /// Same requirement as [`Self::payload`]. After this call the caller
    /// owns the value; the envelope must still be destroyed to release its
    /// backing block, but must not drop the payload again.
    pub unsafe fn take_payload<T>(&mut self) -> T {
        self.payload.as_ptr().cast::<T>().read()
    }

    /// Raw payload bytes, for the fallback handler's "sender + payload
    /// bytes" form (spec.md §6).
    pub fn payload_bytes(&self) -> &[u8] {
        // SAFETY: the block was allocated with at least `self.size` bytes.
        unsafe { std::slice::from_raw_parts(self.payload.as_ptr(), self.size) }
    }

    /// Run the payload's destructor and return the block to `allocator`.
    ///
    /// Consumes `self`: an envelope must be destroyed exactly once
    /// (spec.md invariant 3). `allocator` need not be the exact cache
    /// instance that produced the block — the caching allocator's
    /// size-class rounding means any cache backed by the same global
    /// allocator accepts the block back, which is how the dispatcher can
    /// free with its own worker-local cache regardless of which thread
    /// sent the message.
    pub fn destroy(self, allocator: &dyn BlockAllocator) {
        // SAFETY: `self.payload` holds a live `T` matching `drop_in_place`'s
        // monomorphization, not yet dropped.
        unsafe {
            (self.drop_in_place)(self.payload);
            allocator.free(self.payload, self.size, self.align);
        }
    }
}

impl Debug for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Envelope")
            .field("type_tag", &self.type_tag)
            .field("sender", &self.sender)
            .field("size", &self.size)
            .field("alignment", &self.align)
            .finish()
    }
}

unsafe fn drop_glue<T>(ptr: NonNull<u8>) {
    // SAFETY: called only from `Envelope::destroy`, on a block holding a
    // live, not-yet-dropped `T` written by `Envelope::new::<T>`.
    std::ptr::drop_in_place(ptr.as_ptr().cast::<T>());
}
