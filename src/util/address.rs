//! Packed 64-bit actor/receiver addresses.
//!
//! # Layout
//!
//! ```text
//! bit   63              48 47              32 31        20 19           0
//!       +-----------------+-----------------+------------+--------------+
//!       |      host:16    |    process:16   | framework:12|   index:20  |
//!       +-----------------+-----------------+------------+--------------+
//! ```
//!
//! The value `0` is the null address. `framework == 0` designates the
//! receiver address space (spec.md §3): indices in that space are resolved
//! against the framework's receiver table rather than its mailbox
//! directory. Addresses are plain `u64` values under the hood — totally
//! ordered, freely copyable, and cheap to hash.

// Layer 1: Standard library imports
use std::fmt::{self, Display};

// Layer 2: Third-party crate imports
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Layer 3: Internal module imports
// (none)

const HOST_BITS: u32 = 16;
const PROCESS_BITS: u32 = 16;
const FRAMEWORK_BITS: u32 = 12;
const INDEX_BITS: u32 = 20;

const INDEX_SHIFT: u32 = 0;
const FRAMEWORK_SHIFT: u32 = INDEX_BITS;
const PROCESS_SHIFT: u32 = INDEX_BITS + FRAMEWORK_BITS;
const HOST_SHIFT: u32 = INDEX_BITS + FRAMEWORK_BITS + PROCESS_BITS;

/// Maximum value an index field may hold (2^20 - 1).
pub const MAX_INDEX: u32 = (1 << INDEX_BITS) - 1;
/// Maximum value a framework field may hold (2^12 - 1).
pub const MAX_FRAMEWORK: u16 = (1 << FRAMEWORK_BITS) - 1;
/// Maximum value the process field may hold (2^16 - 1).
pub const MAX_PROCESS: u16 = u16::MAX >> (16 - PROCESS_BITS);
/// Maximum value the host field may hold (2^16 - 1).
pub const MAX_HOST: u16 = u16::MAX >> (16 - HOST_BITS);

/// Errors constructing an [`Address`] from out-of-range field values.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum AddressError {
    /// `framework` exceeds the 12-bit field width.
    #[error("framework index {0} exceeds the {MAX_FRAMEWORK}-value field width")]
    FrameworkOutOfRange(u16),

    /// `index` exceeds the 20-bit field width.
    #[error("mailbox index {0} exceeds the {MAX_INDEX}-value field width")]
    IndexOutOfRange(u32),
}

/// A packed, value-typed, totally-ordered address identifying either an
/// actor's mailbox or a receiver.
///
/// # Examples
///
/// ```rust
/// use theron::util::Address;
///
/// let a = Address::new(0, 0, 1, 42).unwrap();
/// assert_eq!(a.framework(), 1);
/// assert_eq!(a.index(), 42);
/// assert!(!a.is_null());
/// assert!(!a.is_receiver());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Address(u64);

impl Address {
    /// The null address: matches no mailbox, no receiver.
    pub const NULL: Address = Address(0);

    /// Pack an address from its constituent fields.
    ///
    /// # Errors
    ///
    /// Returns [`AddressError`] if `framework` or `index` do not fit their
    /// packed bit widths.
    pub fn new(host: u16, process: u16, framework: u16, index: u32) -> Result<Self, AddressError> {
        if framework > MAX_FRAMEWORK {
            return Err(AddressError::FrameworkOutOfRange(framework));
        }
        if index > MAX_INDEX {
            return Err(AddressError::IndexOutOfRange(index));
        }

        let packed = ((host as u64) << HOST_SHIFT)
            | ((process as u64) << PROCESS_SHIFT)
            | ((framework as u64) << FRAMEWORK_SHIFT)
            | ((index as u64) << INDEX_SHIFT);
        Ok(Address(packed))
    }

    /// Build an address for a mailbox local to `framework`, using host 0
    /// and process 0 (the common case — no cross-process transport in this
    /// crate; spec.md §1 Non-goals).
    pub fn local(framework: u16, index: u32) -> Result<Self, AddressError> {
        Self::new(0, 0, framework, index)
    }

    /// Build a receiver address: `framework` is fixed to the reserved
    /// receiver slot 0.
    pub fn receiver(index: u32) -> Result<Self, AddressError> {
        Self::new(0, 0, 0, index)
    }

    /// Reconstruct an address from its raw packed representation.
    pub const fn from_raw(raw: u64) -> Self {
        Address(raw)
    }

    /// The raw packed `u64` value.
    pub const fn raw(self) -> u64 {
        self.0
    }

    /// The host field.
    pub const fn host(self) -> u16 {
        ((self.0 >> HOST_SHIFT) & (MAX_HOST as u64)) as u16
    }

    /// The process field.
    pub const fn process(self) -> u16 {
        ((self.0 >> PROCESS_SHIFT) & (MAX_PROCESS as u64)) as u16
    }

    /// The framework field.
    pub const fn framework(self) -> u16 {
        ((self.0 >> FRAMEWORK_SHIFT) & (MAX_FRAMEWORK as u64)) as u16
    }

    /// The mailbox/receiver index field.
    pub const fn index(self) -> u32 {
        ((self.0 >> INDEX_SHIFT) & (MAX_INDEX as u64)) as u32
    }

    /// `true` for the null address.
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    /// `true` when this address names a receiver rather than an actor
    /// (spec.md §3: receivers live in framework slot 0).
    pub const fn is_receiver(self) -> bool {
        !self.is_null() && self.framework() == 0
    }
}

impl Default for Address {
    fn default() -> Self {
        Address::NULL
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            return write!(f, "null");
        }
        write!(
            f,
            "{}:{}:{}:{}",
            self.host(),
            self.process(),
            self.framework(),
            self.index()
        )
    }
}
