// Layer 1: Standard library imports
use std::any::{Any, TypeId};
use std::fmt::{self, Display};
use std::hash::{Hash, Hasher};

// Layer 2: Third-party crate imports
// (none)

// Layer 3: Internal module imports
// (none)

/// Opaque per-type discriminant attached to every [`super::Envelope`]
/// (spec.md §4.6). The core treats this as an inert value for equality and
/// table lookup; it never inspects the type it names.
///
/// The "CopyConstructInto" callback spec.md §9 asks for per-type messages
/// is handled in this crate by ordinary Rust move/copy semantics: a
/// payload is written into its envelope slot with `ptr::write`, so no
/// separate construction callback is needed. `TypeTag::of::<T>()` derives
/// a stable tag from `T`'s `TypeId` so callers never hand-pick identifiers
/// that could collide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag(u64);

impl TypeTag {
    /// Derive a tag for `T`. Two calls with the same `T` always agree;
    /// calls with different `T` disagree with overwhelming probability
    /// (a 64-bit hash of `std::any::TypeId`).
    pub fn of<T: Any + ?Sized>() -> Self {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        TypeId::of::<T>().hash(&mut hasher);
        TypeTag(hasher.finish())
    }

    /// Build a tag from a raw value. Exposed for handler tables that
    /// prefer to assign their own small dense identifiers instead of
    /// hashing `TypeId`.
    pub const fn from_raw(raw: u64) -> Self {
        TypeTag(raw)
    }

    /// The raw tag value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tag:{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_type_same_tag() {
        assert_eq!(TypeTag::of::<u32>(), TypeTag::of::<u32>());
    }

    #[test]
    fn different_types_different_tags() {
        assert_ne!(TypeTag::of::<u32>(), TypeTag::of::<u64>());
    }

    #[test]
    fn raw_round_trips() {
        let tag = TypeTag::from_raw(42);
        assert_eq!(tag.raw(), 42);
    }
}
