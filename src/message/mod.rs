//! Message envelopes and the handler-table boundary (spec.md §3, §4.6, §6).
//!
//! Per-type serialization and the user-visible actor base type are
//! deliberately out of scope (spec.md §1): this module only consumes a
//! [`TypeTag`] opaque value and exposes the external [`HandlerTable`] /
//! [`ActorContext`] interfaces the dispatch loop calls into.

pub mod envelope;
pub mod fallback;
pub mod handler;
pub mod tag;

pub use envelope::Envelope;
pub use fallback::FallbackHandler;
pub use handler::{ActorContext, HandlerTable};
pub use tag::TypeTag;
