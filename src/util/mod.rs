//! Utility types shared across the runtime: the packed [`Address`]
//! identifier used by every mailbox/receiver/actor reference.

pub mod address;

pub use address::{Address, AddressError};
