//! Theron: an in-process Actor Model runtime.
//!
//! A [`Framework`] owns a mailbox [`directory`], a two-tier [`queue`], a
//! dynamic [`pool`] of worker threads, and the caching [`alloc`]ator that
//! backs every message [`Envelope`]. Actors are represented only by a
//! [`HandlerTable`] registered against a packed [`Address`] — this crate
//! has no actor base type or supervision tree of its own (see
//! `SPEC_FULL.md` Non-goals); it is the dispatch substrate those sit on
//! top of.
//!
//! ```no_run
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//! use theron::{ActorContext, Address, Envelope, Framework, FrameworkParams, HandlerTable, TypeTag};
//!
//! struct Echo(Arc<AtomicU32>);
//!
//! impl HandlerTable for Echo {
//!     fn handle(&mut self, envelope: &Envelope, _ctx: &ActorContext<'_>) -> bool {
//!         if envelope.type_tag() == TypeTag::of::<u32>() {
//!             self.0.store(unsafe { *envelope.payload::<u32>() }, Ordering::SeqCst);
//!             true
//!         } else {
//!             false
//!         }
//!     }
//! }
//!
//! let framework = Framework::new(FrameworkParams::builder().build().unwrap()).unwrap();
//! let seen = Arc::new(AtomicU32::new(0));
//! let (address, _handle) = framework
//!     .register_actor(Box::new(Echo(seen)), None, Some("echo".into()))
//!     .unwrap();
//! framework.send(Address::NULL, address, 42u32);
//! ```

pub mod alloc;
pub mod directory;
pub mod framework;
pub mod mailbox;
pub mod message;
pub mod monitoring;
pub mod pool;
pub mod queue;
pub mod util;

pub use directory::DirectoryError;
pub use framework::{ActorHandle, ConfigError, Framework, FrameworkBuilder, FrameworkError, FrameworkParams};
pub use mailbox::Mailbox;
pub use message::{ActorContext, Envelope, FallbackHandler, HandlerTable, TypeTag};
pub use monitoring::{FrameworkEvent, InMemoryMonitor, Monitor, NoopMonitor, Severity};
pub use queue::Counter;
pub use util::{Address, AddressError};
