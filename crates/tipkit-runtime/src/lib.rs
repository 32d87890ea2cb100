#![forbid(unsafe_code)]

//! `tipkit-runtime` drives custom elements living in a `tipkit-dom`
//! [`Document`](tipkit_dom::Document).
//!
//! Design goals:
//! - **Host-driven**: the embedding environment calls [`Host`] methods for
//!   tree mutations, attribute edits and pointer events.
//! - **Synchronous**: every reaction completes before the call that caused
//!   it returns. There are no threads, timers or queues.
//! - **Small interface**: components implement [`CustomElement`]; the
//!   registry maps tag names to [`ElementDefinition`]s.

pub mod element;
pub mod error;
pub mod host;
pub mod reaction;
pub mod registry;

pub use element::{CustomElement, ElementContext};
pub use error::{HostError, RegistryError, Result};
pub use host::{DEFAULT_REACTION_CAPACITY, Host};
pub use reaction::{Reaction, ReactionKind};
pub use registry::{ElementDefinition, ElementRegistry, validate_name};
