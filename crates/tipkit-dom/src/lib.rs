#![forbid(unsafe_code)]

//! Document model for tipkit components.
//!
//! # Role in tipkit
//! `tipkit-dom` is the tree layer. It owns nodes, attributes, shadow roots
//! and slot projection, the pointer listener table, and a shadow-aware CSS
//! cascade. It runs no component code: lifecycle reactions are the job of
//! `tipkit-runtime`, which drives a [`Document`] on behalf of registered
//! custom elements.
//!
//! # Primary responsibilities
//! - **Document**: arena of nodes addressed by [`NodeId`].
//! - **Shadow trees**: [`Document::attach_shadow`] with open/closed modes and
//!   default-slot projection.
//! - **Listeners**: [`ListenerKey`] bindings per target and
//!   [`PointerEventKind`].
//! - **Styles**: [`css::StyleSheet`] parsing and [`style::computed_style`].

pub mod css;
pub mod document;
pub mod error;
pub mod event;
pub mod selector;
pub mod style;

pub use document::{Document, ElementData, NodeId, NodeKind, ShadowRootMode};
pub use error::{CssError, DomError, SelectorError};
pub use event::{HandlerId, ListenerKey, PointerEvent, PointerEventKind};
pub use style::{ComputedStyle, computed_style};
