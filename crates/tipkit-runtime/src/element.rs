#![forbid(unsafe_code)]

//! The host-managed component interface.
//!
//! A custom element is a plain struct implementing [`CustomElement`]. The
//! [`crate::Host`] owns one boxed instance per upgraded element node and
//! calls its capability methods at fixed points:
//!
//! | Method | When |
//! |---|---|
//! | [`CustomElement::constructed`] | once, right after the instance is created |
//! | [`CustomElement::connected`] | each time the node becomes connected |
//! | [`CustomElement::disconnected`] | each time the node stops being connected |
//! | [`CustomElement::attribute_changed`] | an observed attribute was set or removed |
//! | [`CustomElement::handle_event`] | a listener owned by the node fired |
//!
//! All methods have empty defaults so an element only implements what it
//! reacts to. None of them can fail: an element that cannot do its work
//! simply does nothing.

use std::any::Any;

use tipkit_dom::{Document, HandlerId, ListenerKey, NodeId, PointerEvent};

/// Everything an element may touch while one of its reactions runs.
///
/// Tree mutations made through the context are applied directly to the
/// [`Document`]; they do not trigger nested reactions on other elements.
#[derive(Debug)]
pub struct ElementContext<'a> {
    host: NodeId,
    document: &'a mut Document,
}

impl<'a> ElementContext<'a> {
    /// Context for `host`. The [`crate::Host`] builds these for every
    /// reaction; building one directly drives an element without a host.
    pub fn new(host: NodeId, document: &'a mut Document) -> Self {
        Self { host, document }
    }

    /// The element node this instance is attached to.
    #[must_use]
    pub const fn host(&self) -> NodeId {
        self.host
    }

    #[must_use]
    pub fn document(&self) -> &Document {
        self.document
    }

    pub fn document_mut(&mut self) -> &mut Document {
        self.document
    }

    /// Attribute of the host element.
    #[must_use]
    pub fn get_attribute(&self, name: &str) -> Option<&str> {
        self.document.get_attribute(self.host, name)
    }

    /// Listener key routing `handler` back to this element.
    #[must_use]
    pub const fn listener(&self, handler: HandlerId) -> ListenerKey {
        ListenerKey {
            owner: self.host,
            handler,
        }
    }
}

/// A component driven by a [`crate::Host`].
pub trait CustomElement: Any {
    /// Build internal structure. Runs once per instance.
    fn constructed(&mut self, cx: &mut ElementContext<'_>) {
        let _ = cx;
    }

    /// The host node was inserted into the live document.
    fn connected(&mut self, cx: &mut ElementContext<'_>) {
        let _ = cx;
    }

    /// The host node was removed from the live document.
    fn disconnected(&mut self, cx: &mut ElementContext<'_>) {
        let _ = cx;
    }

    /// An observed attribute changed. `old` and `new` may be equal.
    fn attribute_changed(
        &mut self,
        cx: &mut ElementContext<'_>,
        name: &str,
        old: Option<&str>,
        new: Option<&str>,
    ) {
        let _ = (cx, name, old, new);
    }

    /// A listener bound with [`ElementContext::listener`] fired.
    fn handle_event(&mut self, cx: &mut ElementContext<'_>, handler: HandlerId, event: PointerEvent) {
        let _ = (cx, handler, event);
    }

    /// Upcast for typed inspection through [`crate::Host::element`].
    fn as_any(&self) -> &dyn Any;

    /// Mutable upcast for [`crate::Host::element_mut`].
    fn as_any_mut(&mut self) -> &mut dyn Any;
}
