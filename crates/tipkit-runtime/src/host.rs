#![forbid(unsafe_code)]

//! Host-driven lifecycle runtime.
//!
//! [`Host`] pairs a [`Document`] with an [`ElementRegistry`] and the live
//! instances of upgraded elements. The embedding environment drives it:
//! every tree mutation that should be visible to components goes through
//! the host so that the matching reactions run synchronously, in tree
//! order, before the call returns.
//!
//! Design goals:
//! - **Deterministic**: reactions run in a fixed order and are recorded in a
//!   sequence-numbered [`Reaction`] log. The log is a rolling window of
//!   [`DEFAULT_REACTION_CAPACITY`] entries unless resized with
//!   [`Host::reaction_capacity`]; a capacity of zero turns it off.
//! - **No closures in the tree**: listeners are [`ListenerKey`]s routed back
//!   to the owning instance, so instances stay exclusively owned here.
//! - **Release on every detach path**: removal and re-parenting both run
//!   `disconnected` for every instance whose connectedness changes. The
//!   document is only lent out read-only, so no tree edit can bypass them.

use std::collections::VecDeque;
use std::fmt;

use ahash::AHashMap;

use tipkit_dom::{Document, ListenerKey, NodeId, PointerEvent, PointerEventKind};

use crate::element::{CustomElement, ElementContext};
use crate::error::Result;
use crate::reaction::{Reaction, ReactionKind};
use crate::registry::{ElementDefinition, ElementRegistry};

/// Reactions kept by a new [`Host`].
pub const DEFAULT_REACTION_CAPACITY: usize = 256;

/// One document context with its custom element registry.
pub struct Host {
    document: Document,
    registry: ElementRegistry,
    instances: AHashMap<NodeId, Box<dyn CustomElement>>,
    reactions: VecDeque<Reaction>,
    reaction_capacity: usize,
    next_sequence: u64,
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("nodes", &self.document.len())
            .field("defined", &self.registry.names())
            .field("instances", &self.instances.len())
            .field("reactions", &self.reactions.len())
            .field("reaction_capacity", &self.reaction_capacity)
            .finish()
    }
}

impl Default for Host {
    fn default() -> Self {
        Self::new()
    }
}

impl Host {
    /// Create a host with an empty document and registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            document: Document::new(),
            registry: ElementRegistry::new(),
            instances: AHashMap::new(),
            reactions: VecDeque::new(),
            reaction_capacity: DEFAULT_REACTION_CAPACITY,
            next_sequence: 0,
        }
    }

    /// Keep at most `capacity` reactions, dropping the oldest first.
    /// Zero disables the log.
    #[must_use]
    pub fn reaction_capacity(mut self, capacity: usize) -> Self {
        self.reaction_capacity = capacity;
        self.trim_reactions();
        self
    }

    /// Read-only view of the tree. Edits go through the host.
    #[must_use]
    pub const fn document(&self) -> &Document {
        &self.document
    }

    #[must_use]
    pub const fn registry(&self) -> &ElementRegistry {
        &self.registry
    }

    /// Define a custom element and upgrade connected elements already using
    /// the name, in shadow-including tree order.
    pub fn define(&mut self, name: &str, definition: ElementDefinition) -> Result<()> {
        self.registry.define(name, definition)?;
        #[cfg(feature = "tracing")]
        tracing::debug!(name, "custom element defined");

        let root = self.document.root();
        for node in self.document.shadow_including_subtree(root) {
            if self.document.tag(node) == Some(name) {
                self.try_upgrade(node);
            }
        }
        Ok(())
    }

    // ── Tree operations ─────────────────────────────────────────────────

    /// Create an element, constructing its instance when the tag is defined.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        let node = self.document.create_element(tag);
        if let Some(definition) = self.document.tag(node).and_then(|t| self.registry.get(t)) {
            self.instances.insert(node, definition.construct());
            self.react(node, ReactionKind::Constructed);
        }
        node
    }

    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.document.create_text(text)
    }

    /// Append `child` to `parent`. Moving a connected node disconnects it
    /// first; landing in the live tree connects (or upgrades) every element
    /// in the moved subtree.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.document.validate_insert(parent, child)?;
        if let Some(old_parent) = self.document.parent(child) {
            self.remove_child(old_parent, child)?;
        }
        self.document.append_child(parent, child)?;
        if self.document.is_connected(child) {
            for node in self.document.shadow_including_subtree(child) {
                if self.instances.contains_key(&node) {
                    self.react(node, ReactionKind::Connected);
                } else {
                    self.try_upgrade(node);
                }
            }
        }
        Ok(())
    }

    /// Remove `child` from `parent`, disconnecting every instance in the
    /// removed subtree if it was live.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        let was_connected = self.document.is_connected(child);
        self.document.remove_child(parent, child)?;
        if was_connected {
            for node in self.document.shadow_including_subtree(child) {
                if self.instances.contains_key(&node) {
                    self.react(node, ReactionKind::Disconnected);
                }
            }
        }
        Ok(())
    }

    /// Replace the children of `node` with a single text node. Removed
    /// children are disconnected like any other removal.
    pub fn set_text_content(&mut self, node: NodeId, text: &str) -> Result<()> {
        let children = self.document.children(node).to_vec();
        for child in children {
            self.remove_child(node, child)?;
        }
        self.document.set_text_content(node, text)?;
        Ok(())
    }

    // ── Attributes ──────────────────────────────────────────────────────

    /// Set an attribute and report it to the element if observed. The
    /// reaction runs even when the value did not change.
    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) -> Result<()> {
        let old = self.document.set_attribute(node, name, value)?;
        self.attribute_changed(node, name, old, Some(value.to_owned()));
        Ok(())
    }

    /// Remove an attribute; reported only if it was present.
    pub fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<()> {
        if let Some(old) = self.document.remove_attribute(node, name)? {
            self.attribute_changed(node, name, Some(old), None);
        }
        Ok(())
    }

    fn attribute_changed(
        &mut self,
        node: NodeId,
        name: &str,
        old: Option<String>,
        new: Option<String>,
    ) {
        if !self.instances.contains_key(&node) || !self.observes(node, name) {
            return;
        }
        self.react(
            node,
            ReactionKind::AttributeChanged {
                name: name.to_ascii_lowercase(),
                old,
                new,
            },
        );
    }

    fn observes(&self, node: NodeId, name: &str) -> bool {
        self.document
            .tag(node)
            .and_then(|tag| self.registry.get(tag))
            .is_some_and(|definition| definition.observes(name))
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Deliver a pointer event to the listeners bound on `target`, in
    /// registration order. A listener unbound by an earlier handler in the
    /// same dispatch is skipped, as is one whose owner is no longer
    /// connected. Returns how many handlers ran.
    pub fn dispatch_pointer(&mut self, target: NodeId, kind: PointerEventKind) -> usize {
        let keys: Vec<ListenerKey> = self.document.listeners(target, kind).to_vec();
        let mut invoked = 0;
        for key in keys {
            let still_bound = self.document.listeners(target, kind).contains(&key);
            if !still_bound
                || !self.instances.contains_key(&key.owner)
                || !self.document.is_connected(key.owner)
            {
                continue;
            }
            self.react(
                key.owner,
                ReactionKind::Event {
                    target,
                    handler: key.handler,
                    kind,
                },
            );
            invoked += 1;
        }
        invoked
    }

    // ── Inspection ──────────────────────────────────────────────────────

    /// Whether `node` has a live instance.
    #[must_use]
    pub fn is_upgraded(&self, node: NodeId) -> bool {
        self.instances.contains_key(&node)
    }

    /// Typed view of the instance at `node`.
    #[must_use]
    pub fn element<T: CustomElement>(&self, node: NodeId) -> Option<&T> {
        self.instances.get(&node)?.as_any().downcast_ref()
    }

    /// Mutable typed view of the instance at `node`.
    pub fn element_mut<T: CustomElement>(&mut self, node: NodeId) -> Option<&mut T> {
        self.instances.get_mut(&node)?.as_any_mut().downcast_mut()
    }

    /// Most recent reactions, oldest first.
    #[must_use]
    pub const fn reactions(&self) -> &VecDeque<Reaction> {
        &self.reactions
    }

    /// Drain the reaction log.
    pub fn take_reactions(&mut self) -> Vec<Reaction> {
        self.reactions.drain(..).collect()
    }

    fn trim_reactions(&mut self) {
        while self.reactions.len() > self.reaction_capacity {
            self.reactions.pop_front();
        }
    }

    // ── Internals ───────────────────────────────────────────────────────

    /// Construct an instance for an element created before its definition.
    fn try_upgrade(&mut self, node: NodeId) {
        if self.instances.contains_key(&node) {
            return;
        }
        let Some(definition) = self.document.tag(node).and_then(|t| self.registry.get(t)) else {
            return;
        };
        let observed: Vec<(String, String)> = definition
            .observed_attributes()
            .iter()
            .filter_map(|name| {
                self.document
                    .get_attribute(node, name)
                    .map(|value| (name.clone(), value.to_owned()))
            })
            .collect();
        self.instances.insert(node, definition.construct());
        self.react(node, ReactionKind::Constructed);
        for (name, value) in observed {
            self.react(
                node,
                ReactionKind::AttributeChanged {
                    name,
                    old: None,
                    new: Some(value),
                },
            );
        }
        if self.document.is_connected(node) {
            self.react(node, ReactionKind::Connected);
        }
    }

    fn react(&mut self, node: NodeId, kind: ReactionKind) {
        let tag = self.document.tag(node).unwrap_or_default().to_owned();
        let Some(element) = self.instances.get_mut(&node) else {
            return;
        };
        let sequence = self.next_sequence;
        self.next_sequence = self.next_sequence.saturating_add(1);

        #[cfg(feature = "tracing")]
        let _span = tracing::debug_span!(
            "element_reaction",
            sequence,
            node = node.index(),
            tag = %tag,
            reaction = kind.label()
        )
        .entered();

        let mut cx = ElementContext::new(node, &mut self.document);
        match &kind {
            ReactionKind::Constructed => element.constructed(&mut cx),
            ReactionKind::Connected => element.connected(&mut cx),
            ReactionKind::Disconnected => element.disconnected(&mut cx),
            ReactionKind::AttributeChanged { name, old, new } => {
                element.attribute_changed(&mut cx, name, old.as_deref(), new.as_deref());
            }
            ReactionKind::Event {
                target,
                handler,
                kind,
            } => element.handle_event(
                &mut cx,
                *handler,
                PointerEvent {
                    kind: *kind,
                    target: *target,
                },
            ),
        }

        if self.reaction_capacity > 0 {
            self.reactions.push_back(Reaction {
                sequence,
                node,
                tag,
                kind,
            });
            self.trim_reactions();
        }
    }
}
