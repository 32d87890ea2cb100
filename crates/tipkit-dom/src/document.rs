#![forbid(unsafe_code)]

//! Arena-backed document tree.
//!
//! Every node lives in one [`Document`] and is addressed by a [`NodeId`].
//! Nodes are never freed: removing a node only detaches it, so ids stay
//! valid for the lifetime of the document and can be re-inserted later.
//!
//! Shadow roots hang off their host through a side link rather than the
//! child list, which keeps light-tree queries from crossing into
//! encapsulated markup.

use smallvec::SmallVec;

use crate::error::DomError;
use crate::event::{ListenerKey, ListenerTable, PointerEventKind};
use crate::selector::Compound;

/// Opaque handle to a node in a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    /// Arena slot of this node.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Whether a shadow root can be reached from outside through its host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShadowRootMode {
    /// Reachable through [`Document::shadow_root`].
    #[default]
    Open,
    /// Only reachable through the handle returned by [`Document::attach_shadow`].
    Closed,
}

/// What a node is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    /// The document root. Exactly one per document.
    Document,
    /// An element with a lowercase tag name and ordered attributes.
    Element(ElementData),
    /// A run of text.
    Text(String),
    /// An isolated subtree attached to `host`.
    ShadowRoot { host: NodeId, mode: ShadowRootMode },
}

/// Tag and attributes of an element node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementData {
    tag: String,
    attributes: Vec<(String, String)>,
}

impl ElementData {
    /// Lowercase tag name.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn get(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: SmallVec<[NodeId; 4]>,
    shadow_root: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: SmallVec::new(),
            shadow_root: None,
        }
    }
}

/// A document: the node arena plus the pointer listener table.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    listeners: ListenerTable,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only its root.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![NodeData::new(NodeKind::Document)],
            listeners: ListenerTable::default(),
        }
    }

    /// The document root.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Number of nodes ever created, attached or not.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists from construction.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every node id in creation order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Whether `id` belongs to this document.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.index() < self.nodes.len()
    }

    fn node(&self, id: NodeId) -> Result<&NodeData, DomError> {
        self.nodes.get(id.index()).ok_or(DomError::UnknownNode(id))
    }

    fn node_mut(&mut self, id: NodeId) -> Result<&mut NodeData, DomError> {
        self.nodes
            .get_mut(id.index())
            .ok_or(DomError::UnknownNode(id))
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(NodeData::new(kind));
        id
    }

    // ── Creation ────────────────────────────────────────────────────────

    /// Create a detached element. The tag is lowercased.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.push(NodeKind::Element(ElementData {
            tag: tag.to_ascii_lowercase(),
            attributes: Vec::new(),
        }))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, text: impl Into<String>) -> NodeId {
        self.push(NodeKind::Text(text.into()))
    }

    // ── Node inspection ─────────────────────────────────────────────────

    /// Kind of `id`, or `None` for a foreign id.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.index()).map(|n| &n.kind)
    }

    /// Tag name when `id` is an element.
    #[must_use]
    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match self.kind(id) {
            Some(NodeKind::Element(data)) => Some(data.tag()),
            _ => None,
        }
    }

    /// Element data when `id` is an element.
    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id) {
            Some(NodeKind::Element(data)) => Some(data),
            _ => None,
        }
    }

    /// Whether `id` is an element.
    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        self.element(id).is_some()
    }

    /// Tree parent. Shadow roots have no parent; see [`Self::shadow_host`].
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.index()).and_then(|n| n.parent)
    }

    /// Direct children in order. Empty for foreign ids.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.index())
            .map_or(&[][..], |n| n.children.as_slice())
    }

    /// Parent, or the host when `id` is a shadow root.
    #[must_use]
    pub fn parent_or_host(&self, id: NodeId) -> Option<NodeId> {
        match self.kind(id) {
            Some(NodeKind::ShadowRoot { host, .. }) => Some(*host),
            Some(_) => self.parent(id),
            None => None,
        }
    }

    /// Topmost node reached by following parents: the document root, a
    /// shadow root, or a detached subtree's top.
    #[must_use]
    pub fn tree_root(&self, id: NodeId) -> NodeId {
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            current = parent;
        }
        current
    }

    /// Whether `id` is reachable from the document root, crossing from
    /// shadow roots into their hosts.
    #[must_use]
    pub fn is_connected(&self, id: NodeId) -> bool {
        if !self.contains(id) {
            return false;
        }
        let mut current = id;
        while let Some(next) = self.parent_or_host(current) {
            current = next;
        }
        current == self.root()
    }

    /// Whether `ancestor` is `node` or one of its shadow-including ancestors.
    #[must_use]
    pub fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent_or_host(id);
        }
        false
    }

    /// Inclusive pre-order walk of the light tree under `id`.
    #[must_use]
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            if !self.contains(next) {
                continue;
            }
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Inclusive shadow-including pre-order walk: each host is followed by
    /// its shadow tree, then its light children.
    #[must_use]
    pub fn shadow_including_subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            let Some(data) = self.nodes.get(next.index()) else {
                continue;
            };
            out.push(next);
            stack.extend(data.children.iter().rev().copied());
            if let Some(shadow) = data.shadow_root {
                stack.push(shadow);
            }
        }
        out
    }

    // ── Mutation ────────────────────────────────────────────────────────

    /// Check that `child` may be appended to `parent` without mutating.
    pub fn validate_insert(&self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        let parent_kind = &self.node(parent)?.kind;
        let child_kind = &self.node(child)?.kind;
        let reject = |reason| DomError::HierarchyRequest {
            parent,
            child,
            reason,
        };
        if matches!(parent_kind, NodeKind::Text(_)) {
            return Err(reject("text nodes cannot have children"));
        }
        if matches!(
            child_kind,
            NodeKind::Document | NodeKind::ShadowRoot { .. }
        ) {
            return Err(reject("roots cannot be inserted"));
        }
        if self.is_inclusive_ancestor(child, parent) {
            return Err(reject("insertion would create a cycle"));
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`, detaching it from its
    /// previous parent first.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.validate_insert(parent, child)?;
        self.detach(child);
        self.node_mut(child)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(child);
        Ok(())
    }

    /// Remove `child` from `parent`.
    pub fn remove_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), DomError> {
        self.node(child)?;
        let data = self.node_mut(parent)?;
        let Some(pos) = data.children.iter().position(|&c| c == child) else {
            return Err(DomError::NotAChild { parent, child });
        };
        data.children.remove(pos);
        self.node_mut(child)?.parent = None;
        Ok(())
    }

    /// Detach `id` from wherever it is. No-op when already detached.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            let _ = self.remove_child(parent, id);
        }
    }

    // ── Attributes ──────────────────────────────────────────────────────

    /// Attribute value. Names are matched ASCII-case-insensitively.
    #[must_use]
    pub fn get_attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)?.get(&name.to_ascii_lowercase())
    }

    /// Set an attribute, returning the previous value.
    pub fn set_attribute(
        &mut self,
        id: NodeId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<Option<String>, DomError> {
        let name = name.to_ascii_lowercase();
        let value = value.into();
        let NodeKind::Element(data) = &mut self.node_mut(id)?.kind else {
            return Err(DomError::NotAnElement(id));
        };
        match data.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => Ok(Some(std::mem::replace(slot, value))),
            None => {
                data.attributes.push((name, value));
                Ok(None)
            }
        }
    }

    /// Remove an attribute, returning its value if it was present.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Result<Option<String>, DomError> {
        let name = name.to_ascii_lowercase();
        let NodeKind::Element(data) = &mut self.node_mut(id)?.kind else {
            return Err(DomError::NotAnElement(id));
        };
        let pos = data.attributes.iter().position(|(n, _)| *n == name);
        Ok(pos.map(|pos| data.attributes.remove(pos).1))
    }

    /// Class tokens of an element.
    pub fn classes(&self, id: NodeId) -> impl Iterator<Item = &str> {
        self.get_attribute(id, "class")
            .unwrap_or_default()
            .split_ascii_whitespace()
    }

    /// Whether an element carries the class token.
    #[must_use]
    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.classes(id).any(|c| c == class)
    }

    // ── Text ────────────────────────────────────────────────────────────

    /// Concatenated text of `id` and its light-tree descendants.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        self.subtree(id)
            .into_iter()
            .filter_map(|n| match self.kind(n) {
                Some(NodeKind::Text(text)) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace the children of `id` with a single text node. An empty string
    /// leaves `id` childless. On a text node the text itself is replaced.
    pub fn set_text_content(&mut self, id: NodeId, text: &str) -> Result<(), DomError> {
        if let NodeKind::Text(existing) = &mut self.node_mut(id)?.kind {
            text.clone_into(existing);
            return Ok(());
        }
        let old = std::mem::take(&mut self.node_mut(id)?.children);
        for child in old {
            self.node_mut(child)?.parent = None;
        }
        if !text.is_empty() {
            let node = self.create_text(text);
            self.append_child(id, node)?;
        }
        Ok(())
    }

    // ── Shadow trees ────────────────────────────────────────────────────

    /// Attach a shadow root to `host` and return its handle.
    pub fn attach_shadow(&mut self, host: NodeId, mode: ShadowRootMode) -> Result<NodeId, DomError> {
        let data = self.node(host)?;
        if !matches!(data.kind, NodeKind::Element(_)) {
            return Err(DomError::NotAnElement(host));
        }
        if data.shadow_root.is_some() {
            return Err(DomError::ShadowAlreadyAttached(host));
        }
        let root = self.push(NodeKind::ShadowRoot { host, mode });
        self.node_mut(host)?.shadow_root = Some(root);
        Ok(root)
    }

    /// Open shadow root of `host`. Closed roots are not returned.
    #[must_use]
    pub fn shadow_root(&self, host: NodeId) -> Option<NodeId> {
        let root = self.nodes.get(host.index())?.shadow_root?;
        match self.kind(root) {
            Some(NodeKind::ShadowRoot {
                mode: ShadowRootMode::Open,
                ..
            }) => Some(root),
            _ => None,
        }
    }

    /// Shadow root of `host` regardless of mode. Crate-internal so that the
    /// cascade can see closed trees without exposing them.
    pub(crate) fn any_shadow_root(&self, host: NodeId) -> Option<NodeId> {
        self.nodes.get(host.index())?.shadow_root
    }

    /// Host of a shadow root.
    #[must_use]
    pub fn shadow_host(&self, root: NodeId) -> Option<NodeId> {
        match self.kind(root) {
            Some(NodeKind::ShadowRoot { host, .. }) => Some(*host),
            _ => None,
        }
    }

    /// Whether `id` lives inside some shadow tree.
    #[must_use]
    pub fn is_in_shadow_tree(&self, id: NodeId) -> bool {
        self.shadow_host(self.tree_root(id)).is_some()
    }

    /// The slot a light-tree child of a shadow host is projected into.
    ///
    /// Only the default (first) slot of the host's shadow tree is
    /// considered; named slots are not modelled.
    #[must_use]
    pub fn assigned_slot(&self, id: NodeId) -> Option<NodeId> {
        if !matches!(self.kind(id)?, NodeKind::Element(_) | NodeKind::Text(_)) {
            return None;
        }
        let host = self.parent(id)?;
        let shadow = self.any_shadow_root(host)?;
        self.subtree(shadow)
            .into_iter()
            .find(|&n| self.tag(n) == Some("slot"))
    }

    /// Nodes rendered at `slot`: the host's light children when it has any,
    /// otherwise the slot's own fallback children.
    #[must_use]
    pub fn assigned_nodes(&self, slot: NodeId) -> Vec<NodeId> {
        let projected: Vec<NodeId> = self
            .shadow_host(self.tree_root(slot))
            .map(|host| {
                self.children(host)
                    .iter()
                    .copied()
                    .filter(|&c| self.assigned_slot(c) == Some(slot))
                    .collect()
            })
            .unwrap_or_default();
        if projected.is_empty() {
            self.children(slot).to_vec()
        } else {
            projected
        }
    }

    /// Parent in the rendered (flat) tree: slotted nodes hang off their slot
    /// and shadow-tree top-level nodes off the host.
    #[must_use]
    pub fn flat_tree_parent(&self, id: NodeId) -> Option<NodeId> {
        if let Some(slot) = self.assigned_slot(id) {
            return Some(slot);
        }
        let parent = self.parent(id)?;
        Some(self.shadow_host(parent).unwrap_or(parent))
    }

    // ── Queries ─────────────────────────────────────────────────────────

    /// First element under `scope` (exclusive) matching `selector`, in tree
    /// order. Does not cross into nested shadow roots.
    pub fn query_selector(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, DomError> {
        let compound = Compound::parse(selector)?;
        Ok(self
            .subtree(scope)
            .into_iter()
            .skip(1)
            .find(|&n| compound.matches(self, n)))
    }

    /// All elements under `scope` (exclusive) matching `selector`.
    pub fn query_selector_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, DomError> {
        let compound = Compound::parse(selector)?;
        Ok(self
            .subtree(scope)
            .into_iter()
            .skip(1)
            .filter(|&n| compound.matches(self, n))
            .collect())
    }

    // ── Listeners ───────────────────────────────────────────────────────

    /// Bind `key` to `kind` events on `target`. Binding the same key twice
    /// is ignored.
    pub fn add_listener(
        &mut self,
        target: NodeId,
        kind: PointerEventKind,
        key: ListenerKey,
    ) -> Result<(), DomError> {
        self.node(target)?;
        self.listeners.add(target, kind, key);
        Ok(())
    }

    /// Unbind `key`. Returns false when it was not bound.
    pub fn remove_listener(&mut self, target: NodeId, kind: PointerEventKind, key: ListenerKey) -> bool {
        self.listeners.remove(target, kind, key)
    }

    /// Listeners bound on `target` for `kind`, in registration order.
    #[must_use]
    pub fn listeners(&self, target: NodeId, kind: PointerEventKind) -> &[ListenerKey] {
        self.listeners.get(target, kind)
    }

    /// Total number of bound listeners across the document.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}
