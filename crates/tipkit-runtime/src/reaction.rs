#![forbid(unsafe_code)]

//! Structured record of lifecycle reactions run by a [`crate::Host`].

use tipkit_dom::{HandlerId, NodeId, PointerEventKind};

/// What kind of reaction ran.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReactionKind {
    Constructed,
    Connected,
    Disconnected,
    AttributeChanged {
        name: String,
        old: Option<String>,
        new: Option<String>,
    },
    Event {
        target: NodeId,
        handler: HandlerId,
        kind: PointerEventKind,
    },
}

impl ReactionKind {
    /// Short name used in logs.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Constructed => "constructed",
            Self::Connected => "connected",
            Self::Disconnected => "disconnected",
            Self::AttributeChanged { .. } => "attribute_changed",
            Self::Event { .. } => "event",
        }
    }
}

/// One reaction delivered to one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    /// Monotonic dispatch sequence within the host.
    pub sequence: u64,
    pub node: NodeId,
    pub tag: String,
    pub kind: ReactionKind,
}
