#![forbid(unsafe_code)]

//! Error types for tree mutation, selector and stylesheet parsing.

use thiserror::Error;

use crate::NodeId;

/// Tree mutation and query errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomError {
    /// The id does not name a node of this document.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),
    /// `child` is not a direct child of `parent`.
    #[error("{child:?} is not a child of {parent:?}")]
    NotAChild { parent: NodeId, child: NodeId },
    /// The insertion would create a cycle or put a node where it cannot live.
    #[error("cannot insert {child:?} into {parent:?}: {reason}")]
    HierarchyRequest {
        parent: NodeId,
        child: NodeId,
        reason: &'static str,
    },
    /// The element already hosts a shadow root.
    #[error("{0:?} already hosts a shadow root")]
    ShadowAlreadyAttached(NodeId),
    /// The node cannot host a shadow root.
    #[error("{0:?} cannot host a shadow root")]
    NotAnElement(NodeId),
    /// Selector text could not be parsed.
    #[error(transparent)]
    InvalidSelector(#[from] SelectorError),
}

/// Compound selector parse failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid selector {text:?} at byte {offset}")]
pub struct SelectorError {
    /// The selector text as written.
    pub text: String,
    /// Byte offset of the first offending character.
    pub offset: usize,
}

/// Stylesheet parse failure. Offsets are byte positions in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CssError {
    #[error("unexpected end of stylesheet at byte {offset}")]
    UnexpectedEof { offset: usize },
    #[error("unexpected {found:?} at byte {offset}")]
    UnexpectedChar { offset: usize, found: char },
    #[error("invalid selector {text:?} at byte {offset}")]
    InvalidSelector { offset: usize, text: String },
    #[error("invalid declaration {text:?} at byte {offset}")]
    InvalidDeclaration { offset: usize, text: String },
}
