#![forbid(unsafe_code)]

//! Compound selectors: `*`, `tag`, `.class`, `tag.class.other`.
//!
//! Combinators, attribute selectors and pseudo-classes are out of scope;
//! shadow-scoped pseudo functions are handled by [`crate::css`].

use crate::Document;
use crate::NodeId;
use crate::error::SelectorError;

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compound {
    tag: Option<String>,
    classes: Vec<String>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

/// Whether `text` is usable as a tag or class name in a compound selector.
#[must_use]
pub fn is_ident(text: &str) -> bool {
    !text.is_empty() && text.chars().all(is_ident_char)
}

impl Compound {
    /// The universal selector.
    #[must_use]
    pub const fn universal() -> Self {
        Self {
            tag: None,
            classes: Vec::new(),
        }
    }

    /// Parse selector text. Surrounding whitespace is ignored.
    pub fn parse(text: &str) -> Result<Self, SelectorError> {
        let trimmed = text.trim();
        let lead = text.len() - text.trim_start().len();
        let fail = |at: usize| SelectorError {
            text: text.to_owned(),
            offset: lead + at,
        };
        if trimmed.is_empty() {
            return Err(fail(0));
        }

        let mut selector = Self::universal();
        let mut rest = trimmed;
        let mut pos = 0;

        if let Some(after) = rest.strip_prefix('*') {
            rest = after;
            pos += 1;
        } else if !rest.starts_with('.') {
            let len = rest.find(|c| !is_ident_char(c)).unwrap_or(rest.len());
            if len == 0 {
                return Err(fail(pos));
            }
            selector.tag = Some(rest[..len].to_ascii_lowercase());
            rest = &rest[len..];
            pos += len;
        }

        while !rest.is_empty() {
            let Some(after) = rest.strip_prefix('.') else {
                return Err(fail(pos));
            };
            let len = after.find(|c| !is_ident_char(c)).unwrap_or(after.len());
            if len == 0 {
                return Err(fail(pos + 1));
            }
            selector.classes.push(after[..len].to_owned());
            rest = &after[len..];
            pos += 1 + len;
        }

        Ok(selector)
    }

    /// Required tag, if any.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Required class tokens.
    #[must_use]
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Whether the element `node` satisfies this selector. Non-elements
    /// never match.
    #[must_use]
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        let Some(tag) = doc.tag(node) else {
            return false;
        };
        if self.tag.as_deref().is_some_and(|want| want != tag) {
            return false;
        }
        self.classes.iter().all(|class| doc.has_class(node, class))
    }
}
