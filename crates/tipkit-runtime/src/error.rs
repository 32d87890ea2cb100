#![forbid(unsafe_code)]

use thiserror::Error;

use tipkit_dom::DomError;

/// Custom element definition failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// The name is not a valid custom element name.
    #[error("{name:?} is not a valid custom element name: {reason}")]
    InvalidName { name: String, reason: &'static str },
    /// The name is already defined in this registry.
    #[error("custom element {0:?} is already defined")]
    DuplicateDefinition(String),
    /// The definition's own settings cannot produce a working element.
    #[error("custom element {name:?} rejected: {reason}")]
    InvalidDefinition { name: String, reason: String },
}

/// Errors surfaced by [`crate::Host`] operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error(transparent)]
    Dom(#[from] DomError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Standard result type for host operations.
pub type Result<T> = std::result::Result<T, HostError>;
