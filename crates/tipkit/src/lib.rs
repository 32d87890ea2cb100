#![forbid(unsafe_code)]

//! tipkit public facade crate.
//!
//! Re-exports the document model, the custom element runtime and the widget
//! set, plus a prelude for embedding hosts.

// --- Document re-exports ---------------------------------------------------

pub use tipkit_dom::{
    ComputedStyle, Document, DomError, HandlerId, ListenerKey, NodeId, PointerEvent,
    PointerEventKind, ShadowRootMode, computed_style,
};

// --- Runtime re-exports ----------------------------------------------------

pub use tipkit_runtime::{
    CustomElement, DEFAULT_REACTION_CAPACITY, ElementContext, ElementDefinition, ElementRegistry,
    Host, HostError, Reaction, ReactionKind, RegistryError,
};

// --- Widget re-exports -----------------------------------------------------

pub use tipkit_widgets::{ConfigError, TooltipConfig, TooltipWidget};

// --- Errors ---------------------------------------------------------------

/// Top-level error type for tipkit hosts.
pub type Error = HostError;

/// Standard result type for tipkit APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// Create a host with every bundled widget defined under its default name.
pub fn host_with_widgets() -> Result<Host> {
    let mut host = Host::new();
    tipkit_widgets::tooltip::define(&mut host)?;
    Ok(host)
}

// --- Prelude --------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        CustomElement, Document, Error, Host, NodeId, PointerEventKind, Result, TooltipConfig,
        TooltipWidget, host_with_widgets,
    };

    pub use crate::{dom, runtime, widgets};
}

pub use tipkit_dom as dom;
pub use tipkit_runtime as runtime;
pub use tipkit_widgets as widgets;

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn bundled_host_knows_the_tooltip() {
        let host = host_with_widgets().unwrap();
        assert!(host.registry().is_defined(widgets::tooltip::TOOLTIP_TAG));
    }
}
