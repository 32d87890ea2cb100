#![forbid(unsafe_code)]

//! Tooltip custom element.
//!
//! [`TooltipWidget`] renders its markup into an open shadow root: a
//! stylesheet, a default slot for the host's own children, and a small icon
//! glyph. Hovering the icon shows a bubble holding the host's
//! `tooltiptext` attribute; leaving it removes the bubble.
//!
//! # Example
//!
//! ```
//! use tipkit_dom::PointerEventKind;
//! use tipkit_runtime::Host;
//! use tipkit_widgets::tooltip::{self, TooltipWidget};
//!
//! let mut host = Host::new();
//! tooltip::define(&mut host).unwrap();
//!
//! let el = host.create_element("my-tooltip");
//! host.set_attribute(el, "tooltiptext", "Hello").unwrap();
//! let root = host.document().root();
//! host.append_child(root, el).unwrap();
//!
//! let widget = host.element::<TooltipWidget>(el).unwrap();
//! let icon = widget.icon().unwrap();
//! host.dispatch_pointer(icon, PointerEventKind::Enter);
//!
//! let widget = host.element::<TooltipWidget>(el).unwrap();
//! let bubble = widget.bubble(host.document()).unwrap();
//! assert_eq!(host.document().text_content(bubble), "Hello");
//! ```
//!
//! # Styling hooks
//!
//! | Hook | Effect |
//! |---|---|
//! | `class="important"` on the host | border, padding and grey background |
//! | host inside a `<p>` | pink text |
//! | `class="highlight"` on a slotted child | background inherited from the slot |
//! | `--color-primary` on the page | bubble background |
//!
//! The bubble's text is copied when it is created. Editing the attribute
//! while the bubble is showing does not touch the rendered text; the next
//! show picks the new value up.

use std::any::Any;
use std::rc::Rc;

use thiserror::Error;
use tipkit_dom::css::StyleSheet;
use tipkit_dom::selector::is_ident;
use tipkit_dom::{
    CssError, Document, DomError, HandlerId, NodeId, PointerEvent, PointerEventKind,
    ShadowRootMode,
};
use tipkit_runtime::{
    CustomElement, ElementContext, ElementDefinition, Host, HostError, RegistryError,
};

/// Default tag name.
pub const TOOLTIP_TAG: &str = "my-tooltip";
/// Default text attribute.
pub const TOOLTIP_TEXT_ATTRIBUTE: &str = "tooltiptext";

const SHOW: HandlerId = HandlerId(0);
const HIDE: HandlerId = HandlerId(1);

/// Why a [`TooltipConfig`] cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A class hook is not a single selector identifier.
    #[error("{field} {value:?} is not a valid class name")]
    InvalidClass { field: &'static str, value: String },
    /// The bubble color is not a `--name` custom property.
    #[error("{0:?} is not a custom property name")]
    InvalidVariable(String),
    #[error("{0:?} is not a valid attribute name")]
    InvalidAttribute(String),
    /// The generated stylesheet was rejected by the parser.
    #[error("generated stylesheet does not parse: {0}")]
    Stylesheet(#[from] CssError),
}

/// Names and literals the tooltip is built from.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TooltipConfig {
    /// Custom element name to register under.
    pub tag_name: String,
    /// Host attribute holding the tooltip text.
    pub text_attribute: String,
    /// Icon content.
    pub icon_glyph: String,
    /// Slot fallback shown when the host has no children.
    pub slot_fallback: String,
    /// Host class switching on the emphasized treatment.
    pub emphasis_class: String,
    /// Slotted-child class receiving the inherited background.
    pub highlight_class: String,
    /// Custom property supplying the bubble background.
    pub bubble_color_var: String,
}

impl Default for TooltipConfig {
    fn default() -> Self {
        Self {
            tag_name: TOOLTIP_TAG.to_owned(),
            text_attribute: TOOLTIP_TEXT_ATTRIBUTE.to_owned(),
            icon_glyph: "\u{a0}(?)".to_owned(),
            slot_fallback: "Some default".to_owned(),
            emphasis_class: "important".to_owned(),
            highlight_class: "highlight".to_owned(),
            bubble_color_var: "--color-primary".to_owned(),
        }
    }
}

impl TooltipConfig {
    /// Set the custom element name.
    #[must_use]
    pub fn tag_name(mut self, name: impl Into<String>) -> Self {
        self.tag_name = name.into();
        self
    }

    /// Set the attribute read for the tooltip text.
    #[must_use]
    pub fn text_attribute(mut self, name: impl Into<String>) -> Self {
        self.text_attribute = name.into();
        self
    }

    /// Set the icon content.
    #[must_use]
    pub fn icon_glyph(mut self, glyph: impl Into<String>) -> Self {
        self.icon_glyph = glyph.into();
        self
    }

    /// Set the text shown when nothing is slotted.
    #[must_use]
    pub fn slot_fallback(mut self, text: impl Into<String>) -> Self {
        self.slot_fallback = text.into();
        self
    }

    /// Set the host class for the emphasized look.
    #[must_use]
    pub fn emphasis_class(mut self, class: impl Into<String>) -> Self {
        self.emphasis_class = class.into();
        self
    }

    /// Set the class that marks highlighted slotted children.
    #[must_use]
    pub fn highlight_class(mut self, class: impl Into<String>) -> Self {
        self.highlight_class = class.into();
        self
    }

    /// Set the custom property read for the bubble background.
    #[must_use]
    pub fn bubble_color_var(mut self, var: impl Into<String>) -> Self {
        self.bubble_color_var = var.into();
        self
    }

    /// Check that every hook is a usable CSS name and that the generated
    /// stylesheet parses.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [
            ("emphasis_class", &self.emphasis_class),
            ("highlight_class", &self.highlight_class),
        ] {
            if !is_ident(value) {
                return Err(ConfigError::InvalidClass {
                    field,
                    value: value.clone(),
                });
            }
        }
        if !self.bubble_color_var.strip_prefix("--").is_some_and(is_ident) {
            return Err(ConfigError::InvalidVariable(self.bubble_color_var.clone()));
        }
        if !is_ident(&self.text_attribute) {
            return Err(ConfigError::InvalidAttribute(self.text_attribute.clone()));
        }
        StyleSheet::parse(&self.stylesheet())?;
        Ok(())
    }

    /// Shadow stylesheet text for this configuration.
    #[must_use]
    pub fn stylesheet(&self) -> String {
        format!(
            ":host(.{emphasis}) {{ border: 1px solid red; padding: 0.15rem; background: grey; }}\n\
             :host-context(p) {{ color: pink; }}\n\
             div {{ color: white; background: var({var}); position: absolute; z-index: 10; }}\n\
             .icon {{ background-color: black; color: white; font-size: 12px; border-radius: 40%; padding: 5px; }}\n\
             ::slotted(.{highlight}) {{ background-color: inherit; }}\n",
            emphasis = self.emphasis_class,
            var = self.bubble_color_var,
            highlight = self.highlight_class,
        )
    }
}

/// The tooltip element.
#[derive(Debug)]
pub struct TooltipWidget {
    config: Rc<TooltipConfig>,
    shadow: Option<NodeId>,
    icon: Option<NodeId>,
    tooltip_text: Option<String>,
    tooltip_visible: bool,
}

impl TooltipWidget {
    /// A fresh, unconstructed instance.
    #[must_use]
    pub fn new(config: Rc<TooltipConfig>) -> Self {
        Self {
            config,
            shadow: None,
            icon: None,
            tooltip_text: None,
            tooltip_visible: false,
        }
    }

    /// Registry definition observing exactly the text attribute.
    #[must_use]
    pub fn definition(config: TooltipConfig) -> ElementDefinition {
        let attribute = config.text_attribute.clone();
        let config = Rc::new(config);
        ElementDefinition::new(move || Box::new(Self::new(Rc::clone(&config))))
            .observe(&attribute)
    }

    #[must_use]
    pub fn config(&self) -> &TooltipConfig {
        &self.config
    }

    /// Text the next bubble will show.
    #[must_use]
    pub fn tooltip_text(&self) -> Option<&str> {
        self.tooltip_text.as_deref()
    }

    /// The shadow root built at construction.
    #[must_use]
    pub const fn shadow_root(&self) -> Option<NodeId> {
        self.shadow
    }

    /// The icon located on the last attachment.
    #[must_use]
    pub const fn icon(&self) -> Option<NodeId> {
        self.icon
    }

    /// The bubble currently in the shadow tree, if any.
    #[must_use]
    pub fn bubble(&self, doc: &Document) -> Option<NodeId> {
        doc.query_selector(self.shadow?, "div").ok().flatten()
    }

    fn build(&mut self, doc: &mut Document, host: NodeId) -> Result<(), DomError> {
        let shadow = doc.attach_shadow(host, ShadowRootMode::Open)?;
        self.shadow = Some(shadow);

        let style = doc.create_element("style");
        doc.set_text_content(style, &self.config.stylesheet())?;
        doc.append_child(shadow, style)?;

        let slot = doc.create_element("slot");
        doc.set_text_content(slot, &self.config.slot_fallback)?;
        doc.append_child(shadow, slot)?;

        let icon = doc.create_element("span");
        doc.set_attribute(icon, "class", "icon")?;
        doc.set_text_content(icon, &self.config.icon_glyph)?;
        doc.append_child(shadow, icon)?;
        Ok(())
    }

    fn bind(&mut self, cx: &mut ElementContext<'_>) -> Result<(), DomError> {
        let Some(shadow) = self.shadow else {
            return Ok(());
        };
        self.icon = cx.document().query_selector(shadow, "span")?;
        let Some(icon) = self.icon else {
            return Ok(());
        };
        let show = cx.listener(SHOW);
        let hide = cx.listener(HIDE);
        let doc = cx.document_mut();
        doc.add_listener(icon, PointerEventKind::Enter, show)?;
        doc.add_listener(icon, PointerEventKind::Leave, hide)?;
        Ok(())
    }

    fn unbind(&self, cx: &mut ElementContext<'_>) {
        let Some(icon) = self.icon else {
            return;
        };
        let show = cx.listener(SHOW);
        let hide = cx.listener(HIDE);
        let doc = cx.document_mut();
        doc.remove_listener(icon, PointerEventKind::Enter, show);
        doc.remove_listener(icon, PointerEventKind::Leave, hide);
    }

    fn render(&self, doc: &mut Document) -> Result<(), DomError> {
        let Some(shadow) = self.shadow else {
            return Ok(());
        };
        let existing = doc.query_selector(shadow, "div")?;
        match (self.tooltip_visible, existing) {
            (true, None) => {
                let bubble = doc.create_element("div");
                doc.set_text_content(bubble, self.tooltip_text().unwrap_or_default())?;
                doc.append_child(shadow, bubble)?;
            }
            (false, Some(bubble)) => doc.remove_child(shadow, bubble)?,
            (true, Some(_)) | (false, None) => {}
        }
        Ok(())
    }

    fn set_visible(&mut self, cx: &mut ElementContext<'_>, visible: bool) {
        self.tooltip_visible = visible;
        #[cfg(feature = "tracing")]
        tracing::trace!(host = cx.host().index(), visible, "tooltip visibility");
        report(self.render(cx.document_mut()), "render");
    }
}

fn report(result: Result<(), DomError>, _stage: &'static str) {
    if let Err(_err) = result {
        #[cfg(feature = "tracing")]
        tracing::warn!(stage = _stage, error = %_err, "tooltip update skipped");
    }
}

impl CustomElement for TooltipWidget {
    fn constructed(&mut self, cx: &mut ElementContext<'_>) {
        let host = cx.host();
        report(self.build(cx.document_mut(), host), "construct");
    }

    fn connected(&mut self, cx: &mut ElementContext<'_>) {
        self.tooltip_text = cx
            .get_attribute(&self.config.text_attribute)
            .map(str::to_owned);
        report(self.bind(cx), "bind");
        report(self.render(cx.document_mut()), "render");
    }

    fn disconnected(&mut self, cx: &mut ElementContext<'_>) {
        #[cfg(feature = "tracing")]
        tracing::debug!(host = cx.host().index(), "disconnected");
        self.unbind(cx);
    }

    fn attribute_changed(
        &mut self,
        _cx: &mut ElementContext<'_>,
        name: &str,
        old: Option<&str>,
        new: Option<&str>,
    ) {
        if old == new {
            return;
        }
        if name.eq_ignore_ascii_case(&self.config.text_attribute) {
            self.tooltip_text = new.map(str::to_owned);
        }
    }

    fn handle_event(&mut self, cx: &mut ElementContext<'_>, handler: HandlerId, _event: PointerEvent) {
        match handler {
            SHOW => self.set_visible(cx, true),
            HIDE => self.set_visible(cx, false),
            _ => {}
        }
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Register the tooltip under [`TOOLTIP_TAG`].
pub fn define(host: &mut Host) -> Result<(), HostError> {
    define_with(host, TooltipConfig::default())
}

/// Register the tooltip with a custom configuration. A configuration that
/// fails [`TooltipConfig::validate`] is rejected with
/// [`RegistryError::InvalidDefinition`].
pub fn define_with(host: &mut Host, config: TooltipConfig) -> Result<(), HostError> {
    let tag = config.tag_name.clone();
    config
        .validate()
        .map_err(|err| RegistryError::InvalidDefinition {
            name: tag.clone(),
            reason: err.to_string(),
        })?;
    host.define(&tag, TooltipWidget::definition(config))
}
