#![forbid(unsafe_code)]

//! Custom element definitions keyed by tag name.
//!
//! One registry belongs to one document context. A name can be defined once;
//! redefinition fails with [`RegistryError::DuplicateDefinition`].

use std::fmt;

use ahash::AHashMap;

use crate::element::CustomElement;
use crate::error::RegistryError;

/// Names reserved by the HTML standard even though they contain a hyphen.
const RESERVED_NAMES: [&str; 8] = [
    "annotation-xml",
    "color-profile",
    "font-face",
    "font-face-src",
    "font-face-uri",
    "font-face-format",
    "font-face-name",
    "missing-glyph",
];

type Constructor = Box<dyn Fn() -> Box<dyn CustomElement>>;

/// How to build an element and which attributes it observes.
pub struct ElementDefinition {
    constructor: Constructor,
    observed_attributes: Vec<String>,
}

impl ElementDefinition {
    /// Definition observing no attributes.
    pub fn new<F>(constructor: F) -> Self
    where
        F: Fn() -> Box<dyn CustomElement> + 'static,
    {
        Self {
            constructor: Box::new(constructor),
            observed_attributes: Vec::new(),
        }
    }

    /// Add an observed attribute. Names are lowercased.
    #[must_use]
    pub fn observe(mut self, attribute: &str) -> Self {
        let attribute = attribute.to_ascii_lowercase();
        if !self.observed_attributes.contains(&attribute) {
            self.observed_attributes.push(attribute);
        }
        self
    }

    /// Attributes whose changes are reported to instances.
    #[must_use]
    pub fn observed_attributes(&self) -> &[String] {
        &self.observed_attributes
    }

    /// Whether changes to `attribute` are reported.
    #[must_use]
    pub fn observes(&self, attribute: &str) -> bool {
        self.observed_attributes
            .iter()
            .any(|a| a.eq_ignore_ascii_case(attribute))
    }

    pub(crate) fn construct(&self) -> Box<dyn CustomElement> {
        (self.constructor)()
    }
}

impl fmt::Debug for ElementDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementDefinition")
            .field("observed_attributes", &self.observed_attributes)
            .finish_non_exhaustive()
    }
}

/// Check `name` against the custom element naming rules.
pub fn validate_name(name: &str) -> Result<(), RegistryError> {
    let invalid = |reason| RegistryError::InvalidName {
        name: name.to_owned(),
        reason,
    };
    if !name.starts_with(|c: char| c.is_ascii_lowercase()) {
        return Err(invalid("must start with a lowercase ASCII letter"));
    }
    if !name.contains('-') {
        return Err(invalid("must contain a hyphen"));
    }
    if name.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(invalid("must not contain uppercase ASCII letters"));
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || matches!(c, '/' | '>' | '<' | '='))
    {
        return Err(invalid("contains a character not allowed in tag names"));
    }
    if RESERVED_NAMES.contains(&name) {
        return Err(invalid("name is reserved"));
    }
    Ok(())
}

/// Definitions for one document context.
#[derive(Debug, Default)]
pub struct ElementRegistry {
    definitions: AHashMap<String, ElementDefinition>,
    order: Vec<String>,
}

impl ElementRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Define `name`. Fails on invalid or already-defined names.
    pub fn define(&mut self, name: &str, definition: ElementDefinition) -> Result<(), RegistryError> {
        validate_name(name)?;
        if self.definitions.contains_key(name) {
            return Err(RegistryError::DuplicateDefinition(name.to_owned()));
        }
        self.definitions.insert(name.to_owned(), definition);
        self.order.push(name.to_owned());
        Ok(())
    }

    #[must_use]
    pub fn is_defined(&self, name: &str) -> bool {
        self.definitions.contains_key(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ElementDefinition> {
        self.definitions.get(name)
    }

    /// Defined names in definition order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.order
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::any::Any;

    struct Inert;

    impl CustomElement for Inert {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }
    }

    fn inert() -> ElementDefinition {
        ElementDefinition::new(|| Box::new(Inert))
    }

    #[test]
    fn define_once() {
        let mut registry = ElementRegistry::new();
        registry.define("my-tooltip", inert()).unwrap();
        assert!(registry.is_defined("my-tooltip"));
        assert_eq!(
            registry.define("my-tooltip", inert()),
            Err(RegistryError::DuplicateDefinition("my-tooltip".into()))
        );
        assert_eq!(registry.names(), &["my-tooltip".to_owned()]);
    }

    #[test]
    fn name_rules() {
        for bad in ["tooltip", "My-tooltip", "my-Tooltip", "1-x", "-x", "font-face", "my tip-x"] {
            assert!(
                matches!(validate_name(bad), Err(RegistryError::InvalidName { .. })),
                "{bad:?} should be rejected"
            );
        }
        for good in ["my-tooltip", "x-", "a-b-c", "math-α"] {
            assert!(validate_name(good).is_ok(), "{good:?} should be accepted");
        }
    }

    #[test]
    fn observed_attributes_are_normalized() {
        let def = inert().observe("TooltipText").observe("tooltiptext");
        assert_eq!(def.observed_attributes(), &["tooltiptext".to_owned()]);
        assert!(def.observes("TOOLTIPTEXT"));
        assert!(!def.observes("title"));
    }
}
