#![forbid(unsafe_code)]

//! Shadow-aware cascade.
//!
//! [`computed_style`] resolves the declared properties of a node from, in
//! increasing precedence:
//!
//! 1. inherited values from the flat-tree parent,
//! 2. `:host` rules of the node's own shadow root,
//! 3. `::slotted()` rules of the shadow tree the node is projected into,
//! 4. plain rules of the tree the node lives in (ordered by specificity,
//!    then source order),
//! 5. the inline `style` attribute.
//!
//! Rules never cross tree boundaries any other way, which is what keeps a
//! component's markup styles from leaking into the page and vice versa.

use std::collections::BTreeMap;

use crate::css::{Declaration, Selector, StyleSheet, parse_declarations};
use crate::document::NodeKind;
use crate::{Document, NodeId};

/// Properties that flow from parent to child when not declared.
#[must_use]
pub fn is_inherited(property: &str) -> bool {
    property.starts_with("--")
        || matches!(
            property,
            "color" | "font-size" | "font-family" | "font-weight" | "visibility"
        )
}

/// Resolved property values for one node.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComputedStyle {
    properties: BTreeMap<String, String>,
}

impl ComputedStyle {
    /// Value of `property`, custom properties included.
    #[must_use]
    pub fn get(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(String::as_str)
    }

    /// All resolved properties, sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.properties
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    fn inherit_from(parent: &Self) -> Self {
        Self {
            properties: parent
                .properties
                .iter()
                .filter(|(k, _)| is_inherited(k))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
        }
    }

    fn apply(&mut self, decl: &Declaration, parent: &Self) {
        let value = decl.value.trim();
        let resolved = if value.eq_ignore_ascii_case("inherit") {
            parent.get(&decl.property).map(str::to_owned)
        } else {
            match resolve_vars(value, self) {
                Some(v) => Some(v),
                // Invalid at computed-value time: behaves like `unset`.
                None if is_inherited(&decl.property) => {
                    parent.get(&decl.property).map(str::to_owned)
                }
                None => None,
            }
        };
        match resolved {
            Some(v) => {
                self.properties.insert(decl.property.clone(), v);
            }
            None => {
                self.properties.remove(&decl.property);
            }
        }
    }
}

/// Compute the style of `node`. Non-element nodes only inherit.
#[must_use]
pub fn computed_style(doc: &Document, node: NodeId) -> ComputedStyle {
    let parent = doc
        .flat_tree_parent(node)
        .filter(|&p| doc.is_element(p))
        .map(|p| computed_style(doc, p))
        .unwrap_or_default();
    let mut style = ComputedStyle::inherit_from(&parent);
    if !doc.is_element(node) {
        return style;
    }

    let declarations = matched_declarations(doc, node);
    for decl in declarations.iter().filter(|d| d.is_custom()) {
        style.apply(decl, &parent);
    }
    for decl in declarations.iter().filter(|d| !d.is_custom()) {
        style.apply(decl, &parent);
    }
    style
}

/// Parsed `<style>` elements under `scope` in tree order. Unparseable
/// sheets are dropped, as a browser would.
fn sheets_in(doc: &Document, scope: NodeId) -> Vec<StyleSheet> {
    doc.subtree(scope)
        .into_iter()
        .filter(|&n| doc.tag(n) == Some("style"))
        .filter_map(|n| match StyleSheet::parse(&doc.text_content(n)) {
            Ok(sheet) => Some(sheet),
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(node = n.index(), error = %_err, "ignoring unparseable stylesheet");
                None
            }
        })
        .collect()
}

fn matched_declarations(doc: &Document, node: NodeId) -> Vec<Declaration> {
    let mut out = Vec::new();

    if let Some(shadow) = doc.any_shadow_root(node) {
        for sheet in sheets_in(doc, shadow) {
            for rule in sheet.rules() {
                let hit = rule.selectors.iter().any(|sel| match sel {
                    Selector::Host(None) => true,
                    Selector::Host(Some(c)) => c.matches(doc, node),
                    Selector::HostContext(c) => {
                        let mut current = Some(node);
                        std::iter::from_fn(|| {
                            let id = current?;
                            current = doc.parent_or_host(id);
                            Some(id)
                        })
                        .any(|a| c.matches(doc, a))
                    }
                    _ => false,
                });
                if hit {
                    out.extend(rule.declarations.iter().cloned());
                }
            }
        }
    }

    if let Some(slot) = doc.assigned_slot(node) {
        for sheet in sheets_in(doc, doc.tree_root(slot)) {
            for rule in sheet.rules() {
                let hit = rule
                    .selectors
                    .iter()
                    .any(|sel| matches!(sel, Selector::Slotted(c) if c.matches(doc, node)));
                if hit {
                    out.extend(rule.declarations.iter().cloned());
                }
            }
        }
    }

    let root = doc.tree_root(node);
    if matches!(
        doc.kind(root),
        Some(NodeKind::Document | NodeKind::ShadowRoot { .. })
    ) {
        let mut plain: Vec<((usize, bool), &Declaration)> = Vec::new();
        let sheets = sheets_in(doc, root);
        for rule in sheets.iter().flat_map(StyleSheet::rules) {
            let specificity = rule
                .selectors
                .iter()
                .filter_map(|sel| match sel {
                    Selector::Plain(c) if c.matches(doc, node) => {
                        Some((c.classes().len(), c.tag().is_some()))
                    }
                    _ => None,
                })
                .max();
            if let Some(specificity) = specificity {
                plain.extend(rule.declarations.iter().map(|d| (specificity, d)));
            }
        }
        plain.sort_by_key(|(specificity, _)| *specificity);
        out.extend(plain.into_iter().map(|(_, d)| d.clone()));
    }

    if let Some(Ok(declarations)) = doc.get_attribute(node, "style").map(parse_declarations) {
        out.extend(declarations);
    }

    out
}

/// Substitute every `var(--name[, fallback])` in `value`. `None` when a
/// reference is undefined and has no fallback.
fn resolve_vars(value: &str, style: &ComputedStyle) -> Option<String> {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("var(") {
        out.push_str(&rest[..start]);
        let args_start = start + 4;
        let close = args_start + matching_paren(&rest[args_start..])?;
        let args = &rest[args_start..close];
        let (name, fallback) = match args.split_once(',') {
            Some((name, fallback)) => (name.trim(), Some(fallback.trim())),
            None => (args.trim(), None),
        };
        if !name.starts_with("--") {
            return None;
        }
        match style.get(name) {
            Some(v) => out.push_str(v),
            None => out.push_str(&resolve_vars(fallback?, style)?),
        }
        rest = &rest[close + 1..];
    }
    out.push_str(rest);
    Some(out)
}

fn matching_paren(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '(' => depth += 1,
            ')' if depth == 0 => return Some(i),
            ')' => depth -= 1,
            _ => {}
        }
    }
    None
}
