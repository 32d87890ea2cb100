#![forbid(unsafe_code)]

//! Stylesheet parsing.
//!
//! Accepts the subset of CSS a shadow-scoped component stylesheet needs:
//! flat rule lists with comma-separated selectors, block comments, and
//! `prop: value;` declarations. Selectors are compound selectors or one of
//! the shadow pseudo functions `:host`, `:host(..)`, `:host-context(..)`
//! and `::slotted(..)`.

use crate::error::CssError;
use crate::selector::Compound;

/// One selector of a rule's selector list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// Matches elements of the tree the stylesheet lives in.
    Plain(Compound),
    /// `:host` / `:host(compound)`: the shadow host itself.
    Host(Option<Compound>),
    /// `:host-context(compound)`: the host when it or an ancestor matches.
    HostContext(Compound),
    /// `::slotted(compound)`: light-tree elements projected into a slot.
    Slotted(Compound),
}

/// `property: value`. Property names are lowercased unless custom (`--*`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub property: String,
    pub value: String,
}

impl Declaration {
    /// Whether this declares a custom property.
    #[must_use]
    pub fn is_custom(&self) -> bool {
        self.property.starts_with("--")
    }
}

/// A selector list and its declaration block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleRule {
    pub selectors: Vec<Selector>,
    pub declarations: Vec<Declaration>,
}

/// Parsed stylesheet: rules in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleSheet {
    rules: Vec<StyleRule>,
}

impl StyleSheet {
    /// Parse stylesheet text.
    pub fn parse(text: &str) -> Result<Self, CssError> {
        let source = strip_comments(text)?;
        let mut rules = Vec::new();
        let mut pos = 0;

        loop {
            pos = skip_ws(&source, pos);
            if pos >= source.len() {
                break;
            }
            let open = source[pos..]
                .find(['{', '}'])
                .map(|i| pos + i)
                .ok_or(CssError::UnexpectedEof {
                    offset: source.len(),
                })?;
            if source.as_bytes()[open] == b'}' {
                return Err(CssError::UnexpectedChar {
                    offset: open,
                    found: '}',
                });
            }
            let selectors = parse_selector_list(&source[pos..open], pos)?;

            let body_start = open + 1;
            let close = source[body_start..]
                .find(['{', '}'])
                .map(|i| body_start + i)
                .ok_or(CssError::UnexpectedEof {
                    offset: source.len(),
                })?;
            if source.as_bytes()[close] == b'{' {
                return Err(CssError::UnexpectedChar {
                    offset: close,
                    found: '{',
                });
            }
            let declarations = parse_declarations_at(&source[body_start..close], body_start)?;

            rules.push(StyleRule {
                selectors,
                declarations,
            });
            pos = close + 1;
        }

        Ok(Self { rules })
    }

    /// Rules in source order.
    #[must_use]
    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }
}

/// Parse a declaration block body, e.g. an inline `style` attribute.
pub fn parse_declarations(text: &str) -> Result<Vec<Declaration>, CssError> {
    let source = strip_comments(text)?;
    parse_declarations_at(&source, 0)
}

fn skip_ws(source: &str, pos: usize) -> usize {
    source[pos..]
        .find(|c: char| !c.is_whitespace())
        .map_or(source.len(), |i| pos + i)
}

/// Replace each comment with spaces of equal byte length so offsets survive.
fn strip_comments(text: &str) -> Result<String, CssError> {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("/*") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("*/") else {
            return Err(CssError::UnexpectedEof {
                offset: text.len(),
            });
        };
        let comment_len = 2 + end + 2;
        out.extend(std::iter::repeat_n(' ', comment_len));
        rest = &rest[start + comment_len..];
    }
    out.push_str(rest);
    Ok(out)
}

fn parse_selector_list(text: &str, base: usize) -> Result<Vec<Selector>, CssError> {
    let mut selectors = Vec::new();
    let mut offset = base;
    for part in text.split(',') {
        selectors.push(parse_selector(part, offset)?);
        offset += part.len() + 1;
    }
    Ok(selectors)
}

fn parse_selector(text: &str, offset: usize) -> Result<Selector, CssError> {
    let trimmed = text.trim();
    let invalid = || CssError::InvalidSelector {
        offset,
        text: trimmed.to_owned(),
    };
    let compound = |inner: &str| Compound::parse(inner).map_err(|_| invalid());

    if let Some(inner) = function_arg(trimmed, "::slotted") {
        return Ok(Selector::Slotted(compound(inner)?));
    }
    if let Some(inner) = function_arg(trimmed, ":host-context") {
        return Ok(Selector::HostContext(compound(inner)?));
    }
    if let Some(inner) = function_arg(trimmed, ":host") {
        return Ok(Selector::Host(Some(compound(inner)?)));
    }
    if trimmed == ":host" {
        return Ok(Selector::Host(None));
    }
    Ok(Selector::Plain(compound(trimmed)?))
}

fn function_arg<'a>(text: &'a str, name: &str) -> Option<&'a str> {
    text.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')
}

fn parse_declarations_at(text: &str, base: usize) -> Result<Vec<Declaration>, CssError> {
    let mut declarations = Vec::new();
    let mut offset = base;
    for part in text.split(';') {
        let part_offset = offset;
        offset += part.len() + 1;
        if part.trim().is_empty() {
            continue;
        }
        let invalid = || CssError::InvalidDeclaration {
            offset: part_offset,
            text: part.trim().to_owned(),
        };
        let (property, value) = part.split_once(':').ok_or_else(invalid)?;
        let property = property.trim();
        let value = value.trim();
        if property.is_empty()
            || value.is_empty()
            || !property
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(invalid());
        }
        let property = if property.starts_with("--") {
            property.to_owned()
        } else {
            property.to_ascii_lowercase()
        };
        declarations.push(Declaration {
            property,
            value: value.to_owned(),
        });
    }
    Ok(declarations)
}
