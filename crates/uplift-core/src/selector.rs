//! Compound simple selectors used by widget markers and sub-element lookups.
//!
//! Only the subset the enhancers need is supported: a tag name, `#id`,
//! `.class` and `[attr]` / `[attr=value]` parts combined without any
//! combinators, e.g. `button.accordion__button[aria-controls]`.

use crate::dom::{Document, NodeId};
use std::fmt;
use std::str::FromStr;

/// Errors produced while parsing a selector string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    /// The selector string was empty.
    #[error("empty selector")]
    Empty,
    /// A character that cannot start or continue a selector part.
    #[error("unexpected `{ch}` at offset {offset} in selector `{input}`")]
    Unexpected {
        /// The offending character.
        ch: char,
        /// Byte offset into the input.
        offset: usize,
        /// The full selector string.
        input: String,
    },
    /// An attribute part was opened with `[` but never closed.
    #[error("unterminated attribute selector in `{0}`")]
    Unterminated(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct AttrMatch {
    name: String,
    value: Option<String>,
}

/// A parsed compound selector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
    attrs: Vec<AttrMatch>,
}

fn is_ident(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '-' || ch == '_'
}

impl Selector {
    /// Parse a selector such as `select`, `.combo-box` or `[data-open-modal]`.
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(SelectorError::Empty);
        }

        let mut selector = Selector {
            tag: None,
            id: None,
            classes: Vec::new(),
            attrs: Vec::new(),
        };
        let chars: Vec<(usize, char)> = trimmed.char_indices().collect();
        let mut i = 0;

        let read_ident = |start: usize| -> (String, usize) {
            let mut end = start;
            while end < chars.len() && is_ident(chars[end].1) {
                end += 1;
            }
            (chars[start..end].iter().map(|(_, c)| c).collect(), end)
        };

        let unexpected = |at: usize| SelectorError::Unexpected {
            ch: chars[at].1,
            offset: chars[at].0,
            input: trimmed.to_string(),
        };

        if is_ident(chars[0].1) || chars[0].1 == '*' {
            if chars[0].1 == '*' {
                i = 1;
            } else {
                let (tag, end) = read_ident(0);
                selector.tag = Some(tag.to_ascii_lowercase());
                i = end;
            }
        }

        while i < chars.len() {
            match chars[i].1 {
                '.' | '#' => {
                    let (name, end) = read_ident(i + 1);
                    if name.is_empty() {
                        return Err(unexpected(i));
                    }
                    if chars[i].1 == '.' {
                        selector.classes.push(name);
                    } else {
                        selector.id = Some(name);
                    }
                    i = end;
                }
                '[' => {
                    let close = chars[i..]
                        .iter()
                        .position(|(_, c)| *c == ']')
                        .map(|p| p + i)
                        .ok_or_else(|| SelectorError::Unterminated(trimmed.to_string()))?;
                    let body: String = chars[i + 1..close].iter().map(|(_, c)| c).collect();
                    let (name, value) = match body.split_once('=') {
                        Some((name, value)) => {
                            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
                            (name.trim().to_string(), Some(value.to_string()))
                        }
                        None => (body.trim().to_string(), None),
                    };
                    if name.is_empty() || !name.chars().all(is_ident) {
                        return Err(unexpected(i));
                    }
                    selector.attrs.push(AttrMatch { name, value });
                    i = close + 1;
                }
                _ => return Err(unexpected(i)),
            }
        }

        Ok(selector)
    }

    /// Whether `node` satisfies every part of this selector.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        if let Some(tag) = &self.tag {
            if doc.tag(node) != tag {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if doc.attr(node, "id") != Some(id.as_str()) {
                return false;
            }
        }
        if !self.classes.iter().all(|c| doc.has_class(node, c)) {
            return false;
        }
        self.attrs.iter().all(|a| match (&a.value, doc.attr(node, &a.name)) {
            (None, Some(_)) => true,
            (Some(expected), Some(actual)) => expected == actual,
            (_, None) => false,
        })
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Selector::parse(s)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(tag) = &self.tag {
            write!(f, "{tag}")?;
        }
        if let Some(id) = &self.id {
            write!(f, "#{id}")?;
        }
        for class in &self.classes {
            write!(f, ".{class}")?;
        }
        for attr in &self.attrs {
            match &attr.value {
                Some(value) => write!(f, "[{}=\"{}\"]", attr.name, value)?,
                None => write!(f, "[{}]", attr.name)?,
            }
        }
        if self.tag.is_none() && self.id.is_none() && self.classes.is_empty() && self.attrs.is_empty() {
            write!(f, "*")?;
        }
        Ok(())
    }
}
