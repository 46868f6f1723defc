//! Enhancement descriptors and the registry the dispatcher walks.

use crate::component::{Component, Context};
use crate::config::ConfigError;
use crate::dom::{Document, NodeId};
use crate::loader::Inert;
use crate::selector::{Selector, SelectorError};

/// Why an element could not be enhanced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnhanceError {
    /// A required sub-element is missing.
    #[error("missing required element `{selector}`")]
    MissingElement {
        /// Selector of the missing element.
        selector: String,
    },
    /// A configuration attribute is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// A selector used by the enhancer does not parse.
    #[error(transparent)]
    Selector(#[from] SelectorError),
}

/// Constructs a widget from a matched root.
pub type EnhanceFn<W> =
    fn(&mut Context<'_, <W as Component>::Message>, NodeId) -> Result<W, EnhanceError>;

/// A recognized widget type: marker, required sub-elements and enhancer.
pub struct Descriptor<W: Component> {
    /// Type tag; also names the enhanced-marker attribute.
    pub kind: &'static str,
    /// Selector identifying candidate roots.
    pub marker: Selector,
    /// Sub-elements that must exist under the root before enhancing.
    pub required: Vec<Selector>,
    /// Builds the widget.
    pub enhance: EnhanceFn<W>,
}

impl<W: Component> Clone for Descriptor<W> {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            marker: self.marker.clone(),
            required: self.required.clone(),
            enhance: self.enhance,
        }
    }
}

impl<W: Component> Descriptor<W> {
    /// Describe a widget type recognized by `marker`.
    pub fn new(kind: &'static str, marker: &str, enhance: EnhanceFn<W>) -> Result<Self, SelectorError> {
        Ok(Self {
            kind,
            marker: Selector::parse(marker)?,
            required: Vec::new(),
            enhance,
        })
    }

    /// Add a required sub-element to the checklist.
    pub fn require(mut self, selector: &str) -> Result<Self, SelectorError> {
        self.required.push(Selector::parse(selector)?);
        Ok(self)
    }

    /// Whether `node` looks like an instance of this type.
    pub fn matches(&self, doc: &Document, node: NodeId) -> bool {
        self.marker.matches(doc, node)
    }

    /// First checklist entry with no match under `node`.
    pub fn missing(&self, doc: &Document, node: NodeId) -> Option<&Selector> {
        self.required
            .iter()
            .find(|sel| doc.select(node, sel).is_none())
    }
}

/// Ordered set of descriptors. Declaration order is dispatch order.
pub struct Registry<W: Component> {
    descriptors: Vec<Descriptor<W>>,
}

impl<W: Component> Clone for Registry<W> {
    fn clone(&self) -> Self {
        Self {
            descriptors: self.descriptors.clone(),
        }
    }
}

impl<W: Component> Default for Registry<W> {
    fn default() -> Self {
        Self::new()
    }
}

impl<W: Component> Inert for Registry<W> {
    fn inert() -> Self {
        Self::new()
    }
}

impl<W: Component> Registry<W> {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            descriptors: Vec::new(),
        }
    }

    /// Append a descriptor.
    pub fn register(mut self, descriptor: Descriptor<W>) -> Self {
        self.descriptors.push(descriptor);
        self
    }

    /// Descriptors in declaration order.
    pub fn descriptors(&self) -> &[Descriptor<W>] {
        &self.descriptors
    }

    /// Whether the registry enhances nothing.
    pub fn is_inert(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Whether `node` or a descendant is an unenhanced instance of any type.
    pub fn probe(&self, doc: &Document, node: NodeId, marker_prefix: &str) -> bool {
        doc.descendants(node).into_iter().any(|n| {
            self.descriptors.iter().any(|d| {
                d.matches(doc, n) && !doc.has_attr(n, &format!("{marker_prefix}{}", d.kind))
            })
        })
    }

    /// Unenhanced `(node, descriptor index)` pairs under `root` in document
    /// order, then declaration order.
    pub fn candidates(&self, doc: &Document, root: NodeId, marker_prefix: &str) -> Vec<(NodeId, usize)> {
        let mut out = Vec::new();
        for node in doc.descendants(root) {
            for (index, d) in self.descriptors.iter().enumerate() {
                if d.matches(doc, node) && !doc.has_attr(node, &format!("{marker_prefix}{}", d.kind)) {
                    out.push((node, index));
                }
            }
        }
        out
    }
}
