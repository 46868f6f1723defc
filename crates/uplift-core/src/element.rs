//! Builder for static markup fragments.
//!
//! Collaborators hand the engine fragments that already carry the marker
//! classes and sub-elements a widget needs. `Element` describes such a
//! fragment; [`Document::append_fragment`](crate::dom::Document::append_fragment)
//! materializes it.

/// A detached element description with children.
///
/// # Example
///
/// ```ignore
/// use uplift_core::Element;
///
/// let counter = Element::new("div")
///     .class("character-count")
///     .child(
///         Element::new("textarea")
///             .class("character-count__field")
///             .attr("maxlength", "10"),
///     );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub(crate) tag: String,
    pub(crate) attrs: Vec<(String, String)>,
    pub(crate) classes: Vec<String>,
    pub(crate) text: String,
    pub(crate) value: String,
    pub(crate) hidden: bool,
    pub(crate) children: Vec<Element>,
}

impl Element {
    /// Start a new element with the given tag name.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: Vec::new(),
            classes: Vec::new(),
            text: String::new(),
            value: String::new(),
            hidden: false,
            children: Vec::new(),
        }
    }

    /// Add a class. Whitespace-separated lists add every class.
    pub fn class(mut self, class: impl AsRef<str>) -> Self {
        for c in class.as_ref().split_whitespace() {
            if !self.classes.iter().any(|existing| existing == c) {
                self.classes.push(c.to_string());
            }
        }
        self
    }

    /// Set an attribute, replacing an earlier value with the same name.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attrs.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attrs.push((name, value)),
        }
        self
    }

    /// Shorthand for the `id` attribute.
    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Set the text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Set the form value (inputs, selects, options).
    pub fn value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Start hidden.
    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    /// Append a child element.
    pub fn child(mut self, child: Element) -> Self {
        self.children.push(child);
        self
    }

    /// Append several children.
    pub fn children(mut self, children: impl IntoIterator<Item = Element>) -> Self {
        self.children.extend(children);
        self
    }
}
