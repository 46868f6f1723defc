//! In-memory element tree standing in for the host page.
//!
//! The [`Document`] is an arena: nodes are never freed, so a [`NodeId`]
//! stays valid after its node is removed and simply reports
//! [`is_connected`](Document::is_connected) as `false`. Every insertion into
//! the connected tree is recorded as a [`Mutation`] so the structural watcher
//! can pick up fragments added after the initial pass.

use crate::element::Element;
use crate::event::FileEntry;
use crate::selector::Selector;
use std::fmt;

/// Identity of a node inside a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A structural change recorded by the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// `node` (and its subtree) was inserted under `parent`.
    Inserted {
        /// The new parent.
        parent: NodeId,
        /// The inserted node.
        node: NodeId,
    },
    /// `node` was detached from `parent`.
    Removed {
        /// The former parent.
        parent: NodeId,
        /// The removed node.
        node: NodeId,
    },
}

impl Mutation {
    /// Whether this record describes a removal.
    pub fn is_removal(&self) -> bool {
        matches!(self, Mutation::Removed { .. })
    }
}

#[derive(Debug, Clone)]
struct Node {
    tag: String,
    attrs: Vec<(String, String)>,
    classes: Vec<String>,
    text: String,
    value: String,
    files: Vec<FileEntry>,
    hidden: bool,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attrs: Vec::new(),
            classes: Vec::new(),
            text: String::new(),
            value: String::new(),
            files: Vec::new(),
            hidden: false,
            parent: None,
            children: Vec::new(),
        }
    }
}

const NATIVELY_FOCUSABLE: &[&str] = &["button", "input", "select", "textarea"];

/// The element tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    focused: Option<NodeId>,
    mutations: Vec<Mutation>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document containing only a `body` root.
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("body")],
            root: NodeId(0),
            focused: None,
            mutations: Vec::new(),
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Total number of nodes ever created, connected or not.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: the root exists from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    // -- structure ---------------------------------------------------------

    /// Create a detached element.
    pub fn create_element(&mut self, tag: &str) -> NodeId {
        self.nodes.push(Node::new(tag));
        NodeId(self.nodes.len() - 1)
    }

    /// Materialize a fragment as a detached subtree and return its root.
    pub fn build(&mut self, element: Element) -> NodeId {
        let id = self.create_element(&element.tag);
        {
            let node = self.node_mut(id);
            node.attrs = element.attrs;
            node.classes = element.classes;
            node.text = element.text;
            node.value = element.value;
            node.hidden = element.hidden;
        }
        for child in element.children {
            let child_id = self.build(child);
            self.node_mut(child_id).parent = Some(id);
            self.node_mut(id).children.push(child_id);
        }
        id
    }

    /// Build `element` and append it under `parent` as one insertion.
    pub fn append_fragment(&mut self, parent: NodeId, element: Element) -> NodeId {
        let id = self.build(element);
        self.append_child(parent, id);
        id
    }

    fn detach(&mut self, node: NodeId) {
        if let Some(parent) = self.node(node).parent {
            let connected = self.is_connected(parent);
            self.node_mut(parent).children.retain(|c| *c != node);
            self.node_mut(node).parent = None;
            if connected {
                self.mutations.push(Mutation::Removed { parent, node });
            }
        }
    }

    fn attach(&mut self, parent: NodeId, node: NodeId, index: Option<usize>) {
        if node == self.root || self.contains(node, parent) {
            log::warn!("refusing to insert {node} under its own descendant {parent}");
            return;
        }
        self.detach(node);
        self.node_mut(node).parent = Some(parent);
        let children = &mut self.node_mut(parent).children;
        match index {
            Some(i) if i <= children.len() => children.insert(i, node),
            _ => children.push(node),
        }
        if self.is_connected(parent) {
            self.mutations.push(Mutation::Inserted { parent, node });
        }
    }

    /// Append `child` as the last child of `parent`, moving it if attached elsewhere.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.attach(parent, child, None);
    }

    /// Insert `child` before `reference` under `parent`.
    ///
    /// Falls back to appending when `reference` is not a child of `parent`.
    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, reference: NodeId) {
        let index = self.node(parent).children.iter().position(|c| *c == reference);
        self.attach(parent, child, index);
    }

    /// Insert `node` right after `reference` in its parent.
    pub fn insert_after(&mut self, reference: NodeId, node: NodeId) {
        let Some(parent) = self.parent(reference) else {
            return;
        };
        let index = self
            .node(parent)
            .children
            .iter()
            .position(|c| *c == reference)
            .map(|i| i + 1);
        self.attach(parent, node, index);
    }

    /// Detach `node` from the tree. Returns `false` for the root or an already detached node.
    pub fn remove(&mut self, node: NodeId) -> bool {
        if node == self.root || self.node(node).parent.is_none() {
            return false;
        }
        self.detach(node);
        if let Some(focused) = self.focused {
            if self.contains(node, focused) {
                self.focused = None;
            }
        }
        true
    }

    /// Remove every child of `node`.
    pub fn clear_children(&mut self, node: NodeId) {
        for child in self.node(node).children.clone() {
            self.remove(child);
        }
    }

    /// Parent of `node`, if attached.
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.node(node).parent
    }

    /// Children of `node` in order.
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.node(node).children
    }

    /// Whether `node` is reachable from the root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == self.root {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// Whether `node` is `ancestor` or one of its descendants.
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.node(id).parent;
        }
        false
    }

    /// `node` followed by each ancestor up to the top of its tree.
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut path = vec![node];
        let mut current = self.node(node).parent;
        while let Some(id) = current {
            path.push(id);
            current = self.node(id).parent;
        }
        path
    }

    /// `node` and all descendants in document (pre-)order.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.node(id).children.iter().rev().copied());
        }
        out
    }

    // -- queries -----------------------------------------------------------

    /// Whether `node` matches `selector`.
    pub fn matches(&self, node: NodeId, selector: &Selector) -> bool {
        selector.matches(self, node)
    }

    /// First descendant of `scope` (excluding `scope`) matching `selector`.
    pub fn select(&self, scope: NodeId, selector: &Selector) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .skip(1)
            .find(|n| selector.matches(self, *n))
    }

    /// Every descendant of `scope` (excluding `scope`) matching `selector`.
    pub fn select_all(&self, scope: NodeId, selector: &Selector) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .skip(1)
            .filter(|n| selector.matches(self, *n))
            .collect()
    }

    /// Nearest of `node` and its ancestors matching `selector`.
    pub fn closest(&self, node: NodeId, selector: &Selector) -> Option<NodeId> {
        self.ancestors(node)
            .into_iter()
            .find(|n| selector.matches(self, *n))
    }

    /// Connected element whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|n| self.attr(*n, "id") == Some(id))
    }

    // -- node data ---------------------------------------------------------

    /// Lower-case tag name.
    pub fn tag(&self, node: NodeId) -> &str {
        &self.node(node).tag
    }

    /// Attribute value.
    pub fn attr(&self, node: NodeId, name: &str) -> Option<&str> {
        self.node(node)
            .attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the attribute is present.
    pub fn has_attr(&self, node: NodeId, name: &str) -> bool {
        self.attr(node, name).is_some()
    }

    /// Set an attribute.
    pub fn set_attr(&mut self, node: NodeId, name: &str, value: impl Into<String>) {
        let value = value.into();
        let attrs = &mut self.node_mut(node).attrs;
        match attrs.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => attrs.push((name.to_string(), value)),
        }
    }

    /// Remove an attribute, returning its previous value.
    pub fn remove_attr(&mut self, node: NodeId, name: &str) -> Option<String> {
        let attrs = &mut self.node_mut(node).attrs;
        let index = attrs.iter().position(|(n, _)| n == name)?;
        Some(attrs.remove(index).1)
    }

    /// Whether the class list contains `class`.
    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.node(node).classes.iter().any(|c| c == class)
    }

    /// Add `class` if missing.
    pub fn add_class(&mut self, node: NodeId, class: &str) {
        if !self.has_class(node, class) {
            self.node_mut(node).classes.push(class.to_string());
        }
    }

    /// Remove `class` if present.
    pub fn remove_class(&mut self, node: NodeId, class: &str) {
        self.node_mut(node).classes.retain(|c| c != class);
    }

    /// Add or remove `class` depending on `on`.
    pub fn toggle_class(&mut self, node: NodeId, class: &str, on: bool) {
        if on {
            self.add_class(node, class);
        } else {
            self.remove_class(node, class);
        }
    }

    /// Text content.
    pub fn text(&self, node: NodeId) -> &str {
        &self.node(node).text
    }

    /// Replace the text content.
    pub fn set_text(&mut self, node: NodeId, text: impl Into<String>) {
        self.node_mut(node).text = text.into();
    }

    /// Form value.
    pub fn value(&self, node: NodeId) -> &str {
        &self.node(node).value
    }

    /// Replace the form value.
    pub fn set_value(&mut self, node: NodeId, value: impl Into<String>) {
        self.node_mut(node).value = value.into();
    }

    /// File list of a file control.
    pub fn files(&self, node: NodeId) -> &[FileEntry] {
        &self.node(node).files
    }

    /// Install a file list into a file control.
    pub fn set_files(&mut self, node: NodeId, files: Vec<FileEntry>) {
        self.node_mut(node).files = files;
    }

    /// Whether the node itself is hidden.
    pub fn is_hidden(&self, node: NodeId) -> bool {
        self.node(node).hidden
    }

    /// Whether the node or any ancestor is hidden.
    pub fn is_rendered_hidden(&self, node: NodeId) -> bool {
        self.ancestors(node).into_iter().any(|n| self.node(n).hidden)
    }

    /// Show or hide the node.
    pub fn set_hidden(&mut self, node: NodeId, hidden: bool) {
        self.node_mut(node).hidden = hidden;
    }

    // -- focus -------------------------------------------------------------

    /// Whether `node` can receive focus programmatically.
    pub fn is_focusable(&self, node: NodeId) -> bool {
        if !self.is_connected(node) || self.is_rendered_hidden(node) || self.has_attr(node, "disabled") {
            return false;
        }
        let tag = self.tag(node);
        NATIVELY_FOCUSABLE.contains(&tag)
            || (tag == "a" && self.has_attr(node, "href"))
            || self.has_attr(node, "tabindex")
    }

    /// Whether `node` takes part in sequential (Tab) navigation.
    pub fn is_tabbable(&self, node: NodeId) -> bool {
        self.is_focusable(node) && self.attr(node, "tabindex") != Some("-1")
    }

    /// Tabbable descendants of `scope` in document order.
    pub fn focusable_descendants(&self, scope: NodeId) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .skip(1)
            .filter(|n| self.is_tabbable(*n))
            .collect()
    }

    /// Move focus to `node`. Returns `false` when it cannot take focus.
    pub fn focus(&mut self, node: NodeId) -> bool {
        if self.is_focusable(node) {
            self.focused = Some(node);
            true
        } else {
            false
        }
    }

    /// Clear focus.
    pub fn blur(&mut self) {
        self.focused = None;
    }

    /// The focused node.
    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    // -- mutation records --------------------------------------------------

    /// Drain recorded mutations in the order they happened.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.mutations)
    }

    /// Whether any mutation is waiting to be drained.
    pub fn has_mutations(&self) -> bool {
        !self.mutations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sel(s: &str) -> Selector {
        Selector::parse(s).unwrap()
    }

    #[test]
    fn append_fragment_records_one_insertion() {
        let mut doc = Document::new();
        let root = doc.root();
        let list = doc.append_fragment(
            root,
            Element::new("ul")
                .child(Element::new("li").text("a"))
                .child(Element::new("li").text("b")),
        );
        assert_eq!(doc.children(list).len(), 2);
        assert_eq!(
            doc.take_mutations(),
            vec![Mutation::Inserted { parent: root, node: list }]
        );
        assert!(!doc.has_mutations());
    }

    #[test]
    fn detached_building_is_not_recorded() {
        let mut doc = Document::new();
        let a = doc.create_element("div");
        let b = doc.create_element("span");
        doc.append_child(a, b);
        assert!(doc.take_mutations().is_empty());
        assert!(!doc.is_connected(b));
    }

    #[test]
    fn remove_keeps_ids_valid() {
        let mut doc = Document::new();
        let root = doc.root();
        let div = doc.append_fragment(root, Element::new("div").child(Element::new("button")));
        let button = doc.children(div)[0];
        assert!(doc.focus(button));
        doc.take_mutations();

        assert!(doc.remove(div));
        assert!(!doc.is_connected(button));
        assert_eq!(doc.tag(button), "button");
        assert_eq!(doc.focused(), None);
        assert!(!doc.remove(div));
        assert_eq!(
            doc.take_mutations(),
            vec![Mutation::Removed { parent: root, node: div }]
        );
    }

    #[test]
    fn root_cannot_move_under_itself() {
        let mut doc = Document::new();
        let root = doc.root();
        let div = doc.append_fragment(root, Element::new("div"));
        doc.append_child(div, root);
        assert_eq!(doc.parent(root), None);
        assert!(doc.is_connected(div));
    }

    #[test]
    fn insert_before_and_after() {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_fragment(root, Element::new("a"));
        let c = doc.append_fragment(root, Element::new("c"));
        let b = doc.create_element("b");
        doc.insert_before(root, b, c);
        let d = doc.create_element("d");
        doc.insert_after(c, d);
        assert_eq!(doc.children(root), &[a, b, c, d]);
    }

    #[test]
    fn queries() {
        let mut doc = Document::new();
        let root = doc.root();
        let form = doc.append_fragment(
            root,
            Element::new("form").class("combo-box").child(
                Element::new("select")
                    .id("fruit")
                    .child(Element::new("option").value("a"))
                    .child(Element::new("option").value("b")),
            ),
        );
        let select = doc.select(form, &sel("select")).unwrap();
        assert_eq!(doc.select_all(form, &sel("option")).len(), 2);
        assert_eq!(doc.select(select, &sel("select")), None);
        assert_eq!(doc.closest(select, &sel(".combo-box")), Some(form));
        assert_eq!(doc.find_by_id("fruit"), Some(select));
        assert_eq!(doc.descendants(form)[0], form);
    }

    #[test]
    fn focusability() {
        let mut doc = Document::new();
        let root = doc.root();
        let wrap = doc.append_fragment(
            root,
            Element::new("div")
                .child(Element::new("button"))
                .child(Element::new("div").attr("tabindex", "-1"))
                .child(Element::new("a"))
                .child(Element::new("a").attr("href", "#x"))
                .child(Element::new("input").attr("disabled", "")),
        );
        let kids = doc.children(wrap).to_vec();
        assert!(doc.is_tabbable(kids[0]));
        assert!(doc.is_focusable(kids[1]));
        assert!(!doc.is_tabbable(kids[1]));
        assert!(!doc.is_focusable(kids[2]));
        assert!(doc.is_tabbable(kids[3]));
        assert!(!doc.is_focusable(kids[4]));
        assert_eq!(doc.focusable_descendants(wrap), vec![kids[0], kids[3]]);

        doc.set_hidden(wrap, true);
        assert!(!doc.focus(kids[0]));
    }

    #[test]
    fn classes_and_attributes() {
        let mut doc = Document::new();
        let node = doc.create_element("div");
        doc.add_class(node, "is-open");
        doc.add_class(node, "is-open");
        doc.toggle_class(node, "is-active", true);
        doc.set_attr(node, "aria-expanded", "true");
        doc.set_attr(node, "aria-expanded", "false");
        assert!(doc.has_class(node, "is-open"));
        assert_eq!(doc.attr(node, "aria-expanded"), Some("false"));
        assert_eq!(doc.remove_attr(node, "aria-expanded").as_deref(), Some("false"));
        doc.toggle_class(node, "is-open", false);
        assert!(!doc.has_class(node, "is-open"));
        assert!(doc.has_class(node, "is-active"));
    }
}
