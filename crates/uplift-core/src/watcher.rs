//! The page-lifetime structural change watcher.
//!
//! One watcher serves every widget type. Each registered callback is a
//! marker probe; for every inserted node (in insertion order) the watcher asks
//! the probes whether the node or one of its descendants is an unenhanced
//! widget, and hands back the nodes that need a deferred scan.

use crate::dom::{Document, Mutation, NodeId};
use std::time::Duration;

/// Marker probe: does this inserted subtree contain something to enhance?
pub type Probe = Box<dyn Fn(&Document, NodeId) -> bool + Send>;

/// Structural change subscription.
pub struct StructuralWatcher {
    callbacks: Vec<Probe>,
    active: bool,
    delay: Duration,
}

impl StructuralWatcher {
    /// Create an inactive watcher whose scans run `delay` after an insertion batch.
    pub fn new(delay: Duration) -> Self {
        Self {
            callbacks: Vec::new(),
            active: false,
            delay,
        }
    }

    /// Add a marker probe.
    pub fn subscribe(&mut self, probe: Probe) {
        self.callbacks.push(probe);
    }

    /// Drop every probe.
    pub fn clear(&mut self) {
        self.callbacks.clear();
    }

    /// Start observing. Idempotent.
    pub fn connect(&mut self) {
        if !self.active {
            log::debug!("structural watcher connected");
        }
        self.active = true;
    }

    /// Stop observing; later batches are ignored.
    pub fn disconnect(&mut self) {
        self.active = false;
    }

    /// Whether the watcher is observing.
    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Settling delay before a scan.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Number of registered probes.
    pub fn callback_count(&self) -> usize {
        self.callbacks.len()
    }

    /// Inspect one mutation batch and return the inserted nodes that need a
    /// scan, in insertion order and without duplicates.
    pub fn observe(&self, doc: &Document, batch: &[Mutation]) -> Vec<NodeId> {
        if !self.active {
            return Vec::new();
        }
        let mut found: Vec<NodeId> = Vec::new();
        for mutation in batch {
            let Mutation::Inserted { node, .. } = *mutation else {
                continue;
            };
            if found.contains(&node) || !doc.is_connected(node) {
                continue;
            }
            if self.callbacks.iter().any(|probe| probe(doc, node)) {
                found.push(node);
            }
        }
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::Element;
    use crate::selector::Selector;

    fn class_probe(class: &'static str) -> Probe {
        Box::new(move |doc: &Document, node: NodeId| {
            let sel = Selector::parse(&format!(".{class}")).unwrap();
            doc.descendants(node).into_iter().any(|n| sel.matches(doc, n))
        })
    }

    #[test]
    fn inactive_watcher_ignores_batches() {
        let mut doc = Document::new();
        let root = doc.root();
        doc.append_fragment(root, Element::new("div").class("modal"));
        let mut watcher = StructuralWatcher::new(Duration::from_millis(20));
        watcher.subscribe(class_probe("modal"));

        let batch = doc.take_mutations();
        assert!(watcher.observe(&doc, &batch).is_empty());
        watcher.connect();
        assert_eq!(watcher.observe(&doc, &batch).len(), 1);
    }

    #[test]
    fn reports_matches_in_insertion_order() {
        let mut doc = Document::new();
        let root = doc.root();
        let mut watcher = StructuralWatcher::new(Duration::from_millis(20));
        watcher.subscribe(class_probe("modal"));
        watcher.subscribe(class_probe("tooltip"));
        watcher.connect();

        let a = doc.append_fragment(root, Element::new("div").child(Element::new("span").class("tooltip")));
        doc.append_fragment(root, Element::new("p"));
        let c = doc.append_fragment(root, Element::new("div").class("modal"));

        let batch = doc.take_mutations();
        assert_eq!(watcher.observe(&doc, &batch), vec![a, c]);
    }

    #[test]
    fn nodes_removed_within_the_batch_are_skipped() {
        let mut doc = Document::new();
        let root = doc.root();
        let mut watcher = StructuralWatcher::new(Duration::from_millis(20));
        watcher.subscribe(class_probe("modal"));
        watcher.connect();

        let a = doc.append_fragment(root, Element::new("div").class("modal"));
        doc.remove(a);
        let batch = doc.take_mutations();
        assert!(watcher.observe(&doc, &batch).is_empty());
    }
}
