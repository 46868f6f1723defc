//! Roving focus across a run-time sized set of elements.
//!
//! Used for keyboard movement between accordion triggers and for cycling
//! Tab focus inside an open dialog.

use uplift_core::{Document, NodeId};

/// Cursor over `len` focusable slots that wraps at both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusRing {
    len: usize,
    focused: usize,
}

impl FocusRing {
    /// A ring over `len` slots with focus on the first one.
    pub fn new(len: usize) -> Self {
        Self { len, focused: 0 }
    }

    /// A ring with focus on `index`, clamped to the valid range.
    pub fn at(len: usize, index: usize) -> Self {
        let mut ring = Self::new(len);
        ring.focus(index);
        ring
    }

    /// Index of the focused slot.
    pub fn focused(&self) -> usize {
        self.focused
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the ring has no slots.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Move to the next slot, wrapping after the last.
    pub fn focus_next(&mut self) {
        if self.len > 0 {
            self.focused = (self.focused + 1) % self.len;
        }
    }

    /// Move to the previous slot, wrapping before the first.
    pub fn focus_prev(&mut self) {
        if self.len > 0 {
            self.focused = (self.focused + self.len - 1) % self.len;
        }
    }

    /// Jump to the first slot.
    pub fn focus_first(&mut self) {
        self.focused = 0;
    }

    /// Jump to the last slot.
    pub fn focus_last(&mut self) {
        self.focused = self.len.saturating_sub(1);
    }

    /// Focus `index`, clamped to the valid range.
    pub fn focus(&mut self, index: usize) {
        self.focused = index.min(self.len.saturating_sub(1));
    }
}

/// Move document focus to `nodes[ring.focused()]`.
pub fn apply(doc: &mut Document, nodes: &[NodeId], ring: FocusRing) -> bool {
    nodes
        .get(ring.focused())
        .is_some_and(|node| doc.focus(*node))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let ring = FocusRing::new(3);
        assert_eq!(ring.focused(), 0);
        assert_eq!(ring.len(), 3);
    }

    #[test]
    fn next_and_prev_wrap() {
        let mut ring = FocusRing::at(3, 2);
        ring.focus_next();
        assert_eq!(ring.focused(), 0);
        ring.focus_prev();
        assert_eq!(ring.focused(), 2);
    }

    #[test]
    fn first_last_and_clamp() {
        let mut ring = FocusRing::new(4);
        ring.focus_last();
        assert_eq!(ring.focused(), 3);
        ring.focus_first();
        assert_eq!(ring.focused(), 0);
        ring.focus(10);
        assert_eq!(ring.focused(), 3);
    }

    #[test]
    fn empty_ring_is_inert() {
        let mut ring = FocusRing::new(0);
        ring.focus_next();
        ring.focus_prev();
        ring.focus_last();
        assert_eq!(ring.focused(), 0);
        assert!(ring.is_empty());
    }
}
