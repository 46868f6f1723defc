//! Highlight cursor over the currently visible options of a list.
//!
//! Unlike a focus ring the cursor may point at nothing: a freshly opened
//! list has no highlighted option until the user presses an arrow key.

/// Optional cursor over `count` items with wrapping movement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionState {
    cursor: Option<usize>,
    count: usize,
}

impl SelectionState {
    /// Cursor over `count` items with nothing highlighted.
    pub fn new(count: usize) -> Self {
        Self {
            cursor: None,
            count,
        }
    }

    /// Highlighted item.
    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of items.
    pub fn count(&self) -> usize {
        self.count
    }

    /// Replace the item count, dropping the highlight.
    pub fn reset(&mut self, count: usize) {
        self.count = count;
        self.cursor = None;
    }

    /// Highlight the next item; from nothing, the first.
    pub fn move_down(&mut self) {
        if self.count == 0 {
            return;
        }
        self.cursor = Some(match self.cursor {
            Some(i) if i + 1 < self.count => i + 1,
            _ => 0,
        });
    }

    /// Highlight the previous item; from nothing, the last.
    pub fn move_up(&mut self) {
        if self.count == 0 {
            return;
        }
        self.cursor = Some(match self.cursor {
            Some(i) if i > 0 => i - 1,
            _ => self.count - 1,
        });
    }

    /// Highlight the first item.
    pub fn home(&mut self) {
        if self.count > 0 {
            self.cursor = Some(0);
        }
    }

    /// Highlight the last item.
    pub fn end(&mut self) {
        if self.count > 0 {
            self.cursor = Some(self.count - 1);
        }
    }
}
