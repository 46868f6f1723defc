use crate::dom::NodeId;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Kinds of interaction events delivered to listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Pointer activation (or Enter/Space on a button).
    Click,
    /// The value of a text control changed.
    Input,
    /// A committed change on a control (file selection, select box).
    Change,
    /// A key was pressed.
    KeyDown,
    /// An element received focus.
    FocusIn,
    /// An element lost focus.
    FocusOut,
    /// The pointer moved onto an element.
    PointerEnter,
    /// The pointer left an element.
    PointerLeave,
    /// A drag entered an element.
    DragEnter,
    /// A drag moved over an element.
    DragOver,
    /// A drag left an element.
    DragLeave,
    /// A drag was released over an element.
    Drop,
}

/// A file carried by a drop or held by a file control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// File name including extension.
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// MIME type, empty when unknown.
    pub mime: String,
}

impl FileEntry {
    /// Create a file entry without a MIME type.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            mime: String::new(),
        }
    }

    /// Set the MIME type.
    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = mime.into();
        self
    }
}

/// An interaction event targeted at a node.
///
/// Dispatch bubbles the event from `target` up to the document root; every
/// listener registered along that path for `kind` sees the same event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomEvent {
    /// What happened.
    pub kind: EventKind,
    /// The innermost node the event happened on.
    pub target: NodeId,
    /// Key payload for [`EventKind::KeyDown`].
    pub key: Option<KeyEvent>,
    /// Files payload for [`EventKind::Drop`].
    pub files: Vec<FileEntry>,
}

impl DomEvent {
    /// Create an event without payload.
    pub fn new(kind: EventKind, target: NodeId) -> Self {
        Self {
            kind,
            target,
            key: None,
            files: Vec::new(),
        }
    }

    /// Attach a key payload.
    pub fn with_key(mut self, key: KeyEvent) -> Self {
        self.key = Some(key);
        self
    }

    /// Attach dropped files.
    pub fn with_files(mut self, files: Vec<FileEntry>) -> Self {
        self.files = files;
        self
    }

    /// Key code of a key event.
    pub fn key_code(&self) -> Option<KeyCode> {
        self.key.map(|k| k.code)
    }

    /// Whether this is a key event for `code` with no modifiers other than Shift.
    pub fn is_key(&self, code: KeyCode) -> bool {
        self.key
            .map(|k| k.code == code && k.modifiers.difference(KeyModifiers::SHIFT).is_empty())
            .unwrap_or(false)
    }
}

/// The state transition carried by a [`WidgetEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateChange {
    /// The widget opened (list, calendar, dialog, navigation, tooltip, dropdown).
    Opened,
    /// The widget closed.
    Closed,
    /// A selection was committed.
    Selected {
        /// Backing value before the change.
        previous: String,
        /// Backing value after the change.
        next: String,
    },
    /// An item of a grouped widget expanded or collapsed.
    Expanded {
        /// Item position within the group.
        index: usize,
        /// New state.
        expanded: bool,
    },
    /// Drag hover state of a drop target.
    DragOver(bool),
    /// Files were installed into a file control.
    FilesChanged {
        /// Names of the installed files.
        names: Vec<String>,
    },
    /// Validity of the user's input changed.
    Validity {
        /// Whether the input is now acceptable.
        valid: bool,
        /// Message shown to the user.
        message: String,
    },
}

/// Outbound notification for collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetEvent {
    /// Type tag of the widget that changed.
    pub kind: &'static str,
    /// Root element of the widget instance.
    pub root: NodeId,
    /// What changed.
    pub change: StateChange,
}

impl WidgetEvent {
    /// Create an event.
    pub fn new(kind: &'static str, root: NodeId, change: StateChange) -> Self {
        Self { kind, root, change }
    }
}
