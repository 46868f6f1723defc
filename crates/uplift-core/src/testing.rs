//! Event constructors for driving an [`Engine`] in tests and demos.
//!
//! ```rust,ignore
//! use uplift_core::testing::{click, key, type_text};
//! use crossterm::event::KeyCode;
//!
//! engine.dispatch(click(toggle));
//! type_text(&mut engine, filter, "al");
//! engine.dispatch(key(filter, KeyCode::Enter));
//! ```

use crate::component::Component;
use crate::dom::NodeId;
use crate::event::{DomEvent, EventKind, FileEntry};
use crate::runtime::Engine;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// A click on `target`.
pub fn click(target: NodeId) -> DomEvent {
    DomEvent::new(EventKind::Click, target)
}

/// A key press without modifiers.
pub fn key(target: NodeId, code: KeyCode) -> DomEvent {
    key_with(target, code, KeyModifiers::NONE)
}

/// A key press with modifiers.
pub fn key_with(target: NodeId, code: KeyCode, modifiers: KeyModifiers) -> DomEvent {
    DomEvent::new(EventKind::KeyDown, target).with_key(KeyEvent::new(code, modifiers))
}

/// An input event (value already updated).
pub fn input(target: NodeId) -> DomEvent {
    DomEvent::new(EventKind::Input, target)
}

/// A change event.
pub fn change(target: NodeId) -> DomEvent {
    DomEvent::new(EventKind::Change, target)
}

/// Focus arriving at `target`.
pub fn focus_in(target: NodeId) -> DomEvent {
    DomEvent::new(EventKind::FocusIn, target)
}

/// Focus leaving `target`.
pub fn focus_out(target: NodeId) -> DomEvent {
    DomEvent::new(EventKind::FocusOut, target)
}

/// Pointer entering `target`.
pub fn pointer_enter(target: NodeId) -> DomEvent {
    DomEvent::new(EventKind::PointerEnter, target)
}

/// Pointer leaving `target`.
pub fn pointer_leave(target: NodeId) -> DomEvent {
    DomEvent::new(EventKind::PointerLeave, target)
}

/// A drag entering `target`.
pub fn drag_enter(target: NodeId) -> DomEvent {
    DomEvent::new(EventKind::DragEnter, target)
}

/// A drag moving over `target`.
pub fn drag_over(target: NodeId) -> DomEvent {
    DomEvent::new(EventKind::DragOver, target)
}

/// A drag leaving `target`.
pub fn drag_leave(target: NodeId) -> DomEvent {
    DomEvent::new(EventKind::DragLeave, target)
}

/// Files dropped on `target`.
pub fn drop_files(target: NodeId, files: Vec<FileEntry>) -> DomEvent {
    DomEvent::new(EventKind::Drop, target).with_files(files)
}

/// Shorthand for [`FileEntry::new`].
pub fn file(name: &str, size: u64) -> FileEntry {
    FileEntry::new(name, size)
}

/// Replace the value of a text control and dispatch the input event.
pub fn type_text<W: Component>(engine: &mut Engine<W>, target: NodeId, text: &str) {
    engine.document_mut().set_value(target, text);
    engine.dispatch(input(target));
}

/// Install a file list into a file control and dispatch the change event.
pub fn choose_files<W: Component>(engine: &mut Engine<W>, target: NodeId, files: Vec<FileEntry>) {
    engine.document_mut().set_files(target, files);
    engine.dispatch(change(target));
}
