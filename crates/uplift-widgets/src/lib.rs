//! Ready-made enhancers for the **uplift** engine.
//!
//! Every widget in this crate implements [`Enhancer`](widget::Enhancer) and
//! [`uplift_core::Component`], so it can run alone in an
//! [`Engine<W>`](uplift_core::Engine) or as part of the [`Widget`](widget::Widget)
//! union returned by [`registry`](widget::registry).
//!
//! # Widgets
//!
//! | Module | Marker | Description |
//! |--------|--------|-------------|
//! | [`combobox`] | `.combo-box` | Filterable single-select over a native `<select>` |
//! | [`calendar`] | `.date-picker` | Text input with a month-grid calendar |
//! | [`modal`] | `.modal[id]` | Dialog with focus trap and return focus |
//! | [`dropzone`] | `.file-input` | Drag-and-drop file target with validation |
//! | [`accordion`] | `.accordion` | Single- or multi-expand disclosure group |
//! | [`site_nav`] | `.header` | Mobile navigation and dropdown menus |
//! | [`char_counter`] | `.character-count` | Remaining-characters status |
//! | [`tooltip`] | `.tooltip[title]` | Hover and focus tooltip |
//!
//! # Utilities
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`focus`] | [`FocusRing`](focus::FocusRing) for roving focus across elements |
//! | [`key`] | Key-binding helpers and default bindings |
//! | [`selection`] | Optional highlight cursor over a list |
//! | [`widget`] | The [`Enhancer`](widget::Enhancer) trait and the widget union |

pub mod accordion;
pub mod calendar;
pub mod char_counter;
pub mod combobox;
pub mod dropzone;
pub mod focus;
pub mod key;
pub mod modal;
pub mod selection;
pub mod site_nav;
pub mod tooltip;
pub mod widget;

#[cfg(test)]
mod test_support;

pub use widget::{registry, Enhancer, Widget, WidgetMessage};
