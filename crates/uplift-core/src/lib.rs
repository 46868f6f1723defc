//! Core runtime for **uplift**, a progressive-enhancement engine.
//!
//! `uplift-core` takes static, accessible markup and turns recognized
//! patterns into interactive widgets exactly once, then keeps watching the
//! document for fragments inserted later. Widgets follow the [Elm
//! Architecture]: DOM events become messages, [`Component::update`] mutates
//! state and markup, and side effects come back as [`Command`]s.
//!
//! # Key types
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`Document`] | In-memory element tree with mutation records |
//! | [`Selector`] | Compound simple selector (`button.accordion__button[aria-controls]`) |
//! | [`Component`] | An enhanced widget: root element plus state machine |
//! | [`Context`] | What a widget may touch while enhancing or updating |
//! | [`Command`] | Follow-up work: immediate or deferred messages |
//! | [`Registry`] | Descriptors in declaration (dispatch) order |
//! | [`Engine`] | Owns the document and drives enhancement and interaction |
//! | [`FallbackLoader`] | Resolves the registry, degrading to an inert one on failure |
//!
//! # Lifecycle
//!
//! 1. **resolve** -- [`Engine::start`] awaits the [`FallbackLoader`]; a
//!    failure installs [`Registry::inert`] so every later call is a no-op.
//! 2. **initial pass** -- the whole document is scanned; each match whose
//!    `data-enhanced-<kind>` marker is unset is enhanced.
//! 3. **watch** -- fragments inserted afterwards are scanned after a short
//!    settle delay ([`EngineOptions::scan_delay`]).
//! 4. **interact** -- [`Engine::dispatch`] bubbles events to listeners; their
//!    messages reach the owning widget's `update`.
//!
//! [Elm Architecture]: https://guide.elm-lang.org/architecture/

pub mod command;
pub mod component;
pub mod config;
pub mod dom;
pub mod element;
pub mod event;
pub mod listeners;
pub mod loader;
pub mod registry;
pub mod runtime;
pub mod scheduler;
pub mod selector;
pub mod testing;
pub mod watcher;

pub use command::Command;
pub use component::{Component, Context, WidgetId};
pub use config::{ConfigError, EngineOptions};
pub use dom::{Document, Mutation, NodeId};
pub use element::Element;
pub use event::{DomEvent, EventKind, FileEntry, StateChange, WidgetEvent};
pub use listeners::{Handler, ListenerError, ListenerId, ListenerSink, Listeners};
pub use loader::{FallbackLoader, Inert, LoadError, LoadState, Namespace, Origin, Resolved, Source};
pub use registry::{Descriptor, EnhanceError, EnhanceFn, Registry};
pub use runtime::Engine;
pub use scheduler::Scheduler;
pub use selector::{Selector, SelectorError};
pub use watcher::StructuralWatcher;
