//! **uplift** -- progressive enhancement of static markup into accessible widgets.
//!
//! This is the umbrella crate that re-exports everything needed to enhance a
//! page from a single dependency:
//!
//! ```toml
//! [dependencies]
//! uplift = "0.1"
//! ```
//!
//! # Re-exports
//!
//! * All public items from [`uplift_core`] are available at the crate root
//!   ([`Document`], [`Element`], [`Engine`], [`Component`], [`Command`],
//!   [`FallbackLoader`], etc.).
//! * The [`widgets`] module re-exports everything from [`uplift_widgets`]
//!   (combobox, date picker, modal, dropzone, accordion and more).
//! * [`crossterm`] and [`futures`] are re-exported so downstream crates can
//!   build key events and sources without depending on them directly.
//!
//! # Quick start
//!
//! ```ignore
//! use uplift::{Document, Element, EngineOptions};
//!
//! let mut doc = Document::new();
//! let body = doc.root();
//! doc.append_fragment(
//!     body,
//!     Element::new("div").class("combo-box").child(
//!         Element::new("select")
//!             .child(Element::new("option").attr("value", "a").text("Apple")),
//!     ),
//! );
//!
//! let mut page = uplift::local(doc, EngineOptions::default());
//! assert_eq!(page.widget_count(), 1);
//! ```

pub use uplift_core::*;
pub mod widgets {
    pub use uplift_widgets::*;
}

// Re-export dependencies for use in demos and downstream crates
pub use crossterm;
pub use futures;

use futures::FutureExt;
use std::sync::Arc;
use uplift_widgets::Widget;

/// An engine hosting every built-in widget type.
pub type Page = Engine<Widget>;

/// Namespace slot the built-in registry is published under.
pub const REGISTRY_NAME: &str = "uplift-widgets";

/// Build a page with the built-in registry and run the initial pass.
pub fn local(doc: Document, options: EngineOptions) -> Page {
    let registry = uplift_widgets::registry().unwrap_or_else(|err| {
        log::error!("{err}; enhancement disabled");
        Registry::inert()
    });
    Engine::with_registry(doc, registry, options)
}

/// Build a page whose registry is resolved from `namespace`, falling back to
/// `source`, when [`Engine::start`] is awaited.
pub fn with_source(
    doc: Document,
    namespace: Namespace<Registry<Widget>>,
    source: Option<Arc<dyn Source<Registry<Widget>>>>,
    options: EngineOptions,
) -> Page {
    Engine::new(doc, FallbackLoader::new(REGISTRY_NAME, namespace, source), options)
}

/// A source that builds the built-in registry.
pub fn builtin_source() -> Arc<dyn Source<Registry<Widget>>> {
    Arc::new(|name: &str| -> futures::future::BoxFuture<'static, Result<Registry<Widget>, LoadError>> {
        let name = name.to_string();
        async move {
            uplift_widgets::registry().map_err(|err| LoadError::Failed {
                name,
                reason: err.to_string(),
            })
        }
        .boxed()
    })
}
