//! Resolution of the implementation that backs the dispatcher.
//!
//! A [`FallbackLoader`] walks `NotLoaded → Loading → Ready | Failed` exactly
//! once. It first looks for a compatible value already published in a shared
//! [`Namespace`], then asks its [`Source`]; if both come up empty it settles on
//! [`Inert::inert`]. Callers never see the outcome as an error: every caller
//! awaits the same shared completion and always receives a usable value.

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::{Arc, Weak};

/// A value with a do-nothing form, installed when loading fails.
pub trait Inert {
    /// The no-op implementation.
    fn inert() -> Self;
}

/// Why an implementation could not be loaded.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// Nothing in the namespace and no source to load from.
    #[error("no implementation of `{0}` is available")]
    NoSource(String),
    /// The source reported a failure.
    #[error("loading `{name}` failed: {reason}")]
    Failed {
        /// Name being loaded.
        name: String,
        /// Source-specific reason.
        reason: String,
    },
}

/// Named slots shared between every loader on a page.
pub struct Namespace<T> {
    slots: Arc<Mutex<HashMap<String, T>>>,
}

impl<T> Clone for Namespace<T> {
    fn clone(&self) -> Self {
        Self {
            slots: Arc::clone(&self.slots),
        }
    }
}

impl<T> Default for Namespace<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Namespace<T> {
    /// Empty namespace.
    pub fn new() -> Self {
        Self {
            slots: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Publish `value` under `name`, replacing any earlier value.
    pub fn publish(&self, name: &str, value: T) {
        self.slots.lock().insert(name.to_string(), value);
    }

    /// Take `name` out of the namespace.
    pub fn remove(&self, name: &str) -> Option<T> {
        self.slots.lock().remove(name)
    }

    /// Whether `name` is published.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.lock().contains_key(name)
    }
}

impl<T: Clone> Namespace<T> {
    /// A copy of the value published under `name`.
    pub fn lookup(&self, name: &str) -> Option<T> {
        self.slots.lock().get(name).cloned()
    }
}

/// Dynamic source of an implementation.
pub trait Source<T>: Send + Sync {
    /// Start loading `name`.
    fn load(&self, name: &str) -> BoxFuture<'static, Result<T, LoadError>>;
}

impl<T, F> Source<T> for F
where
    F: Fn(&str) -> BoxFuture<'static, Result<T, LoadError>> + Send + Sync,
{
    fn load(&self, name: &str) -> BoxFuture<'static, Result<T, LoadError>> {
        self(name)
    }
}

/// Loader progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    /// `resolve` has not been called yet.
    NotLoaded,
    /// The source is running.
    Loading,
    /// A real implementation is available.
    Ready,
    /// Loading failed; the inert implementation is in use.
    Failed,
}

/// Where a resolved value came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    /// Found already published in the namespace.
    Namespace,
    /// Produced by the source.
    Loaded,
    /// The no-op fallback.
    Inert,
}

/// Outcome shared by every caller of [`FallbackLoader::resolve`].
#[derive(Debug, Clone)]
pub struct Resolved<T> {
    /// The implementation to use.
    pub value: T,
    /// How it was obtained.
    pub origin: Origin,
}

/// The single completion every caller awaits.
pub type Completion<T> = Shared<BoxFuture<'static, Resolved<T>>>;

struct Inner<T> {
    name: String,
    namespace: Namespace<T>,
    source: Option<Arc<dyn Source<T>>>,
    state: LoadState,
    completion: Option<Completion<T>>,
}

/// Four-state loader with a shared completion signal.
pub struct FallbackLoader<T> {
    inner: Arc<Mutex<Inner<T>>>,
}

impl<T> Clone for FallbackLoader<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> FallbackLoader<T>
where
    T: Clone + Inert + Send + Sync + 'static,
{
    /// Loader for `name`, checking `namespace` before `source`.
    pub fn new(name: impl Into<String>, namespace: Namespace<T>, source: Option<Arc<dyn Source<T>>>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                name: name.into(),
                namespace,
                source,
                state: LoadState::NotLoaded,
                completion: None,
            })),
        }
    }

    /// Loader that is already resolved to `value`.
    pub fn ready(name: impl Into<String>, value: T) -> Self {
        let namespace = Namespace::new();
        let name = name.into();
        namespace.publish(&name, value);
        Self::new(name, namespace, None)
    }

    /// Current state.
    pub fn state(&self) -> LoadState {
        self.inner.lock().state
    }

    /// Name being resolved.
    pub fn name(&self) -> String {
        self.inner.lock().name.clone()
    }

    /// Start resolution on first call; every call returns the same completion.
    pub fn resolve(&self) -> Completion<T> {
        let mut inner = self.inner.lock();
        if let Some(completion) = &inner.completion {
            return completion.clone();
        }

        let completion = if let Some(value) = inner.namespace.lookup(&inner.name) {
            log::debug!("`{}` found in namespace", inner.name);
            inner.state = LoadState::Ready;
            futures::future::ready(Resolved {
                value,
                origin: Origin::Namespace,
            })
            .boxed()
            .shared()
        } else {
            inner.state = LoadState::Loading;
            let name = inner.name.clone();
            let pending = match &inner.source {
                Some(source) => source.load(&name),
                None => futures::future::ready(Err(LoadError::NoSource(name.clone()))).boxed(),
            };
            settle(
                Arc::downgrade(&self.inner),
                name,
                inner.namespace.clone(),
                pending,
            )
            .boxed()
            .shared()
        };
        inner.completion = Some(completion.clone());
        completion
    }
}

async fn settle<T>(
    inner: Weak<Mutex<Inner<T>>>,
    name: String,
    namespace: Namespace<T>,
    pending: BoxFuture<'static, Result<T, LoadError>>,
) -> Resolved<T>
where
    T: Clone + Inert + Send + Sync + 'static,
{
    let (resolved, state) = match pending.await {
        Ok(value) => {
            log::debug!("`{name}` loaded");
            namespace.publish(&name, value.clone());
            (
                Resolved {
                    value,
                    origin: Origin::Loaded,
                },
                LoadState::Ready,
            )
        }
        Err(err) => {
            log::error!("{err}; enhancement disabled");
            (
                Resolved {
                    value: T::inert(),
                    origin: Origin::Inert,
                },
                LoadState::Failed,
            )
        }
    };
    if let Some(inner) = inner.upgrade() {
        inner.lock().state = state;
    }
    resolved
}
