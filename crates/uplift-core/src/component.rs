use crate::command::Command;
use crate::config::EngineOptions;
use crate::dom::{Document, NodeId};
use crate::event::{DomEvent, EventKind, WidgetEvent};
use crate::listeners::{ListenerError, ListenerId, ListenerSink, MapSink};
use crate::registry::EnhanceError;
use crate::selector::Selector;
use chrono::NaiveDate;
use std::sync::Arc;

/// Identity of one enhanced widget instance inside an [`Engine`](crate::Engine).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WidgetId(u64);

impl WidgetId {
    /// Wrap a raw id.
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw id.
    pub fn get(self) -> u64 {
        self.0
    }
}

/// An enhanced widget: a state machine attached to one root element.
///
/// `Component` mirrors the Elm-style update loop: DOM events reach the widget
/// as messages produced by the handlers it registered through
/// [`Context::listen`], and [`update`](Component::update) mutates both the
/// widget state and the document, returning a [`Command`] for follow-ups.
///
/// # Composition pattern
///
/// Individual widgets each have their own `Message` type. A tagged union over
/// all widget types implements `Component` by delegating and lifting messages
/// with [`Command::map`] and [`Context::scope`]:
///
/// ```rust,ignore
/// enum Widget { Modal(Modal), Tooltip(Tooltip) }
/// enum WidgetMessage { Modal(modal::Message), Tooltip(tooltip::Message) }
///
/// impl Component for Widget {
///     type Message = WidgetMessage;
///
///     fn update(&mut self, cx: &mut Context<'_, WidgetMessage>, msg: WidgetMessage)
///         -> Command<WidgetMessage>
///     {
///         match (self, msg) {
///             (Widget::Modal(w), WidgetMessage::Modal(m)) => cx
///                 .scope(WidgetMessage::Modal, |cx| w.update(cx, m))
///                 .map(WidgetMessage::Modal),
///             // ...
///         }
///     }
/// }
/// ```
pub trait Component: Send + 'static {
    /// The widget's message type.
    type Message: Send + 'static;

    /// Type tag, e.g. `"combobox"`.
    fn kind(&self) -> &'static str;

    /// The element this instance was enhanced from.
    fn root(&self) -> NodeId;

    /// Process a message, mutate state and document, return follow-ups.
    fn update(
        &mut self,
        cx: &mut Context<'_, Self::Message>,
        msg: Self::Message,
    ) -> Command<Self::Message>;

    /// Re-scan the widget's markup after it was processed again.
    ///
    /// Widgets whose sub-elements can change after enhancement override this
    /// and must detach listeners they attached earlier before attaching new
    /// ones. The default does nothing.
    fn refresh(&mut self, cx: &mut Context<'_, Self::Message>) -> Command<Self::Message> {
        let _ = cx;
        Command::none()
    }
}

/// Everything a widget may touch while enhancing or updating.
pub struct Context<'a, Msg> {
    doc: &'a mut Document,
    sink: &'a mut dyn ListenerSink<Msg>,
    events: &'a mut Vec<WidgetEvent>,
    options: &'a EngineOptions,
}

impl<'a, Msg: Send + 'static> Context<'a, Msg> {
    /// Assemble a context. The engine does this for every enhancement and update.
    pub fn new(
        doc: &'a mut Document,
        sink: &'a mut dyn ListenerSink<Msg>,
        events: &'a mut Vec<WidgetEvent>,
        options: &'a EngineOptions,
    ) -> Self {
        Self {
            doc,
            sink,
            events,
            options,
        }
    }

    /// The document.
    pub fn doc(&self) -> &Document {
        self.doc
    }

    /// The document, mutably.
    pub fn doc_mut(&mut self) -> &mut Document {
        self.doc
    }

    /// Engine options.
    pub fn options(&self) -> &EngineOptions {
        self.options
    }

    /// Today's date, honoring [`EngineOptions::today`].
    pub fn today(&self) -> NaiveDate {
        self.options.today()
    }

    /// Attach a handler for `kind` events reaching `node`.
    pub fn listen(
        &mut self,
        node: NodeId,
        kind: EventKind,
        handler: impl Fn(&DomEvent) -> Option<Msg> + Send + Sync + 'static,
    ) -> ListenerId {
        self.sink.add(node, kind, Arc::new(handler))
    }

    /// Detach a handler attached earlier.
    pub fn unlisten(&mut self, node: NodeId, id: ListenerId) -> Result<(), ListenerError> {
        self.sink.remove(node, id)
    }

    /// Queue an outbound notification.
    pub fn emit(&mut self, event: WidgetEvent) {
        log::debug!("{} {}: {:?}", event.kind, event.root, event.change);
        self.events.push(event);
    }

    /// First descendant of `scope` matching `selector`.
    pub fn select(&self, scope: NodeId, selector: &str) -> Result<Option<NodeId>, EnhanceError> {
        let selector = Selector::parse(selector)?;
        Ok(self.doc.select(scope, &selector))
    }

    /// All descendants of `scope` matching `selector`.
    pub fn select_all(&self, scope: NodeId, selector: &str) -> Result<Vec<NodeId>, EnhanceError> {
        let selector = Selector::parse(selector)?;
        Ok(self.doc.select_all(scope, &selector))
    }

    /// Like [`select`](Context::select) but a miss is a structural mismatch.
    pub fn require(&self, scope: NodeId, selector: &str) -> Result<NodeId, EnhanceError> {
        self.select(scope, selector)?
            .ok_or_else(|| EnhanceError::MissingElement {
                selector: selector.to_string(),
            })
    }

    /// Run `body` with a context for a child message type `N`.
    ///
    /// Handlers registered inside `body` produce `N`; they are lifted into
    /// `Msg` with `lift` before reaching the listener table.
    pub fn scope<N, R>(
        &mut self,
        lift: impl Fn(N) -> Msg + Send + Sync + 'static,
        body: impl FnOnce(&mut Context<'_, N>) -> R,
    ) -> R
    where
        N: Send + 'static,
        Msg: 'static,
    {
        let mut sink = MapSink {
            inner: &mut *self.sink,
            lift: Arc::new(lift),
        };
        let mut cx = Context {
            doc: &mut *self.doc,
            sink: &mut sink,
            events: &mut *self.events,
            options: self.options,
        };
        body(&mut cx)
    }
}
