use crate::command::{Command, CommandInner};
use crate::component::{Component, Context, WidgetId};
use crate::config::EngineOptions;
use crate::dom::{Document, Mutation, NodeId};
use crate::element::Element;
use crate::event::{DomEvent, WidgetEvent};
use crate::listeners::{Listeners, OwnedSink};
use crate::loader::{FallbackLoader, LoadState};
use crate::registry::Registry;
use crate::scheduler::Scheduler;
use crate::watcher::StructuralWatcher;
use std::collections::BTreeMap;
use std::time::Duration;

/// Deferred work owned by the engine.
enum Task<Msg> {
    /// Scan a subtree inserted after the initial pass.
    Scan(NodeId),
    /// Deliver a message produced by [`Command::tick`].
    Deliver { widget: WidgetId, msg: Msg },
}

/// Drives enhancement and interaction for one document.
///
/// The engine owns the element tree together with everything attached to it:
/// the enhanced widgets, the listener side-table, the deferred task queue, the
/// structural watcher and the outbox of [`WidgetEvent`]s. It is single
/// threaded; every operation runs to completion before returning.
///
/// A widget whose root is removed is parked: it stops counting as live, its
/// listeners are suspended and deferred messages for it are dropped. If the
/// same root is put back into the document the widget resumes where it left
/// off, so enhanced markup never comes back inert.
///
/// # Example
///
/// ```rust,ignore
/// use uplift_core::{Engine, EngineOptions, testing};
///
/// let mut engine = Engine::with_registry(doc, registry, EngineOptions::default());
/// engine.dispatch(testing::click(open_button));
/// for event in engine.take_events() {
///     println!("{} {}: {:?}", event.kind, event.root, event.change);
/// }
/// ```
pub struct Engine<W: Component> {
    doc: Document,
    options: EngineOptions,
    registry: Registry<W>,
    loader: Option<FallbackLoader<Registry<W>>>,
    widgets: BTreeMap<WidgetId, W>,
    parked: BTreeMap<WidgetId, W>,
    next_widget: u64,
    listeners: Listeners<W::Message>,
    scheduler: Scheduler<Task<W::Message>>,
    watcher: StructuralWatcher,
    events: Vec<WidgetEvent>,
    started: bool,
}

impl<W: Component> Engine<W> {
    /// Create an engine whose registry is resolved by `loader` in [`start`](Engine::start).
    ///
    /// Nothing is enhanced until `start` completes.
    pub fn new(doc: Document, loader: FallbackLoader<Registry<W>>, options: EngineOptions) -> Self {
        let watcher = StructuralWatcher::new(options.scan_delay);
        Self {
            doc,
            options,
            registry: Registry::new(),
            loader: Some(loader),
            widgets: BTreeMap::new(),
            parked: BTreeMap::new(),
            next_widget: 1,
            listeners: Listeners::new(),
            scheduler: Scheduler::new(),
            watcher,
            events: Vec::new(),
            started: false,
        }
    }

    /// Create an engine backed by a registry that is already available and
    /// run the initial pass over the whole document.
    pub fn with_registry(doc: Document, registry: Registry<W>, options: EngineOptions) -> Self {
        let watcher = StructuralWatcher::new(options.scan_delay);
        let mut engine = Self {
            doc,
            options,
            registry: Registry::new(),
            loader: None,
            widgets: BTreeMap::new(),
            parked: BTreeMap::new(),
            next_widget: 1,
            listeners: Listeners::new(),
            scheduler: Scheduler::new(),
            watcher,
            events: Vec::new(),
            started: false,
        };
        engine.install(registry);
        engine.begin();
        engine
    }

    /// Resolve the loader, connect the watcher and run the initial pass.
    ///
    /// A failed load installs the inert registry: the page keeps working as
    /// static markup. Calling `start` again does nothing.
    pub async fn start(&mut self) {
        if self.started {
            return;
        }
        if let Some(loader) = self.loader.clone() {
            let resolved = loader.resolve().await;
            log::debug!(
                "registry resolved from {:?} with {} descriptor(s)",
                resolved.origin,
                resolved.value.descriptors().len()
            );
            self.install(resolved.value);
        }
        self.begin();
    }

    fn install(&mut self, registry: Registry<W>) {
        self.watcher.clear();
        if !registry.is_inert() {
            let probe = registry.clone();
            let prefix = self.options.marker_prefix.clone();
            self.watcher
                .subscribe(Box::new(move |doc, node| probe.probe(doc, node, &prefix)));
        }
        self.registry = registry;
    }

    fn begin(&mut self) {
        // Markup present before the initial pass is covered by the pass itself.
        self.doc.take_mutations();
        self.watcher.connect();
        self.started = true;
        let root = self.doc.root();
        self.enhance_all(root);
        self.flush_mutations();
    }

    /// Whether [`start`](Engine::start) (or [`with_registry`](Engine::with_registry)) ran.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Loader progress. Engines built with a registry report [`LoadState::Ready`].
    pub fn load_state(&self) -> LoadState {
        self.loader
            .as_ref()
            .map_or(LoadState::Ready, FallbackLoader::state)
    }

    /// The active registry.
    pub fn registry(&self) -> &Registry<W> {
        &self.registry
    }

    // -- enhancement -------------------------------------------------------

    /// Enhance every unenhanced widget in `root` and its descendants.
    ///
    /// Elements are visited in document order and, per element, descriptors
    /// in declaration order. Elements already carrying a descriptor's marker
    /// are skipped, so repeated calls are no-ops.
    pub fn enhance_all(&mut self, root: NodeId) {
        if !self.doc.is_connected(root) {
            log::debug!("skipping scan of detached node {root}");
            return;
        }
        let prefix = self.options.marker_prefix.clone();
        for (node, index) in self.registry.candidates(&self.doc, root, &prefix) {
            self.enhance_element(node, index);
        }
    }

    fn enhance_element(&mut self, node: NodeId, index: usize) -> bool {
        let Some(descriptor) = self.registry.descriptors().get(index) else {
            return false;
        };
        let kind = descriptor.kind;
        let enhance = descriptor.enhance;
        let marker = self.options.marker(kind);
        if !self.doc.is_connected(node) || self.doc.has_attr(node, &marker) {
            return false;
        }
        if let Some(missing) = descriptor.missing(&self.doc, node) {
            log::warn!("{kind} {node}: missing required element `{missing}`; left as static markup");
            return false;
        }

        self.doc.set_attr(node, &marker, "true");
        let id = WidgetId::new(self.next_widget);
        self.next_widget += 1;

        let mut sink = OwnedSink {
            listeners: &mut self.listeners,
            owner: id,
        };
        let mut cx = Context::new(&mut self.doc, &mut sink, &mut self.events, &self.options);
        match enhance(&mut cx, node) {
            Ok(widget) => {
                log::debug!("enhanced {kind} {node}");
                self.widgets.insert(id, widget);
                true
            }
            Err(err) => {
                let removed = self.listeners.remove_owner(id);
                self.doc.remove_attr(node, &marker);
                log::warn!("{kind} {node}: {err}; rolled back {removed} listener(s)");
                false
            }
        }
    }

    /// Process `root` again: enhanced widgets inside it re-scan their markup
    /// and unenhanced ones are enhanced.
    pub fn refresh(&mut self, root: NodeId) {
        self.flush_mutations();
        let ids: Vec<WidgetId> = self
            .widgets
            .iter()
            .filter(|(_, w)| self.doc.contains(root, w.root()))
            .map(|(id, _)| *id)
            .collect();
        for id in ids {
            let Some(widget) = self.widgets.get_mut(&id) else {
                continue;
            };
            let mut sink = OwnedSink {
                listeners: &mut self.listeners,
                owner: id,
            };
            let mut cx = Context::new(&mut self.doc, &mut sink, &mut self.events, &self.options);
            let cmd = widget.refresh(&mut cx);
            self.run_command(id, cmd);
        }
        self.enhance_all(root);
        self.flush_mutations();
    }

    // -- interaction -------------------------------------------------------

    /// Dispatch a DOM event.
    ///
    /// The event bubbles from its target to the document root. On each node
    /// the handlers registered for the event kind run in registration order;
    /// every message they produce goes to the widget that registered them.
    pub fn dispatch(&mut self, event: DomEvent) {
        self.flush_mutations();
        if !self.doc.is_connected(event.target) {
            log::debug!("{:?} on detached node {} ignored", event.kind, event.target);
            return;
        }
        for node in self.doc.ancestors(event.target) {
            for (owner, handler) in self.listeners.handlers(node, event.kind) {
                if let Some(msg) = handler(&event) {
                    self.deliver(owner, msg);
                }
            }
        }
        self.flush_mutations();
    }

    /// Send a message straight to the first widget enhanced from `root`.
    ///
    /// Returns `false` when no live widget has that root.
    pub fn send(&mut self, root: NodeId, msg: W::Message) -> bool {
        let Some(id) = self
            .widgets
            .iter()
            .find(|(_, w)| w.root() == root)
            .map(|(id, _)| *id)
        else {
            return false;
        };
        self.deliver(id, msg);
        self.flush_mutations();
        true
    }

    fn deliver(&mut self, id: WidgetId, msg: W::Message) {
        let Some(widget) = self.widgets.get_mut(&id) else {
            log::debug!("message for inactive widget {} dropped", id.get());
            return;
        };
        if !self.doc.is_connected(widget.root()) {
            log::debug!("message for detached {} {} dropped", widget.kind(), widget.root());
            return;
        }
        let mut sink = OwnedSink {
            listeners: &mut self.listeners,
            owner: id,
        };
        let mut cx = Context::new(&mut self.doc, &mut sink, &mut self.events, &self.options);
        let cmd = widget.update(&mut cx, msg);
        self.run_command(id, cmd);
    }

    fn run_command(&mut self, id: WidgetId, cmd: Command<W::Message>) {
        match cmd.inner {
            CommandInner::None => {}
            CommandInner::Message(msg) => self.deliver(id, msg),
            CommandInner::Tick { delay, msg } => {
                self.scheduler.schedule(delay, Task::Deliver { widget: id, msg });
            }
            CommandInner::Batch(cmds) => {
                for cmd in cmds {
                    self.run_command(id, cmd);
                }
            }
        }
    }

    // -- time --------------------------------------------------------------

    /// Move the virtual clock forward by `by`, running every task that falls due.
    pub fn advance(&mut self, by: Duration) {
        self.flush_mutations();
        let target = self.scheduler.now() + by;
        while let Some(deadline) = self.scheduler.next_deadline() {
            if deadline > target {
                break;
            }
            self.scheduler.set_now(deadline);
            while let Some(task) = self.scheduler.pop_due() {
                self.run_task(task);
                self.flush_mutations();
            }
        }
        self.scheduler.set_now(target);
    }

    /// Sleep on the tokio timer until no deferred work is left.
    pub async fn run_until_idle(&mut self) {
        self.flush_mutations();
        while let Some(delay) = self.scheduler.next_delay() {
            tokio::time::sleep(delay).await;
            self.advance(delay);
        }
    }

    /// Current virtual time.
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Number of deferred tasks waiting.
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.len()
    }

    fn run_task(&mut self, task: Task<W::Message>) {
        match task {
            Task::Scan(node) => {
                if self.doc.is_connected(node) {
                    self.enhance_all(node);
                } else {
                    log::debug!("deferred scan of {node} skipped: node was removed");
                }
            }
            Task::Deliver { widget, msg } => self.deliver(widget, msg),
        }
    }

    /// Feed pending structural changes to the watcher, park widgets whose
    /// roots left the document and revive parked ones that came back.
    fn flush_mutations(&mut self) {
        let batch = self.doc.take_mutations();
        if batch.is_empty() {
            return;
        }
        if batch.iter().any(Mutation::is_removal) {
            self.sweep();
        }
        if !self.parked.is_empty() && batch.iter().any(|m| !m.is_removal()) {
            self.revive();
        }
        let delay = self.watcher.delay();
        for node in self.watcher.observe(&self.doc, &batch) {
            self.scheduler.schedule(delay, Task::Scan(node));
        }
    }

    fn sweep(&mut self) {
        let detached: Vec<WidgetId> = self
            .widgets
            .iter()
            .filter(|(_, w)| !self.doc.is_connected(w.root()))
            .map(|(id, _)| *id)
            .collect();
        for id in detached {
            if let Some(widget) = self.widgets.remove(&id) {
                let suspended = self.listeners.suspend_owner(id);
                log::debug!(
                    "parked {} {} with {suspended} listener(s)",
                    widget.kind(),
                    widget.root()
                );
                self.parked.insert(id, widget);
            }
        }
    }

    fn revive(&mut self) {
        let returned: Vec<WidgetId> = self
            .parked
            .iter()
            .filter(|(_, w)| self.doc.is_connected(w.root()))
            .map(|(id, _)| *id)
            .collect();
        for id in returned {
            if let Some(widget) = self.parked.remove(&id) {
                let resumed = self.listeners.resume_owner(id);
                log::debug!(
                    "revived {} {} with {resumed} listener(s)",
                    widget.kind(),
                    widget.root()
                );
                self.widgets.insert(id, widget);
            }
        }
    }

    // -- document access ---------------------------------------------------

    /// The document.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// The document, mutably. Structural changes made here are picked up by
    /// the watcher on the next dispatch, advance or refresh.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Insert a fragment under `parent`; it is scanned after the settle delay.
    pub fn append(&mut self, parent: NodeId, element: Element) -> NodeId {
        let node = self.doc.append_fragment(parent, element);
        self.flush_mutations();
        node
    }

    /// Remove `node` from the document, parking widgets inside it.
    pub fn remove(&mut self, node: NodeId) -> bool {
        let removed = self.doc.remove(node);
        self.flush_mutations();
        removed
    }

    // -- inspection --------------------------------------------------------

    /// The first widget enhanced from `root`.
    pub fn widget(&self, root: NodeId) -> Option<&W> {
        self.widgets.values().find(|w| w.root() == root)
    }

    /// Every live widget in enhancement order.
    pub fn widgets(&self) -> impl Iterator<Item = &W> {
        self.widgets.values()
    }

    /// Number of live widgets.
    pub fn widget_count(&self) -> usize {
        self.widgets.len()
    }

    /// Number of widgets parked because their root is out of the document.
    pub fn parked_count(&self) -> usize {
        self.parked.len()
    }

    /// Number of attached listeners on `node`.
    pub fn listener_count(&self, node: NodeId) -> usize {
        self.listeners.count(node)
    }

    /// Total number of attached listeners.
    pub fn total_listeners(&self) -> usize {
        self.listeners.len()
    }

    /// Drain the outbox of widget events.
    pub fn take_events(&mut self) -> Vec<WidgetEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventKind, StateChange};
    use crate::loader::{LoadError, Namespace, Source};
    use crate::registry::{Descriptor, EnhanceError};
    use crate::testing;
    use futures::FutureExt;
    use std::sync::Arc;

    #[derive(Debug)]
    enum Msg {
        Flip,
        FlipLater,
    }

    struct Toggle {
        root: NodeId,
        button: NodeId,
        open: bool,
    }

    impl Component for Toggle {
        type Message = Msg;

        fn kind(&self) -> &'static str {
            "toggle"
        }

        fn root(&self) -> NodeId {
            self.root
        }

        fn update(&mut self, cx: &mut Context<'_, Msg>, msg: Msg) -> Command<Msg> {
            match msg {
                Msg::Flip => {
                    self.open = !self.open;
                    cx.doc_mut().toggle_class(self.root, "is-open", self.open);
                    cx.doc_mut()
                        .set_attr(self.button, "aria-expanded", self.open.to_string());
                    let change = if self.open {
                        StateChange::Opened
                    } else {
                        StateChange::Closed
                    };
                    cx.emit(WidgetEvent::new("toggle", self.root, change));
                    Command::none()
                }
                Msg::FlipLater => Command::tick(Duration::from_millis(100), Msg::Flip),
            }
        }
    }

    fn enhance_toggle(cx: &mut Context<'_, Msg>, root: NodeId) -> Result<Toggle, EnhanceError> {
        let button = cx.require(root, "button")?;
        cx.listen(button, EventKind::Click, |_| Some(Msg::Flip));
        Ok(Toggle {
            root,
            button,
            open: false,
        })
    }

    fn enhance_broken(cx: &mut Context<'_, Msg>, root: NodeId) -> Result<Toggle, EnhanceError> {
        cx.listen(root, EventKind::Click, |_| Some(Msg::Flip));
        let button = cx.require(root, "button.never")?;
        Ok(Toggle {
            root,
            button,
            open: false,
        })
    }

    fn registry() -> Registry<Toggle> {
        Registry::new()
            .register(
                Descriptor::new("toggle", ".toggle", enhance_toggle)
                    .unwrap()
                    .require("button")
                    .unwrap(),
            )
            .register(Descriptor::new("broken", ".broken", enhance_broken).unwrap())
    }

    fn toggle_markup() -> Element {
        Element::new("div")
            .class("toggle")
            .child(Element::new("button").child(Element::new("span").text("Open")))
    }

    fn page(children: Vec<Element>) -> (Document, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let main = doc.append_fragment(root, Element::new("main").children(children));
        (doc, main)
    }

    #[test]
    fn initial_pass_marks_and_is_idempotent() {
        let (doc, main) = page(vec![toggle_markup()]);
        let mut engine = Engine::with_registry(doc, registry(), EngineOptions::default());
        let toggle = engine.document().children(main)[0];
        let button = engine.document().children(toggle)[0];

        assert_eq!(engine.document().attr(toggle, "data-enhanced-toggle"), Some("true"));
        assert_eq!(engine.widget_count(), 1);
        assert_eq!(engine.listener_count(button), 1);

        engine.enhance_all(engine.document().root());
        engine.enhance_all(toggle);
        assert_eq!(engine.widget_count(), 1);
        assert_eq!(engine.listener_count(button), 1);
    }

    #[test]
    fn clicks_bubble_to_the_registered_node() {
        let (doc, main) = page(vec![toggle_markup()]);
        let mut engine = Engine::with_registry(doc, registry(), EngineOptions::default());
        let toggle = engine.document().children(main)[0];
        let button = engine.document().children(toggle)[0];
        let label = engine.document().children(button)[0];

        engine.dispatch(testing::click(label));
        assert!(engine.document().has_class(toggle, "is-open"));
        assert_eq!(engine.document().attr(button, "aria-expanded"), Some("true"));

        let events = engine.take_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].change, StateChange::Opened);

        engine.dispatch(testing::click(toggle));
        assert!(engine.document().has_class(toggle, "is-open"));
    }

    #[test]
    fn missing_requirement_leaves_element_unmarked() {
        let (doc, main) = page(vec![Element::new("div").class("toggle")]);
        let mut engine = Engine::with_registry(doc, registry(), EngineOptions::default());
        let toggle = engine.document().children(main)[0];
        assert!(!engine.document().has_attr(toggle, "data-enhanced-toggle"));
        assert_eq!(engine.widget_count(), 0);

        engine.document_mut().append_fragment(toggle, Element::new("button"));
        engine.refresh(toggle);
        assert!(engine.document().has_attr(toggle, "data-enhanced-toggle"));
        assert_eq!(engine.widget_count(), 1);
    }

    #[test]
    fn failed_enhancer_rolls_back_listeners_and_marker() {
        let (doc, main) = page(vec![Element::new("div").class("broken")]);
        let engine = Engine::with_registry(doc, registry(), EngineOptions::default());
        let broken = engine.document().children(main)[0];
        assert!(!engine.document().has_attr(broken, "data-enhanced-broken"));
        assert_eq!(engine.total_listeners(), 0);
        assert_eq!(engine.widget_count(), 0);
    }

    #[test]
    fn inserted_fragments_are_enhanced_after_the_settle_delay() {
        let (doc, main) = page(vec![]);
        let mut engine = Engine::with_registry(doc, registry(), EngineOptions::default());
        let toggle = engine.append(main, toggle_markup());

        assert_eq!(engine.widget_count(), 0);
        engine.advance(Duration::from_millis(19));
        assert_eq!(engine.widget_count(), 0);
        engine.advance(Duration::from_millis(1));
        assert_eq!(engine.widget_count(), 1);
        assert!(engine.widget(toggle).is_some());
    }

    #[test]
    fn batch_inserts_scan_in_insertion_order() {
        let (doc, main) = page(vec![]);
        let mut engine = Engine::with_registry(doc, registry(), EngineOptions::default());
        let first = engine.append(main, toggle_markup());
        let second = engine.append(main, toggle_markup());
        engine.advance(Duration::from_millis(20));

        let roots: Vec<NodeId> = engine.widgets().map(|w| w.root()).collect();
        assert_eq!(roots, vec![first, second]);
    }

    #[test]
    fn removal_before_the_deferred_scan_is_a_silent_no_op() {
        let (doc, main) = page(vec![]);
        let mut engine = Engine::with_registry(doc, registry(), EngineOptions::default());
        let toggle = engine.append(main, toggle_markup());
        assert!(engine.remove(toggle));

        engine.advance(Duration::from_millis(50));
        assert_eq!(engine.widget_count(), 0);
        assert!(!engine.document().has_attr(toggle, "data-enhanced-toggle"));
    }

    #[test]
    fn removed_widgets_are_parked_with_their_listeners() {
        let (doc, main) = page(vec![toggle_markup()]);
        let mut engine = Engine::with_registry(doc, registry(), EngineOptions::default());
        let toggle = engine.document().children(main)[0];
        assert_eq!(engine.total_listeners(), 1);

        engine.remove(toggle);
        assert_eq!(engine.widget_count(), 0);
        assert_eq!(engine.parked_count(), 1);
        assert_eq!(engine.total_listeners(), 0);
    }

    #[test]
    fn reinserted_roots_keep_working() {
        let (doc, main) = page(vec![toggle_markup()]);
        let mut engine = Engine::with_registry(doc, registry(), EngineOptions::default());
        let toggle = engine.document().children(main)[0];
        let button = engine.document().children(toggle)[0];
        engine.dispatch(testing::click(button));
        engine.take_events();

        engine.remove(toggle);
        engine.document_mut().append_child(main, toggle);
        engine.advance(Duration::from_millis(100));

        assert_eq!(engine.widget_count(), 1);
        assert_eq!(engine.parked_count(), 0);
        assert_eq!(engine.listener_count(button), 1);
        assert_eq!(engine.document().attr(toggle, "data-enhanced-toggle"), Some("true"));

        // State survives the round trip and clicks reach the widget again.
        engine.dispatch(testing::click(button));
        assert!(!engine.document().has_class(toggle, "is-open"));
        assert_eq!(engine.document().attr(button, "aria-expanded"), Some("false"));
        let changes: Vec<_> = engine.take_events().into_iter().map(|e| e.change).collect();
        assert_eq!(changes, vec![StateChange::Closed]);
    }

    #[test]
    fn moving_a_root_within_the_page_keeps_it_live() {
        let (doc, main) = page(vec![toggle_markup()]);
        let mut engine = Engine::with_registry(doc, registry(), EngineOptions::default());
        let toggle = engine.document().children(main)[0];
        let button = engine.document().children(toggle)[0];
        let body = engine.document().root();

        engine.document_mut().remove(toggle);
        engine.document_mut().append_child(body, toggle);
        engine.dispatch(testing::click(button));

        assert_eq!(engine.widget_count(), 1);
        assert_eq!(engine.parked_count(), 0);
        assert!(engine.document().has_class(toggle, "is-open"));
    }

    #[test]
    fn ticks_are_delivered_on_the_virtual_clock() {
        let (doc, main) = page(vec![toggle_markup()]);
        let mut engine = Engine::with_registry(doc, registry(), EngineOptions::default());
        let toggle = engine.document().children(main)[0];

        assert!(engine.send(toggle, Msg::FlipLater));
        assert_eq!(engine.pending_tasks(), 1);
        engine.advance(Duration::from_millis(99));
        assert!(!engine.document().has_class(toggle, "is-open"));
        engine.advance(Duration::from_millis(1));
        assert!(engine.document().has_class(toggle, "is-open"));
        assert_eq!(engine.now(), Duration::from_millis(100));
    }

    #[test]
    fn ticks_for_removed_widgets_are_dropped() {
        let (doc, main) = page(vec![toggle_markup()]);
        let mut engine = Engine::with_registry(doc, registry(), EngineOptions::default());
        let toggle = engine.document().children(main)[0];

        engine.send(toggle, Msg::FlipLater);
        engine.remove(toggle);
        engine.advance(Duration::from_secs(1));
        assert!(engine.take_events().is_empty());
        assert!(!engine.send(toggle, Msg::Flip));
    }

    #[tokio::test]
    async fn start_resolves_the_loader_before_the_initial_pass() {
        let (doc, main) = page(vec![toggle_markup()]);
        let loader = FallbackLoader::ready("toggles", registry());
        let mut engine = Engine::new(doc, loader, EngineOptions::default());
        assert!(!engine.is_started());
        assert_eq!(engine.widget_count(), 0);

        engine.start().await;
        assert_eq!(engine.load_state(), LoadState::Ready);
        assert!(engine.widget(engine.document().children(main)[0]).is_some());
    }

    #[tokio::test]
    async fn forced_load_failure_makes_every_call_a_no_op() {
        let (doc, main) = page(vec![toggle_markup()]);
        let source: Arc<dyn Source<Registry<Toggle>>> = Arc::new(|name: &str| {
            let name = name.to_string();
            async move {
                Err::<Registry<Toggle>, _>(LoadError::Failed {
                    name,
                    reason: "blocked".into(),
                })
            }
            .boxed()
        });
        let loader = FallbackLoader::new("toggles", Namespace::new(), Some(source));
        let mut engine = Engine::new(doc, loader, EngineOptions::default());
        engine.start().await;

        assert_eq!(engine.load_state(), LoadState::Failed);
        let toggle = engine.document().children(main)[0];
        let button = engine.document().children(toggle)[0];

        engine.enhance_all(engine.document().root());
        engine.dispatch(testing::click(button));
        engine.append(main, toggle_markup());
        engine.advance(Duration::from_secs(1));
        engine.refresh(main);

        assert_eq!(engine.widget_count(), 0);
        assert!(engine.take_events().is_empty());
        assert!(!engine.document().has_attr(toggle, "data-enhanced-toggle"));
    }

    #[tokio::test]
    async fn run_until_idle_drains_deferred_work() {
        let (doc, main) = page(vec![]);
        let mut engine = Engine::with_registry(doc, registry(), EngineOptions::default());
        engine.append(main, toggle_markup());
        engine.run_until_idle().await;
        assert_eq!(engine.widget_count(), 1);
        assert_eq!(engine.pending_tasks(), 0);
    }
}
