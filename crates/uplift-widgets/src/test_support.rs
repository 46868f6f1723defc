use crate::widget::Enhancer;
use uplift_core::{Component, Document, Element, Engine, EngineOptions, NodeId, Registry, Selector};

/// Mount `markup` under the body and run the initial pass with only `E` registered.
pub(crate) fn mount<E: Enhancer>(markup: Element) -> (Engine<E>, NodeId) {
    mount_with::<E>(markup, EngineOptions::default())
}

pub(crate) fn mount_with<E: Enhancer>(markup: Element, options: EngineOptions) -> (Engine<E>, NodeId) {
    let (engine, nodes) = mount_page::<E>(vec![markup], options);
    (engine, nodes[0])
}

/// Mount several top-level fragments; returns them in order.
pub(crate) fn mount_page<E: Enhancer>(
    fragments: Vec<Element>,
    options: EngineOptions,
) -> (Engine<E>, Vec<NodeId>) {
    let mut doc = Document::new();
    let body = doc.root();
    let nodes = fragments
        .into_iter()
        .map(|fragment| doc.append_fragment(body, fragment))
        .collect();
    let registry = Registry::new().register(E::descriptor().expect("valid selectors"));
    (Engine::with_registry(doc, registry, options), nodes)
}

pub(crate) fn find<W: Component>(engine: &Engine<W>, scope: NodeId, selector: &str) -> NodeId {
    let sel = Selector::parse(selector).expect("valid selector");
    engine
        .document()
        .select(scope, &sel)
        .unwrap_or_else(|| panic!("no `{selector}` under {scope}"))
}

pub(crate) fn find_all<W: Component>(engine: &Engine<W>, scope: NodeId, selector: &str) -> Vec<NodeId> {
    let sel = Selector::parse(selector).expect("valid selector");
    engine.document().select_all(scope, &sel)
}

pub(crate) fn count<W: Component>(engine: &Engine<W>, scope: NodeId, selector: &str) -> usize {
    find_all(engine, scope, selector).len()
}
