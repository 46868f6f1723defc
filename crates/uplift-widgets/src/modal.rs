//! Modal dialog with a focus trap.
//!
//! The dialog root is the outer wrapper (the backdrop). Any control on the
//! page carrying `data-open-modal` and `aria-controls=<dialog id>` opens it.
//! While open, Tab and Shift-Tab cycle through the dialog's tabbable
//! descendants and never leave it.

use crate::focus::{self, FocusRing};
use crate::key::TrapKeys;
use crate::widget::Enhancer;
use crossterm::event::KeyEvent;
use uplift_core::{
    Command, Component, Context, EnhanceError, EventKind, NodeId, Selector, StateChange,
    WidgetEvent,
};

/// Type tag.
pub const KIND: &str = "modal";
/// Root marker.
pub const MARKER: &str = ".modal[id]";
/// Required sub-elements.
pub const REQUIRED: &[&str] = &[];

const VISIBLE: &str = "is-visible";

/// Messages for the modal.
#[derive(Debug, Clone)]
pub enum Message {
    /// A click somewhere on the page.
    Click(NodeId),
    /// A key was pressed inside the dialog.
    KeyPress(KeyEvent),
}

/// An enhanced modal dialog.
pub struct Modal {
    root: NodeId,
    id: String,
    opener: Selector,
    closer: Selector,
    open: bool,
    return_focus: Option<NodeId>,
    keys: TrapKeys,
}

impl Enhancer for Modal {
    const KIND: &'static str = KIND;
    const MARKER: &'static str = MARKER;
    const REQUIRED: &'static [&'static str] = REQUIRED;

    fn enhance(cx: &mut Context<'_, Message>, root: NodeId) -> Result<Self, EnhanceError> {
        let id = cx.doc().attr(root, "id").unwrap_or_default().to_string();
        let opener = Selector::parse("[data-open-modal]")?;
        let closer = Selector::parse("[data-close-modal]")?;

        let doc = cx.doc_mut();
        doc.set_attr(root, "role", "dialog");
        doc.set_attr(root, "aria-modal", "true");
        doc.set_attr(root, "tabindex", "-1");
        doc.set_hidden(root, true);

        let body = cx.doc().root();
        cx.listen(body, EventKind::Click, |ev| Some(Message::Click(ev.target)));
        cx.listen(root, EventKind::KeyDown, |ev| ev.key.map(Message::KeyPress));

        Ok(Self {
            root,
            id,
            opener,
            closer,
            open: false,
            return_focus: None,
            keys: TrapKeys::default(),
        })
    }
}

impl Modal {
    /// Whether the dialog is showing.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// The dialog's `id`.
    pub fn id(&self) -> &str {
        &self.id
    }

    fn open(&mut self, cx: &mut Context<'_, Message>, opener: NodeId) {
        self.return_focus = cx.doc().focused().or(Some(opener));
        self.open = true;
        let doc = cx.doc_mut();
        doc.set_hidden(self.root, false);
        doc.add_class(self.root, VISIBLE);
        let first = doc.focusable_descendants(self.root).first().copied();
        doc.focus(first.unwrap_or(self.root));
        cx.emit(WidgetEvent::new(KIND, self.root, StateChange::Opened));
    }

    fn close(&mut self, cx: &mut Context<'_, Message>) {
        self.open = false;
        let doc = cx.doc_mut();
        doc.set_hidden(self.root, true);
        doc.remove_class(self.root, VISIBLE);
        if let Some(node) = self.return_focus.take() {
            if !doc.focus(node) {
                log::debug!("{}: return focus target {node} is gone", self.root);
            }
        }
        cx.emit(WidgetEvent::new(KIND, self.root, StateChange::Closed));
    }

    fn click(&mut self, cx: &mut Context<'_, Message>, target: NodeId) {
        let doc = cx.doc();
        if !self.open {
            let opener = doc
                .closest(target, &self.opener)
                .filter(|o| doc.attr(*o, "aria-controls") == Some(self.id.as_str()));
            if let Some(opener) = opener {
                self.open(cx, opener);
            }
            return;
        }
        let backdrop = target == self.root;
        let close_control = doc
            .closest(target, &self.closer)
            .is_some_and(|c| doc.contains(self.root, c));
        if backdrop || close_control {
            self.close(cx);
        }
    }

    fn cycle(&mut self, cx: &mut Context<'_, Message>, forward: bool) {
        let doc = cx.doc_mut();
        let nodes = doc.focusable_descendants(self.root);
        if nodes.is_empty() {
            doc.focus(self.root);
            return;
        }
        let current = doc.focused().and_then(|f| nodes.iter().position(|n| *n == f));
        let start = current.unwrap_or(if forward { nodes.len() - 1 } else { 0 });
        let mut ring = FocusRing::at(nodes.len(), start);
        if forward {
            ring.focus_next();
        } else {
            ring.focus_prev();
        }
        focus::apply(doc, &nodes, ring);
    }
}

impl Component for Modal {
    type Message = Message;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn update(&mut self, cx: &mut Context<'_, Message>, msg: Message) -> Command<Message> {
        match msg {
            Message::Click(target) => self.click(cx, target),
            Message::KeyPress(key) if self.open => {
                if self.keys.dismiss.matches(&key) {
                    self.close(cx);
                } else if self.keys.backward.matches(&key) {
                    self.cycle(cx, false);
                } else if self.keys.forward.matches(&key) {
                    self.cycle(cx, true);
                }
            }
            Message::KeyPress(_) => {}
        }
        Command::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{find, mount_page};
    use crossterm::event::{KeyCode, KeyModifiers};
    use uplift_core::{testing, Element, Engine, EngineOptions};

    struct Page {
        engine: Engine<Modal>,
        opener: NodeId,
        dialog: NodeId,
    }

    fn page() -> Page {
        let opener = Element::new("button")
            .attr("data-open-modal", "")
            .attr("aria-controls", "terms");
        let other = Element::new("button")
            .attr("data-open-modal", "")
            .attr("aria-controls", "elsewhere");
        let dialog = Element::new("div").class("modal").id("terms").child(
            Element::new("div")
                .class("modal__content")
                .child(Element::new("h2").text("Terms"))
                .child(Element::new("a").class("first").attr("href", "#terms-doc"))
                .child(Element::new("button").class("accept").text("Accept"))
                .child(
                    Element::new("button")
                        .class("close")
                        .attr("data-close-modal", "")
                        .text("Close"),
                ),
        );
        let (engine, nodes) = mount_page::<Modal>(vec![opener, other, dialog], EngineOptions::default());
        Page {
            engine,
            opener: nodes[0],
            dialog: nodes[2],
        }
    }

    fn is_open(page: &Page) -> bool {
        page.engine.widget(page.dialog).expect("modal enhanced").is_open()
    }

    #[test]
    fn enhancing_hides_and_labels_the_dialog() {
        let page = page();
        let doc = page.engine.document();
        assert!(doc.is_hidden(page.dialog));
        assert_eq!(doc.attr(page.dialog, "role"), Some("dialog"));
        assert_eq!(doc.attr(page.dialog, "aria-modal"), Some("true"));
    }

    #[test]
    fn opener_opens_and_focuses_first_control() {
        let mut page = page();
        page.engine.document_mut().focus(page.opener);
        page.engine.dispatch(testing::click(page.opener));

        assert!(is_open(&page));
        let first = find(&page.engine, page.dialog, "a.first");
        assert_eq!(page.engine.document().focused(), Some(first));
        assert!(!page.engine.document().is_hidden(page.dialog));
    }

    #[test]
    fn unrelated_opener_is_ignored() {
        let mut page = page();
        let body = page.engine.document().root();
        let other = page.engine.document().children(body)[1];
        page.engine.dispatch(testing::click(other));
        assert!(!is_open(&page));
    }

    #[test]
    fn tab_stays_inside_the_dialog() {
        let mut page = page();
        page.engine.dispatch(testing::click(page.opener));
        let first = find(&page.engine, page.dialog, "a.first");
        let close = find(&page.engine, page.dialog, "button.close");

        page.engine.dispatch(testing::key_with(first, KeyCode::Tab, KeyModifiers::SHIFT));
        assert_eq!(page.engine.document().focused(), Some(close));

        page.engine.dispatch(testing::key(close, KeyCode::Tab));
        assert_eq!(page.engine.document().focused(), Some(first));

        page.engine.dispatch(testing::key(first, KeyCode::Tab));
        let accept = find(&page.engine, page.dialog, "button.accept");
        assert_eq!(page.engine.document().focused(), Some(accept));
    }

    #[test]
    fn backdrop_click_closes_but_content_click_does_not() {
        let mut page = page();
        page.engine.dispatch(testing::click(page.opener));

        let heading = find(&page.engine, page.dialog, "h2");
        page.engine.dispatch(testing::click(heading));
        assert!(is_open(&page));

        page.engine.dispatch(testing::click(page.dialog));
        assert!(!is_open(&page));
        assert!(page.engine.document().is_hidden(page.dialog));
    }

    #[test]
    fn close_control_restores_focus_to_opener() {
        let mut page = page();
        page.engine.document_mut().focus(page.opener);
        page.engine.dispatch(testing::click(page.opener));
        let close = find(&page.engine, page.dialog, "button.close");
        page.engine.dispatch(testing::click(close));

        assert!(!is_open(&page));
        assert_eq!(page.engine.document().focused(), Some(page.opener));
        let changes: Vec<_> = page.engine.take_events().into_iter().map(|e| e.change).collect();
        assert_eq!(changes, vec![StateChange::Opened, StateChange::Closed]);
    }

    #[test]
    fn escape_closes_only_while_open() {
        let mut page = page();
        page.engine.dispatch(testing::key(page.dialog, KeyCode::Esc));
        assert!(page.engine.take_events().is_empty());

        page.engine.dispatch(testing::click(page.opener));
        let accept = find(&page.engine, page.dialog, "button.accept");
        page.engine.dispatch(testing::key(accept, KeyCode::Esc));
        assert!(!is_open(&page));
    }
}
