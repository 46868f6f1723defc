//! Accordion group of disclosure triggers and panels.
//!
//! Each `button.accordion__button[aria-controls]` whose closest accordion is
//! this root controls the panel with the matching id. In single-expand mode
//! (the default) expanding one item collapses its siblings; set
//! `data-allow-multiple` or `aria-multiselectable="true"` for multi-expand.

use crate::focus::{self, FocusRing};
use crate::key::NavKeys;
use crate::widget::Enhancer;
use crossterm::event::KeyEvent;
use uplift_core::config;
use uplift_core::{
    Command, Component, Context, EnhanceError, EventKind, ListenerId, NodeId, Selector,
    StateChange, WidgetEvent,
};

/// Type tag.
pub const KIND: &str = "accordion";
/// Root marker.
pub const MARKER: &str = ".accordion";
/// Trigger selector.
pub const TRIGGER: &str = "button.accordion__button[aria-controls]";
/// Required sub-elements.
pub const REQUIRED: &[&str] = &[TRIGGER];

/// Messages for the accordion.
#[derive(Debug, Clone)]
pub enum Message {
    /// The trigger at this index was activated.
    Toggle(usize),
    /// A key was pressed on the trigger at this index.
    KeyPress(usize, KeyEvent),
}

struct Item {
    trigger: NodeId,
    panel: NodeId,
    expanded: bool,
    listeners: Vec<ListenerId>,
}

/// An enhanced accordion.
pub struct Accordion {
    root: NodeId,
    multi: bool,
    group: Selector,
    trigger: Selector,
    items: Vec<Item>,
    keys: NavKeys,
}

impl Enhancer for Accordion {
    const KIND: &'static str = KIND;
    const MARKER: &'static str = MARKER;
    const REQUIRED: &'static [&'static str] = REQUIRED;

    fn enhance(cx: &mut Context<'_, Message>, root: NodeId) -> Result<Self, EnhanceError> {
        let doc = cx.doc();
        let multi = config::flag(doc, root, "data-allow-multiple")
            || doc.attr(root, "aria-multiselectable") == Some("true");
        let mut accordion = Self {
            root,
            multi,
            group: Selector::parse(MARKER)?,
            trigger: Selector::parse(TRIGGER)?,
            items: Vec::new(),
            keys: NavKeys::default(),
        };
        accordion.attach(cx);
        Ok(accordion)
    }
}

impl Accordion {
    /// Expansion state per item, in trigger order.
    pub fn expanded(&self) -> Vec<bool> {
        self.items.iter().map(|i| i.expanded).collect()
    }

    /// Trigger elements in order.
    pub fn triggers(&self) -> Vec<NodeId> {
        self.items.iter().map(|i| i.trigger).collect()
    }

    /// Whether several items may be expanded at once.
    pub fn is_multi(&self) -> bool {
        self.multi
    }

    /// Scan the markup for items, normalize their state and listen on triggers.
    fn attach(&mut self, cx: &mut Context<'_, Message>) {
        let doc = cx.doc();
        let mut items = Vec::new();
        for trigger in doc.select_all(self.root, &self.trigger) {
            if doc.closest(trigger, &self.group) != Some(self.root) {
                continue;
            }
            let controls = doc.attr(trigger, "aria-controls").unwrap_or_default();
            let Some(panel) = doc.find_by_id(controls) else {
                log::warn!("{}: trigger {trigger} controls missing panel `{controls}`", self.root);
                continue;
            };
            let expanded = doc.attr(trigger, "aria-expanded") == Some("true");
            items.push(Item {
                trigger,
                panel,
                expanded,
                listeners: Vec::new(),
            });
        }

        if !self.multi {
            let mut seen = false;
            for item in &mut items {
                item.expanded &= !seen;
                seen |= item.expanded;
            }
        }

        for (index, item) in items.iter_mut().enumerate() {
            let click = cx.listen(item.trigger, EventKind::Click, move |_| Some(Message::Toggle(index)));
            let key = cx.listen(item.trigger, EventKind::KeyDown, move |ev| {
                ev.key.map(|k| Message::KeyPress(index, k))
            });
            item.listeners = vec![click, key];
        }
        self.items = items;
        for index in 0..self.items.len() {
            self.render(cx, index);
        }
    }

    fn detach(&mut self, cx: &mut Context<'_, Message>) {
        for item in &mut self.items {
            for id in item.listeners.drain(..) {
                if let Err(err) = cx.unlisten(item.trigger, id) {
                    log::warn!("{}: {err}", self.root);
                }
            }
        }
    }

    fn render(&self, cx: &mut Context<'_, Message>, index: usize) {
        let item = &self.items[index];
        let doc = cx.doc_mut();
        doc.set_attr(item.trigger, "aria-expanded", item.expanded.to_string());
        doc.set_hidden(item.panel, !item.expanded);
    }

    fn set(&mut self, cx: &mut Context<'_, Message>, index: usize, expanded: bool) {
        if self.items[index].expanded == expanded {
            return;
        }
        self.items[index].expanded = expanded;
        self.render(cx, index);
        cx.emit(WidgetEvent::new(KIND, self.root, StateChange::Expanded { index, expanded }));
    }

    fn toggle(&mut self, cx: &mut Context<'_, Message>, index: usize) {
        if index >= self.items.len() {
            return;
        }
        let expand = !self.items[index].expanded;
        if expand && !self.multi {
            for other in (0..self.items.len()).filter(|i| *i != index) {
                self.set(cx, other, false);
            }
        }
        self.set(cx, index, expand);
    }

    fn navigate(&mut self, cx: &mut Context<'_, Message>, index: usize, key: KeyEvent) {
        let mut ring = FocusRing::at(self.items.len(), index);
        if self.keys.next.matches(&key) {
            ring.focus_next();
        } else if self.keys.prev.matches(&key) {
            ring.focus_prev();
        } else if self.keys.first.matches(&key) {
            ring.focus_first();
        } else if self.keys.last.matches(&key) {
            ring.focus_last();
        } else {
            return;
        }
        focus::apply(cx.doc_mut(), &self.triggers(), ring);
    }
}

impl Component for Accordion {
    type Message = Message;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn update(&mut self, cx: &mut Context<'_, Message>, msg: Message) -> Command<Message> {
        match msg {
            Message::Toggle(index) => self.toggle(cx, index),
            Message::KeyPress(index, key) => self.navigate(cx, index, key),
        }
        Command::none()
    }

    fn refresh(&mut self, cx: &mut Context<'_, Message>) -> Command<Message> {
        self.detach(cx);
        self.attach(cx);
        Command::none()
    }
}
