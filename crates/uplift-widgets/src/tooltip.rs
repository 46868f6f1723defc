//! Tooltip built from a trigger's `title` attribute.
//!
//! The title text moves into a tooltip body placed right after the trigger
//! and linked with `aria-describedby`, so the native title bubble no longer
//! competes with it.

use crate::key::NavKeys;
use crate::widget::{fresh_id, Enhancer};
use crossterm::event::KeyEvent;
use std::fmt;
use std::str::FromStr;
use uplift_core::config;
use uplift_core::{
    Command, Component, Context, Element, EnhanceError, EventKind, NodeId, StateChange,
    WidgetEvent,
};

/// Type tag.
pub const KIND: &str = "tooltip";
/// Root marker.
pub const MARKER: &str = ".tooltip[title]";
/// Required sub-elements.
pub const REQUIRED: &[&str] = &[];

const VISIBLE: &str = "is-visible";

/// Side of the trigger the tooltip is placed on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Position {
    /// Above the trigger.
    #[default]
    Top,
    /// Below the trigger.
    Bottom,
    /// Left of the trigger.
    Left,
    /// Right of the trigger.
    Right,
}

impl FromStr for Position {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "top" => Ok(Position::Top),
            "bottom" => Ok(Position::Bottom),
            "left" => Ok(Position::Left),
            "right" => Ok(Position::Right),
            other => Err(format!("expected top, bottom, left or right, got `{other}`")),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Position::Top => "top",
            Position::Bottom => "bottom",
            Position::Left => "left",
            Position::Right => "right",
        })
    }
}

/// Messages for the tooltip.
#[derive(Debug, Clone)]
pub enum Message {
    /// Pointer entered or focus arrived.
    Show,
    /// Pointer left or focus moved away.
    Hide,
    /// A key was pressed on the trigger.
    KeyPress(KeyEvent),
}

/// An enhanced tooltip.
pub struct Tooltip {
    root: NodeId,
    body: NodeId,
    position: Position,
    visible: bool,
    keys: NavKeys,
}

impl Enhancer for Tooltip {
    const KIND: &'static str = KIND;
    const MARKER: &'static str = MARKER;
    const REQUIRED: &'static [&'static str] = REQUIRED;

    fn enhance(cx: &mut Context<'_, Message>, root: NodeId) -> Result<Self, EnhanceError> {
        let position = config::attr_or(cx.doc(), root, "data-position", Position::default());
        let id = fresh_id(cx.doc(), "tooltip-body");

        let doc = cx.doc_mut();
        let title = doc.remove_attr(root, "title").unwrap_or_default();
        let body = doc.build(
            Element::new("span")
                .class("tooltip__body")
                .class(format!("tooltip__body--{position}"))
                .id(id.clone())
                .attr("role", "tooltip")
                .attr("aria-hidden", "true")
                .text(title)
                .hidden(),
        );
        doc.insert_after(root, body);
        doc.set_attr(root, "aria-describedby", id);
        doc.add_class(root, "tooltip__trigger");

        cx.listen(root, EventKind::PointerEnter, |_| Some(Message::Show));
        cx.listen(root, EventKind::FocusIn, |_| Some(Message::Show));
        cx.listen(root, EventKind::PointerLeave, |_| Some(Message::Hide));
        cx.listen(root, EventKind::FocusOut, |_| Some(Message::Hide));
        cx.listen(root, EventKind::KeyDown, |ev| ev.key.map(Message::KeyPress));

        Ok(Self {
            root,
            body,
            position,
            visible: false,
            keys: NavKeys::default(),
        })
    }
}

impl Tooltip {
    /// Whether the tooltip is showing.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The injected tooltip body.
    pub fn body(&self) -> NodeId {
        self.body
    }

    /// Configured placement.
    pub fn position(&self) -> Position {
        self.position
    }

    fn set_visible(&mut self, cx: &mut Context<'_, Message>, visible: bool) {
        if self.visible == visible {
            return;
        }
        self.visible = visible;
        let doc = cx.doc_mut();
        doc.set_hidden(self.body, !visible);
        doc.toggle_class(self.body, VISIBLE, visible);
        doc.set_attr(self.body, "aria-hidden", (!visible).to_string());
        let change = if visible {
            StateChange::Opened
        } else {
            StateChange::Closed
        };
        cx.emit(WidgetEvent::new(KIND, self.root, change));
    }
}

impl Component for Tooltip {
    type Message = Message;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn update(&mut self, cx: &mut Context<'_, Message>, msg: Message) -> Command<Message> {
        match msg {
            Message::Show => self.set_visible(cx, true),
            Message::Hide => self.set_visible(cx, false),
            Message::KeyPress(key) => {
                if self.keys.dismiss.matches(&key) {
                    self.set_visible(cx, false);
                }
            }
        }
        Command::none()
    }
}
