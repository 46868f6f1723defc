//! Site header with a collapsible mobile navigation and dropdown menus.
//!
//! Two independent pieces of state live here: whether the mobile navigation
//! is open, and which (if any) dropdown is open. Dropdowns are mutually
//! exclusive, and closing the mobile navigation closes every dropdown.

use crate::key::NavKeys;
use crate::widget::Enhancer;
use crossterm::event::KeyEvent;
use uplift_core::{
    Command, Component, Context, EnhanceError, EventKind, NodeId, Selector, StateChange,
    WidgetEvent,
};

/// Type tag.
pub const KIND: &str = "site-nav";
/// Root marker.
pub const MARKER: &str = ".header";
/// Required sub-elements.
pub const REQUIRED: &[&str] = &[".nav"];

const VISIBLE: &str = "is-visible";

/// Messages for the site header.
#[derive(Debug, Clone)]
pub enum Message {
    /// The menu button was activated.
    OpenMobile,
    /// The close control or overlay was activated.
    CloseMobile,
    /// The dropdown trigger at this index was activated.
    ToggleDropdown(usize),
    /// A click landed inside the navigation.
    NavClick(NodeId),
    /// A key was pressed inside the header.
    KeyPress(KeyEvent),
    /// A click somewhere on the page.
    Outside(NodeId),
}

struct Dropdown {
    trigger: NodeId,
    menu: NodeId,
    open: bool,
}

/// An enhanced site header.
pub struct SiteNav {
    root: NodeId,
    nav: NodeId,
    menu_button: Option<NodeId>,
    close_button: Option<NodeId>,
    overlay: Option<NodeId>,
    link: Selector,
    dropdowns: Vec<Dropdown>,
    mobile_open: bool,
    keys: NavKeys,
}

impl Enhancer for SiteNav {
    const KIND: &'static str = KIND;
    const MARKER: &'static str = MARKER;
    const REQUIRED: &'static [&'static str] = REQUIRED;

    fn enhance(cx: &mut Context<'_, Message>, root: NodeId) -> Result<Self, EnhanceError> {
        let nav = cx.require(root, ".nav")?;
        let menu_button = cx.select(root, ".menu-btn")?;
        let close_button = cx.select(root, ".nav__close")?;
        let overlay = cx.select(root, ".overlay")?;
        let link = Selector::parse("a[href]")?;

        let mut dropdowns = Vec::new();
        for trigger in cx.select_all(nav, "button.nav__link[aria-controls]")? {
            let doc = cx.doc();
            let controls = doc.attr(trigger, "aria-controls").unwrap_or_default();
            match doc.find_by_id(controls) {
                Some(menu) => dropdowns.push(Dropdown {
                    trigger,
                    menu,
                    open: false,
                }),
                None => log::warn!("{root}: dropdown {trigger} controls missing menu `{controls}`"),
            }
        }

        let doc = cx.doc_mut();
        for dropdown in &dropdowns {
            doc.set_attr(dropdown.trigger, "aria-expanded", "false");
            doc.set_hidden(dropdown.menu, true);
        }
        if let Some(button) = menu_button {
            doc.set_attr(button, "aria-expanded", "false");
            cx.listen(button, EventKind::Click, |_| Some(Message::OpenMobile));
        }
        for control in close_button.into_iter().chain(overlay) {
            cx.listen(control, EventKind::Click, |_| Some(Message::CloseMobile));
        }
        for (index, dropdown) in dropdowns.iter().enumerate() {
            cx.listen(dropdown.trigger, EventKind::Click, move |_| {
                Some(Message::ToggleDropdown(index))
            });
        }
        cx.listen(nav, EventKind::Click, |ev| Some(Message::NavClick(ev.target)));
        cx.listen(root, EventKind::KeyDown, |ev| ev.key.map(Message::KeyPress));
        let body = cx.doc().root();
        cx.listen(body, EventKind::Click, |ev| Some(Message::Outside(ev.target)));

        Ok(Self {
            root,
            nav,
            menu_button,
            close_button,
            overlay,
            link,
            dropdowns,
            mobile_open: false,
            keys: NavKeys::default(),
        })
    }
}

impl SiteNav {
    /// Whether the mobile navigation is open.
    pub fn is_mobile_open(&self) -> bool {
        self.mobile_open
    }

    /// Index of the open dropdown.
    pub fn open_dropdown(&self) -> Option<usize> {
        self.dropdowns.iter().position(|d| d.open)
    }

    /// Dropdown triggers in order.
    pub fn dropdown_triggers(&self) -> Vec<NodeId> {
        self.dropdowns.iter().map(|d| d.trigger).collect()
    }

    /// The navigation container.
    pub fn nav(&self) -> NodeId {
        self.nav
    }

    /// The mobile menu button.
    pub fn menu_button(&self) -> Option<NodeId> {
        self.menu_button
    }

    /// The mobile close control.
    pub fn close_button(&self) -> Option<NodeId> {
        self.close_button
    }

    fn set_dropdown(&mut self, cx: &mut Context<'_, Message>, index: usize, open: bool) {
        let Some(dropdown) = self.dropdowns.get_mut(index) else {
            return;
        };
        if dropdown.open == open {
            return;
        }
        dropdown.open = open;
        let doc = cx.doc_mut();
        doc.set_attr(dropdown.trigger, "aria-expanded", open.to_string());
        doc.set_hidden(dropdown.menu, !open);
        cx.emit(WidgetEvent::new(
            KIND,
            self.root,
            StateChange::Expanded {
                index,
                expanded: open,
            },
        ));
    }

    fn close_dropdowns(&mut self, cx: &mut Context<'_, Message>) {
        for index in 0..self.dropdowns.len() {
            self.set_dropdown(cx, index, false);
        }
    }

    fn open_mobile(&mut self, cx: &mut Context<'_, Message>) {
        if self.mobile_open {
            return;
        }
        self.mobile_open = true;
        let doc = cx.doc_mut();
        doc.add_class(self.nav, VISIBLE);
        if let Some(overlay) = self.overlay {
            doc.add_class(overlay, VISIBLE);
        }
        if let Some(button) = self.menu_button {
            doc.set_attr(button, "aria-expanded", "true");
        }
        doc.focus(self.close_button.unwrap_or(self.nav));
        cx.emit(WidgetEvent::new(KIND, self.root, StateChange::Opened));
    }

    fn close_mobile(&mut self, cx: &mut Context<'_, Message>) {
        if !self.mobile_open {
            return;
        }
        self.close_dropdowns(cx);
        self.mobile_open = false;
        let doc = cx.doc_mut();
        doc.remove_class(self.nav, VISIBLE);
        if let Some(overlay) = self.overlay {
            doc.remove_class(overlay, VISIBLE);
        }
        if let Some(button) = self.menu_button {
            doc.set_attr(button, "aria-expanded", "false");
            doc.focus(button);
        }
        cx.emit(WidgetEvent::new(KIND, self.root, StateChange::Closed));
    }
}

impl Component for SiteNav {
    type Message = Message;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn update(&mut self, cx: &mut Context<'_, Message>, msg: Message) -> Command<Message> {
        match msg {
            Message::OpenMobile => self.open_mobile(cx),
            Message::CloseMobile => self.close_mobile(cx),
            Message::ToggleDropdown(index) => {
                if self.open_dropdown() == Some(index) {
                    self.set_dropdown(cx, index, false);
                } else {
                    self.close_dropdowns(cx);
                    self.set_dropdown(cx, index, true);
                }
            }
            Message::NavClick(target) => {
                if self.mobile_open && cx.doc().closest(target, &self.link).is_some() {
                    self.close_mobile(cx);
                }
            }
            Message::KeyPress(key) => {
                if self.keys.dismiss.matches(&key) {
                    self.close_dropdowns(cx);
                    self.close_mobile(cx);
                }
            }
            Message::Outside(target) => {
                if !cx.doc().contains(self.root, target) {
                    self.close_dropdowns(cx);
                }
            }
        }
        Command::none()
    }
}
