//! The [`Enhancer`] trait and the [`Widget`] union the page engine runs.
//!
//! Each widget module implements [`Enhancer`] with its own message type. The
//! union lifts those messages into [`WidgetMessage`] so one
//! [`Engine<Widget>`](uplift_core::Engine) can host every widget type.

use crate::accordion::{self, Accordion};
use crate::calendar::{self, Calendar};
use crate::char_counter::{self, CharCounter};
use crate::combobox::{self, Combobox};
use crate::dropzone::{self, Dropzone};
use crate::modal::{self, Modal};
use crate::site_nav::{self, SiteNav};
use crate::tooltip::{self, Tooltip};
use uplift_core::{
    Command, Component, Context, Descriptor, Document, EnhanceError, NodeId, Registry,
    SelectorError,
};

/// A widget type that can be built from matching markup.
pub trait Enhancer: Component + Sized {
    /// Type tag; names the enhanced-marker attribute.
    const KIND: &'static str;
    /// Selector identifying candidate roots.
    const MARKER: &'static str;
    /// Selectors that must match under the root before enhancing.
    const REQUIRED: &'static [&'static str];

    /// Build the widget from `root`, injecting markup and attaching listeners.
    fn enhance(cx: &mut Context<'_, Self::Message>, root: NodeId) -> Result<Self, EnhanceError>;

    /// Descriptor for a registry hosting only this type.
    fn descriptor() -> Result<Descriptor<Self>, SelectorError> {
        Self::REQUIRED
            .iter()
            .try_fold(Descriptor::new(Self::KIND, Self::MARKER, Self::enhance)?, |d, sel| {
                d.require(sel)
            })
    }
}

/// An id unused in `doc`, for injected elements referenced by `aria-controls`.
pub(crate) fn fresh_id(doc: &Document, prefix: &str) -> String {
    let mut n = doc.len();
    loop {
        let id = format!("{prefix}-{n}");
        if doc.find_by_id(&id).is_none() {
            return id;
        }
        n += 1;
    }
}

/// Any enhanced widget.
pub enum Widget {
    /// See [`combobox`].
    Combobox(Combobox),
    /// See [`calendar`].
    Calendar(Calendar),
    /// See [`modal`].
    Modal(Modal),
    /// See [`dropzone`].
    Dropzone(Dropzone),
    /// See [`accordion`].
    Accordion(Accordion),
    /// See [`site_nav`].
    SiteNav(SiteNav),
    /// See [`char_counter`].
    CharCounter(CharCounter),
    /// See [`tooltip`].
    Tooltip(Tooltip),
}

/// Message of any widget, tagged with its type.
#[derive(Debug, Clone)]
#[allow(missing_docs)]
pub enum WidgetMessage {
    Combobox(combobox::Message),
    Calendar(calendar::Message),
    Modal(modal::Message),
    Dropzone(dropzone::Message),
    Accordion(accordion::Message),
    SiteNav(site_nav::Message),
    CharCounter(char_counter::Message),
    Tooltip(tooltip::Message),
}

trait Member: Enhancer {
    fn lift(msg: Self::Message) -> WidgetMessage;
    fn wrap(self) -> Widget;
}

macro_rules! members {
    ($($variant:ident => $ty:ty),* $(,)?) => {
        $(
            impl Member for $ty {
                fn lift(msg: Self::Message) -> WidgetMessage {
                    WidgetMessage::$variant(msg)
                }

                fn wrap(self) -> Widget {
                    Widget::$variant(self)
                }
            }
        )*

        impl Component for Widget {
            type Message = WidgetMessage;

            fn kind(&self) -> &'static str {
                match self {
                    $(Widget::$variant(w) => w.kind(),)*
                }
            }

            fn root(&self) -> NodeId {
                match self {
                    $(Widget::$variant(w) => w.root(),)*
                }
            }

            fn update(
                &mut self,
                cx: &mut Context<'_, WidgetMessage>,
                msg: WidgetMessage,
            ) -> Command<WidgetMessage> {
                match (self, msg) {
                    $(
                        (Widget::$variant(w), WidgetMessage::$variant(m)) => cx
                            .scope(WidgetMessage::$variant, |cx| w.update(cx, m))
                            .map(WidgetMessage::$variant),
                    )*
                    (w, msg) => {
                        log::debug!("{} {}: dropping foreign message {msg:?}", w.kind(), w.root());
                        Command::none()
                    }
                }
            }

            fn refresh(&mut self, cx: &mut Context<'_, WidgetMessage>) -> Command<WidgetMessage> {
                match self {
                    $(
                        Widget::$variant(w) => cx
                            .scope(WidgetMessage::$variant, |cx| w.refresh(cx))
                            .map(WidgetMessage::$variant),
                    )*
                }
            }
        }
    };
}

members! {
    Combobox => Combobox,
    Calendar => Calendar,
    Modal => Modal,
    Dropzone => Dropzone,
    Accordion => Accordion,
    SiteNav => SiteNav,
    CharCounter => CharCounter,
    Tooltip => Tooltip,
}

fn enhance_member<E: Member>(
    cx: &mut Context<'_, WidgetMessage>,
    root: NodeId,
) -> Result<Widget, EnhanceError> {
    cx.scope(E::lift, |cx| E::enhance(cx, root)).map(E::wrap)
}

fn describe<E: Member>() -> Result<Descriptor<Widget>, SelectorError> {
    E::REQUIRED
        .iter()
        .try_fold(Descriptor::new(E::KIND, E::MARKER, enhance_member::<E>)?, |d, sel| {
            d.require(sel)
        })
}

/// Every widget type, in dispatch order.
pub fn registry() -> Result<Registry<Widget>, SelectorError> {
    Ok(Registry::new()
        .register(describe::<Combobox>()?)
        .register(describe::<Calendar>()?)
        .register(describe::<Modal>()?)
        .register(describe::<Dropzone>()?)
        .register(describe::<Accordion>()?)
        .register(describe::<SiteNav>()?)
        .register(describe::<CharCounter>()?)
        .register(describe::<Tooltip>()?))
}

impl Widget {
    /// The combobox, if this is one.
    pub fn as_combobox(&self) -> Option<&Combobox> {
        match self {
            Widget::Combobox(w) => Some(w),
            _ => None,
        }
    }

    /// The date picker, if this is one.
    pub fn as_calendar(&self) -> Option<&Calendar> {
        match self {
            Widget::Calendar(w) => Some(w),
            _ => None,
        }
    }

    /// The modal, if this is one.
    pub fn as_modal(&self) -> Option<&Modal> {
        match self {
            Widget::Modal(w) => Some(w),
            _ => None,
        }
    }

    /// The dropzone, if this is one.
    pub fn as_dropzone(&self) -> Option<&Dropzone> {
        match self {
            Widget::Dropzone(w) => Some(w),
            _ => None,
        }
    }

    /// The accordion, if this is one.
    pub fn as_accordion(&self) -> Option<&Accordion> {
        match self {
            Widget::Accordion(w) => Some(w),
            _ => None,
        }
    }

    /// The site navigation, if this is one.
    pub fn as_site_nav(&self) -> Option<&SiteNav> {
        match self {
            Widget::SiteNav(w) => Some(w),
            _ => None,
        }
    }

    /// The character counter, if this is one.
    pub fn as_char_counter(&self) -> Option<&CharCounter> {
        match self {
            Widget::CharCounter(w) => Some(w),
            _ => None,
        }
    }

    /// The tooltip, if this is one.
    pub fn as_tooltip(&self) -> Option<&Tooltip> {
        match self {
            Widget::Tooltip(w) => Some(w),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uplift_core::{Element, Engine, EngineOptions};

    #[test]
    fn registry_lists_types_in_declaration_order() {
        let registry = registry().expect("valid selectors");
        let kinds: Vec<_> = registry.descriptors().iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                "combobox",
                "calendar",
                "modal",
                "dropzone",
                "accordion",
                "site-nav",
                "character-count",
                "tooltip"
            ]
        );
    }

    #[test]
    fn fresh_ids_do_not_collide() {
        let mut doc = Document::new();
        let body = doc.root();
        let taken = format!("list-{}", doc.len());
        doc.append_fragment(body, Element::new("div").id(taken.clone()));
        let id = fresh_id(&doc, "list");
        assert_ne!(id, taken);
        assert!(doc.find_by_id(&id).is_none());
    }

    #[test]
    fn union_routes_messages_to_the_matching_widget() {
        let mut doc = Document::new();
        let body = doc.root();
        let combo = doc.append_fragment(
            body,
            Element::new("div")
                .class("combo-box")
                .child(Element::new("select").child(Element::new("option").attr("value", "a").text("Apple"))),
        );
        let tip = doc.append_fragment(
            body,
            Element::new("button").class("tooltip").attr("title", "Help"),
        );
        let mut engine = Engine::with_registry(doc, registry().expect("registry"), EngineOptions::default());

        assert!(engine.send(combo, WidgetMessage::Combobox(combobox::Message::Toggle)));
        assert!(engine.widget(combo).and_then(Widget::as_combobox).expect("combobox").is_open());

        // A message for another type is ignored by the receiving widget.
        assert!(engine.send(tip, WidgetMessage::Combobox(combobox::Message::Toggle)));
        assert!(!engine.widget(tip).and_then(Widget::as_tooltip).expect("tooltip").is_visible());
        assert_eq!(engine.widget(tip).map(|w| w.kind()), Some("tooltip"));
    }
}
