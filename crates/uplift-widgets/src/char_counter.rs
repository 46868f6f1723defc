//! Remaining-characters counter for a text field.
//!
//! The visible status updates on every keystroke. The screen-reader status
//! is debounced by [`EngineOptions::announce_delay`](uplift_core::EngineOptions):
//! every change schedules an announcement tagged with a generation number,
//! and only the announcement for the latest generation is written.
//!
//! A root carrying `data-incomplete-message` shows that text while the field
//! is empty, and announces it at once instead of waiting out the debounce.

use crate::widget::Enhancer;
use uplift_core::config::{self, ConfigError};
use uplift_core::{
    Command, Component, Context, Element, EnhanceError, EventKind, NodeId, StateChange,
    WidgetEvent,
};

/// Type tag.
pub const KIND: &str = "character-count";
/// Root marker.
pub const MARKER: &str = ".character-count";
/// Required sub-elements.
pub const REQUIRED: &[&str] = &[".character-count__field"];

const OVER_LIMIT: &str = "character-count__status--invalid";
const INCOMPLETE_ATTR: &str = "data-incomplete-message";

/// Text and validity derived from a field's length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// Message shown to the user.
    pub text: String,
    /// Whether the length is within the limit.
    pub valid: bool,
}

/// Status for `len` characters against a limit of `max`.
pub fn message(len: usize, max: usize) -> Status {
    if len == 0 {
        Status {
            text: format!("{max} characters allowed"),
            valid: true,
        }
    } else if len > max {
        Status {
            text: format!("{} characters over limit", len - max),
            valid: false,
        }
    } else {
        Status {
            text: format!("{} characters left", max - len),
            valid: true,
        }
    }
}

/// Messages for the character counter.
#[derive(Debug, Clone)]
pub enum Message {
    /// The field's content changed.
    Changed,
    /// Debounce window for this generation elapsed.
    Announce(u64),
}

/// An enhanced character counter.
pub struct CharCounter {
    root: NodeId,
    field: NodeId,
    status: NodeId,
    sr_status: NodeId,
    max: usize,
    incomplete: Option<String>,
    current: Status,
    generation: u64,
}

impl Enhancer for CharCounter {
    const KIND: &'static str = KIND;
    const MARKER: &'static str = MARKER;
    const REQUIRED: &'static [&'static str] = REQUIRED;

    fn enhance(cx: &mut Context<'_, Message>, root: NodeId) -> Result<Self, EnhanceError> {
        let field = cx.require(root, ".character-count__field")?;
        let doc = cx.doc();
        let max = match config::attr::<usize>(doc, field, "maxlength")? {
            Some(max) => max,
            None => config::attr::<usize>(doc, field, "data-maxlength")?.ok_or_else(|| ConfigError {
                attr: "maxlength".into(),
                value: String::new(),
                reason: "a character limit is required".into(),
            })?,
        };

        let incomplete = doc
            .attr(root, INCOMPLETE_ATTR)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string);

        let doc = cx.doc_mut();
        doc.remove_attr(field, "maxlength");
        doc.set_attr(field, "data-maxlength", max.to_string());
        let sr_status = doc.build(
            Element::new("div")
                .class("character-count__sr-status")
                .class("sr-only")
                .attr("aria-live", "polite"),
        );
        doc.insert_after(field, sr_status);
        let status = doc.build(
            Element::new("div")
                .class("character-count__status")
                .attr("aria-hidden", "true"),
        );
        doc.insert_after(field, status);

        cx.listen(field, EventKind::Input, |_| Some(Message::Changed));

        let mut counter = Self {
            root,
            field,
            status,
            sr_status,
            max,
            incomplete,
            current: message(0, max),
            generation: 0,
        };
        counter.current = counter.measure(cx);
        counter.render(cx);
        Ok(counter)
    }
}

impl CharCounter {
    /// Configured limit.
    pub fn max(&self) -> usize {
        self.max
    }

    /// Current status.
    pub fn status(&self) -> &Status {
        &self.current
    }

    /// The visible status node.
    pub fn status_node(&self) -> NodeId {
        self.status
    }

    /// The screen-reader status node.
    pub fn sr_status_node(&self) -> NodeId {
        self.sr_status
    }

    /// The counted field.
    pub fn field(&self) -> NodeId {
        self.field
    }

    /// Custom text shown while the field is empty.
    pub fn incomplete_message(&self) -> Option<&str> {
        self.incomplete.as_deref()
    }

    fn measure(&self, cx: &Context<'_, Message>) -> Status {
        let len = cx.doc().value(self.field).chars().count();
        match &self.incomplete {
            Some(text) if len == 0 => Status {
                text: text.clone(),
                valid: true,
            },
            _ => message(len, self.max),
        }
    }

    fn is_empty(&self, cx: &Context<'_, Message>) -> bool {
        cx.doc().value(self.field).is_empty()
    }

    fn render(&self, cx: &mut Context<'_, Message>) {
        let doc = cx.doc_mut();
        doc.set_text(self.status, self.current.text.clone());
        doc.toggle_class(self.status, OVER_LIMIT, !self.current.valid);
        if self.current.valid {
            doc.remove_attr(self.field, "aria-invalid");
        } else {
            doc.set_attr(self.field, "aria-invalid", "true");
        }
    }
}

impl Component for CharCounter {
    type Message = Message;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn update(&mut self, cx: &mut Context<'_, Message>, msg: Message) -> Command<Message> {
        match msg {
            Message::Changed => {
                let next = self.measure(cx);
                let flipped = next.valid != self.current.valid;
                self.current = next;
                self.render(cx);
                if flipped {
                    cx.emit(WidgetEvent::new(
                        KIND,
                        self.root,
                        StateChange::Validity {
                            valid: self.current.valid,
                            message: self.current.text.clone(),
                        },
                    ));
                }
                self.generation += 1;
                if self.incomplete.is_some() && self.is_empty(cx) {
                    cx.doc_mut().set_text(self.sr_status, self.current.text.clone());
                    return Command::none();
                }
                Command::tick(cx.options().announce_delay, Message::Announce(self.generation))
            }
            Message::Announce(generation) => {
                if generation == self.generation {
                    cx.doc_mut().set_text(self.sr_status, self.current.text.clone());
                }
                Command::none()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::mount;
    use std::time::Duration;
    use uplift_core::{testing, Engine};

    fn counter(field: Element) -> Element {
        Element::new("div").class("character-count").child(field)
    }

    fn textarea(max: &str) -> Element {
        Element::new("textarea")
            .class("character-count__field")
            .attr("maxlength", max)
    }

    fn widget(engine: &Engine<CharCounter>, root: NodeId) -> &CharCounter {
        engine.widget(root).expect("counter enhanced")
    }

    #[test]
    fn message_policy() {
        assert_eq!(message(0, 10), Status { text: "10 characters allowed".into(), valid: true });
        assert_eq!(message(4, 10), Status { text: "6 characters left".into(), valid: true });
        assert_eq!(message(10, 10), Status { text: "0 characters left".into(), valid: true });
        assert_eq!(message(13, 10), Status { text: "3 characters over limit".into(), valid: false });
    }

    #[test]
    fn maxlength_moves_to_a_data_attribute() {
        let (engine, root) = mount::<CharCounter>(counter(textarea("20")));
        let field = widget(&engine, root).field();
        let doc = engine.document();
        assert!(!doc.has_attr(field, "maxlength"));
        assert_eq!(doc.attr(field, "data-maxlength"), Some("20"));
        assert_eq!(doc.text(widget(&engine, root).status_node()), "20 characters allowed");
        assert_eq!(doc.text(widget(&engine, root).sr_status_node()), "");
    }

    #[test]
    fn visible_status_is_immediate_and_announcement_debounced() {
        let (mut engine, root) = mount::<CharCounter>(counter(textarea("5")));
        let (field, status, sr) = {
            let c = widget(&engine, root);
            (c.field(), c.status_node(), c.sr_status_node())
        };

        testing::type_text(&mut engine, field, "abc");
        assert_eq!(engine.document().text(status), "2 characters left");
        assert_eq!(engine.document().text(sr), "");

        engine.advance(Duration::from_millis(500));
        testing::type_text(&mut engine, field, "abcdefg");
        assert_eq!(engine.document().text(status), "2 characters over limit");

        engine.advance(Duration::from_millis(600));
        assert_eq!(engine.document().text(sr), "");

        engine.advance(Duration::from_millis(400));
        assert_eq!(engine.document().text(sr), "2 characters over limit");
        assert_eq!(engine.pending_tasks(), 0);
    }

    #[test]
    fn validity_changes_are_reported_once() {
        let (mut engine, root) = mount::<CharCounter>(counter(textarea("3")));
        let field = widget(&engine, root).field();
        testing::type_text(&mut engine, field, "abcd");
        testing::type_text(&mut engine, field, "abcde");
        testing::type_text(&mut engine, field, "ab");

        assert!(widget(&engine, root).status().valid);
        let validity: Vec<_> = engine
            .take_events()
            .into_iter()
            .filter_map(|e| match e.change {
                StateChange::Validity { valid, .. } => Some(valid),
                _ => None,
            })
            .collect();
        assert_eq!(validity, vec![false, true]);
    }

    #[test]
    fn multibyte_text_counts_characters() {
        let (mut engine, root) = mount::<CharCounter>(counter(textarea("4")));
        let field = widget(&engine, root).field();
        testing::type_text(&mut engine, field, "héé");
        assert_eq!(widget(&engine, root).status().text, "1 characters left");
    }

    #[test]
    fn data_maxlength_is_accepted() {
        let field = Element::new("input")
            .class("character-count__field")
            .attr("data-maxlength", "8");
        let (engine, root) = mount::<CharCounter>(counter(field));
        assert_eq!(widget(&engine, root).max(), 8);
    }

    fn with_incomplete_message(max: &str) -> Element {
        counter(textarea(max)).attr("data-incomplete-message", "Tell us about your visit")
    }

    #[test]
    fn incomplete_message_replaces_the_empty_status() {
        let (engine, root) = mount::<CharCounter>(with_incomplete_message("10"));
        let c = widget(&engine, root);
        assert_eq!(c.incomplete_message(), Some("Tell us about your visit"));
        assert_eq!(engine.document().text(c.status_node()), "Tell us about your visit");
        assert!(c.status().valid);
    }

    #[test]
    fn emptying_the_field_announces_the_incomplete_message_at_once() {
        let (mut engine, root) = mount::<CharCounter>(with_incomplete_message("10"));
        let (field, status, sr) = {
            let c = widget(&engine, root);
            (c.field(), c.status_node(), c.sr_status_node())
        };

        testing::type_text(&mut engine, field, "abc");
        assert_eq!(engine.document().text(status), "7 characters left");
        assert_eq!(engine.pending_tasks(), 1);

        testing::type_text(&mut engine, field, "");
        assert_eq!(engine.document().text(status), "Tell us about your visit");
        assert_eq!(engine.document().text(sr), "Tell us about your visit");

        // The announcement queued for "abc" is stale and must not overwrite it.
        engine.advance(Duration::from_secs(2));
        assert_eq!(engine.document().text(sr), "Tell us about your visit");
        assert_eq!(engine.pending_tasks(), 0);
    }

    #[test]
    fn blank_incomplete_message_is_ignored() {
        let markup = counter(textarea("10")).attr("data-incomplete-message", "  ");
        let (engine, root) = mount::<CharCounter>(markup);
        assert_eq!(widget(&engine, root).incomplete_message(), None);
        assert_eq!(widget(&engine, root).status().text, "10 characters allowed");
    }

    #[test]
    fn missing_limit_leaves_markup_static() {
        let field = Element::new("textarea").class("character-count__field");
        let (engine, root) = mount::<CharCounter>(counter(field));
        assert!(engine.widget(root).is_none());
        assert!(!engine.document().has_attr(root, "data-enhanced-character-count"));
        assert_eq!(engine.document().children(root).len(), 1);
    }
}
