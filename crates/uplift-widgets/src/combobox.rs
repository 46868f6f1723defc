//! Filterable single-select built over a native `<select>`.
//!
//! The `<select>` stays in the document as the backing control (hidden, still
//! submitted with the form). A text input, a toggle, a clear control and an
//! option list are injected next to it.
//!
//! ```text
//! Closed ──toggle──▶ OpenUnfiltered ──type──▶ OpenFiltered
//!   ▲                      │                      │
//!   └── select / clear / outside click / Escape / no match ──┘
//! ```
//!
//! Closing without a selection restores the input text to the label of the
//! committed option. Text left behind by a query that matched nothing is
//! restored on the next interaction outside the widget.

use crate::key::NavKeys;
use crate::selection::SelectionState;
use crate::widget::{fresh_id, Enhancer};
use crossterm::event::KeyEvent;
use uplift_core::{
    Command, Component, Context, Element, EnhanceError, EventKind, NodeId, StateChange,
    WidgetEvent,
};

/// Type tag.
pub const KIND: &str = "combobox";
/// Root marker.
pub const MARKER: &str = ".combo-box";
/// Required sub-elements.
pub const REQUIRED: &[&str] = &["select"];

const FOCUSED: &str = "combo-box__list-option--focused";
const SELECTED: &str = "combo-box__list-option--selected";

/// Visibility of the option list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListState {
    /// List hidden.
    Closed,
    /// Every option shown.
    OpenUnfiltered,
    /// Only options matching the typed text shown.
    OpenFiltered,
}

/// Messages for the combobox.
#[derive(Debug, Clone)]
pub enum Message {
    /// The toggle control was activated.
    Toggle,
    /// The filter text changed.
    Filter,
    /// An option (by index) was picked.
    Select(usize),
    /// The clear control was activated.
    Clear,
    /// A key was pressed in the input.
    KeyPress(KeyEvent),
    /// A click somewhere on the page.
    Outside(NodeId),
}

/// One entry of the option list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComboOption {
    /// Submitted value.
    pub value: String,
    /// Visible label.
    pub label: String,
    node: NodeId,
}

/// An enhanced combobox.
pub struct Combobox {
    root: NodeId,
    select: NodeId,
    input: NodeId,
    toggle: NodeId,
    clear: NodeId,
    list: NodeId,
    options: Vec<ComboOption>,
    visible: Vec<usize>,
    cursor: SelectionState,
    state: ListState,
    keys: NavKeys,
}

impl Enhancer for Combobox {
    const KIND: &'static str = KIND;
    const MARKER: &'static str = MARKER;
    const REQUIRED: &'static [&'static str] = REQUIRED;

    fn enhance(cx: &mut Context<'_, Message>, root: NodeId) -> Result<Self, EnhanceError> {
        let select = cx.require(root, "select")?;

        let mut entries: Vec<(String, String)> = Vec::new();
        let mut initial = cx.doc().value(select).to_string();
        for option in cx.select_all(select, "option")? {
            let doc = cx.doc();
            let label = doc.text(option).to_string();
            let value = doc.attr(option, "value").unwrap_or(&label).to_string();
            if value.is_empty() {
                continue;
            }
            if initial.is_empty() && doc.has_attr(option, "selected") {
                initial = value.clone();
            }
            entries.push((value, label));
        }
        if !entries.iter().any(|(value, _)| *value == initial) {
            initial.clear();
        }

        let placeholder = cx.doc().attr(root, "data-placeholder").unwrap_or_default().to_string();
        let list_id = fresh_id(cx.doc(), "combo-box-list");

        let doc = cx.doc_mut();
        doc.set_hidden(select, true);
        doc.set_attr(select, "aria-hidden", "true");
        doc.set_attr(select, "tabindex", "-1");
        doc.set_value(select, initial);

        let input = doc.append_fragment(
            root,
            Element::new("input")
                .class("combo-box__input")
                .attr("type", "text")
                .attr("role", "combobox")
                .attr("aria-autocomplete", "list")
                .attr("aria-expanded", "false")
                .attr("aria-controls", &list_id)
                .attr("placeholder", placeholder),
        );
        let clear = doc.append_fragment(
            root,
            Element::new("button")
                .class("combo-box__clear-input")
                .attr("type", "button")
                .attr("aria-label", "Clear the select contents")
                .hidden(),
        );
        let toggle = doc.append_fragment(
            root,
            Element::new("button")
                .class("combo-box__toggle-list")
                .attr("type", "button")
                .attr("tabindex", "-1")
                .attr("aria-label", "Toggle the dropdown list"),
        );
        let list = doc.append_fragment(
            root,
            Element::new("ul")
                .class("combo-box__list")
                .id(list_id)
                .attr("role", "listbox")
                .hidden()
                .children(entries.iter().map(|(value, label)| {
                    Element::new("li")
                        .class("combo-box__list-option")
                        .attr("role", "option")
                        .attr("tabindex", "-1")
                        .attr("aria-selected", "false")
                        .attr("data-value", value)
                        .text(label)
                })),
        );
        let nodes = doc.children(list).to_vec();
        let options: Vec<ComboOption> = entries
            .into_iter()
            .zip(nodes)
            .map(|((value, label), node)| ComboOption { value, label, node })
            .collect();

        cx.listen(toggle, EventKind::Click, |_| Some(Message::Toggle));
        cx.listen(clear, EventKind::Click, |_| Some(Message::Clear));
        cx.listen(input, EventKind::Input, |_| Some(Message::Filter));
        cx.listen(input, EventKind::KeyDown, |ev| ev.key.map(Message::KeyPress));
        for (index, option) in options.iter().enumerate() {
            cx.listen(option.node, EventKind::Click, move |_| Some(Message::Select(index)));
        }
        let body = cx.doc().root();
        cx.listen(body, EventKind::Click, |ev| Some(Message::Outside(ev.target)));

        let combobox = Self {
            root,
            select,
            input,
            toggle,
            clear,
            list,
            cursor: SelectionState::new(0),
            options,
            visible: Vec::new(),
            state: ListState::Closed,
            keys: NavKeys::default(),
        };
        combobox.sync_committed(cx);
        Ok(combobox)
    }
}

impl Combobox {
    /// Current list state.
    pub fn state(&self) -> ListState {
        self.state
    }

    /// Whether the list is showing.
    pub fn is_open(&self) -> bool {
        self.state != ListState::Closed
    }

    /// All options in markup order.
    pub fn options(&self) -> &[ComboOption] {
        &self.options
    }

    /// Labels of the options currently shown.
    pub fn visible_labels(&self) -> Vec<&str> {
        self.visible
            .iter()
            .filter_map(|i| self.options.get(*i))
            .map(|o| o.label.as_str())
            .collect()
    }

    /// Index (into [`options`](Combobox::options)) of the highlighted option.
    pub fn highlighted(&self) -> Option<usize> {
        self.cursor.cursor().and_then(|c| self.visible.get(c).copied())
    }

    /// The backing `<select>`.
    pub fn select(&self) -> NodeId {
        self.select
    }

    /// The injected text input.
    pub fn input(&self) -> NodeId {
        self.input
    }

    /// The injected toggle control.
    pub fn toggle(&self) -> NodeId {
        self.toggle
    }

    /// The injected clear control.
    pub fn clear_button(&self) -> NodeId {
        self.clear
    }

    /// The injected option list.
    pub fn list(&self) -> NodeId {
        self.list
    }

    fn committed_label(&self, cx: &Context<'_, Message>) -> String {
        let value = cx.doc().value(self.select);
        self.options
            .iter()
            .find(|o| o.value == value)
            .map(|o| o.label.clone())
            .unwrap_or_default()
    }

    /// Mirror the backing value into the input, option marks and clear control.
    fn sync_committed(&self, cx: &mut Context<'_, Message>) {
        let label = self.committed_label(cx);
        let doc = cx.doc_mut();
        let value = doc.value(self.select).to_string();
        for option in &self.options {
            let selected = !value.is_empty() && option.value == value;
            doc.toggle_class(option.node, SELECTED, selected);
            doc.set_attr(option.node, "aria-selected", selected.to_string());
        }
        doc.set_value(self.input, label);
        doc.set_hidden(self.clear, value.is_empty());
    }

    fn show(&mut self, cx: &mut Context<'_, Message>, query: &str) {
        let needle = query.to_lowercase();
        self.visible = self
            .options
            .iter()
            .enumerate()
            .filter(|(_, o)| needle.is_empty() || o.label.to_lowercase().contains(&needle))
            .map(|(i, _)| i)
            .collect();
        if self.visible.is_empty() {
            self.close(cx, false);
            return;
        }

        let was_open = self.is_open();
        self.state = if needle.is_empty() {
            ListState::OpenUnfiltered
        } else {
            ListState::OpenFiltered
        };
        self.cursor.reset(self.visible.len());

        let doc = cx.doc_mut();
        for (i, option) in self.options.iter().enumerate() {
            doc.set_hidden(option.node, !self.visible.contains(&i));
            doc.remove_class(option.node, FOCUSED);
        }
        doc.set_hidden(self.list, false);
        doc.set_attr(self.input, "aria-expanded", "true");
        if !was_open {
            cx.emit(WidgetEvent::new(KIND, self.root, StateChange::Opened));
        }
    }

    fn close(&mut self, cx: &mut Context<'_, Message>, restore: bool) {
        let was_open = self.is_open();
        self.state = ListState::Closed;
        self.visible.clear();
        self.cursor.reset(0);

        let doc = cx.doc_mut();
        doc.set_hidden(self.list, true);
        doc.set_attr(self.input, "aria-expanded", "false");
        for option in &self.options {
            doc.remove_class(option.node, FOCUSED);
        }
        if restore {
            let label = self.committed_label(cx);
            cx.doc_mut().set_value(self.input, label);
        }
        if was_open {
            cx.emit(WidgetEvent::new(KIND, self.root, StateChange::Closed));
        }
    }

    fn highlight(&self, cx: &mut Context<'_, Message>) {
        let current = self.cursor.cursor();
        let doc = cx.doc_mut();
        for (pos, index) in self.visible.iter().enumerate() {
            if let Some(option) = self.options.get(*index) {
                doc.toggle_class(option.node, FOCUSED, current == Some(pos));
            }
        }
    }

    fn commit(&mut self, cx: &mut Context<'_, Message>, index: usize) {
        let Some(value) = self.options.get(index).map(|o| o.value.clone()) else {
            return;
        };
        let previous = cx.doc().value(self.select).to_string();
        cx.doc_mut().set_value(self.select, value.clone());
        self.sync_committed(cx);
        self.close(cx, false);
        cx.emit(WidgetEvent::new(
            KIND,
            self.root,
            StateChange::Selected {
                previous,
                next: value,
            },
        ));
    }

    fn clear_selection(&mut self, cx: &mut Context<'_, Message>) {
        let previous = cx.doc().value(self.select).to_string();
        cx.doc_mut().set_value(self.select, "");
        self.sync_committed(cx);
        self.close(cx, false);
        cx.doc_mut().focus(self.input);
        if !previous.is_empty() {
            cx.emit(WidgetEvent::new(
                KIND,
                self.root,
                StateChange::Selected {
                    previous,
                    next: String::new(),
                },
            ));
        }
    }

    fn handle_key(&mut self, cx: &mut Context<'_, Message>, key: KeyEvent) -> Command<Message> {
        if self.keys.dismiss.matches(&key) {
            if self.is_open() {
                self.close(cx, true);
            }
        } else if self.keys.next.matches(&key) {
            if !self.is_open() {
                self.show(cx, "");
            }
            self.cursor.move_down();
            self.highlight(cx);
        } else if self.keys.prev.matches(&key) {
            if self.is_open() {
                self.cursor.move_up();
                self.highlight(cx);
            }
        } else if self.keys.first.matches(&key) || self.keys.last.matches(&key) {
            if self.is_open() {
                if self.keys.first.matches(&key) {
                    self.cursor.home();
                } else {
                    self.cursor.end();
                }
                self.highlight(cx);
            }
        } else if self.keys.commit.matches(&key) {
            if let Some(index) = self.highlighted().filter(|_| self.is_open()) {
                return Command::message(Message::Select(index));
            }
        }
        Command::none()
    }
}

impl Component for Combobox {
    type Message = Message;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn update(&mut self, cx: &mut Context<'_, Message>, msg: Message) -> Command<Message> {
        match msg {
            Message::Toggle => {
                if self.is_open() {
                    self.close(cx, true);
                } else {
                    self.show(cx, "");
                }
            }
            Message::Filter => {
                let query = cx.doc().value(self.input).to_string();
                self.show(cx, &query);
            }
            Message::Select(index) => self.commit(cx, index),
            Message::Clear => self.clear_selection(cx),
            Message::KeyPress(key) => return self.handle_key(cx, key),
            Message::Outside(target) => {
                if cx.doc().contains(self.root, target) {
                    return Command::none();
                }
                if self.is_open() {
                    self.close(cx, true);
                } else if cx.doc().value(self.input) != self.committed_label(cx) {
                    let label = self.committed_label(cx);
                    cx.doc_mut().set_value(self.input, label);
                }
            }
        }
        Command::none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{count, mount};
    use crossterm::event::KeyCode;
    use uplift_core::{testing, Engine};

    fn markup(options: &[(&str, &str)]) -> Element {
        Element::new("div").class("combo-box").child(
            Element::new("select")
                .attr("name", "fruit")
                .child(Element::new("option").attr("value", "").text("Select one"))
                .children(
                    options
                        .iter()
                        .map(|(value, label)| Element::new("option").attr("value", *value).text(*label)),
                ),
        )
    }

    fn fruit() -> (Engine<Combobox>, NodeId) {
        mount::<Combobox>(markup(&[("alpha", "Alpha"), ("beta", "Beta"), ("gamma", "Gamma")]))
    }

    fn widget(engine: &Engine<Combobox>, root: NodeId) -> &Combobox {
        engine.widget(root).expect("combobox enhanced")
    }

    #[test]
    fn enhancement_hides_the_select_and_injects_controls() {
        let (engine, root) = fruit();
        let cb = widget(&engine, root);
        let doc = engine.document();

        assert!(doc.has_attr(root, "data-enhanced-combobox"));
        assert!(doc.is_hidden(cb.select()));
        assert!(doc.is_hidden(cb.list()));
        assert_eq!(cb.options().len(), 3);
        assert_eq!(cb.state(), ListState::Closed);
        assert_eq!(doc.attr(cb.input(), "aria-expanded"), Some("false"));
    }

    #[test]
    fn enhancing_twice_injects_once() {
        let (mut engine, root) = fruit();
        engine.enhance_all(root);
        engine.enhance_all(engine.document().root());
        assert_eq!(count(&engine, root, "input.combo-box__input"), 1);
        assert_eq!(count(&engine, root, "ul.combo-box__list"), 1);
        assert_eq!(engine.widget_count(), 1);
    }

    #[test]
    fn typing_filters_case_insensitively() {
        let (mut engine, root) = fruit();
        let input = widget(&engine, root).input();

        testing::type_text(&mut engine, input, "a");
        let cb = widget(&engine, root);
        assert_eq!(cb.state(), ListState::OpenFiltered);
        assert_eq!(cb.visible_labels(), vec!["Alpha", "Beta", "Gamma"]);

        testing::type_text(&mut engine, input, "AL");
        let cb = widget(&engine, root);
        assert_eq!(cb.visible_labels(), vec!["Alpha"]);
        assert_eq!(cb.state(), ListState::OpenFiltered);
        assert!(!engine.document().is_hidden(cb.list()));
        let beta = cb.options()[1].node;
        assert!(engine.document().is_hidden(beta));
    }

    #[test]
    fn no_match_closes_the_list() {
        let (mut engine, root) = fruit();
        let input = widget(&engine, root).input();
        testing::type_text(&mut engine, input, "zz");
        let cb = widget(&engine, root);
        assert_eq!(cb.state(), ListState::Closed);
        assert!(engine.document().is_hidden(cb.list()));
    }

    #[test]
    fn outside_click_after_a_dead_query_restores_the_label() {
        let (mut engine, root) = fruit();
        let cb = widget(&engine, root);
        let (select, input, toggle) = (cb.select(), cb.input(), cb.toggle());
        let beta = cb.options()[1].node;
        engine.dispatch(testing::click(toggle));
        engine.dispatch(testing::click(beta));

        testing::type_text(&mut engine, input, "zz");
        assert_eq!(widget(&engine, root).state(), ListState::Closed);
        assert_eq!(engine.document().value(input), "zz");

        let body = engine.document().root();
        engine.dispatch(testing::click(body));
        assert_eq!(engine.document().value(input), "Beta");
        assert_eq!(engine.document().value(select), "beta");
        assert_eq!(widget(&engine, root).state(), ListState::Closed);
    }

    #[test]
    fn home_and_end_jump_within_the_open_list() {
        let (mut engine, root) = fruit();
        let input = widget(&engine, root).input();

        engine.dispatch(testing::key(input, KeyCode::End));
        assert!(!widget(&engine, root).is_open());

        engine.dispatch(testing::key(input, KeyCode::Down));
        engine.dispatch(testing::key(input, KeyCode::End));
        assert_eq!(widget(&engine, root).highlighted(), Some(2));
        engine.dispatch(testing::key(input, KeyCode::Home));
        assert_eq!(widget(&engine, root).highlighted(), Some(0));
        let alpha = widget(&engine, root).options()[0].node;
        assert!(engine.document().has_class(alpha, FOCUSED));
    }

    #[test]
    fn toggle_flips_between_closed_and_unfiltered() {
        let (mut engine, root) = fruit();
        let toggle = widget(&engine, root).toggle();

        engine.dispatch(testing::click(toggle));
        assert_eq!(widget(&engine, root).state(), ListState::OpenUnfiltered);
        assert_eq!(widget(&engine, root).visible_labels().len(), 3);
        engine.dispatch(testing::click(toggle));
        assert_eq!(widget(&engine, root).state(), ListState::Closed);

        let changes: Vec<_> = engine.take_events().into_iter().map(|e| e.change).collect();
        assert_eq!(changes, vec![StateChange::Opened, StateChange::Closed]);
    }

    #[test]
    fn picking_an_option_commits_value_and_label() {
        let (mut engine, root) = fruit();
        let cb = widget(&engine, root);
        let (toggle, select, input) = (cb.toggle(), cb.select(), cb.input());
        let gamma = cb.options()[2].node;

        engine.dispatch(testing::click(toggle));
        engine.take_events();
        engine.dispatch(testing::click(gamma));

        let doc = engine.document();
        assert_eq!(doc.value(select), "gamma");
        assert_eq!(doc.value(input), "Gamma");
        assert!(doc.has_class(gamma, SELECTED));
        assert!(!doc.is_hidden(widget(&engine, root).clear_button()));
        assert_eq!(widget(&engine, root).state(), ListState::Closed);

        let events = engine.take_events();
        assert_eq!(
            events.last().map(|e| e.change.clone()),
            Some(StateChange::Selected {
                previous: String::new(),
                next: "gamma".into()
            })
        );
    }

    #[test]
    fn outside_click_closes_and_restores_committed_label() {
        let (mut engine, root) = fruit();
        let cb = widget(&engine, root);
        let (select, input, toggle) = (cb.select(), cb.input(), cb.toggle());
        let beta = cb.options()[1].node;

        engine.dispatch(testing::click(toggle));
        engine.dispatch(testing::click(beta));
        testing::type_text(&mut engine, input, "ga");
        assert!(widget(&engine, root).is_open());

        let body = engine.document().root();
        engine.dispatch(testing::click(body));
        assert_eq!(widget(&engine, root).state(), ListState::Closed);
        assert_eq!(engine.document().value(input), "Beta");
        assert_eq!(engine.document().value(select), "beta");
    }

    #[test]
    fn clicks_inside_do_not_count_as_outside() {
        let (mut engine, root) = fruit();
        let input = widget(&engine, root).input();
        testing::type_text(&mut engine, input, "b");
        engine.dispatch(testing::click(input));
        assert!(widget(&engine, root).is_open());
    }

    #[test]
    fn keyboard_highlight_and_commit() {
        let (mut engine, root) = fruit();
        let (input, select) = (widget(&engine, root).input(), widget(&engine, root).select());

        engine.dispatch(testing::key(input, KeyCode::Down));
        assert_eq!(widget(&engine, root).state(), ListState::OpenUnfiltered);
        assert_eq!(widget(&engine, root).highlighted(), Some(0));
        engine.dispatch(testing::key(input, KeyCode::Down));
        engine.dispatch(testing::key(input, KeyCode::Up));
        engine.dispatch(testing::key(input, KeyCode::Up));
        assert_eq!(widget(&engine, root).highlighted(), Some(2));

        engine.dispatch(testing::key(input, KeyCode::Enter));
        assert_eq!(engine.document().value(select), "gamma");
        assert_eq!(widget(&engine, root).state(), ListState::Closed);
    }

    #[test]
    fn escape_closes_without_committing() {
        let (mut engine, root) = fruit();
        let (input, select) = (widget(&engine, root).input(), widget(&engine, root).select());
        testing::type_text(&mut engine, input, "be");
        engine.dispatch(testing::key(input, KeyCode::Esc));

        assert_eq!(widget(&engine, root).state(), ListState::Closed);
        assert_eq!(engine.document().value(input), "");
        assert_eq!(engine.document().value(select), "");
    }

    #[test]
    fn clear_resets_value_and_text() {
        let (mut engine, root) = fruit();
        let cb = widget(&engine, root);
        let (select, input, clear, toggle) = (cb.select(), cb.input(), cb.clear_button(), cb.toggle());
        let alpha = cb.options()[0].node;
        engine.dispatch(testing::click(toggle));
        engine.dispatch(testing::click(alpha));
        engine.take_events();

        engine.dispatch(testing::click(clear));
        let doc = engine.document();
        assert_eq!(doc.value(select), "");
        assert_eq!(doc.value(input), "");
        assert!(doc.is_hidden(clear));
        assert_eq!(
            engine.take_events()[0].change,
            StateChange::Selected {
                previous: "alpha".into(),
                next: String::new()
            }
        );
    }

    #[test]
    fn initial_selection_comes_from_the_markup() {
        let markup = Element::new("div")
            .class("combo-box")
            .attr("data-placeholder", "Pick a fruit")
            .child(
                Element::new("select")
                    .child(Element::new("option").attr("value", "a").text("Apple"))
                    .child(Element::new("option").attr("value", "b").attr("selected", "").text("Banana")),
            );
        let (engine, root) = mount::<Combobox>(markup);
        let cb = widget(&engine, root);
        assert_eq!(engine.document().value(cb.input()), "Banana");
        assert_eq!(engine.document().value(cb.select()), "b");
        assert_eq!(engine.document().attr(cb.input(), "placeholder"), Some("Pick a fruit"));
    }

    #[test]
    fn missing_select_leaves_markup_static() {
        let (engine, root) = mount::<Combobox>(Element::new("div").class("combo-box"));
        assert!(engine.widget(root).is_none());
        assert!(!engine.document().has_attr(root, "data-enhanced-combobox"));
        assert_eq!(count(&engine, root, "input"), 0);
    }
}
