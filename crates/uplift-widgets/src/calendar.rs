//! Date picker: a text input plus a month-grid calendar.
//!
//! The calendar keeps a *view cursor* (the month on screen) separate from the
//! *committed selection* (the date in the input). Navigation moves only the
//! cursor; the grid for any month comes from the pure [`grid`] function, so
//! showing another month never touches the input.
//!
//! The day cells are a fixed pool of [`GRID_SLOTS`] buttons created once at
//! enhancement. Rendering rewrites them in place and hides the slots a month
//! does not use.

use crate::key::NavKeys;
use crate::widget::{fresh_id, Enhancer};
use chrono::{Datelike, Days, Months, NaiveDate};
use crossterm::event::KeyEvent;
use regex::Regex;
use uplift_core::config::{self, ConfigError};
use uplift_core::{
    Command, Component, Context, Element, EnhanceError, EventKind, NodeId, StateChange,
    WidgetEvent,
};

/// Type tag.
pub const KIND: &str = "calendar";
/// Root marker.
pub const MARKER: &str = ".date-picker";
/// Required sub-elements.
pub const REQUIRED: &[&str] = &["input"];

/// Display format of committed dates.
pub const DATE_FORMAT: &str = "%m/%d/%Y";
const DATE_PATTERN: &str = r"^\d{2}/\d{2}/\d{4}$";
const ISO_FORMAT: &str = "%Y-%m-%d";
const INVALID_FORMAT: &str = "Please enter a valid date in MM/DD/YYYY format";

/// Day cells kept in the grid: six weeks covers every month.
pub const GRID_SLOTS: usize = 42;
const BLANK: &str = "date-picker__date--blank";
const TODAY: &str = "date-picker__date--today";
const SELECTED: &str = "date-picker__date--selected";

/// One slot of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cell {
    /// Padding before the first or after the last day.
    Blank,
    /// A day of the month.
    Day {
        /// The date.
        date: NaiveDate,
        /// Whether it is today.
        today: bool,
        /// Whether it is the committed selection.
        selected: bool,
    },
}

/// Sunday-first grid for `month` of `year`: leading blanks up to the weekday
/// of day 1, one cell per day, then blanks to complete the last week.
///
/// An out-of-range month yields no cells.
pub fn grid(year: i32, month: u32, selected: Option<NaiveDate>, today: NaiveDate) -> Vec<Cell> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let leading = first.weekday().num_days_from_sunday() as usize;
    let mut cells = vec![Cell::Blank; leading];
    cells.extend(
        (0..month_length(first))
            .filter_map(|offset| first.checked_add_days(Days::new(offset)))
            .map(|date| Cell::Day {
                date,
                today: date == today,
                selected: Some(date) == selected,
            }),
    );
    let trailing = (7 - cells.len() % 7) % 7;
    cells.extend(std::iter::repeat_n(Cell::Blank, trailing));
    cells
}

fn month_length(first: NaiveDate) -> u64 {
    first
        .checked_add_months(Months::new(1))
        .map_or(31, |next| (next - first).num_days().unsigned_abs())
}

/// The month currently displayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewCursor {
    /// Displayed year.
    pub year: i32,
    /// Displayed month, 1-12.
    pub month: u32,
}

impl ViewCursor {
    /// Cursor on the month containing `date`.
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Move by `delta` months, carrying into the year.
    pub fn shift_months(self, delta: i32) -> Self {
        let index = self.year * 12 + self.month as i32 - 1 + delta;
        Self {
            year: index.div_euclid(12),
            month: index.rem_euclid(12) as u32 + 1,
        }
    }

    /// Move by `delta` years.
    pub fn shift_years(self, delta: i32) -> Self {
        Self {
            year: self.year + delta,
            ..self
        }
    }

    /// Heading text, e.g. `January 2024`.
    pub fn label(self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_default()
    }
}

/// Navigation controls in the calendar header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    /// One year back.
    PrevYear,
    /// One month back.
    PrevMonth,
    /// One month forward.
    NextMonth,
    /// One year forward.
    NextYear,
}

/// Messages for the date picker.
#[derive(Debug, Clone)]
pub enum Message {
    /// The calendar button was activated.
    Toggle,
    /// A navigation control was activated.
    Navigate(Nav),
    /// A click landed in the date grid.
    Pick(NodeId),
    /// The input text changed.
    TextChanged,
    /// A key was pressed inside the widget.
    KeyPress(KeyEvent),
    /// A click somewhere on the page.
    Outside(NodeId),
}

/// An enhanced date picker.
pub struct Calendar {
    root: NodeId,
    input: NodeId,
    toggle: NodeId,
    dialog: NodeId,
    heading: NodeId,
    cells: NodeId,
    slots: Vec<NodeId>,
    status: NodeId,
    nav: [NodeId; 4],
    view: ViewCursor,
    selected: Option<NaiveDate>,
    default_date: Option<NaiveDate>,
    min: Option<NaiveDate>,
    max: Option<NaiveDate>,
    open: bool,
    valid: bool,
    pattern: Regex,
    keys: NavKeys,
}

fn date_setting(cx: &Context<'_, Message>, root: NodeId, name: &str) -> Option<NaiveDate> {
    config::date_attr(cx.doc(), root, name).unwrap_or_else(|err| {
        log::warn!("{root}: {err}; ignoring");
        None
    })
}

impl Enhancer for Calendar {
    const KIND: &'static str = KIND;
    const MARKER: &'static str = MARKER;
    const REQUIRED: &'static [&'static str] = REQUIRED;

    fn enhance(cx: &mut Context<'_, Message>, root: NodeId) -> Result<Self, EnhanceError> {
        let input = cx.require(root, "input")?;
        let pattern = Regex::new(DATE_PATTERN).map_err(|e| ConfigError {
            attr: "pattern".into(),
            value: DATE_PATTERN.into(),
            reason: e.to_string(),
        })?;
        let min = date_setting(cx, root, "data-min-date");
        let max = date_setting(cx, root, "data-max-date");
        let default_date = date_setting(cx, root, "data-default-date");
        let dialog_id = fresh_id(cx.doc(), "date-picker-calendar");

        let doc = cx.doc_mut();
        doc.add_class(input, "date-picker__external-input");
        let toggle = doc.append_fragment(
            root,
            Element::new("button")
                .class("date-picker__button")
                .attr("type", "button")
                .attr("aria-haspopup", "true")
                .attr("aria-expanded", "false")
                .attr("aria-controls", &dialog_id)
                .attr("aria-label", "Toggle calendar"),
        );
        let dialog = doc.append_fragment(
            root,
            Element::new("div")
                .class("date-picker__calendar")
                .id(dialog_id)
                .attr("role", "dialog")
                .attr("aria-modal", "true")
                .hidden()
                .child(
                    Element::new("div")
                        .class("date-picker__navigation")
                        .child(nav_button("date-picker__previous-year", "Navigate back one year"))
                        .child(nav_button("date-picker__previous-month", "Navigate back one month"))
                        .child(
                            Element::new("div")
                                .class("date-picker__month-label")
                                .attr("aria-live", "polite"),
                        )
                        .child(nav_button("date-picker__next-month", "Navigate forward one month"))
                        .child(nav_button("date-picker__next-year", "Navigate forward one year")),
                )
                .child(
                    Element::new("div")
                        .class("date-picker__days")
                        .attr("role", "grid")
                        .children((0..GRID_SLOTS).map(|_| {
                            Element::new("button")
                                .class("date-picker__date")
                                .attr("type", "button")
                                .attr("tabindex", "-1")
                                .hidden()
                        })),
                ),
        );
        let status = doc.append_fragment(
            root,
            Element::new("div")
                .class("date-picker__status")
                .attr("role", "status")
                .hidden(),
        );
        let header = doc.children(dialog)[0];
        let cells = doc.children(dialog)[1];
        let slots = doc.children(cells).to_vec();
        let controls = doc.children(header).to_vec();
        let nav = [controls[0], controls[1], controls[3], controls[4]];
        let heading = controls[2];

        cx.listen(toggle, EventKind::Click, |_| Some(Message::Toggle));
        for (node, step) in nav
            .iter()
            .zip([Nav::PrevYear, Nav::PrevMonth, Nav::NextMonth, Nav::NextYear])
        {
            cx.listen(*node, EventKind::Click, move |_| Some(Message::Navigate(step)));
        }
        cx.listen(cells, EventKind::Click, |ev| Some(Message::Pick(ev.target)));
        cx.listen(input, EventKind::Input, |_| Some(Message::TextChanged));
        cx.listen(root, EventKind::KeyDown, |ev| ev.key.map(Message::KeyPress));
        let body = cx.doc().root();
        cx.listen(body, EventKind::Click, |ev| Some(Message::Outside(ev.target)));

        let today = cx.today();
        let mut calendar = Self {
            root,
            input,
            toggle,
            dialog,
            heading,
            cells,
            slots,
            status,
            nav,
            view: ViewCursor::of(default_date.unwrap_or(today)),
            selected: None,
            default_date,
            min,
            max,
            open: false,
            valid: true,
            pattern,
            keys: NavKeys::default(),
        };

        let text = cx.doc().value(input).trim().to_string();
        if !text.is_empty() {
            match calendar.parse(&text) {
                Ok(date) => calendar.selected = Some(date),
                Err(message) => calendar.set_validity(cx, false, message),
            }
        }
        Ok(calendar)
    }
}

fn nav_button(class: &str, label: &str) -> Element {
    Element::new("button")
        .class(class)
        .attr("type", "button")
        .attr("aria-label", label)
}

impl Calendar {
    /// Displayed month.
    pub fn view(&self) -> ViewCursor {
        self.view
    }

    /// Committed date.
    pub fn selected(&self) -> Option<NaiveDate> {
        self.selected
    }

    /// Whether the calendar is showing.
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether the typed text is acceptable.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The text input.
    pub fn input(&self) -> NodeId {
        self.input
    }

    /// The calendar button.
    pub fn toggle(&self) -> NodeId {
        self.toggle
    }

    /// The calendar dialog.
    pub fn dialog(&self) -> NodeId {
        self.dialog
    }

    /// Container of the rendered day cells.
    pub fn cells(&self) -> NodeId {
        self.cells
    }

    /// The month heading.
    pub fn heading(&self) -> NodeId {
        self.heading
    }

    /// Navigation control for `step`.
    pub fn nav_control(&self, step: Nav) -> NodeId {
        match step {
            Nav::PrevYear => self.nav[0],
            Nav::PrevMonth => self.nav[1],
            Nav::NextMonth => self.nav[2],
            Nav::NextYear => self.nav[3],
        }
    }

    fn in_range(&self, date: NaiveDate) -> bool {
        self.min.is_none_or(|min| date >= min) && self.max.is_none_or(|max| date <= max)
    }

    fn parse(&self, text: &str) -> Result<NaiveDate, String> {
        if !self.pattern.is_match(text) {
            return Err(INVALID_FORMAT.to_string());
        }
        let date = NaiveDate::parse_from_str(text, DATE_FORMAT).map_err(|_| INVALID_FORMAT.to_string())?;
        if self.in_range(date) {
            Ok(date)
        } else {
            Err(format!("{text} is outside the allowed range"))
        }
    }

    fn set_validity(&mut self, cx: &mut Context<'_, Message>, valid: bool, message: String) {
        let doc = cx.doc_mut();
        doc.toggle_class(self.input, "date-picker__external-input--invalid", !valid);
        if valid {
            doc.remove_attr(self.input, "aria-invalid");
        } else {
            doc.set_attr(self.input, "aria-invalid", "true");
        }
        doc.set_text(self.status, message.clone());
        doc.set_hidden(self.status, valid);
        if valid != self.valid {
            self.valid = valid;
            cx.emit(WidgetEvent::new(KIND, self.root, StateChange::Validity { valid, message }));
        }
    }

    fn render(&self, cx: &mut Context<'_, Message>) {
        let today = cx.today();
        let days = grid(self.view.year, self.view.month, self.selected, today);
        let doc = cx.doc_mut();
        doc.set_text(self.heading, self.view.label());
        for (index, slot) in self.slots.iter().copied().enumerate() {
            let cell = days.get(index).copied();
            doc.set_hidden(slot, cell.is_none());
            doc.toggle_class(slot, BLANK, cell == Some(Cell::Blank));
            match cell {
                Some(Cell::Day {
                    date,
                    today,
                    selected,
                }) => {
                    doc.set_text(slot, date.day().to_string());
                    doc.set_attr(slot, "data-date", date.format(ISO_FORMAT).to_string());
                    doc.set_attr(slot, "aria-selected", selected.to_string());
                    doc.set_attr(slot, "tabindex", if selected { "0" } else { "-1" });
                    doc.remove_attr(slot, "aria-hidden");
                    doc.toggle_class(slot, TODAY, today);
                    doc.toggle_class(slot, SELECTED, selected);
                    if self.in_range(date) {
                        doc.remove_attr(slot, "disabled");
                    } else {
                        doc.set_attr(slot, "disabled", "");
                    }
                }
                _ => {
                    doc.set_text(slot, "");
                    for name in ["data-date", "aria-selected", "disabled"] {
                        doc.remove_attr(slot, name);
                    }
                    doc.set_attr(slot, "tabindex", "-1");
                    doc.set_attr(slot, "aria-hidden", "true");
                    doc.remove_class(slot, TODAY);
                    doc.remove_class(slot, SELECTED);
                }
            }
        }
    }

    fn open(&mut self, cx: &mut Context<'_, Message>) {
        let seed = self.selected.or(self.default_date).unwrap_or_else(|| cx.today());
        self.view = ViewCursor::of(seed);
        self.open = true;
        self.render(cx);
        let doc = cx.doc_mut();
        doc.set_hidden(self.dialog, false);
        doc.set_attr(self.toggle, "aria-expanded", "true");
        cx.emit(WidgetEvent::new(KIND, self.root, StateChange::Opened));
    }

    fn close(&mut self, cx: &mut Context<'_, Message>) {
        if !self.open {
            return;
        }
        self.open = false;
        let doc = cx.doc_mut();
        doc.set_hidden(self.dialog, true);
        doc.set_attr(self.toggle, "aria-expanded", "false");
        doc.focus(self.input);
        cx.emit(WidgetEvent::new(KIND, self.root, StateChange::Closed));
    }

    fn commit(&mut self, cx: &mut Context<'_, Message>, date: NaiveDate) {
        let format = |d: NaiveDate| d.format(DATE_FORMAT).to_string();
        let previous = self.selected.map(format).unwrap_or_default();
        let next = format(date);
        self.selected = Some(date);
        cx.doc_mut().set_value(self.input, next.clone());
        self.set_validity(cx, true, String::new());
        self.close(cx);
        if previous != next {
            cx.emit(WidgetEvent::new(KIND, self.root, StateChange::Selected { previous, next }));
        }
    }

    fn pick(&mut self, cx: &mut Context<'_, Message>, target: NodeId) {
        let doc = cx.doc();
        if doc.has_attr(target, "disabled") {
            return;
        }
        let Some(date) = doc
            .attr(target, "data-date")
            .and_then(|raw| NaiveDate::parse_from_str(raw, ISO_FORMAT).ok())
        else {
            return;
        };
        if self.in_range(date) {
            self.commit(cx, date);
        }
    }

    fn text_changed(&mut self, cx: &mut Context<'_, Message>) {
        let text = cx.doc().value(self.input).trim().to_string();
        if text.is_empty() {
            self.selected = None;
            self.set_validity(cx, true, String::new());
            return;
        }
        match self.parse(&text) {
            Ok(date) => {
                let previous = self.selected.map(|d| d.format(DATE_FORMAT).to_string()).unwrap_or_default();
                self.set_validity(cx, true, String::new());
                if self.selected != Some(date) {
                    self.selected = Some(date);
                    cx.emit(WidgetEvent::new(
                        KIND,
                        self.root,
                        StateChange::Selected { previous, next: text },
                    ));
                }
                if self.open {
                    self.view = ViewCursor::of(date);
                    self.render(cx);
                }
            }
            Err(message) => self.set_validity(cx, false, message),
        }
    }
}

impl Component for Calendar {
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
                if self.open {
                    self.close(cx);
                } else {
                    self.open(cx);
                }
            }
            Message::Navigate(step) if self.open => {
                self.view = match step {
                    Nav::PrevYear => self.view.shift_years(-1),
                    Nav::PrevMonth => self.view.shift_months(-1),
                    Nav::NextMonth => self.view.shift_months(1),
                    Nav::NextYear => self.view.shift_years(1),
                };
                self.render(cx);
            }
            Message::Navigate(_) => {}
            Message::Pick(target) => self.pick(cx, target),
            Message::TextChanged => self.text_changed(cx),
            Message::KeyPress(key) => {
                if self.keys.dismiss.matches(&key) {
                    self.close(cx);
                }
            }
            Message::Outside(target) => {
                if self.open && !cx.doc().contains(self.root, target) {
                    self.close(cx);
                }
            }
        }
        Command::none()
    }
}
