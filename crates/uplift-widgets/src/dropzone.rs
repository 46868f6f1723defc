//! Drag-and-drop target around a native file control.
//!
//! Enter and leave events bubble from every descendant, so hover state is a
//! counter rather than a flag: the zone shows as dragged-over while more
//! enters than leaves have been seen. With nested zones, an event belongs to
//! the innermost zone containing its target.
//!
//! Preview rows are reused across selections; rows beyond the current file
//! count are hidden rather than removed.

use crate::widget::Enhancer;
use std::fmt;
use std::str::FromStr;
use uplift_core::config;
use uplift_core::{
    Command, Component, Context, Element, EnhanceError, EventKind, FileEntry, NodeId, Selector,
    StateChange, WidgetEvent,
};

/// Type tag.
pub const KIND: &str = "dropzone";
/// Root marker.
pub const MARKER: &str = ".file-input";
/// Required sub-elements.
pub const REQUIRED: &[&str] = &["input[type=file]"];

const DRAG: &str = "file-input--drag";
const ERROR: &str = "file-input--error";
const INVALID_TYPE: &str = "This is not a valid file type.";

/// A size limit such as `2MB`, stored in bytes. Units are powers of 1024.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ByteSize(pub u64);

const UNITS: [(&str, u64); 4] = [
    ("GB", 1 << 30),
    ("MB", 1 << 20),
    ("KB", 1 << 10),
    ("B", 1),
];

impl FromStr for ByteSize {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_ascii_uppercase();
        let split = s
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(s.len());
        let (number, unit) = s.split_at(split);
        let number: f64 = number
            .parse()
            .map_err(|_| format!("expected a number, got `{number}`"))?;
        let unit = unit.trim();
        let scale = if unit.is_empty() {
            1
        } else {
            UNITS
                .iter()
                .find(|(name, _)| *name == unit)
                .map(|(_, scale)| *scale)
                .ok_or_else(|| format!("unknown unit `{unit}`"))?
        };
        Ok(ByteSize((number * scale as f64).round() as u64))
    }
}

impl fmt::Display for ByteSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (name, scale) = UNITS
            .iter()
            .find(|(_, scale)| self.0 >= *scale && self.0 % scale == 0)
            .copied()
            .unwrap_or(("B", 1));
        write!(f, "{}{name}", self.0 / scale)
    }
}

/// Whether `file` passes an `accept` list (`.ext`, `type/*` or an exact MIME type).
pub fn accepts(accept: &[String], file: &FileEntry) -> bool {
    if accept.is_empty() {
        return true;
    }
    let name = file.name.to_ascii_lowercase();
    let mime = file.mime.to_ascii_lowercase();
    accept.iter().any(|token| {
        if token.starts_with('.') {
            name.ends_with(token.as_str())
        } else if let Some(family) = token.strip_suffix("/*") {
            mime.split('/').next() == Some(family)
        } else {
            mime == *token
        }
    })
}

/// Messages for the drop zone.
#[derive(Debug, Clone)]
pub enum Message {
    /// A drag entered the zone or one of its descendants.
    Enter(NodeId),
    /// A drag left the zone or one of its descendants.
    Leave(NodeId),
    /// Files were released over the zone.
    Drop(NodeId, Vec<FileEntry>),
    /// The file control's selection changed.
    Changed,
}

/// An enhanced drop zone.
pub struct Dropzone {
    root: NodeId,
    input: NodeId,
    instructions: NodeId,
    preview: NodeId,
    items: Vec<NodeId>,
    error: NodeId,
    marker: Selector,
    accept: Vec<String>,
    max_size: Option<ByteSize>,
    drag_count: u32,
    valid: bool,
}

impl Enhancer for Dropzone {
    const KIND: &'static str = KIND;
    const MARKER: &'static str = MARKER;
    const REQUIRED: &'static [&'static str] = REQUIRED;

    fn enhance(cx: &mut Context<'_, Message>, root: NodeId) -> Result<Self, EnhanceError> {
        let input = cx.require(root, "input[type=file]")?;
        let marker = Selector::parse(MARKER)?;
        let max_size = config::attr::<ByteSize>(cx.doc(), root, "data-max-file-size")
            .unwrap_or_else(|err| {
                log::warn!("{root}: {err}; no size limit");
                None
            });
        let accept: Vec<String> = cx
            .doc()
            .attr(input, "accept")
            .unwrap_or_default()
            .split(',')
            .map(|t| t.trim().to_ascii_lowercase())
            .filter(|t| !t.is_empty())
            .collect();
        let multiple = cx.doc().has_attr(input, "multiple");

        let doc = cx.doc_mut();
        let parent = doc.parent(input).unwrap_or(root);
        let instructions = doc.build(
            Element::new("div")
                .class("file-input__instructions")
                .attr("aria-hidden", "true")
                .text(if multiple {
                    "Drag files here or choose from folder"
                } else {
                    "Drag file here or choose from folder"
                }),
        );
        doc.insert_before(parent, instructions, input);
        let preview = doc.build(
            Element::new("div")
                .class("file-input__preview")
                .attr("aria-live", "polite")
                .hidden(),
        );
        doc.insert_after(input, preview);
        let error = doc.build(
            Element::new("span")
                .class("file-input__error")
                .attr("role", "alert")
                .hidden(),
        );
        doc.insert_after(input, error);
        doc.add_class(input, "file-input__input");

        cx.listen(root, EventKind::DragEnter, |ev| Some(Message::Enter(ev.target)));
        cx.listen(root, EventKind::DragLeave, |ev| Some(Message::Leave(ev.target)));
        cx.listen(root, EventKind::Drop, |ev| {
            Some(Message::Drop(ev.target, ev.files.clone()))
        });
        cx.listen(input, EventKind::Change, |_| Some(Message::Changed));

        Ok(Self {
            root,
            input,
            instructions,
            preview,
            items: Vec::new(),
            error,
            marker,
            accept,
            max_size,
            drag_count: 0,
            valid: true,
        })
    }
}

impl Dropzone {
    /// Unbalanced enter events seen so far.
    pub fn drag_count(&self) -> u32 {
        self.drag_count
    }

    /// Whether the drag-over state is showing.
    pub fn is_drag_over(&self) -> bool {
        self.drag_count > 0
    }

    /// Whether the installed files passed validation.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The backing file control.
    pub fn input(&self) -> NodeId {
        self.input
    }

    /// The error node next to the control.
    pub fn error(&self) -> NodeId {
        self.error
    }

    /// The file name list.
    pub fn preview(&self) -> NodeId {
        self.preview
    }

    /// Configured size limit.
    pub fn max_size(&self) -> Option<ByteSize> {
        self.max_size
    }

    fn owns(&self, cx: &Context<'_, Message>, target: NodeId) -> bool {
        cx.doc().closest(target, &self.marker) == Some(self.root)
    }

    fn set_drag(&mut self, cx: &mut Context<'_, Message>, count: u32) {
        let was = self.is_drag_over();
        self.drag_count = count;
        let now = self.is_drag_over();
        if was != now {
            cx.doc_mut().toggle_class(self.root, DRAG, now);
            cx.emit(WidgetEvent::new(KIND, self.root, StateChange::DragOver(now)));
        }
    }

    fn problem(&self, files: &[FileEntry]) -> Option<String> {
        if files.iter().any(|f| !accepts(&self.accept, f)) {
            return Some(INVALID_TYPE.to_string());
        }
        let max = self.max_size?;
        files
            .iter()
            .find(|f| f.size > max.0)
            .map(|f| format!("{} is too large. The maximum file size is {max}.", f.name))
    }

    fn changed(&mut self, cx: &mut Context<'_, Message>) {
        let mut files = cx.doc().files(self.input).to_vec();
        let problem = self.problem(&files);
        let doc = cx.doc_mut();
        if problem.as_deref() == Some(INVALID_TYPE) {
            files.clear();
            doc.set_files(self.input, Vec::new());
        }

        for (index, file) in files.iter().enumerate() {
            let item = match self.items.get(index) {
                Some(item) => *item,
                None => {
                    let item = doc.append_fragment(
                        self.preview,
                        Element::new("div").class("file-input__preview-item"),
                    );
                    self.items.push(item);
                    item
                }
            };
            doc.set_text(item, file.name.clone());
            doc.set_hidden(item, false);
        }
        for item in self.items.iter().skip(files.len()) {
            doc.set_text(*item, "");
            doc.set_hidden(*item, true);
        }
        doc.set_hidden(self.preview, files.is_empty());
        doc.set_hidden(self.instructions, !files.is_empty());

        let valid = problem.is_none();
        let message = problem.unwrap_or_default();
        doc.set_text(self.error, message.clone());
        doc.set_hidden(self.error, valid);
        doc.toggle_class(self.root, ERROR, !valid);
        if valid {
            doc.remove_attr(self.input, "aria-invalid");
        } else {
            doc.set_attr(self.input, "aria-invalid", "true");
        }

        let names = files.into_iter().map(|f| f.name).collect();
        cx.emit(WidgetEvent::new(KIND, self.root, StateChange::FilesChanged { names }));
        if valid != self.valid {
            self.valid = valid;
            cx.emit(WidgetEvent::new(KIND, self.root, StateChange::Validity { valid, message }));
        }
    }
}

impl Component for Dropzone {
    type Message = Message;

    fn kind(&self) -> &'static str {
        KIND
    }

    fn root(&self) -> NodeId {
        self.root
    }

    fn update(&mut self, cx: &mut Context<'_, Message>, msg: Message) -> Command<Message> {
        match msg {
            Message::Enter(target) if self.owns(cx, target) => {
                self.set_drag(cx, self.drag_count.saturating_add(1));
            }
            Message::Leave(target) if self.owns(cx, target) => {
                self.set_drag(cx, self.drag_count.saturating_sub(1));
            }
            Message::Drop(target, files) if self.owns(cx, target) => {
                self.set_drag(cx, 0);
                cx.doc_mut().set_files(self.input, files);
                self.changed(cx);
            }
            Message::Changed => self.changed(cx),
            Message::Enter(_) | Message::Leave(_) | Message::Drop(..) => {}
        }
        Command::none()
    }
}
