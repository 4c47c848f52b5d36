//! Recursive tree editor over a parameter document.
//!
//! [`build_rows`] walks a [`JsonValue`] and produces one [`EditorRow`] per
//! rendered node, picking the control from the node's runtime type. The
//! editor never touches the document: a committed edit comes back out as an
//! [`EditEvent`] carrying the full path and new value, and the host applies
//! it through the path operations before rebuilding the rows.

use std::collections::HashSet;

use serde_json::Number;

use crate::model::path::{JsonPath, Segment};
use crate::model::value::JsonValue;
use crate::model::workspace::EditEvent;
use crate::ops::ImportantPaths;
use crate::ops::scalar_text::{format_scalar_lines, is_scalar_list, parse_number, parse_scalar_lines};
use crate::util::text::{next_grapheme_boundary, prev_grapheme_boundary};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKind {
    Object,
    Array,
}

/// How a node is presented and edited
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    /// Object, or array holding containers (or nothing); children follow as
    /// their own rows unless collapsed
    Group {
        kind: GroupKind,
        len: usize,
        collapsed: bool,
    },
    Toggle(bool),
    Number(Number),
    Text(String),
    /// Null: shown but not editable
    Placeholder,
    /// Non-empty array of scalars, edited as one line per element
    ScalarList(Vec<JsonValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EditorRow {
    pub path: JsonPath,
    pub label: String,
    pub depth: usize,
    pub important: bool,
    pub control: Control,
}

impl EditorRow {
    pub fn is_group(&self) -> bool {
        matches!(self.control, Control::Group { .. })
    }

    /// The value as shown after the label (empty for groups)
    pub fn display_value(&self) -> String {
        match &self.control {
            Control::Group { .. } => String::new(),
            Control::Toggle(true) => "[x]".to_string(),
            Control::Toggle(false) => "[ ]".to_string(),
            Control::Number(n) => n.to_string(),
            Control::Text(s) => format!("\"{}\"", s),
            Control::Placeholder => "null".to_string(),
            Control::ScalarList(items) => items
                .iter()
                .map(|v| match v {
                    JsonValue::String(s) => s.clone(),
                    other => other.to_string(),
                })
                .collect::<Vec<_>>()
                .join(", "),
        }
    }
}

struct RenderContext<'a> {
    important: &'a ImportantPaths,
    collapsed: &'a HashSet<String>,
}

/// Rows for a whole document. The root's own entries are the top level; a
/// scalar root is shown as a single row.
pub fn build_rows(
    root: &JsonValue,
    important: &ImportantPaths,
    collapsed: &HashSet<String>,
) -> Vec<EditorRow> {
    let ctx = RenderContext {
        important,
        collapsed,
    };
    let mut rows = Vec::new();
    let root_path = JsonPath::root();
    match root {
        JsonValue::Object(_) => render_children(root, &root_path, 0, &ctx, &mut rows),
        JsonValue::Array(items) if !is_scalar_list(items) => {
            render_children(root, &root_path, 0, &ctx, &mut rows)
        }
        _ => render_node("(root)", root, root_path, 0, &ctx, &mut rows),
    }
    rows
}

fn render_node(
    label: &str,
    value: &JsonValue,
    path: JsonPath,
    depth: usize,
    ctx: &RenderContext<'_>,
    out: &mut Vec<EditorRow>,
) {
    let important = ctx.important.contains(&path);
    let leaf = |control| EditorRow {
        path: path.clone(),
        label: label.to_string(),
        depth,
        important,
        control,
    };
    match value {
        JsonValue::Bool(b) => out.push(leaf(Control::Toggle(*b))),
        JsonValue::Number(n) => out.push(leaf(Control::Number(n.clone()))),
        JsonValue::String(s) => out.push(leaf(Control::Text(s.clone()))),
        JsonValue::Null => out.push(leaf(Control::Placeholder)),
        JsonValue::Array(items) if is_scalar_list(items) => {
            out.push(leaf(Control::ScalarList(items.to_vec())))
        }
        JsonValue::Array(_) | JsonValue::Object(_) => {
            let (kind, len) = match value {
                JsonValue::Object(map) => (GroupKind::Object, map.len()),
                other => (GroupKind::Array, other.as_array().map_or(0, |a| a.len())),
            };
            let collapsed = ctx.collapsed.contains(&path.dotted());
            out.push(leaf(Control::Group {
                kind,
                len,
                collapsed,
            }));
            if !collapsed {
                render_children(value, &path, depth + 1, ctx, out);
            }
        }
    }
}

fn render_children(
    value: &JsonValue,
    path: &JsonPath,
    depth: usize,
    ctx: &RenderContext<'_>,
    out: &mut Vec<EditorRow>,
) {
    match value {
        JsonValue::Object(map) => {
            for (key, child) in map.iter() {
                let child_path = path.child(Segment::Key(key.clone()));
                render_node(key, child, child_path, depth, ctx, out);
            }
        }
        JsonValue::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                let label = format!("[{}]", i);
                render_node(&label, child, path.child(Segment::Index(i)), depth, ctx, out);
            }
        }
        _ => {}
    }
}

/// Edit event for activating a toggle: the flipped boolean
pub fn toggle_event(row: &EditorRow) -> Option<EditEvent> {
    match row.control {
        Control::Toggle(b) => Some(EditEvent {
            path: row.path.clone(),
            value: JsonValue::Bool(!b),
        }),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Number,
    Text,
    List,
}

/// Outcome of finishing an input session
#[derive(Debug, Clone, PartialEq)]
pub enum Commit {
    Emit(EditEvent),
    /// Input did not parse; the control goes back to the committed value and
    /// nothing is emitted
    Revert,
    /// Text is what the host already holds
    Unchanged,
}

/// Text being typed into a field. This is the only state the editor owns,
/// and it is dropped once the edit commits or reverts.
#[derive(Debug, Clone, PartialEq)]
pub struct InputSession {
    pub path: JsonPath,
    pub kind: InputKind,
    pub buffer: String,
    /// Byte offset into `buffer`
    pub cursor: usize,
    committed: String,
}

impl InputSession {
    /// Start editing a row. Toggles, groups and null placeholders have no
    /// text input.
    pub fn begin(row: &EditorRow) -> Option<InputSession> {
        let (kind, text) = match &row.control {
            Control::Number(n) => (InputKind::Number, n.to_string()),
            Control::Text(s) => (InputKind::Text, s.clone()),
            Control::ScalarList(items) => (InputKind::List, format_scalar_lines(items)),
            Control::Toggle(_) | Control::Group { .. } | Control::Placeholder => return None,
        };
        Some(InputSession {
            path: row.path.clone(),
            kind,
            cursor: text.len(),
            buffer: text.clone(),
            committed: text,
        })
    }

    /// Text of the value the host holds
    pub fn committed_text(&self) -> &str {
        &self.committed
    }

    pub fn is_multiline(&self) -> bool {
        self.kind == InputKind::List
    }

    /// Value the buffer currently parses to. A number field yields nothing
    /// until its text is a valid number.
    pub fn pending_value(&self) -> Option<JsonValue> {
        match self.kind {
            InputKind::Number => parse_number(&self.buffer).map(JsonValue::Number),
            InputKind::Text => Some(JsonValue::String(self.buffer.clone())),
            InputKind::List => Some(JsonValue::array(parse_scalar_lines(&self.buffer))),
        }
    }

    pub fn commit(&self) -> Commit {
        if self.buffer == self.committed {
            return Commit::Unchanged;
        }
        match self.pending_value() {
            Some(value) => Commit::Emit(EditEvent {
                path: self.path.clone(),
                value,
            }),
            None => Commit::Revert,
        }
    }

    /// Discard typed text and show the committed value again
    pub fn revert(&mut self) {
        self.buffer = self.committed.clone();
        self.cursor = self.buffer.len();
    }

    pub fn insert_char(&mut self, c: char) {
        if c == '\n' && !self.is_multiline() {
            return;
        }
        self.buffer.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Insert pasted text; single-line fields get newlines as spaces
    pub fn insert_str(&mut self, text: &str) {
        let clean = if self.is_multiline() {
            text.replace('\r', "")
        } else {
            text.replace(['\n', '\r'], " ")
        };
        self.buffer.insert_str(self.cursor, &clean);
        self.cursor += clean.len();
    }

    pub fn backspace(&mut self) {
        if let Some(prev) = prev_grapheme_boundary(&self.buffer, self.cursor) {
            self.buffer.replace_range(prev..self.cursor, "");
            self.cursor = prev;
        }
    }

    pub fn delete(&mut self) {
        if let Some(next) = next_grapheme_boundary(&self.buffer, self.cursor) {
            self.buffer.replace_range(self.cursor..next, "");
        }
    }

    pub fn move_left(&mut self) {
        if let Some(prev) = prev_grapheme_boundary(&self.buffer, self.cursor) {
            self.cursor = prev;
        }
    }

    pub fn move_right(&mut self) {
        if let Some(next) = next_grapheme_boundary(&self.buffer, self.cursor) {
            self.cursor = next;
        }
    }

    /// Start of the current line
    pub fn home(&mut self) {
        self.cursor = self.buffer[..self.cursor].rfind('\n').map_or(0, |i| i + 1);
    }

    /// End of the current line
    pub fn end(&mut self) {
        self.cursor = self.buffer[self.cursor..]
            .find('\n')
            .map_or(self.buffer.len(), |i| self.cursor + i);
    }
}
