use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;
use regex::Regex;

use crate::tui::app::App;
use crate::tui::editor::{Control, EditorRow, GroupKind, InputKind, InputSession};
use crate::util::text::{display_width, truncate_start_to_width, truncate_to_width};

use super::push_highlighted_spans;

const CURSOR: &str = "\u{258C}";

/// Render the parameter tree of the active workflow
pub fn render_tree_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let bg = app.theme.background;
    let rows = app.rows();
    if rows.is_empty() {
        let empty = Paragraph::new(" No parameters")
            .style(Style::default().fg(app.theme.dim).bg(bg));
        frame.render_widget(empty, area);
        return;
    }

    let visible_height = area.height as usize;
    let heights: Vec<usize> = rows
        .iter()
        .map(|row| row_height(row, app.input.as_ref()))
        .collect();
    {
        let state = app.view_state();
        let cursor = state.cursor.min(rows.len() - 1);
        state.cursor = cursor;
        if cursor < state.scroll_offset {
            state.scroll_offset = cursor;
        }
        // The cursor row and any list block under it must fit
        while state.scroll_offset < cursor
            && heights[state.scroll_offset..=cursor].iter().sum::<usize>() > visible_height
        {
            state.scroll_offset += 1;
        }
    }

    // Now reborrow immutably for rendering
    let cursor = app.cursor();
    let scroll = app
        .view_states
        .get(&app.current_workflow())
        .map_or(0, |v| v.scroll_offset);
    let Some(config) = app.current_state() else {
        return;
    };
    let search_re = app.active_search_re();
    let width = area.width as usize;

    let mut lines: Vec<Line> = Vec::with_capacity(visible_height);
    for (idx, row) in rows.iter().enumerate().skip(scroll) {
        if lines.len() >= visible_height {
            break;
        }
        let editing = app.input.as_ref().filter(|input| input.path == row.path);
        let modified = !row.is_group() && config.is_modified(&row.path);
        render_row(
            app,
            row,
            &RowState {
                is_cursor: idx == cursor,
                modified,
                editing,
            },
            width,
            search_re.as_ref(),
            &mut lines,
        );
    }

    lines.truncate(visible_height);

    let paragraph = Paragraph::new(lines).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// Screen lines a row takes: one, plus one per entry while a list is edited
fn row_height(row: &EditorRow, input: Option<&InputSession>) -> usize {
    match input {
        Some(input) if input.kind == InputKind::List && input.path == row.path => {
            1 + input.buffer.split('\n').count()
        }
        _ => 1,
    }
}

struct RowState<'a> {
    is_cursor: bool,
    modified: bool,
    editing: Option<&'a InputSession>,
}

fn render_row<'a>(
    app: &App,
    row: &EditorRow,
    state: &RowState<'_>,
    width: usize,
    search_re: Option<&Regex>,
    lines: &mut Vec<Line<'a>>,
) {
    let theme = &app.theme;
    let bg = if state.is_cursor {
        theme.selection_bg
    } else {
        theme.background
    };
    let base = Style::default().bg(bg);
    let mut spans: Vec<Span> = Vec::new();

    // Important marker column
    if row.important {
        spans.push(Span::styled("\u{2022} ", base.fg(theme.important)));
    } else {
        spans.push(Span::styled("  ", base));
    }

    let indent = "  ".repeat(row.depth);
    let twisty = match row.control {
        Control::Group {
            collapsed: false, ..
        } => "\u{25BE} ",
        Control::Group {
            collapsed: true, ..
        } => "\u{25B8} ",
        _ => "  ",
    };
    spans.push(Span::styled(format!("{}{}", indent, twisty), base.fg(theme.dim)));

    let label_style = if row.important {
        base.fg(theme.text_bright).add_modifier(Modifier::BOLD)
    } else {
        base.fg(theme.text)
    };
    let highlight_style = Style::default()
        .fg(theme.search_match_fg)
        .bg(theme.search_match_bg);
    push_highlighted_spans(&mut spans, &row.label, label_style, highlight_style, search_re);

    let mut continuation: Vec<Line> = Vec::new();
    match (&row.control, state.editing) {
        (Control::Group { kind, len, .. }, _) => {
            let suffix = match kind {
                GroupKind::Object => format!(" {{{}}}", len),
                GroupKind::Array => format!(" [{}]", len),
            };
            spans.push(Span::styled(suffix, base.fg(theme.dim)));
        }
        (_, Some(input)) if input.kind == InputKind::List => {
            spans.push(Span::styled(":", label_style));
            let prefix = format!("  {}    ", indent);
            continuation = list_input_lines(app, input, &prefix);
        }
        (_, Some(input)) => {
            spans.push(Span::styled(": ", label_style));
            let invalid = input.pending_value().is_none();
            let text_style = if invalid {
                base.fg(theme.red)
            } else {
                base.fg(theme.text_bright)
            };
            let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
            let room = width.saturating_sub(used + 1);
            let (before, after) = input.buffer.split_at(input.cursor);
            let before = truncate_start_to_width(before, room);
            let after = truncate_to_width(after, room - display_width(&before));
            spans.push(Span::styled(before, text_style));
            spans.push(Span::styled(CURSOR, base.fg(theme.highlight)));
            spans.push(Span::styled(after, text_style));
        }
        (control, None) => {
            spans.push(Span::styled(": ", label_style));
            let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
            let value = truncate_to_width(&row.display_value(), width.saturating_sub(used));
            let color = match control {
                Control::Placeholder => theme.dim,
                _ if state.modified => theme.modified,
                _ => theme.text,
            };
            spans.push(Span::styled(value, base.fg(color)));
        }
    }

    if state.is_cursor {
        let used: usize = spans.iter().map(|s| display_width(&s.content)).sum();
        if used < width {
            spans.push(Span::styled(" ".repeat(width - used), base));
        }
    }

    lines.push(Line::from(spans));
    lines.extend(continuation);
}

/// One line per entry of a list being edited, with the cursor on its line
fn list_input_lines<'a>(app: &App, input: &InputSession, prefix: &str) -> Vec<Line<'a>> {
    let theme = &app.theme;
    let base = Style::default().bg(theme.background);
    let text_style = base.fg(theme.text_bright);
    let mut out = Vec::new();
    let mut offset = 0;
    for line in input.buffer.split('\n') {
        let start = offset;
        let end = start + line.len();
        offset = end + 1;
        let mut spans = vec![Span::styled(prefix.to_string(), base)];
        if (start..=end).contains(&input.cursor) {
            let at = input.cursor - start;
            spans.push(Span::styled(line[..at].to_string(), text_style));
            spans.push(Span::styled(CURSOR, base.fg(theme.highlight)));
            spans.push(Span::styled(line[at..].to_string(), text_style));
        } else {
            spans.push(Span::styled(line.to_string(), text_style));
        }
        out.push(Line::from(spans));
    }
    out
}
