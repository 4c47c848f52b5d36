use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::io::schema::ConfigSource;
use crate::tui::app::App;
use crate::util::text::display_width;

/// Render the tab bar: one tab per workflow, with separator line below
pub fn render_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(area);

    let sep_cols = render_tabs(frame, app, chunks[0]);
    render_separator(frame, app, chunks[1], &sep_cols);
}

/// Render tabs and return the column positions of each separator character.
fn render_tabs(frame: &mut Frame, app: &App, area: Rect) -> Vec<usize> {
    let bg = app.theme.background;
    let mut spans: Vec<Span> = Vec::new();
    let mut sep_cols: Vec<usize> = Vec::new();
    let sep = Span::styled("\u{2502}", Style::default().fg(app.theme.dim).bg(bg));

    spans.push(Span::styled(" ", Style::default().bg(bg)));
    spans.push(Span::styled(
        "\u{25B6}",
        Style::default().fg(app.theme.purple).bg(bg),
    ));
    spans.push(Span::styled(" ", Style::default().bg(bg)));

    for (i, workflow) in app.tabs.iter().enumerate() {
        let is_current = i == app.active_tab;
        let dirty = app.workspace.get(*workflow).is_some_and(|s| s.dirty);
        let tab_bg = if is_current {
            app.theme.selection_bg
        } else {
            bg
        };
        spans.push(Span::styled(
            format!(" {} ", workflow.label()),
            tab_style(app, is_current),
        ));
        if dirty {
            spans.push(Span::styled(
                "* ",
                Style::default().fg(app.theme.highlight).bg(tab_bg),
            ));
        }
        sep_cols.push(spans.iter().map(|s| display_width(&s.content)).sum());
        spans.push(sep.clone());
    }

    let running = app
        .run_status
        .as_ref()
        .filter(|s| s.finished.is_none())
        .map(|s| s.workflow);
    if let Some(workflow) = running {
        spans.push(Span::styled(
            format!(" \u{25CF} {} running", workflow.label()),
            Style::default().fg(app.theme.green).bg(bg),
        ));
    }

    let tabs = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(tabs, area);
    sep_cols
}

/// Separator row, with where the defaults came from at the right edge
fn render_separator(frame: &mut Frame, app: &App, area: Rect, sep_cols: &[usize]) {
    let width = area.width as usize;
    let bg = app.theme.background;

    let (label, color) = match app.source {
        ConfigSource::Binary => ("defaults: pioneer", app.theme.dim),
        ConfigSource::Partial => ("defaults: partial", app.theme.yellow),
        ConfigSource::Fallback => ("defaults: bundled", app.theme.yellow),
    };
    // one space before the label, one after
    let line_end = width.saturating_sub(display_width(label) + 2);

    let mut sep_text = String::with_capacity(line_end * 3);
    for col in 0..line_end {
        if sep_cols.contains(&col) {
            sep_text.push('\u{2534}');
        } else {
            sep_text.push('\u{2500}');
        }
    }

    let mut spans = vec![Span::styled(
        sep_text,
        Style::default().fg(app.theme.dim).bg(bg),
    )];
    if width > display_width(label) + 2 {
        spans.push(Span::styled(" ", Style::default().bg(bg)));
        spans.push(Span::styled(label, Style::default().fg(color).bg(bg)));
        spans.push(Span::styled(" ", Style::default().bg(bg)));
    }

    let sep_widget = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(sep_widget, area);
}

/// Style for a tab: highlighted if current, normal otherwise
fn tab_style(app: &App, is_current: bool) -> Style {
    if is_current {
        Style::default()
            .fg(app.theme.text_bright)
            .bg(app.theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.text).bg(app.theme.background)
    }
}
