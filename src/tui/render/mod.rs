pub mod help_overlay;
pub mod log_panel;
pub mod status_row;
pub mod tab_bar;
pub mod tree_view;

#[cfg(test)]
pub mod test_helpers;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::text::Span;
use ratatui::widgets::Block;
use regex::Regex;

use super::app::App;

/// Height of the run log panel when shown
const LOG_PANEL_HEIGHT: u16 = 10;

/// Main render function, dispatches to sub-renderers
pub fn render(frame: &mut Frame, app: &mut App) {
    let area = frame.area();

    // Background fill
    let bg_style = Style::default().bg(app.theme.background);
    frame.render_widget(Block::default().style(bg_style), area);

    // Layout: tab bar (2 rows) | tree | [log panel] | status row (1 row)
    let log_height = if app.show_log { LOG_PANEL_HEIGHT } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(log_height),
            Constraint::Length(1),
        ])
        .split(area);

    tab_bar::render_tab_bar(frame, app, chunks[0]);
    tree_view::render_tree_view(frame, app, chunks[1]);
    if app.show_log {
        log_panel::render_log_panel(frame, app, chunks[2]);
    }
    status_row::render_status_row(frame, app, chunks[3]);

    // Help overlay (rendered on top of everything)
    if app.show_help {
        help_overlay::render_help_overlay(frame, app, frame.area());
    }
}

/// Push spans for text with regex match highlighting. If no regex or no matches,
/// pushes a single span with `base_style`. Otherwise splits text at match boundaries.
pub(super) fn push_highlighted_spans<'a>(
    spans: &mut Vec<Span<'a>>,
    text: &str,
    base_style: Style,
    highlight_style: Style,
    search_re: Option<&Regex>,
) {
    let Some(re) = search_re else {
        spans.push(Span::styled(text.to_string(), base_style));
        return;
    };

    let mut last_end = 0;
    for m in re.find_iter(text) {
        if m.start() > last_end {
            spans.push(Span::styled(
                text[last_end..m.start()].to_string(),
                base_style,
            ));
        }
        if m.end() > m.start() {
            spans.push(Span::styled(
                text[m.start()..m.end()].to_string(),
                highlight_style,
            ));
        }
        last_end = m.end();
    }
    if last_end < text.len() || text.is_empty() {
        spans.push(Span::styled(text[last_end..].to_string(), base_style));
    }
}
