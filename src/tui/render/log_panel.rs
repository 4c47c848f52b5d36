use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::tui::app::App;
use crate::util::text::truncate_to_width;

/// Tail of the current run's output, newest line at the bottom
pub fn render_log_panel(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;

    let title = match &app.run_status {
        Some(run) => format!(" {} \u{2500} {} ", run.workflow.label(), run.log_path.display()),
        None => " Run log ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::TOP)
        .title(Span::styled(
            title,
            Style::default()
                .fg(app.theme.text_bright)
                .bg(bg)
                .add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(app.theme.dim).bg(bg))
        .style(Style::default().bg(bg));

    let inner_height = area.height.saturating_sub(1) as usize;
    let width = area.width as usize;
    let start = app.run_log.len().saturating_sub(inner_height);
    let lines: Vec<Line> = app.run_log[start..]
        .iter()
        .map(|line| {
            let color = if line.starts_with("stderr: ") {
                app.theme.yellow
            } else {
                app.theme.text
            };
            Line::from(Span::styled(
                truncate_to_width(line, width),
                Style::default().fg(color).bg(bg),
            ))
        })
        .collect();

    let body = if lines.is_empty() {
        vec![Line::from(Span::styled(
            "no output yet (x runs the current workflow)",
            Style::default().fg(app.theme.dim).bg(bg),
        ))]
    } else {
        lines
    };

    let paragraph = Paragraph::new(body).block(block);
    frame.render_widget(paragraph, area);
}
