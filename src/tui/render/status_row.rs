use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::Style;
use ratatui::text::{Line, Span};
use ratatui::widgets::Paragraph;

use crate::tui::app::{App, Mode};
use crate::tui::editor::InputKind;
use crate::util::text::display_width;

/// Render the status row (bottom of screen)
pub fn render_status_row(frame: &mut Frame, app: &App, area: Rect) {
    let bg = app.theme.background;
    let width = area.width as usize;

    let (mut spans, hint): (Vec<Span>, String) = match app.mode {
        Mode::Navigate => {
            let mut spans = Vec::new();
            if let Some(status) = &app.status {
                let color = if status.is_error {
                    app.theme.red
                } else {
                    app.theme.green
                };
                spans.push(Span::styled(
                    status.text.clone(),
                    Style::default().fg(color).bg(bg),
                ));
            } else if let Some(pattern) = &app.last_search {
                spans.push(Span::styled(
                    format!("/{}", pattern),
                    Style::default().fg(app.theme.dim).bg(bg),
                ));
            } else if let Some(row) = app.selected_row() {
                spans.push(Span::styled(
                    row.path.dotted(),
                    Style::default().fg(app.theme.dim).bg(bg),
                ));
            }
            let hint = match &app.run_status {
                Some(run) => run_summary(run),
                None if app.last_search.is_some() => "n/N next/prev".to_string(),
                None => "? help".to_string(),
            };
            (spans, hint)
        }
        Mode::Edit => {
            let path = app
                .input
                .as_ref()
                .map(|i| i.path.dotted())
                .unwrap_or_default();
            let spans = vec![Span::styled(
                format!("edit {}", path),
                Style::default().fg(app.theme.text_bright).bg(bg),
            )];
            let multiline = app.input.as_ref().is_some_and(|i| i.kind == InputKind::List);
            let hint = if multiline {
                "Enter newline  Ctrl+S commit  Esc cancel"
            } else {
                "Enter commit  Esc cancel"
            };
            (spans, hint.to_string())
        }
        Mode::Search => {
            // Search prompt: /pattern▌
            let spans = vec![
                Span::styled(
                    format!("/{}", app.search_input),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
            ];
            (spans, "Enter search  Esc cancel".to_string())
        }
        Mode::Prompt => {
            let (label, buffer) = app
                .prompt
                .as_ref()
                .map(|p| (p.kind.label(), p.buffer.as_str()))
                .unwrap_or(("", ""));
            let spans = vec![
                Span::styled(
                    format!("{}: ", label),
                    Style::default().fg(app.theme.purple).bg(bg),
                ),
                Span::styled(
                    buffer.to_string(),
                    Style::default().fg(app.theme.text_bright).bg(bg),
                ),
                Span::styled("\u{258C}", Style::default().fg(app.theme.highlight).bg(bg)),
            ];
            (spans, "Enter confirm  Esc cancel".to_string())
        }
    };

    let content_width: usize = spans.iter().map(|s| display_width(&s.content)).sum();
    let hint_width = display_width(&hint);
    if content_width + hint_width < width {
        let padding = width - content_width - hint_width;
        spans.push(Span::styled(" ".repeat(padding), Style::default().bg(bg)));
        spans.push(Span::styled(hint, Style::default().fg(app.theme.dim).bg(bg)));
    }

    let paragraph = Paragraph::new(Line::from(spans)).style(Style::default().bg(bg));
    frame.render_widget(paragraph, area);
}

/// "SearchDIA: First pass search 40%" while running, outcome afterwards
fn run_summary(run: &crate::tui::app::RunStatus) -> String {
    match run.finished {
        None => format!(
            "{}: {} {:.0}%",
            run.workflow.label(),
            run.stage_label.unwrap_or("starting"),
            run.progress
        ),
        Some(true) => format!("{}: done", run.workflow.label()),
        Some(false) => format!("{}: failed", run.workflow.label()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tui::app::{PromptKind, PromptState, RunStatus};
    use crate::tui::render::test_helpers::*;
    use std::path::PathBuf;

    fn status_line(app: &App) -> String {
        render_to_string(60, 1, |frame, area| {
            render_status_row(frame, app, area);
        })
    }

    #[test]
    fn navigate_shows_path_and_help_hint() {
        let app = two_tab_app();
        let line = status_line(&app);
        assert!(line.starts_with("threads"), "{}", line);
        assert!(line.ends_with("? help"), "{}", line);
    }

    #[test]
    fn error_message_replaces_path() {
        let mut app = two_tab_app();
        app.set_error("boom");
        assert!(status_line(&app).starts_with("boom"));
    }

    #[test]
    fn search_prompt_has_cursor() {
        let mut app = two_tab_app();
        app.mode = Mode::Search;
        app.search_input = "thr".into();
        let line = status_line(&app);
        assert!(line.starts_with("/thr\u{258C}"), "{}", line);
        assert!(line.ends_with("Enter search  Esc cancel"));
    }

    #[test]
    fn file_prompt_shows_kind() {
        let mut app = two_tab_app();
        app.mode = Mode::Prompt;
        app.prompt = Some(PromptState {
            kind: PromptKind::Load,
            buffer: "params.json".into(),
        });
        assert!(status_line(&app).starts_with("load: params.json\u{258C}"));
    }

    #[test]
    fn run_progress_on_the_right() {
        let mut app = two_tab_app();
        app.run_status = Some(RunStatus {
            workflow: crate::model::config::Workflow::SearchDia,
            stage_label: Some("First pass search"),
            progress: 33.3,
            finished: None,
            log_path: PathBuf::from("/tmp/x.log"),
        });
        assert!(status_line(&app).ends_with("SearchDIA: First pass search 33%"));
    }
}
