use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::workspace::Message;
use crate::tui::app::{App, Mode, PromptKind, PromptState};
use crate::tui::editor::Control;

use super::*;

const PAGE: usize = 10;

pub(super) fn handle_navigate(app: &mut App, key: KeyEvent) {
    // Help overlay intercepts ? and Esc
    if app.show_help {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::Esc) {
            app.show_help = false;
        }
        return;
    }

    app.status = None;
    if key.code != KeyCode::Char('q') {
        app.quit_pending = false;
    }

    match (key.modifiers, key.code) {
        (_, KeyCode::Char('q')) => {
            if app.run_in_progress() && !app.quit_pending {
                app.quit_pending = true;
                app.set_error("a run is in progress, press q again to quit");
            } else {
                app.should_quit = true;
            }
        }
        (_, KeyCode::Char('?')) => app.show_help = true,

        (_, KeyCode::Char('j') | KeyCode::Down) => move_cursor(app, 1),
        (_, KeyCode::Char('k') | KeyCode::Up) => move_cursor(app, -1),
        (_, KeyCode::PageDown) => move_cursor(app, PAGE as isize),
        (_, KeyCode::PageUp) => move_cursor(app, -(PAGE as isize)),
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => move_cursor(app, PAGE as isize),
        (KeyModifiers::CONTROL, KeyCode::Char('u')) => move_cursor(app, -(PAGE as isize)),
        (_, KeyCode::Char('g') | KeyCode::Home) => app.view_state().cursor = 0,
        (_, KeyCode::Char('G') | KeyCode::End) => {
            let last = app.rows().len().saturating_sub(1);
            app.view_state().cursor = last;
        }

        (_, KeyCode::Char('h') | KeyCode::Left) => collapse_or_parent(app),
        (_, KeyCode::Char('l') | KeyCode::Right) => expand(app),

        (_, KeyCode::Tab) => app.switch_tab(true),
        (_, KeyCode::BackTab) => app.switch_tab(false),

        (_, KeyCode::Enter | KeyCode::Char('e')) => begin_edit(app),
        (_, KeyCode::Char(' ')) => activate(app),

        (_, KeyCode::Char('o')) => open_prompt(app, PromptKind::Load),
        (_, KeyCode::Char('w')) => open_prompt(app, PromptKind::SaveAs),
        (_, KeyCode::Char('s')) => {
            let last = app.current_state().and_then(|s| s.last_file.clone());
            match last {
                Some(path) => app.save_to(path),
                None => open_prompt(app, PromptKind::SaveAs),
            }
        }

        (_, KeyCode::Char('r')) => {
            if let Some(row) = app.selected_row() {
                let workflow = app.current_workflow();
                app.dispatch(Message::ResetField {
                    workflow,
                    path: row.path.clone(),
                });
                app.set_status(format!("reset {}", row.path));
            }
        }
        (_, KeyCode::Char('R')) => {
            let workflow = app.current_workflow();
            app.dispatch(Message::Reset { workflow });
            app.set_status(format!("{} reset to defaults", workflow.label()));
        }

        (_, KeyCode::Char('x')) => app.launch_run(),
        (_, KeyCode::Char('L')) => app.show_log = !app.show_log,

        (_, KeyCode::Char('/')) => {
            app.mode = Mode::Search;
            app.search_input.clear();
        }
        (_, KeyCode::Char('n')) => app.jump_to_match(true),
        (_, KeyCode::Char('N')) => app.jump_to_match(false),
        (_, KeyCode::Esc) => app.last_search = None,

        _ => {}
    }
}

fn move_cursor(app: &mut App, delta: isize) {
    let len = app.rows().len();
    if len == 0 {
        return;
    }
    let state = app.view_state();
    let next = state.cursor as isize + delta;
    state.cursor = next.clamp(0, len as isize - 1) as usize;
}

/// Space: flip a toggle, fold a group, or start editing anything else
fn activate(app: &mut App) {
    let Some(row) = app.selected_row() else {
        return;
    };
    match row.control {
        Control::Group { .. } => app.toggle_collapse(),
        _ => begin_edit(app),
    }
}

fn collapse_or_parent(app: &mut App) {
    let Some(row) = app.selected_row() else {
        return;
    };
    if let Control::Group {
        collapsed: false, ..
    } = row.control
    {
        app.toggle_collapse();
        return;
    }
    if let Some(parent) = row.path.parent()
        && !parent.is_empty()
    {
        app.select_path(&parent);
    }
}

fn expand(app: &mut App) {
    if let Some(row) = app.selected_row()
        && let Control::Group {
            collapsed: true, ..
        } = row.control
    {
        app.toggle_collapse();
    }
}

fn open_prompt(app: &mut App, kind: PromptKind) {
    let workflow = app.current_workflow();
    let buffer = app
        .current_state()
        .and_then(|s| s.last_file.as_ref())
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| match kind {
            PromptKind::Load => String::new(),
            PromptKind::SaveAs => workflow.config_filename().to_string(),
        });
    app.prompt = Some(PromptState { kind, buffer });
    app.mode = Mode::Prompt;
}
