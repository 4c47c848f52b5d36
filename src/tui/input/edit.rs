use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::model::workspace::Message;
use crate::tui::app::{App, Mode};
use crate::tui::editor::{Commit, Control, InputSession, toggle_event};

/// Start editing the row under the cursor. Toggles flip immediately; groups
/// fold; null placeholders stay read-only.
pub(super) fn begin_edit(app: &mut App) {
    let Some(row) = app.selected_row() else {
        return;
    };
    match row.control {
        Control::Toggle(_) => {
            if let Some(event) = toggle_event(&row) {
                let workflow = app.current_workflow();
                app.dispatch(Message::Edit { workflow, event });
            }
        }
        Control::Group { .. } => app.toggle_collapse(),
        Control::Placeholder => app.set_error(format!("{} is null and cannot be edited", row.path)),
        _ => {
            if let Some(session) = InputSession::begin(&row) {
                app.input = Some(session);
                app.mode = Mode::Edit;
            }
        }
    }
}

pub(super) fn handle_edit(app: &mut App, key: KeyEvent) {
    let Some(input) = &mut app.input else {
        app.mode = Mode::Navigate;
        return;
    };

    match (key.modifiers, key.code) {
        (_, KeyCode::Esc) => {
            input.revert();
            finish(app);
        }
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => commit(app),
        (m, KeyCode::Enter) if input.is_multiline() && !m.contains(KeyModifiers::ALT) => {
            input.insert_char('\n');
        }
        (_, KeyCode::Enter) => commit(app),
        (_, KeyCode::Backspace) => input.backspace(),
        (_, KeyCode::Delete) => input.delete(),
        (_, KeyCode::Left) => input.move_left(),
        (_, KeyCode::Right) => input.move_right(),
        (_, KeyCode::Home) => input.home(),
        (_, KeyCode::End) => input.end(),
        (m, KeyCode::Char(c)) if !m.contains(KeyModifiers::CONTROL) => input.insert_char(c),
        _ => {}
    }
}

/// Emit the edit, or revert when the text does not parse. Untouched text
/// just leaves Edit mode.
fn commit(app: &mut App) {
    let Some(input) = app.input.take() else {
        return;
    };
    match input.commit() {
        Commit::Emit(event) => {
            let workflow = app.current_workflow();
            let path = event.path.clone();
            app.dispatch(Message::Edit { workflow, event });
            app.select_path(&path);
        }
        Commit::Revert => {
            app.set_error(format!(
                "`{}` is not a number; kept {}",
                input.buffer,
                input.committed_text()
            ));
        }
        Commit::Unchanged => {}
    }
    app.mode = Mode::Navigate;
}

fn finish(app: &mut App) {
    app.input = None;
    app.mode = Mode::Navigate;
}

#[cfg(test)]
mod tests {
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use pretty_assertions::assert_eq;

    use super::super::test_keys::*;
    use crate::model::config::{ConfigSchema, Settings, Workflow};
    use crate::model::value::JsonValue;
    use crate::model::workspace::{ConfigState, Workspace};
    use crate::tui::app::{App, Mode};
    use crate::tui::input::{handle_key, handle_paste};
    use serde_json::json;

    fn app() -> App {
        let mut ws = Workspace::new();
        ws.insert(
            Workflow::SearchDia,
            ConfigState::from_schema(ConfigSchema {
                default_config: JsonValue::from(json!({
                    "q_value": 0.01,
                    "name": "run",
                    "charges": [2, 3],
                    "note": null
                })),
                simplified_config: JsonValue::empty_object(),
                persisted_config: None,
                persisted_path: None,
            }),
        );
        App::new(ws, Settings::default())
    }

    fn current(app: &App, key: &str) -> JsonValue {
        app.current_state()
            .and_then(|s| s.current.get_key(key).cloned())
            .unwrap()
    }

    #[test]
    fn number_edit_commits_on_enter() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Edit);
        for _ in 0..4 {
            handle_key(&mut app, key(KeyCode::Backspace));
        }
        type_str(&mut app, "0.05");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(current(&app, "q_value"), JsonValue::from(0.05));
    }

    #[test]
    fn bad_number_reverts_without_emitting() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Enter));
        type_str(&mut app, "x");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(current(&app, "q_value"), JsonValue::from(0.01));
        assert!(!app.current_state().unwrap().dirty);
        assert!(app.status.as_ref().is_some_and(|s| s.is_error));
    }

    #[test]
    fn enter_without_changes_keeps_tab_clean() {
        let mut app = app();
        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.input.is_none());
        assert!(!app.current_state().unwrap().dirty);
        assert!(app.status.is_none());
    }

    #[test]
    fn escape_discards_text() {
        let mut app = app();
        handle_key(&mut app, ch('j'));
        handle_key(&mut app, ch('e'));
        type_str(&mut app, "zzz");
        handle_key(&mut app, key(KeyCode::Esc));
        assert!(app.input.is_none());
        assert_eq!(current(&app, "name"), JsonValue::from("run"));
    }

    #[test]
    fn list_edit_takes_newlines_until_ctrl_s() {
        let mut app = app();
        handle_key(&mut app, ch('G'));
        handle_key(&mut app, ch('k'));
        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, key(KeyCode::Enter));
        handle_key(&mut app, key(KeyCode::Enter));
        type_str(&mut app, "4");
        assert_eq!(app.mode, Mode::Edit);
        handle_key(&mut app, ctrl('s'));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(current(&app, "charges"), JsonValue::from(json!([2, 3, 4])));
    }

    #[test]
    fn alt_enter_commits_list() {
        let mut app = app();
        handle_key(&mut app, ch('G'));
        handle_key(&mut app, ch('k'));
        handle_key(&mut app, key(KeyCode::Enter));
        handle_paste(&mut app, "\ntrue");
        handle_key(&mut app, KeyEvent::new(KeyCode::Enter, KeyModifiers::ALT));
        assert_eq!(current(&app, "charges"), JsonValue::from(json!([2, 3, true])));
    }

    #[test]
    fn null_is_read_only() {
        let mut app = app();
        handle_key(&mut app, ch('G'));
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert!(app.status.as_ref().is_some_and(|s| s.is_error));
    }
}
