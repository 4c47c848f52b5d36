use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode};

pub(super) fn handle_search(app: &mut App, key: KeyEvent) {
    match key.code {
        // Cancel search
        KeyCode::Esc => {
            app.mode = Mode::Navigate;
            app.search_input.clear();
        }

        // Execute search
        KeyCode::Enter => {
            app.mode = Mode::Navigate;
            if !app.search_input.is_empty() {
                app.last_search = Some(std::mem::take(&mut app.search_input));
                app.jump_to_match(true);
            }
        }

        KeyCode::Backspace => {
            if app.search_input.pop().is_none() {
                app.mode = Mode::Navigate;
            }
        }

        KeyCode::Char(c) => app.search_input.push(c),

        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use crossterm::event::KeyCode;

    use super::super::test_keys::*;
    use crate::model::config::{ConfigSchema, Settings, Workflow};
    use crate::model::value::JsonValue;
    use crate::model::workspace::{ConfigState, Workspace};
    use crate::tui::app::{App, Mode};
    use crate::tui::input::handle_key;
    use serde_json::json;

    fn app() -> App {
        let mut ws = Workspace::new();
        ws.insert(
            Workflow::BuildSpecLib,
            ConfigState::from_schema(ConfigSchema {
                default_config: JsonValue::from(json!({
                    "fasta_digest_params": {"min_length": 7, "max_length": 30},
                    "library_params": {"rt_bin_tol": 1.0}
                })),
                simplified_config: JsonValue::empty_object(),
                persisted_config: None,
                persisted_path: None,
            }),
        );
        App::new(ws, Settings::default())
    }

    #[test]
    fn enter_runs_search_and_jumps() {
        let mut app = app();
        handle_key(&mut app, ch('/'));
        assert_eq!(app.mode, Mode::Search);
        type_str(&mut app, "MAX");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.mode, Mode::Navigate);
        assert_eq!(app.last_search.as_deref(), Some("MAX"));
        assert_eq!(
            app.selected_row().unwrap().path.dotted(),
            "fasta_digest_params.max_length"
        );
    }

    #[test]
    fn invalid_regex_falls_back_to_literal() {
        let mut app = app();
        handle_key(&mut app, ch('/'));
        type_str(&mut app, "rt_bin(");
        handle_key(&mut app, key(KeyCode::Enter));
        // no literal "rt_bin(" anywhere, so the cursor stays put
        assert_eq!(app.cursor(), 0);
        handle_key(&mut app, ch('/'));
        type_str(&mut app, "tol");
        handle_key(&mut app, key(KeyCode::Enter));
        assert_eq!(app.selected_row().unwrap().path.dotted(), "library_params.rt_bin_tol");
    }

    #[test]
    fn escape_keeps_previous_search() {
        let mut app = app();
        app.last_search = Some("min".into());
        handle_key(&mut app, ch('/'));
        type_str(&mut app, "max");
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.last_search.as_deref(), Some("min"));
        assert!(app.search_input.is_empty());
    }

    #[test]
    fn backspace_on_empty_leaves_search() {
        let mut app = app();
        handle_key(&mut app, ch('/'));
        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.mode, Mode::Navigate);
    }
}
