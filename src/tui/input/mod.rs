mod edit;
mod navigate;
mod prompt;
mod search;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::app::{App, Mode};

use edit::*;
use navigate::*;
use prompt::*;
use search::*;

/// Handle a key event in the current mode
pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Ignore bare modifier key presses (Shift, Ctrl, Alt, etc.)
    if matches!(key.code, KeyCode::Modifier(_)) {
        return;
    }

    // Ctrl+C always quits
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return;
    }

    let key = normalize_key(key);
    match app.mode {
        Mode::Navigate => handle_navigate(app, key),
        Mode::Edit => handle_edit(app, key),
        Mode::Search => handle_search(app, key),
        Mode::Prompt => handle_prompt(app, key),
    }
}

/// Handle a bracketed paste event. Only text inputs take pasted text.
pub fn handle_paste(app: &mut App, text: &str) {
    if text.is_empty() {
        return;
    }
    match app.mode {
        Mode::Edit => {
            if let Some(input) = &mut app.input {
                input.insert_str(text);
            }
        }
        Mode::Prompt => {
            if let Some(prompt) = &mut app.prompt {
                prompt.buffer.push_str(text.trim_end_matches(['\n', '\r']));
            }
        }
        Mode::Search => app.search_input.push_str(text.trim_end_matches(['\n', '\r'])),
        Mode::Navigate => {}
    }
}

/// Shift+letter arrives as lowercase with SHIFT on some terminals
fn normalize_key(mut key: KeyEvent) -> KeyEvent {
    if let KeyCode::Char(c) = key.code
        && key.modifiers.contains(KeyModifiers::SHIFT)
        && c.is_ascii_lowercase()
    {
        key.code = KeyCode::Char(c.to_ascii_uppercase());
    }
    key
}
