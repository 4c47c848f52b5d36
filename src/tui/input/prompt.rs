use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};

use crate::tui::app::{App, Mode, PromptKind};

/// File path prompt for load and save-as
pub(super) fn handle_prompt(app: &mut App, key: KeyEvent) {
    let Some(prompt) = &mut app.prompt else {
        app.mode = Mode::Navigate;
        return;
    };
    match key.code {
        KeyCode::Esc => close(app),
        KeyCode::Enter => {
            let kind = prompt.kind;
            let text = prompt.buffer.trim().to_string();
            close(app);
            if text.is_empty() {
                return;
            }
            let path = expand_home(&text);
            match kind {
                PromptKind::Load => app.load_from(path),
                PromptKind::SaveAs => app.save_to(path),
            }
        }
        KeyCode::Backspace => {
            prompt.buffer.pop();
        }
        KeyCode::Char(c) => prompt.buffer.push(c),
        _ => {}
    }
}

fn close(app: &mut App) {
    app.prompt = None;
    app.mode = Mode::Navigate;
}

/// Expand a leading `~/` to the home directory
fn expand_home(text: &str) -> PathBuf {
    if let Some(rest) = text.strip_prefix("~/")
        && let Some(home) = std::env::var_os("HOME")
    {
        return PathBuf::from(home).join(rest);
    }
    PathBuf::from(text)
}
