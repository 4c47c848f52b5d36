use ratatui::Terminal;
use ratatui::backend::TestBackend;
use ratatui::layout::Rect;
use serde_json::json;

pub use crate::model::value::JsonValue;

use crate::model::config::{ConfigSchema, Settings, Workflow};
use crate::model::path::JsonPath;
use crate::model::workspace::{ConfigState, EditEvent, Message, Workspace};
use crate::tui::app::App;

pub const TERM_W: u16 = 80;
pub const TERM_H: u16 = 24;

/// Render into an in-memory buffer and return plain text (no styles).
pub fn render_to_string<F>(w: u16, h: u16, f: F) -> String
where
    F: FnOnce(&mut ratatui::Frame, Rect),
{
    let backend = TestBackend::new(w, h);
    let mut terminal = Terminal::new(backend).unwrap();
    terminal
        .draw(|frame| {
            let area = frame.area();
            f(frame, area);
        })
        .unwrap();

    let buf = terminal.backend().buffer().clone();
    let w = buf.area.width as usize;
    let lines: Vec<String> = buf
        .content
        .chunks(w)
        .map(|row| {
            let s: String = row.iter().map(|cell| cell.symbol()).collect();
            s.trim_end().to_string()
        })
        .collect();

    // Trim trailing blank lines
    let end = lines
        .iter()
        .rposition(|l| !l.is_empty())
        .map_or(0, |i| i + 1);
    lines[..end].join("\n")
}

fn schema(defaults: serde_json::Value, simplified: serde_json::Value) -> ConfigSchema {
    ConfigSchema {
        default_config: JsonValue::from(defaults),
        simplified_config: JsonValue::from(simplified),
        persisted_config: None,
        persisted_path: None,
    }
}

/// An App with a single workflow whose defaults are `defaults`
pub fn app_with(defaults: serde_json::Value, simplified: serde_json::Value) -> App {
    let mut ws = Workspace::new();
    ws.insert(
        Workflow::SearchDia,
        ConfigState::from_schema(schema(defaults, simplified)),
    );
    App::new(ws, Settings::default())
}

/// Both workflows with small parameter sets
pub fn two_tab_app() -> App {
    let mut ws = Workspace::new();
    ws.insert(
        Workflow::BuildSpecLib,
        ConfigState::from_schema(schema(
            json!({"threads": 4, "fasta_paths": ["a.fasta"]}),
            json!({"fasta_paths": []}),
        )),
    );
    ws.insert(
        Workflow::SearchDia,
        ConfigState::from_schema(schema(json!({"global": {"q": 0.01}}), json!({}))),
    );
    App::new(ws, Settings::default())
}

/// Apply an edit to a top-level key of the active workflow
pub fn edit_current(app: &mut App, key: &str, value: JsonValue) {
    let workflow = app.current_workflow();
    app.dispatch(Message::Edit {
        workflow,
        event: EditEvent {
            path: JsonPath::root().key(key),
            value,
        },
    });
}

/// Parameters shaped like a small SearchDIA config
pub fn search_params() -> serde_json::Value {
    json!({
        "global": {
            "isotope_settings": {"err_bounds": [1, 0], "combine_traces": true},
            "scoring": {"q_value_threshold": 0.01}
        },
        "output": {"write_csv": true, "note": null},
        "paths": {"library": "lib.poin", "ms_data": "", "results": "out"},
        "fragments": [{"name": "y", "charge": 1}]
    })
}

/// Simplified schema marking the paths and the q-value threshold
pub fn search_simplified() -> serde_json::Value {
    json!({
        "global": {"scoring": {"q_value_threshold": 0.0}},
        "paths": {"library": "", "ms_data": "", "results": ""}
    })
}
