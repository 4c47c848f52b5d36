use std::collections::BTreeMap;
use std::path::PathBuf;

use tracing::debug;

use crate::ops::{ImportantPaths, deep_merge, delete_at, get, set};

use super::config::{ConfigSchema, Workflow};
use super::path::JsonPath;
use super::value::JsonValue;

/// A committed edit from the tree editor: replace the node at `path`
#[derive(Debug, Clone, PartialEq)]
pub struct EditEvent {
    pub path: JsonPath,
    pub value: JsonValue,
}

/// Parameter state for one workflow tab.
///
/// `current` is only ever replaced, never mutated in place; every change goes
/// through the copy-on-write path operations, so a renderer holding the
/// previous tree can compare subtrees by storage.
#[derive(Debug, Clone)]
pub struct ConfigState {
    pub defaults: JsonValue,
    pub current: JsonValue,
    pub important: ImportantPaths,
    /// File last loaded from or saved to
    pub last_file: Option<PathBuf>,
    /// Where the parameters are persisted on each run
    pub persisted_path: Option<PathBuf>,
    /// Edited since the last load or save
    pub dirty: bool,
}

impl ConfigState {
    pub fn from_schema(schema: ConfigSchema) -> Self {
        let important = ImportantPaths::from_simplified(&schema.simplified_config);
        let current = match &schema.persisted_config {
            Some(persisted) => deep_merge(&schema.default_config, persisted),
            None => schema.default_config.clone(),
        };
        ConfigState {
            defaults: schema.default_config,
            current,
            important,
            last_file: None,
            persisted_path: schema.persisted_path,
            dirty: false,
        }
    }

    pub fn apply_edit(&mut self, event: &EditEvent) {
        self.current = set(&self.current, &event.path, event.value.clone());
        self.dirty = true;
    }

    /// Merge a loaded file onto the defaults. Fields missing from the file keep
    /// their default values; the file never replaces `current` wholesale.
    pub fn load_overlay(&mut self, overlay: &JsonValue, source: Option<PathBuf>) {
        self.current = deep_merge(&self.defaults, overlay);
        if source.is_some() {
            self.last_file = source;
        }
        self.dirty = false;
    }

    pub fn reset(&mut self) {
        self.current = self.defaults.clone();
        self.dirty = true;
    }

    /// Restore one node to its default, or drop it if the defaults lack it
    pub fn reset_field(&mut self, path: &JsonPath) {
        self.current = match get(&self.defaults, path) {
            Some(default) => set(&self.current, path, default.clone()),
            None => delete_at(&self.current, path),
        };
        self.dirty = true;
    }

    /// True when the node at `path` differs from its default
    pub fn is_modified(&self, path: &JsonPath) -> bool {
        get(&self.current, path) != get(&self.defaults, path)
    }
}

/// Requests applied to the workspace, in the order they were emitted
#[derive(Debug, Clone)]
pub enum Message {
    Edit {
        workflow: Workflow,
        event: EditEvent,
    },
    LoadOverlay {
        workflow: Workflow,
        value: JsonValue,
        source: Option<PathBuf>,
    },
    Reset {
        workflow: Workflow,
    },
    ResetField {
        workflow: Workflow,
        path: JsonPath,
    },
    Saved {
        workflow: Workflow,
        path: PathBuf,
    },
}

impl Message {
    pub fn workflow(&self) -> Workflow {
        match self {
            Message::Edit { workflow, .. }
            | Message::LoadOverlay { workflow, .. }
            | Message::Reset { workflow }
            | Message::ResetField { workflow, .. }
            | Message::Saved { workflow, .. } => *workflow,
        }
    }
}

/// One [`ConfigState`] per workflow, owned by the top-level controller
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    states: BTreeMap<Workflow, ConfigState>,
}

impl Workspace {
    pub fn new() -> Self {
        Workspace::default()
    }

    pub fn insert(&mut self, workflow: Workflow, state: ConfigState) {
        self.states.insert(workflow, state);
    }

    pub fn get(&self, workflow: Workflow) -> Option<&ConfigState> {
        self.states.get(&workflow)
    }

    pub fn workflows(&self) -> impl Iterator<Item = Workflow> + '_ {
        self.states.keys().copied()
    }

    /// Apply a message. Returns false when the workflow has no state.
    pub fn update(&mut self, message: Message) -> bool {
        let Some(state) = self.states.get_mut(&message.workflow()) else {
            return false;
        };
        match message {
            Message::Edit { workflow, event } => {
                debug!(%workflow, path = %event.path, value = %event.value, "edit");
                state.apply_edit(&event);
            }
            Message::LoadOverlay { value, source, .. } => {
                state.load_overlay(&value, source);
            }
            Message::Reset { .. } => state.reset(),
            Message::ResetField { path, .. } => state.reset_field(&path),
            Message::Saved { path, .. } => {
                state.last_file = Some(path);
                state.dirty = false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ConfigSchema {
        ConfigSchema {
            default_config: JsonValue::from(json!({
                "global": {"q_value": 0.01, "mbr": true},
                "paths": {"library": "", "results": ""},
                "tol": [1, 0]
            })),
            simplified_config: JsonValue::from(json!({"paths": {"library": ""}})),
            persisted_config: None,
            persisted_path: None,
        }
    }

    fn workspace() -> Workspace {
        let mut ws = Workspace::new();
        ws.insert(Workflow::SearchDia, ConfigState::from_schema(schema()));
        ws
    }

    #[test]
    fn from_schema_merges_persisted_onto_defaults() {
        let mut s = schema();
        s.persisted_config = Some(JsonValue::from(json!({"global": {"mbr": false}, "extra": 1})));
        let state = ConfigState::from_schema(s);
        assert_eq!(
            state.current,
            JsonValue::from(json!({
                "global": {"q_value": 0.01, "mbr": false},
                "paths": {"library": "", "results": ""},
                "tol": [1, 0],
                "extra": 1
            }))
        );
        assert!(state.important.contains_dotted("paths.library"));
        assert!(state.important.contains_dotted("paths"));
        assert!(!state.dirty);
    }

    #[test]
    fn edit_then_reset_field() {
        let mut ws = workspace();
        let path = JsonPath::root().key("global").key("q_value");
        ws.update(Message::Edit {
            workflow: Workflow::SearchDia,
            event: EditEvent {
                path: path.clone(),
                value: JsonValue::from(0.05),
            },
        });
        let state = ws.get(Workflow::SearchDia).unwrap();
        assert_eq!(get(&state.current, &path), Some(&JsonValue::from(0.05)));
        assert!(state.is_modified(&path));
        assert!(state.dirty);

        ws.update(Message::ResetField {
            workflow: Workflow::SearchDia,
            path: path.clone(),
        });
        let state = ws.get(Workflow::SearchDia).unwrap();
        assert_eq!(get(&state.current, &path), Some(&JsonValue::from(0.01)));
        assert!(!state.is_modified(&path));
    }

    #[test]
    fn reset_field_without_default_removes_it() {
        let mut ws = workspace();
        let path = JsonPath::root().key("global").key("custom");
        ws.update(Message::Edit {
            workflow: Workflow::SearchDia,
            event: EditEvent {
                path: path.clone(),
                value: JsonValue::from("x"),
            },
        });
        ws.update(Message::ResetField {
            workflow: Workflow::SearchDia,
            path: path.clone(),
        });
        let state = ws.get(Workflow::SearchDia).unwrap();
        assert_eq!(state.current, state.defaults);
    }

    #[test]
    fn load_overlay_keeps_missing_keys() {
        let mut ws = workspace();
        ws.update(Message::LoadOverlay {
            workflow: Workflow::SearchDia,
            value: JsonValue::from(json!({"paths": {"library": "/data/lib.poin"}, "tol": [3]})),
            source: Some(PathBuf::from("/tmp/params.json")),
        });
        let state = ws.get(Workflow::SearchDia).unwrap();
        assert_eq!(
            state.current,
            JsonValue::from(json!({
                "global": {"q_value": 0.01, "mbr": true},
                "paths": {"library": "/data/lib.poin", "results": ""},
                "tol": [3]
            }))
        );
        assert_eq!(state.last_file, Some(PathBuf::from("/tmp/params.json")));
        assert!(!state.dirty);
    }

    #[test]
    fn load_overlay_ignores_previous_edits() {
        let mut ws = workspace();
        ws.update(Message::Edit {
            workflow: Workflow::SearchDia,
            event: EditEvent {
                path: JsonPath::root().key("global").key("mbr"),
                value: JsonValue::Bool(false),
            },
        });
        ws.update(Message::LoadOverlay {
            workflow: Workflow::SearchDia,
            value: JsonValue::empty_object(),
            source: None,
        });
        let state = ws.get(Workflow::SearchDia).unwrap();
        assert_eq!(state.current, state.defaults);
    }

    #[test]
    fn edits_apply_in_emission_order() {
        let mut ws = workspace();
        let parent = JsonPath::root().key("global");
        let child = parent.clone().key("q_value");
        ws.update(Message::Edit {
            workflow: Workflow::SearchDia,
            event: EditEvent {
                path: child.clone(),
                value: JsonValue::from(0.2),
            },
        });
        ws.update(Message::Edit {
            workflow: Workflow::SearchDia,
            event: EditEvent {
                path: parent.clone(),
                value: JsonValue::from(json!({"q_value": 0.3})),
            },
        });
        let state = ws.get(Workflow::SearchDia).unwrap();
        assert_eq!(get(&state.current, &child), Some(&JsonValue::from(0.3)));
        assert_eq!(get(&state.current, &parent.key("mbr")), None);
    }

    #[test]
    fn unknown_workflow_is_ignored() {
        let mut ws = workspace();
        let applied = ws.update(Message::Reset {
            workflow: Workflow::BuildSpecLib,
        });
        assert!(!applied);
    }

    #[test]
    fn saved_records_file_and_clears_dirty() {
        let mut ws = workspace();
        ws.update(Message::Reset {
            workflow: Workflow::SearchDia,
        });
        assert!(ws.get(Workflow::SearchDia).unwrap().dirty);
        ws.update(Message::Saved {
            workflow: Workflow::SearchDia,
            path: PathBuf::from("/tmp/out.json"),
        });
        let state = ws.get(Workflow::SearchDia).unwrap();
        assert!(!state.dirty);
        assert_eq!(state.last_file, Some(PathBuf::from("/tmp/out.json")));
    }
}
