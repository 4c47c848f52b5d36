use serde::Serialize;

use crate::io::runner::RunEvent;
use crate::io::schema::ConfigSource;
use crate::model::config::Workflow;
use crate::model::value::JsonValue;

// ---------------------------------------------------------------------------
// JSON output structs
// ---------------------------------------------------------------------------

#[derive(Serialize)]
pub struct DefaultsJson<'a> {
    pub workflow: Workflow,
    pub source: ConfigSource,
    pub simplified: bool,
    pub config: &'a JsonValue,
}

#[derive(Serialize)]
pub struct LeafJson<'a> {
    pub path: String,
    pub value: &'a JsonValue,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub important: bool,
}

#[derive(Serialize)]
pub struct ValueJson<'a> {
    pub path: String,
    #[serde(rename = "type")]
    pub type_name: &'static str,
    pub value: &'a JsonValue,
}

#[derive(Serialize)]
pub struct WriteJson<'a> {
    pub file: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<&'a JsonValue>,
    /// False when the file already held this value
    pub changed: bool,
}

/// One line of `run --json` output
#[derive(Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum RunEventJson<'a> {
    #[serde(rename_all = "camelCase")]
    Started {
        workflow: Workflow,
        log_path: String,
        config_path: String,
    },
    Log {
        stream: &'static str,
        line: &'a str,
    },
    #[serde(rename_all = "camelCase")]
    Progress {
        stage: &'static str,
        label: &'static str,
        progress: f32,
    },
    #[serde(rename_all = "camelCase")]
    Complete {
        success: bool,
        exit_code: Option<i32>,
        #[serde(skip_serializing_if = "Option::is_none")]
        message: Option<&'a str>,
    },
}

impl<'a> From<&'a RunEvent> for RunEventJson<'a> {
    fn from(event: &'a RunEvent) -> Self {
        match event {
            RunEvent::Started {
                workflow,
                log_path,
                config_path,
                ..
            } => RunEventJson::Started {
                workflow: *workflow,
                log_path: log_path.display().to_string(),
                config_path: config_path.display().to_string(),
            },
            RunEvent::Log { stream, line, .. } => RunEventJson::Log {
                stream: stream.as_str(),
                line,
            },
            RunEvent::Progress {
                stage_key,
                stage_label,
                progress,
                ..
            } => RunEventJson::Progress {
                stage: *stage_key,
                label: *stage_label,
                progress: *progress,
            },
            RunEvent::Complete {
                success,
                exit_code,
                message,
                ..
            } => RunEventJson::Complete {
                success: *success,
                exit_code: *exit_code,
                message: message.as_deref(),
            },
        }
    }
}

// ---------------------------------------------------------------------------
// Text formatting
// ---------------------------------------------------------------------------

/// Plain-text line for a run event
pub fn format_run_event(event: &RunEvent) -> String {
    match event {
        RunEvent::Started { log_path, .. } => {
            format!("==> started, log at {}", log_path.display())
        }
        RunEvent::Log { line, .. } => line.clone(),
        RunEvent::Progress {
            stage_label,
            progress,
            ..
        } => format!("==> {} ({:.0}%)", stage_label, progress),
        RunEvent::Complete { success: true, .. } => "==> finished".to_string(),
        RunEvent::Complete { message, .. } => format!(
            "==> failed: {}",
            message.as_deref().unwrap_or("unknown error")
        ),
    }
}

/// Scalars print bare (strings without quotes); containers as pretty JSON
pub fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(_) | JsonValue::Object(_) => value.to_pretty_string(),
        other => other.to_string(),
    }
}
