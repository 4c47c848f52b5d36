use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::model::config::{Settings, Workflow};
use crate::model::value::JsonValue;

/// Error type for parameter and settings file I/O
#[derive(Debug, thiserror::Error)]
pub enum ConfigIoError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{path} is not valid JSON: {source}")]
    JsonParseError {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("could not serialize parameters: {0}")]
    JsonSerializeError(#[from] serde_json::Error),
}

/// Directory for settings and persisted parameters, respecting XDG_CONFIG_HOME
pub fn config_dir() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".config"))
        .join("pconf")
}

/// Directory for logs, respecting XDG_STATE_HOME
pub fn state_dir() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| dirs_home().join(".local").join("state"))
        .join("pconf")
}

fn dirs_home() -> PathBuf {
    std::env::var("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("/"))
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.toml")
}

/// Where a workflow's last-run parameters are kept
pub fn persisted_path(workflow: Workflow) -> PathBuf {
    config_dir().join(workflow.persisted_filename())
}

/// Read settings from a specific path. A missing file gives defaults; a
/// corrupt one is reported and also gives defaults.
pub fn read_settings_from(path: &Path) -> Settings {
    let content = match fs::read_to_string(path) {
        Ok(c) => c,
        Err(_) => return Settings::default(),
    };
    match toml::from_str::<Settings>(&content) {
        Ok(settings) => settings,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "ignoring unreadable settings");
            Settings::default()
        }
    }
}

pub fn read_settings() -> Settings {
    read_settings_from(&settings_path())
}

/// Read and parse a JSON parameter file
pub fn read_json_file(path: &Path) -> Result<JsonValue, ConfigIoError> {
    let text = fs::read_to_string(path).map_err(|e| ConfigIoError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })?;
    let value = serde_json::from_str(&text).map_err(|e| ConfigIoError::JsonParseError {
        path: path.to_path_buf(),
        source: e,
    })?;
    debug!(path = %path.display(), "read parameters");
    Ok(value)
}

/// Write parameters as pretty JSON, creating parent directories as needed
pub fn write_json_file(path: &Path, value: &JsonValue) -> Result<(), ConfigIoError> {
    let write_err = |e| ConfigIoError::WriteError {
        path: path.to_path_buf(),
        source: e,
    };
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_err)?;
    }
    let pretty = serde_json::to_string_pretty(value)?;
    fs::write(path, pretty).map_err(write_err)?;
    debug!(path = %path.display(), "wrote parameters");
    Ok(())
}

/// Parameters saved by a previous run. Missing or unreadable files are
/// treated as "nothing persisted".
pub fn load_persisted(path: &Path) -> Option<JsonValue> {
    if !path.exists() {
        return None;
    }
    match read_json_file(path) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(error = %e, "ignoring persisted parameters");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn json_write_and_read_round_trip() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested").join("params.json");
        let value = JsonValue::from(json!({"b": [1, 2], "a": {"x": "y"}}));
        write_json_file(&path, &value).unwrap();
        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("{\n  \"b\": ["));
        assert_eq!(read_json_file(&path).unwrap(), value);
    }

    #[test]
    fn read_missing_file_is_read_error() {
        let tmp = TempDir::new().unwrap();
        let err = read_json_file(&tmp.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ConfigIoError::ReadError { .. }));
    }

    #[test]
    fn read_malformed_json_is_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let err = read_json_file(&path).unwrap_err();
        assert!(matches!(err, ConfigIoError::JsonParseError { .. }));
        assert!(err.to_string().contains("is not valid JSON"));
    }

    #[test]
    fn load_persisted_tolerates_missing_and_corrupt() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("searchdia.json");
        assert!(load_persisted(&path).is_none());
        fs::write(&path, "[[[").unwrap();
        assert!(load_persisted(&path).is_none());
        fs::write(&path, r#"{"k": 1}"#).unwrap();
        assert_eq!(load_persisted(&path), Some(JsonValue::from(json!({"k": 1}))));
    }

    #[test]
    fn settings_missing_or_corrupt_give_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        assert_eq!(read_settings_from(&path).log.level, "info");
        fs::write(&path, "not valid toml [[[").unwrap();
        assert_eq!(read_settings_from(&path).log.level, "info");
        fs::write(&path, "[log]\nlevel = \"warn\"\n").unwrap();
        assert_eq!(read_settings_from(&path).log.level, "warn");
    }
}
