use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Serialize;
use tracing::{info, warn};

use crate::model::config::{ConfigSchema, Settings, Workflow};
use crate::model::value::JsonValue;

use super::config_io::{load_persisted, persisted_path};

static FALLBACK_BUILD: &str = include_str!("../fallback/default_build.json");
static FALLBACK_BUILD_SIMPLIFIED: &str = include_str!("../fallback/default_build_simplified.json");
static FALLBACK_SEARCH: &str = include_str!("../fallback/default_search.json");
static FALLBACK_SEARCH_SIMPLIFIED: &str =
    include_str!("../fallback/default_search_simplified.json");

const ENV_VARS: &[&str] = &["PIONEER_BINARY", "PIONEER_PATH", "PIONEER_EXE", "PIONEER"];
const BINARY_NAMES: &[&str] = &["pioneer", "Pioneer", "pioneer.exe", "Pioneer.exe"];

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error(
        "Pioneer binary not found. Set `PIONEER_BINARY`/`PIONEER_PATH`, set `pioneer.binary` in settings.toml, or add the executable to PATH (tried `pioneer`, `Pioneer`, `pioneer.exe`, `Pioneer.exe`)."
    )]
    MissingBinary,
    #[error("failed to execute Pioneer: {0}")]
    Execution(#[from] std::io::Error),
    #[error("Pioneer exited with status {0:?}")]
    NonZeroExit(Option<i32>),
    #[error("failed to parse JSON output: {0}")]
    Json(#[from] serde_json::Error),
}

/// Where the default parameters came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfigSource {
    /// Both workflows reported by the Pioneer binary
    Binary,
    /// One workflow from the binary, the other from bundled defaults
    Partial,
    /// Bundled defaults only
    Fallback,
}

/// Schemas for both workflows plus how they were obtained
#[derive(Debug, Clone)]
pub struct LoadedSchemas {
    pub build: ConfigSchema,
    pub search: ConfigSchema,
    pub source: ConfigSource,
    /// Collected discovery failures, one per line
    pub binary_error: Option<String>,
}

impl LoadedSchemas {
    pub fn for_workflow(&self, workflow: Workflow) -> &ConfigSchema {
        match workflow {
            Workflow::BuildSpecLib => &self.build,
            Workflow::SearchDia => &self.search,
        }
    }
}

/// Bundled default parameters for a workflow
pub fn fallback_defaults(workflow: Workflow) -> Result<JsonValue, SchemaError> {
    let text = match workflow {
        Workflow::BuildSpecLib => FALLBACK_BUILD,
        Workflow::SearchDia => FALLBACK_SEARCH,
    };
    Ok(serde_json::from_str(text)?)
}

/// Curated subset of a workflow's parameters, used for highlighting
pub fn simplified_defaults(workflow: Workflow) -> Result<JsonValue, SchemaError> {
    let text = match workflow {
        Workflow::BuildSpecLib => FALLBACK_BUILD_SIMPLIFIED,
        Workflow::SearchDia => FALLBACK_SEARCH_SIMPLIFIED,
    };
    Ok(serde_json::from_str(text)?)
}

/// Discover both schemas by asking Pioneer, falling back to the bundled
/// defaults per workflow, and attach any persisted parameters.
pub fn load_schemas(settings: &Settings) -> Result<LoadedSchemas, SchemaError> {
    let binary = locate_pioneer_binary(settings);
    let fetch = |workflow: Workflow| match &binary {
        Ok(path) => fetch_defaults(path, workflow),
        Err(_) => Err(SchemaError::MissingBinary),
    };
    load_schemas_with(fetch, persisted_path)
}

/// Schema assembly with the discovery and persisted-file lookup supplied by
/// the caller.
pub fn load_schemas_with<F, P>(fetch: F, persisted_at: P) -> Result<LoadedSchemas, SchemaError>
where
    F: Fn(Workflow) -> Result<JsonValue, SchemaError>,
    P: Fn(Workflow) -> PathBuf,
{
    let mut errors = Vec::new();
    let mut fetched = 0;

    let mut schema_for = |workflow: Workflow| -> Result<ConfigSchema, SchemaError> {
        let default_config = match fetch(workflow) {
            Ok(value) => {
                fetched += 1;
                value
            }
            Err(e) => {
                warn!(%workflow, error = %e, "using bundled defaults");
                errors.push(format!("{} defaults: {}", workflow.label(), e));
                fallback_defaults(workflow)?
            }
        };
        let path = persisted_at(workflow);
        Ok(ConfigSchema {
            default_config,
            simplified_config: simplified_defaults(workflow)?,
            persisted_config: load_persisted(&path),
            persisted_path: Some(path),
        })
    };

    let build = schema_for(Workflow::BuildSpecLib)?;
    let search = schema_for(Workflow::SearchDia)?;

    let source = match fetched {
        2 => ConfigSource::Binary,
        1 => ConfigSource::Partial,
        _ => ConfigSource::Fallback,
    };
    info!(?source, "loaded parameter schemas");

    Ok(LoadedSchemas {
        build,
        search,
        source,
        binary_error: if errors.is_empty() {
            None
        } else {
            Some(errors.join("\n"))
        },
    })
}

/// Defaults for one workflow: from the binary when it can be found and run,
/// otherwise the bundled copy.
pub fn workflow_defaults(
    settings: &Settings,
    workflow: Workflow,
) -> Result<(JsonValue, ConfigSource), SchemaError> {
    match locate_pioneer_binary(settings).and_then(|path| fetch_defaults(&path, workflow)) {
        Ok(value) => Ok((value, ConfigSource::Binary)),
        Err(e) => {
            warn!(%workflow, error = %e, "using bundled defaults");
            Ok((fallback_defaults(workflow)?, ConfigSource::Fallback))
        }
    }
}

/// Run Pioneer's params subcommand against throwaway inputs and read back the
/// parameter file it writes.
pub fn fetch_defaults(pioneer: &Path, workflow: Workflow) -> Result<JsonValue, SchemaError> {
    let temp_dir = tempfile::tempdir()?;
    let root = temp_dir.path();
    let params_path = root.join(workflow.config_filename());

    let mut command = Command::new(pioneer);
    command.arg(workflow.params_subcommand());
    match workflow {
        Workflow::BuildSpecLib => {
            let lib_out = root.join("library_preview");
            fs::create_dir_all(&lib_out)?;
            let fasta_path = root.join("preview.fasta");
            fs::write(&fasta_path, b">Example\nM\n")?;
            command.arg(&lib_out).arg("PreviewLibrary").arg(&fasta_path);
        }
        Workflow::SearchDia => {
            let library_path = root.join("example_library.poin");
            fs::write(&library_path, b"")?;
            let ms_data_dir = root.join("ms_data");
            fs::create_dir_all(&ms_data_dir)?;
            let results_dir = root.join("results");
            fs::create_dir_all(&results_dir)?;
            command.arg(&library_path).arg(&ms_data_dir).arg(&results_dir);
        }
    }
    let status = command.arg("--params-path").arg(&params_path).status()?;
    if !status.success() {
        return Err(SchemaError::NonZeroExit(status.code()));
    }

    let text = fs::read_to_string(&params_path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Candidate paths from the environment. A variable naming a directory
/// contributes each known executable name inside it.
fn env_candidates() -> Vec<PathBuf> {
    let mut results = Vec::new();
    for key in ENV_VARS {
        let Some(raw) = env::var_os(key) else {
            continue;
        };
        if raw.is_empty() {
            continue;
        }
        let path = PathBuf::from(&raw);
        if path.is_dir() {
            results.extend(BINARY_NAMES.iter().map(|name| path.join(name)));
        } else {
            results.push(path);
        }
    }
    results
}

/// Find the Pioneer executable: settings override, then environment
/// variables, then PATH.
pub fn locate_pioneer_binary(settings: &Settings) -> Result<PathBuf, SchemaError> {
    let configured = settings.pioneer.binary.iter().map(PathBuf::from);
    if let Some(found) = configured.chain(env_candidates()).find(|p| p.is_file()) {
        return Ok(found);
    }
    BINARY_NAMES
        .iter()
        .find_map(|name| which::which(name).ok())
        .ok_or(SchemaError::MissingBinary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn bundled_defaults_parse() {
        for workflow in Workflow::ALL {
            let defaults = fallback_defaults(workflow).unwrap();
            let simplified = simplified_defaults(workflow).unwrap();
            assert!(defaults.as_object().is_some());
            assert!(simplified.as_object().is_some());
        }
    }

    #[test]
    fn simplified_paths_exist_in_defaults() {
        use crate::ops::{collect_leaf_paths, get};
        for workflow in Workflow::ALL {
            let defaults = fallback_defaults(workflow).unwrap();
            let simplified = simplified_defaults(workflow).unwrap();
            for path in collect_leaf_paths(&simplified) {
                assert!(get(&defaults, &path).is_some(), "{} missing {}", workflow, path);
            }
        }
    }

    #[test]
    fn all_fallback_when_binary_missing() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_path_buf();
        let loaded = load_schemas_with(
            |_| Err(SchemaError::MissingBinary),
            |w| dir.join(w.persisted_filename()),
        )
        .unwrap();
        assert_eq!(loaded.source, ConfigSource::Fallback);
        let err = loaded.binary_error.unwrap();
        assert!(err.contains("BuildSpecLib defaults"));
        assert!(err.contains("SearchDIA defaults"));
        assert_eq!(
            loaded.search.default_config,
            fallback_defaults(Workflow::SearchDia).unwrap()
        );
    }

    #[test]
    fn partial_when_one_workflow_fetched() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_path_buf();
        let loaded = load_schemas_with(
            |w| match w {
                Workflow::SearchDia => Ok(JsonValue::from(json!({"from": "binary"}))),
                Workflow::BuildSpecLib => Err(SchemaError::NonZeroExit(Some(2))),
            },
            |w| dir.join(w.persisted_filename()),
        )
        .unwrap();
        assert_eq!(loaded.source, ConfigSource::Partial);
        assert_eq!(
            loaded.search.default_config,
            JsonValue::from(json!({"from": "binary"}))
        );
        assert!(loaded.binary_error.unwrap().contains("status Some(2)"));
    }

    #[test]
    fn binary_source_and_persisted_config() {
        let tmp = TempDir::new().unwrap();
        let dir = tmp.path().to_path_buf();
        fs::write(dir.join("buildspeclib.json"), r#"{"lib_name": "Mine"}"#).unwrap();
        let loaded = load_schemas_with(
            |_| Ok(JsonValue::from(json!({"lib_name": "SpecLib"}))),
            |w| dir.join(w.persisted_filename()),
        )
        .unwrap();
        assert_eq!(loaded.source, ConfigSource::Binary);
        assert!(loaded.binary_error.is_none());
        assert_eq!(
            loaded.build.persisted_config,
            Some(JsonValue::from(json!({"lib_name": "Mine"})))
        );
        assert!(loaded.search.persisted_config.is_none());
        assert_eq!(
            loaded.for_workflow(Workflow::BuildSpecLib).persisted_path,
            Some(dir.join("buildspeclib.json"))
        );
    }

    #[test]
    fn settings_override_wins() {
        let tmp = TempDir::new().unwrap();
        let fake = tmp.path().join("pioneer-custom");
        fs::write(&fake, "").unwrap();
        let mut settings = Settings::default();
        settings.pioneer.binary = Some(fake.to_string_lossy().to_string());
        assert_eq!(locate_pioneer_binary(&settings).unwrap(), fake);
    }
}
