use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::ops::stages::{BUILD_STAGES, SEARCH_STAGES, StageInfo};

use super::value::JsonValue;

/// The two Pioneer workflows, each with its own parameter file and tab
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "camelCase")]
pub enum Workflow {
    /// Spectral library prediction (`pioneer predict`)
    #[value(name = "build", alias = "buildspeclib")]
    BuildSpecLib,
    /// DIA search (`pioneer search`)
    #[value(name = "search", alias = "searchdia")]
    SearchDia,
}

impl Workflow {
    pub const ALL: [Workflow; 2] = [Workflow::BuildSpecLib, Workflow::SearchDia];

    /// Subcommand that runs the workflow
    pub fn subcommand(&self) -> &'static str {
        match self {
            Workflow::BuildSpecLib => "predict",
            Workflow::SearchDia => "search",
        }
    }

    /// Subcommand that writes the workflow's default parameters
    pub fn params_subcommand(&self) -> &'static str {
        match self {
            Workflow::BuildSpecLib => "params-predict",
            Workflow::SearchDia => "params-search",
        }
    }

    /// File name the parameters are handed to Pioneer under
    pub fn config_filename(&self) -> &'static str {
        match self {
            Workflow::BuildSpecLib => "buildspeclib_params.json",
            Workflow::SearchDia => "search_params.json",
        }
    }

    /// File name of the last-run parameters in the config directory
    pub fn persisted_filename(&self) -> &'static str {
        match self {
            Workflow::BuildSpecLib => "buildspeclib.json",
            Workflow::SearchDia => "searchdia.json",
        }
    }

    pub fn stages(&self) -> &'static [StageInfo] {
        match self {
            Workflow::BuildSpecLib => &BUILD_STAGES,
            Workflow::SearchDia => &SEARCH_STAGES,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Workflow::BuildSpecLib => "BuildSpecLib",
            Workflow::SearchDia => "SearchDIA",
        }
    }
}

impl fmt::Display for Workflow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Everything needed to open a workflow for editing
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSchema {
    /// Baseline parameters reported by Pioneer (or the bundled fallback)
    pub default_config: JsonValue,
    /// Curated subset whose paths are highlighted
    pub simplified_config: JsonValue,
    /// Parameters from the previous run, if any were saved
    pub persisted_config: Option<JsonValue>,
    pub persisted_path: Option<PathBuf>,
}

/// User settings from settings.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub pioneer: PioneerSettings,
    #[serde(default)]
    pub ui: UiSettings,
    #[serde(default)]
    pub log: LogSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PioneerSettings {
    /// Explicit path to the Pioneer executable. Checked before the
    /// environment and PATH.
    #[serde(default)]
    pub binary: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UiSettings {
    /// Theme overrides: color name to "#RRGGBB"
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogSettings {
    /// tracing filter directive, e.g. "info" or "pconf=debug"
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogSettings {
    fn default() -> Self {
        LogSettings {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn workflow_file_names() {
        assert_eq!(Workflow::BuildSpecLib.config_filename(), "buildspeclib_params.json");
        assert_eq!(Workflow::SearchDia.persisted_filename(), "searchdia.json");
        assert_eq!(Workflow::SearchDia.subcommand(), "search");
        assert_eq!(Workflow::BuildSpecLib.params_subcommand(), "params-predict");
    }

    #[test]
    fn workflow_serde_camel_case() {
        assert_eq!(
            serde_json::to_string(&Workflow::SearchDia).unwrap(),
            "\"searchDia\""
        );
        let w: Workflow = serde_json::from_str("\"buildSpecLib\"").unwrap();
        assert_eq!(w, Workflow::BuildSpecLib);
    }

    #[test]
    fn stage_tables_end_in_complete() {
        for workflow in Workflow::ALL {
            let last = workflow.stages().last().unwrap();
            assert_eq!(last.key, "complete");
        }
    }

    #[test]
    fn settings_defaults_from_empty_toml() {
        let settings: Settings = toml::from_str("").unwrap();
        assert!(settings.pioneer.binary.is_none());
        assert!(settings.ui.colors.is_empty());
        assert_eq!(settings.log.level, "info");
    }

    #[test]
    fn settings_parse_full() {
        let settings: Settings = toml::from_str(
            r##"
[pioneer]
binary = "/opt/pioneer/bin/pioneer"

[ui]
colors = { highlight = "#FF0000" }

[log]
level = "debug"
"##,
        )
        .unwrap();
        assert_eq!(settings.pioneer.binary.as_deref(), Some("/opt/pioneer/bin/pioneer"));
        assert_eq!(settings.ui.colors.get("highlight").map(|s| s.as_str()), Some("#FF0000"));
        assert_eq!(settings.log.level, "debug");
    }
}
