use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::EnvFilter;

use crate::model::config::LogSettings;

/// Environment variable that overrides the configured filter
pub const LOG_ENV: &str = "PCONF_LOG";

fn filter(default_directive: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Log to a file while the TUI owns the terminal. Failing to open the file
/// leaves logging disabled rather than aborting startup.
pub fn init_file_logging(settings: &LogSettings, path: &Path) {
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    let Ok(file) = OpenOptions::new().create(true).append(true).open(path) else {
        return;
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(&settings.level))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .try_init();
}

/// Log warnings and above to stderr for CLI subcommands
pub fn init_stderr_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter("warn"))
        .with_writer(std::io::stderr)
        .without_time()
        .try_init();
}
