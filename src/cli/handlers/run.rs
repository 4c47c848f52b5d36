use crate::cli::commands::RunArgs;
use crate::cli::output::{RunEventJson, format_run_event};
use crate::io::config_io::{persisted_path, read_json_file, read_settings, state_dir};
use crate::io::runner::{RunEvent, RunRequest, start_run};
use crate::io::schema::{locate_pioneer_binary, workflow_defaults};
use crate::ops::deep_merge;

/// Headless run: the file is layered over the workflow defaults, and every
/// log line and stage change is echoed to stdout until Pioneer exits.
pub fn cmd_run(args: RunArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let settings = read_settings();
    let pioneer = locate_pioneer_binary(&settings)?;
    let overlay = read_json_file(&args.config)?;
    let (defaults, _) = workflow_defaults(&settings, args.workflow)?;
    let config = deep_merge(&defaults, &overlay);

    let persist = persisted_path(args.workflow);
    let log_dir = state_dir().join("runs");
    let handle = start_run(RunRequest {
        pioneer: &pioneer,
        workflow: args.workflow,
        config: &config,
        persist_to: Some(&persist),
        log_dir: &log_dir,
    })?;

    let mut failure = None;
    for event in handle.events() {
        if json {
            println!("{}", serde_json::to_string(&RunEventJson::from(&event))?);
        } else {
            println!("{}", format_run_event(&event));
        }
        if let RunEvent::Complete {
            success: false,
            message,
            ..
        } = &event
        {
            failure = Some(
                message
                    .clone()
                    .unwrap_or_else(|| format!("{} failed", args.workflow)),
            );
        }
    }

    match failure {
        Some(message) => Err(format!("{} (log: {})", message, handle.log_path.display()).into()),
        None => Ok(()),
    }
}
