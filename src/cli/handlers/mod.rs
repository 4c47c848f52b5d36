mod run;
pub use run::cmd_run;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{read_json_file, read_settings, write_json_file};
use crate::io::logging::init_stderr_logging;
use crate::io::schema::{ConfigSource, simplified_defaults, workflow_defaults};
use crate::model::path::JsonPath;
use crate::model::value::JsonValue;
use crate::ops::scalar_text::parse_scalar_line;
use crate::ops::{ImportantPaths, collect_leaf_paths, deep_merge, delete_at, get, set};

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let json = cli.json;

    match cli.command {
        None => crate::tui::run(),
        Some(cmd) => {
            init_stderr_logging();
            match cmd {
                Commands::Defaults(args) => cmd_defaults(args, json),
                Commands::Paths(args) => cmd_paths(args, json),
                Commands::Get(args) => cmd_get(args, json),
                Commands::Set(args) => cmd_set(args, json),
                Commands::Unset(args) => cmd_unset(args, json),
                Commands::Merge(args) => cmd_merge(args),
                Commands::Run(args) => cmd_run(args, json),
            }
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// `-o` target, or the input file itself
fn write_target<'a>(file: &'a Path, output: &'a Option<PathBuf>) -> &'a Path {
    output.as_deref().unwrap_or(file)
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_defaults(args: DefaultsArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let (config, source) = if args.simplified {
        (simplified_defaults(args.workflow)?, ConfigSource::Fallback)
    } else {
        workflow_defaults(&read_settings(), args.workflow)?
    };

    if json {
        print_json(&DefaultsJson {
            workflow: args.workflow,
            source,
            simplified: args.simplified,
            config: &config,
        })
    } else {
        println!("{}", config.to_pretty_string());
        Ok(())
    }
}

fn cmd_paths(args: PathsArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let value = read_json_file(&args.file)?;
    let important = match args.important {
        Some(workflow) => Some(ImportantPaths::from_simplified(&simplified_defaults(
            workflow,
        )?)),
        None => None,
    };

    let leaves: Vec<JsonPath> = collect_leaf_paths(&value)
        .into_iter()
        .filter(|path| important.as_ref().is_none_or(|imp| imp.contains(path)))
        .collect();

    if json {
        let entries: Vec<LeafJson> = leaves
            .iter()
            .filter_map(|path| {
                get(&value, path).map(|leaf| LeafJson {
                    path: path.dotted(),
                    value: leaf,
                    important: important.is_some(),
                })
            })
            .collect();
        return print_json(&entries);
    }

    for path in &leaves {
        println!("{}", path);
    }
    Ok(())
}

fn cmd_get(args: GetArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let value = read_json_file(&args.file)?;
    let path = JsonPath::parse_against(&value, &args.path);
    let found = get(&value, &path)
        .ok_or_else(|| format!("no value at '{}' in {}", args.path, args.file.display()))?;

    if json {
        print_json(&ValueJson {
            path: path.dotted(),
            type_name: found.type_name(),
            value: found,
        })
    } else {
        println!("{}", format_value(found));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_set(args: SetArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let value = read_json_file(&args.file)?;
    let path = JsonPath::parse_against(&value, &args.path);
    let new_value = parse_scalar_line(&args.value);
    let updated = set(&value, &path, new_value.clone());

    // set leaves the document alone when a parent is missing or the wrong kind
    if get(&updated, &path) != Some(&new_value) {
        return Err(format!(
            "cannot set '{}': no object or array to hold it in {}",
            args.path,
            args.file.display()
        )
        .into());
    }

    let target = write_target(&args.file, &args.output);
    write_json_file(target, &updated)?;
    debug!(path = %path, file = %target.display(), "set value");

    if json {
        print_json(&WriteJson {
            file: target.display().to_string(),
            path: path.dotted(),
            value: Some(&new_value),
            changed: get(&value, &path) != Some(&new_value),
        })
    } else {
        println!("{} = {}", path, new_value);
        Ok(())
    }
}

fn cmd_unset(args: UnsetArgs, json: bool) -> Result<(), Box<dyn std::error::Error>> {
    let value = read_json_file(&args.file)?;
    let path = JsonPath::parse_against(&value, &args.path);
    if path.is_empty() {
        return Err("cannot unset the whole document".into());
    }
    if get(&value, &path).is_none() {
        return Err(format!("no value at '{}' in {}", args.path, args.file.display()).into());
    }

    let updated = delete_at(&value, &path);
    let target = write_target(&args.file, &args.output);
    write_json_file(target, &updated)?;

    if json {
        print_json(&WriteJson {
            file: target.display().to_string(),
            path: path.dotted(),
            value: None,
            changed: true,
        })
    } else {
        println!("removed {}", path);
        Ok(())
    }
}

fn cmd_merge(args: MergeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let base = read_json_file(&args.base)?;
    let overlay = read_json_file(&args.overlay)?;
    let merged: JsonValue = deep_merge(&base, &overlay);

    match &args.output {
        Some(target) => {
            write_json_file(target, &merged)?;
            println!("wrote {}", target.display());
        }
        None => println!("{}", merged.to_pretty_string()),
    }
    Ok(())
}
