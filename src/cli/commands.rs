use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::model::config::Workflow;

#[derive(Parser)]
#[command(
    name = "pconf",
    about = concat!("pconf v", env!("CARGO_PKG_VERSION"), " - edit and run Pioneer parameter files"),
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the default parameters for a workflow
    Defaults(DefaultsArgs),
    /// List every leaf path in a parameter file
    Paths(PathsArgs),
    /// Print the value at a dotted path
    Get(GetArgs),
    /// Set the value at a dotted path
    Set(SetArgs),
    /// Remove the value at a dotted path
    Unset(UnsetArgs),
    /// Merge an overlay file onto a base file
    Merge(MergeArgs),
    /// Run a workflow with a parameter file, streaming its output
    Run(RunArgs),
}

#[derive(Args)]
pub struct DefaultsArgs {
    /// Workflow (build or search)
    pub workflow: Workflow,
    /// Print the simplified schema instead
    #[arg(long)]
    pub simplified: bool,
}

#[derive(Args)]
pub struct PathsArgs {
    /// Parameter file
    pub file: PathBuf,
    /// Only paths the workflow marks as important
    #[arg(long, value_name = "WORKFLOW")]
    pub important: Option<Workflow>,
}

#[derive(Args)]
pub struct GetArgs {
    /// Parameter file
    pub file: PathBuf,
    /// Dotted path, e.g. global.isotope_settings.err_bounds.0
    pub path: String,
}

#[derive(Args)]
pub struct SetArgs {
    /// Parameter file
    pub file: PathBuf,
    /// Dotted path
    pub path: String,
    /// New value: true/false, a number, a JSON literal, or plain text
    pub value: String,
    /// Write here instead of updating the file in place
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct UnsetArgs {
    /// Parameter file
    pub file: PathBuf,
    /// Dotted path
    pub path: String,
    /// Write here instead of updating the file in place
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct MergeArgs {
    /// Base parameters
    pub base: PathBuf,
    /// Overlay whose values win
    pub overlay: PathBuf,
    /// Write the result here instead of printing it
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct RunArgs {
    /// Workflow (build or search)
    pub workflow: Workflow,
    /// Parameter file, merged onto the defaults before running
    pub config: PathBuf,
}
