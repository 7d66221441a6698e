//! CLI type definitions
//!
//! Top-level clap structures. Each command area defines its own `Args` and
//! subcommand enum next to its handler in `cli::commands`.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::outputs::OutputsArgs;
use super::commands::panel::PanelArgs;
use super::commands::phase::PhaseArgs;
use super::commands::project::ProjectArgs;

#[derive(Parser, Debug)]
#[command(name = "weaver")]
#[command(about = "Weaver cockpit - drive and watch Novel Weaver phase runs", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Project to operate on (remembered for later invocations)
    #[arg(short, long, global = true, env = "WEAVER_PROJECT")]
    pub project: Option<String>,

    /// Load configuration from this file instead of .weaver/
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Select or inspect the active project
    Project(ProjectArgs),

    /// Start, watch and cancel phase runs
    Phase(PhaseArgs),

    /// Inspect cached phase outputs and pinned outputs
    Outputs(OutputsArgs),

    /// Show or toggle panel visibility
    Panel(PanelArgs),
}
