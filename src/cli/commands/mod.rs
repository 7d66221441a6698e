//! CLI command implementations.

pub mod outputs;
pub mod panel;
pub mod phase;
pub mod project;

use anyhow::Result;

use super::types::Commands;
use super::CliContext;

/// Route a parsed command to its handler.
pub async fn dispatch(command: Commands, ctx: &CliContext) -> Result<()> {
    match command {
        Commands::Project(args) => project::execute(args, ctx).await,
        Commands::Phase(args) => phase::execute(args, ctx).await,
        Commands::Outputs(args) => outputs::execute(args, ctx).await,
        Commands::Panel(args) => panel::execute(args, ctx).await,
    }
}
