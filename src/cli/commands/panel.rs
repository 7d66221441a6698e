//! Panel visibility CLI commands.
//!
//! Panels are scoped to the active project; with no project they use the
//! global scope.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::sync::Arc;

use crate::cli::output::{output, CommandOutput};
use crate::cli::CliContext;
use crate::services::{PanelVisibility, ScopedLocalStore};

#[derive(Args, Debug)]
pub struct PanelArgs {
    #[command(subcommand)]
    pub command: PanelCommands,
}

#[derive(Subcommand, Debug)]
pub enum PanelCommands {
    /// Show whether a panel is open
    Show {
        /// Panel ID
        panel_id: String,
        /// Treat the panel as closed unless it was toggled before
        #[arg(long)]
        closed_by_default: bool,
    },
    /// Flip a panel between open and closed
    Toggle {
        /// Panel ID
        panel_id: String,
        /// Treat the panel as closed unless it was toggled before
        #[arg(long)]
        closed_by_default: bool,
    },
}

#[derive(Debug, Serialize)]
pub struct PanelOutput {
    pub panel_id: String,
    pub scope: Option<String>,
    pub open: bool,
}

impl CommandOutput for PanelOutput {
    fn to_human(&self) -> String {
        let state = if self.open { "open" } else { "closed" };
        match &self.scope {
            Some(scope) => format!("Panel '{}' is {state} in {scope}", self.panel_id),
            None => format!("Panel '{}' is {state}", self.panel_id),
        }
    }
}

pub async fn execute(args: PanelArgs, ctx: &CliContext) -> Result<()> {
    let scope = ctx.project().await;
    let mut panels = PanelVisibility::new(ScopedLocalStore::new(Arc::clone(&ctx.store)));

    let (panel_id, open) = match args.command {
        PanelCommands::Show { panel_id, closed_by_default } => {
            let handle = panels
                .get_or_init(&panel_id, !closed_by_default, scope.as_deref())
                .await;
            (panel_id, handle.is_open())
        }
        PanelCommands::Toggle { panel_id, closed_by_default } => {
            let mut handle = panels
                .get_or_init(&panel_id, !closed_by_default, scope.as_deref())
                .await;
            let open = handle.toggle().await;
            (panel_id, open)
        }
    };

    output(&PanelOutput { panel_id, scope, open }, ctx.json);
    Ok(())
}
