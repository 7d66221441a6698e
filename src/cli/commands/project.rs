//! Project selection CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;
use tracing::warn;

use crate::cli::output::table::{PhaseRow, TableFormatter};
use crate::cli::output::{output, CommandOutput};
use crate::cli::CliContext;
use crate::domain::models::ProjectProgress;

#[derive(Args, Debug)]
pub struct ProjectArgs {
    #[command(subcommand)]
    pub command: ProjectCommands,
}

#[derive(Subcommand, Debug)]
pub enum ProjectCommands {
    /// Make a project the active one for later invocations
    Use {
        /// Project ID
        project_id: String,
    },
    /// Show the active project, its cached outputs and engine progress
    Show {
        /// Skip the progress request and show cached state only
        #[arg(long)]
        offline: bool,
    },
    /// Forget the remembered project
    Clear,
}

#[derive(Debug, Serialize)]
pub struct ProjectActionOutput {
    pub success: bool,
    pub message: String,
    pub project_id: Option<String>,
}

impl CommandOutput for ProjectActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct ProjectShowOutput {
    pub project_id: String,
    pub cached_phase_outputs: Vec<u32>,
    pub saved_outputs: usize,
    pub progress: Option<ProjectProgress>,
}

impl CommandOutput for ProjectShowOutput {
    fn to_human(&self) -> String {
        let cached = if self.cached_phase_outputs.is_empty() {
            "none".to_string()
        } else {
            self.cached_phase_outputs
                .iter()
                .map(u32::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        };

        let mut lines = vec![
            format!("Project: {}", self.project_id),
            format!("Cached phase outputs: {cached}"),
            format!("Saved outputs: {}", self.saved_outputs),
        ];

        match &self.progress {
            Some(progress) => {
                lines.push(format!(
                    "Overall progress: {:.0}% ({}/{} chapters)",
                    progress.overall_progress, progress.chapters_completed, progress.total_chapters
                ));
                if !progress.phases.is_empty() {
                    let rows = progress.phases.iter().map(|phase| PhaseRow {
                        phase: phase.phase,
                        status: phase.status,
                        progress: phase.progress,
                        started_at: phase.started_at.as_deref(),
                        completed_at: phase.completed_at.as_deref(),
                    });
                    lines.push(TableFormatter::new().format_phases(rows));
                }
            }
            None => lines.push("Progress: unavailable".to_string()),
        }

        lines.join("\n")
    }
}

pub async fn execute(args: ProjectArgs, ctx: &CliContext) -> Result<()> {
    match args.command {
        ProjectCommands::Use { project_id } => {
            let project_id = project_id.trim().to_string();
            anyhow::ensure!(!project_id.is_empty(), "Project ID cannot be empty");

            ctx.scope.remember(&project_id).await;
            let out = ProjectActionOutput {
                success: true,
                message: format!("Active project: {project_id}"),
                project_id: Some(project_id),
            };
            output(&out, ctx.json);
        }

        ProjectCommands::Show { offline } => {
            let project_id = ctx.require_project().await?;
            let storage = ctx.storage(&project_id).await;

            let progress = if offline {
                None
            } else {
                match ctx.session(&project_id).await?.refresh_progress().await {
                    Ok(progress) => Some(progress),
                    Err(err) => {
                        warn!(project_id = %project_id, error = %err, "progress unavailable");
                        None
                    }
                }
            };

            let out = ProjectShowOutput {
                cached_phase_outputs: storage.phase_outputs().keys().map(|phase| phase.number()).collect(),
                saved_outputs: storage.saved_outputs().len(),
                project_id,
                progress,
            };
            output(&out, ctx.json);
        }

        ProjectCommands::Clear => {
            ctx.scope.forget().await;
            let out = ProjectActionOutput {
                success: true,
                message: "Remembered project cleared".to_string(),
                project_id: None,
            };
            output(&out, ctx.json);
        }
    }

    Ok(())
}
