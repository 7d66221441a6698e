//! Cached and pinned output CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::Value;
use std::path::PathBuf;

use crate::cli::output::table::TableFormatter;
use crate::cli::output::{output, CommandOutput};
use crate::cli::CliContext;
use crate::domain::models::{Phase, SavedOutput, SavedOutputs, Update};

#[derive(Args, Debug)]
pub struct OutputsArgs {
    #[command(subcommand)]
    pub command: OutputsCommands,
}

#[derive(Subcommand, Debug)]
pub enum OutputsCommands {
    /// List cached phase outputs and pinned outputs
    List,
    /// Print the cached output of a phase
    Show {
        /// Phase number (1-8)
        phase: Phase,
    },
    /// Pin an output under an ID, from a phase's cached output or a file
    Pin {
        /// ID to pin the output under
        id: String,
        /// Display name (defaults to the ID)
        #[arg(short, long)]
        name: Option<String>,
        /// Pin the cached output of this phase
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        phase: Option<Phase>,
        /// Pin the contents of this file
        #[arg(short, long)]
        file: Option<PathBuf>,
        /// Output type label
        #[arg(short = 't', long = "type")]
        kind: Option<String>,
    },
    /// Remove a pinned output
    Unpin {
        /// Pinned output ID
        id: String,
    },
}

#[derive(Debug, Serialize)]
pub struct OutputsListOutput {
    pub project_id: String,
    pub phase_outputs: Vec<PhaseOutputEntry>,
    pub saved_outputs: SavedOutputs,
}

#[derive(Debug, Serialize)]
pub struct PhaseOutputEntry {
    pub phase: Phase,
    pub output: Value,
}

impl CommandOutput for OutputsListOutput {
    fn to_human(&self) -> String {
        if self.phase_outputs.is_empty() && self.saved_outputs.is_empty() {
            return format!("No cached outputs for {}.", self.project_id);
        }

        let formatter = TableFormatter::new();
        let mut sections = Vec::new();

        if !self.phase_outputs.is_empty() {
            let rows = self
                .phase_outputs
                .iter()
                .map(|entry| (entry.phase.to_string(), json_kind(&entry.output), entry.output.to_string()));
            sections.push(format!(
                "{} phase output(s):\n{}",
                self.phase_outputs.len(),
                formatter.format_outputs("Phase", rows)
            ));
        }

        if !self.saved_outputs.is_empty() {
            let rows = self
                .saved_outputs
                .iter()
                .map(|(id, saved)| (format!("{id} ({})", saved.name), saved.kind.as_str(), saved.content.clone()));
            sections.push(format!(
                "{} pinned output(s):\n{}",
                self.saved_outputs.len(),
                formatter.format_outputs("ID", rows)
            ));
        }

        sections.join("\n\n")
    }
}

#[derive(Debug, Serialize)]
pub struct PhaseOutputDetail {
    pub phase: Phase,
    pub output: Value,
}

impl CommandOutput for PhaseOutputDetail {
    fn to_human(&self) -> String {
        serde_json::to_string_pretty(&self.output).unwrap_or_default()
    }

    fn to_json(&self) -> Value {
        self.output.clone()
    }
}

#[derive(Debug, Serialize)]
pub struct OutputsActionOutput {
    pub success: bool,
    pub message: String,
    pub id: String,
}

impl CommandOutput for OutputsActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Object(_) => "object",
        Value::Array(_) => "array",
        Value::String(_) => "text",
        Value::Number(_) => "number",
        Value::Bool(_) => "bool",
        Value::Null => "null",
    }
}

pub async fn execute(args: OutputsArgs, ctx: &CliContext) -> Result<()> {
    let project_id = ctx.require_project().await?;
    let mut storage = ctx.storage(&project_id).await;

    match args.command {
        OutputsCommands::List => {
            let out = OutputsListOutput {
                phase_outputs: storage
                    .phase_outputs()
                    .iter()
                    .map(|(phase, output)| PhaseOutputEntry {
                        phase: *phase,
                        output: output.clone(),
                    })
                    .collect(),
                saved_outputs: storage.saved_outputs().clone(),
                project_id,
            };
            output(&out, ctx.json);
        }

        OutputsCommands::Show { phase } => {
            let cached = storage
                .phase_outputs()
                .get(&phase)
                .cloned()
                .with_context(|| format!("No cached output for phase {phase} in {project_id}"))?;
            output(&PhaseOutputDetail { phase, output: cached }, ctx.json);
        }

        OutputsCommands::Pin { id, name, phase, file, kind } => {
            let (content, default_kind) = match (phase, file) {
                (Some(phase), _) => {
                    let cached = storage
                        .phase_outputs()
                        .get(&phase)
                        .with_context(|| format!("No cached output for phase {phase} in {project_id}"))?;
                    (serde_json::to_string_pretty(cached)?, "phase-output")
                }
                (None, Some(path)) => {
                    let content = tokio::fs::read_to_string(&path)
                        .await
                        .with_context(|| format!("Failed to read {}", path.display()))?;
                    (content, "text")
                }
                (None, None) => anyhow::bail!("Pass --phase or --file to pick what to pin"),
            };

            let saved = SavedOutput::new(
                content,
                name.unwrap_or_else(|| id.clone()),
                kind.unwrap_or_else(|| default_kind.to_string()),
            );
            let key = id.clone();
            storage
                .set_saved_outputs_and_persist(Update::apply(move |prev: &SavedOutputs| {
                    let mut next = prev.clone();
                    next.insert(key, saved);
                    next
                }))
                .await;

            let out = OutputsActionOutput {
                success: true,
                message: format!("Pinned output: {id}"),
                id,
            };
            output(&out, ctx.json);
        }

        OutputsCommands::Unpin { id } => {
            anyhow::ensure!(
                storage.saved_outputs().contains_key(&id),
                "No pinned output with ID {id}"
            );

            let key = id.clone();
            storage
                .set_saved_outputs_and_persist(Update::apply(move |prev: &SavedOutputs| {
                    let mut next = prev.clone();
                    next.remove(&key);
                    next
                }))
                .await;

            let out = OutputsActionOutput {
                success: true,
                message: format!("Unpinned output: {id}"),
                id,
            };
            output(&out, ctx.json);
        }
    }

    Ok(())
}
