//! Phase run CLI commands.

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use serde::Serialize;
use serde_json::{Map, Value};
use std::time::Duration;
use tokio::time::{interval, MissedTickBehavior};

use crate::cli::output::progress::{activity_message, create_spinner_with_message, ProgressBarExt};
use crate::cli::output::{output, CommandOutput};
use crate::cli::CliContext;
use crate::domain::models::{Phase, PhaseStatus, WorkflowStatus};
use crate::services::{CockpitSession, PollOutcome};

const SPINNER_REFRESH: Duration = Duration::from_millis(250);

#[derive(Args, Debug)]
pub struct PhaseArgs {
    #[command(subcommand)]
    pub command: PhaseCommands,
}

#[derive(Subcommand, Debug)]
pub enum PhaseCommands {
    /// Start a phase and watch it until it completes
    Run {
        /// Phase number (1-8)
        phase: Phase,
        /// Phase input (format: "key=value"; JSON values are parsed)
        #[arg(short, long)]
        input: Vec<String>,
        /// Print the run ID and return without watching
        #[arg(short, long)]
        detach: bool,
    },
    /// Watch an already started run until it completes
    Watch {
        /// Phase number (1-8)
        phase: Phase,
        /// Workflow run ID
        run_id: String,
    },
    /// Probe the status of a run once
    Status {
        /// Phase number (1-8)
        phase: Phase,
        /// Workflow run ID
        run_id: String,
    },
    /// Ask the engine to cancel a run
    Cancel {
        /// Phase number (1-8)
        phase: Phase,
        /// Workflow run ID
        run_id: String,
    },
}

#[derive(Debug, Serialize)]
pub struct PhaseStartedOutput {
    pub project_id: String,
    pub phase: Phase,
    pub run_id: String,
}

impl CommandOutput for PhaseStartedOutput {
    fn to_human(&self) -> String {
        format!(
            "Phase {} started for {} (run {}).\nWatch it with: weaver phase watch {} {}",
            self.phase, self.project_id, self.run_id, self.phase, self.run_id
        )
    }
}

#[derive(Debug, Serialize)]
pub struct PhaseResultOutput {
    pub project_id: String,
    pub phase: Phase,
    pub run_id: String,
    pub outcome: &'static str,
    pub output: Option<Value>,
}

impl CommandOutput for PhaseResultOutput {
    fn to_human(&self) -> String {
        match (&self.output, self.outcome) {
            (Some(output), "completed") => format!(
                "Phase {} completed (run {}).\n{}",
                self.phase,
                self.run_id,
                serde_json::to_string_pretty(output).unwrap_or_default()
            ),
            (_, "interrupted") => format!(
                "Stopped watching phase {}; run {} continues on the engine.",
                self.phase, self.run_id
            ),
            _ => format!("Stopped watching phase {} (run {}).", self.phase, self.run_id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PhaseStatusOutput {
    pub phase: Phase,
    pub run_id: String,
    pub status: WorkflowStatus,
}

impl CommandOutput for PhaseStatusOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("Phase: {}", self.phase),
            format!("Run: {}", self.run_id),
            format!("Status: {}", self.status.phase_status()),
            format!("Progress: {:.0}%", self.status.progress),
        ];
        if let Some(step) = &self.status.current_step {
            lines.push(format!("Step: {step}"));
        }
        if let Some(error) = &self.status.error {
            lines.push(format!("Error: {error}"));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct PhaseActionOutput {
    pub success: bool,
    pub message: String,
}

impl CommandOutput for PhaseActionOutput {
    fn to_human(&self) -> String {
        self.message.clone()
    }
}

pub async fn execute(args: PhaseArgs, ctx: &CliContext) -> Result<()> {
    let project_id = ctx.require_project().await?;
    let mut session = ctx.session(&project_id).await?;

    match args.command {
        PhaseCommands::Run { phase, input, detach } => {
            let inputs = parse_inputs(&input)?;
            let run = session
                .start_phase(phase, inputs)
                .await
                .with_context(|| format!("Failed to start phase {phase}"))?;

            if detach {
                let out = PhaseStartedOutput {
                    project_id,
                    phase,
                    run_id: run.workflow_run_id,
                };
                output(&out, ctx.json);
            } else {
                let out = follow(&mut session, phase, &run.workflow_run_id, ctx.json).await?;
                output(&out, ctx.json);
            }
        }

        PhaseCommands::Watch { phase, run_id } => {
            session.watch(phase, &run_id).await?;
            let out = follow(&mut session, phase, &run_id, ctx.json).await?;
            output(&out, ctx.json);
        }

        PhaseCommands::Status { phase, run_id } => {
            let status = session
                .phase_status(phase, &run_id)
                .await
                .with_context(|| format!("Failed to fetch status of run {run_id}"))?;
            let out = PhaseStatusOutput { phase, run_id, status };
            output(&out, ctx.json);
        }

        PhaseCommands::Cancel { phase, run_id } => {
            session.state().lock().await.begin_run(phase, &run_id);
            session
                .cancel(phase)
                .await
                .with_context(|| format!("Failed to cancel run {run_id}"))?;
            let out = PhaseActionOutput {
                success: true,
                message: format!("Cancellation requested for phase {phase} (run {run_id})"),
            };
            output(&out, ctx.json);
        }
    }

    Ok(())
}

enum WatchEnd {
    Finished(PollOutcome),
    Interrupted,
}

/// Wait for the watcher of `phase`, keeping a spinner in sync with the last
/// reported activity. Ctrl-C stops watching without cancelling the run.
async fn follow(
    session: &mut CockpitSession,
    phase: Phase,
    run_id: &str,
    json_mode: bool,
) -> Result<PhaseResultOutput> {
    let state = session.state();
    let project_id = session.project_id().await.unwrap_or_default();
    let spinner = create_spinner_with_message(format!("phase {phase}: waiting for engine"), json_mode);

    let mut refresh = interval(SPINNER_REFRESH);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let end = {
        let wait = session.wait(phase);
        tokio::pin!(wait);
        let interrupt = tokio::signal::ctrl_c();
        tokio::pin!(interrupt);

        loop {
            tokio::select! {
                outcome = &mut wait => break WatchEnd::Finished(outcome?),
                _ = &mut interrupt => break WatchEnd::Interrupted,
                _ = refresh.tick() => {
                    if let Some(activity) = state.lock().await.activity(phase) {
                        spinner.set_message(activity_message(phase, activity));
                    }
                }
            }
        }
    };

    let (outcome, output) = match end {
        WatchEnd::Finished(PollOutcome::Completed(published)) => {
            let mut state = state.lock().await;
            let output = match state.dialog() {
                dialog if dialog.phase == Some(phase) => dialog.output.clone(),
                _ => Some(published),
            };
            state.close_dialog();
            spinner.finish_success(format!("phase {phase} {}", PhaseStatus::Completed));
            ("completed", output)
        }
        WatchEnd::Finished(_) => {
            spinner.finish_warning(format!("phase {phase}: watch ended"));
            ("stopped", None)
        }
        WatchEnd::Interrupted => {
            spinner.finish_warning(format!("phase {phase}: interrupted"));
            ("interrupted", None)
        }
    };

    Ok(PhaseResultOutput {
        project_id,
        phase,
        run_id: run_id.to_string(),
        outcome,
        output,
    })
}

/// Parse `key=value` pairs into a JSON object; values that parse as JSON
/// keep their type, everything else is a string.
pub fn parse_inputs(pairs: &[String]) -> Result<Map<String, Value>> {
    let mut inputs = Map::new();
    for pair in pairs {
        let (key, raw) = pair
            .split_once('=')
            .with_context(|| format!("Invalid input '{pair}', expected key=value"))?;
        let key = key.trim();
        anyhow::ensure!(!key.is_empty(), "Invalid input '{pair}', key is empty");

        let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
        inputs.insert(key.to_string(), value);
    }
    Ok(inputs)
}
