//! Spinner utilities using indicatif for terminal output
//!
//! Phase watches show an indeterminate spinner whose message tracks the last
//! reported progress and step. In JSON mode the spinner is hidden so stdout
//! carries only the command result.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

use crate::domain::models::PhaseActivity;

const SPINNER_TEMPLATE: &str = "[{elapsed_precise}] {spinner:.green} {msg}";
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Create a spinner for indeterminate operations, drawn on stderr
pub fn create_spinner() -> ProgressBar {
    let spinner = ProgressBar::with_draw_target(None, ProgressDrawTarget::stderr());
    let style = ProgressStyle::default_spinner()
        .template(SPINNER_TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_spinner())
        .tick_chars(SPINNER_CHARS);
    spinner.set_style(style);
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Create a spinner with a custom message, or a hidden one when `hidden`
pub fn create_spinner_with_message(message: impl Into<String>, hidden: bool) -> ProgressBar {
    let spinner = if hidden {
        ProgressBar::hidden()
    } else {
        create_spinner()
    };
    spinner.set_message(message.into());
    spinner
}

/// Spinner message for a phase's last reported activity
pub fn activity_message(phase: impl std::fmt::Display, activity: &PhaseActivity) -> String {
    match activity.current_step.as_deref() {
        Some(step) if !step.is_empty() => {
            format!("phase {phase}: {:.0}% - {step}", activity.progress)
        }
        _ => format!("phase {phase}: {:.0}%", activity.progress),
    }
}

/// Extension trait for ProgressBar to add common utility methods
pub trait ProgressBarExt {
    /// Finish with a success message (checkmark)
    fn finish_success(&self, message: impl Into<String>);

    /// Finish with an error message (cross)
    fn finish_error(&self, message: impl Into<String>);

    /// Finish with a warning message (exclamation)
    fn finish_warning(&self, message: impl Into<String>);
}

impl ProgressBarExt for ProgressBar {
    fn finish_success(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✓ {}", message.into()));
    }

    fn finish_error(&self, message: impl Into<String>) {
        self.finish_with_message(format!("✗ {}", message.into()));
    }

    fn finish_warning(&self, message: impl Into<String>) {
        self.finish_with_message(format!("! {}", message.into()));
    }
}
