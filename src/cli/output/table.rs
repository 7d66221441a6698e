//! Table output formatting for CLI commands
//!
//! Phase, progress and saved-output tables built with comfy-table.
//! Status cells are colour-coded unless `NO_COLOR` is set or the terminal is
//! dumb.

use comfy_table::{presets, Attribute, Cell, Color, ContentArrangement, Table};
use std::env;

use crate::domain::models::PhaseStatus;

use super::truncate;

/// Table formatter for CLI output
pub struct TableFormatter {
    use_colors: bool,
    max_width: Option<u16>,
}

impl Default for TableFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TableFormatter {
    pub fn new() -> Self {
        Self {
            use_colors: supports_color(),
            max_width: None,
        }
    }

    pub const fn with_config(use_colors: bool, max_width: Option<u16>) -> Self {
        Self { use_colors, max_width }
    }

    /// One row per phase: number, status, progress, timestamps.
    pub fn format_phases<'a, I>(&self, rows: I) -> String
    where
        I: IntoIterator<Item = PhaseRow<'a>>,
    {
        let mut table = self.create_base_table();
        table.set_header(header(&["Phase", "Status", "Progress", "Started", "Completed"]));

        for row in rows {
            table.add_row(vec![
                Cell::new(row.phase),
                self.status_cell(row.status),
                Cell::new(format!("{:.0}%", row.progress)),
                Cell::new(row.started_at.unwrap_or("-")),
                Cell::new(row.completed_at.unwrap_or("-")),
            ]);
        }

        table.to_string()
    }

    /// Cached outputs: a key column, a kind column and a preview.
    pub fn format_outputs<'a, I>(&self, key_header: &str, rows: I) -> String
    where
        I: IntoIterator<Item = (String, &'a str, String)>,
    {
        let mut table = self.create_base_table();
        table.set_header(header(&[key_header, "Type", "Preview"]));

        for (key, kind, preview) in rows {
            let key_cell = if self.use_colors {
                Cell::new(key).fg(Color::Cyan)
            } else {
                Cell::new(key)
            };
            table.add_row(vec![key_cell, Cell::new(kind), Cell::new(truncate(&preview, 60))]);
        }

        table.to_string()
    }

    fn status_cell(&self, status: PhaseStatus) -> Cell {
        if self.use_colors {
            Cell::new(status.as_str()).fg(status_color(status))
        } else {
            Cell::new(format!("{} {}", status_icon(status), status.as_str()))
        }
    }

    fn create_base_table(&self) -> Table {
        let mut table = Table::new();
        table
            .load_preset(presets::UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);

        if let Some(width) = self.max_width {
            table.set_width(width);
        }

        table
    }
}

/// Borrowed view of one phase row.
pub struct PhaseRow<'a> {
    pub phase: u32,
    pub status: PhaseStatus,
    pub progress: f64,
    pub started_at: Option<&'a str>,
    pub completed_at: Option<&'a str>,
}

fn header(titles: &[&str]) -> Vec<Cell> {
    titles
        .iter()
        .map(|title| Cell::new(title).add_attribute(Attribute::Bold))
        .collect()
}

const fn status_color(status: PhaseStatus) -> Color {
    match status {
        PhaseStatus::Completed => Color::Green,
        PhaseStatus::InProgress => Color::Yellow,
        PhaseStatus::Failed => Color::Red,
        PhaseStatus::NotStarted | PhaseStatus::Unknown => Color::Grey,
    }
}

const fn status_icon(status: PhaseStatus) -> &'static str {
    match status {
        PhaseStatus::Completed => "✓",
        PhaseStatus::InProgress => "⟳",
        PhaseStatus::Failed => "✗",
        PhaseStatus::NotStarted => "○",
        PhaseStatus::Unknown => "?",
    }
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }

    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_table_without_colors() {
        let formatter = TableFormatter::with_config(false, Some(100));
        let rendered = formatter.format_phases([
            PhaseRow {
                phase: 1,
                status: PhaseStatus::Completed,
                progress: 100.0,
                started_at: Some("2026-01-01T10:00:00Z"),
                completed_at: Some("2026-01-01T10:05:00Z"),
            },
            PhaseRow {
                phase: 2,
                status: PhaseStatus::InProgress,
                progress: 42.4,
                started_at: None,
                completed_at: None,
            },
        ]);

        assert!(rendered.contains("✓ completed"));
        assert!(rendered.contains("⟳ in-progress"));
        assert!(rendered.contains("42%"));
    }

    #[test]
    fn test_outputs_table_truncates_preview() {
        let formatter = TableFormatter::with_config(false, None);
        let long = "x".repeat(200);
        let rendered = formatter.format_outputs("Name", [("bible".to_string(), "markdown", long)]);

        assert!(rendered.contains("bible"));
        assert!(rendered.contains("..."));
        assert!(!rendered.contains(&"x".repeat(100)));
    }
}
