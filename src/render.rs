// src/render.rs

//! Result rendering.
//!
//! Maps a [`Verdict`] onto an [`OutputView`]: a declarative description of
//! the output panel (rows of labelled lines plus one container class).
//! Binding the view to a live UI is the host's job; [`to_text`] is the
//! binding used by the terminal.

use serde_json::Value;

use crate::verdict::{display_value, OutcomeKind, TestOutcome, Verdict};

pub const RUNNING_PLACEHOLDER: &str = "⏳ Running test cases...";
pub const SYSTEM_ERROR_TITLE: &str = "❌ System Error";

/// Container class applied to the output panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputClass {
    Success,
    Failure,
    Error,
}

impl OutputClass {
    pub fn css(self) -> &'static str {
        match self {
            OutputClass::Success => "success",
            OutputClass::Failure => "failure",
            OutputClass::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Pass,
    Fail,
    Error,
}

impl RowKind {
    pub fn css(self) -> &'static str {
        match self {
            RowKind::Pass => "test-pass",
            RowKind::Fail => "test-fail",
            RowKind::Error => "test-error",
        }
    }
}

/// One line of a row; `label` is rendered bold in the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub label: Option<&'static str>,
    pub text: String,
}

impl Line {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            label: None,
            text: text.into(),
        }
    }

    fn labelled(label: &'static str, text: impl Into<String>) -> Self {
        Self {
            label: Some(label),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub kind: RowKind,
    pub lines: Vec<Line>,
}

/// Full contents of the output panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputView {
    /// Placeholder shown while a run is in flight (no container class).
    Running,
    Results { class: OutputClass, rows: Vec<Row> },
    SystemError { message: String },
}

impl OutputView {
    pub fn running() -> Self {
        OutputView::Running
    }

    pub fn system_error(message: impl Into<String>) -> Self {
        OutputView::SystemError {
            message: message.into(),
        }
    }

    pub fn class(&self) -> Option<OutputClass> {
        match self {
            OutputView::Running => None,
            OutputView::Results { class, .. } => Some(*class),
            OutputView::SystemError { .. } => Some(OutputClass::Error),
        }
    }

    pub fn rows(&self) -> &[Row] {
        match self {
            OutputView::Results { rows, .. } => rows,
            _ => &[],
        }
    }
}

/// Render a verdict.
///
/// Rows follow server order. The container class comes from the top-level
/// `passed` flag alone, even if individual rows disagree with it.
pub fn render_verdict(verdict: &Verdict) -> OutputView {
    let rows = verdict.details.iter().filter_map(render_outcome).collect();

    let class = if verdict.passed {
        OutputClass::Success
    } else {
        OutputClass::Failure
    };

    OutputView::Results { class, rows }
}

fn render_outcome(outcome: &TestOutcome) -> Option<Row> {
    let index = outcome.index;

    match &outcome.kind {
        OutcomeKind::Passed => Some(Row {
            kind: RowKind::Pass,
            lines: vec![Line::plain(format!("Test Case {} ✓ Passed", index))],
        }),

        OutcomeKind::Failed {
            input,
            expected,
            got,
        } => Some(Row {
            kind: RowKind::Fail,
            lines: vec![
                Line::plain(format!("Test Case {} ✗ Failed", index)),
                Line::labelled("Input:", json_literal(input)),
                Line::labelled("Expected:", display_value(expected)),
                Line::labelled("Got:", display_value(got)),
            ],
        }),

        OutcomeKind::Error { input, error } => {
            let mut lines = vec![Line::plain(format!("Test Case {} ⚠ Error", index))];
            if let Some(input) = input {
                lines.push(Line::labelled("Input:", json_literal(input)));
            }
            lines.push(Line::plain(error.clone()));

            Some(Row {
                kind: RowKind::Error,
                lines,
            })
        }

        OutcomeKind::Unknown(status) => {
            tracing::warn!(index, status = %status, "Dropping test outcome with unknown status");
            None
        }
    }
}

/// Inputs are shown exactly as the server sent them, JSON-encoded.
fn json_literal(value: &Value) -> String {
    value.to_string()
}

/* ---------------- terminal binding ---------------- */

/// Render a view as terminal text.
pub fn to_text(view: &OutputView, use_color: bool) -> String {
    match view {
        OutputView::Running => paint(RUNNING_PLACEHOLDER, "2", use_color),

        OutputView::SystemError { message } => {
            let title = paint(SYSTEM_ERROR_TITLE, "31", use_color);
            format!("{}\n\n{}", title, message)
        }

        OutputView::Results { class, rows } => {
            let mut out = String::new();
            for row in rows {
                let color = match row.kind {
                    RowKind::Pass => "32",
                    RowKind::Fail => "31",
                    RowKind::Error => "33",
                };

                for (i, line) in row.lines.iter().enumerate() {
                    let text = match line.label {
                        Some(label) => format!("  {} {}", label, line.text),
                        None if i == 0 => paint(&line.text, color, use_color),
                        None => format!("  {}", line.text),
                    };
                    out.push_str(&text);
                    out.push('\n');
                }
            }

            let summary = match class {
                OutputClass::Success => paint("PASSED", "32", use_color),
                _ => paint("FAILED", "31", use_color),
            };
            out.push_str(&summary);
            out
        }
    }
}

fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("\x1b[{}m{}\x1b[0m", color, text)
    } else {
        text.to_string()
    }
}
