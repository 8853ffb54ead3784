//! Structured diagnostic messages.

use crate::code::DiagnosticCode;
use crate::severity::Severity;
use crate::source_map::Span;
use serde::{Deserialize, Serialize};

/// A message about a source file, a design, or a build artifact.
///
/// Diagnostics about HDL text carry a [`Span`]; diagnostics about designs or
/// artifacts (a missing GDS, a library that provides nothing) do not.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Diagnostic {
    /// How serious the problem is.
    pub severity: Severity,
    /// Stable code for the kind of problem.
    pub code: DiagnosticCode,
    /// One-line description.
    pub message: String,
    /// Where in the source the problem was found, if anywhere.
    pub span: Option<Span>,
    /// Short text printed under the caret.
    pub label: Option<String>,
    /// `= note:` lines.
    pub notes: Vec<String>,
    /// `= help:` lines.
    pub help: Vec<String>,
}

impl Diagnostic {
    fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            span: None,
            label: None,
            notes: Vec::new(),
            help: Vec::new(),
        }
    }

    /// Creates an error.
    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    /// Creates a warning.
    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    /// Creates a note.
    pub fn note(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Note, code, message)
    }

    /// Attaches a source location.
    pub fn at(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Attaches a label printed next to the caret.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adds a note.
    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.notes.push(note.into());
        self
    }

    /// Adds a help line.
    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help.push(help.into());
        self
    }
}
