//! Source tracking and structured diagnostics.
//!
//! [`SourceMap`] owns the text of every HDL file read during a session and
//! resolves [`Span`]s to line/column locations. [`Diagnostic`]s carry a
//! severity, a code, and an optional span; a [`DiagnosticSink`] collects them
//! and a [`DiagnosticRenderer`] formats them for a terminal or as JSON.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;
pub mod source_map;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, JsonRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
pub use source_map::{FileId, Location, SourceFile, SourceMap, Span};
