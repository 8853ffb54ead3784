//! Diagnostic codes with category prefixes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The family a diagnostic code belongs to.
///
/// * `E1xx` lexing and parsing
/// * `E2xx` design and project configuration
/// * `F3xx` external flow and build artifacts
/// * `W...` warnings of any origin
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Category {
    /// Errors in sources or configuration, prefixed `E`.
    Error,
    /// Warnings, prefixed `W`.
    Warning,
    /// Problems reported by or about the external flow, prefixed `F`.
    Flow,
}

impl Category {
    /// The single-letter prefix.
    pub fn prefix(self) -> char {
        match self {
            Category::Error => 'E',
            Category::Warning => 'W',
            Category::Flow => 'F',
        }
    }
}

/// A category plus a three-digit number, displayed as e.g. `E101`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct DiagnosticCode {
    /// The code family.
    pub category: Category,
    /// Number within the family.
    pub number: u16,
}

impl DiagnosticCode {
    /// Unexpected character or malformed literal.
    pub const LEX: DiagnosticCode = DiagnosticCode::new(Category::Error, 100);
    /// Unexpected token.
    pub const SYNTAX: DiagnosticCode = DiagnosticCode::new(Category::Error, 101);
    /// A fileset's top module is not declared in its files.
    pub const TOP_NOT_FOUND: DiagnosticCode = DiagnosticCode::new(Category::Error, 201);
    /// An instantiated module is neither defined nor provided by a library.
    pub const UNRESOLVED_MODULE: DiagnosticCode = DiagnosticCode::new(Category::Error, 202);
    /// A module is defined more than once across a design's files.
    pub const DUPLICATE_MODULE: DiagnosticCode = DiagnosticCode::new(Category::Error, 203);
    /// A hard-macro artifact is missing or empty.
    pub const MISSING_ARTIFACT: DiagnosticCode = DiagnosticCode::new(Category::Flow, 301);
    /// A flow node did not produce outputs.
    pub const NODE_FAILED: DiagnosticCode = DiagnosticCode::new(Category::Flow, 302);
    /// A module is both defined locally and provided by a hard macro.
    pub const SHADOWED_MACRO: DiagnosticCode = DiagnosticCode::new(Category::Warning, 201);

    /// Creates a code.
    pub const fn new(category: Category, number: u16) -> Self {
        Self { category, number }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{:03}", self.category.prefix(), self.number)
    }
}
