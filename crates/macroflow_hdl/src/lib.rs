//! Structural Verilog front end.
//!
//! Reads just enough of Verilog-2005 (plus a few common SystemVerilog
//! spellings) to answer the questions a hard-macro build asks before handing
//! sources to the flow: which modules a file set defines, what their ports
//! look like, and which modules they instantiate.
//!
//! - [`lexer`] turns text into tokens.
//! - [`parser`] builds a [`SourceUnit`] and skips behavioral code.
//! - [`query`] answers width, connection, and definition questions.

pub mod ast;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod token;

pub use ast::{Direction, Instance, ModuleDecl, NetKind, Port, SourceUnit};
pub use query::ModuleIndex;
pub use token::{HdlToken, Token};

use macroflow_common::Interner;
use macroflow_diagnostics::{DiagnosticSink, FileId, SourceMap};

/// Lexes and parses one file's text.
pub fn parse_source(
    source: &str,
    file: FileId,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> SourceUnit {
    let tokens = lexer::lex(source, file, sink);
    parser::HdlParser::new(tokens, source, interner, sink).parse_source_unit()
}

/// Parses a file already loaded into `sources`.
pub fn parse_file(
    sources: &SourceMap,
    file: FileId,
    interner: &Interner,
    sink: &DiagnosticSink,
) -> SourceUnit {
    parse_source(&sources.file(file).content, file, interner, sink)
}
