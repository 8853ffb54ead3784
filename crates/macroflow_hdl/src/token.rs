//! Token kinds for the structural Verilog lexer.

use macroflow_diagnostics::Span;
use serde::{Deserialize, Serialize};

/// The kind of a lexed token.
///
/// Only the keywords that delimit structure get their own variant. Operators
/// that never matter to module/port/instance extraction collapse into
/// [`HdlToken::Operator`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum HdlToken {
    // Module structure
    Module,
    Macromodule,
    Endmodule,
    Input,
    Output,
    Inout,

    // Net and variable kinds
    Wire,
    Reg,
    Logic,
    Tri,
    Supply0,
    Supply1,
    Integer,
    Signed,

    // Declarations skipped to the next semicolon
    Parameter,
    Localparam,
    Defparam,
    Assign,
    Genvar,

    // Procedural blocks and statements
    Always,
    AlwaysFf,
    AlwaysComb,
    Initial,
    Begin,
    End,
    Fork,
    Join,
    If,
    Else,
    Case,
    Casex,
    Casez,
    Endcase,
    For,
    While,
    Repeat,
    Forever,
    Function,
    Endfunction,
    Task,
    Endtask,
    Generate,
    Endgenerate,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,
    Colon,
    Dot,
    Hash,
    At,
    Equals,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    /// Any other operator, e.g. `&`, `<=`, `===`.
    Operator,

    // Literals and names
    Identifier,
    EscapedIdentifier,
    SystemIdentifier,
    IntLiteral,
    SizedLiteral,
    RealLiteral,
    StringLiteral,
    /// A compiler directive such as `` `timescale 1ns/1ps``, spanning to end of line.
    Directive,

    Error,
    Eof,
}

impl HdlToken {
    /// Returns `true` for tokens that can name a module, port, or instance.
    pub fn is_identifier(self) -> bool {
        matches!(self, HdlToken::Identifier | HdlToken::EscapedIdentifier)
    }

    /// Returns `true` for `input`, `output`, and `inout`.
    pub fn is_direction(self) -> bool {
        matches!(self, HdlToken::Input | HdlToken::Output | HdlToken::Inout)
    }

    /// Returns `true` for net and variable type keywords.
    pub fn is_net_kind(self) -> bool {
        matches!(
            self,
            HdlToken::Wire
                | HdlToken::Reg
                | HdlToken::Logic
                | HdlToken::Tri
                | HdlToken::Supply0
                | HdlToken::Supply1
                | HdlToken::Integer
        )
    }
}

/// A token with its source span.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub struct Token {
    /// Kind.
    pub kind: HdlToken,
    /// Where the token's text lives.
    pub span: Span,
}

/// Maps keyword text to its token. Verilog keywords are case-sensitive.
pub fn lookup_keyword(s: &str) -> Option<HdlToken> {
    let kind = match s {
        "module" => HdlToken::Module,
        "macromodule" => HdlToken::Macromodule,
        "endmodule" => HdlToken::Endmodule,
        "input" => HdlToken::Input,
        "output" => HdlToken::Output,
        "inout" => HdlToken::Inout,
        "wire" => HdlToken::Wire,
        "reg" => HdlToken::Reg,
        "logic" => HdlToken::Logic,
        "tri" => HdlToken::Tri,
        "supply0" => HdlToken::Supply0,
        "supply1" => HdlToken::Supply1,
        "integer" => HdlToken::Integer,
        "signed" => HdlToken::Signed,
        "parameter" => HdlToken::Parameter,
        "localparam" => HdlToken::Localparam,
        "defparam" => HdlToken::Defparam,
        "assign" => HdlToken::Assign,
        "genvar" => HdlToken::Genvar,
        "always" => HdlToken::Always,
        "always_ff" => HdlToken::AlwaysFf,
        "always_comb" => HdlToken::AlwaysComb,
        "initial" => HdlToken::Initial,
        "begin" => HdlToken::Begin,
        "end" => HdlToken::End,
        "fork" => HdlToken::Fork,
        "join" => HdlToken::Join,
        "if" => HdlToken::If,
        "else" => HdlToken::Else,
        "case" => HdlToken::Case,
        "casex" => HdlToken::Casex,
        "casez" => HdlToken::Casez,
        "endcase" => HdlToken::Endcase,
        "for" => HdlToken::For,
        "while" => HdlToken::While,
        "repeat" => HdlToken::Repeat,
        "forever" => HdlToken::Forever,
        "function" => HdlToken::Function,
        "endfunction" => HdlToken::Endfunction,
        "task" => HdlToken::Task,
        "endtask" => HdlToken::Endtask,
        "generate" => HdlToken::Generate,
        "endgenerate" => HdlToken::Endgenerate,
        _ => return None,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keywords_are_case_sensitive() {
        assert_eq!(lookup_keyword("module"), Some(HdlToken::Module));
        assert_eq!(lookup_keyword("Module"), None);
        assert_eq!(lookup_keyword("always_ff"), Some(HdlToken::AlwaysFf));
        assert_eq!(lookup_keyword("clk"), None);
    }

    #[test]
    fn classification() {
        assert!(HdlToken::Output.is_direction());
        assert!(!HdlToken::Wire.is_direction());
        assert!(HdlToken::Reg.is_net_kind());
        assert!(HdlToken::EscapedIdentifier.is_identifier());
        assert!(!HdlToken::SystemIdentifier.is_identifier());
    }
}
