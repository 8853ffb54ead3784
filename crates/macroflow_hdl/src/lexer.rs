//! Byte-level lexer for structural Verilog.
//!
//! Whitespace, `//` and `/* */` comments, and `(* ... *)` attribute instances
//! are dropped. Compiler directives become a single [`HdlToken::Directive`]
//! token so the parser can step over them. Malformed input is reported as
//! `E100` and yields an [`HdlToken::Error`] token; lexing always continues.

use crate::token::{lookup_keyword, HdlToken, Token};
use macroflow_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, FileId, Span};

/// Splits `source` into tokens. The result always ends with [`HdlToken::Eof`].
pub fn lex(source: &str, file: FileId, sink: &DiagnosticSink) -> Vec<Token> {
    let mut lexer = Lexer {
        bytes: source.as_bytes(),
        pos: 0,
        file,
        sink,
    };
    let mut tokens = Vec::new();
    loop {
        lexer.skip_trivia();
        if lexer.pos >= lexer.bytes.len() {
            let end = lexer.pos as u32;
            tokens.push(Token {
                kind: HdlToken::Eof,
                span: Span::new(file, end, end),
            });
            return tokens;
        }
        tokens.push(lexer.token());
    }
}

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
    file: FileId,
    sink: &'a DiagnosticSink,
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_continue(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_' || b == b'$'
}

impl Lexer<'_> {
    fn byte(&self, offset: usize) -> u8 {
        self.bytes.get(self.pos + offset).copied().unwrap_or(0)
    }

    fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while self.pos < self.bytes.len() && pred(self.bytes[self.pos]) {
            self.pos += 1;
        }
    }

    fn finish(&self, kind: HdlToken, start: usize) -> Token {
        Token {
            kind,
            span: Span::new(self.file, start as u32, self.pos as u32),
        }
    }

    fn fail(&self, message: &str, start: usize) -> Token {
        let token = self.finish(HdlToken::Error, start);
        self.sink
            .emit(Diagnostic::error(DiagnosticCode::LEX, message).at(token.span));
        token
    }

    fn skip_until(&mut self, end: &[u8]) -> bool {
        while self.pos < self.bytes.len() {
            if self.bytes[self.pos..].starts_with(end) {
                self.pos += end.len();
                return true;
            }
            self.pos += 1;
        }
        false
    }

    fn skip_trivia(&mut self) {
        loop {
            self.eat_while(|b| b.is_ascii_whitespace());
            let start = self.pos;
            match (self.byte(0), self.byte(1)) {
                (b'/', b'/') => self.eat_while(|b| b != b'\n'),
                (b'/', b'*') => {
                    self.pos += 2;
                    if !self.skip_until(b"*/") {
                        self.fail("unterminated block comment", start);
                    }
                }
                // `@(*)` is a sensitivity list, not an attribute.
                (b'(', b'*') if self.byte(2) != b')' => {
                    self.pos += 2;
                    if !self.skip_until(b"*)") {
                        self.fail("unterminated attribute instance", start);
                    }
                }
                _ => return,
            }
        }
    }

    fn token(&mut self) -> Token {
        let start = self.pos;
        let b = self.byte(0);
        if is_ident_start(b) {
            self.eat_while(is_ident_continue);
            let text = std::str::from_utf8(&self.bytes[start..self.pos]).unwrap_or("");
            let kind = lookup_keyword(text).unwrap_or(HdlToken::Identifier);
            return self.finish(kind, start);
        }
        match b {
            b'\\' => {
                self.pos += 1;
                self.eat_while(|b| !b.is_ascii_whitespace());
                if self.pos == start + 1 {
                    return self.fail("empty escaped identifier", start);
                }
                self.finish(HdlToken::EscapedIdentifier, start)
            }
            b'$' => {
                self.pos += 1;
                if !is_ident_start(self.byte(0)) {
                    return self.fail("expected a name after '$'", start);
                }
                self.eat_while(is_ident_continue);
                self.finish(HdlToken::SystemIdentifier, start)
            }
            b'`' => {
                self.eat_while(|b| b != b'\n');
                self.finish(HdlToken::Directive, start)
            }
            b'"' => self.string(start),
            b'0'..=b'9' => self.number(start),
            b'\'' if matches!(self.byte(1).to_ascii_lowercase(), b's' | b'b' | b'o' | b'd' | b'h') => {
                self.based_digits(start)
            }
            _ => self.punct(start),
        }
    }

    fn string(&mut self, start: usize) -> Token {
        self.pos += 1;
        loop {
            match self.byte(0) {
                0 | b'\n' => return self.fail("unterminated string literal", start),
                b'\\' => self.pos += 2,
                b'"' => {
                    self.pos += 1;
                    return self.finish(HdlToken::StringLiteral, start);
                }
                _ => self.pos += 1,
            }
        }
    }

    fn number(&mut self, start: usize) -> Token {
        self.eat_while(|b| b.is_ascii_digit() || b == b'_');
        // A size may be separated from its base by whitespace: `8 'hFF`.
        let after_size = self.pos;
        self.eat_while(|b| b == b' ' || b == b'\t');
        if self.byte(0) == b'\'' {
            return self.based_digits(start);
        }
        self.pos = after_size;

        let mut real = false;
        if self.byte(0) == b'.' && self.byte(1).is_ascii_digit() {
            self.pos += 1;
            self.eat_while(|b| b.is_ascii_digit() || b == b'_');
            real = true;
        }
        if matches!(self.byte(0), b'e' | b'E') {
            self.pos += 1;
            if matches!(self.byte(0), b'+' | b'-') {
                self.pos += 1;
            }
            self.eat_while(|b| b.is_ascii_digit() || b == b'_');
            real = true;
        }
        let kind = if real {
            HdlToken::RealLiteral
        } else {
            HdlToken::IntLiteral
        };
        self.finish(kind, start)
    }

    /// Lexes `'[s]<base><digits>`, with `self.pos` on the tick.
    fn based_digits(&mut self, start: usize) -> Token {
        self.pos += 1;
        if matches!(self.byte(0), b's' | b'S') {
            self.pos += 1;
        }
        let base = self.byte(0).to_ascii_lowercase();
        if !matches!(base, b'b' | b'o' | b'd' | b'h') {
            return self.fail("expected a base (b, o, d, h) after '", start);
        }
        self.pos += 1;
        self.eat_while(|b| b == b' ' || b == b'\t');
        let digits_start = self.pos;
        self.eat_while(|b| {
            let b = b.to_ascii_lowercase();
            let in_base = match base {
                b'b' => matches!(b, b'0' | b'1'),
                b'o' => matches!(b, b'0'..=b'7'),
                b'd' => b.is_ascii_digit(),
                _ => b.is_ascii_hexdigit(),
            };
            in_base || matches!(b, b'x' | b'z' | b'?' | b'_')
        });
        if self.pos == digits_start {
            return self.fail("based literal has no digits", start);
        }
        self.finish(HdlToken::SizedLiteral, start)
    }

    fn punct(&mut self, start: usize) -> Token {
        let b = self.byte(0);
        self.pos += 1;
        let kind = match b {
            b'(' => HdlToken::LeftParen,
            b')' => HdlToken::RightParen,
            b'[' => HdlToken::LeftBracket,
            b']' => HdlToken::RightBracket,
            b'{' => HdlToken::LeftBrace,
            b'}' => HdlToken::RightBrace,
            b',' => HdlToken::Comma,
            b';' => HdlToken::Semicolon,
            b':' => HdlToken::Colon,
            b'.' => HdlToken::Dot,
            b'#' => HdlToken::Hash,
            b'@' => HdlToken::At,
            b'+' => HdlToken::Plus,
            b'-' => HdlToken::Minus,
            b'/' => HdlToken::Slash,
            b'%' => HdlToken::Percent,
            b'*' if self.byte(0) == b'*' => {
                self.pos += 1;
                HdlToken::Operator
            }
            b'*' => HdlToken::Star,
            b'=' if self.byte(0) != b'=' => HdlToken::Equals,
            b'=' | b'!' | b'<' | b'>' | b'&' | b'|' | b'^' | b'~' | b'?' => {
                // Greedily take the rest of a multi-character operator.
                self.eat_while(|b| matches!(b, b'=' | b'<' | b'>' | b'&' | b'|' | b'^' | b'~'));
                HdlToken::Operator
            }
            _ => return self.fail(&format!("unexpected character '{}'", b as char), start),
        };
        self.finish(kind, start)
    }
}
