//! Recursive descent over the token stream, keeping only structure.
//!
//! Module headers, port and net declarations, parameters, and instantiations
//! become AST nodes. `always`/`initial` blocks, continuous assignments,
//! functions, tasks, and generate regions are skipped by bracket and keyword
//! matching. Errors go to the sink as `E101` and the parser resynchronizes at
//! the next `;` or `endmodule`.

use crate::ast::*;
use crate::token::{HdlToken, Token};
use macroflow_common::{Ident, Interner};
use macroflow_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink, Span};

/// Parser state for one file.
pub struct HdlParser<'src> {
    tokens: Vec<Token>,
    pos: usize,
    source: &'src str,
    interner: &'src Interner,
    sink: &'src DiagnosticSink,
}

#[derive(Clone)]
struct PortShape {
    direction: Direction,
    kind: Option<NetKind>,
    signed: bool,
    range: Option<Range>,
}

impl<'src> HdlParser<'src> {
    /// Creates a parser over tokens lexed from `source`.
    pub fn new(
        tokens: Vec<Token>,
        source: &'src str,
        interner: &'src Interner,
        sink: &'src DiagnosticSink,
    ) -> Self {
        Self {
            tokens,
            pos: 0,
            source,
            interner,
            sink,
        }
    }

    fn current(&self) -> HdlToken {
        self.tokens[self.pos].kind
    }

    fn peek(&self, n: usize) -> HdlToken {
        self.tokens
            .get(self.pos + n)
            .map_or(HdlToken::Eof, |t| t.kind)
    }

    fn span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn prev_span(&self) -> Span {
        self.tokens[self.pos.saturating_sub(1)].span
    }

    fn text(&self, span: Span) -> &'src str {
        &self.source[span.start as usize..span.end as usize]
    }

    fn at(&self, kind: HdlToken) -> bool {
        self.current() == kind
    }

    fn at_eof(&self) -> bool {
        self.at(HdlToken::Eof)
    }

    fn advance(&mut self) -> Token {
        let token = self.tokens[self.pos];
        if token.kind != HdlToken::Eof {
            self.pos += 1;
        }
        token
    }

    fn eat(&mut self, kind: HdlToken) -> bool {
        if self.at(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>, span: Span) {
        self.sink
            .emit(Diagnostic::error(DiagnosticCode::SYNTAX, message).at(span));
    }

    fn found(&self) -> String {
        if self.at_eof() {
            "end of file".to_string()
        } else {
            format!("`{}`", self.text(self.span()))
        }
    }

    fn expect(&mut self, kind: HdlToken, what: &str) -> Option<Span> {
        if self.at(kind) {
            Some(self.advance().span)
        } else {
            self.error(format!("expected {what}, found {}", self.found()), self.span());
            None
        }
    }

    fn intern(&self, span: Span) -> Ident {
        let text = self.text(span);
        self.interner
            .get_or_intern(text.strip_prefix('\\').unwrap_or(text))
    }

    fn expect_ident(&mut self, what: &str) -> Option<(Ident, Span)> {
        if self.current().is_identifier() {
            let span = self.advance().span;
            Some((self.intern(span), span))
        } else {
            self.error(format!("expected {what}, found {}", self.found()), self.span());
            None
        }
    }

    /// Advances until one of `stops` at bracket depth zero, `endmodule`, or
    /// end of file. The stop token is not consumed.
    fn skip_until(&mut self, stops: &[HdlToken]) {
        let mut depth = 0usize;
        loop {
            let kind = self.current();
            if matches!(kind, HdlToken::Eof | HdlToken::Endmodule) {
                return;
            }
            if depth == 0 && stops.contains(&kind) {
                return;
            }
            match kind {
                HdlToken::LeftParen | HdlToken::LeftBracket | HdlToken::LeftBrace => depth += 1,
                HdlToken::RightParen | HdlToken::RightBracket | HdlToken::RightBrace => {
                    depth = depth.saturating_sub(1)
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Skips a bracketed group starting at the current opening token.
    fn skip_group(&mut self) {
        let mut depth = 0usize;
        loop {
            match self.current() {
                HdlToken::Eof => return,
                HdlToken::LeftParen | HdlToken::LeftBracket | HdlToken::LeftBrace => depth += 1,
                HdlToken::RightParen | HdlToken::RightBracket | HdlToken::RightBrace => {
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        self.advance();
                        return;
                    }
                }
                _ => {}
            }
            self.advance();
        }
    }

    fn skip_to_semicolon(&mut self) {
        self.skip_until(&[HdlToken::Semicolon]);
        self.eat(HdlToken::Semicolon);
    }

    // Source file and module header

    /// Parses every module in the file.
    pub fn parse_source_unit(&mut self) -> SourceUnit {
        let start = self.span();
        let mut modules = Vec::new();
        while !self.at_eof() {
            match self.current() {
                HdlToken::Module | HdlToken::Macromodule => {
                    if let Some(module) = self.parse_module() {
                        modules.push(module);
                    }
                }
                HdlToken::Directive => {
                    self.advance();
                }
                _ => {
                    self.error(
                        format!("expected `module`, found {}", self.found()),
                        self.span(),
                    );
                    while !matches!(
                        self.current(),
                        HdlToken::Module | HdlToken::Macromodule | HdlToken::Eof
                    ) {
                        self.advance();
                    }
                }
            }
        }
        SourceUnit {
            modules,
            span: start.to(self.span()),
        }
    }

    fn parse_module(&mut self) -> Option<ModuleDecl> {
        let start = self.advance().span;
        let Some((name, name_span)) = self.expect_ident("module name") else {
            while !matches!(self.current(), HdlToken::Endmodule | HdlToken::Eof) {
                self.advance();
            }
            self.eat(HdlToken::Endmodule);
            return None;
        };
        let mut module = ModuleDecl {
            name,
            name_span,
            params: Vec::new(),
            ports: Vec::new(),
            nets: Vec::new(),
            instances: Vec::new(),
            span: start,
        };

        if self.eat(HdlToken::Hash) {
            self.parse_parameter_ports(&mut module);
        }
        if self.at(HdlToken::LeftParen) {
            self.parse_port_list(&mut module);
        }
        if self.expect(HdlToken::Semicolon, "`;` after the module header").is_none() {
            self.skip_to_semicolon();
        }

        while !matches!(
            self.current(),
            HdlToken::Endmodule | HdlToken::Module | HdlToken::Macromodule | HdlToken::Eof
        ) {
            self.parse_module_item(&mut module);
        }
        let end = self
            .expect(HdlToken::Endmodule, "`endmodule`")
            .unwrap_or_else(|| self.prev_span());
        if self.at(HdlToken::Colon) && self.peek(1).is_identifier() {
            self.advance();
            self.advance();
        }
        module.span = start.to(end);

        for port in module.ports.iter().filter(|p| p.direction.is_none()) {
            self.error(
                format!(
                    "port `{}` is listed in the header but never declared",
                    self.interner.resolve(port.name)
                ),
                port.span,
            );
        }
        Some(module)
    }

    fn parse_parameter_ports(&mut self, module: &mut ModuleDecl) {
        if self.expect(HdlToken::LeftParen, "`(` after `#`").is_none() {
            return;
        }
        while !self.at(HdlToken::RightParen) && !self.at_eof() {
            let start = self.span();
            let local = self.at(HdlToken::Localparam);
            self.eat(HdlToken::Parameter);
            self.eat(HdlToken::Localparam);
            self.eat(HdlToken::Integer);
            self.eat(HdlToken::Signed);
            if self.at(HdlToken::LeftBracket) {
                self.skip_group();
            }
            let Some((name, _)) = self.expect_ident("parameter name") else {
                self.skip_until(&[HdlToken::Comma, HdlToken::RightParen]);
                if !self.eat(HdlToken::Comma) {
                    break;
                }
                continue;
            };
            let value = if self.eat(HdlToken::Equals) {
                Some(self.parse_const_expr(&[HdlToken::Comma, HdlToken::RightParen]))
            } else {
                None
            };
            module.params.push(Param {
                name,
                local,
                value,
                span: start.to(self.prev_span()),
            });
            if !self.eat(HdlToken::Comma) {
                break;
            }
        }
        self.expect(HdlToken::RightParen, "`)` to close the parameter list");
    }

    fn parse_port_list(&mut self, module: &mut ModuleDecl) {
        self.advance();
        if self.eat(HdlToken::RightParen) {
            return;
        }
        let ansi = self.current().is_direction();
        let mut shape: Option<PortShape> = None;
        loop {
            let start = self.span();
            if self.current().is_direction() {
                shape = Some(self.parse_port_shape());
            } else if ansi && shape.is_none() {
                self.error("expected a port direction", start);
            }
            let Some((name, _)) = self.expect_ident("port name") else {
                self.skip_until(&[HdlToken::Comma, HdlToken::RightParen]);
                if !self.eat(HdlToken::Comma) {
                    break;
                }
                continue;
            };
            while self.at(HdlToken::LeftBracket) {
                self.skip_group();
            }
            if self.eat(HdlToken::Equals) {
                self.skip_until(&[HdlToken::Comma, HdlToken::RightParen]);
            }
            let span = start.to(self.prev_span());
            let port = match &shape {
                Some(shape) => Port {
                    name,
                    direction: Some(shape.direction),
                    kind: shape.kind,
                    signed: shape.signed,
                    range: shape.range.clone(),
                    span,
                },
                None => Port {
                    name,
                    direction: None,
                    kind: None,
                    signed: false,
                    range: None,
                    span,
                },
            };
            module.ports.push(port);
            if !self.eat(HdlToken::Comma) {
                break;
            }
        }
        self.expect(HdlToken::RightParen, "`)` to close the port list");
    }

    /// `input wire signed [7:0]`, with the direction as the current token.
    fn parse_port_shape(&mut self) -> PortShape {
        let direction = match self.advance().kind {
            HdlToken::Input => Direction::Input,
            HdlToken::Output => Direction::Output,
            _ => Direction::Inout,
        };
        let kind = self.eat_net_kind();
        let signed = self.eat(HdlToken::Signed);
        let range = if self.at(HdlToken::LeftBracket) {
            self.parse_range()
        } else {
            None
        };
        PortShape {
            direction,
            kind,
            signed,
            range,
        }
    }

    fn eat_net_kind(&mut self) -> Option<NetKind> {
        let kind = match self.current() {
            HdlToken::Wire => NetKind::Wire,
            HdlToken::Reg => NetKind::Reg,
            HdlToken::Logic => NetKind::Logic,
            HdlToken::Tri => NetKind::Tri,
            HdlToken::Supply0 => NetKind::Supply0,
            HdlToken::Supply1 => NetKind::Supply1,
            HdlToken::Integer => NetKind::Integer,
            _ => return None,
        };
        self.advance();
        Some(kind)
    }

    fn parse_range(&mut self) -> Option<Range> {
        let start = self.advance().span;
        let msb = self.parse_const_expr(&[HdlToken::Colon, HdlToken::RightBracket]);
        if !self.eat(HdlToken::Colon) {
            self.error("expected `:` in range", self.span());
            self.skip_until(&[HdlToken::RightBracket]);
            self.eat(HdlToken::RightBracket);
            return None;
        }
        let lsb = self.parse_const_expr(&[HdlToken::RightBracket]);
        let end = self.expect(HdlToken::RightBracket, "`]`")?;
        Some(Range {
            msb,
            lsb,
            span: start.to(end),
        })
    }

    // Module body

    fn parse_module_item(&mut self, module: &mut ModuleDecl) {
        match self.current() {
            HdlToken::Input | HdlToken::Output | HdlToken::Inout => {
                self.parse_port_declaration(module)
            }
            kind if kind.is_net_kind() => self.parse_net_declaration(module),
            HdlToken::Parameter | HdlToken::Localparam => self.parse_param_declaration(module),
            HdlToken::Defparam | HdlToken::Assign | HdlToken::Genvar => self.skip_to_semicolon(),
            HdlToken::Always | HdlToken::AlwaysFf | HdlToken::AlwaysComb | HdlToken::Initial => {
                self.advance();
                self.skip_statement();
            }
            HdlToken::Function => self.skip_block(&[HdlToken::Function], HdlToken::Endfunction),
            HdlToken::Task => self.skip_block(&[HdlToken::Task], HdlToken::Endtask),
            HdlToken::Generate => self.skip_block(&[HdlToken::Generate], HdlToken::Endgenerate),
            HdlToken::Identifier | HdlToken::EscapedIdentifier => {
                self.parse_instantiation(module)
            }
            HdlToken::Directive | HdlToken::Semicolon => {
                self.advance();
            }
            _ => {
                self.error(
                    format!("expected a module item, found {}", self.found()),
                    self.span(),
                );
                self.skip_to_semicolon();
            }
        }
    }

    fn parse_port_declaration(&mut self, module: &mut ModuleDecl) {
        let start = self.span();
        let shape = self.parse_port_shape();
        loop {
            let Some((name, name_span)) = self.expect_ident("port name") else {
                self.skip_to_semicolon();
                return;
            };
            let span = start.to(name_span);
            match module.ports.iter_mut().find(|p| p.name == name) {
                Some(port) if port.direction.is_some() => self.error(
                    format!(
                        "port `{}` is declared more than once",
                        self.interner.resolve(name)
                    ),
                    name_span,
                ),
                Some(port) => {
                    port.direction = Some(shape.direction);
                    port.kind = shape.kind;
                    port.signed = shape.signed;
                    port.range = shape.range.clone();
                    port.span = span;
                }
                None => self.error(
                    format!(
                        "`{}` is not in the module's port list",
                        self.interner.resolve(name)
                    ),
                    name_span,
                ),
            }
            if !self.eat(HdlToken::Comma) {
                break;
            }
        }
        self.expect(HdlToken::Semicolon, "`;`");
    }

    fn parse_net_declaration(&mut self, module: &mut ModuleDecl) {
        let start = self.span();
        let Some(kind) = self.eat_net_kind() else {
            return;
        };
        if self.eat(HdlToken::Hash) {
            if self.at(HdlToken::LeftParen) {
                self.skip_group();
            } else {
                self.advance();
            }
        }
        let signed = self.eat(HdlToken::Signed);
        let range = if self.at(HdlToken::LeftBracket) {
            self.parse_range()
        } else {
            None
        };
        loop {
            let Some((name, name_span)) = self.expect_ident("net name") else {
                self.skip_to_semicolon();
                return;
            };
            while self.at(HdlToken::LeftBracket) {
                self.skip_group();
            }
            if self.eat(HdlToken::Equals) {
                self.skip_until(&[HdlToken::Comma, HdlToken::Semicolon]);
            }
            if let Some(port) = module.ports.iter_mut().find(|p| p.name == name) {
                // `output y; reg [7:0] y;` refines the port.
                port.kind = Some(kind);
                port.signed |= signed;
                if port.range.is_none() {
                    port.range = range.clone();
                }
            } else if module.nets.iter().any(|n| n.name == name) {
                self.error(
                    format!("`{}` is declared more than once", self.interner.resolve(name)),
                    name_span,
                );
            } else {
                module.nets.push(Net {
                    name,
                    kind,
                    signed,
                    range: range.clone(),
                    span: start.to(name_span),
                });
            }
            if !self.eat(HdlToken::Comma) {
                break;
            }
        }
        self.expect(HdlToken::Semicolon, "`;`");
    }

    fn parse_param_declaration(&mut self, module: &mut ModuleDecl) {
        let start = self.span();
        let local = self.advance().kind == HdlToken::Localparam;
        self.eat(HdlToken::Integer);
        self.eat(HdlToken::Signed);
        if self.at(HdlToken::LeftBracket) {
            self.skip_group();
        }
        loop {
            let Some((name, _)) = self.expect_ident("parameter name") else {
                self.skip_to_semicolon();
                return;
            };
            let value = if self.expect(HdlToken::Equals, "`=`").is_some() {
                Some(self.parse_const_expr(&[HdlToken::Comma, HdlToken::Semicolon]))
            } else {
                self.skip_until(&[HdlToken::Comma, HdlToken::Semicolon]);
                None
            };
            module.params.push(Param {
                name,
                local,
                value,
                span: start.to(self.prev_span()),
            });
            if !self.eat(HdlToken::Comma) {
                break;
            }
        }
        self.expect(HdlToken::Semicolon, "`;`");
    }

    fn parse_instantiation(&mut self, module: &mut ModuleDecl) {
        let module_span = self.advance().span;
        let module_name = self.intern(module_span);
        let mut params = Vec::new();
        if self.eat(HdlToken::Hash) {
            if self.at(HdlToken::LeftParen) {
                params = self.parse_connections();
            } else {
                self.advance();
            }
        }
        loop {
            let start = self.span();
            let Some((name, _)) = self.expect_ident("instance name") else {
                self.skip_to_semicolon();
                return;
            };
            while self.at(HdlToken::LeftBracket) {
                self.skip_group();
            }
            let connections = if self.at(HdlToken::LeftParen) {
                self.parse_connections()
            } else {
                self.error(
                    format!("expected `(` after instance name, found {}", self.found()),
                    self.span(),
                );
                Vec::new()
            };
            module.instances.push(Instance {
                module: module_name,
                module_span,
                name,
                params: params.clone(),
                connections,
                span: module_span.to(self.prev_span()).to(start),
            });
            if !self.eat(HdlToken::Comma) {
                break;
            }
        }
        if self.expect(HdlToken::Semicolon, "`;` after instantiation").is_none() {
            self.skip_to_semicolon();
        }
    }

    fn parse_connections(&mut self) -> Vec<Connection> {
        self.advance();
        let mut connections = Vec::new();
        if self.eat(HdlToken::RightParen) {
            return connections;
        }
        loop {
            let start = self.span();
            if self.eat(HdlToken::Dot) {
                let Some((formal, formal_span)) = self.expect_ident("port name after `.`") else {
                    self.skip_until(&[HdlToken::Comma, HdlToken::RightParen]);
                    if !self.eat(HdlToken::Comma) {
                        break;
                    }
                    continue;
                };
                let actual = if self.eat(HdlToken::LeftParen) {
                    let actual = if self.at(HdlToken::RightParen) {
                        None
                    } else {
                        self.parse_actual(&[HdlToken::RightParen])
                    };
                    self.expect(HdlToken::RightParen, "`)`");
                    actual
                } else {
                    // `.clk` connects to the net of the same name.
                    Some(Actual {
                        span: formal_span,
                        net: Some(formal),
                    })
                };
                connections.push(Connection {
                    formal: Some(formal),
                    actual,
                    span: start.to(self.prev_span()),
                });
            } else {
                let actual = if matches!(self.current(), HdlToken::Comma | HdlToken::RightParen) {
                    None
                } else {
                    self.parse_actual(&[HdlToken::Comma, HdlToken::RightParen])
                };
                let span = actual.as_ref().map_or(start, |a| a.span);
                connections.push(Connection {
                    formal: None,
                    actual,
                    span,
                });
            }
            if !self.eat(HdlToken::Comma) {
                break;
            }
        }
        self.expect(HdlToken::RightParen, "`)` to close the connection list");
        connections
    }

    fn parse_actual(&mut self, stops: &[HdlToken]) -> Option<Actual> {
        let first = self.pos;
        self.skip_until(stops);
        if self.pos == first {
            return None;
        }
        let head = self.tokens[first];
        let net = (self.pos - first == 1 && head.kind.is_identifier()).then(|| self.intern(head.span));
        Some(Actual {
            span: head.span.to(self.prev_span()),
            net,
        })
    }

    // Constant expressions

    /// Parses up to the first of `stops`, falling back to
    /// [`ConstExpr::Opaque`] for anything that is not integer arithmetic.
    fn parse_const_expr(&mut self, stops: &[HdlToken]) -> ConstExpr {
        let first = self.pos;
        if let Some(expr) = self.const_expr_bp(0) {
            if stops.contains(&self.current()) {
                return expr;
            }
        }
        self.pos = first;
        self.skip_until(stops);
        let span = if self.pos > first {
            self.tokens[first].span.to(self.prev_span())
        } else {
            self.span()
        };
        ConstExpr::Opaque(span)
    }

    fn const_expr_bp(&mut self, min_bp: u8) -> Option<ConstExpr> {
        let mut lhs = match self.current() {
            HdlToken::IntLiteral | HdlToken::SizedLiteral => {
                let value = parse_int_literal(self.text(self.span()))?;
                self.advance();
                ConstExpr::Number(value)
            }
            HdlToken::Identifier | HdlToken::EscapedIdentifier => {
                let span = self.advance().span;
                ConstExpr::Name(self.intern(span))
            }
            HdlToken::LeftParen => {
                self.advance();
                let inner = self.const_expr_bp(0)?;
                if !self.eat(HdlToken::RightParen) {
                    return None;
                }
                inner
            }
            HdlToken::Minus => {
                self.advance();
                ConstExpr::Negate(Box::new(self.const_expr_bp(5)?))
            }
            HdlToken::Plus => {
                self.advance();
                self.const_expr_bp(5)?
            }
            _ => return None,
        };
        loop {
            let (op, bp) = match self.current() {
                HdlToken::Plus => (BinOp::Add, 1),
                HdlToken::Minus => (BinOp::Sub, 1),
                HdlToken::Star => (BinOp::Mul, 3),
                HdlToken::Slash => (BinOp::Div, 3),
                HdlToken::Percent => (BinOp::Mod, 3),
                _ => break,
            };
            if bp < min_bp {
                break;
            }
            self.advance();
            let rhs = self.const_expr_bp(bp + 1)?;
            lhs = ConstExpr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Some(lhs)
    }

    // Behavioral code

    fn skip_block(&mut self, opens: &[HdlToken], close: HdlToken) {
        let start = self.advance().span;
        let mut depth = 1usize;
        while depth > 0 {
            match self.current() {
                HdlToken::Eof | HdlToken::Endmodule => {
                    self.error("unterminated block", start);
                    return;
                }
                kind if opens.contains(&kind) => depth += 1,
                kind if kind == close => depth -= 1,
                _ => {}
            }
            self.advance();
        }
    }

    fn skip_statement(&mut self) {
        match self.current() {
            HdlToken::At | HdlToken::Hash => {
                self.advance();
                if self.at(HdlToken::LeftParen) {
                    self.skip_group();
                } else if !self.at(HdlToken::Semicolon) {
                    self.advance();
                }
                self.skip_statement();
            }
            HdlToken::Begin | HdlToken::Fork => {
                let close = if self.advance().kind == HdlToken::Begin {
                    HdlToken::End
                } else {
                    HdlToken::Join
                };
                self.skip_label();
                while !matches!(self.current(), HdlToken::Endmodule | HdlToken::Eof)
                    && !self.at(close)
                {
                    self.skip_statement();
                }
                if self.eat(close) {
                    self.skip_label();
                } else {
                    self.error("unterminated `begin`/`fork` block", self.span());
                }
            }
            HdlToken::If => {
                self.advance();
                if self.at(HdlToken::LeftParen) {
                    self.skip_group();
                }
                self.skip_statement();
                if self.eat(HdlToken::Else) {
                    self.skip_statement();
                }
            }
            HdlToken::Case | HdlToken::Casex | HdlToken::Casez => {
                self.skip_block(
                    &[HdlToken::Case, HdlToken::Casex, HdlToken::Casez],
                    HdlToken::Endcase,
                );
            }
            HdlToken::For | HdlToken::While | HdlToken::Repeat => {
                self.advance();
                if self.at(HdlToken::LeftParen) {
                    self.skip_group();
                }
                self.skip_statement();
            }
            HdlToken::Forever => {
                self.advance();
                self.skip_statement();
            }
            HdlToken::Semicolon => {
                self.advance();
            }
            HdlToken::Endmodule | HdlToken::Eof => {}
            _ => self.skip_to_semicolon(),
        }
    }

    fn skip_label(&mut self) {
        if self.at(HdlToken::Colon) && self.peek(1).is_identifier() {
            self.advance();
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use macroflow_diagnostics::FileId;

    fn parse(src: &str) -> (SourceUnit, Interner, DiagnosticSink) {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let tokens = lex(src, FileId::from_raw(0), &sink);
        let unit = HdlParser::new(tokens, src, &interner, &sink).parse_source_unit();
        (unit, interner, sink)
    }

    fn name(interner: &Interner, id: Ident) -> &str {
        interner.resolve(id)
    }

    #[test]
    fn ansi_ports_inherit_shape() {
        let (unit, interner, sink) =
            parse("module m(input wire [7:0] a, b, output reg y, input clk); endmodule");
        assert!(!sink.has_errors());
        let m = &unit.modules[0];
        assert_eq!(m.ports.len(), 4);
        assert_eq!(name(&interner, m.ports[1].name), "b");
        assert_eq!(m.ports[1].direction, Some(Direction::Input));
        assert!(m.ports[1].range.is_some());
        assert_eq!(m.ports[2].kind, Some(NetKind::Reg));
        assert!(m.ports[2].range.is_none());
        assert!(m.ports[3].range.is_none());
    }

    #[test]
    fn non_ansi_ports_filled_from_body() {
        let (unit, _, sink) = parse(
            "module m(a, y);\n  input [3:0] a;\n  output y;\n  reg y;\nendmodule",
        );
        assert!(!sink.has_errors());
        let m = &unit.modules[0];
        assert_eq!(m.ports[0].direction, Some(Direction::Input));
        assert_eq!(m.ports[1].direction, Some(Direction::Output));
        assert_eq!(m.ports[1].kind, Some(NetKind::Reg));
        assert!(m.nets.is_empty());
    }

    #[test]
    fn undeclared_header_port() {
        let (_, _, sink) = parse("module m(a, y);\n  input a;\nendmodule");
        assert_eq!(sink.error_count(), 1);
        assert!(sink.diagnostics()[0].message.contains("`y`"));
    }

    #[test]
    fn body_port_not_in_header() {
        let (_, _, sink) = parse("module m(a);\n input a;\n output z;\nendmodule");
        assert!(sink.has_errors());
    }

    #[test]
    fn behavioral_code_skipped() {
        let (unit, _, sink) = parse(
            r#"
module m(input clk, input [1:0] s, output reg [3:0] q);
  wire [3:0] n = 4'b0;
  assign n = {s, s};
  always @(posedge clk) begin : seq
    case (s)
      2'd0: q <= 4'h1;
      default: begin q <= n; end
    endcase
    if (s == 2'b11) q <= 0; else q <= q + 1;
  end
  initial begin
    $display("q=%d", q);
    forever #5 ;
  end
  function [3:0] inc(input [3:0] v);
    begin inc = v + 1; end
  endfunction
endmodule
"#,
        );
        assert!(!sink.has_errors(), "{:?}", sink.diagnostics());
        let m = &unit.modules[0];
        assert_eq!(m.nets.len(), 1);
        assert!(m.instances.is_empty());
    }

    #[test]
    fn instantiation_named_and_positional() {
        let (unit, interner, sink) = parse(
            "module top(input clk, input [7:0] d);\n  wire [7:0] q;\n  sub #(.W(8)) u0 (.clk(clk), .d(d[3:0]), .q());\n  sub u1 (clk, d, q), u2 (clk, , q);\nendmodule",
        );
        assert!(!sink.has_errors(), "{:?}", sink.diagnostics());
        let m = &unit.modules[0];
        assert_eq!(m.instances.len(), 3);
        let u0 = &m.instances[0];
        assert_eq!(name(&interner, u0.module), "sub");
        assert_eq!(name(&interner, u0.name), "u0");
        assert_eq!(u0.params.len(), 1);
        assert_eq!(u0.connections[0].actual.as_ref().unwrap().net, Some(interner.get("clk").unwrap()));
        assert!(u0.connections[1].actual.as_ref().unwrap().net.is_none());
        assert!(u0.connections[2].actual.is_none());
        let u2 = &m.instances[2];
        assert_eq!(name(&interner, u2.name), "u2");
        assert!(u2.connections[1].actual.is_none());
        assert!(u2.connections.iter().all(|c| c.formal.is_none()));
    }

    #[test]
    fn implicit_named_connection() {
        let (unit, interner, _) = parse("module t(input clk); sub u (.clk); endmodule");
        let conn = &unit.modules[0].instances[0].connections[0];
        assert_eq!(conn.formal, interner.get("clk"));
        assert_eq!(conn.actual.as_ref().unwrap().net, interner.get("clk"));
    }

    #[test]
    fn parameters_evaluate() {
        let (unit, interner, sink) = parse(
            "module m #(parameter W = 4 * 8, parameter D = $clog2(W)) (input [W-1:0] a);\n  localparam H = W / 2;\nendmodule",
        );
        assert!(!sink.has_errors());
        let m = &unit.modules[0];
        assert_eq!(m.params.len(), 3);
        assert_eq!(
            m.params[0].value.as_ref().unwrap().eval(&Default::default()),
            Some(32)
        );
        assert!(matches!(m.params[1].value, Some(ConstExpr::Opaque(_))));
        assert!(m.params[2].local);
        assert_eq!(name(&interner, m.params[2].name), "H");
    }

    #[test]
    fn several_modules_and_directives() {
        let (unit, interner, sink) =
            parse("`timescale 1ns/1ps\nmodule a; endmodule\nmodule b(); a ia(); endmodule : b\n");
        assert!(!sink.has_errors());
        let names: Vec<_> = unit.modules.iter().map(|m| name(&interner, m.name)).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn missing_endmodule_recovers() {
        let (unit, _, sink) = parse("module a(input x);\nmodule b; endmodule");
        assert_eq!(unit.modules.len(), 2);
        assert_eq!(sink.error_count(), 1);
    }

    #[test]
    fn garbage_item_recovers() {
        let (unit, _, sink) = parse("module a; ) ) ; wire w; endmodule");
        assert!(sink.has_errors());
        assert_eq!(unit.modules[0].nets.len(), 1);
    }

    #[test]
    fn top_level_garbage() {
        let (unit, _, sink) = parse("wire x; module a; endmodule");
        assert_eq!(sink.error_count(), 1);
        assert_eq!(unit.modules.len(), 1);
    }
}
