//! Structural view of a Verilog file.
//!
//! Only what the build flow needs is kept: modules, their parameters, ports,
//! declared nets, and the instances they contain. Behavioral code is consumed
//! by the parser without producing nodes.

use macroflow_common::Ident;
use macroflow_diagnostics::Span;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Every module in one source file, in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceUnit {
    /// Module declarations.
    pub modules: Vec<ModuleDecl>,
    /// The whole file.
    pub span: Span,
}

/// A `module ... endmodule` block.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModuleDecl {
    /// Module name.
    pub name: Ident,
    /// Span of the name token, used to point at definitions.
    pub name_span: Span,
    /// Parameters from the `#(...)` header and the body, in order.
    pub params: Vec<Param>,
    /// Ports in header order.
    pub ports: Vec<Port>,
    /// Nets and variables declared in the body that are not ports.
    pub nets: Vec<Net>,
    /// Module instantiations in the body.
    pub instances: Vec<Instance>,
    /// `module` through `endmodule`.
    pub span: Span,
}

/// Port direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Input,
    Output,
    Inout,
}

/// Net or variable type keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetKind {
    Wire,
    Reg,
    Logic,
    Tri,
    Supply0,
    Supply1,
    Integer,
}

/// A module port.
///
/// In a non-ANSI header the direction stays `None` until the body declares it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Port {
    pub name: Ident,
    pub direction: Option<Direction>,
    pub kind: Option<NetKind>,
    pub signed: bool,
    pub range: Option<Range>,
    pub span: Span,
}

/// A body-level net or variable.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    pub name: Ident,
    pub kind: NetKind,
    pub signed: bool,
    pub range: Option<Range>,
    pub span: Span,
}

/// `parameter` or `localparam`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Param {
    pub name: Ident,
    /// `localparam` cannot be overridden at instantiation.
    pub local: bool,
    /// Default value; `None` only when the source omitted it.
    pub value: Option<ConstExpr>,
    pub span: Span,
}

/// A packed range `[msb:lsb]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Range {
    pub msb: ConstExpr,
    pub lsb: ConstExpr,
    pub span: Span,
}

impl Range {
    /// Number of bits, or `None` when a bound cannot be evaluated.
    pub fn width(&self, params: &HashMap<Ident, i64>) -> Option<u64> {
        let msb = self.msb.eval(params)?;
        let lsb = self.lsb.eval(params)?;
        Some(msb.abs_diff(lsb) + 1)
    }
}

/// Binary operators allowed in constant expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

/// A constant integer expression as it appears in ranges and parameter values.
///
/// Anything outside integer arithmetic on literals and parameter names
/// (function calls, concatenations, ternaries) is kept as [`ConstExpr::Opaque`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstExpr {
    Number(i64),
    Name(Ident),
    Negate(Box<ConstExpr>),
    Binary(BinOp, Box<ConstExpr>, Box<ConstExpr>),
    Opaque(Span),
}

impl ConstExpr {
    /// Evaluates the expression with parameter values from `params`.
    ///
    /// Returns `None` for opaque expressions, unknown names, division by
    /// zero, and overflow.
    pub fn eval(&self, params: &HashMap<Ident, i64>) -> Option<i64> {
        match self {
            ConstExpr::Number(n) => Some(*n),
            ConstExpr::Name(name) => params.get(name).copied(),
            ConstExpr::Negate(inner) => inner.eval(params)?.checked_neg(),
            ConstExpr::Binary(op, lhs, rhs) => {
                let (l, r) = (lhs.eval(params)?, rhs.eval(params)?);
                match op {
                    BinOp::Add => l.checked_add(r),
                    BinOp::Sub => l.checked_sub(r),
                    BinOp::Mul => l.checked_mul(r),
                    BinOp::Div => l.checked_div(r),
                    BinOp::Mod => l.checked_rem(r),
                }
            }
            ConstExpr::Opaque(_) => None,
        }
    }
}

/// `module_name #(params) instance_name (connections);`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instance {
    /// The instantiated module.
    pub module: Ident,
    /// Span of the module name token.
    pub module_span: Span,
    /// Instance name.
    pub name: Ident,
    /// Parameter overrides.
    pub params: Vec<Connection>,
    /// Port connections.
    pub connections: Vec<Connection>,
    pub span: Span,
}

/// One named (`.a(x)`) or positional (`x`) connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Connection {
    /// Formal name; `None` for positional connections.
    pub formal: Option<Ident>,
    /// The connected expression; `None` for `.a()` or an empty positional slot.
    pub actual: Option<Actual>,
    pub span: Span,
}

/// The expression side of a connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actual {
    pub span: Span,
    /// Set when the expression is a single identifier.
    pub net: Option<Ident>,
}

/// Parses an integer literal token such as `32`, `8'hFF`, or `'d5`.
///
/// Returns `None` for literals containing `x`, `z`, or `?` digits and for
/// values outside `i64`.
pub fn parse_int_literal(text: &str) -> Option<i64> {
    let text: String = text.chars().filter(|c| *c != '_' && !c.is_whitespace()).collect();
    let Some((_, based)) = text.split_once('\'') else {
        return text.parse().ok();
    };
    let based = based.strip_prefix(['s', 'S']).unwrap_or(based);
    let mut chars = based.chars();
    let radix = match chars.next()?.to_ascii_lowercase() {
        'b' => 2,
        'o' => 8,
        'd' => 10,
        'h' => 16,
        _ => return None,
    };
    i64::from_str_radix(chars.as_str(), radix).ok()
}
