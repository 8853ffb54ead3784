//! Lookups over parsed modules: ports, widths, instances, and the set of
//! modules a design defines.

use crate::ast::{Direction, Instance, ModuleDecl, NetKind, Port, SourceUnit};
use macroflow_common::{Ident, Interner};
use macroflow_diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use std::collections::HashMap;

impl ModuleDecl {
    /// Finds a port by name.
    pub fn port(&self, name: Ident) -> Option<&Port> {
        self.ports.iter().find(|p| p.name == name)
    }

    /// Ports with the given direction, in header order.
    pub fn ports_with(&self, direction: Direction) -> impl Iterator<Item = &Port> {
        self.ports
            .iter()
            .filter(move |p| p.direction == Some(direction))
    }

    /// Parameter defaults that evaluate to integers.
    ///
    /// Parameters are evaluated in declaration order, so a default may refer
    /// to any parameter declared before it.
    pub fn param_values(&self) -> HashMap<Ident, i64> {
        let mut values = HashMap::new();
        for param in &self.params {
            if let Some(v) = param.value.as_ref().and_then(|e| e.eval(&values)) {
                values.insert(param.name, v);
            }
        }
        values
    }

    /// Bit width of a port or body net, with parameters at their defaults.
    ///
    /// An unranged `integer` is 32 bits and any other unranged signal is 1 bit.
    /// Returns `None` for unknown names and ranges that do not evaluate.
    pub fn signal_width(&self, name: Ident) -> Option<u64> {
        let (kind, range) = match self.port(name) {
            Some(port) => (port.kind, port.range.as_ref()),
            None => {
                let net = self.nets.iter().find(|n| n.name == name)?;
                (Some(net.kind), net.range.as_ref())
            }
        };
        match range {
            Some(range) => range.width(&self.param_values()),
            None if kind == Some(NetKind::Integer) => Some(32),
            None => Some(1),
        }
    }

    /// Instances of `module` inside this module.
    pub fn instances_of(&self, module: Ident) -> impl Iterator<Item = &Instance> {
        self.instances.iter().filter(move |i| i.module == module)
    }
}

impl Instance {
    /// The net connected to a named formal, when the actual is a plain identifier.
    pub fn connected_net(&self, formal: Ident) -> Option<Ident> {
        self.connections
            .iter()
            .find(|c| c.formal == Some(formal))?
            .actual
            .as_ref()?
            .net
    }
}

/// All modules defined across a design's files, keyed by name.
///
/// The first definition of a name wins; later ones are reported as `E203`.
pub struct ModuleIndex<'a> {
    order: Vec<Ident>,
    by_name: HashMap<Ident, &'a ModuleDecl>,
}

impl<'a> ModuleIndex<'a> {
    /// Indexes every module in `units`.
    pub fn build(
        units: impl IntoIterator<Item = &'a SourceUnit>,
        interner: &Interner,
        sink: &DiagnosticSink,
    ) -> Self {
        let mut order = Vec::new();
        let mut by_name: HashMap<Ident, &'a ModuleDecl> = HashMap::new();
        for module in units.into_iter().flat_map(|u| &u.modules) {
            if by_name.contains_key(&module.name) {
                sink.emit(
                    Diagnostic::error(
                        DiagnosticCode::DUPLICATE_MODULE,
                        format!(
                            "module `{}` is defined more than once",
                            interner.resolve(module.name)
                        ),
                    )
                    .at(module.name_span)
                    .with_label("redefined here"),
                );
                continue;
            }
            order.push(module.name);
            by_name.insert(module.name, module);
        }
        Self { order, by_name }
    }

    /// Looks up a module.
    pub fn get(&self, name: Ident) -> Option<&'a ModuleDecl> {
        self.by_name.get(&name).copied()
    }

    /// Returns `true` if the design defines `name`.
    pub fn contains(&self, name: Ident) -> bool {
        self.by_name.contains_key(&name)
    }

    /// Modules in definition order.
    pub fn modules(&self) -> impl Iterator<Item = &'a ModuleDecl> + '_ {
        self.order.iter().map(|name| self.by_name[name])
    }

    /// Number of distinct modules.
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Returns `true` if no modules were found.
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Instances whose module is not defined in this index, in source order.
    pub fn unresolved_instances(&self) -> Vec<&'a Instance> {
        self.modules()
            .flat_map(|m| &m.instances)
            .filter(|inst| !self.contains(inst.module))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_source;
    use macroflow_diagnostics::FileId;

    const B_V: &str = r#"
module B(
    input  wire       clk,
    input  wire[31:0] a1,
    input  wire[31:0] b1,
    input  wire[31:0] a2,
    input  wire[31:0] b2,
    output reg[31:0] y1,
    output reg[31:0] y2
);
    A u1 (.clk(clk), .a(a1), .b(b1), .y(y1));
    A u2 (.clk(clk), .a(a2), .b(b2), .y(y2));
endmodule
"#;

    #[test]
    fn macro_instances_wire_distinct_buses() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let unit = parse_source(B_V, FileId::from_raw(0), &interner, &sink);
        assert!(!sink.has_errors());

        let b = &unit.modules[0];
        let a = interner.get("A").unwrap();
        let instances: Vec<_> = b.instances_of(a).collect();
        assert_eq!(instances.len(), 2);

        let formal = |s: &str| interner.get(s).unwrap();
        let mut inputs = Vec::new();
        let mut outputs = Vec::new();
        for inst in &instances {
            assert_eq!(inst.connected_net(formal("clk")), Some(formal("clk")));
            inputs.push(inst.connected_net(formal("a")).unwrap());
            inputs.push(inst.connected_net(formal("b")).unwrap());
            outputs.push(inst.connected_net(formal("y")).unwrap());
        }
        inputs.sort_by_key(|i| i.as_raw());
        inputs.dedup();
        outputs.sort_by_key(|i| i.as_raw());
        outputs.dedup();
        assert_eq!(inputs.len(), 4);
        assert_eq!(outputs.len(), 2);

        for net in &inputs {
            assert_eq!(b.port(*net).unwrap().direction, Some(Direction::Input));
            assert_eq!(b.signal_width(*net), Some(32));
        }
        for net in &outputs {
            assert_eq!(b.port(*net).unwrap().direction, Some(Direction::Output));
            assert_eq!(b.signal_width(*net), Some(32));
        }
        assert_eq!(b.signal_width(formal("clk")), Some(1));
    }

    #[test]
    fn parameterized_width() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let unit = parse_source(
            "module m #(parameter W = 16, parameter H = W / 2) (input [H-1:0] a);\n  integer i;\nendmodule",
            FileId::from_raw(0),
            &interner,
            &sink,
        );
        let m = &unit.modules[0];
        assert_eq!(m.signal_width(interner.get("a").unwrap()), Some(8));
        assert_eq!(m.signal_width(interner.get("i").unwrap()), Some(32));
        assert_eq!(m.signal_width(interner.get_or_intern("nope")), None);
    }

    #[test]
    fn index_reports_duplicates_and_unresolved() {
        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let first = parse_source(
            "module A(input x); endmodule\nmodule top; A ua(.x(1'b0)); C uc(); endmodule",
            FileId::from_raw(0),
            &interner,
            &sink,
        );
        let second = parse_source("module A; endmodule", FileId::from_raw(1), &interner, &sink);
        let index = ModuleIndex::build([&first, &second], &interner, &sink);

        assert_eq!(index.len(), 2);
        assert_eq!(sink.error_count(), 1);
        assert_eq!(sink.diagnostics()[0].code, DiagnosticCode::DUPLICATE_MODULE);
        // The first definition is kept.
        let a = index.get(interner.get("A").unwrap()).unwrap();
        assert_eq!(a.ports.len(), 1);

        let unresolved = index.unresolved_instances();
        assert_eq!(unresolved.len(), 1);
        assert_eq!(interner.resolve(unresolved[0].module), "C");
    }
}
