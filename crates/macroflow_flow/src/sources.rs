//! The built-in hard-macro scenario sources.

use crate::emit::{emit_source, EmitOutcome};
use crate::error::FlowError;
use std::path::{Path, PathBuf};

/// Module `A`: a registered 32-bit AND.
pub const A_V: &str = "
module A(
    input  wire       clk,
    input  wire[31:0] a,
    input  wire[31:0] b,
    output reg [31:0] y
);

  always @ (posedge clk) begin
    y = a & b; // simple AND gate
  end
endmodule
";

/// Module `B`: two copies of `A` on independent buses.
pub const B_V: &str = "
module B(
    input  wire       clk,
    input  wire[31:0] a1,
    input  wire[31:0] b1,
    input  wire[31:0] a2,
    input  wire[31:0] b2,
    output reg[31:0] y1,
    output reg[31:0] y2
);
    // Instantiate module A twice as hard macros

    A u1 (.clk(clk), .a(a1), .b(b1), .y(y1));
    A u2 (.clk(clk), .a(a2), .b(b2), .y(y2));
endmodule
";

/// A 100 ns clock on port `clk`.
pub const TOP_SDC: &str = "create_clock -name clk -period 100 [get_ports clk]\n";

/// File names and contents, in emission order.
pub const BUILTIN_SOURCES: [(&str, &str); 3] = [("A.v", A_V), ("top.sdc", TOP_SDC), ("B.v", B_V)];

/// Writes every built-in source into `workdir`.
pub fn emit_builtin(workdir: &Path) -> Result<Vec<(PathBuf, EmitOutcome)>, FlowError> {
    BUILTIN_SOURCES
        .iter()
        .map(|(name, text)| {
            let path = workdir.join(name);
            let outcome = emit_source(&path, text)?;
            Ok((path, outcome))
        })
        .collect()
}
