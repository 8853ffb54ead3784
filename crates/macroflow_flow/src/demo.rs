//! The built-in scenario: harden `A`, then build `B` with two copies of it.

use crate::backend::FlowBackend;
use crate::design::DesignBuilder;
use crate::error::FlowError;
use crate::library::HardMacroLibrary;
use crate::project::Project;
use crate::run::CompletedRun;
use crate::session::HdlSession;
use crate::sources::emit_builtin;
use crate::tech::TechPreset;
use std::path::Path;

/// Library name `A` is published under.
pub const DEMO_LIBRARY: &str = "modA";
/// Die size of `B`, in microns per side.
pub const DEMO_DIE_SIZE: f64 = 1000.0;

/// Both runs and the library connecting them.
#[derive(Debug)]
pub struct DemoOutcome {
    pub a: CompletedRun,
    pub library: HardMacroLibrary,
    pub b: CompletedRun,
}

/// Writes the built-in sources into `workdir` and runs both projects.
///
/// `A` completes before its library exists; `B` only sees `A` through
/// that library's files.
pub fn run_hard_macro_demo(
    workdir: &Path,
    backend: &dyn FlowBackend,
    session: &mut HdlSession,
) -> Result<DemoOutcome, FlowError> {
    for (path, outcome) in emit_builtin(workdir)? {
        tracing::debug!(path = %path.display(), ?outcome, "emitted source");
    }

    let design_a = DesignBuilder::new("A")
        .set_dataroot(workdir)
        .add_file("A.v", "verilog")
        .set_topmodule("A", "verilog")
        .build(session)?;
    let mut a = Project::new(design_a);
    a.add_fileset("verilog")?;
    a.add_constraint("top.sdc");
    a.apply_preset(TechPreset::skywater130_demo());
    let a = a.run(backend, session)?;

    let library = HardMacroLibrary::from_run(&a, DEMO_LIBRARY)?;

    let design_b = DesignBuilder::new("B")
        .set_dataroot(workdir)
        .add_file("B.v", "verilog")
        .set_topmodule("B", "verilog")
        .build(session)?;
    let mut b = Project::new(design_b);
    b.add_fileset("verilog")?;
    b.add_constraint("top.sdc");
    b.set_diearea_rectangle(DEMO_DIE_SIZE, DEMO_DIE_SIZE)?;
    b.add_asic_lib(library.clone())?;
    b.apply_preset(TechPreset::skywater130_demo());
    let b = b.run(backend, session)?;

    Ok(DemoOutcome { a, library, b })
}
