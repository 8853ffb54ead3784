//! Test backends and fixtures for exercising macroflow end to end without
//! a real flow tool.
//!
//! [`StubBackend`] reads the job manifest and writes what a successful flow
//! would leave behind: an `outputs/` directory per node, a metrics file, and
//! the LEF, Liberty, and GDS views. [`FailingBackend`] behaves like a tool
//! that exits non-zero.

#![warn(missing_docs)]

use std::cell::RefCell;

use macroflow_flow::{ArtifactKind, FlowBackend, FlowError, JobManifest, RunRequest};

/// Project file used by config-driven scenarios.
pub const DEMO_CONFIG: &str = r#"
[workspace]
name = "hard_macro_demo"

[target]
preset = "skywater130_demo"

[clocks.clk]
period = "100ns"
port = "clk"

[designs.A]
sources = "A.v"
constraints = ["top.sdc"]
library_name = "modA"

[designs.B]
sources = ["B.v"]
constraints = ["top.sdc"]
hard_macros = ["A"]
die_area = [1000.0, 1000.0]
"#;

/// A flow that "succeeds" by writing placeholder outputs.
#[derive(Default)]
pub struct StubBackend {
    /// Nodes from this step onward produce no outputs.
    pub stop_at: Option<String>,
    /// Skip writing the GDS view even when its node runs.
    pub omit_gds: bool,
    manifests: RefCell<Vec<JobManifest>>,
}

impl StubBackend {
    /// A backend that completes every node.
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend whose flow stops before `step`.
    pub fn stopping_at(step: &str) -> Self {
        Self {
            stop_at: Some(step.to_string()),
            ..Self::default()
        }
    }

    /// The same backend, but the GDS view is never written.
    pub fn without_gds(mut self) -> Self {
        self.omit_gds = true;
        self
    }

    /// Manifests received so far, in execution order.
    pub fn manifests(&self) -> Vec<JobManifest> {
        self.manifests.borrow().clone()
    }

    /// Designs executed so far, in order.
    pub fn executed(&self) -> Vec<String> {
        self.manifests.borrow().iter().map(|m| m.design.clone()).collect()
    }
}

impl FlowBackend for StubBackend {
    fn name(&self) -> &str {
        "stub"
    }

    fn execute(&self, request: &RunRequest<'_>) -> Result<(), FlowError> {
        let manifest = JobManifest::load(request.manifest)?;
        let macros: Vec<&str> = manifest.libraries.iter().map(|l| l.name.as_str()).collect();

        for (position, node) in manifest.flow.nodes.iter().enumerate() {
            if self.stop_at.as_deref() == Some(node.step.as_str()) {
                break;
            }
            let metrics_path =
                manifest.output_file(node, &format!("{}.metrics.json", manifest.design));
            let dir = metrics_path.parent().unwrap_or(request.job_dir);
            std::fs::create_dir_all(dir).map_err(|e| FlowError::io(dir, e))?;
            let metrics = serde_json::json!({
                "cellarea": 100.0 * (position + 1) as f64,
                "macros": macros.len(),
            });
            std::fs::write(&metrics_path, metrics.to_string())
                .map_err(|e| FlowError::io(&metrics_path, e))?;

            for kind in ArtifactKind::ALL {
                if kind.step() != node.step || (kind == ArtifactKind::Gds && self.omit_gds) {
                    continue;
                }
                let path = manifest.output_file(node, &kind.file_name(&manifest.top, &manifest.preset.corner));
                let body = format!(
                    "{kind:?} view of {} on {} (macros: {})\n",
                    manifest.top,
                    manifest.preset.pdk,
                    macros.join(", ")
                );
                std::fs::write(&path, body).map_err(|e| FlowError::io(&path, e))?;
            }
        }

        std::fs::write(request.log, format!("stub flow for {}\n", manifest.design))
            .map_err(|e| FlowError::io(request.log, e))?;
        self.manifests.borrow_mut().push(manifest);
        Ok(())
    }
}

/// A flow tool that always exits with status 1.
pub struct FailingBackend;

impl FlowBackend for FailingBackend {
    fn name(&self) -> &str {
        "failing"
    }

    fn execute(&self, request: &RunRequest<'_>) -> Result<(), FlowError> {
        Err(FlowError::ToolFailed {
            design: request.design.to_string(),
            status: "exit status: 1".to_string(),
            stderr_tail: "ERROR: placement failed".to_string(),
        })
    }
}
