//! Hard-macro builds: designs, projects, flow runs, and the libraries that
//! connect them.
//!
//! A [`Project`] is configured with a [`Design`], constraints, a
//! [`TechPreset`], and any number of [`HardMacroLibrary`]s. Running it hands
//! a [`JobManifest`] to a [`FlowBackend`], checks the node outputs it left
//! in the build tree, and returns a [`CompletedRun`]. A completed run is the
//! only thing a library can be built from, and libraries only carry file
//! paths, so a design that uses a hard macro never sees the project that
//! produced it.

pub mod backend;
pub mod check;
pub mod constraint;
pub mod demo;
pub mod design;
pub mod emit;
pub mod error;
pub mod flow;
pub mod layout;
pub mod library;
pub mod manifest;
pub mod plan;
pub mod project;
pub mod record;
pub mod run;
pub mod session;
pub mod sources;
pub mod summary;
pub mod tech;

#[cfg(test)]
pub(crate) mod test_support;

pub use backend::{ExternalBackend, FlowBackend, RunRequest, MANIFEST_ENV};
pub use check::{preflight, preflight_cells, InstanceInfo, ModuleInfo, PortInfo, PreflightReport, Resolution};
pub use constraint::{AreaConstraint, Constraints, DieArea};
pub use demo::{run_hard_macro_demo, DemoOutcome};
pub use design::{Design, DesignBuilder};
pub use emit::{emit_source, sdc_from_clocks, EmitOutcome};
pub use error::FlowError;
pub use flow::{flow_nodes, FlowNode};
pub use layout::BuildLayout;
pub use library::{FilesetRole, HardMacroLibrary, LibraryFileset, NLDM_FILESET, PHYSICAL_FILESET};
pub use manifest::{JobManifest, ManifestConstraints, ManifestFlow, ManifestLibrary};
pub use plan::BuildPlan;
pub use project::Project;
pub use record::{ArtifactKind, ArtifactRecord, JobRecord, JobStatus, NodeRecord, NodeStatus};
pub use run::CompletedRun;
pub use session::HdlSession;
pub use sources::{emit_builtin, BUILTIN_SOURCES};
pub use summary::RunSummary;
pub use tech::TechPreset;
