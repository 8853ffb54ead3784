//! The job manifest handed to the flow tool.
//!
//! A single JSON document describing everything the tool needs for one job:
//! design sources, constraints, technology, attached libraries, and the nodes
//! it is expected to run.

use crate::constraint::Constraints;
use crate::error::FlowError;
use crate::flow::FlowNode;
use crate::library::{HardMacroLibrary, LibraryFileset};
use crate::tech::TechPreset;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Constraint section of a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestConstraints {
    /// SDC files.
    pub sdc: Vec<PathBuf>,
    /// `[[0, 0], [width, height]]`, or absent to size the die from density.
    pub diearea: Option<[[f64; 2]; 2]>,
    /// Core utilization target in percent.
    pub density: u32,
}

impl ManifestConstraints {
    pub fn new(constraints: &Constraints, preset: &TechPreset) -> Self {
        Self {
            sdc: constraints.timing.clone(),
            diearea: constraints.area.diearea.map(|d| d.corners()),
            density: preset.density,
        }
    }
}

/// A hard-macro library as the flow tool sees it.
///
/// Reading one back from a manifest does not re-check its files; only
/// [`HardMacroLibrary::from_run`] does that.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestLibrary {
    pub name: String,
    pub pdk: String,
    /// Modules the library provides.
    pub cells: Vec<String>,
    pub source_design: String,
    pub source_job: String,
    pub filesets: BTreeMap<String, LibraryFileset>,
}

impl From<&HardMacroLibrary> for ManifestLibrary {
    fn from(library: &HardMacroLibrary) -> Self {
        Self {
            name: library.name().to_string(),
            pdk: library.pdk().to_string(),
            cells: library.cells().to_vec(),
            source_design: library.source_design().to_string(),
            source_job: library.source_job().to_string(),
            filesets: library
                .filesets()
                .map(|(name, fileset)| (name.to_string(), fileset.clone()))
                .collect(),
        }
    }
}

/// Flow section of a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestFlow {
    pub name: String,
    pub nodes: Vec<FlowNode>,
}

/// Everything the flow tool reads for one job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobManifest {
    pub design: String,
    pub top: String,
    pub job: String,
    /// `<build>/<design>/<job>`; node outputs go below it.
    pub jobdir: PathBuf,
    pub preset: TechPreset,
    pub flow: ManifestFlow,
    /// Active filesets and their files.
    pub filesets: BTreeMap<String, Vec<PathBuf>>,
    pub constraints: ManifestConstraints,
    pub libraries: Vec<ManifestLibrary>,
}

impl JobManifest {
    /// Reads a manifest from disk.
    pub fn load(path: &Path) -> Result<Self, FlowError> {
        let content = std::fs::read_to_string(path).map_err(|e| FlowError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| FlowError::Json {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Writes the manifest as pretty JSON, creating parent directories.
    pub fn write(&self, path: &Path) -> Result<(), FlowError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FlowError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| FlowError::Json {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| FlowError::io(path, e))?;
        tracing::debug!(path = %path.display(), "wrote job manifest");
        Ok(())
    }

    /// The job directory's view of a node's output file.
    pub fn output_file(&self, node: &FlowNode, file: &str) -> PathBuf {
        self.jobdir
            .join(&node.step)
            .join(node.index.to_string())
            .join("outputs")
            .join(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::flow_nodes;
    use crate::test_support::completed_run;
    use tempfile::TempDir;

    fn manifest(constraints: &Constraints) -> JobManifest {
        let preset = TechPreset::skywater130_demo();
        JobManifest {
            design: "B".to_string(),
            top: "B".to_string(),
            job: "job0".to_string(),
            jobdir: PathBuf::from("build/B/job0"),
            flow: ManifestFlow {
                name: preset.flow.clone(),
                nodes: flow_nodes(&preset.flow).unwrap(),
            },
            constraints: ManifestConstraints::new(constraints, &preset),
            preset,
            filesets: BTreeMap::from([("verilog".to_string(), vec![PathBuf::from("B.v")])]),
            libraries: Vec::new(),
        }
    }

    #[test]
    fn diearea_as_corners() {
        let mut constraints = Constraints::default();
        constraints.area.set_diearea_rectangle(1000.0, 1000.0).unwrap();
        let json = serde_json::to_value(manifest(&constraints)).unwrap();
        assert_eq!(
            json["constraints"]["diearea"],
            serde_json::json!([[0.0, 0.0], [1000.0, 1000.0]])
        );
        assert_eq!(json["constraints"]["density"], 10);
        assert_eq!(json["flow"]["nodes"][7]["step"], "write.gds");
    }

    #[test]
    fn no_diearea_is_null() {
        let json = serde_json::to_value(manifest(&Constraints::default())).unwrap();
        assert!(json["constraints"]["diearea"].is_null());
    }

    #[test]
    fn library_roles_serialize() {
        let dir = TempDir::new().unwrap();
        let run = completed_run(dir.path(), "A", "A");
        let library = HardMacroLibrary::from_run(&run, "modA").unwrap();
        let mut with_lib = manifest(&Constraints::default());
        with_lib.libraries.push(ManifestLibrary::from(&library));

        let json = serde_json::to_value(&with_lib).unwrap();
        let lib = &json["libraries"][0];
        assert_eq!(lib["name"], "modA");
        assert_eq!(lib["cells"], serde_json::json!(["A"]));
        assert_eq!(lib["filesets"]["models.physical"]["role"], "apr");
        assert_eq!(lib["filesets"]["models.timing.nldm"]["corner"], "generic");
        assert_eq!(lib["filesets"]["models.timing.nldm"]["delay_model"], "nldm");

        let path = dir.path().join("B.pkg.json");
        with_lib.write(&path).unwrap();
        assert_eq!(JobManifest::load(&path).unwrap().libraries, with_lib.libraries);
    }

    #[test]
    fn write_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("job0/B.pkg.json");
        let original = manifest(&Constraints::default());
        original.write(&path).unwrap();
        let loaded = JobManifest::load(&path).unwrap();
        assert_eq!(loaded, original);
        assert_eq!(
            loaded.output_file(&loaded.flow.nodes[8], "B.lef"),
            PathBuf::from("build/B/job0/write.views/0/outputs/B.lef")
        );
    }
}
