//! Hard-macro libraries assembled from a completed run's artifacts.

use crate::error::FlowError;
use crate::record::ArtifactKind;
use crate::run::CompletedRun;
use macroflow_common::ContentHash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Fileset holding the abstract, timing, and layout views used by place and route.
pub const PHYSICAL_FILESET: &str = "models.physical";
/// Fileset holding the NLDM timing model.
pub const NLDM_FILESET: &str = "models.timing.nldm";

/// What the flow uses a library fileset for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum FilesetRole {
    /// Auto place-and-route views.
    Apr,
    /// Timing models for one library corner.
    LibCorner { corner: String, delay_model: String },
}

/// Files backing one capability of a library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryFileset {
    pub files: Vec<PathBuf>,
    #[serde(flatten)]
    pub role: FilesetRole,
}

/// A prior design packaged as a black-box cell for later projects.
///
/// This is a name-to-paths mapping; it holds no reference to the project
/// that produced the files. The only constructor is [`from_run`], so every
/// value points at artifacts a finished job wrote. Manifests carry the
/// serializable [`ManifestLibrary`](crate::manifest::ManifestLibrary) view
/// instead.
///
/// [`from_run`]: HardMacroLibrary::from_run
#[derive(Debug, Clone, PartialEq)]
pub struct HardMacroLibrary {
    name: String,
    pdk: String,
    cells: Vec<String>,
    source_design: String,
    source_job: String,
    filesets: BTreeMap<String, LibraryFileset>,
}

impl HardMacroLibrary {
    /// Packages `run` as the library `name`.
    ///
    /// The LEF, Liberty, and GDS files must exist and be non-empty.
    pub fn from_run(run: &CompletedRun, name: &str) -> Result<Self, FlowError> {
        let lef = run.artifact_path(ArtifactKind::Lef);
        let lib = run.artifact_path(ArtifactKind::Lib);
        let gds = run.artifact_path(ArtifactKind::Gds);
        for (kind, path) in [
            (ArtifactKind::Lef, &lef),
            (ArtifactKind::Lib, &lib),
            (ArtifactKind::Gds, &gds),
        ] {
            verify_artifact(path)?;
            let recorded = run.record().artifact(kind).map(|a| a.hash);
            if let (Some(recorded), Ok(actual)) = (recorded, ContentHash::from_file(path)) {
                if recorded != actual {
                    tracing::warn!(
                        path = %path.display(),
                        recorded = %recorded.short(),
                        actual = %actual.short(),
                        "artifact changed since its run finished"
                    );
                }
            }
        }

        let mut filesets = BTreeMap::new();
        filesets.insert(
            PHYSICAL_FILESET.to_string(),
            LibraryFileset {
                files: vec![lef, lib.clone(), gds],
                role: FilesetRole::Apr,
            },
        );
        filesets.insert(
            NLDM_FILESET.to_string(),
            LibraryFileset {
                files: vec![lib],
                role: FilesetRole::LibCorner {
                    corner: "generic".to_string(),
                    delay_model: "nldm".to_string(),
                },
            },
        );

        tracing::info!(library = name, design = run.design(), cell = run.top(), "library assembled");
        Ok(Self {
            name: name.to_string(),
            pdk: run.preset().pdk.clone(),
            cells: vec![run.top().to_string()],
            source_design: run.design().to_string(),
            source_job: run.job().to_string(),
            filesets,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// PDK inherited from the source run's preset.
    pub fn pdk(&self) -> &str {
        &self.pdk
    }

    /// Modules this library provides.
    pub fn cells(&self) -> &[String] {
        &self.cells
    }

    pub fn provides(&self, cell: &str) -> bool {
        self.cells.iter().any(|c| c == cell)
    }

    /// Design the library was built from.
    pub fn source_design(&self) -> &str {
        &self.source_design
    }

    /// Job of the source design.
    pub fn source_job(&self) -> &str {
        &self.source_job
    }

    pub fn fileset(&self, name: &str) -> Option<&LibraryFileset> {
        self.filesets.get(name)
    }

    pub fn filesets(&self) -> impl Iterator<Item = (&str, &LibraryFileset)> {
        self.filesets.iter().map(|(k, v)| (k.as_str(), v))
    }
}

fn verify_artifact(path: &Path) -> Result<(), FlowError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => Ok(()),
        _ => Err(FlowError::MissingArtifact {
            path: path.to_path_buf(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::{FlowNode, WRITE_GDS, WRITE_VIEWS};
    use crate::layout::BuildLayout;
    use crate::record::{ArtifactRecord, JobRecord, JobStatus};
    use crate::tech::TechPreset;
    use tempfile::TempDir;

    fn completed(root: &Path, write_files: bool) -> CompletedRun {
        let layout = BuildLayout::new(root, "A", "job0");
        let views = FlowNode::new(WRITE_VIEWS, 0);
        let gds = FlowNode::new(WRITE_GDS, 0);
        let mut artifacts = Vec::new();
        for (kind, node, file) in [
            (ArtifactKind::Lef, &views, "A.lef"),
            (ArtifactKind::Lib, &views, "A.slow.lib"),
            (ArtifactKind::Gds, &gds, "A.gds"),
        ] {
            let path = layout.output_file(node, file);
            if write_files {
                std::fs::create_dir_all(path.parent().unwrap()).unwrap();
                std::fs::write(&path, file).unwrap();
            }
            artifacts.push(ArtifactRecord {
                kind,
                node: node.clone(),
                file: file.to_string(),
                size: file.len() as u64,
                hash: ContentHash::from_bytes(file.as_bytes()),
            });
        }
        let record = JobRecord {
            macroflow_version: "0.1.0".to_string(),
            design: "A".to_string(),
            top: "A".to_string(),
            job: "job0".to_string(),
            preset: TechPreset::skywater130_demo(),
            status: JobStatus::Succeeded,
            nodes: Vec::new(),
            artifacts,
            libraries: Vec::new(),
            failure: None,
            started_unix: 0,
            finished_unix: 0,
        };
        CompletedRun::new(record, layout)
    }

    #[test]
    fn capability_groups_point_at_job_outputs() {
        let dir = TempDir::new().unwrap();
        let run = completed(dir.path(), true);
        let lib = HardMacroLibrary::from_run(&run, "modA").unwrap();
        assert_eq!(lib.name(), "modA");
        assert_eq!(lib.pdk(), "skywater130");
        assert!(lib.provides("A"));
        assert!(!lib.provides("modA"));

        let physical = lib.fileset(PHYSICAL_FILESET).unwrap();
        assert_eq!(physical.role, FilesetRole::Apr);
        let root = dir.path();
        assert_eq!(
            physical.files,
            vec![
                root.join("A/job0/write.views/0/outputs/A.lef"),
                root.join("A/job0/write.views/0/outputs/A.slow.lib"),
                root.join("A/job0/write.gds/0/outputs/A.gds"),
            ]
        );

        let timing = lib.fileset(NLDM_FILESET).unwrap();
        assert_eq!(timing.files, vec![root.join("A/job0/write.views/0/outputs/A.slow.lib")]);
        assert_eq!(
            timing.role,
            FilesetRole::LibCorner {
                corner: "generic".to_string(),
                delay_model: "nldm".to_string()
            }
        );
        assert_eq!(lib.filesets().count(), 2);
    }

    #[test]
    fn missing_artifact_rejected() {
        let dir = TempDir::new().unwrap();
        let run = completed(dir.path(), false);
        let err = HardMacroLibrary::from_run(&run, "modA").unwrap_err();
        assert!(matches!(err, FlowError::MissingArtifact { ref path } if path.ends_with("A.lef")));
    }

    #[test]
    fn empty_artifact_rejected() {
        let dir = TempDir::new().unwrap();
        let run = completed(dir.path(), true);
        std::fs::write(run.artifact_path(ArtifactKind::Gds), "").unwrap();
        assert!(matches!(
            HardMacroLibrary::from_run(&run, "modA"),
            Err(FlowError::MissingArtifact { .. })
        ));
    }
}
