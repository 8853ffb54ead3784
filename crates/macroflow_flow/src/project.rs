//! A design configured for one job: filesets, constraints, libraries, and
//! technology. Running it consumes the project and yields a [`CompletedRun`].

use crate::backend::{FlowBackend, RunRequest};
use crate::check::{preflight, PreflightReport};
use crate::constraint::Constraints;
use crate::design::Design;
use crate::error::FlowError;
use crate::flow::{flow_nodes, node_for_step, FlowNode};
use crate::layout::BuildLayout;
use crate::library::HardMacroLibrary;
use crate::manifest::{JobManifest, ManifestConstraints, ManifestFlow, ManifestLibrary};
use crate::record::{
    unix_now, ArtifactKind, ArtifactRecord, JobRecord, JobStatus, NodeRecord, NodeStatus,
};
use crate::run::CompletedRun;
use crate::session::HdlSession;
use crate::tech::TechPreset;
use macroflow_common::{ContentHash, InternalError};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Default job name.
pub const DEFAULT_JOB: &str = "job0";

/// A design plus everything needed to run it through the flow.
#[derive(Debug, Clone)]
pub struct Project {
    design: Design,
    build_root: PathBuf,
    job: String,
    filesets: Vec<String>,
    constraints: Constraints,
    libraries: Vec<HardMacroLibrary>,
    preset: Option<TechPreset>,
}

impl Project {
    /// Creates a project building into `<dataroot>/build`.
    pub fn new(design: Design) -> Self {
        let build_root = design.dataroot().join("build");
        Self {
            design,
            build_root,
            job: DEFAULT_JOB.to_string(),
            filesets: Vec::new(),
            constraints: Constraints::default(),
            libraries: Vec::new(),
            preset: None,
        }
    }

    pub fn design(&self) -> &Design {
        &self.design
    }

    pub fn set_build_root(&mut self, root: impl Into<PathBuf>) {
        self.build_root = root.into();
    }

    pub fn set_job(&mut self, job: impl Into<String>) {
        self.job = job.into();
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    /// Activates one of the design's filesets. Activating twice is a no-op.
    pub fn add_fileset(&mut self, fileset: &str) -> Result<(), FlowError> {
        if !self.design.has_fileset(fileset) {
            return Err(FlowError::UnknownFileset {
                design: self.design.name().to_string(),
                fileset: fileset.to_string(),
            });
        }
        if !self.filesets.iter().any(|f| f == fileset) {
            self.filesets.push(fileset.to_string());
        }
        Ok(())
    }

    pub fn filesets(&self) -> &[String] {
        &self.filesets
    }

    pub fn constraint(&self) -> &Constraints {
        &self.constraints
    }

    /// Fixes this project's die to `width` x `height` microns.
    pub fn set_diearea_rectangle(&mut self, width: f64, height: f64) -> Result<(), FlowError> {
        self.constraints.area.set_diearea_rectangle(width, height)
    }

    /// Attaches an SDC file. Relative paths are resolved against the data root.
    pub fn add_constraint(&mut self, sdc: impl AsRef<Path>) {
        let path = self.design.dataroot().join(sdc);
        if !self.constraints.timing.contains(&path) {
            self.constraints.timing.push(path);
        }
    }

    /// Attaches a hard-macro library. Names must be unique per project.
    pub fn add_asic_lib(&mut self, library: HardMacroLibrary) -> Result<(), FlowError> {
        if self.libraries.iter().any(|l| l.name() == library.name()) {
            return Err(FlowError::DuplicateLibrary(library.name().to_string()));
        }
        tracing::debug!(design = self.design.name(), library = library.name(), "library attached");
        self.libraries.push(library);
        Ok(())
    }

    pub fn libraries(&self) -> &[HardMacroLibrary] {
        &self.libraries
    }

    pub fn apply_preset(&mut self, preset: TechPreset) {
        self.preset = Some(preset);
    }

    pub fn preset(&self) -> Option<&TechPreset> {
        self.preset.as_ref()
    }

    /// Where this project's job lives.
    pub fn layout(&self) -> BuildLayout {
        BuildLayout::new(&self.build_root, self.design.name(), &self.job)
    }

    /// Runs pre-flight without touching the build tree.
    pub fn check(&self, session: &mut HdlSession) -> Result<PreflightReport, FlowError> {
        if self.filesets.is_empty() {
            return Err(FlowError::NoActiveFileset(self.design.name().to_string()));
        }
        preflight(&self.design, &self.filesets, &self.libraries, session)
    }

    /// Active filesets with every file made absolute.
    fn manifest_filesets(&self) -> Result<BTreeMap<String, Vec<PathBuf>>, FlowError> {
        let mut filesets = BTreeMap::new();
        for fileset in &self.filesets {
            if let Some(files) = self.design.files(fileset) {
                filesets.insert(fileset.clone(), absolute_all(files)?);
            }
        }
        Ok(filesets)
    }

    /// Attached libraries with every backing file made absolute.
    fn manifest_libraries(&self) -> Result<Vec<ManifestLibrary>, FlowError> {
        let mut views = Vec::with_capacity(self.libraries.len());
        for library in &self.libraries {
            let mut view = ManifestLibrary::from(library);
            for fileset in view.filesets.values_mut() {
                fileset.files = absolute_all(&fileset.files)?;
            }
            views.push(view);
        }
        Ok(views)
    }

    /// Runs the job and verifies its artifacts.
    ///
    /// A job record is written whether or not the run succeeds; only a
    /// success yields a [`CompletedRun`].
    pub fn run(
        self,
        backend: &dyn FlowBackend,
        session: &mut HdlSession,
    ) -> Result<CompletedRun, FlowError> {
        let name = self.design.name().to_string();
        let preset = self.preset.clone().ok_or_else(|| FlowError::NoPreset(name.clone()))?;
        let report = self.check(session)?;
        let nodes = flow_nodes(&preset.flow).ok_or_else(|| {
            InternalError::new(format!("preset '{}' names unknown flow '{}'", preset.name, preset.flow))
        })?;

        let build_root = absolute(&self.build_root)?;
        let layout = BuildLayout::new(&build_root, &name, &self.job);
        let job_dir = layout.job_dir();
        for node in &nodes {
            let dir = layout.node_dir(node);
            if dir.exists() {
                std::fs::remove_dir_all(&dir).map_err(|e| FlowError::io(&dir, e))?;
            }
        }
        std::fs::create_dir_all(&job_dir).map_err(|e| FlowError::io(&job_dir, e))?;
        let record_path = layout.record_path();
        if record_path.exists() {
            std::fs::remove_file(&record_path).map_err(|e| FlowError::io(&record_path, e))?;
        }

        let work_dir = absolute(self.design.dataroot())?;
        let manifest_path = job_dir.join(format!("{name}.pkg.json"));
        let log_path = job_dir.join(format!("{name}.log"));

        let manifest = JobManifest {
            design: name.clone(),
            top: report.top.clone(),
            job: self.job.clone(),
            jobdir: job_dir.clone(),
            preset: preset.clone(),
            flow: ManifestFlow {
                name: preset.flow.clone(),
                nodes: nodes.clone(),
            },
            filesets: self.manifest_filesets()?,
            constraints: ManifestConstraints {
                sdc: absolute_all(&self.constraints.timing)?,
                ..ManifestConstraints::new(&self.constraints, &preset)
            },
            libraries: self.manifest_libraries()?,
        };
        manifest.write(&manifest_path)?;

        let mut record = JobRecord {
            macroflow_version: env!("CARGO_PKG_VERSION").to_string(),
            design: name.clone(),
            top: report.top.clone(),
            job: self.job.clone(),
            preset: preset.clone(),
            status: JobStatus::Failed,
            nodes: Vec::new(),
            artifacts: Vec::new(),
            libraries: self.libraries.iter().map(|l| l.name().to_string()).collect(),
            failure: None,
            started_unix: unix_now(),
            finished_unix: 0,
        };

        tracing::info!(design = %name, job = %self.job, backend = backend.name(), "running flow");
        let request = RunRequest {
            design: &name,
            job: &self.job,
            manifest: &manifest_path,
            job_dir: &job_dir,
            work_dir: &work_dir,
            log: &log_path,
        };
        let executed = backend.execute(&request);
        record.nodes = collect_nodes(&layout, &nodes);
        if let Err(e) = executed {
            return Err(fail(record, &layout, e));
        }

        let first_failed = record.failed_nodes().next().map(|n| n.node.to_string());
        if let Some(node) = first_failed {
            let err = FlowError::NodeFailed {
                design: name.clone(),
                node,
            };
            return Err(fail(record, &layout, err));
        }

        for kind in ArtifactKind::ALL {
            let node = node_for_step(&nodes, kind.step())?;
            match verify_artifact(&layout, node, kind, &report.top, &preset.corner) {
                Ok(artifact) => record.artifacts.push(artifact),
                Err(e) => return Err(fail(record, &layout, e)),
            }
        }

        record.status = JobStatus::Succeeded;
        record.finished_unix = unix_now();
        record.save(&layout.record_path())?;
        tracing::info!(design = %name, job = %self.job, "job completed");
        Ok(CompletedRun::new(record, layout))
    }
}

/// Saves `record` as failed and hands back `err`.
fn fail(mut record: JobRecord, layout: &BuildLayout, err: FlowError) -> FlowError {
    record.status = JobStatus::Failed;
    record.failure = Some(err.to_string());
    record.finished_unix = unix_now();
    if let Err(save) = record.save(&layout.record_path()) {
        tracing::warn!(error = %save, "could not save failed job record");
    }
    tracing::error!(design = %record.design, job = %record.job, error = %err, "job failed");
    err
}

/// The tool runs in the work directory, so the manifest never carries a
/// path relative to the caller's.
fn absolute(path: &Path) -> Result<PathBuf, FlowError> {
    std::path::absolute(path).map_err(|e| FlowError::io(path, e))
}

fn absolute_all(paths: &[PathBuf]) -> Result<Vec<PathBuf>, FlowError> {
    paths.iter().map(|p| absolute(p)).collect()
}

/// Node statuses from the presence of each `outputs/` directory.
fn collect_nodes(layout: &BuildLayout, nodes: &[FlowNode]) -> Vec<NodeRecord> {
    nodes
        .iter()
        .map(|node| {
            let status = if layout.outputs_dir(node).is_dir() {
                NodeStatus::Success
            } else {
                NodeStatus::Failed
            };
            NodeRecord {
                node: node.clone(),
                status,
                metrics: read_metrics(&layout.metrics_file(node)),
            }
        })
        .collect()
}

/// Reads a flat JSON object of numbers. Missing files give no metrics;
/// malformed ones are logged and ignored.
fn read_metrics(path: &Path) -> BTreeMap<String, f64> {
    let Ok(content) = std::fs::read_to_string(path) else {
        return BTreeMap::new();
    };
    match serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&content) {
        Ok(map) => map
            .into_iter()
            .filter_map(|(key, value)| Some((key, value.as_f64()?)))
            .collect(),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "ignoring malformed metrics");
            BTreeMap::new()
        }
    }
}

fn verify_artifact(
    layout: &BuildLayout,
    node: &FlowNode,
    kind: ArtifactKind,
    top: &str,
    corner: &str,
) -> Result<ArtifactRecord, FlowError> {
    let file = kind.file_name(top, corner);
    let path = layout.output_file(node, &file);
    let size = match std::fs::metadata(&path) {
        Ok(meta) if meta.is_file() && meta.len() > 0 => meta.len(),
        _ => return Err(FlowError::MissingArtifact { path }),
    };
    let hash = ContentHash::from_file(&path).map_err(|e| FlowError::io(&path, e))?;
    Ok(ArtifactRecord {
        kind,
        node: node.clone(),
        file,
        size,
        hash,
    })
}
