//! Proof that a job finished successfully.

use crate::error::FlowError;
use crate::flow::FlowNode;
use crate::layout::BuildLayout;
use crate::record::{ArtifactKind, JobRecord, JobStatus};
use crate::summary::RunSummary;
use crate::tech::TechPreset;
use std::path::{Path, PathBuf};

/// A successful job.
///
/// Returned by [`Project::run`](crate::Project::run) or reloaded from a
/// succeeded job record. Hard-macro libraries can only be built from one.
#[derive(Debug, Clone)]
pub struct CompletedRun {
    record: JobRecord,
    layout: BuildLayout,
}

impl CompletedRun {
    pub(crate) fn new(record: JobRecord, layout: BuildLayout) -> Self {
        debug_assert_eq!(record.status, JobStatus::Succeeded);
        Self { record, layout }
    }

    /// Reloads `<build_root>/<design>/<job>/job.json`.
    ///
    /// Fails with [`FlowError::NotCompleted`] when there is no record or the
    /// recorded job did not succeed. A relative `build_root` is taken from
    /// the current directory and stored absolute.
    pub fn load(build_root: &Path, design: &str, job: &str) -> Result<Self, FlowError> {
        let build_root =
            std::path::absolute(build_root).map_err(|e| FlowError::io(build_root, e))?;
        let layout = BuildLayout::new(build_root, design, job);
        let not_completed = || FlowError::NotCompleted {
            design: design.to_string(),
            job: job.to_string(),
        };
        let path = layout.record_path();
        if !path.is_file() {
            return Err(not_completed());
        }
        let record = JobRecord::load(&path)?;
        if record.status != JobStatus::Succeeded || record.design != design {
            return Err(not_completed());
        }
        tracing::debug!(design, job, "reloaded completed run");
        Ok(Self { record, layout })
    }

    pub fn design(&self) -> &str {
        &self.record.design
    }

    pub fn job(&self) -> &str {
        &self.record.job
    }

    /// The top module, which a library built from this run provides as a cell.
    pub fn top(&self) -> &str {
        &self.record.top
    }

    pub fn preset(&self) -> &TechPreset {
        &self.record.preset
    }

    pub fn record(&self) -> &JobRecord {
        &self.record
    }

    pub fn layout(&self) -> &BuildLayout {
        &self.layout
    }

    /// Where an artifact of this run lives.
    pub fn artifact_path(&self, kind: ArtifactKind) -> PathBuf {
        match self.record.artifact(kind) {
            Some(artifact) => self.layout.output_file(&artifact.node, &artifact.file),
            None => self.layout.output_file(
                &FlowNode::new(kind.step(), 0),
                &kind.file_name(self.top(), &self.preset().corner),
            ),
        }
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary::new(&self.record, &self.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{NodeRecord, NodeStatus};
    use std::collections::BTreeMap;
    use tempfile::TempDir;

    fn record(status: JobStatus) -> JobRecord {
        JobRecord {
            macroflow_version: "0.1.0".to_string(),
            design: "A".to_string(),
            top: "A".to_string(),
            job: "job0".to_string(),
            preset: TechPreset::skywater130_demo(),
            status,
            nodes: vec![NodeRecord {
                node: FlowNode::new("synthesis", 0),
                status: NodeStatus::Success,
                metrics: BTreeMap::new(),
            }],
            artifacts: Vec::new(),
            libraries: Vec::new(),
            failure: None,
            started_unix: 0,
            finished_unix: 0,
        }
    }

    #[test]
    fn load_succeeded() {
        let dir = TempDir::new().unwrap();
        let layout = BuildLayout::new(dir.path(), "A", "job0");
        record(JobStatus::Succeeded).save(&layout.record_path()).unwrap();
        let run = CompletedRun::load(dir.path(), "A", "job0").unwrap();
        assert_eq!(run.design(), "A");
        assert_eq!(
            run.artifact_path(ArtifactKind::Lib),
            dir.path().join("A/job0/write.views/0/outputs/A.slow.lib")
        );
    }

    #[test]
    fn failed_record_is_not_completed() {
        let dir = TempDir::new().unwrap();
        let layout = BuildLayout::new(dir.path(), "A", "job0");
        record(JobStatus::Failed).save(&layout.record_path()).unwrap();
        assert!(matches!(
            CompletedRun::load(dir.path(), "A", "job0"),
            Err(FlowError::NotCompleted { .. })
        ));
    }

    #[test]
    fn missing_record_is_not_completed() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            CompletedRun::load(dir.path(), "A", "job0"),
            Err(FlowError::NotCompleted { .. })
        ));
    }
}
