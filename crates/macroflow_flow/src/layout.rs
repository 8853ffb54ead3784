//! Where a job's files live under the build root.
//!
//! `<build>/<design>/<job>/<step>/<index>/outputs/<file>` for node outputs,
//! with the manifest, record, and tool log directly in the job directory.

use crate::flow::FlowNode;
use std::path::{Path, PathBuf};

/// File name of the persisted job record.
pub const RECORD_FILE: &str = "job.json";

/// Paths of one job of one design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    build_root: PathBuf,
    design: String,
    job: String,
}

impl BuildLayout {
    /// Creates the layout for `design`/`job` under `build_root`.
    pub fn new(build_root: impl Into<PathBuf>, design: &str, job: &str) -> Self {
        Self {
            build_root: build_root.into(),
            design: design.to_string(),
            job: job.to_string(),
        }
    }

    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    pub fn design(&self) -> &str {
        &self.design
    }

    pub fn job(&self) -> &str {
        &self.job
    }

    /// `<build>/<design>/<job>`
    pub fn job_dir(&self) -> PathBuf {
        self.build_root.join(&self.design).join(&self.job)
    }

    /// `<jobdir>/<step>/<index>`
    pub fn node_dir(&self, node: &FlowNode) -> PathBuf {
        self.job_dir().join(&node.step).join(node.index.to_string())
    }

    /// `<jobdir>/<step>/<index>/outputs`
    pub fn outputs_dir(&self, node: &FlowNode) -> PathBuf {
        self.node_dir(node).join("outputs")
    }

    /// A file inside a node's outputs.
    pub fn output_file(&self, node: &FlowNode, file: &str) -> PathBuf {
        self.outputs_dir(node).join(file)
    }

    /// Optional per-node metrics written by the flow.
    pub fn metrics_file(&self, node: &FlowNode) -> PathBuf {
        self.output_file(node, &format!("{}.metrics.json", self.design))
    }

    /// The manifest handed to the flow tool.
    pub fn manifest_path(&self) -> PathBuf {
        self.job_dir().join(format!("{}.pkg.json", self.design))
    }

    pub fn record_path(&self) -> PathBuf {
        self.job_dir().join(RECORD_FILE)
    }

    /// Captured standard output and error of the flow tool.
    pub fn log_path(&self) -> PathBuf {
        self.job_dir().join(format!("{}.log", self.design))
    }

    /// Directory for files generated before the run, such as SDC from clocks.
    pub fn inputs_dir(&self) -> PathBuf {
        self.job_dir().join("inputs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flow::WRITE_VIEWS;

    #[test]
    fn conventional_paths() {
        let layout = BuildLayout::new("./build", "A", "job0");
        let views = FlowNode::new(WRITE_VIEWS, 0);
        assert_eq!(layout.job_dir(), PathBuf::from("./build/A/job0"));
        assert_eq!(
            layout.output_file(&views, "A.lef"),
            PathBuf::from("./build/A/job0/write.views/0/outputs/A.lef")
        );
        assert_eq!(
            layout.metrics_file(&views),
            PathBuf::from("./build/A/job0/write.views/0/outputs/A.metrics.json")
        );
        assert_eq!(layout.manifest_path(), PathBuf::from("./build/A/job0/A.pkg.json"));
        assert_eq!(layout.record_path(), PathBuf::from("./build/A/job0/job.json"));
    }

    #[test]
    fn separate_designs_do_not_share_job_dirs() {
        let a = BuildLayout::new("build", "A", "job0");
        let b = BuildLayout::new("build", "B", "job0");
        assert_ne!(a.job_dir(), b.job_dir());
    }
}
