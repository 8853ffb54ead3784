//! The persisted record of a finished job.
//!
//! Written to `<jobdir>/job.json` after every run, successful or not. A later
//! invocation rebuilds a completed run (and from it a hard-macro library or
//! a summary) from this file alone.

use crate::error::FlowError;
use crate::flow::{FlowNode, WRITE_GDS, WRITE_VIEWS};
use crate::tech::TechPreset;
use macroflow_common::ContentHash;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

/// Outcome of a whole job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Succeeded,
    Failed,
}

/// Outcome of one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Success,
    Failed,
}

/// One node's status and the metrics it reported.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub node: FlowNode,
    pub status: NodeStatus,
    #[serde(default)]
    pub metrics: BTreeMap<String, f64>,
}

/// The three views a hard macro is made of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    /// Physical abstract.
    Lef,
    /// Liberty timing model at the preset's corner.
    Lib,
    /// Full layout.
    Gds,
}

impl ArtifactKind {
    pub const ALL: [ArtifactKind; 3] = [ArtifactKind::Lef, ArtifactKind::Lib, ArtifactKind::Gds];

    /// File name produced for `top` at `corner`.
    pub fn file_name(self, top: &str, corner: &str) -> String {
        match self {
            ArtifactKind::Lef => format!("{top}.lef"),
            ArtifactKind::Lib => format!("{top}.{corner}.lib"),
            ArtifactKind::Gds => format!("{top}.gds"),
        }
    }

    /// The step that writes this artifact.
    pub fn step(self) -> &'static str {
        match self {
            ArtifactKind::Lef | ArtifactKind::Lib => WRITE_VIEWS,
            ArtifactKind::Gds => WRITE_GDS,
        }
    }
}

/// A verified final artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactRecord {
    pub kind: ArtifactKind,
    /// Node whose `outputs/` holds the file.
    pub node: FlowNode,
    pub file: String,
    pub size: u64,
    pub hash: ContentHash,
}

/// Everything known about one job after it ran.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    /// Version of macroflow that wrote the record.
    pub macroflow_version: String,
    pub design: String,
    pub top: String,
    pub job: String,
    pub preset: TechPreset,
    pub status: JobStatus,
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub artifacts: Vec<ArtifactRecord>,
    /// Names of the hard-macro libraries the job consumed.
    #[serde(default)]
    pub libraries: Vec<String>,
    /// Why the job failed, when it did.
    #[serde(default)]
    pub failure: Option<String>,
    pub started_unix: u64,
    pub finished_unix: u64,
}

impl JobRecord {
    /// Reads a record from disk.
    pub fn load(path: &Path) -> Result<Self, FlowError> {
        let content = std::fs::read_to_string(path).map_err(|e| FlowError::io(path, e))?;
        serde_json::from_str(&content).map_err(|e| FlowError::Json {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Writes the record as pretty JSON, creating parent directories.
    pub fn save(&self, path: &Path) -> Result<(), FlowError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| FlowError::io(parent, e))?;
        }
        let json = serde_json::to_string_pretty(self).map_err(|e| FlowError::Json {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        std::fs::write(path, json).map_err(|e| FlowError::io(path, e))
    }

    /// The record entry for an artifact kind.
    pub fn artifact(&self, kind: ArtifactKind) -> Option<&ArtifactRecord> {
        self.artifacts.iter().find(|a| a.kind == kind)
    }

    /// Nodes that did not succeed.
    pub fn failed_nodes(&self) -> impl Iterator<Item = &NodeRecord> {
        self.nodes.iter().filter(|n| n.status == NodeStatus::Failed)
    }
}

/// Seconds since the Unix epoch, or zero if the clock is before it.
pub fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_secs())
}
