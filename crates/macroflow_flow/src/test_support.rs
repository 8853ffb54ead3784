//! Fixtures shared by unit tests in this crate.

use crate::flow::flow_nodes;
use crate::layout::BuildLayout;
use crate::record::{
    unix_now, ArtifactKind, ArtifactRecord, JobRecord, JobStatus, NodeRecord, NodeStatus,
};
use crate::run::CompletedRun;
use crate::tech::TechPreset;
use macroflow_common::ContentHash;
use std::collections::BTreeMap;
use std::path::Path;

/// A succeeded job of `design` whose three artifacts exist under `build_root`.
pub(crate) fn completed_run(build_root: &Path, design: &str, top: &str) -> CompletedRun {
    let preset = TechPreset::skywater130_demo();
    let layout = BuildLayout::new(build_root, design, "job0");
    let nodes = flow_nodes(&preset.flow).unwrap();
    let mut artifacts = Vec::new();
    for kind in ArtifactKind::ALL {
        let node = nodes.iter().find(|n| n.step == kind.step()).unwrap();
        let file = kind.file_name(top, &preset.corner);
        let path = layout.output_file(node, &file);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, format!("{file}\n")).unwrap();
        artifacts.push(ArtifactRecord {
            kind,
            node: node.clone(),
            size: file.len() as u64 + 1,
            hash: ContentHash::from_file(&path).unwrap(),
            file,
        });
    }
    let record = JobRecord {
        macroflow_version: env!("CARGO_PKG_VERSION").to_string(),
        design: design.to_string(),
        top: top.to_string(),
        job: "job0".to_string(),
        preset,
        status: JobStatus::Succeeded,
        nodes: nodes
            .into_iter()
            .map(|node| NodeRecord {
                node,
                status: NodeStatus::Success,
                metrics: BTreeMap::new(),
            })
            .collect(),
        artifacts,
        libraries: Vec::new(),
        failure: None,
        started_unix: unix_now(),
        finished_unix: unix_now(),
    };
    CompletedRun::new(record, layout)
}
