//! Human-readable report of a job.

use crate::layout::BuildLayout;
use crate::record::{ArtifactKind, JobRecord, JobStatus, NodeRecord, NodeStatus};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// Node table and artifact list of one job, as printed by `macroflow summary`.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub design: String,
    pub job: String,
    pub top: String,
    pub preset: String,
    pub status: JobStatus,
    pub nodes: Vec<NodeRecord>,
    pub artifacts: Vec<SummaryArtifact>,
    pub failure: Option<String>,
    pub elapsed_secs: u64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryArtifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub size: u64,
    pub hash: String,
}

impl RunSummary {
    pub fn new(record: &JobRecord, layout: &BuildLayout) -> Self {
        Self {
            design: record.design.clone(),
            job: record.job.clone(),
            top: record.top.clone(),
            preset: record.preset.name.clone(),
            status: record.status,
            nodes: record.nodes.clone(),
            artifacts: record
                .artifacts
                .iter()
                .map(|a| SummaryArtifact {
                    kind: a.kind,
                    path: layout.output_file(&a.node, &a.file),
                    size: a.size,
                    hash: a.hash.short(),
                })
                .collect(),
            failure: record.failure.clone(),
            elapsed_secs: record.finished_unix.saturating_sub(record.started_unix),
        }
    }

    /// Metric names reported by any node, sorted.
    pub fn metric_names(&self) -> Vec<&str> {
        let names: BTreeSet<&str> = self
            .nodes
            .iter()
            .flat_map(|n| n.metrics.keys().map(String::as_str))
            .collect();
        names.into_iter().collect()
    }
}

fn format_metric(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.0}")
    } else {
        format!("{value:.3}")
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let status = match self.status {
            JobStatus::Succeeded => "succeeded",
            JobStatus::Failed => "failed",
        };
        writeln!(
            f,
            "{} ({}) job {} with {}: {} in {}s",
            self.design, self.top, self.job, self.preset, status, self.elapsed_secs
        )?;

        let metrics = self.metric_names();
        let mut rows: Vec<Vec<String>> = Vec::with_capacity(self.nodes.len() + 1);
        let mut header = vec!["node".to_string(), "status".to_string()];
        header.extend(metrics.iter().map(|m| m.to_string()));
        rows.push(header);
        for node in &self.nodes {
            let mut row = vec![
                node.node.to_string(),
                match node.status {
                    NodeStatus::Success => "success".to_string(),
                    NodeStatus::Failed => "failed".to_string(),
                },
            ];
            row.extend(metrics.iter().map(|m| {
                node.metrics
                    .get(*m)
                    .map_or_else(|| "-".to_string(), |v| format_metric(*v))
            }));
            rows.push(row);
        }

        let columns = rows[0].len();
        let widths: Vec<usize> = (0..columns)
            .map(|c| rows.iter().map(|r| r[c].len()).max().unwrap_or(0))
            .collect();
        for row in &rows {
            let cells: Vec<String> = row
                .iter()
                .zip(&widths)
                .map(|(cell, width)| format!("{cell:<width$}"))
                .collect();
            writeln!(f, "  {}", cells.join("  ").trim_end())?;
        }

        if !self.artifacts.is_empty() {
            writeln!(f, "artifacts:")?;
            for artifact in &self.artifacts {
                let kind = match artifact.kind {
                    ArtifactKind::Lef => "lef",
                    ArtifactKind::Lib => "lib",
                    ArtifactKind::Gds => "gds",
                };
                writeln!(
                    f,
                    "  {kind}  {}  {} bytes  {}",
                    artifact.path.display(),
                    artifact.size,
                    artifact.hash
                )?;
            }
        }
        if let Some(failure) = &self.failure {
            writeln!(f, "failure: {failure}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::completed_run;
    use tempfile::TempDir;

    #[test]
    fn table_lists_every_node_and_artifact() {
        let dir = TempDir::new().unwrap();
        let mut run = completed_run(dir.path(), "A", "A");
        let mut record = run.record().clone();
        record.nodes[1].metrics.insert("cellarea".to_string(), 1234.5);
        record.nodes[5].metrics.insert("wirelength".to_string(), 88.0);
        run = crate::run::CompletedRun::new(record, run.layout().clone());

        let summary = run.summary();
        assert_eq!(summary.metric_names(), vec!["cellarea", "wirelength"]);
        let text = summary.to_string();
        assert!(text.starts_with("A (A) job job0 with skywater130_demo: succeeded"));
        assert!(text.contains("synthesis/0"));
        assert!(text.contains("1234.500"));
        assert!(text.contains("88"));
        assert!(text.contains("write.views/0/outputs/A.slow.lib"));
        assert_eq!(text.lines().filter(|l| l.contains("/0 ")).count(), 9);
    }

    #[test]
    fn failure_reason_printed() {
        let dir = TempDir::new().unwrap();
        let run = completed_run(dir.path(), "A", "A");
        let mut record = run.record().clone();
        record.status = JobStatus::Failed;
        record.artifacts.clear();
        record.failure = Some("node route/0 of design 'A' produced no outputs".to_string());
        let text = RunSummary::new(&record, run.layout()).to_string();
        assert!(text.contains(": failed in"));
        assert!(!text.contains("artifacts:"));
        assert!(text.ends_with("failure: node route/0 of design 'A' produced no outputs\n"));
    }

    #[test]
    fn metric_formatting() {
        assert_eq!(format_metric(3.0), "3");
        assert_eq!(format_metric(0.25), "0.250");
    }
}
