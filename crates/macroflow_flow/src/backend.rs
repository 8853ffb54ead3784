//! Execution of a job by a flow tool.

use crate::error::FlowError;
use macroflow_config::ToolConfig;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::Path;
use std::process::{Command, Stdio};

/// Environment variable carrying the manifest path to the tool.
pub const MANIFEST_ENV: &str = "MACROFLOW_MANIFEST";

/// Lines of standard error kept in [`FlowError::ToolFailed`].
const STDERR_TAIL_LINES: usize = 20;

/// One job for a backend to execute.
#[derive(Debug, Clone, Copy)]
pub struct RunRequest<'a> {
    pub design: &'a str,
    pub job: &'a str,
    /// The written job manifest.
    pub manifest: &'a Path,
    /// `<build>/<design>/<job>`, where node outputs must appear.
    pub job_dir: &'a Path,
    /// Directory the tool runs in.
    pub work_dir: &'a Path,
    /// File receiving the tool's output.
    pub log: &'a Path,
}

/// Something that turns a job manifest into node outputs.
///
/// Implementations report only whether the tool ran; node status is read
/// back from the job directory afterwards.
pub trait FlowBackend {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Runs the job to completion.
    fn execute(&self, request: &RunRequest<'_>) -> Result<(), FlowError>;
}

/// Spawns an external command per job.
///
/// Arguments may contain `{manifest}`, `{design}`, `{job}`, and `{jobdir}`.
#[derive(Debug, Clone)]
pub struct ExternalBackend {
    command: String,
    args: Vec<String>,
    env: BTreeMap<String, String>,
}

impl ExternalBackend {
    pub fn new(command: impl Into<String>, args: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
            env: BTreeMap::new(),
        }
    }

    /// Builds a backend from the `[tool]` table.
    pub fn from_tool(tool: &ToolConfig) -> Self {
        Self {
            command: tool.command.clone(),
            args: tool.args.clone(),
            env: tool.env.clone(),
        }
    }

    /// Adds an environment variable for the tool.
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Arguments after placeholder substitution.
    pub fn expand_args(&self, request: &RunRequest<'_>) -> Vec<String> {
        let manifest = request.manifest.display().to_string();
        let jobdir = request.job_dir.display().to_string();
        self.args
            .iter()
            .map(|arg| {
                arg.replace("{manifest}", &manifest)
                    .replace("{design}", request.design)
                    .replace("{job}", request.job)
                    .replace("{jobdir}", &jobdir)
            })
            .collect()
    }
}

impl FlowBackend for ExternalBackend {
    fn name(&self) -> &str {
        &self.command
    }

    fn execute(&self, request: &RunRequest<'_>) -> Result<(), FlowError> {
        let args = self.expand_args(request);
        tracing::info!(command = %self.command, args = ?args, design = request.design, "spawning flow tool");

        let output = Command::new(&self.command)
            .args(&args)
            .current_dir(request.work_dir)
            .env(MANIFEST_ENV, request.manifest)
            .envs(&self.env)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output();

        let output = match output {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(FlowError::ToolNotFound {
                    command: self.command.clone(),
                })
            }
            Err(e) => return Err(FlowError::io(&self.command, e)),
        };

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        for line in stdout.lines() {
            tracing::debug!(target: "macroflow::tool", "{line}");
        }
        let mut log = String::with_capacity(stdout.len() + stderr.len());
        log.push_str(&stdout);
        log.push_str(&stderr);
        std::fs::write(request.log, log).map_err(|e| FlowError::io(request.log, e))?;

        if !output.status.success() {
            let lines: Vec<&str> = stderr.lines().collect();
            let tail = lines[lines.len().saturating_sub(STDERR_TAIL_LINES)..].join("\n");
            return Err(FlowError::ToolFailed {
                design: request.design.to_string(),
                status: output.status.to_string(),
                stderr_tail: tail,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn request<'a>(dir: &'a Path, manifest: &'a Path, log: &'a Path) -> RunRequest<'a> {
        RunRequest {
            design: "A",
            job: "job0",
            manifest,
            job_dir: dir,
            work_dir: dir,
            log,
        }
    }

    #[test]
    fn placeholders_substituted() {
        let backend = ExternalBackend::new("sc", ["-cfg", "{manifest}", "-design={design}", "{jobdir}/{job}"]);
        let req = request(
            Path::new("/b/A/job0"),
            Path::new("/b/A/job0/A.pkg.json"),
            Path::new("/b/A/job0/A.log"),
        );
        assert_eq!(
            backend.expand_args(&req),
            vec!["-cfg", "/b/A/job0/A.pkg.json", "-design=A", "/b/A/job0/job0"]
        );
    }

    #[test]
    fn from_tool_table() {
        let tool = ToolConfig {
            command: "sc".to_string(),
            args: vec!["-cfg".to_string(), "{manifest}".to_string()],
            env: BTreeMap::from([("SC_HOME".to_string(), "/opt/sc".to_string())]),
        };
        let backend = ExternalBackend::from_tool(&tool);
        assert_eq!(backend.name(), "sc");
        assert_eq!(backend.env["SC_HOME"], "/opt/sc");
    }

    #[cfg(unix)]
    #[test]
    fn missing_command() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("A.pkg.json");
        let log = dir.path().join("A.log");
        let backend = ExternalBackend::new("macroflow-no-such-tool", Vec::<String>::new());
        let err = backend.execute(&request(dir.path(), &manifest, &log)).unwrap_err();
        assert!(matches!(err, FlowError::ToolNotFound { ref command } if command == "macroflow-no-such-tool"));
    }

    #[cfg(unix)]
    #[test]
    fn non_zero_exit_keeps_stderr_tail() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("A.pkg.json");
        let log = dir.path().join("A.log");
        let backend = ExternalBackend::new("sh", ["-c", "echo working; echo broken >&2; exit 3"]);
        let err = backend.execute(&request(dir.path(), &manifest, &log)).unwrap_err();
        match err {
            FlowError::ToolFailed { design, stderr_tail, .. } => {
                assert_eq!(design, "A");
                assert_eq!(stderr_tail, "broken");
            }
            other => panic!("unexpected error: {other}"),
        }
        let captured = std::fs::read_to_string(&log).unwrap();
        assert!(captured.contains("working"));
        assert!(captured.contains("broken"));
    }

    #[cfg(unix)]
    #[test]
    fn manifest_env_visible_to_tool() {
        let dir = TempDir::new().unwrap();
        let manifest = dir.path().join("A.pkg.json");
        let log = dir.path().join("A.log");
        let backend = ExternalBackend::new("sh", ["-c", "echo \"$MACROFLOW_MANIFEST $EXTRA\""])
            .with_env("EXTRA", "yes");
        backend.execute(&request(dir.path(), &manifest, &log)).unwrap();
        let captured = std::fs::read_to_string(&log).unwrap();
        assert_eq!(captured.trim(), format!("{} yes", manifest.display()));
    }
}
