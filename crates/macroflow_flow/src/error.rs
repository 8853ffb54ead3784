//! Errors raised while preparing, running, and reading back flow jobs.

use macroflow_common::InternalError;
use macroflow_config::ConfigError;
use std::path::PathBuf;

/// Everything that can stop a design from reaching a completed run.
#[derive(Debug, thiserror::Error)]
pub enum FlowError {
    /// A filesystem operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// The path being read or written.
        path: PathBuf,
        /// The underlying error.
        source: std::io::Error,
    },

    /// The project file could not be used.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// No built-in technology preset has this name.
    #[error("unknown technology preset '{0}'")]
    UnknownPreset(String),

    /// A fileset was referenced that the design does not have.
    #[error("design '{design}' has no fileset '{fileset}'")]
    UnknownFileset {
        /// Design name.
        design: String,
        /// Fileset name.
        fileset: String,
    },

    /// A fileset was declared without files.
    #[error("fileset '{fileset}' of design '{design}' has no files")]
    EmptyFileset {
        /// Design name.
        design: String,
        /// Fileset name.
        fileset: String,
    },

    /// The declared top module is not defined by the fileset's files.
    #[error("top module '{top}' is not defined in fileset '{fileset}' of design '{design}'")]
    TopNotFound {
        /// Design name.
        design: String,
        /// Requested top module.
        top: String,
        /// Fileset searched.
        fileset: String,
    },

    /// None of the active filesets declares a top module.
    #[error("design '{0}' has no top module in its active filesets")]
    NoTopModule(String),

    /// Source or pre-flight diagnostics with error severity were emitted.
    #[error("design '{design}' has {errors} error(s)")]
    Rejected {
        /// Design name.
        design: String,
        /// Number of error diagnostics.
        errors: usize,
    },

    /// The project was run before a technology preset was applied.
    #[error("project '{0}' has no technology preset")]
    NoPreset(String),

    /// The project was run without any active fileset.
    #[error("project '{0}' has no active fileset")]
    NoActiveFileset(String),

    /// Two attached libraries share a name.
    #[error("library '{0}' is already attached")]
    DuplicateLibrary(String),

    /// The die area is not a positive rectangle.
    #[error("invalid die area {width} x {height}")]
    InvalidDieArea {
        /// Requested width.
        width: f64,
        /// Requested height.
        height: f64,
    },

    /// The flow executable could not be started.
    #[error("flow tool '{command}' not found")]
    ToolNotFound {
        /// The command that was spawned.
        command: String,
    },

    /// The flow executable exited unsuccessfully.
    #[error("flow tool failed for design '{design}' ({status})")]
    ToolFailed {
        /// Design name.
        design: String,
        /// Exit status description.
        status: String,
        /// Last lines of the tool's standard error.
        stderr_tail: String,
    },

    /// A flow node left no `outputs/` directory behind.
    #[error("node {node} of design '{design}' produced no outputs")]
    NodeFailed {
        /// Design name.
        design: String,
        /// `step/index`.
        node: String,
    },

    /// A required artifact is absent or empty.
    #[error("artifact {path} is missing or empty")]
    MissingArtifact {
        /// Expected location.
        path: PathBuf,
    },

    /// A job has no successful record on disk.
    #[error("design '{design}' has no completed run for job '{job}'")]
    NotCompleted {
        /// Design name.
        design: String,
        /// Job name.
        job: String,
    },

    /// A broken invariant inside macroflow.
    #[error(transparent)]
    Internal(#[from] InternalError),

    /// A manifest, record, or metrics file could not be (de)serialized.
    #[error("invalid JSON in {path}: {reason}")]
    Json {
        /// The file involved.
        path: PathBuf,
        /// Parser message.
        reason: String,
    },
}

impl FlowError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FlowError::Io {
            path: path.into(),
            source,
        }
    }
}
