//! macroflow CLI: build designs as hard macros and compose them.
//!
//! `macroflow init` scaffolds a project, `macroflow check` validates sources
//! and hard-macro wiring, `macroflow build` runs the flow tool for each design
//! in dependency order, and `macroflow demo` runs the built-in two-design
//! scenario.

#![warn(missing_docs)]

mod build;
mod check;
mod demo;
mod emit;
mod init;
mod pipeline;
mod summary;

use std::io::IsTerminal;
use std::process;

use clap::{Parser, Subcommand, ValueEnum};

/// macroflow: hard-macro ASIC builds.
#[derive(Parser, Debug)]
#[command(name = "macroflow", version, about = "Hard-macro ASIC build orchestration")]
pub struct Cli {
    /// Suppress all output except errors.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable verbose (debug-level) output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Control colored output.
    #[arg(long, global = true, value_enum, default_value_t = ColorChoice::Auto)]
    pub color: ColorChoice,

    /// Path to a `macroflow.toml` or the directory holding it.
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create a project with the built-in A/B sources.
    Init {
        /// Project name (creates a subdirectory). If omitted, initializes in
        /// the current directory.
        name: Option<String>,
    },
    /// Write the built-in sources into the project directory.
    Emit,
    /// Parse sources and check tops and instantiations.
    Check(CheckArgs),
    /// Run the flow for one or all designs.
    Build(BuildArgs),
    /// Print the recorded summary of a job.
    Summary(SummaryArgs),
    /// Run the built-in scenario: harden A, then build B around two copies.
    Demo(DemoArgs),
}

/// Arguments for `macroflow check`.
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// Output format.
    #[arg(short, long, value_enum, default_value_t = ReportFormat::Text)]
    pub format: ReportFormat,
}

/// Arguments for `macroflow build`.
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Design to build. All designs are built when omitted.
    pub design: Option<String>,

    /// Also build the hard macros the design depends on.
    #[arg(long)]
    pub with_deps: bool,
}

/// Arguments for `macroflow summary`.
#[derive(Parser, Debug)]
pub struct SummaryArgs {
    /// Design whose job to report.
    pub design: String,

    /// Job name (default: the workspace job).
    #[arg(long)]
    pub job: Option<String>,
}

/// Arguments for `macroflow demo`.
#[derive(Parser, Debug)]
pub struct DemoArgs {
    /// Directory the sources and build tree are written to.
    #[arg(long, default_value = ".")]
    pub workdir: String,

    /// Flow executable (default: `sc`).
    #[arg(long)]
    pub tool: Option<String>,
}

/// Controls whether colored output is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ColorChoice {
    /// Detect from terminal capabilities.
    Auto,
    /// Always produce colored output.
    Always,
    /// Never produce colored output.
    Never,
}

/// Output format for `check`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Human-readable terminal output.
    Text,
    /// Machine-readable JSON output.
    Json,
}

/// Global settings derived from CLI flags.
pub struct GlobalArgs {
    /// Whether to suppress non-error output.
    pub quiet: bool,
    /// Whether to print verbose/debug information.
    pub verbose: bool,
    /// Whether to use colored output.
    pub color: bool,
    /// Optional path to a custom config file.
    pub config: Option<String>,
}

fn main() {
    let cli = Cli::parse();

    let color = match cli.color {
        ColorChoice::Auto => std::io::stderr().is_terminal(),
        ColorChoice::Always => true,
        ColorChoice::Never => false,
    };

    let global = GlobalArgs {
        quiet: cli.quiet,
        verbose: cli.verbose,
        color,
        config: cli.config,
    };

    if let Err(e) = init_tracing(global.quiet, global.verbose) {
        eprintln!("warning: {e}");
    }

    let result = match cli.command {
        Command::Init { name } => init::run(name, &global),
        Command::Emit => emit::run(&global),
        Command::Check(ref args) => check::run(args, &global),
        Command::Build(ref args) => build::run(args, &global),
        Command::Summary(ref args) => summary::run(args, &global),
        Command::Demo(ref args) => demo::run(args, &global),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    }
}

/// Installs the `tracing` subscriber. `MACROFLOW_LOG` overrides the level
/// chosen by `--quiet`/`--verbose`.
fn init_tracing(quiet: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let filter = tracing_subscriber::EnvFilter::try_from_env("MACROFLOW_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level(quiet, verbose)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| format!("failed to initialize tracing subscriber: {e}"))?;
    Ok(())
}

fn log_level(quiet: bool, verbose: bool) -> &'static str {
    if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "warn"
    }
}
