//! `macroflow check`: parse every design's sources and validate its top
//! module and instantiations without running the flow.

use macroflow_config::load_config;
use macroflow_diagnostics::{DiagnosticRenderer, JsonRenderer};
use macroflow_flow::{BuildPlan, FlowError, HdlSession, PreflightReport, Resolution};
use macroflow_hdl::Direction;

use crate::pipeline::{render_diagnostics, resolve_project_root, status};
use crate::{CheckArgs, GlobalArgs, ReportFormat};

/// Runs the `macroflow check` command.
///
/// Returns exit code 0 if no design has errors, 1 otherwise.
pub fn run(args: &CheckArgs, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = resolve_project_root(global)?;
    let config = load_config(&project_dir)?;
    let plan = BuildPlan::new(&config, &project_dir, None, false)?;
    let mut session = HdlSession::new();

    if args.format == ReportFormat::Text {
        status(global, "Checking", &config.workspace.name);
    }

    let mut reports = Vec::new();
    let mut failed = 0usize;
    for name in plan.order() {
        match plan.check(name, &mut session) {
            Ok(report) => reports.push(report),
            Err(e @ (FlowError::Rejected { .. } | FlowError::TopNotFound { .. })) => {
                tracing::debug!(design = %name, error = %e, "check failed");
                failed += 1;
            }
            Err(e) => return Err(e.into()),
        }
        if args.format == ReportFormat::Text {
            render_diagnostics(&session, global);
        }
    }

    match args.format {
        ReportFormat::Text => {
            for report in &reports {
                print!("{}", format_report(report));
            }
            if !global.quiet {
                eprintln!(
                    "{:>12} {} design(s) ok, {} with errors",
                    "Result",
                    reports.len(),
                    failed
                );
            }
        }
        ReportFormat::Json => {
            let renderer = JsonRenderer;
            let diagnostics: Vec<serde_json::Value> = session
                .sink
                .take_all()
                .iter()
                .filter_map(|d| serde_json::from_str(&renderer.render(d, &session.sources)).ok())
                .collect();
            let out = serde_json::json!({
                "designs": reports,
                "diagnostics": diagnostics,
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }

    Ok(if failed > 0 { 1 } else { 0 })
}

/// Ports and instances of each module, one per line.
fn format_report(report: &PreflightReport) -> String {
    let mut out = format!("design {} (top {})\n", report.design, report.top);
    for module in &report.modules {
        out.push_str(&format!("  module {}\n", module.name));
        for port in &module.ports {
            let direction = match port.direction {
                Some(Direction::Input) => "input",
                Some(Direction::Output) => "output",
                Some(Direction::Inout) => "inout",
                None => "?",
            };
            let width = port.width.map_or_else(|| "?".to_string(), |w| w.to_string());
            out.push_str(&format!("    {direction:<6} {} [{width}]\n", port.name));
        }
        for inst in &module.instances {
            let source = match &inst.resolution {
                Resolution::Local => "local".to_string(),
                Resolution::Library { library } => format!("hard macro from {library}"),
                Resolution::Unresolved => "unresolved".to_string(),
            };
            out.push_str(&format!("    {}: {} ({source})\n", inst.name, inst.module));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroflow_flow::{InstanceInfo, ModuleInfo, PortInfo};
    use std::path::PathBuf;

    #[test]
    fn report_lists_ports_and_macros() {
        let report = PreflightReport {
            design: "B".to_string(),
            top: "B".to_string(),
            files: vec![PathBuf::from("B.v")],
            modules: vec![ModuleInfo {
                name: "B".to_string(),
                ports: vec![
                    PortInfo {
                        name: "clk".to_string(),
                        direction: Some(Direction::Input),
                        width: Some(1),
                    },
                    PortInfo {
                        name: "y1".to_string(),
                        direction: Some(Direction::Output),
                        width: Some(32),
                    },
                ],
                instances: vec![InstanceInfo {
                    name: "u1".to_string(),
                    module: "A".to_string(),
                    resolution: Resolution::Library {
                        library: "modA".to_string(),
                    },
                }],
            }],
        };
        assert_eq!(
            format_report(&report),
            "design B (top B)\n  module B\n    input  clk [1]\n    output y1 [32]\n    u1: A (hard macro from modA)\n"
        );
    }
}
