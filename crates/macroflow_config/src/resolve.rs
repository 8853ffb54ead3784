//! Design resolution and hard-macro build ordering.

use crate::error::ConfigError;
use crate::types::MacroflowConfig;
use macroflow_common::ClockPeriod;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// A clock with its period parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedClock {
    /// Clock name in the SDC.
    pub name: String,
    /// Period.
    pub period: ClockPeriod,
    /// Port the clock is created on.
    pub port: String,
}

/// One design with defaults filled in and paths anchored at the project directory.
#[derive(Debug, Clone)]
pub struct ResolvedDesign {
    /// Design name.
    pub name: String,
    /// Top module.
    pub top: String,
    /// Fileset the sources belong to.
    pub fileset: String,
    /// Absolute or project-relative source paths.
    pub sources: Vec<PathBuf>,
    /// SDC files.
    pub constraints: Vec<PathBuf>,
    /// Clocks, used when `constraints` is empty.
    pub clocks: Vec<ResolvedClock>,
    /// Die area override as `(width, height)`.
    pub die_area: Option<(f64, f64)>,
    /// Designs instantiated as hard macros, in declaration order.
    pub hard_macros: Vec<String>,
    /// Name this design is published under as a library.
    pub library_name: String,
    /// Technology preset name.
    pub preset: String,
}

/// Resolves a named design against the project directory.
pub fn resolve_design(
    config: &MacroflowConfig,
    project_dir: &Path,
    name: &str,
) -> Result<ResolvedDesign, ConfigError> {
    let design = config
        .designs
        .get(name)
        .ok_or_else(|| ConfigError::UnknownDesign(name.to_string()))?;

    let mut clocks = Vec::with_capacity(config.clocks.len());
    for (clock_name, def) in &config.clocks {
        let period = def.period.parse::<ClockPeriod>().map_err(|e| {
            ConfigError::ValidationError(format!("clock '{clock_name}': {e}"))
        })?;
        clocks.push(ResolvedClock {
            name: clock_name.clone(),
            period,
            port: def.port.clone(),
        });
    }

    Ok(ResolvedDesign {
        name: name.to_string(),
        top: design.top.clone().unwrap_or_else(|| name.to_string()),
        fileset: design.fileset.clone(),
        sources: design.sources.iter().map(|s| project_dir.join(s)).collect(),
        constraints: design
            .constraints
            .iter()
            .map(|s| project_dir.join(s))
            .collect(),
        clocks,
        die_area: design.die_area.map(|[w, h]| (w, h)),
        hard_macros: design.hard_macros.clone(),
        library_name: design
            .library_name
            .clone()
            .unwrap_or_else(|| format!("mod{name}")),
        preset: config.target.preset.clone(),
    })
}

/// Orders designs so every hard macro comes before the designs that use it.
///
/// When `only` is given, the result is restricted to that design and the
/// macros it transitively depends on. Ties are broken by name so the order
/// is stable across runs.
pub fn build_order(
    config: &MacroflowConfig,
    only: Option<&str>,
) -> Result<Vec<String>, ConfigError> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let nodes: BTreeMap<&str, NodeIndex> = config
        .designs
        .keys()
        .map(|name| (name.as_str(), graph.add_node(name.as_str())))
        .collect();

    for (name, design) in &config.designs {
        for dep in &design.hard_macros {
            let from = *nodes.get(dep.as_str()).ok_or_else(|| {
                ConfigError::ValidationError(format!(
                    "design '{name}' uses unknown hard macro '{dep}'"
                ))
            })?;
            graph.add_edge(from, nodes[name.as_str()], ());
        }
    }

    // Nodes were inserted in name order, so the DFS inside toposort is stable.
    let sorted = toposort(&graph, None)
        .map_err(|cycle| ConfigError::DependencyCycle(graph[cycle.node_id()].to_string()))?;

    let wanted = match only {
        None => None,
        Some(target) => {
            let start = *nodes
                .get(target)
                .ok_or_else(|| ConfigError::UnknownDesign(target.to_string()))?;
            let mut keep = vec![start];
            let mut stack = vec![start];
            while let Some(node) = stack.pop() {
                for dep in graph.neighbors_directed(node, petgraph::Direction::Incoming) {
                    if !keep.contains(&dep) {
                        keep.push(dep);
                        stack.push(dep);
                    }
                }
            }
            Some(keep)
        }
    };

    Ok(sorted
        .into_iter()
        .filter(|n| wanted.as_ref().map_or(true, |keep| keep.contains(n)))
        .map(|n| graph[n].to_string())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::load_config_from_str;

    fn config(designs: &str) -> MacroflowConfig {
        load_config_from_str(&format!(
            "[workspace]\nname = \"w\"\n\n[clocks.clk]\nperiod = \"100ns\"\nport = \"clk\"\n\n{designs}"
        ))
        .unwrap()
    }

    #[test]
    fn macro_before_user() {
        let cfg = config(
            r#"
[designs.B]
sources = "B.v"
hard_macros = ["A"]

[designs.A]
sources = "A.v"
"#,
        );
        assert_eq!(build_order(&cfg, None).unwrap(), vec!["A", "B"]);
    }

    #[test]
    fn chain_of_macros() {
        let cfg = config(
            r#"
[designs.top]
sources = "top.v"
hard_macros = ["B"]

[designs.B]
sources = "B.v"
hard_macros = ["A"]

[designs.A]
sources = "A.v"
"#,
        );
        let order = build_order(&cfg, None).unwrap();
        let pos = |n: &str| order.iter().position(|x| x == n).unwrap();
        assert!(pos("A") < pos("B"));
        assert!(pos("B") < pos("top"));
    }

    #[test]
    fn restrict_to_one_design() {
        let cfg = config(
            r#"
[designs.A]
sources = "A.v"

[designs.B]
sources = "B.v"
hard_macros = ["A"]

[designs.unrelated]
sources = "u.v"
"#,
        );
        assert_eq!(build_order(&cfg, Some("B")).unwrap(), vec!["A", "B"]);
        assert_eq!(build_order(&cfg, Some("A")).unwrap(), vec!["A"]);
        assert!(matches!(
            build_order(&cfg, Some("C")),
            Err(ConfigError::UnknownDesign(_))
        ));
    }

    #[test]
    fn two_design_cycle() {
        let cfg = config(
            r#"
[designs.A]
sources = "A.v"
hard_macros = ["B"]

[designs.B]
sources = "B.v"
hard_macros = ["A"]
"#,
        );
        assert!(matches!(
            build_order(&cfg, None),
            Err(ConfigError::DependencyCycle(_))
        ));
    }

    #[test]
    fn resolve_fills_defaults() {
        let cfg = config(
            r#"
[designs.B]
sources = "B.v"
hard_macros = ["A"]
die_area = [1000.0, 1000.0]

[designs.A]
sources = "A.v"
"#,
        );
        let b = resolve_design(&cfg, Path::new("/work"), "B").unwrap();
        assert_eq!(b.top, "B");
        assert_eq!(b.fileset, "verilog");
        assert_eq!(b.sources, vec![PathBuf::from("/work/B.v")]);
        assert_eq!(b.die_area, Some((1000.0, 1000.0)));
        assert_eq!(b.library_name, "modB");
        assert_eq!(b.preset, "skywater130_demo");
        assert_eq!(b.clocks.len(), 1);
        assert_eq!(b.clocks[0].period.ns(), 100.0);

        let a = resolve_design(&cfg, Path::new("/work"), "A").unwrap();
        assert!(a.die_area.is_none());
    }

    #[test]
    fn resolve_unknown() {
        let cfg = config("");
        assert!(matches!(
            resolve_design(&cfg, Path::new("."), "X"),
            Err(ConfigError::UnknownDesign(_))
        ));
    }
}
