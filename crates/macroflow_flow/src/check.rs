//! Pre-flight validation of a project's sources against its libraries.
//!
//! Every instantiated module must be defined by the active filesets or be a
//! cell of an attached hard-macro library. Violations are `E202` diagnostics
//! and reject the project before any tool runs.

use crate::design::Design;
use crate::error::FlowError;
use crate::library::HardMacroLibrary;
use crate::session::HdlSession;
use macroflow_diagnostics::{Diagnostic, DiagnosticCode};
use macroflow_hdl::Direction;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// How an instance's module was found.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Resolution {
    /// Defined in the design's own sources.
    Local,
    /// A cell of an attached hard-macro library.
    Library { library: String },
    /// Not found anywhere.
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PortInfo {
    pub name: String,
    pub direction: Option<Direction>,
    /// `None` when the range depends on something that does not evaluate.
    pub width: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InstanceInfo {
    pub name: String,
    pub module: String,
    pub resolution: Resolution,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleInfo {
    pub name: String,
    pub ports: Vec<PortInfo>,
    pub instances: Vec<InstanceInfo>,
}

/// What pre-flight learned about one design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreflightReport {
    pub design: String,
    pub top: String,
    pub files: Vec<PathBuf>,
    pub modules: Vec<ModuleInfo>,
}

impl PreflightReport {
    pub fn module(&self, name: &str) -> Option<&ModuleInfo> {
        self.modules.iter().find(|m| m.name == name)
    }

    /// Instances served by `library`, across all modules.
    pub fn instances_from<'a>(&'a self, library: &'a str) -> impl Iterator<Item = &'a InstanceInfo> {
        self.modules.iter().flat_map(|m| &m.instances).filter(move |i| {
            matches!(&i.resolution, Resolution::Library { library: l } if l == library)
        })
    }
}

/// Checks the active `filesets` of `design` with `libraries` attached.
///
/// The top module is taken from the first active fileset that declares one.
pub fn preflight(
    design: &Design,
    filesets: &[String],
    libraries: &[HardMacroLibrary],
    session: &mut HdlSession,
) -> Result<PreflightReport, FlowError> {
    let mut provided = BTreeMap::new();
    for library in libraries {
        for cell in library.cells() {
            provided
                .entry(cell.clone())
                .or_insert_with(|| library.name().to_string());
        }
    }
    preflight_cells(design, filesets, &provided, session)
}

/// Like [`preflight`], with libraries given as a cell to library-name map.
///
/// Lets a design be checked against macros that have not been built yet.
pub fn preflight_cells(
    design: &Design,
    filesets: &[String],
    provided: &BTreeMap<String, String>,
    session: &mut HdlSession,
) -> Result<PreflightReport, FlowError> {
    let mut files: Vec<PathBuf> = Vec::new();
    let mut top = None;
    for fileset in filesets {
        let set = design.files(fileset).ok_or_else(|| FlowError::UnknownFileset {
            design: design.name().to_string(),
            fileset: fileset.clone(),
        })?;
        for file in set {
            if !files.contains(file) {
                files.push(file.clone());
            }
        }
        top = top.or_else(|| design.top(fileset).map(|t| (t.to_string(), fileset.clone())));
    }
    let (top, top_fileset) = top.ok_or_else(|| FlowError::NoTopModule(design.name().to_string()))?;

    let errors_before = session.sink.error_count();
    let ids = session.parse_all(&files)?;

    let index = session.index(&ids);
    let interner = &session.interner;
    let sink = &session.sink;

    if !interner.get(&top).is_some_and(|t| index.contains(t)) {
        sink.emit(Diagnostic::error(
            DiagnosticCode::TOP_NOT_FOUND,
            format!("top module `{top}` is not defined in fileset `{top_fileset}`"),
        ));
        return Err(FlowError::TopNotFound {
            design: design.name().to_string(),
            top,
            fileset: top_fileset,
        });
    }

    let mut modules = Vec::new();
    for module in index.modules() {
        let name = interner.resolve(module.name);
        if let Some(library) = provided.get(name) {
            sink.emit(
                Diagnostic::warning(
                    DiagnosticCode::SHADOWED_MACRO,
                    format!("module `{name}` is defined locally and also provided by library `{library}`"),
                )
                .at(module.name_span)
                .with_label("this definition is used")
                .with_help(format!("remove it from the sources to use the hard macro from `{library}`")),
            );
        }

        let ports = module
            .ports
            .iter()
            .map(|port| PortInfo {
                name: interner.resolve(port.name).to_string(),
                direction: port.direction,
                width: module.signal_width(port.name),
            })
            .collect();

        let mut instances = Vec::new();
        for inst in &module.instances {
            let target = interner.resolve(inst.module);
            let resolution = if index.contains(inst.module) {
                Resolution::Local
            } else if let Some(library) = provided.get(target) {
                Resolution::Library {
                    library: library.to_string(),
                }
            } else {
                sink.emit(
                    Diagnostic::error(
                        DiagnosticCode::UNRESOLVED_MODULE,
                        format!("module `{target}` is not defined and no attached library provides it"),
                    )
                    .at(inst.module_span)
                    .with_label(format!("instance `{}`", interner.resolve(inst.name)))
                    .with_help(format!("add the file defining `{target}` or attach a hard-macro library built from it")),
                );
                Resolution::Unresolved
            };
            instances.push(InstanceInfo {
                name: interner.resolve(inst.name).to_string(),
                module: target.to_string(),
                resolution,
            });
        }

        modules.push(ModuleInfo {
            name: name.to_string(),
            ports,
            instances,
        });
    }

    let errors = sink.error_count() - errors_before;
    if errors > 0 {
        return Err(FlowError::Rejected {
            design: design.name().to_string(),
            errors,
        });
    }

    tracing::debug!(design = design.name(), modules = modules.len(), "pre-flight passed");
    Ok(PreflightReport {
        design: design.name().to_string(),
        top,
        files,
        modules,
    })
}
