//! Turning `macroflow.toml` into projects, in hard-macro dependency order.

use crate::backend::FlowBackend;
use crate::check::{preflight_cells, PreflightReport};
use crate::design::{Design, DesignBuilder};
use crate::emit::{emit_source, sdc_from_clocks};
use crate::error::FlowError;
use crate::library::HardMacroLibrary;
use crate::project::Project;
use crate::run::CompletedRun;
use crate::session::HdlSession;
use crate::tech::TechPreset;
use macroflow_config::{build_order, resolve_design, MacroflowConfig, ResolvedDesign};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// The designs one invocation builds, in order.
#[derive(Debug)]
pub struct BuildPlan<'c> {
    config: &'c MacroflowConfig,
    project_dir: PathBuf,
    order: Vec<String>,
}

impl<'c> BuildPlan<'c> {
    /// Plans a build of every design, or of `only`.
    ///
    /// With `only` and without `with_deps` the plan holds just that design;
    /// its hard macros must already have completed runs on disk.
    pub fn new(
        config: &'c MacroflowConfig,
        project_dir: &Path,
        only: Option<&str>,
        with_deps: bool,
    ) -> Result<Self, FlowError> {
        let project_dir = project_dir
            .canonicalize()
            .map_err(|e| FlowError::io(project_dir, e))?;
        let order = match only {
            Some(name) if !with_deps => {
                // Validates the name and the whole graph.
                build_order(config, Some(name))?;
                vec![name.to_string()]
            }
            _ => build_order(config, only)?,
        };
        tracing::debug!(order = ?order, "build plan");
        Ok(Self {
            config,
            project_dir,
            order,
        })
    }

    pub fn order(&self) -> &[String] {
        &self.order
    }

    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// `<project>/<workspace.build_dir>`
    pub fn build_root(&self) -> PathBuf {
        self.project_dir.join(&self.config.workspace.build_dir)
    }

    pub fn job(&self) -> &str {
        &self.config.workspace.job
    }

    pub fn resolve(&self, name: &str) -> Result<ResolvedDesign, FlowError> {
        Ok(resolve_design(self.config, &self.project_dir, name)?)
    }

    /// Builds the design descriptor of `name`.
    pub fn design(&self, name: &str, session: &mut HdlSession) -> Result<Design, FlowError> {
        let resolved = self.resolve(name)?;
        Self::descriptor(&self.project_dir, &resolved, session)
    }

    fn descriptor(
        project_dir: &Path,
        resolved: &ResolvedDesign,
        session: &mut HdlSession,
    ) -> Result<Design, FlowError> {
        let mut builder = DesignBuilder::new(&resolved.name).set_dataroot(project_dir);
        for source in &resolved.sources {
            builder = builder.add_file(source, &resolved.fileset);
        }
        builder
            .set_topmodule(&resolved.top, &resolved.fileset)
            .build(session)
    }

    /// Pre-flight for `name`, treating each hard macro as the cell its
    /// design's top module would become. Nothing needs to be built first.
    pub fn check(&self, name: &str, session: &mut HdlSession) -> Result<PreflightReport, FlowError> {
        let resolved = self.resolve(name)?;
        let design = Self::descriptor(&self.project_dir, &resolved, session)?;
        let mut provided = BTreeMap::new();
        for dep in &resolved.hard_macros {
            let dep = self.resolve(dep)?;
            provided.entry(dep.top).or_insert(dep.library_name);
        }
        preflight_cells(&design, &[resolved.fileset], &provided, session)
    }

    /// Configures the project for `name`.
    ///
    /// Hard macros come from `completed` when this invocation built them,
    /// otherwise from their job records on disk. Without SDC files the
    /// configured clocks are written to `<jobdir>/inputs/<name>.sdc`.
    pub fn prepare(
        &self,
        name: &str,
        completed: &BTreeMap<String, CompletedRun>,
        session: &mut HdlSession,
    ) -> Result<Project, FlowError> {
        let resolved = self.resolve(name)?;
        let design = Self::descriptor(&self.project_dir, &resolved, session)?;

        let mut project = Project::new(design);
        project.set_build_root(self.build_root());
        project.set_job(self.job());
        project.add_fileset(&resolved.fileset)?;
        project.apply_preset(TechPreset::lookup(&resolved.preset)?);

        if !resolved.constraints.is_empty() {
            for sdc in &resolved.constraints {
                project.add_constraint(sdc);
            }
        } else if !resolved.clocks.is_empty() {
            let path = project.layout().inputs_dir().join(format!("{name}.sdc"));
            emit_source(&path, &sdc_from_clocks(&resolved.clocks))?;
            project.add_constraint(&path);
        }

        if let Some((width, height)) = resolved.die_area {
            project.set_diearea_rectangle(width, height)?;
        }

        for dep in &resolved.hard_macros {
            let run = match completed.get(dep) {
                Some(run) => run.clone(),
                None => CompletedRun::load(&self.build_root(), dep, self.job())?,
            };
            let library_name = self.resolve(dep)?.library_name;
            project.add_asic_lib(HardMacroLibrary::from_run(&run, &library_name)?)?;
        }
        Ok(project)
    }

    /// Prepares and runs every planned design in order.
    pub fn run_all(
        &self,
        backend: &dyn FlowBackend,
        session: &mut HdlSession,
    ) -> Result<BTreeMap<String, CompletedRun>, FlowError> {
        let mut completed = BTreeMap::new();
        for name in &self.order {
            let project = self.prepare(name, &completed, session)?;
            let run = project.run(backend, session)?;
            completed.insert(name.clone(), run);
        }
        Ok(completed)
    }
}
