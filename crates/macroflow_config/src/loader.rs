//! Loading and validating `macroflow.toml`.

use crate::error::ConfigError;
use crate::types::MacroflowConfig;
use macroflow_common::ClockPeriod;
use std::path::Path;

/// File name of the project file inside a project directory.
pub const CONFIG_FILE: &str = "macroflow.toml";

/// Reads `<project_dir>/macroflow.toml`, parses it, and validates it.
pub fn load_config(project_dir: &Path) -> Result<MacroflowConfig, ConfigError> {
    let content = std::fs::read_to_string(project_dir.join(CONFIG_FILE))?;
    load_config_from_str(&content)
}

/// Parses and validates project-file text.
pub fn load_config_from_str(content: &str) -> Result<MacroflowConfig, ConfigError> {
    let config: MacroflowConfig =
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
    validate_config(&config)?;
    Ok(config)
}

fn validate_config(config: &MacroflowConfig) -> Result<(), ConfigError> {
    if config.workspace.name.is_empty() {
        return Err(ConfigError::MissingField("workspace.name".to_string()));
    }
    if config.workspace.job.is_empty() || config.workspace.job.contains(['/', '\\']) {
        return Err(ConfigError::ValidationError(format!(
            "job name '{}' must be a single path component",
            config.workspace.job
        )));
    }
    if config.tool.command.is_empty() {
        return Err(ConfigError::MissingField("tool.command".to_string()));
    }

    for (name, clock) in &config.clocks {
        clock.period.parse::<ClockPeriod>().map_err(|e| {
            ConfigError::ValidationError(format!("clock '{name}': {e}"))
        })?;
        if clock.port.is_empty() {
            return Err(ConfigError::MissingField(format!("clocks.{name}.port")));
        }
    }

    for (name, design) in &config.designs {
        if design.sources.is_empty() {
            return Err(ConfigError::MissingField(format!("designs.{name}.sources")));
        }
        if let Some([w, h]) = design.die_area {
            if !(w > 0.0 && h > 0.0) {
                return Err(ConfigError::ValidationError(format!(
                    "design '{name}': die area must be positive, got {w} x {h}"
                )));
            }
        }
        for dep in &design.hard_macros {
            if dep == name {
                return Err(ConfigError::DependencyCycle(name.clone()));
            }
            if !config.designs.contains_key(dep) {
                return Err(ConfigError::ValidationError(format!(
                    "design '{name}' uses unknown hard macro '{dep}'"
                )));
            }
        }
    }
    Ok(())
}
