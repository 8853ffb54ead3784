//! `macroflow init`: scaffold a project holding the built-in A/B scenario.

use std::fs;
use std::path::{Path, PathBuf};

use macroflow_config::CONFIG_FILE;
use macroflow_flow::emit_builtin;

use crate::pipeline::status;
use crate::GlobalArgs;

/// Runs the `macroflow init` command.
///
/// If `name` is `Some`, creates a new subdirectory with that name.
/// Otherwise initializes in the current working directory.
pub fn run(name: Option<String>, global: &GlobalArgs) -> Result<i32, Box<dyn std::error::Error>> {
    let project_dir = match &name {
        Some(n) => {
            let dir = PathBuf::from(n);
            if dir.exists() {
                return Err(format!("directory '{n}' already exists").into());
            }
            fs::create_dir_all(&dir)?;
            dir
        }
        None => std::env::current_dir()?,
    };
    scaffold(&project_dir, global)?;
    Ok(0)
}

/// Writes `macroflow.toml` and the built-in sources into `root`.
fn scaffold(root: &Path, global: &GlobalArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config_path = root.join(CONFIG_FILE);
    if config_path.exists() {
        return Err(format!("{} already exists", config_path.display()).into());
    }

    let project_name = root
        .canonicalize()?
        .file_name()
        .and_then(|n| n.to_str())
        .map_or_else(|| "hard_macro_demo".to_string(), str::to_string);
    status(global, "Creating", format!("macroflow project `{project_name}`"));

    fs::write(&config_path, config_template(&project_name))?;
    status(global, "Created", config_path.display());
    for (path, _) in emit_builtin(root)? {
        status(global, "Created", path.display());
    }
    Ok(())
}

/// The project file for the built-in scenario.
fn config_template(name: &str) -> String {
    format!(
        r#"[workspace]
name = "{name}"
build_dir = "build"
job = "job0"

[target]
preset = "skywater130_demo"

[tool]
command = "sc"
args = ["-cfg", "{{manifest}}"]

[clocks.clk]
period = "100ns"
port = "clk"

# A is hardened on its own and published as the library `modA`.
[designs.A]
sources = "A.v"
constraints = ["top.sdc"]
library_name = "modA"

# B instantiates A twice as a hard macro on a fixed 1000 x 1000 die.
[designs.B]
sources = ["B.v"]
constraints = ["top.sdc"]
hard_macros = ["A"]
die_area = [1000.0, 1000.0]
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroflow_config::{build_order, load_config};
    use tempfile::TempDir;

    fn quiet() -> GlobalArgs {
        GlobalArgs {
            quiet: true,
            verbose: false,
            color: false,
            config: None,
        }
    }

    #[test]
    fn scaffold_creates_config_and_sources() {
        let dir = TempDir::new().unwrap();
        scaffold(dir.path(), &quiet()).unwrap();
        for file in [CONFIG_FILE, "A.v", "B.v", "top.sdc"] {
            assert!(dir.path().join(file).is_file(), "{file} missing");
        }
        let config = load_config(dir.path()).unwrap();
        assert_eq!(build_order(&config, None).unwrap(), vec!["A", "B"]);
        assert_eq!(config.tool.args, vec!["-cfg", "{manifest}"]);
        assert_eq!(config.designs["B"].die_area, Some([1000.0, 1000.0]));
    }

    #[test]
    fn refuses_existing_config() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CONFIG_FILE), "").unwrap();
        let err = scaffold(dir.path(), &quiet()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn template_uses_project_name() {
        assert!(config_template("chip").starts_with("[workspace]\nname = \"chip\"\n"));
    }
}
