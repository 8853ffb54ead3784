//! Configuration types deserialized from `macroflow.toml`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer};
use std::collections::BTreeMap;

/// The whole project file.
#[derive(Debug, Deserialize)]
pub struct MacroflowConfig {
    /// Workspace name and build directory layout.
    pub workspace: WorkspaceMeta,
    /// Technology preset applied to every design.
    #[serde(default)]
    pub target: TargetConfig,
    /// The external flow command.
    #[serde(default)]
    pub tool: ToolConfig,
    /// Named clocks, used to generate SDC when a design lists no constraint files.
    #[serde(default)]
    pub clocks: BTreeMap<String, ClockDef>,
    /// Designs keyed by name.
    #[serde(default)]
    pub designs: BTreeMap<String, DesignConfig>,
}

/// `[workspace]`
#[derive(Debug, Deserialize)]
pub struct WorkspaceMeta {
    /// Workspace name, used in log lines.
    pub name: String,
    /// Root of the build tree, relative to the project directory.
    #[serde(default = "default_build_dir")]
    pub build_dir: String,
    /// Job name under each design's build directory.
    #[serde(default = "default_job")]
    pub job: String,
}

/// `[target]`
#[derive(Debug, Deserialize)]
pub struct TargetConfig {
    /// Name of a built-in technology preset.
    #[serde(default = "default_preset")]
    pub preset: String,
}

impl Default for TargetConfig {
    fn default() -> Self {
        Self {
            preset: default_preset(),
        }
    }
}

/// `[tool]`
///
/// `args` may contain the placeholders `{manifest}`, `{design}`, `{job}`, and
/// `{jobdir}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolConfig {
    /// Executable to spawn.
    #[serde(default = "default_command")]
    pub command: String,
    /// Arguments passed to the executable.
    #[serde(default = "default_args")]
    pub args: Vec<String>,
    /// Extra environment variables for the tool process.
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

impl Default for ToolConfig {
    fn default() -> Self {
        Self {
            command: default_command(),
            args: default_args(),
            env: BTreeMap::new(),
        }
    }
}

/// `[clocks.<name>]`
#[derive(Debug, Deserialize)]
pub struct ClockDef {
    /// Period or frequency, e.g. `"100ns"` or `"10MHz"`.
    pub period: String,
    /// Top-level port driving the clock.
    pub port: String,
}

/// `[designs.<name>]`
#[derive(Debug, Deserialize)]
pub struct DesignConfig {
    /// Top module; defaults to the design name.
    #[serde(default)]
    pub top: Option<String>,
    /// HDL sources, relative to the project directory.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub sources: Vec<String>,
    /// Fileset the sources are filed under.
    #[serde(default = "default_fileset")]
    pub fileset: String,
    /// SDC files; when empty, SDC is generated from `[clocks]`.
    #[serde(default, deserialize_with = "deserialize_string_or_vec")]
    pub constraints: Vec<String>,
    /// Die area as `[width, height]` in microns.
    #[serde(default)]
    pub die_area: Option<[f64; 2]>,
    /// Other designs instantiated as hard macros.
    #[serde(default)]
    pub hard_macros: Vec<String>,
    /// Name of the library this design is published as when used as a hard macro.
    #[serde(default)]
    pub library_name: Option<String>,
}

fn default_build_dir() -> String {
    "build".to_string()
}

fn default_job() -> String {
    "job0".to_string()
}

fn default_preset() -> String {
    "skywater130_demo".to_string()
}

fn default_command() -> String {
    "sc".to_string()
}

fn default_args() -> Vec<String> {
    vec!["-cfg".to_string(), "{manifest}".to_string()]
}

fn default_fileset() -> String {
    "verilog".to_string()
}

/// Accepts either `sources = "A.v"` or `sources = ["A.v", "pkg.v"]`.
fn deserialize_string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
            Ok(vec![v.to_string()])
        }

        fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
            let mut vec = Vec::new();
            while let Some(val) = seq.next_element::<String>()? {
                vec.push(val);
            }
            Ok(vec)
        }
    }

    deserializer.deserialize_any(StringOrVec)
}
