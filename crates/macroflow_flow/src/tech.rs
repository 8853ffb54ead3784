//! Built-in technology presets.

use crate::error::FlowError;
use serde::{Deserialize, Serialize};

/// A process technology and the defaults the flow uses with it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechPreset {
    /// Preset name as written in `macroflow.toml`.
    pub name: String,
    /// Process design kit.
    pub pdk: String,
    /// Standard-cell library used for synthesis.
    pub mainlib: String,
    /// Timing corner used for characterization. Also names the `.lib` views.
    pub corner: String,
    /// Flow graph to run.
    pub flow: String,
    /// Metal stack.
    pub stack: String,
    /// Target core utilization, in percent.
    pub density: u32,
}

impl TechPreset {
    /// SkyWater 130 nm with the high-density cell library.
    pub fn skywater130_demo() -> Self {
        Self {
            name: "skywater130_demo".to_string(),
            pdk: "skywater130".to_string(),
            mainlib: "sky130hd".to_string(),
            corner: "slow".to_string(),
            flow: "asicflow".to_string(),
            stack: "5M1LI".to_string(),
            density: 10,
        }
    }

    /// Looks a preset up by name.
    pub fn lookup(name: &str) -> Result<Self, FlowError> {
        match name {
            "skywater130_demo" => Ok(Self::skywater130_demo()),
            other => Err(FlowError::UnknownPreset(other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skywater_defaults() {
        let preset = TechPreset::lookup("skywater130_demo").unwrap();
        assert_eq!(preset.pdk, "skywater130");
        assert_eq!(preset.mainlib, "sky130hd");
        assert_eq!(preset.corner, "slow");
        assert_eq!(preset.flow, "asicflow");
        assert_eq!(preset.density, 10);
    }

    #[test]
    fn unknown_preset() {
        assert!(matches!(
            TechPreset::lookup("gf180_demo"),
            Err(FlowError::UnknownPreset(name)) if name == "gf180_demo"
        ));
    }
}
