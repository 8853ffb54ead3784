//! Parsing and validation of `macroflow.toml` project files.
//!
//! A project file names the technology preset, the external tool command,
//! clocks, and any number of designs. Designs may depend on each other as
//! hard macros; [`build_order`] sorts them so every macro is built before
//! the designs that instantiate it.

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod resolve;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str, CONFIG_FILE};
pub use resolve::{build_order, resolve_design, ResolvedClock, ResolvedDesign};
pub use types::*;
