//! Error types for loading and validating `macroflow.toml`.

/// Errors raised while reading or checking a project file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("failed to read configuration: {0}")]
    IoError(#[from] std::io::Error),

    /// The TOML is malformed or does not match the schema.
    #[error("failed to parse configuration: {0}")]
    ParseError(String),

    /// A design name was requested that the file does not define.
    #[error("unknown design '{0}'")]
    UnknownDesign(String),

    /// A required field is empty.
    #[error("missing required field: {0}")]
    MissingField(String),

    /// A value is present but unusable.
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Hard-macro dependencies form a cycle through the named design.
    #[error("hard-macro dependency cycle through design '{0}'")]
    DependencyCycle(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_unknown_design() {
        let err = ConfigError::UnknownDesign("C".to_string());
        assert_eq!(format!("{err}"), "unknown design 'C'");
    }

    #[test]
    fn display_cycle() {
        let err = ConfigError::DependencyCycle("A".to_string());
        assert_eq!(
            format!("{err}"),
            "hard-macro dependency cycle through design 'A'"
        );
    }

    #[test]
    fn display_missing_field() {
        let err = ConfigError::MissingField("designs.A.sources".to_string());
        assert_eq!(
            format!("{err}"),
            "missing required field: designs.A.sources"
        );
    }

    #[test]
    fn io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: ConfigError = io.into();
        assert!(format!("{err}").starts_with("failed to read configuration:"));
    }
}
