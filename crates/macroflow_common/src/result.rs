//! Internal error type for bugs in macroflow itself.

/// Result type for operations whose only failure mode is an internal bug.
///
/// Problems in user input (bad Verilog, a top module that does not exist)
/// are reported as diagnostics instead; problems with the external flow are
/// reported through the flow crate's own error type.
pub type MacroflowResult<T> = Result<T, InternalError>;

/// An invariant inside macroflow was broken.
#[derive(Debug, thiserror::Error)]
#[error("internal error: {message}")]
pub struct InternalError {
    /// Description of the broken invariant.
    pub message: String,
}

impl InternalError {
    /// Creates a new internal error.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<String> for InternalError {
    fn from(message: String) -> Self {
        Self { message }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_format() {
        let err = InternalError::new("flow graph has no write.views node");
        assert_eq!(
            format!("{err}"),
            "internal error: flow graph has no write.views node"
        );
    }

    #[test]
    fn from_string() {
        let err: InternalError = "oops".to_string().into();
        assert_eq!(err.message, "oops");
        let r: MacroflowResult<()> = Err(err);
        assert!(r.is_err());
    }
}
