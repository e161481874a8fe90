use std::fmt;
use thiserror::Error;

/// Structural error codes produced by the hierarchy normalizer
pub mod error_codes {
    /// EndMarker with no open frame to close
    pub const UNMATCHED_END_MARKER: &str = "ERR_FLOW_UNMATCHED_END_MARKER";

    /// EndMarker scope does not match the innermost open frame
    pub const SCOPE_MISMATCH: &str = "ERR_FLOW_SCOPE_MISMATCH";

    /// EndMarker with a missing or unknown scope parameter
    pub const INVALID_SCOPE: &str = "ERR_FLOW_INVALID_SCOPE";

    /// ElseIf/Else with no open If chain at the same level
    pub const ORPHAN_BRANCH: &str = "ERR_FLOW_ORPHAN_BRANCH";

    /// Logic frame still open at end of input
    pub const UNTERMINATED_BLOCK: &str = "ERR_FLOW_UNTERMINATED_BLOCK";
}

/// A structural error in a flat step list: malformed marker nesting or a
/// malformed branch chain. Carries the offending step's display label and,
/// when the editor annotated one, its 1-based line.
#[derive(Debug, Clone)]
pub struct StructureError {
    /// Error code (a constant from [`error_codes`])
    pub code: &'static str,

    /// Human-readable error message
    pub message: String,

    /// Display label of the offending step, when attributable
    pub step: Option<String>,

    /// Editor line annotation of the offending step, when present
    pub line: Option<u32>,
}

impl StructureError {
    /// Create a structure error with the given code and message
    pub fn new(code: &'static str, message: impl Into<String>) -> Self {
        StructureError {
            code,
            message: message.into(),
            step: None,
            line: None,
        }
    }

    /// Attach the offending step's display label
    pub fn with_step(mut self, step: &str) -> Self {
        self.step = Some(step.to_string());
        self
    }

    /// Attach the offending step's editor line
    pub fn with_line(mut self, line: Option<u32>) -> Self {
        self.line = line;
        self
    }
}

impl fmt::Display for StructureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)?;
        if let Some(step) = &self.step {
            write!(f, " (at step '{}'", step)?;
            if let Some(line) = self.line {
                write!(f, ", line {}", line)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

impl std::error::Error for StructureError {}

/// All possible errors that can occur while loading or normalizing a flow
/// document
#[derive(Error, Debug)]
pub enum DslError {
    /// Errors that occur during JSON processing
    #[error("JSON processing error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors that occur during YAML parsing
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A structural error in the step list
    #[error("Structure error: {0}")]
    Structure(#[from] StructureError),
}

impl DslError {
    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            DslError::Json(_) => "ERR_FLOW_JSON_PARSE",
            DslError::Yaml(_) => "ERR_FLOW_YAML_PARSE",
            DslError::Structure(err) => err.code,
        }
    }
}
