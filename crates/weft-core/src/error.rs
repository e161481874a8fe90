use thiserror::Error;

/// Core error type for the Weft runtime
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// Step carries neither an id nor a tool name
    #[error("Step has neither id nor tool_name: {0}")]
    MissingToolId(String),

    /// Step references a tool identifier absent from the registry
    #[error("Tool not found in registry: {0}")]
    ToolNotFound(String),

    /// A step reported failure or raised an unrecoverable fault
    #[error("Step failed: {0}")]
    StepFailed(String),

    /// A Break or Continue signal escaped to a scope with no enclosing loop
    #[error("Flow signal outside of a loop: {0}")]
    SignalOutsideLoop(String),

    /// An action parameter is missing or has the wrong shape
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Validation error
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::SerializationError(err.to_string())
    }
}

impl From<String> for CoreError {
    fn from(err: String) -> Self {
        CoreError::Other(err)
    }
}

impl From<&str> for CoreError {
    fn from(err: &str) -> Self {
        CoreError::Other(err.to_string())
    }
}
