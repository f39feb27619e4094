use thiserror::Error;

/// Unified error type for release-gate operations
#[derive(Error, Debug)]
pub enum GateError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Version already released: tag '{tag}' exists")]
    DuplicateVersion { tag: String },

    #[error("Release host error: {0}")]
    ExternalService(String),

    #[error("Build failed for target '{target}': {message}")]
    Build { target: String, message: String },

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in release-gate
pub type Result<T> = std::result::Result<T, GateError>;

impl From<git2::Error> for GateError {
    fn from(err: git2::Error) -> Self {
        GateError::ExternalService(err.message().to_string())
    }
}

impl GateError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        GateError::Config(msg.into())
    }

    /// Create an external service error with context
    pub fn external(msg: impl Into<String>) -> Self {
        GateError::ExternalService(msg.into())
    }

    /// Create a build error for a target
    pub fn build(target: impl Into<String>, msg: impl Into<String>) -> Self {
        GateError::Build {
            target: target.into(),
            message: msg.into(),
        }
    }

    /// Create a publish error with context
    pub fn publish(msg: impl Into<String>) -> Self {
        GateError::Publish(msg.into())
    }

    /// Process exit status for this error.
    ///
    /// `1` marks the expected "already released" stop, every other code is a failure.
    pub fn exit_code(&self) -> i32 {
        match self {
            GateError::DuplicateVersion { .. } => 1,
            GateError::Config(_) | GateError::Io(_) => 2,
            GateError::ExternalService(_) => 3,
            GateError::Build { .. } | GateError::Publish(_) => 4,
        }
    }

    /// Whether this error is the non-alarming "nothing to do" condition
    pub fn is_duplicate(&self) -> bool {
        matches!(self, GateError::DuplicateVersion { .. })
    }
}
