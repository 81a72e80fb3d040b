use thiserror::Error;

/// Errors surfaced by the log viewer core.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// Sandbox escape, missing entry, or entry-kind mismatch. All three are
    /// folded into one shape so callers cannot probe filesystem structure
    /// through error text.
    #[error("not found: {path}")]
    NotFound { path: String },

    /// The user-supplied search pattern failed to compile, or compiles but
    /// matches the empty string.
    #[error("invalid pattern: {reason}")]
    InvalidPattern { reason: String },

    /// Invalid configuration
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// IO error while streaming a file or walking the tree
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ViewerError {
    pub(crate) fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    pub(crate) fn invalid_pattern(reason: impl Into<String>) -> Self {
        Self::InvalidPattern {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ViewerError>;
