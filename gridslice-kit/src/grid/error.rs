//! Errors raised while loading grid documents and renderer configuration.
//!
//! Rendering itself never fails: a bad node degrades to a placeholder. Only the
//! entry points that decode external input return these.

/// Result alias for the loading APIs.
pub type GridResult<T> = Result<T, GridError>;

#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid root node: {0}")]
    InvalidRoot(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}
