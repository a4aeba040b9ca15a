//! Error types for the persistence layer, the host DOM and configuration.
//!
//! None of these reach the user. Preference accessors recover from
//! `StoreError` locally; the synchronizer logs `HostError` and moves on.

use thiserror::Error;

/// Failure of the key-value persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backend is not reachable at all (storage disabled, no window).
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("failed to read `{key}`: {reason}")]
    Read { key: String, reason: String },
    /// Quota exceeded and similar write rejections.
    #[error("failed to write `{key}`: {reason}")]
    Write { key: String, reason: String },
    #[error("corrupt value under `{key}`: {source}")]
    Corrupt {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Failure while augmenting a live widget.
#[derive(Debug, Error)]
pub enum HostError {
    /// The widget has no parent to insert a sibling into.
    #[error("widget is detached from the document")]
    Detached,
    #[error("DOM operation failed: {0}")]
    Js(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid configuration JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
