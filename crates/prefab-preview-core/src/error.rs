//! Error types for prefab-preview.

use thiserror::Error;

/// The main error type for prefab-preview operations.
#[derive(Error, Debug)]
pub enum PreviewError {
    /// The subject is not an instance of a prefab asset.
    #[error("'{0}' is not a prefab")]
    InvalidSubjectKind(String),

    /// The subject is parented; previews are only generated for top-level prefabs.
    #[error("'{0}' has a parent; previews are only generated for root prefabs")]
    NonRootSubject(String),

    /// A node id did not resolve to a live node.
    #[error("node {0} not found")]
    NodeNotFound(usize),

    /// Rendering error.
    #[error("render error: {0}")]
    Render(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// A specialized Result type for prefab-preview operations.
pub type Result<T> = std::result::Result<T, PreviewError>;
