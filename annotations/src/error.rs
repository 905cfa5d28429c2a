//! Error kinds shared by every document operation.
//!
//! All operations are synchronous and in-memory, so every error is final:
//! nothing here is retryable. Callers at the transport boundary map
//! [`ErrorCode::error_code`] to their own response shapes.

use std::fmt;

/// The family of entity an id refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Element,
    Arrow,
    Highlight,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Element => "element",
            Self::Arrow => "arrow",
            Self::Highlight => "highlight",
        })
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DocError {
    /// Malformed variant fields, illegal patch or illegal scale.
    #[error("validation failed: {0}")]
    Validation(String),
    /// The operation referenced an id absent from the document.
    #[error("{kind} not found: {id}")]
    NotFound { kind: EntityKind, id: String },
    /// An id is already in use within the document.
    #[error("id already in use: {0}")]
    Conflict(String),
}

impl DocError {
    pub(crate) fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub(crate) fn not_found(kind: EntityKind, id: &str) -> Self {
        Self::NotFound { kind, id: id.to_string() }
    }
}

/// Grepable error codes for the transport layer.
pub trait ErrorCode: fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

impl ErrorCode for DocError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "E_VALIDATION",
            Self::NotFound { .. } => "E_NOT_FOUND",
            Self::Conflict(_) => "E_CONFLICT",
        }
    }
}
