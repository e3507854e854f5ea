//! Error types for engine operations.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors produced by engine components.
///
/// Every variant is scoped to the single requested operation and leaves the
/// stored state untouched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    /// Unknown unit or part instance.
    #[error("not found: {0}")]
    NotFound(String),
    /// Negative, non-finite or backward-moving meter value, malformed threshold or date.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// Operation not allowed in the current fit state.
    #[error("invalid state: {0}")]
    InvalidState(String),
    /// Lost a concurrent update race, or the key already exists.
    #[error("conflict: {0}")]
    Conflict(String),
    /// Storage adapter failure with context.
    #[error("backend error: {0}")]
    Backend(String),
}

/// Serializable tag for an [`EngineError`] variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// See [`EngineError::NotFound`].
    NotFound,
    /// See [`EngineError::InvalidArgument`].
    InvalidArgument,
    /// See [`EngineError::InvalidState`].
    InvalidState,
    /// See [`EngineError::Conflict`].
    Conflict,
    /// See [`EngineError::Backend`].
    Backend,
}

impl EngineError {
    /// The kind tag of this error.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::InvalidArgument(_) => ErrorKind::InvalidArgument,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Backend(_) => ErrorKind::Backend,
        }
    }
}

/// Application-facing result using anyhow for higher-level contexts.
pub type AppResult<T> = Result<T, anyhow::Error>;
