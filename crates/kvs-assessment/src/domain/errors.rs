//! Error types for the domain layer.

use std::fmt;

use thiserror::Error;

/// Error kinds, one per failure class the handlers map to a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidParam,
    NotFound,
    AlreadyExists,
    InvalidState,
    InvalidJwt,
    InvalidPassword,
    Forbidden,
    Internal,
    UnprocessableEntity,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::InvalidParam => "invalid param",
            ErrorKind::NotFound => "not found",
            ErrorKind::AlreadyExists => "already exists",
            ErrorKind::InvalidState => "invalid state",
            ErrorKind::InvalidJwt => "invalid JWT",
            ErrorKind::InvalidPassword => "invalid password",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::Internal => "internal error",
            ErrorKind::UnprocessableEntity => "unprocessable entity",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Domain error: a kind plus a descriptive message.
///
/// Adapters annotate and return errors unchanged; the orchestration layer
/// wraps with a stage label via [`DomainError::context`], preserving the kind
/// so handlers can branch on [`DomainError::is`].
#[derive(Debug, Clone, Error)]
#[error("{message}: {kind}")]
pub struct DomainError {
    kind: ErrorKind,
    message: String,
}

impl DomainError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_param(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidParam, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidState, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    pub fn unprocessable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnprocessableEntity, message)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn is(&self, kind: ErrorKind) -> bool {
        self.kind == kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Prepends a stage label, keeping the kind intact.
    pub fn context(self, stage: &str) -> Self {
        Self {
            kind: self.kind,
            message: format!("{stage}: {}", self.message),
        }
    }
}
