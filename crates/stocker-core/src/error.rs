//! Error types for stocker-core

use std::fmt;

use thiserror::Error;

/// Result type alias using stocker-core's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Kind of record a `NotFound` error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Account,
    Category,
    Stock,
    Relation,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Account => "Account",
            Self::Category => "Category",
            Self::Stock => "Stock",
            Self::Relation => "Category relation",
        };
        f.write_str(name)
    }
}

/// Errors that can occur in stocker-core operations
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed input, rejected before any store or remote call
    #[error("Invalid input: {0}")]
    Validation(String),

    /// Record absent or not owned by the requesting account
    #[error("{0} not found: {1}")]
    NotFound(Entity, String),

    /// Duplicate relation/name, or optimistic version mismatch
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Account could not be resolved
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The remote stock source failed or could not be reached
    #[error("Remote service unavailable: {0}")]
    RemoteUnavailable(String),

    /// Storage failure unrelated to a conflict
    #[error("Storage error: {0}")]
    Storage(String),

    /// libSQL error
    #[error("libSQL error: {0}")]
    LibSql(#[from] libsql::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn not_found(entity: Entity, id: impl fmt::Display) -> Self {
        Self::NotFound(entity, id.to_string())
    }

    /// HTTP status a caller would typically report this error with.
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthorized(_) => 401,
            Self::NotFound(..) => 404,
            Self::Conflict(_) => 409,
            Self::Validation(_) => 422,
            Self::RemoteUnavailable(_) => 503,
            Self::Storage(_) | Self::LibSql(_) | Self::Io(_) | Self::Serialization(_) => 500,
        }
    }
}

/// Map a libSQL failure to `Conflict` when it is a uniqueness violation.
pub(crate) fn classify_constraint(error: libsql::Error, what: &str) -> Error {
    if error.to_string().contains("UNIQUE constraint failed") {
        Error::Conflict(format!("{what} already exists"))
    } else {
        Error::LibSql(error)
    }
}
