/// Error type shared by the persistence layer, the session and the UI.
///
/// Every user-facing failure ends up as one of these variants and is shown
/// as a dismissible notice. There is no retry policy: the user fixes the
/// cause and triggers the action again.
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// A required field is missing or malformed. Raised before any storage call.
    #[error("{0}")]
    Validation(String),

    /// The referenced row no longer exists.
    #[error("{entity} #{id} no longer exists")]
    NotFound { entity: &'static str, id: i64 },

    /// File system failure (export write, missing proof path, ...).
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// A path the user asked to open does not exist.
    #[error("the path does not exist: {}", .0.display())]
    MissingPath(PathBuf),

    /// The operating system offers no way to perform the request.
    #[error("{0}")]
    Unsupported(String),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl LedgerError {
    pub fn validation(message: impl Into<String>) -> Self {
        LedgerError::Validation(message.into())
    }

    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        LedgerError::Io {
            context: context.into(),
            source,
        }
    }

    /// Short title used for the notice banner.
    pub fn title(&self) -> &'static str {
        match self {
            LedgerError::Validation(_) => "Check the form",
            LedgerError::NotFound { .. } => "Not found",
            LedgerError::Io { .. } | LedgerError::MissingPath(_) => "File error",
            LedgerError::Unsupported(_) => "Not supported",
            LedgerError::Database(_) => "Database error",
        }
    }
}

pub type LedgerResult<T> = Result<T, LedgerError>;
