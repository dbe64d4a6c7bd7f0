//! Backend error taxonomy.
//!
//! Every fallible call into the hosted backend resolves to a
//! [`BackendError`]. The variants mirror the failure classes the client must
//! distinguish: constraint violations get translated to field-level
//! messages, storage failures name the offending path, and everything else
//! degrades to a transport failure carrying the raw message as detail.

/// Errors reported by a backend implementation.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    /// A declared unique constraint was violated by an insert or update.
    ///
    /// `column` is populated when the violated column can be determined from
    /// the constraint payload, enabling field-specific user messages.
    #[error("duplicate value violates unique constraint \"{constraint}\"")]
    UniqueViolation {
        constraint: String,
        column: Option<String>,
    },

    /// A named remote procedure reported a failure.
    #[error("remote procedure \"{procedure}\" failed: {message}")]
    Procedure { procedure: String, message: String },

    /// An object-storage operation failed.
    #[error("storage operation failed for \"{path}\": {message}")]
    Storage { path: String, message: String },

    /// A fetched row could not be decoded into the requested type.
    #[error("failed to decode row from \"{table}\": {source}")]
    RowDecode {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    /// Any other transport or protocol failure.
    #[error("backend transport failure: {0}")]
    Transport(String),
}

impl BackendError {
    /// Returns the violated column name if this is a unique violation whose
    /// column could be determined.
    pub fn unique_violation_column(&self) -> Option<&str> {
        match self {
            BackendError::UniqueViolation {
                column: Some(column),
                ..
            } => Some(column),
            _ => None,
        }
    }

    /// Returns true for any unique-constraint violation, regardless of
    /// whether the column was determinable.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, BackendError::UniqueViolation { .. })
    }
}

pub type BackendResult<T> = std::result::Result<T, BackendError>;
