//! crates/doc_chat_core/src/error.rs
//!
//! The structured errors every session command can return.

use crate::domain::DocumentId;
use crate::ports::PortError;

/// Why a document could not enter (or be renamed in) the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationReason {
    #[error("only PDF documents are allowed")]
    UnsupportedType,
    #[error("document has {pages} pages, the limit is 500")]
    PageLimitExceeded { pages: u32 },
    #[error("document name must not be empty")]
    EmptyName,
}

/// Why a chat submission was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RejectReason {
    #[error("message is empty")]
    EmptyInput,
    #[error("a reply is still pending")]
    Pending,
    #[error("no document is selected")]
    NoSelection,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid admin credentials")]
    InvalidCredentials,

    #[error("Already logged in")]
    AlreadyAuthenticated,

    #[error("Not logged in")]
    NotAuthenticated,

    /// The user variant's catalog is fixed sample data.
    #[error("The document catalog is read-only")]
    ReadOnlyCatalog,

    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationReason),

    #[error("Document {id} not found")]
    NotFound { id: DocumentId },

    #[error("Message rejected: {0}")]
    Rejected(#[from] RejectReason),

    #[error("Page count unavailable: {0}")]
    PageCountUnavailable(#[from] PortError),

    /// Reserved for a real backend; the simulated one never fails this way.
    #[error("Assistant backend failure: {0}")]
    SimulatedBackendFailure(String),
}

/// A convenience type alias for `Result<T, SessionError>`.
pub type SessionResult<T> = Result<T, SessionError>;
