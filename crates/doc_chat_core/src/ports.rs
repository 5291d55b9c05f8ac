//! crates/doc_chat_core/src/ports.rs
//!
//! Defines the service contracts (traits) the session controller depends on.
//! These traits form the boundary of the hexagonal architecture, so the core
//! never knows whether page counts or replies come from a simulation or a
//! real backend.

use async_trait::async_trait;
use crate::domain::{AssistantRequest, ChatRole, DocumentUpload};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Service unavailable: {0}")]
    Unavailable(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Stands in for real document inspection.
pub trait PageCounter: Send + Sync {
    /// Reports how many pages the uploaded document has.
    fn count_pages(&self, upload: &DocumentUpload) -> PortResult<u32>;
}

#[async_trait]
pub trait AssistantService: Send + Sync {
    /// Produces the assistant's answer to one user turn about a document.
    async fn reply(&self, request: &AssistantRequest) -> PortResult<String>;
}

/// How the transcript changed right before a scroll notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptUpdate {
    Replaced { len: usize },
    Appended { role: ChatRole, len: usize },
}

impl TranscriptUpdate {
    pub fn len(&self) -> usize {
        match *self {
            TranscriptUpdate::Replaced { len } | TranscriptUpdate::Appended { len, .. } => len,
        }
    }
}

/// Receives a "scroll to latest" signal after every transcript replacement
/// or append. Called while the session is locked, so implementations must
/// not block.
pub trait TranscriptObserver: Send + Sync {
    fn scroll_to_latest(&self, update: TranscriptUpdate);
}

/// Observer for headless use.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl TranscriptObserver for NoopObserver {
    fn scroll_to_latest(&self, _update: TranscriptUpdate) {}
}
