//! crates/doc_chat_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any transport or serialization format.

use bytes::Bytes;
use chrono::NaiveDate;
use std::fmt;

/// The largest page count a document may have when it enters the catalog.
pub const MAX_PAGE_COUNT: u32 = 500;

/// Opaque identifier of a document record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocumentId(String);

impl DocumentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for DocumentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// Represents one entry of the document catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub name: String,
    pub page_count: u32,
    pub upload_date: NaiveDate,
}

/// The kind of file handed over by file intake, derived from its MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileKind {
    Pdf,
    Text,
    Other(String),
}

impl FileKind {
    pub fn from_mime(mime: &str) -> Self {
        let essence = mime
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        if essence == "application/pdf" {
            FileKind::Pdf
        } else if essence.starts_with("text/") {
            FileKind::Text
        } else {
            FileKind::Other(essence)
        }
    }

    /// Only PDFs are accepted into the catalog.
    pub fn is_document(&self) -> bool {
        matches!(self, FileKind::Pdf)
    }
}

/// A file as supplied by the intake collaborator.
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub file_name: String,
    pub kind: FileKind,
    pub contents: Bytes,
}

impl DocumentUpload {
    pub fn new(file_name: impl Into<String>, kind: FileKind, contents: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            kind,
            contents: contents.into(),
        }
    }
}

/// Who authored a chat turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatRole {
    User,
    Assistant,
}

/// A single message in the transcript. Never mutated after it is appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// A fixed username/password pair, compared verbatim.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The login form fields as the user last submitted them.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginForm")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Everything the assistant needs to answer one user turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantRequest {
    pub document_id: DocumentId,
    pub document_name: String,
    pub question: String,
}

/// A read-only view of the whole session for the rendering layer.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub authenticated: bool,
    pub username: String,
    pub can_manage_catalog: bool,
    pub documents: Vec<DocumentRecord>,
    pub selection: Option<DocumentId>,
    pub transcript: Vec<ChatTurn>,
    pub pending: bool,
}
