pub mod auth;
pub mod catalog;
pub mod chat;
pub mod controller;
pub mod domain;
pub mod error;
pub mod ports;
pub mod session;

pub use controller::{LoginOutcome, SessionController, SessionProfile};
pub use domain::{
    AssistantRequest, ChatRole, ChatTurn, Credentials, DocumentId, DocumentRecord, DocumentUpload,
    FileKind, LoginForm, SessionSnapshot, MAX_PAGE_COUNT,
};
pub use error::{RejectReason, SessionError, SessionResult, ValidationReason};
pub use ports::{
    AssistantService, NoopObserver, PageCounter, PortError, PortResult, TranscriptObserver,
    TranscriptUpdate,
};
pub use session::{PendingReply, Session};
