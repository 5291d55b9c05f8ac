//! crates/doc_chat_core/src/session.rs
//!
//! The async front door of a session. Every command takes the controller
//! lock, so mutations are applied one at a time in arrival order. The
//! assistant reply is the only deferred work: it runs as a spawned task and
//! re-takes the lock to complete the turn.

use crate::controller::{LoginOutcome, SessionController};
use crate::domain::{ChatTurn, DocumentId, DocumentRecord, DocumentUpload, SessionSnapshot};
use crate::error::{SessionError, SessionResult};
use crate::ports::{AssistantService, PortError};
use std::sync::Arc;
use tokio::{sync::Mutex, task::JoinHandle};
use tracing::{error, info};

#[derive(Clone)]
pub struct Session {
    controller: Arc<Mutex<SessionController>>,
    assistant: Arc<dyn AssistantService>,
}

/// The assistant reply of an accepted user turn, still on its way.
#[derive(Debug)]
pub struct PendingReply {
    handle: JoinHandle<Option<ChatTurn>>,
}

impl PendingReply {
    /// Waits for the reply task. Resolves to `None` if the reply arrived
    /// after its transcript had been replaced.
    pub async fn wait(self) -> SessionResult<Option<ChatTurn>> {
        self.handle.await.map_err(|e| {
            error!("Assistant reply task failed: {}", e);
            SessionError::SimulatedBackendFailure(e.to_string())
        })
    }
}

impl Session {
    pub fn new(controller: SessionController, assistant: Arc<dyn AssistantService>) -> Self {
        Self {
            controller: Arc::new(Mutex::new(controller)),
            assistant,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> SessionResult<LoginOutcome> {
        self.controller.lock().await.login(username, password)
    }

    pub async fn logout(&self) -> SessionResult<()> {
        self.controller.lock().await.logout()
    }

    pub async fn documents(&self) -> SessionResult<Vec<DocumentRecord>> {
        self.controller.lock().await.documents().map(<[_]>::to_vec)
    }

    pub async fn create_document(
        &self,
        upload: &DocumentUpload,
        display_name: Option<&str>,
    ) -> SessionResult<DocumentRecord> {
        self.controller.lock().await.create_document(upload, display_name)
    }

    pub async fn update_document(&self, id: &DocumentId, new_name: &str) -> SessionResult<DocumentRecord> {
        self.controller.lock().await.update_document(id, new_name)
    }

    pub async fn delete_document(&self, id: &DocumentId) -> SessionResult<()> {
        self.controller.lock().await.delete_document(id)
    }

    pub async fn select_document(&self, id: &DocumentId) -> SessionResult<DocumentRecord> {
        self.controller.lock().await.select_document(id)
    }

    /// Appends the user's turn right away and spawns the reply task.
    ///
    /// While that task runs, further submissions are rejected with
    /// `RejectReason::Pending`.
    pub async fn submit_user_turn(&self, text: &str) -> SessionResult<PendingReply> {
        let ticket = self.controller.lock().await.begin_user_turn(text)?;

        let controller = self.controller.clone();
        let assistant = self.assistant.clone();
        let handle = tokio::spawn(async move {
            // A panicking assistant must still release the Pending gate.
            let request = ticket.request().clone();
            let outcome = match tokio::spawn(async move { assistant.reply(&request).await }).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    error!("Assistant reply panicked: {}", e);
                    Err(PortError::Unexpected(e.to_string()))
                }
            };
            let turn = controller.lock().await.finish_user_turn(ticket, outcome);
            if turn.is_some() {
                info!("Assistant reply appended.");
            }
            turn
        });

        Ok(PendingReply { handle })
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.controller.lock().await.snapshot()
    }
}
