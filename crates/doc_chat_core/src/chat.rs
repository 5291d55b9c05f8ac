//! crates/doc_chat_core/src/chat.rs
//!
//! The transcript of the current selection and the Idle/Pending gate that
//! allows at most one assistant reply in flight.

use crate::domain::{AssistantRequest, ChatTurn, DocumentRecord};
use crate::error::RejectReason;
use crate::ports::PortResult;
use tracing::{error, info};

/// Appended in place of a reply when the assistant backend fails.
pub const FALLBACK_REPLY: &str = "Sorry, there was an error processing your request.";

/// The greeting that opens a fresh transcript for a selected document.
pub fn selection_greeting(document_name: &str) -> String {
    format!(
        "You've selected \"{}\". What would you like to know about this document?",
        document_name
    )
}

/// The canned answer of the simulated assistant.
pub fn simulated_reply(document_name: &str, question: &str) -> String {
    format!(
        "Regarding \"{}\", here's a simulated response to: \"{}\". In a real app, this would analyze the document content.",
        document_name, question
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatState {
    Idle,
    Pending,
}

/// Proof that a user turn was accepted. Completing it is the only way back
/// to `Idle`.
#[derive(Debug)]
pub struct ReplyTicket {
    epoch: u64,
    request: AssistantRequest,
}

impl ReplyTicket {
    pub fn request(&self) -> &AssistantRequest {
        &self.request
    }
}

#[derive(Debug)]
pub struct ChatModel {
    transcript: Vec<ChatTurn>,
    state: ChatState,
    // Bumped whenever the transcript is replaced or cleared.
    epoch: u64,
}

impl Default for ChatModel {
    fn default() -> Self {
        Self {
            transcript: Vec::new(),
            state: ChatState::Idle,
            epoch: 0,
        }
    }
}

impl ChatModel {
    pub fn transcript(&self) -> &[ChatTurn] {
        &self.transcript
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        self.state == ChatState::Pending
    }

    /// Starts a new transcript. A reply still in flight will be discarded.
    pub fn replace(&mut self, turns: Vec<ChatTurn>) {
        self.transcript = turns;
        self.epoch += 1;
    }

    /// Accepts a user turn about `selected`, appends it and enters `Pending`.
    pub fn begin(
        &mut self,
        text: &str,
        selected: Option<&DocumentRecord>,
    ) -> Result<ReplyTicket, RejectReason> {
        if text.trim().is_empty() {
            return Err(RejectReason::EmptyInput);
        }
        if self.is_pending() {
            return Err(RejectReason::Pending);
        }
        let document = selected.ok_or(RejectReason::NoSelection)?;

        self.transcript.push(ChatTurn::user(text));
        self.state = ChatState::Pending;
        info!("User turn accepted for document {}.", document.id);

        Ok(ReplyTicket {
            epoch: self.epoch,
            request: AssistantRequest {
                document_id: document.id.clone(),
                document_name: document.name.clone(),
                question: text.to_string(),
            },
        })
    }

    /// Leaves `Pending` and appends the assistant's turn, or the fallback
    /// turn if the backend failed. Returns `None` when the transcript the
    /// ticket was issued for no longer exists.
    pub fn complete(&mut self, ticket: ReplyTicket, outcome: PortResult<String>) -> Option<ChatTurn> {
        self.state = ChatState::Idle;

        let content = match outcome {
            Ok(reply) => reply,
            Err(e) => {
                error!("Assistant reply failed: {}", e);
                FALLBACK_REPLY.to_string()
            }
        };

        if ticket.epoch != self.epoch {
            info!(
                "Discarding stale reply for document {}.",
                ticket.request.document_id
            );
            return None;
        }

        let turn = ChatTurn::assistant(content);
        self.transcript.push(turn.clone());
        Some(turn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ChatRole, DocumentId};
    use crate::ports::PortError;
    use chrono::NaiveDate;

    fn policy_doc() -> DocumentRecord {
        DocumentRecord {
            id: DocumentId::from("1"),
            name: "Company Policy.pdf".into(),
            page_count: 120,
            upload_date: NaiveDate::from_ymd_opt(2023, 5, 15).unwrap(),
        }
    }

    #[test]
    fn rejections_follow_input_then_pending_then_selection() {
        let mut chat = ChatModel::default();
        assert_eq!(chat.begin("   ", None).unwrap_err(), RejectReason::EmptyInput);
        assert_eq!(chat.begin("hi", None).unwrap_err(), RejectReason::NoSelection);
        assert!(chat.transcript().is_empty());

        let doc = policy_doc();
        let _ticket = chat.begin("hi", Some(&doc)).unwrap();
        assert_eq!(chat.begin("again", None).unwrap_err(), RejectReason::Pending);
        assert_eq!(chat.begin("", Some(&doc)).unwrap_err(), RejectReason::EmptyInput);
    }

    #[test]
    fn accepted_turn_is_visible_before_the_reply() {
        let mut chat = ChatModel::default();
        chat.replace(vec![ChatTurn::assistant(selection_greeting("Company Policy.pdf"))]);

        let doc = policy_doc();
        let ticket = chat.begin("What is the leave policy?", Some(&doc)).unwrap();
        assert_eq!(chat.state(), ChatState::Pending);
        assert_eq!(chat.transcript().len(), 2);
        assert_eq!(chat.transcript()[1], ChatTurn::user("What is the leave policy?"));
        assert_eq!(ticket.request().document_name, "Company Policy.pdf");

        let reply = simulated_reply("Company Policy.pdf", "What is the leave policy?");
        let turn = chat.complete(ticket, Ok(reply)).unwrap();
        assert_eq!(chat.state(), ChatState::Idle);
        assert_eq!(turn.role, ChatRole::Assistant);
        assert!(turn.content.contains("Company Policy.pdf"));
        assert!(turn.content.contains("What is the leave policy?"));
        assert_eq!(chat.transcript().len(), 3);
    }

    #[test]
    fn backend_failure_appends_fallback_and_goes_idle() {
        let mut chat = ChatModel::default();
        let doc = policy_doc();
        let ticket = chat.begin("hello", Some(&doc)).unwrap();
        let turn = chat
            .complete(ticket, Err(PortError::Unavailable("down".into())))
            .unwrap();
        assert_eq!(turn, ChatTurn::assistant(FALLBACK_REPLY));
        assert!(!chat.is_pending());
    }

    #[test]
    fn replies_for_a_replaced_transcript_are_dropped() {
        let mut chat = ChatModel::default();
        let doc = policy_doc();
        let ticket = chat.begin("hello", Some(&doc)).unwrap();

        chat.replace(vec![ChatTurn::assistant(selection_greeting("Other.pdf"))]);
        assert!(chat.is_pending());

        assert_eq!(chat.complete(ticket, Ok("late".into())), None);
        assert!(!chat.is_pending());
        assert_eq!(chat.transcript().len(), 1);
    }
}
