//! services/api/src/adapters/assistant.rs
//!
//! This module contains the simulated assistant. It implements the
//! `AssistantService` port from the `core` crate by waiting a fixed latency
//! and answering with a canned reply about the selected document.

use async_trait::async_trait;
use doc_chat_core::{chat::simulated_reply, AssistantRequest, AssistantService, PortResult};
use std::time::Duration;
use tracing::info;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `AssistantService` without any backend.
#[derive(Clone, Debug)]
pub struct SimulatedAssistant {
    latency: Duration,
}

impl SimulatedAssistant {
    /// Creates a new `SimulatedAssistant` that answers after `latency`.
    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }
}

//=========================================================================================
// `AssistantService` Trait Implementation
//=========================================================================================

#[async_trait]
impl AssistantService for SimulatedAssistant {
    /// Sleeps for the configured latency, then echoes the question back.
    async fn reply(&self, request: &AssistantRequest) -> PortResult<String> {
        tokio::time::sleep(self.latency).await;
        info!(
            "Simulated reply ready for document {} after {:?}.",
            request.document_id, self.latency
        );
        Ok(simulated_reply(&request.document_name, &request.question))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_chat_core::DocumentId;
    use std::time::Duration;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn reply_arrives_after_the_configured_latency() {
        let assistant = SimulatedAssistant::new(Duration::from_millis(1000));
        let request = AssistantRequest {
            document_id: DocumentId::from("1"),
            document_name: "Company Policy.pdf".to_string(),
            question: "What is the leave policy?".to_string(),
        };

        let started = Instant::now();
        let reply = assistant.reply(&request).await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(1000));
        assert_eq!(
            reply,
            "Regarding \"Company Policy.pdf\", here's a simulated response to: \"What is the leave policy?\". In a real app, this would analyze the document content."
        );
    }
}
