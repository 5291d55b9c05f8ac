//! services/api/src/adapters/events.rs
//!
//! Implements the `TranscriptObserver` port by broadcasting a
//! `ScrollToLatest` message to every connected WebSocket client.

use crate::web::protocol::{ServerMessage, TranscriptChange};
use doc_chat_core::{TranscriptObserver, TranscriptUpdate};
use tokio::sync::broadcast;
use tracing::debug;

#[derive(Clone, Debug)]
pub struct BroadcastObserver {
    events: broadcast::Sender<ServerMessage>,
}

impl BroadcastObserver {
    pub fn new(events: broadcast::Sender<ServerMessage>) -> Self {
        Self { events }
    }
}

impl TranscriptObserver for BroadcastObserver {
    fn scroll_to_latest(&self, update: TranscriptUpdate) {
        let change = match update {
            TranscriptUpdate::Replaced { .. } => TranscriptChange::Replaced,
            TranscriptUpdate::Appended { .. } => TranscriptChange::Appended,
        };
        let message = ServerMessage::ScrollToLatest {
            change,
            transcript_len: update.len(),
        };
        // No subscribers just means no browser is watching.
        if self.events.send(message).is_err() {
            debug!("No WebSocket subscribers for transcript update.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doc_chat_core::ChatRole;

    #[test]
    fn updates_are_forwarded_to_subscribers() {
        let (tx, mut rx) = broadcast::channel(8);
        let observer = BroadcastObserver::new(tx);

        observer.scroll_to_latest(TranscriptUpdate::Replaced { len: 1 });
        observer.scroll_to_latest(TranscriptUpdate::Appended {
            role: ChatRole::User,
            len: 2,
        });

        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::ScrollToLatest {
                change: TranscriptChange::Replaced,
                transcript_len: 1
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            ServerMessage::ScrollToLatest {
                change: TranscriptChange::Appended,
                transcript_len: 2
            }
        );
    }

    #[test]
    fn sending_without_subscribers_is_harmless() {
        let (tx, rx) = broadcast::channel(8);
        drop(rx);
        BroadcastObserver::new(tx).scroll_to_latest(TranscriptUpdate::Replaced { len: 0 });
    }
}
