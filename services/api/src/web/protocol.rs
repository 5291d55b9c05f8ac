//! services/api/src/web/protocol.rs
//!
//! Defines the WebSocket messages the API server pushes to the browser so it
//! knows when to re-read the session and scroll the chat to its latest turn.
//! The browser never sends structured messages on this socket.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// How the transcript changed.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptChange {
    /// A new transcript was started (login or document selection).
    Replaced,
    /// One turn was added at the end.
    Appended,
}

/// Represents the structured text messages the server can send to the client.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// Sent once right after the socket is upgraded.
    Connected { connection_id: String },

    /// The transcript changed; the UI should redraw and scroll to the bottom.
    ScrollToLatest {
        change: TranscriptChange,
        transcript_len: usize,
    },

    /// Reports a problem with the feed itself, e.g. missed updates.
    Error { message: String },
}
