//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::adapters::{BroadcastObserver, RandomPageCounter, SimulatedAssistant};
use crate::config::Config;
use crate::web::protocol::ServerMessage;
use doc_chat_core::{AssistantService, PageCounter, Session, SessionController};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

/// How many transcript updates a slow WebSocket client may fall behind.
const EVENT_BUFFER: usize = 64;

//=========================================================================================
// AppState (Shared Across All Connections)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
/// The process hosts exactly one session.
#[derive(Clone)]
pub struct AppState {
    pub session: Session,
    pub config: Arc<Config>,
    pub events: broadcast::Sender<ServerMessage>,
    /// Cancelled when the server begins shutting down.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Wires the simulated adapters described by `config` into a fresh session.
    pub fn new(config: Arc<Config>) -> Self {
        let page_counter = Arc::new(RandomPageCounter::new(config.simulated_page_ceiling));
        let assistant = Arc::new(SimulatedAssistant::new(config.reply_latency));
        Self::with_adapters(config, page_counter, assistant)
    }

    /// Like [`AppState::new`], but with caller-supplied ports.
    pub fn with_adapters(
        config: Arc<Config>,
        page_counter: Arc<dyn PageCounter>,
        assistant: Arc<dyn AssistantService>,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        let observer = Arc::new(BroadcastObserver::new(events.clone()));
        let controller = SessionController::new(config.session_profile(), page_counter, observer);

        Self {
            session: Session::new(controller, assistant),
            config,
            events,
            shutdown: CancellationToken::new(),
        }
    }
}
