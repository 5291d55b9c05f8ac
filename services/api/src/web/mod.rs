pub mod auth;
pub mod protocol;
pub mod rest;
pub mod state;
pub mod ws_handler;

use axum::{
    extract::DefaultBodyLimit,
    http::{
        header::{ACCEPT, CONTENT_TYPE},
        HeaderValue, Method,
    },
    routing::{get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::warn;

pub use rest::ApiDoc;
pub use state::AppState;
pub use ws_handler::ws_handler;

/// Builds the application router with every route, the upload limit and CORS.
///
/// Swagger UI is merged by the binary so tests can exercise the bare API.
pub fn build_router(state: Arc<AppState>) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;
    let cors = cors_layer(&state.config.cors_origin);

    let router = Router::new()
        .route("/healthz", get(rest::health_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/session", get(rest::get_session_handler))
        .route(
            "/documents",
            get(rest::list_documents_handler).post(rest::create_document_handler),
        )
        .route(
            "/documents/{id}",
            put(rest::update_document_handler).delete(rest::delete_document_handler),
        )
        .route("/documents/{id}/select", post(rest::select_document_handler))
        .route("/chat", post(rest::submit_chat_handler))
        .route("/ws", get(ws_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state);

    match cors {
        Some(cors) => router.layer(cors),
        None => router,
    }
}

fn cors_layer(origin: &str) -> Option<CorsLayer> {
    let origin = match origin.parse::<HeaderValue>() {
        Ok(origin) => origin,
        Err(e) => {
            warn!("Ignoring invalid CORS origin {:?}: {}", origin, e);
            return None;
        }
    };
    Some(
        CorsLayer::new()
            .allow_origin(origin)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
            .allow_headers([CONTENT_TYPE, ACCEPT]),
    )
}
