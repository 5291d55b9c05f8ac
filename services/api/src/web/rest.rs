//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the catalog and chat endpoints, the JSON
//! views they return, and the master definition for the OpenAPI specification.
//!
//! Handlers only translate between HTTP and session commands; every business
//! rule lives in the session controller.

use crate::error::reject;
use crate::web::auth::LoginRequest;
use crate::web::protocol::{ServerMessage, TranscriptChange};
use crate::web::state::AppState;
use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use chrono::NaiveDate;
use doc_chat_core::{
    ChatRole, ChatTurn, DocumentId, DocumentRecord, DocumentUpload, FileKind, SessionSnapshot,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use utoipa::{IntoParams, OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::login_handler,
        crate::web::auth::logout_handler,
        get_session_handler,
        list_documents_handler,
        create_document_handler,
        update_document_handler,
        delete_document_handler,
        select_document_handler,
        submit_chat_handler,
    ),
    components(
        schemas(
            LoginRequest,
            SessionView,
            DocumentView,
            ChatTurnView,
            UpdateDocumentRequest,
            ChatRequest,
            ServerMessage,
            TranscriptChange,
        )
    ),
    tags(
        (name = "Document Chat API", description = "Session, document catalog and chat endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct DocumentView {
    pub id: String,
    pub name: String,
    pub page_count: u32,
    pub upload_date: NaiveDate,
}

impl From<DocumentRecord> for DocumentView {
    fn from(record: DocumentRecord) -> Self {
        Self {
            id: record.id.to_string(),
            name: record.name,
            page_count: record.page_count,
            upload_date: record.upload_date,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct ChatTurnView {
    /// Either `user` or `assistant`.
    pub role: String,
    pub content: String,
}

impl From<ChatTurn> for ChatTurnView {
    fn from(turn: ChatTurn) -> Self {
        let role = match turn.role {
            ChatRole::User => "user",
            ChatRole::Assistant => "assistant",
        };
        Self {
            role: role.to_string(),
            content: turn.content,
        }
    }
}

/// Everything the UI needs to redraw after a command.
#[derive(Serialize, Deserialize, Debug, Clone, ToSchema)]
pub struct SessionView {
    pub authenticated: bool,
    pub username: String,
    pub can_manage_catalog: bool,
    pub documents: Vec<DocumentView>,
    pub selected_document_id: Option<String>,
    pub transcript: Vec<ChatTurnView>,
    /// True while an assistant reply is on its way.
    pub pending: bool,
}

impl From<SessionSnapshot> for SessionView {
    fn from(snapshot: SessionSnapshot) -> Self {
        Self {
            authenticated: snapshot.authenticated,
            username: snapshot.username,
            can_manage_catalog: snapshot.can_manage_catalog,
            documents: snapshot.documents.into_iter().map(DocumentView::from).collect(),
            selected_document_id: snapshot.selection.map(|id| id.to_string()),
            transcript: snapshot.transcript.into_iter().map(ChatTurnView::from).collect(),
            pending: snapshot.pending,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct UpdateDocumentRequest {
    pub name: String,
}

#[derive(Deserialize, ToSchema)]
pub struct ChatRequest {
    pub text: String,
}

#[derive(Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct DeleteParams {
    /// Must be `true`; deletions are never performed unconfirmed.
    #[serde(default)]
    pub confirm: bool,
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

pub async fn health_handler() -> &'static str {
    "ok"
}

/// Returns the current session state.
#[utoipa::path(
    get,
    path = "/session",
    responses((status = 200, description = "Current session state", body = SessionView))
)]
pub async fn get_session_handler(State(state): State<Arc<AppState>>) -> Json<SessionView> {
    Json(state.session.snapshot().await.into())
}

/// Lists the document catalog in insertion order.
#[utoipa::path(
    get,
    path = "/documents",
    responses(
        (status = 200, description = "The catalog", body = [DocumentView]),
        (status = 401, description = "Not logged in")
    )
)]
pub async fn list_documents_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<DocumentView>>, (StatusCode, String)> {
    let documents = state.session.documents().await.map_err(reject)?;
    Ok(Json(documents.into_iter().map(DocumentView::from).collect()))
}

/// Adds a document to the catalog.
///
/// Accepts a multipart/form-data request with a `file` part and an optional
/// `name` part that overrides the uploaded file's name.
#[utoipa::path(
    post,
    path = "/documents",
    request_body(content_type = "multipart/form-data", description = "The PDF to add."),
    responses(
        (status = 201, description = "Document added", body = DocumentView),
        (status = 400, description = "Malformed upload"),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Catalog is read-only"),
        (status = 422, description = "Not a PDF, blank name, or more than 500 pages")
    )
)]
pub async fn create_document_handler(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let mut upload: Option<DocumentUpload> = None;
    let mut display_name: Option<String> = None;

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart data: {}", e),
        )
    })? {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("untitled.pdf").to_string();
                let kind = FileKind::from_mime(field.content_type().unwrap_or("application/octet-stream"));
                let contents = field.bytes().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read file bytes: {}", e),
                    )
                })?;
                upload = Some(DocumentUpload::new(file_name, kind, contents));
            }
            Some("name") => {
                let text = field.text().await.map_err(|e| {
                    (
                        StatusCode::BAD_REQUEST,
                        format!("Failed to read name field: {}", e),
                    )
                })?;
                display_name = Some(text);
            }
            other => warn!("Ignoring unexpected multipart field {:?}.", other),
        }
    }

    let upload = upload.ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            "Multipart form must include a file".to_string(),
        )
    })?;

    let record = state
        .session
        .create_document(&upload, display_name.as_deref())
        .await
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(DocumentView::from(record))))
}

/// Renames a document. Page count and upload date are left untouched.
#[utoipa::path(
    put,
    path = "/documents/{id}",
    request_body = UpdateDocumentRequest,
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document renamed", body = DocumentView),
        (status = 404, description = "No such document"),
        (status = 422, description = "Blank name")
    )
)]
pub async fn update_document_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateDocumentRequest>,
) -> Result<Json<DocumentView>, (StatusCode, String)> {
    let record = state
        .session
        .update_document(&DocumentId::new(id), &req.name)
        .await
        .map_err(reject)?;
    Ok(Json(record.into()))
}

/// Deletes a document. Requires `?confirm=true`.
#[utoipa::path(
    delete,
    path = "/documents/{id}",
    params(("id" = String, Path, description = "Document id"), DeleteParams),
    responses(
        (status = 204, description = "Document deleted"),
        (status = 400, description = "Deletion was not confirmed"),
        (status = 404, description = "No such document")
    )
)]
pub async fn delete_document_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<DeleteParams>,
) -> Result<StatusCode, (StatusCode, String)> {
    if !params.confirm {
        return Err((
            StatusCode::BAD_REQUEST,
            "Deletion must be confirmed with ?confirm=true".to_string(),
        ));
    }
    state
        .session
        .delete_document(&DocumentId::new(id))
        .await
        .map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Selects a document to chat about and starts a fresh transcript.
#[utoipa::path(
    post,
    path = "/documents/{id}/select",
    params(("id" = String, Path, description = "Document id")),
    responses(
        (status = 200, description = "Document selected", body = SessionView),
        (status = 404, description = "No such document")
    )
)]
pub async fn select_document_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<SessionView>, (StatusCode, String)> {
    state
        .session
        .select_document(&DocumentId::new(id))
        .await
        .map_err(reject)?;
    Ok(Json(state.session.snapshot().await.into()))
}

/// Submits a user turn about the selected document.
///
/// The user turn is visible in the returned state immediately; the assistant
/// turn follows once the reply arrives and is announced over `/ws`.
#[utoipa::path(
    post,
    path = "/chat",
    request_body = ChatRequest,
    responses(
        (status = 202, description = "Turn accepted, reply pending", body = SessionView),
        (status = 409, description = "A reply is still pending"),
        (status = 422, description = "Empty message or no document selected")
    )
)]
pub async fn submit_chat_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ChatRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let pending = state
        .session
        .submit_user_turn(&req.text)
        .await
        .map_err(reject)?;
    // The reply reaches clients through the session state and the WebSocket feed.
    tokio::spawn(async move {
        if let Err(e) = pending.wait().await {
            error!("Assistant reply was lost: {}", e);
        }
    });
    info!("Chat turn accepted; assistant reply pending.");
    let view: SessionView = state.session.snapshot().await.into();
    Ok((StatusCode::ACCEPTED, Json(view)))
}
