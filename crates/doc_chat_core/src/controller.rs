//! crates/doc_chat_core/src/controller.rs
//!
//! Composes the auth, catalog and chat models into the one object every
//! session command goes through. The controller is synchronous; the async
//! reply is driven by [`crate::session::Session`].

use crate::auth::{AuthModel, CredentialPolicy, LoginAttempt};
use crate::catalog::CatalogModel;
use crate::chat::{selection_greeting, ChatModel, ReplyTicket};
use crate::domain::{
    ChatRole, ChatTurn, Credentials, DocumentId, DocumentRecord, DocumentUpload, SessionSnapshot,
};
use crate::error::{SessionError, SessionResult};
use crate::ports::{PageCounter, PortResult, TranscriptObserver, TranscriptUpdate};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

pub const ADMIN_WELCOME: &str = "Welcome Admin! Manage your documents or chat with me.";
pub const USER_WELCOME: &str = "Welcome! Please select a document to chat about.";

/// Everything that distinguishes the admin dashboard from the user app.
#[derive(Debug, Clone)]
pub struct SessionProfile {
    pub can_manage_catalog: bool,
    pub credentials: CredentialPolicy,
    pub welcome_message: String,
}

impl SessionProfile {
    pub fn admin(credentials: Credentials) -> Self {
        Self {
            can_manage_catalog: true,
            credentials: CredentialPolicy::Exact(credentials),
            welcome_message: ADMIN_WELCOME.to_string(),
        }
    }

    pub fn user() -> Self {
        Self {
            can_manage_catalog: false,
            credentials: CredentialPolicy::AnyNonEmpty,
            welcome_message: USER_WELCOME.to_string(),
        }
    }

    fn sample_catalog(&self) -> CatalogModel {
        if self.can_manage_catalog {
            CatalogModel::admin_sample()
        } else {
            CatalogModel::user_sample()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginOutcome {
    Authenticated,
    /// The user app ignores refused logins instead of reporting them.
    Ignored,
}

pub struct SessionController {
    can_manage_catalog: bool,
    welcome_message: String,
    auth: AuthModel,
    catalog: CatalogModel,
    chat: ChatModel,
    page_counter: Arc<dyn PageCounter>,
    observer: Arc<dyn TranscriptObserver>,
}

impl SessionController {
    /// Creates a controller seeded with the profile's sample catalog.
    pub fn new(
        profile: SessionProfile,
        page_counter: Arc<dyn PageCounter>,
        observer: Arc<dyn TranscriptObserver>,
    ) -> Self {
        let catalog = profile.sample_catalog();
        Self::with_catalog(profile, catalog, page_counter, observer)
    }

    pub fn with_catalog(
        profile: SessionProfile,
        catalog: CatalogModel,
        page_counter: Arc<dyn PageCounter>,
        observer: Arc<dyn TranscriptObserver>,
    ) -> Self {
        let keep_username = profile.can_manage_catalog;
        Self {
            can_manage_catalog: profile.can_manage_catalog,
            welcome_message: profile.welcome_message,
            auth: AuthModel::new(profile.credentials, keep_username),
            catalog,
            chat: ChatModel::default(),
            page_counter,
            observer,
        }
    }

    //=====================================================================================
    // Auth
    //=====================================================================================

    pub fn login(&mut self, username: &str, password: &str) -> SessionResult<LoginOutcome> {
        if self.auth.is_authenticated() {
            return Err(SessionError::AlreadyAuthenticated);
        }

        match self.auth.login(username, password) {
            LoginAttempt::Accepted => {
                let welcome = ChatTurn::assistant(self.welcome_message.clone());
                self.replace_transcript(vec![welcome]);
                Ok(LoginOutcome::Authenticated)
            }
            LoginAttempt::Refused if self.auth.policy().reports_failures() => {
                Err(SessionError::InvalidCredentials)
            }
            LoginAttempt::Refused => Ok(LoginOutcome::Ignored),
        }
    }

    /// Clears the session, the transcript and the selection. The catalog
    /// itself is left as it is.
    pub fn logout(&mut self) -> SessionResult<()> {
        self.require_auth()?;
        self.auth.logout();
        self.replace_transcript(Vec::new());
        self.catalog.clear_selection();
        Ok(())
    }

    //=====================================================================================
    // Catalog
    //=====================================================================================

    pub fn documents(&self) -> SessionResult<&[DocumentRecord]> {
        self.require_auth()?;
        Ok(self.catalog.records())
    }

    pub fn create_document(
        &mut self,
        upload: &DocumentUpload,
        display_name: Option<&str>,
    ) -> SessionResult<DocumentRecord> {
        self.require_catalog_admin()?;
        self.catalog
            .create(upload, display_name, self.page_counter.as_ref(), Utc::now())
    }

    pub fn update_document(&mut self, id: &DocumentId, new_name: &str) -> SessionResult<DocumentRecord> {
        self.require_catalog_admin()?;
        self.catalog.rename(id, new_name)
    }

    /// Removes a record. Callers must have confirmed the deletion already.
    pub fn delete_document(&mut self, id: &DocumentId) -> SessionResult<()> {
        self.require_catalog_admin()?;
        self.catalog.remove(id).map(|_| ())
    }

    /// Selects a document and starts a fresh transcript about it.
    pub fn select_document(&mut self, id: &DocumentId) -> SessionResult<DocumentRecord> {
        self.require_auth()?;
        let record = self.catalog.select(id)?;
        info!("Selected document {} ('{}').", record.id, record.name);
        self.replace_transcript(vec![ChatTurn::assistant(selection_greeting(&record.name))]);
        Ok(record)
    }

    //=====================================================================================
    // Chat
    //=====================================================================================

    /// Appends the user's turn and hands back the ticket the reply must be
    /// completed with.
    pub fn begin_user_turn(&mut self, text: &str) -> SessionResult<ReplyTicket> {
        self.require_auth()?;
        let ticket = self
            .chat
            .begin(text, self.catalog.selected())
            .map_err(|reason| {
                warn!("User turn rejected: {}", reason);
                SessionError::Rejected(reason)
            })?;
        self.notify_appended(ChatRole::User);
        Ok(ticket)
    }

    pub fn finish_user_turn(&mut self, ticket: ReplyTicket, outcome: PortResult<String>) -> Option<ChatTurn> {
        let turn = self.chat.complete(ticket, outcome)?;
        self.notify_appended(ChatRole::Assistant);
        Some(turn)
    }

    //=====================================================================================
    // Read access
    //=====================================================================================

    pub fn is_authenticated(&self) -> bool {
        self.auth.is_authenticated()
    }

    pub fn can_manage_catalog(&self) -> bool {
        self.can_manage_catalog
    }

    pub fn selection(&self) -> Option<&DocumentId> {
        self.catalog.selection()
    }

    pub fn transcript(&self) -> &[ChatTurn] {
        self.chat.transcript()
    }

    pub fn is_pending(&self) -> bool {
        self.chat.is_pending()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let authenticated = self.auth.is_authenticated();
        SessionSnapshot {
            authenticated,
            username: self.auth.form().username.clone(),
            can_manage_catalog: self.can_manage_catalog,
            documents: if authenticated {
                self.catalog.records().to_vec()
            } else {
                Vec::new()
            },
            selection: self.catalog.selection().cloned(),
            transcript: self.chat.transcript().to_vec(),
            pending: self.chat.is_pending(),
        }
    }

    //=====================================================================================
    // Helpers
    //=====================================================================================

    fn require_auth(&self) -> SessionResult<()> {
        if self.auth.is_authenticated() {
            Ok(())
        } else {
            Err(SessionError::NotAuthenticated)
        }
    }

    fn require_catalog_admin(&self) -> SessionResult<()> {
        self.require_auth()?;
        if self.can_manage_catalog {
            Ok(())
        } else {
            Err(SessionError::ReadOnlyCatalog)
        }
    }

    fn replace_transcript(&mut self, turns: Vec<ChatTurn>) {
        self.chat.replace(turns);
        self.observer.scroll_to_latest(TranscriptUpdate::Replaced {
            len: self.chat.transcript().len(),
        });
    }

    fn notify_appended(&self, role: ChatRole) {
        self.observer.scroll_to_latest(TranscriptUpdate::Appended {
            role,
            len: self.chat.transcript().len(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chat::simulated_reply;
    use crate::domain::FileKind;
    use crate::error::{RejectReason, ValidationReason};
    use std::sync::Mutex;

    struct FixedPages(u32);

    impl PageCounter for FixedPages {
        fn count_pages(&self, _upload: &DocumentUpload) -> PortResult<u32> {
            Ok(self.0)
        }
    }

    #[derive(Default)]
    struct RecordingObserver {
        updates: Mutex<Vec<TranscriptUpdate>>,
    }

    impl TranscriptObserver for RecordingObserver {
        fn scroll_to_latest(&self, update: TranscriptUpdate) {
            self.updates.lock().unwrap().push(update);
        }
    }

    fn admin_with(pages: u32) -> (SessionController, Arc<RecordingObserver>) {
        let observer = Arc::new(RecordingObserver::default());
        let controller = SessionController::new(
            SessionProfile::admin(Credentials::new("admin", "admin123")),
            Arc::new(FixedPages(pages)),
            observer.clone(),
        );
        (controller, observer)
    }

    fn logged_in_admin() -> SessionController {
        let (mut controller, _) = admin_with(10);
        controller.login("admin", "admin123").unwrap();
        controller
    }

    fn user() -> SessionController {
        SessionController::new(
            SessionProfile::user(),
            Arc::new(FixedPages(10)),
            Arc::new(crate::ports::NoopObserver),
        )
    }

    #[test]
    fn wrong_admin_credentials_are_reported() {
        let (mut controller, observer) = admin_with(10);
        for (username, password) in [("admin", "admin"), ("root", "admin123"), ("", "")] {
            assert_eq!(
                controller.login(username, password),
                Err(SessionError::InvalidCredentials)
            );
            assert!(!controller.is_authenticated());
        }
        assert!(controller.transcript().is_empty());
        assert!(observer.updates.lock().unwrap().is_empty());
    }

    #[test]
    fn admin_login_seeds_welcome_turn() {
        let (mut controller, observer) = admin_with(10);
        assert_eq!(
            controller.login("admin", "admin123"),
            Ok(LoginOutcome::Authenticated)
        );
        assert_eq!(controller.transcript(), &[ChatTurn::assistant(ADMIN_WELCOME)]);
        assert_eq!(
            observer.updates.lock().unwrap().as_slice(),
            &[TranscriptUpdate::Replaced { len: 1 }]
        );
        assert_eq!(
            controller.login("admin", "admin123"),
            Err(SessionError::AlreadyAuthenticated)
        );
    }

    #[test]
    fn user_login_accepts_any_non_empty_pair_and_ignores_the_rest() {
        for (username, password) in [("jane", "x"), ("a", "b"), ("bob", "hunter2")] {
            let mut controller = user();
            assert_eq!(
                controller.login(username, password),
                Ok(LoginOutcome::Authenticated)
            );
            assert_eq!(controller.transcript(), &[ChatTurn::assistant(USER_WELCOME)]);
        }

        let mut controller = user();
        assert_eq!(controller.login("jane", ""), Ok(LoginOutcome::Ignored));
        assert!(!controller.is_authenticated());
        assert!(controller.transcript().is_empty());
    }

    #[test]
    fn everything_but_login_requires_authentication() {
        let (mut controller, _) = admin_with(10);
        let upload = DocumentUpload::new("a.pdf", FileKind::Pdf, &b""[..]);
        assert_eq!(controller.logout(), Err(SessionError::NotAuthenticated));
        assert_eq!(controller.documents().unwrap_err(), SessionError::NotAuthenticated);
        assert_eq!(
            controller.create_document(&upload, None).unwrap_err(),
            SessionError::NotAuthenticated
        );
        assert_eq!(
            controller.select_document(&"1".into()).unwrap_err(),
            SessionError::NotAuthenticated
        );
        assert_eq!(
            controller.begin_user_turn("hi").unwrap_err(),
            SessionError::NotAuthenticated
        );
        assert!(controller.snapshot().documents.is_empty());
    }

    #[test]
    fn user_catalog_is_read_only_but_selectable() {
        let mut controller = user();
        controller.login("jane", "secret").unwrap();
        let upload = DocumentUpload::new("a.pdf", FileKind::Pdf, &b""[..]);

        assert_eq!(
            controller.create_document(&upload, None).unwrap_err(),
            SessionError::ReadOnlyCatalog
        );
        assert_eq!(
            controller.update_document(&"1".into(), "x").unwrap_err(),
            SessionError::ReadOnlyCatalog
        );
        assert_eq!(
            controller.delete_document(&"1".into()).unwrap_err(),
            SessionError::ReadOnlyCatalog
        );
        assert_eq!(controller.documents().unwrap().len(), 4);

        let record = controller.select_document(&"3".into()).unwrap();
        assert_eq!(record.name, "Technical Documentation");
    }

    #[test]
    fn select_replaces_transcript_with_greeting() {
        let mut controller = logged_in_admin();
        controller.select_document(&"1".into()).unwrap();

        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 1);
        assert_eq!(transcript[0].role, ChatRole::Assistant);
        assert!(transcript[0].content.starts_with("You've selected \"Company Policy.pdf\""));
    }

    #[test]
    fn leave_policy_scenario() {
        let mut controller = logged_in_admin();
        controller.select_document(&"1".into()).unwrap();

        let ticket = controller.begin_user_turn("What is the leave policy?").unwrap();
        assert_eq!(controller.transcript().len(), 2);

        let reply = simulated_reply(&ticket.request().document_name, &ticket.request().question);
        controller.finish_user_turn(ticket, Ok(reply)).unwrap();

        let transcript = controller.transcript();
        assert_eq!(transcript.len(), 3);
        assert_eq!(transcript[1], ChatTurn::user("What is the leave policy?"));
        assert_eq!(transcript[2].role, ChatRole::Assistant);
        assert!(transcript[2].content.contains("Company Policy.pdf"));
        assert!(transcript[2].content.contains("What is the leave policy?"));
    }

    #[test]
    fn oversized_documents_never_enter_the_catalog() {
        let (mut controller, _) = admin_with(501);
        controller.login("admin", "admin123").unwrap();
        let upload = DocumentUpload::new("huge.pdf", FileKind::Pdf, &b"%PDF"[..]);

        assert_eq!(
            controller.create_document(&upload, None).unwrap_err(),
            SessionError::Validation(ValidationReason::PageLimitExceeded { pages: 501 })
        );
        assert_eq!(controller.documents().unwrap().len(), 2);
    }

    #[test]
    fn text_upload_is_rejected_and_catalog_unchanged() {
        let mut controller = logged_in_admin();
        let before = controller.documents().unwrap().to_vec();
        let upload = DocumentUpload::new("notes.txt", FileKind::Text, &b"notes"[..]);

        assert_eq!(
            controller.create_document(&upload, None).unwrap_err(),
            SessionError::Validation(ValidationReason::UnsupportedType)
        );
        assert_eq!(controller.documents().unwrap(), before.as_slice());
    }

    #[test]
    fn rename_keeps_page_count_and_date() {
        let mut controller = logged_in_admin();
        let updated = controller.update_document(&"1".into(), "New Name.pdf").unwrap();
        assert_eq!(updated.name, "New Name.pdf");
        assert_eq!(updated.page_count, 120);
        assert_eq!(updated.upload_date.to_string(), "2023-05-15");
    }

    #[test]
    fn deleted_document_cannot_be_selected() {
        let mut controller = logged_in_admin();
        controller.select_document(&"1".into()).unwrap();
        controller.delete_document(&"1".into()).unwrap();

        assert_eq!(controller.selection(), None);
        assert_eq!(
            controller.select_document(&"1".into()).unwrap_err(),
            SessionError::NotFound { id: "1".into() }
        );
        assert_eq!(
            controller.delete_document(&"1".into()).unwrap_err(),
            SessionError::NotFound { id: "1".into() }
        );
        assert_eq!(
            controller.begin_user_turn("still there?").unwrap_err(),
            SessionError::Rejected(RejectReason::NoSelection)
        );
    }

    #[test]
    fn logout_clears_chat_and_selection_but_keeps_admin_catalog() {
        let mut controller = logged_in_admin();
        let upload = DocumentUpload::new("Extra.pdf", FileKind::Pdf, &b"%PDF"[..]);
        controller.create_document(&upload, None).unwrap();
        controller.select_document(&"2".into()).unwrap();

        controller.logout().unwrap();
        let snapshot = controller.snapshot();
        assert!(!snapshot.authenticated);
        assert!(snapshot.transcript.is_empty());
        assert_eq!(snapshot.selection, None);
        assert_eq!(snapshot.username, "admin");

        controller.login("admin", "admin123").unwrap();
        assert_eq!(controller.documents().unwrap().len(), 3);
    }

    #[test]
    fn logout_scrolls_to_an_empty_transcript() {
        let (mut controller, observer) = admin_with(10);
        controller.login("admin", "admin123").unwrap();
        controller.select_document(&"1".into()).unwrap();
        controller.logout().unwrap();

        assert_eq!(
            observer.updates.lock().unwrap().last(),
            Some(&TranscriptUpdate::Replaced { len: 0 })
        );
        assert!(controller.transcript().is_empty());
    }

    #[test]
    fn every_transcript_change_scrolls_to_latest() {
        let (mut controller, observer) = admin_with(10);
        controller.login("admin", "admin123").unwrap();
        controller.select_document(&"2".into()).unwrap();
        let ticket = controller.begin_user_turn("Summarise it").unwrap();
        controller.finish_user_turn(ticket, Ok("Sure.".into()));

        assert_eq!(
            observer.updates.lock().unwrap().as_slice(),
            &[
                TranscriptUpdate::Replaced { len: 1 },
                TranscriptUpdate::Replaced { len: 1 },
                TranscriptUpdate::Appended { role: ChatRole::User, len: 2 },
                TranscriptUpdate::Appended { role: ChatRole::Assistant, len: 3 },
            ]
        );
    }
}
