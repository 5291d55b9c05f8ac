//! crates/doc_chat_core/src/auth.rs
//!
//! The login/logout half of the session: who may log in, whether the session
//! is currently authenticated, and what the login form still shows.

use crate::domain::{Credentials, LoginForm};
use tracing::{info, warn};

/// How a login attempt is judged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialPolicy {
    /// Any non-empty username and password are accepted.
    AnyNonEmpty,
    /// Only this exact pair is accepted.
    Exact(Credentials),
}

impl CredentialPolicy {
    fn accepts(&self, username: &str, password: &str) -> bool {
        match self {
            CredentialPolicy::AnyNonEmpty => !username.is_empty() && !password.is_empty(),
            CredentialPolicy::Exact(expected) => {
                expected.username == username && expected.password == password
            }
        }
    }

    /// Whether a failed attempt is reported to the caller or silently ignored.
    pub fn reports_failures(&self) -> bool {
        matches!(self, CredentialPolicy::Exact(_))
    }
}

/// Result of judging a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginAttempt {
    Accepted,
    Refused,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticated,
}

#[derive(Debug)]
pub struct AuthModel {
    policy: CredentialPolicy,
    state: AuthState,
    form: LoginForm,
    keep_username_on_logout: bool,
}

impl AuthModel {
    pub fn new(policy: CredentialPolicy, keep_username_on_logout: bool) -> Self {
        Self {
            policy,
            state: AuthState::Unauthenticated,
            form: LoginForm::default(),
            keep_username_on_logout,
        }
    }

    pub fn policy(&self) -> &CredentialPolicy {
        &self.policy
    }

    pub fn state(&self) -> AuthState {
        self.state
    }

    pub fn is_authenticated(&self) -> bool {
        self.state == AuthState::Authenticated
    }

    pub fn form(&self) -> &LoginForm {
        &self.form
    }

    /// Records the submitted form and transitions to `Authenticated` if the
    /// policy accepts it. The caller must ensure the session is not already
    /// authenticated.
    pub fn login(&mut self, username: &str, password: &str) -> LoginAttempt {
        self.form = LoginForm {
            username: username.to_string(),
            password: password.to_string(),
        };

        if self.policy.accepts(username, password) {
            self.state = AuthState::Authenticated;
            info!("User '{}' logged in.", username);
            LoginAttempt::Accepted
        } else {
            warn!("Login refused for user '{}'.", username);
            LoginAttempt::Refused
        }
    }

    /// Returns to `Unauthenticated`. The password is always wiped.
    pub fn logout(&mut self) {
        self.state = AuthState::Unauthenticated;
        self.form.password.clear();
        if !self.keep_username_on_logout {
            self.form.username.clear();
        }
        info!("Session logged out.");
    }
}
