//! Auth slice: the current session and login/register progress.

use notehub_core::{PublicUser, UserSummary};

use super::LoadState;
use crate::session::Session;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub session: Option<Session>,
    pub phase: LoadState,
    pub error: Option<String>,
}

impl AuthState {
    /// State restored from a saved session.
    pub fn restored(session: Option<Session>) -> Self {
        Self {
            session,
            ..Self::default()
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    pub fn user(&self) -> Option<&UserSummary> {
        self.session.as_ref().map(|s| &s.user)
    }

    pub fn pending(&mut self) {
        self.phase = LoadState::Pending;
        self.error = None;
    }

    pub fn rejected(&mut self, message: String) {
        self.phase = LoadState::Rejected;
        self.error = Some(message);
    }

    pub fn logged_in(&mut self, session: Session) {
        self.phase = LoadState::Fulfilled;
        self.session = Some(session);
    }

    /// Registration does not log in.
    pub fn registered(&mut self) {
        self.phase = LoadState::Fulfilled;
    }

    /// Refresh the cached user from a profile response.
    pub fn profile_loaded(&mut self, profile: PublicUser) {
        self.phase = LoadState::Fulfilled;
        if let Some(session) = self.session.as_mut() {
            session.user = UserSummary {
                id: profile.id,
                email: profile.email,
                full_name: profile.full_name,
            };
        }
    }

    pub fn logout(&mut self) {
        *self = Self::default();
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
