//! Auth-session state for the current browser context.
//!
//! SYSTEM CONTEXT
//! ==============
//! The auth client feeds [`AuthEvent`]s in; the profile resolver, the Leptos
//! signals and the REST client read from it. One store exists per app
//! instance and is passed explicitly (Leptos context), never global.
//!
//! DESIGN
//! ======
//! `is_loading` starts `true` and flips to `false` on the first event of any
//! kind, exactly once. Subscribers run synchronously and only when the
//! visible snapshot changed; a token refresh for the same user is silent.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::RefCell;
use std::rc::Rc;

use super::listeners::{Listeners, SubscriptionId, notify};
use crate::net::types::{AuthSession, AuthUser};

/// Read-only view of the session that routing decisions consume.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub user: Option<AuthUser>,
    pub is_loading: bool,
}

impl Default for SessionSnapshot {
    fn default() -> Self {
        Self::loading()
    }
}

impl SessionSnapshot {
    /// Initial state before the auth provider has reported anything.
    #[must_use]
    pub fn loading() -> Self {
        Self { user: None, is_loading: true }
    }

    /// Settled state with or without a user.
    #[must_use]
    pub fn resolved(user: Option<AuthUser>) -> Self {
        Self { user, is_loading: false }
    }

    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

/// State change reported by the auth provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    /// First report after startup: the persisted session, if any.
    InitialSession(Option<AuthSession>),
    SignedIn(AuthSession),
    SignedOut,
    TokenRefreshed(AuthSession),
    UserUpdated(AuthUser),
}

impl AuthEvent {
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::InitialSession(_) => "initial_session",
            Self::SignedIn(_) => "signed_in",
            Self::SignedOut => "signed_out",
            Self::TokenRefreshed(_) => "token_refreshed",
            Self::UserUpdated(_) => "user_updated",
        }
    }
}

#[derive(Default)]
struct Inner {
    snapshot: SessionSnapshot,
    session: Option<AuthSession>,
    listeners: Listeners<SessionSnapshot>,
}

/// Shared handle to the session state. Clones point at the same store.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Rc<RefCell<Inner>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").field("snapshot", &self.snapshot()).finish_non_exhaustive()
    }
}

impl SessionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.borrow().snapshot.clone()
    }

    /// Full token bundle, if a session is held.
    #[must_use]
    pub fn session(&self) -> Option<AuthSession> {
        self.inner.borrow().session.clone()
    }

    /// Bearer token for data-store calls, if a session is held.
    #[must_use]
    pub fn access_token(&self) -> Option<String> {
        self.inner.borrow().session.as_ref().map(|s| s.access_token.clone())
    }

    /// Apply an auth event. Returns `true` when the snapshot changed and
    /// subscribers were notified. Re-applying the same event is a no-op.
    pub fn apply(&self, event: AuthEvent) -> bool {
        let name = event.name();
        let (snapshot, callbacks) = {
            let mut guard = self.inner.borrow_mut();
            let inner = &mut *guard;
            let previous = inner.snapshot.clone();
            match event {
                AuthEvent::InitialSession(session) => {
                    inner.snapshot.user = session.as_ref().map(|s| s.user.clone());
                    inner.session = session;
                }
                AuthEvent::SignedIn(session) | AuthEvent::TokenRefreshed(session) => {
                    inner.snapshot.user = Some(session.user.clone());
                    inner.session = Some(session);
                }
                AuthEvent::SignedOut => {
                    inner.snapshot.user = None;
                    inner.session = None;
                }
                AuthEvent::UserUpdated(user) => match inner.session.as_mut() {
                    Some(session) => {
                        session.user = user.clone();
                        inner.snapshot.user = Some(user);
                    }
                    None => log::debug!("session: user_updated ignored without a session"),
                },
            }
            inner.snapshot.is_loading = false;
            if inner.snapshot == previous {
                return false;
            }
            (inner.snapshot.clone(), inner.listeners.callbacks())
        };
        log::debug!(
            "session: {name} -> user={:?} loading={}",
            snapshot.user_id(),
            snapshot.is_loading
        );
        notify(callbacks, &snapshot);
        true
    }

    /// Register a callback that runs after every snapshot change.
    pub fn subscribe(&self, callback: impl Fn(&SessionSnapshot) + 'static) -> SubscriptionId {
        self.inner.borrow_mut().listeners.add(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().listeners.remove(id)
    }
}
