//! Profile resolution keyed by the authenticated identity.
//!
//! SYSTEM CONTEXT
//! ==============
//! Session changes drive [`ProfileResolver::sync`]; the returned ticket is
//! handed to an async fetch and its result fed back through
//! [`ProfileResolver::complete`]. The navigation guard reads the result
//! through [`ProfileState::profile_for`], which only answers for the identity
//! that was asked about.
//!
//! DESIGN
//! ======
//! Every load gets a monotonically increasing generation. A completion whose
//! ticket is no longer current is dropped, so a fetch for user A that lands
//! after the session switched to user B can never overwrite B's state.
//! In-flight requests are not cancelled; their results are ignored.
//!
//! ERROR HANDLING
//! ==============
//! Fetch failures become [`ProfileState::Unresolved`], distinct from a missing
//! row. Nothing retries automatically; [`ProfileResolver::reload`] restarts a
//! load on demand.

#[cfg(test)]
#[path = "profile_test.rs"]
mod profile_test;

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use futures::channel::oneshot;

use super::listeners::{Callback, Listeners, SubscriptionId, notify};
use super::session::SessionSnapshot;
use crate::net::rest::DataError;
use crate::net::types::Profile;

/// Source of profile rows. Implemented by the REST client and by test fakes.
pub trait ProfileSource {
    /// Fetch the profile whose id equals `user_id`. `Ok(None)` means no row.
    fn fetch_profile(&self, user_id: &str) -> impl Future<Output = Result<Option<Profile>, DataError>>;
}

/// Resolver status for the current identity.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum ProfileState {
    /// No authenticated identity.
    #[default]
    Idle,
    Loading { user_id: String, generation: u64 },
    /// Fetch finished; `None` when the row does not exist.
    Resolved { user_id: String, profile: Option<Profile> },
    /// Fetch failed. Routing treats this like a load still in progress.
    Unresolved { user_id: String, error: String },
}

impl ProfileState {
    #[must_use]
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Loading { user_id, .. } | Self::Resolved { user_id, .. } | Self::Unresolved { user_id, .. } => {
                Some(user_id)
            }
        }
    }

    /// The resolved profile, but only when it belongs to `user_id`.
    #[must_use]
    pub fn profile_for(&self, user_id: &str) -> Option<&Profile> {
        match self {
            Self::Resolved { user_id: owner, profile: Some(profile) } if owner == user_id => Some(profile),
            _ => None,
        }
    }

    /// Outcome for `user_id` if its load has finished (found, missing or failed).
    #[must_use]
    pub fn outcome_for(&self, user_id: &str) -> Option<ProfileOutcome> {
        match self {
            Self::Resolved { user_id: owner, profile } if owner == user_id => Some(match profile {
                Some(profile) => ProfileOutcome::Found(profile.clone()),
                None => ProfileOutcome::NotFound,
            }),
            Self::Unresolved { user_id: owner, error } if owner == user_id => Some(ProfileOutcome::Failed(error.clone())),
            _ => None,
        }
    }
}

/// Handle for one in-flight load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveTicket {
    user_id: String,
    generation: u64,
}

impl ResolveTicket {
    #[must_use]
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What a waiter on [`ProfileResolver::settled`] learns.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProfileOutcome {
    Found(Profile),
    NotFound,
    Failed(String),
    /// The identity was signed out or replaced before its load finished.
    Superseded,
}

#[derive(Default)]
struct Inner {
    state: ProfileState,
    generation: u64,
    listeners: Listeners<ProfileState>,
    waiters: Vec<(String, oneshot::Sender<ProfileOutcome>)>,
}

impl Inner {
    /// Move to `next`, handing finished outcomes to waiters and superseding
    /// waiters for any other identity when the identity changes.
    fn transition(&mut self, next: ProfileState) -> Option<(ProfileState, Vec<Callback<ProfileState>>)> {
        if self.state == next {
            return None;
        }
        let identity = next.user_id().map(str::to_owned);
        let waiters = std::mem::take(&mut self.waiters);
        for (user_id, tx) in waiters {
            if let Some(outcome) = next.outcome_for(&user_id) {
                let _ = tx.send(outcome);
            } else if identity.as_deref() != Some(user_id.as_str()) {
                let _ = tx.send(ProfileOutcome::Superseded);
            } else {
                self.waiters.push((user_id, tx));
            }
        }
        self.state = next;
        Some((self.state.clone(), self.listeners.callbacks()))
    }
}

/// Shared handle to the resolver. Clones point at the same state.
#[derive(Clone, Default)]
pub struct ProfileResolver {
    inner: Rc<RefCell<Inner>>,
}

impl std::fmt::Debug for ProfileResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProfileResolver").field("state", &self.state()).finish_non_exhaustive()
    }
}

impl ProfileResolver {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn state(&self) -> ProfileState {
        self.inner.borrow().state.clone()
    }

    /// Identity-checked read of the resolved profile.
    #[must_use]
    pub fn profile_for(&self, user_id: &str) -> Option<Profile> {
        self.inner.borrow().state.profile_for(user_id).cloned()
    }

    /// Align the resolver with the session.
    ///
    /// Returns a ticket when a new load must be started. Repeated calls for an
    /// identity that is already loading or settled return `None`, so a burst
    /// of session notifications issues a single fetch.
    pub fn sync(&self, session: &SessionSnapshot) -> Option<ResolveTicket> {
        if session.is_loading {
            return None;
        }
        let Some(user_id) = session.user_id() else {
            self.update(|inner| inner.transition(ProfileState::Idle));
            return None;
        };
        if self.inner.borrow().state.user_id() == Some(user_id) {
            return None;
        }
        Some(self.start(user_id))
    }

    /// Restart the load for the current identity once it has settled.
    pub fn reload(&self) -> Option<ResolveTicket> {
        let user_id = match &self.inner.borrow().state {
            ProfileState::Resolved { user_id, .. } | ProfileState::Unresolved { user_id, .. } => user_id.clone(),
            ProfileState::Idle | ProfileState::Loading { .. } => return None,
        };
        Some(self.start(&user_id))
    }

    fn start(&self, user_id: &str) -> ResolveTicket {
        let ticket = {
            let mut inner = self.inner.borrow_mut();
            inner.generation += 1;
            ResolveTicket { user_id: user_id.to_owned(), generation: inner.generation }
        };
        let next = ProfileState::Loading { user_id: ticket.user_id.clone(), generation: ticket.generation };
        self.update(|inner| inner.transition(next));
        log::debug!("profile: loading user={user_id} generation={}", ticket.generation);
        ticket
    }

    /// Apply a fetch result. Returns `false` when the ticket was superseded and
    /// the result was discarded.
    pub fn complete(&self, ticket: &ResolveTicket, result: Result<Option<Profile>, DataError>) -> bool {
        let current = {
            let inner = self.inner.borrow();
            inner.generation == ticket.generation
                && matches!(&inner.state, ProfileState::Loading { user_id, .. } if *user_id == ticket.user_id)
        };
        if !current {
            log::debug!(
                "profile: discarding stale result user={} generation={}",
                ticket.user_id,
                ticket.generation
            );
            return false;
        }
        let user_id = ticket.user_id.clone();
        let next = match result {
            Ok(Some(profile)) if profile.id != user_id => {
                log::warn!("profile: row id {} does not match user {user_id}", profile.id);
                ProfileState::Unresolved { user_id, error: "profile id does not match user".to_owned() }
            }
            Ok(profile) => ProfileState::Resolved { user_id, profile },
            Err(err) => {
                log::warn!("profile: fetch failed user={user_id}: {err}");
                ProfileState::Unresolved { user_id, error: err.to_string() }
            }
        };
        self.update(|inner| inner.transition(next));
        true
    }

    /// Fetch through `source` and apply the result for `ticket`.
    pub async fn resolve<S: ProfileSource>(&self, source: &S, ticket: ResolveTicket) -> bool {
        let result = source.fetch_profile(ticket.user_id()).await;
        self.complete(&ticket, result)
    }

    /// Wait until the load for `user_id` finishes, or until that identity is
    /// replaced. Returns immediately when it has already finished.
    pub async fn settled(&self, user_id: &str) -> ProfileOutcome {
        let rx = {
            let mut inner = self.inner.borrow_mut();
            if let Some(outcome) = inner.state.outcome_for(user_id) {
                return outcome;
            }
            let (tx, rx) = oneshot::channel();
            inner.waiters.push((user_id.to_owned(), tx));
            rx
        };
        rx.await.unwrap_or(ProfileOutcome::Superseded)
    }

    /// Register a callback that runs after every state change.
    pub fn subscribe(&self, callback: impl Fn(&ProfileState) + 'static) -> SubscriptionId {
        self.inner.borrow_mut().listeners.add(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.inner.borrow_mut().listeners.remove(id)
    }

    fn update(
        &self,
        f: impl FnOnce(&mut Inner) -> Option<(ProfileState, Vec<Callback<ProfileState>>)>,
    ) {
        let changed = f(&mut self.inner.borrow_mut());
        if let Some((state, callbacks)) = changed {
            notify(callbacks, &state);
        }
    }
}
