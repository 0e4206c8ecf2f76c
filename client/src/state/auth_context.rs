//! Leptos binding for the auth core.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`AuthContext`] is the reactive view components read through
//! `expect_context`. [`AuthHandles`] owns the single-threaded store, resolver
//! and backend clients; it lives in a thread-local on the browser main thread,
//! like the rest of the app's non-`Send` browser state, and is never created
//! during server rendering.
//!
//! DESIGN
//! ======
//! Signals mirror the store and resolver through their subscriptions, so the
//! core stays plain Rust and the signals only ever hold snapshots. Every
//! session change is also forwarded to [`ProfileResolver::sync`]; a returned
//! ticket starts one profile load.

#[cfg(test)]
#[path = "auth_context_test.rs"]
mod auth_context_test;

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use leptos::prelude::*;

use super::profile::{ProfileResolver, ProfileState, ResolveTicket};
use super::session::{AuthEvent, SessionSnapshot, SessionStore};
use crate::config::PublicConfig;
use crate::net::auth_api::AuthApi;
use crate::net::rest::{DataError, RestClient};

thread_local! {
    static HANDLES: RefCell<Option<AuthHandles>> = const { RefCell::new(None) };
}

/// Reactive auth state shared through Leptos context.
#[derive(Clone, Copy, Debug)]
pub struct AuthContext {
    pub session: RwSignal<SessionSnapshot>,
    pub profile: RwSignal<ProfileState>,
    /// Set when the public config could not be loaded; auth is unusable then.
    pub config_error: RwSignal<Option<String>>,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self::new()
    }
}

impl AuthContext {
    #[must_use]
    pub fn new() -> Self {
        Self {
            session: RwSignal::new(SessionSnapshot::loading()),
            profile: RwSignal::new(ProfileState::Idle),
            config_error: RwSignal::new(None),
        }
    }
}

/// Clients built once the public config is known.
#[derive(Clone, Debug)]
pub struct Backend {
    pub auth: AuthApi,
    pub rest: RestClient,
}

/// Owning handles behind an [`AuthContext`]. Clones share state.
#[derive(Clone, Debug)]
pub struct AuthHandles {
    pub store: SessionStore,
    pub resolver: ProfileResolver,
    backend: Rc<RefCell<Option<Backend>>>,
}

impl AuthHandles {
    #[must_use]
    pub fn backend(&self) -> Option<Backend> {
        self.backend.borrow().clone()
    }

    /// Build the backend clients and route auth events into the store.
    pub fn install(&self, config: PublicConfig) -> Backend {
        let auth = AuthApi::new(config.clone());
        let rest = RestClient::new(config, self.store.clone()).with_refresher(auth.clone());
        let store = self.store.clone();
        auth.on_auth_state_change(move |event| {
            store.apply(event.clone());
        });
        let backend = Backend { auth, rest };
        *self.backend.borrow_mut() = Some(backend.clone());
        backend
    }

    /// Fetch the current user's profile again, e.g. after onboarding changed it.
    pub fn reload_profile(&self) {
        if let Some(ticket) = self.resolver.reload() {
            start_load(&self.resolver, &self.backend, ticket);
        }
    }
}

fn start_load(resolver: &ProfileResolver, backend: &RefCell<Option<Backend>>, ticket: ResolveTicket) {
    let Some(rest) = backend.borrow().as_ref().map(|b| b.rest.clone()) else {
        resolver.complete(&ticket, Err(DataError::Unavailable));
        return;
    };
    let resolver = resolver.clone();
    spawn_task(async move {
        resolver.resolve(&rest, ticket).await;
    });
}

/// Create the handles for `ctx`, mirror them into its signals and register
/// them as the current thread's handles.
pub fn connect(ctx: AuthContext) -> AuthHandles {
    let handles = AuthHandles {
        store: SessionStore::new(),
        resolver: ProfileResolver::new(),
        backend: Rc::default(),
    };

    handles.resolver.subscribe(move |state| ctx.profile.set(state.clone()));

    let resolver = handles.resolver.clone();
    let backend = Rc::clone(&handles.backend);
    handles.store.subscribe(move |snapshot| {
        ctx.session.set(snapshot.clone());
        if let Some(ticket) = resolver.sync(snapshot) {
            start_load(&resolver, &backend, ticket);
        }
    });

    HANDLES.with(|slot| *slot.borrow_mut() = Some(handles.clone()));
    handles
}

/// Handles registered by [`connect`] on this thread, if any.
#[must_use]
pub fn current_handles() -> Option<AuthHandles> {
    HANDLES.with(|slot| slot.borrow().clone())
}

/// Reactive auth state from context.
#[must_use]
pub fn use_auth() -> AuthContext {
    expect_context::<AuthContext>()
}

/// Browser startup: connect the core, load the public config and report the
/// persisted session. A config failure settles the session as signed out.
#[cfg(feature = "hydrate")]
pub fn bootstrap(ctx: AuthContext) {
    let handles = connect(ctx);
    leptos::task::spawn_local(async move {
        match crate::config::fetch_public_config().await {
            Ok(config) => {
                let backend = handles.install(config);
                backend.auth.initialize().await;
            }
            Err(e) => {
                log::error!("auth: public config unavailable: {e}");
                ctx.config_error.set(Some(e.to_string()));
                handles.store.apply(AuthEvent::InitialSession(None));
            }
        }
    });
}

/// Sign out through the auth client, or locally when none is installed.
pub async fn sign_out() {
    let Some(handles) = current_handles() else {
        return;
    };
    match handles.backend() {
        Some(backend) => {
            if let Err(e) = backend.auth.sign_out().await {
                log::warn!("auth: remote sign-out failed: {e}");
            }
        }
        None => {
            handles.store.apply(AuthEvent::SignedOut);
        }
    }
}

fn spawn_task(task: impl Future<Output = ()> + 'static) {
    #[cfg(feature = "hydrate")]
    leptos::task::spawn_local(task);
    #[cfg(not(feature = "hydrate"))]
    {
        drop(task);
        log::debug!("auth: background task skipped outside the browser");
    }
}
