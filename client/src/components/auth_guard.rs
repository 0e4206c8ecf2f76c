//! Route wrapper that applies the navigation guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every route in `app` is wrapped in [`AuthGuard`]. The decision itself lives
//! in `routing::guard`; this component only feeds it signals and carries out
//! redirects.

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::{use_location, use_navigate};

use crate::routing::guard::{GuardDecision, GuardInput, Redirect, decide};
use crate::state::auth_context::use_auth;

/// Render `children` only when the guard allows the current location.
///
/// The decision is recomputed whenever the session, the profile or the path
/// changes. Redirects replace the current history entry; the placeholder stays
/// up until the new location renders.
#[component]
pub fn AuthGuard(children: ChildrenFn) -> impl IntoView {
    let auth = use_auth();
    let pathname = use_location().pathname;
    let navigate = use_navigate();

    let decision = Memo::new(move |_| {
        let session = auth.session.get();
        let profile = auth.profile.get();
        let path = pathname.get();
        decide(&GuardInput::new(&session, &profile, &path))
    });

    Effect::new(move || {
        if let GuardDecision::Redirect(Redirect { to, replace }) = decision.get() {
            log::debug!("guard: redirect {} -> {to}", pathname.get_untracked());
            navigate(to, NavigateOptions { replace, ..NavigateOptions::default() });
        }
    });

    view! {
        <Show when=move || decision.get() == GuardDecision::Render fallback=|| view! { <LoadingScreen/> }>
            {children()}
        </Show>
    }
}

/// Full-page placeholder shown while auth state is unknown.
#[component]
pub fn LoadingScreen() -> impl IntoView {
    view! {
        <div class="loading-screen" role="status" aria-live="polite">
            <p>"Carregando..."</p>
        </div>
    }
}
