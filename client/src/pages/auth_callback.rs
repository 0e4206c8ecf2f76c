//! `/auth/callback` page: completes email confirmation links.
//!
//! SYSTEM CONTEXT
//! ==============
//! The auth service redirects here with `code`, `token_hash` or `error` in the
//! query. The page hands them to `routing::callback::handle_callback` once
//! and replaces itself with the chosen destination.

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::components::auth_guard::LoadingScreen;
use crate::routing::callback::CallbackParams;

/// Query keys the callback understands.
const CALLBACK_KEYS: [&str; 5] = ["code", "token_hash", "type", "error", "error_description"];

#[component]
pub fn AuthCallbackPage() -> impl IntoView {
    let query = use_query_map();
    let started = StoredValue::new(false);
    #[cfg(feature = "hydrate")]
    let navigate = leptos_router::hooks::use_navigate();

    Effect::new(move || {
        if started.get_value() {
            return;
        }
        started.set_value(true);
        let map = query.get_untracked();
        let values: Vec<(&str, String)> =
            CALLBACK_KEYS.iter().filter_map(|key| map.get(key).map(|value| (*key, value))).collect();
        let params = CallbackParams::from_query(values.iter().map(|(k, v)| (*k, v.as_str())));

        #[cfg(feature = "hydrate")]
        {
            use crate::routing::callback::{
                CALLBACK_FAILED, CALLBACK_SETTLE_TIMEOUT_MS, handle_callback, login_with_error,
            };

            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                let replace = leptos_router::NavigateOptions { replace: true, ..Default::default() };
                let handles = crate::state::auth_context::current_handles();
                let Some((handles, backend)) = handles.and_then(|h| h.backend().map(|b| (h, b))) else {
                    navigate(&login_with_error(CALLBACK_FAILED), replace);
                    return;
                };
                let outcome = handle_callback(
                    &backend.auth,
                    &handles.store,
                    &handles.resolver,
                    &backend.rest,
                    &params,
                    || gloo_timers::future::TimeoutFuture::new(CALLBACK_SETTLE_TIMEOUT_MS),
                )
                .await;
                navigate(&outcome.redirect_to, replace);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = params;
    });

    view! { <LoadingScreen/> }
}
