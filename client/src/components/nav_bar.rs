//! Top bar with section links, the signed-in identity and sign-out.

use leptos::prelude::*;
use leptos_router::hooks::use_location;

use crate::pages::sections::Section;
use crate::routing::guard::{HOME, normalize_path};
use crate::state::auth_context::use_auth;

#[component]
pub fn NavBar() -> impl IntoView {
    let auth = use_auth();
    let pathname = use_location().pathname;

    let identity = move || {
        let session = auth.session.get();
        let Some(user) = session.user else {
            return String::new();
        };
        auth.profile
            .get()
            .profile_for(&user.id)
            .and_then(|p| p.full_name.clone())
            .or(user.email)
            .unwrap_or(user.id)
    };

    let link_class = move |path: &'static str| {
        if normalize_path(&pathname.get()) == path {
            "nav-bar__link nav-bar__link--active"
        } else {
            "nav-bar__link"
        }
    };

    let on_sign_out = move |_| {
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(crate::state::auth_context::sign_out());
    };

    view! {
        <nav class="nav-bar">
            <a href=HOME class=move || link_class(HOME)>"Início"</a>
            {Section::ALL
                .iter()
                .map(|section| {
                    let path = section.path();
                    view! { <a href=path class=move || link_class(path)>{section.title()}</a> }
                })
                .collect_view()}
            <span class="nav-bar__spacer"></span>
            <span class="nav-bar__identity">{identity}</span>
            <button class="btn nav-bar__sign-out" on:click=on_sign_out>"Sair"</button>
        </nav>
    }
}
