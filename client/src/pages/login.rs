//! Login page with email + password sign-in.
//!
//! SYSTEM CONTEXT
//! ==============
//! Public route. After a successful sign-in the page moves to `/`; the guard
//! then sends onboarding users to their flow once the profile loads. The
//! callback handler lands here with `?error=<code>` when a link fails.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::routing::callback::{CALLBACK_FAILED, SESSION_NOT_FOUND};
use crate::routing::guard::{ENROLLMENT_SIGNUP, INAUGURAL_SIGNUP, SIGNUP};
use crate::state::auth_context::use_auth;

/// Message for the `error` query parameter.
#[must_use]
pub fn error_message(code: &str) -> &'static str {
    match code {
        CALLBACK_FAILED => "Não foi possível confirmar seu acesso. Tente novamente.",
        SESSION_NOT_FOUND => "Sessão não encontrada. Faça login novamente.",
        _ => "Ocorreu um erro. Tente novamente.",
    }
}

/// Check the form before any request is sent.
///
/// # Errors
///
/// Returns the message to show next to the form.
pub fn validate_login(email: &str, password: &str) -> Result<(), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err("Informe e-mail e senha.");
    }
    if !email.contains('@') {
        return Err("E-mail inválido.");
    }
    Ok(())
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let query = use_query_map();
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    #[cfg(feature = "hydrate")]
    let navigate = leptos_router::hooks::use_navigate();

    let link_error = move || query.get().get("error").map(|code| error_message(&code).to_owned());

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let email_value = email.get().trim().to_owned();
        let password_value = password.get();
        if let Err(message) = validate_login(&email_value, &password_value) {
            info.set(message.to_owned());
            return;
        }
        busy.set(true);
        info.set("Entrando...".to_owned());

        #[cfg(feature = "hydrate")]
        {
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                let Some(backend) = crate::state::auth_context::current_handles().and_then(|h| h.backend()) else {
                    info.set("Serviço de autenticação indisponível.".to_owned());
                    busy.set(false);
                    return;
                };
                match backend.auth.sign_in_with_password(&email_value, &password_value).await {
                    Ok(_) => {
                        info.set(String::new());
                        navigate(
                            crate::routing::guard::HOME,
                            leptos_router::NavigateOptions { replace: true, ..Default::default() },
                        );
                    }
                    Err(e) => {
                        log::warn!("login: sign-in failed: {e}");
                        info.set("E-mail ou senha incorretos.".to_owned());
                    }
                }
                busy.set(false);
            });
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Academia"</h1>
                <p class="login-card__subtitle">"Acesse sua conta"</p>
                <Show when=move || link_error().is_some()>
                    <p class="login-message login-message--error">{move || link_error().unwrap_or_default()}</p>
                </Show>
                <Show when=move || auth.config_error.get().is_some()>
                    <p class="login-message login-message--error">"Configuração do servidor indisponível."</p>
                </Show>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="voce@exemplo.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Senha"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Entrar"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <div class="login-divider"></div>
                <p class="login-card__links">
                    <a href=SIGNUP>"Criar conta"</a>
                    " · "
                    <a href=INAUGURAL_SIGNUP>"Aula inaugural"</a>
                    " · "
                    <a href=ENROLLMENT_SIGNUP>"Matrícula"</a>
                </p>
            </div>
        </div>
    }
}
