//! Sign-up pages, one per registration flow.
//!
//! SYSTEM CONTEXT
//! ==============
//! `/signup` registers staff (admin flow), `/inaugural-signup` and
//! `/enrollment-signup` register prospective students. The chosen flow is
//! stored as user metadata and drives routing once the profile exists.

#[cfg(test)]
#[path = "signup_test.rs"]
mod signup_test;

use leptos::prelude::*;

use crate::net::types::RegistrationFlow;
use crate::routing::guard::{AUTH_CALLBACK, LOGIN};

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SignupError {
    #[error("Informe seu nome.")]
    MissingName,
    #[error("E-mail inválido.")]
    InvalidEmail,
    #[error("A senha deve ter pelo menos 6 caracteres.")]
    PasswordTooShort,
    #[error("As senhas não conferem.")]
    PasswordMismatch,
}

/// Validated form contents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SignupForm {
    pub full_name: String,
    pub email: String,
    pub password: String,
}

impl SignupForm {
    /// # Errors
    ///
    /// Returns the first [`SignupError`] found, checked top to bottom.
    pub fn validate(full_name: &str, email: &str, password: &str, confirmation: &str) -> Result<Self, SignupError> {
        let full_name = full_name.trim();
        let email = email.trim();
        if full_name.is_empty() {
            return Err(SignupError::MissingName);
        }
        if email.is_empty() || !email.contains('@') {
            return Err(SignupError::InvalidEmail);
        }
        if password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SignupError::PasswordTooShort);
        }
        if password != confirmation {
            return Err(SignupError::PasswordMismatch);
        }
        Ok(Self { full_name: full_name.to_owned(), email: email.to_owned(), password: password.to_owned() })
    }
}

/// Where the confirmation email should send the user back to.
#[must_use]
pub fn callback_url(origin: &str) -> String {
    format!("{}{AUTH_CALLBACK}", origin.trim_end_matches('/'))
}

fn heading(flow: &RegistrationFlow) -> &'static str {
    match flow {
        RegistrationFlow::Inaugural => "Agende sua aula inaugural",
        RegistrationFlow::Enrollment => "Faça sua matrícula",
        _ => "Criar conta",
    }
}

#[component]
fn SignupCard(flow: RegistrationFlow) -> impl IntoView {
    let full_name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirmation = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    #[cfg(feature = "hydrate")]
    let navigate = leptos_router::hooks::use_navigate();
    let title = heading(&flow);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let form = match SignupForm::validate(&full_name.get(), &email.get(), &password.get(), &confirmation.get()) {
            Ok(form) => form,
            Err(e) => {
                info.set(e.to_string());
                return;
            }
        };
        busy.set(true);
        info.set("Enviando...".to_owned());

        #[cfg(feature = "hydrate")]
        {
            let navigate = navigate.clone();
            let flow = flow.clone();
            leptos::task::spawn_local(async move {
                let Some(backend) = crate::state::auth_context::current_handles().and_then(|h| h.backend()) else {
                    info.set("Serviço de autenticação indisponível.".to_owned());
                    busy.set(false);
                    return;
                };
                let origin = web_sys::window().and_then(|w| w.location().origin().ok()).unwrap_or_default();
                let result = backend
                    .auth
                    .sign_up(&form.email, &form.password, &flow, Some(&form.full_name), &callback_url(&origin))
                    .await;
                match result {
                    Ok(crate::net::auth_api::SignUpOutcome::SignedIn(_)) => {
                        info.set(String::new());
                        navigate(
                            crate::routing::guard::HOME,
                            leptos_router::NavigateOptions { replace: true, ..Default::default() },
                        );
                    }
                    Ok(crate::net::auth_api::SignUpOutcome::ConfirmationSent) => {
                        info.set("Enviamos um link de confirmação para o seu e-mail.".to_owned());
                    }
                    Err(e) => {
                        log::warn!("signup: {e}");
                        info.set("Não foi possível concluir o cadastro.".to_owned());
                    }
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = form;
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>{title}</h1>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="text"
                        placeholder="Nome completo"
                        prop:value=move || full_name.get()
                        on:input=move |ev| full_name.set(event_target_value(&ev))
                    />
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
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Confirme a senha"
                        prop:value=move || confirmation.get()
                        on:input=move |ev| confirmation.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        "Cadastrar"
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <p class="login-card__links">
                    <a href=LOGIN>"Já tenho conta"</a>
                </p>
            </div>
        </div>
    }
}

#[component]
pub fn SignupPage() -> impl IntoView {
    view! { <SignupCard flow=RegistrationFlow::Admin/> }
}

#[component]
pub fn InauguralSignupPage() -> impl IntoView {
    view! { <SignupCard flow=RegistrationFlow::Inaugural/> }
}

#[component]
pub fn EnrollmentSignupPage() -> impl IntoView {
    view! { <SignupCard flow=RegistrationFlow::Enrollment/> }
}
