//! Onboarding pages for the inaugural-class and enrollment flows.
//!
//! SYSTEM CONTEXT
//! ==============
//! The guard pins inaugural users to `/inaugural-class` until their profile is
//! marked complete, then to `/inaugural-dashboard`. Enrollment users fill in
//! `/enrollment-form` and continue to `/enrollment-dashboard`. Completing a
//! step patches the user's `profiles` row and reloads the profile so the guard
//! sees the change.

#[cfg(test)]
#[path = "onboarding_test.rs"]
mod onboarding_test;

use leptos::prelude::*;
use serde_json::{Value, json};

use crate::state::auth_context::use_auth;

/// Patch marking onboarding done, optionally carrying collected details.
#[must_use]
pub fn onboarding_patch(details: Option<&EnrollmentDetails>) -> Value {
    let mut patch = json!({ "onboarding_completed": true });
    if let Some(details) = details {
        patch["full_name"] = Value::String(details.full_name.clone());
        patch["phone"] = Value::String(details.phone.clone());
    }
    patch
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnrollmentDetails {
    pub full_name: String,
    /// Digits only, area code included.
    pub phone: String,
}

impl EnrollmentDetails {
    /// # Errors
    ///
    /// Returns the message to show when the name is blank or the phone does
    /// not have 10 or 11 digits.
    pub fn validate(full_name: &str, phone: &str) -> Result<Self, &'static str> {
        let full_name = full_name.trim();
        if full_name.is_empty() {
            return Err("Informe seu nome completo.");
        }
        let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
        if !(10..=11).contains(&digits.len()) {
            return Err("Informe um telefone com DDD.");
        }
        Ok(Self { full_name: full_name.to_owned(), phone: digits })
    }
}

/// Write `patch` to the signed-in user's profile and reload it.
#[cfg(feature = "hydrate")]
async fn complete_onboarding(patch: Value) -> Result<(), String> {
    use crate::net::rest::PROFILES_TABLE;

    let handles = crate::state::auth_context::current_handles().ok_or("sessão indisponível")?;
    let backend = handles.backend().ok_or("serviço indisponível")?;
    let user_id = handles.store.snapshot().user_id().map(str::to_owned).ok_or("sessão expirada")?;
    backend
        .rest
        .update_by_id::<_, Value>(PROFILES_TABLE, &Value::String(user_id), &patch)
        .await
        .map_err(|e| e.to_string())?;
    handles.reload_profile();
    Ok(())
}

fn display_name(auth: crate::state::auth_context::AuthContext) -> String {
    let session = auth.session.get();
    let Some(user) = session.user else {
        return String::new();
    };
    auth.profile
        .get()
        .profile_for(&user.id)
        .and_then(|p| p.full_name.clone())
        .or(user.email)
        .unwrap_or_default()
}

#[component]
pub fn InauguralClassPage() -> impl IntoView {
    let auth = use_auth();
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_complete = move |_| {
        if busy.get() {
            return;
        }
        busy.set(true);
        #[cfg(feature = "hydrate")]
        leptos::task::spawn_local(async move {
            if let Err(e) = complete_onboarding(onboarding_patch(None)).await {
                log::warn!("onboarding: inaugural completion failed: {e}");
                info.set("Não foi possível registrar sua aula. Tente novamente.".to_owned());
            }
            busy.set(false);
        });
    };

    view! {
        <div class="onboarding-page">
            <h1>"Aula inaugural"</h1>
            <p>{move || format!("Olá, {}!", display_name(auth))}</p>
            <p>"Compareça à sua aula inaugural e confirme abaixo quando terminar."</p>
            <button class="btn btn--primary" on:click=on_complete disabled=move || busy.get()>
                "Concluí minha aula inaugural"
            </button>
            <Show when=move || !info.get().is_empty()>
                <p class="onboarding-page__message">{move || info.get()}</p>
            </Show>
        </div>
    }
}

#[component]
pub fn InauguralDashboardPage() -> impl IntoView {
    let auth = use_auth();
    view! {
        <div class="onboarding-page">
            <h1>"Bem-vindo à academia"</h1>
            <p>{move || format!("{}, sua aula inaugural foi registrada.", display_name(auth))}</p>
            <p>"Para continuar treinando, faça sua matrícula na recepção da academia."</p>
        </div>
    }
}

#[component]
pub fn EnrollmentFormPage() -> impl IntoView {
    let full_name = RwSignal::new(String::new());
    let phone = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);
    #[cfg(feature = "hydrate")]
    let navigate = leptos_router::hooks::use_navigate();

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let details = match EnrollmentDetails::validate(&full_name.get(), &phone.get()) {
            Ok(details) => details,
            Err(message) => {
                info.set(message.to_owned());
                return;
            }
        };
        busy.set(true);
        #[cfg(feature = "hydrate")]
        {
            let navigate = navigate.clone();
            leptos::task::spawn_local(async move {
                match complete_onboarding(onboarding_patch(Some(&details))).await {
                    Ok(()) => navigate(
                        crate::routing::guard::ENROLLMENT_DASHBOARD,
                        leptos_router::NavigateOptions { replace: true, ..Default::default() },
                    ),
                    Err(e) => {
                        log::warn!("onboarding: enrollment failed: {e}");
                        info.set("Não foi possível enviar sua matrícula. Tente novamente.".to_owned());
                    }
                }
                busy.set(false);
            });
        }
        #[cfg(not(feature = "hydrate"))]
        let _ = details;
    };

    view! {
        <div class="onboarding-page">
            <h1>"Matrícula"</h1>
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
                    type="tel"
                    placeholder="(11) 91234-5678"
                    prop:value=move || phone.get()
                    on:input=move |ev| phone.set(event_target_value(&ev))
                />
                <button class="login-button" type="submit" disabled=move || busy.get()>
                    "Enviar matrícula"
                </button>
            </form>
            <Show when=move || !info.get().is_empty()>
                <p class="onboarding-page__message">{move || info.get()}</p>
            </Show>
        </div>
    }
}

#[component]
pub fn EnrollmentDashboardPage() -> impl IntoView {
    let auth = use_auth();
    let completed = move || {
        let session = auth.session.get();
        session
            .user_id()
            .and_then(|id| auth.profile.get().profile_for(id).map(|p| p.onboarding_completed))
            .unwrap_or(false)
    };
    view! {
        <div class="onboarding-page">
            <h1>"Minha matrícula"</h1>
            <p>{move || format!("Olá, {}!", display_name(auth))}</p>
            <Show
                when=completed
                fallback=|| view! { <a class="btn" href=crate::routing::guard::ENROLLMENT_FORM>"Completar matrícula"</a> }
            >
                <p>"Sua matrícula foi recebida. Em breve entraremos em contato."</p>
            </Show>
        </div>
    }
}
