//! Client for the hosted auth service (`/auth/v1`).
//!
//! SYSTEM CONTEXT
//! ==============
//! Owns the persisted session blob and reports every change as an
//! [`AuthEvent`] to subscribers registered with
//! [`AuthApi::on_auth_state_change`]. The app wires those events into the
//! session store; nothing else writes session state.
//!
//! DESIGN
//! ======
//! URL and body construction are plain functions so they are tested natively.
//! HTTP runs only with `hydrate`; other builds return [`AuthError::Unavailable`].
//! Sign-up uses PKCE with the `plain` challenge method: the verifier is kept in
//! local storage until the confirmation link comes back through
//! `/auth/callback`.

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "auth_api_test.rs"]
mod auth_api_test;

use std::cell::RefCell;
use std::future::Future;
use std::rc::Rc;

use serde_json::{Value, json};

use crate::config::PublicConfig;
use crate::net::types::{AuthSession, RegistrationFlow};
use crate::routing::callback::AuthProvider;
use crate::state::listeners::{Listeners, SubscriptionId, notify};
use crate::state::session::{AuthEvent, SessionStore};
use crate::util::storage;

/// Local storage key of the persisted [`AuthSession`].
pub const SESSION_STORAGE_KEY: &str = "academy.auth.session";
/// Local storage key of the pending PKCE code verifier.
pub const VERIFIER_STORAGE_KEY: &str = "academy.auth.code_verifier";
/// Stored sessions this close to expiry are refreshed before use.
pub const REFRESH_MARGIN_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("request failed: {0}")]
    Http(String),
    #[error("auth service returned {status}: {message}")]
    Status { status: u16, message: String },
    #[error("invalid response: {0}")]
    Decode(String),
    #[error("no pending sign-up verifier in this browser")]
    MissingVerifier,
    #[error("auth is not available outside the browser")]
    Unavailable,
}

/// Result of a sign-up request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// Email confirmation is disabled; the user is signed in immediately.
    SignedIn(AuthSession),
    /// A confirmation link was emailed; the session arrives via the callback.
    ConfirmationSent,
}

/// `POST` endpoint for a token grant, e.g. `.../token?grant_type=password`.
#[must_use]
pub fn token_url(auth_base: &str, grant_type: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new()).append_pair("grant_type", grant_type).finish();
    format!("{auth_base}/token?{query}")
}

/// Sign-up endpoint carrying the confirmation redirect target.
#[must_use]
pub fn signup_url(auth_base: &str, redirect_to: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new()).append_pair("redirect_to", redirect_to).finish();
    format!("{auth_base}/signup?{query}")
}

#[must_use]
pub fn password_body(email: &str, password: &str) -> Value {
    json!({ "email": email.trim(), "password": password })
}

/// Sign-up payload. `registration_flow` and the optional name travel as user
/// metadata, which the backend copies into the new `profiles` row.
#[must_use]
pub fn signup_body(
    email: &str,
    password: &str,
    flow: &RegistrationFlow,
    full_name: Option<&str>,
    code_verifier: &str,
) -> Value {
    let mut data = json!({ "registration_flow": flow });
    if let Some(name) = full_name.map(str::trim).filter(|n| !n.is_empty()) {
        data["full_name"] = Value::String(name.to_owned());
    }
    json!({
        "email": email.trim(),
        "password": password,
        "data": data,
        "code_challenge": code_verifier,
        "code_challenge_method": "plain",
    })
}

#[must_use]
pub fn pkce_body(auth_code: &str, code_verifier: &str) -> Value {
    json!({ "auth_code": auth_code, "code_verifier": code_verifier })
}

#[must_use]
pub fn verify_body(token_hash: &str, kind: &str) -> Value {
    json!({ "token_hash": token_hash, "type": kind })
}

#[must_use]
pub fn refresh_body(refresh_token: &str) -> Value {
    json!({ "refresh_token": refresh_token })
}

/// Fresh PKCE verifier. With the `plain` method the challenge equals it.
#[must_use]
pub fn new_code_verifier() -> String {
    format!("{}{}", uuid::Uuid::new_v4().simple(), uuid::Uuid::new_v4().simple())
}

/// Decode a token response and pin its expiry to `now_secs`.
///
/// # Errors
///
/// Returns [`AuthError::Decode`] when the body is not a session.
pub fn parse_session(body: Value, now_secs: i64) -> Result<AuthSession, AuthError> {
    serde_json::from_value::<AuthSession>(body)
        .map(|session| session.with_expiry_from(now_secs))
        .map_err(|e| AuthError::Decode(e.to_string()))
}

/// A sign-up response is either a full session or just the pending user.
///
/// # Errors
///
/// Returns [`AuthError::Decode`] when a token is present but the session is malformed.
pub fn parse_signup_response(body: Value, now_secs: i64) -> Result<SignUpOutcome, AuthError> {
    if body.get("access_token").is_some() {
        parse_session(body, now_secs).map(SignUpOutcome::SignedIn)
    } else {
        Ok(SignUpOutcome::ConfirmationSent)
    }
}

/// Pull a human-readable message out of an auth error body.
#[cfg(any(test, feature = "hydrate"))]
fn error_message(body: &Value) -> String {
    ["error_description", "msg", "message", "error"]
        .iter()
        .find_map(|key| body.get(key).and_then(Value::as_str))
        .map_or_else(|| body.to_string(), str::to_owned)
}

fn store_session(session: &AuthSession) {
    storage::save_json(SESSION_STORAGE_KEY, session);
}

#[cfg_attr(feature = "hydrate", allow(clippy::cast_possible_truncation))]
pub(crate) fn now_secs() -> i64 {
    #[cfg(feature = "hydrate")]
    {
        (js_sys::Date::now() / 1000.0) as i64
    }
    #[cfg(not(feature = "hydrate"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
    }
}

/// Trades a refresh token for a new session.
pub trait SessionRefresher {
    fn refresh_session(&self, refresh_token: &str) -> impl Future<Output = Result<AuthSession, AuthError>>;
}

/// Access token of the session held by `store`, refreshed first when it
/// expires within [`REFRESH_MARGIN_SECS`] of `now_secs`.
///
/// The refreshed session is applied to `store` as [`AuthEvent::TokenRefreshed`].
/// When the refresh fails the current token is returned and the request is
/// left to fail on its own.
pub async fn fresh_access_token<R: SessionRefresher>(
    refresher: &R,
    store: &SessionStore,
    now_secs: i64,
) -> Option<String> {
    let session = store.session()?;
    if !session.expires_within(now_secs, REFRESH_MARGIN_SECS) {
        return Some(session.access_token);
    }
    match refresher.refresh_session(&session.refresh_token).await {
        Ok(fresh) => {
            let token = fresh.access_token.clone();
            store.apply(AuthEvent::TokenRefreshed(fresh));
            Some(token)
        }
        Err(e) => {
            log::warn!("auth: refreshing expiring token failed: {e}");
            Some(session.access_token)
        }
    }
}

/// Auth service client. Clones share subscribers.
#[derive(Clone)]
pub struct AuthApi {
    config: PublicConfig,
    listeners: Rc<RefCell<Listeners<AuthEvent>>>,
}

impl std::fmt::Debug for AuthApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthApi").field("auth_base", &self.config.auth_base()).finish_non_exhaustive()
    }
}

impl AuthApi {
    #[must_use]
    pub fn new(config: PublicConfig) -> Self {
        Self { config, listeners: Rc::default() }
    }

    /// Register a callback for every auth event this client emits.
    pub fn on_auth_state_change(&self, callback: impl Fn(&AuthEvent) + 'static) -> SubscriptionId {
        self.listeners.borrow_mut().add(callback)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.borrow_mut().remove(id)
    }

    /// Report the persisted session (refreshed if needed) as the initial event.
    pub async fn initialize(&self) {
        let session = match self.get_session().await {
            Ok(session) => session,
            Err(e) => {
                log::warn!("auth: restoring session failed: {e}");
                None
            }
        };
        self.emit(&AuthEvent::InitialSession(session));
    }

    /// # Errors
    ///
    /// Returns an [`AuthError`] for rejected credentials or transport failures.
    pub async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<AuthSession, AuthError> {
        let url = token_url(&self.config.auth_base(), "password");
        let body = self.post(&url, &password_body(email, password), None).await?;
        let session = parse_session(body, now_secs())?;
        store_session(&session);
        self.emit(&AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    /// Register a new account tagged with `flow`. The confirmation email links
    /// back to `redirect_to`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the service rejects the request.
    pub async fn sign_up(
        &self,
        email: &str,
        password: &str,
        flow: &RegistrationFlow,
        full_name: Option<&str>,
        redirect_to: &str,
    ) -> Result<SignUpOutcome, AuthError> {
        let verifier = new_code_verifier();
        storage::save_json(VERIFIER_STORAGE_KEY, &verifier);
        let url = signup_url(&self.config.auth_base(), redirect_to);
        let body = self.post(&url, &signup_body(email, password, flow, full_name, &verifier), None).await?;
        let outcome = parse_signup_response(body, now_secs())?;
        if let SignUpOutcome::SignedIn(session) = &outcome {
            storage::remove(VERIFIER_STORAGE_KEY);
            store_session(session);
            self.emit(&AuthEvent::SignedIn(session.clone()));
        }
        log::debug!("auth: sign_up flow={} confirmed={}", flow.as_str(), matches!(outcome, SignUpOutcome::SignedIn(_)));
        Ok(outcome)
    }

    /// Trade the `code` from a confirmation link for a session.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingVerifier`] when this browser did not start the
    /// sign-up, or the service error.
    pub async fn exchange_code_for_session(&self, code: &str) -> Result<AuthSession, AuthError> {
        let verifier: String = storage::load_json(VERIFIER_STORAGE_KEY).ok_or(AuthError::MissingVerifier)?;
        let url = token_url(&self.config.auth_base(), "pkce");
        let body = self.post(&url, &pkce_body(code, &verifier), None).await?;
        storage::remove(VERIFIER_STORAGE_KEY);
        let session = parse_session(body, now_secs())?;
        store_session(&session);
        self.emit(&AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    /// Verify an email `token_hash` of the given `kind` (e.g. `signup`, `email`).
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the token is rejected.
    pub async fn verify_email_token(&self, token_hash: &str, kind: &str) -> Result<AuthSession, AuthError> {
        let url = format!("{}/verify", self.config.auth_base());
        let body = self.post(&url, &verify_body(token_hash, kind), None).await?;
        let session = parse_session(body, now_secs())?;
        store_session(&session);
        self.emit(&AuthEvent::SignedIn(session.clone()));
        Ok(session)
    }

    /// # Errors
    ///
    /// Returns an [`AuthError`] when the refresh token is rejected.
    pub async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        let url = token_url(&self.config.auth_base(), "refresh_token");
        let body = self.post(&url, &refresh_body(refresh_token), None).await?;
        let session = parse_session(body, now_secs())?;
        store_session(&session);
        self.emit(&AuthEvent::TokenRefreshed(session.clone()));
        Ok(session)
    }

    /// The persisted session, refreshed first when it is about to expire.
    ///
    /// # Errors
    ///
    /// Returns the refresh error; the stale session is discarded in that case.
    pub async fn get_session(&self) -> Result<Option<AuthSession>, AuthError> {
        let Some(session) = storage::load_json::<AuthSession>(SESSION_STORAGE_KEY) else {
            return Ok(None);
        };
        if !session.expires_within(now_secs(), REFRESH_MARGIN_SECS) {
            return Ok(Some(session));
        }
        match self.refresh_session(&session.refresh_token).await {
            Ok(fresh) => Ok(Some(fresh)),
            Err(e) => {
                storage::remove(SESSION_STORAGE_KEY);
                Err(e)
            }
        }
    }

    /// Revoke the session server-side (best effort) and clear it locally.
    ///
    /// # Errors
    ///
    /// Returns the logout error after local state has already been cleared.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let stored = storage::load_json::<AuthSession>(SESSION_STORAGE_KEY);
        storage::remove(SESSION_STORAGE_KEY);
        self.emit(&AuthEvent::SignedOut);
        let Some(session) = stored else {
            return Ok(());
        };
        let url = format!("{}/logout", self.config.auth_base());
        self.post(&url, &json!({}), Some(session.access_token.as_str())).await.map(|_| ())
    }

    fn emit(&self, event: &AuthEvent) {
        let callbacks = self.listeners.borrow().callbacks();
        log::debug!("auth: emit {}", event.name());
        notify(callbacks, event);
    }

    async fn post(&self, url: &str, body: &Value, bearer: Option<&str>) -> Result<Value, AuthError> {
        #[cfg(feature = "hydrate")]
        {
            let mut request = gloo_net::http::Request::post(url).header("apikey", &self.config.supabase_anon_key);
            if let Some(token) = bearer {
                request = request.header("Authorization", &format!("Bearer {token}"));
            }
            let request = request.json(body).map_err(|e| AuthError::Http(e.to_string()))?;
            let resp = request.send().await.map_err(|e| AuthError::Http(e.to_string()))?;
            let status = resp.status();
            let ok = resp.ok();
            let text = resp.text().await.map_err(|e| AuthError::Decode(e.to_string()))?;
            let parsed = if text.trim().is_empty() {
                Value::Null
            } else {
                serde_json::from_str(&text).map_err(|e| AuthError::Decode(e.to_string()))?
            };
            if !ok {
                return Err(AuthError::Status { status, message: error_message(&parsed) });
            }
            Ok(parsed)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (url, body, bearer);
            Err(AuthError::Unavailable)
        }
    }
}

impl AuthProvider for AuthApi {
    async fn exchange_code_for_session(&self, code: &str) -> Result<AuthSession, AuthError> {
        AuthApi::exchange_code_for_session(self, code).await
    }

    async fn verify_email_token(&self, token_hash: &str, kind: &str) -> Result<AuthSession, AuthError> {
        AuthApi::verify_email_token(self, token_hash, kind).await
    }

    async fn get_session(&self) -> Result<Option<AuthSession>, AuthError> {
        AuthApi::get_session(self).await
    }
}

impl SessionRefresher for AuthApi {
    async fn refresh_session(&self, refresh_token: &str) -> Result<AuthSession, AuthError> {
        AuthApi::refresh_session(self, refresh_token).await
    }
}
