//! `/auth/callback` handling: turn a confirmation link into a session and a
//! first destination.
//!
//! SYSTEM CONTEXT
//! ==============
//! The callback page parses the query, calls [`handle_callback`] and performs
//! a replace navigation to [`CallbackOutcome::redirect_to`]. The provider,
//! stores and profile source are passed in, so the whole flow runs natively in
//! tests with fakes.
//!
//! DESIGN
//! ======
//! After the session is established the handler waits for the profile load of
//! that identity to settle, bounded by a timeout that starts only then. When
//! the profile is missing, failed or late, the user lands on `/` and the
//! navigation guard takes over once the profile arrives. If the identity
//! changes during the wait the handler gives up with `session_not_found`.

#[cfg(test)]
#[path = "callback_test.rs"]
mod callback_test;

use std::future::Future;
use std::pin::pin;

use futures::future::{Either, pending, select};

use super::guard::{ENROLLMENT_DASHBOARD, ENROLLMENT_FORM, HOME, INAUGURAL_CLASS, INAUGURAL_DASHBOARD, LOGIN};
use crate::net::auth_api::AuthError;
use crate::net::types::{AuthSession, Profile, RegistrationFlow};
use crate::state::profile::{ProfileOutcome, ProfileResolver, ProfileSource};
use crate::state::session::{AuthEvent, SessionStore};

/// Upper bound on waiting for the profile before leaving the callback page.
pub const CALLBACK_SETTLE_TIMEOUT_MS: u32 = 5_000;

/// `error` query value when the provider or the session exchange failed.
pub const CALLBACK_FAILED: &str = "auth_callback_failed";
/// `error` query value when no user is signed in after the callback.
pub const SESSION_NOT_FOUND: &str = "session_not_found";

/// Verification type assumed when the link carries a token hash but no `type`.
const DEFAULT_OTP_KIND: &str = "email";

/// The subset of the auth client the callback needs.
pub trait AuthProvider {
    fn exchange_code_for_session(&self, code: &str) -> impl Future<Output = Result<AuthSession, AuthError>>;

    fn verify_email_token(&self, token_hash: &str, kind: &str) -> impl Future<Output = Result<AuthSession, AuthError>>;

    /// The current session, if one is persisted.
    fn get_session(&self) -> impl Future<Output = Result<Option<AuthSession>, AuthError>>;
}

/// Query parameters the auth service appends to the callback URL.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub token_hash: Option<String>,
    pub kind: Option<String>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

impl CallbackParams {
    /// Collect known keys from decoded query pairs. Blank values count as absent.
    pub fn from_query<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut params = Self::default();
        for (key, value) in pairs {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            let slot = match key {
                "code" => &mut params.code,
                "token_hash" => &mut params.token_hash,
                "type" => &mut params.kind,
                "error" => &mut params.error,
                "error_description" => &mut params.error_description,
                _ => continue,
            };
            *slot = Some(value.to_owned());
        }
        params
    }

    /// Parse a raw query string, with or without the leading `?`.
    #[must_use]
    pub fn from_query_string(query: &str) -> Self {
        let pairs: Vec<(String, String)> = url::form_urlencoded::parse(query.trim_start_matches('?').as_bytes())
            .into_owned()
            .collect();
        Self::from_query(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackOutcome {
    pub redirect_to: String,
}

impl CallbackOutcome {
    fn to(path: &str) -> Self {
        Self { redirect_to: path.to_owned() }
    }

    fn login_error(code: &str) -> Self {
        Self { redirect_to: login_with_error(code) }
    }
}

/// `/login?error=<code>`.
#[must_use]
pub fn login_with_error(code: &str) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new()).append_pair("error", code).finish();
    format!("{LOGIN}?{query}")
}

/// First page after sign-in for a given profile.
#[must_use]
pub fn post_login_destination(profile: Option<&Profile>) -> &'static str {
    let Some(profile) = profile else {
        return HOME;
    };
    match (&profile.registration_flow, profile.onboarding_completed) {
        (RegistrationFlow::Inaugural, false) => INAUGURAL_CLASS,
        (RegistrationFlow::Inaugural, true) => INAUGURAL_DASHBOARD,
        (RegistrationFlow::Enrollment, false) => ENROLLMENT_FORM,
        (RegistrationFlow::Enrollment, true) => ENROLLMENT_DASHBOARD,
        _ => HOME,
    }
}

/// Establish the session described by `params`, wait for the user's profile
/// and pick where to go next.
///
/// `start_timeout` is called once the session is established; the future it
/// returns bounds only the profile wait, not the exchange before it.
pub async fn handle_callback<P, S, F, T>(
    provider: &P,
    store: &SessionStore,
    resolver: &ProfileResolver,
    source: &S,
    params: &CallbackParams,
    start_timeout: F,
) -> CallbackOutcome
where
    P: AuthProvider,
    S: ProfileSource,
    F: FnOnce() -> T,
    T: Future<Output = ()>,
{
    if let Some(error) = &params.error {
        log::warn!(
            "callback: provider error {error}: {}",
            params.error_description.as_deref().unwrap_or("no description")
        );
        return CallbackOutcome::login_error(CALLBACK_FAILED);
    }

    let established = match (&params.code, &params.token_hash) {
        (Some(code), _) => provider.exchange_code_for_session(code).await.map(Some),
        (None, Some(token_hash)) => {
            let kind = params.kind.as_deref().unwrap_or(DEFAULT_OTP_KIND);
            provider.verify_email_token(token_hash, kind).await.map(Some)
        }
        (None, None) => provider.get_session().await,
    };
    let session = match established {
        Ok(session) => session,
        Err(e) => {
            log::warn!("callback: establishing session failed: {e}");
            return CallbackOutcome::login_error(CALLBACK_FAILED);
        }
    };
    if let Some(session) = session {
        store.apply(AuthEvent::SignedIn(session));
    }

    let snapshot = store.snapshot();
    let Some(user_id) = snapshot.user_id().map(str::to_owned) else {
        return CallbackOutcome::login_error(SESSION_NOT_FOUND);
    };

    // The waiter is polled before the fetch, so it is registered before any
    // transition the fetch or an identity switch can cause.
    let ticket = resolver.sync(&snapshot);
    let fetch = async {
        if let Some(ticket) = ticket {
            resolver.resolve(source, ticket).await;
        }
        pending::<ProfileOutcome>().await
    };
    let settle = async { select(pin!(resolver.settled(&user_id)), pin!(fetch)).await.factor_first().0 };
    let outcome = match select(pin!(settle), pin!(start_timeout())).await {
        Either::Left((outcome, _)) => outcome,
        Either::Right(((), _)) => {
            log::warn!("callback: profile for {user_id} not settled before timeout");
            ProfileOutcome::Superseded
        }
    };

    if store.snapshot().user_id() != Some(user_id.as_str()) {
        return CallbackOutcome::login_error(SESSION_NOT_FOUND);
    }
    let profile = match outcome {
        ProfileOutcome::Found(profile) => Some(profile),
        ProfileOutcome::NotFound | ProfileOutcome::Failed(_) | ProfileOutcome::Superseded => None,
    };
    let destination = post_login_destination(profile.as_ref());
    log::debug!("callback: user={user_id} -> {destination}");
    CallbackOutcome::to(destination)
}
