//! Navigation guard: pure routing decision over session, profile and location.
//!
//! SYSTEM CONTEXT
//! ==============
//! `components::auth_guard` re-evaluates [`decide`] whenever the session,
//! profile or location signal changes and performs the resulting navigation.
//! Nothing here touches the router or the network.
//!
//! DESIGN
//! ======
//! The decision is stateless: every evaluation starts from the current
//! snapshot. A profile is only considered after [`GuardInput::new`] has checked
//! that it belongs to the session's user, so a profile left over from a
//! previous identity reads as absent.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use crate::net::types::{Profile, RegistrationFlow};
use crate::state::profile::ProfileState;
use crate::state::session::SessionSnapshot;

pub const HOME: &str = "/";
pub const LOGIN: &str = "/login";
pub const SIGNUP: &str = "/signup";
pub const INAUGURAL_SIGNUP: &str = "/inaugural-signup";
pub const ENROLLMENT_SIGNUP: &str = "/enrollment-signup";
pub const AUTH_CALLBACK: &str = "/auth/callback";
pub const INAUGURAL_CLASS: &str = "/inaugural-class";
pub const INAUGURAL_DASHBOARD: &str = "/inaugural-dashboard";
pub const ENROLLMENT_FORM: &str = "/enrollment-form";
pub const ENROLLMENT_DASHBOARD: &str = "/enrollment-dashboard";

/// Reachable without a session.
pub const PUBLIC_PATHS: [&str; 5] = [LOGIN, SIGNUP, INAUGURAL_SIGNUP, ENROLLMENT_SIGNUP, AUTH_CALLBACK];

/// Signed-in users with a non-inaugural profile are sent home from these.
pub const GUEST_ONLY_PATHS: [&str; 4] = [LOGIN, SIGNUP, INAUGURAL_SIGNUP, ENROLLMENT_SIGNUP];

/// Strip query string, fragment and trailing slashes. The root stays `/`.
#[must_use]
pub fn normalize_path(location: &str) -> &str {
    let end = location.find(['?', '#']).unwrap_or(location.len());
    let path = location[..end].trim_end_matches('/');
    if path.is_empty() { HOME } else { path }
}

#[must_use]
pub fn is_public(location: &str) -> bool {
    PUBLIC_PATHS.contains(&normalize_path(location))
}

#[must_use]
pub fn is_guest_only(location: &str) -> bool {
    GUEST_ONLY_PATHS.contains(&normalize_path(location))
}

/// Where the app stands in the sign-in lifecycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardPhase {
    InitLoading,
    Unauthenticated,
    AuthenticatedNoProfile,
    AuthenticatedWithProfile,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Redirect {
    pub to: &'static str,
    pub replace: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Auth state unknown; show the placeholder.
    Loading,
    Render,
    Redirect(Redirect),
}

impl GuardDecision {
    fn replace_with(to: &'static str) -> Self {
        Self::Redirect(Redirect { to, replace: true })
    }

    #[must_use]
    pub fn redirect_target(&self) -> Option<&'static str> {
        match self {
            Self::Redirect(redirect) => Some(redirect.to),
            Self::Loading | Self::Render => None,
        }
    }
}

/// One evaluation's worth of state.
#[derive(Clone, Copy, Debug)]
pub struct GuardInput<'a> {
    pub session: &'a SessionSnapshot,
    pub profile: Option<&'a Profile>,
    pub location: &'a str,
}

impl<'a> GuardInput<'a> {
    /// Pair the session with the resolver view, keeping the profile only when
    /// it belongs to the session's user.
    #[must_use]
    pub fn new(session: &'a SessionSnapshot, profile: &'a ProfileState, location: &'a str) -> Self {
        let profile = session.user_id().and_then(|id| profile.profile_for(id));
        Self { session, profile, location }
    }

    #[must_use]
    pub fn phase(&self) -> GuardPhase {
        if self.session.is_loading {
            GuardPhase::InitLoading
        } else if self.session.user.is_none() {
            GuardPhase::Unauthenticated
        } else if self.profile.is_none() {
            GuardPhase::AuthenticatedNoProfile
        } else {
            GuardPhase::AuthenticatedWithProfile
        }
    }
}

/// Decide what to do at `input.location`.
#[must_use]
pub fn decide(input: &GuardInput<'_>) -> GuardDecision {
    let path = normalize_path(input.location);
    let target = match (input.phase(), input.profile) {
        (GuardPhase::InitLoading, _) => return GuardDecision::Loading,
        (GuardPhase::Unauthenticated, _) if is_public(path) => None,
        (GuardPhase::Unauthenticated, _) => Some(LOGIN),
        (GuardPhase::AuthenticatedWithProfile, Some(profile)) => profile_target(profile, path),
        (GuardPhase::AuthenticatedNoProfile | GuardPhase::AuthenticatedWithProfile, _) => None,
    };
    match target {
        Some(to) if to != path => GuardDecision::replace_with(to),
        _ => GuardDecision::Render,
    }
}

fn profile_target(profile: &Profile, path: &str) -> Option<&'static str> {
    match &profile.registration_flow {
        RegistrationFlow::Inaugural if !profile.onboarding_completed => Some(INAUGURAL_CLASS),
        RegistrationFlow::Inaugural => Some(INAUGURAL_DASHBOARD),
        RegistrationFlow::Other(raw) => {
            log::debug!("guard: unknown registration_flow '{raw}', allowing full access");
            is_guest_only(path).then_some(HOME)
        }
        RegistrationFlow::Enrollment | RegistrationFlow::Admin | RegistrationFlow::Unset => {
            is_guest_only(path).then_some(HOME)
        }
    }
}
