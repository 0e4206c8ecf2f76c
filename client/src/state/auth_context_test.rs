use leptos::prelude::GetUntracked;

use super::*;
use crate::net::types::{AuthSession, AuthUser};

fn session(user_id: &str) -> AuthSession {
    AuthSession {
        access_token: format!("token-{user_id}"),
        refresh_token: "refresh".to_owned(),
        token_type: "bearer".to_owned(),
        expires_at: None,
        expires_in: None,
        user: AuthUser { id: user_id.to_owned(), email: None },
    }
}

#[test]
fn new_context_starts_loading() {
    let ctx = AuthContext::new();
    assert!(ctx.session.get_untracked().is_loading);
    assert_eq!(ctx.profile.get_untracked(), ProfileState::Idle);
    assert_eq!(ctx.config_error.get_untracked(), None);
}

#[test]
fn session_changes_are_mirrored_into_signals() {
    let ctx = AuthContext::new();
    let handles = connect(ctx);

    handles.store.apply(AuthEvent::InitialSession(None));
    assert_eq!(ctx.session.get_untracked(), SessionSnapshot::resolved(None));

    handles.store.apply(AuthEvent::SignedIn(session("u1")));
    assert_eq!(ctx.session.get_untracked().user_id(), Some("u1"));
}

#[test]
fn sign_in_without_backend_leaves_profile_unresolved() {
    let ctx = AuthContext::new();
    let handles = connect(ctx);

    handles.store.apply(AuthEvent::SignedIn(session("u1")));

    assert!(matches!(
        ctx.profile.get_untracked(),
        ProfileState::Unresolved { ref user_id, .. } if user_id == "u1"
    ));
}

#[test]
fn sign_out_clears_profile_signal() {
    let ctx = AuthContext::new();
    let handles = connect(ctx);
    handles.store.apply(AuthEvent::SignedIn(session("u1")));

    futures::executor::block_on(sign_out());

    assert_eq!(ctx.session.get_untracked(), SessionSnapshot::resolved(None));
    assert_eq!(ctx.profile.get_untracked(), ProfileState::Idle);
}

#[test]
fn installed_backend_uses_the_shared_session() {
    let ctx = AuthContext::new();
    let handles = connect(ctx);
    let backend = handles.install(PublicConfig::new("https://academy.supabase.co", "anon").unwrap());

    assert_eq!(futures::executor::block_on(backend.rest.bearer()), "anon");
    handles.store.apply(AuthEvent::SignedIn(session("u1")));
    assert_eq!(futures::executor::block_on(backend.rest.bearer()), "token-u1");
}

#[test]
fn auth_events_flow_into_the_store() {
    let ctx = AuthContext::new();
    let handles = connect(ctx);
    let backend = handles.install(PublicConfig::new("https://academy.supabase.co", "anon").unwrap());

    futures::executor::block_on(backend.auth.initialize());

    assert_eq!(ctx.session.get_untracked(), SessionSnapshot::resolved(None));
    assert!(current_handles().is_some());
}
