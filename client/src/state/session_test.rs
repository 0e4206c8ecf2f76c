use std::cell::RefCell;
use std::rc::Rc;

use super::*;

fn user(id: &str) -> AuthUser {
    AuthUser { id: id.to_owned(), email: Some(format!("{id}@example.com")) }
}

fn session(id: &str, token: &str) -> AuthSession {
    AuthSession {
        access_token: token.to_owned(),
        refresh_token: format!("refresh-{token}"),
        token_type: "bearer".to_owned(),
        expires_at: Some(1_700_000_000),
        expires_in: None,
        user: user(id),
    }
}

fn recorder(store: &SessionStore) -> Rc<RefCell<Vec<SessionSnapshot>>> {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    store.subscribe(move |snap| sink.borrow_mut().push(snap.clone()));
    seen
}

// =============================================================
// Loading gate
// =============================================================

#[test]
fn new_store_is_loading_without_user() {
    let store = SessionStore::new();
    assert_eq!(store.snapshot(), SessionSnapshot::loading());
    assert_eq!(store.access_token(), None);
}

#[test]
fn initial_session_without_user_resolves_loading() {
    let store = SessionStore::new();
    assert!(store.apply(AuthEvent::InitialSession(None)));
    assert_eq!(store.snapshot(), SessionSnapshot::resolved(None));
}

#[test]
fn loading_flips_exactly_once_across_a_sign_in_out_cycle() {
    let store = SessionStore::new();
    let seen = recorder(&store);

    store.apply(AuthEvent::InitialSession(None));
    store.apply(AuthEvent::SignedIn(session("a", "t1")));
    store.apply(AuthEvent::SignedOut);
    store.apply(AuthEvent::SignedIn(session("b", "t2")));

    let loading_flags: Vec<bool> = seen.borrow().iter().map(|s| s.is_loading).collect();
    assert_eq!(loading_flags, vec![false, false, false, false]);
    assert!(!store.snapshot().is_loading);
}

#[test]
fn first_event_of_any_kind_ends_loading() {
    let store = SessionStore::new();
    store.apply(AuthEvent::SignedIn(session("a", "t1")));
    assert_eq!(store.snapshot().user_id(), Some("a"));
    assert!(!store.snapshot().is_loading);
}

// =============================================================
// Notifications
// =============================================================

#[test]
fn token_refresh_for_same_user_does_not_notify() {
    let store = SessionStore::new();
    store.apply(AuthEvent::SignedIn(session("a", "t1")));
    let seen = recorder(&store);

    assert!(!store.apply(AuthEvent::TokenRefreshed(session("a", "t2"))));
    assert!(seen.borrow().is_empty());
    assert_eq!(store.access_token().as_deref(), Some("t2"));
}

#[test]
fn repeated_sign_in_is_idempotent() {
    let store = SessionStore::new();
    let seen = recorder(&store);
    assert!(store.apply(AuthEvent::SignedIn(session("a", "t1"))));
    assert!(!store.apply(AuthEvent::SignedIn(session("a", "t1"))));
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn sign_out_clears_user_and_token() {
    let store = SessionStore::new();
    store.apply(AuthEvent::SignedIn(session("a", "t1")));
    store.apply(AuthEvent::SignedOut);
    assert_eq!(store.snapshot(), SessionSnapshot::resolved(None));
    assert_eq!(store.access_token(), None);
}

#[test]
fn user_updated_replaces_identity_details() {
    let store = SessionStore::new();
    store.apply(AuthEvent::SignedIn(session("a", "t1")));
    let updated = AuthUser { id: "a".to_owned(), email: Some("new@example.com".to_owned()) };
    assert!(store.apply(AuthEvent::UserUpdated(updated.clone())));
    assert_eq!(store.snapshot().user, Some(updated));
}

#[test]
fn user_updated_without_session_keeps_user_absent() {
    let store = SessionStore::new();
    store.apply(AuthEvent::InitialSession(None));
    assert!(!store.apply(AuthEvent::UserUpdated(user("a"))));
    assert_eq!(store.snapshot().user, None);
}

#[test]
fn unsubscribe_stops_notifications() {
    let store = SessionStore::new();
    let seen = Rc::new(RefCell::new(0));
    let sink = Rc::clone(&seen);
    let id = store.subscribe(move |_| *sink.borrow_mut() += 1);

    store.apply(AuthEvent::InitialSession(None));
    assert!(store.unsubscribe(id));
    store.apply(AuthEvent::SignedIn(session("a", "t1")));

    assert_eq!(*seen.borrow(), 1);
}

#[test]
fn subscriber_may_read_store_reentrantly() {
    let store = SessionStore::new();
    let seen = Rc::new(RefCell::new(None));
    let sink = Rc::clone(&seen);
    let reader = store.clone();
    store.subscribe(move |_| *sink.borrow_mut() = reader.access_token());

    store.apply(AuthEvent::SignedIn(session("a", "t1")));

    assert_eq!(seen.borrow().as_deref(), Some("t1"));
}
