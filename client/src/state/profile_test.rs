use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use futures::executor::block_on;
use futures::future::{FutureExt, select};

use super::*;
use crate::net::types::{AuthUser, RegistrationFlow};

fn signed_in(id: &str) -> SessionSnapshot {
    SessionSnapshot::resolved(Some(AuthUser { id: id.to_owned(), email: None }))
}

fn profile(id: &str, flow: RegistrationFlow, done: bool) -> Profile {
    Profile { id: id.to_owned(), registration_flow: flow, onboarding_completed: done, full_name: None }
}

/// Canned profile rows keyed by user id; counts fetches.
#[derive(Default)]
struct FakeSource {
    rows: HashMap<String, Result<Option<Profile>, DataError>>,
    calls: Cell<usize>,
}

impl FakeSource {
    fn with(mut self, user_id: &str, row: Result<Option<Profile>, DataError>) -> Self {
        self.rows.insert(user_id.to_owned(), row);
        self
    }
}

impl ProfileSource for FakeSource {
    async fn fetch_profile(&self, user_id: &str) -> Result<Option<Profile>, DataError> {
        self.calls.set(self.calls.get() + 1);
        self.rows.get(user_id).cloned().unwrap_or(Ok(None))
    }
}

// =============================================================
// sync
// =============================================================

#[test]
fn sync_ignores_loading_session() {
    let resolver = ProfileResolver::new();
    assert_eq!(resolver.sync(&SessionSnapshot::loading()), None);
    assert_eq!(resolver.state(), ProfileState::Idle);
}

#[test]
fn sync_starts_one_load_per_identity() {
    let resolver = ProfileResolver::new();
    let ticket = resolver.sync(&signed_in("a")).expect("first sync starts a load");
    assert_eq!(ticket.user_id(), "a");
    assert_eq!(resolver.sync(&signed_in("a")), None);
    assert_eq!(resolver.sync(&signed_in("a")), None);
    assert_eq!(resolver.state(), ProfileState::Loading { user_id: "a".to_owned(), generation: ticket.generation() });
}

#[test]
fn sync_after_sign_out_clears_state() {
    let resolver = ProfileResolver::new();
    let ticket = resolver.sync(&signed_in("a")).unwrap();
    resolver.complete(&ticket, Ok(Some(profile("a", RegistrationFlow::Admin, true))));

    assert_eq!(resolver.sync(&SessionSnapshot::resolved(None)), None);
    assert_eq!(resolver.state(), ProfileState::Idle);
    assert_eq!(resolver.profile_for("a"), None);
}

#[test]
fn sync_does_not_refetch_after_failure() {
    let resolver = ProfileResolver::new();
    let ticket = resolver.sync(&signed_in("a")).unwrap();
    resolver.complete(&ticket, Err(DataError::Http("offline".to_owned())));
    assert_eq!(resolver.sync(&signed_in("a")), None);
}

// =============================================================
// complete
// =============================================================

#[test]
fn complete_found_resolves_profile() {
    let resolver = ProfileResolver::new();
    let ticket = resolver.sync(&signed_in("a")).unwrap();
    let row = profile("a", RegistrationFlow::Inaugural, false);

    assert!(resolver.complete(&ticket, Ok(Some(row.clone()))));
    assert_eq!(resolver.profile_for("a"), Some(row));
}

#[test]
fn complete_not_found_is_resolved_without_profile() {
    let resolver = ProfileResolver::new();
    let ticket = resolver.sync(&signed_in("a")).unwrap();
    assert!(resolver.complete(&ticket, Ok(None)));
    assert_eq!(resolver.state(), ProfileState::Resolved { user_id: "a".to_owned(), profile: None });
}

#[test]
fn complete_error_is_unresolved_not_synthetic_profile() {
    let resolver = ProfileResolver::new();
    let ticket = resolver.sync(&signed_in("a")).unwrap();
    assert!(resolver.complete(&ticket, Err(DataError::Status { status: 503, message: "down".to_owned() })));
    assert!(matches!(resolver.state(), ProfileState::Unresolved { ref user_id, .. } if user_id == "a"));
    assert_eq!(resolver.profile_for("a"), None);
}

#[test]
fn complete_discards_result_for_superseded_identity() {
    let resolver = ProfileResolver::new();
    let ticket_a = resolver.sync(&signed_in("a")).unwrap();
    let ticket_b = resolver.sync(&signed_in("b")).unwrap();

    assert!(!resolver.complete(&ticket_a, Ok(Some(profile("a", RegistrationFlow::Inaugural, false)))));
    assert_eq!(resolver.state().user_id(), Some("b"));
    assert_eq!(resolver.profile_for("b"), None);

    assert!(resolver.complete(&ticket_b, Ok(Some(profile("b", RegistrationFlow::Admin, true)))));
    assert_eq!(resolver.profile_for("b").map(|p| p.registration_flow), Some(RegistrationFlow::Admin));
}

#[test]
fn complete_discards_result_from_older_generation_of_same_identity() {
    let resolver = ProfileResolver::new();
    let first = resolver.sync(&signed_in("a")).unwrap();
    resolver.complete(&first, Ok(None));
    let second = resolver.reload().unwrap();

    assert!(!resolver.complete(&first, Ok(Some(profile("a", RegistrationFlow::Admin, true)))));
    assert!(resolver.complete(&second, Ok(Some(profile("a", RegistrationFlow::Enrollment, false)))));
    assert_eq!(resolver.profile_for("a").map(|p| p.registration_flow), Some(RegistrationFlow::Enrollment));
}

#[test]
fn complete_rejects_row_for_another_user() {
    let resolver = ProfileResolver::new();
    let ticket = resolver.sync(&signed_in("a")).unwrap();
    assert!(resolver.complete(&ticket, Ok(Some(profile("z", RegistrationFlow::Admin, true)))));
    assert!(matches!(resolver.state(), ProfileState::Unresolved { .. }));
}

// =============================================================
// reload
// =============================================================

#[test]
fn reload_requires_settled_identity() {
    let resolver = ProfileResolver::new();
    assert_eq!(resolver.reload(), None);
    let ticket = resolver.sync(&signed_in("a")).unwrap();
    assert_eq!(resolver.reload(), None);
    resolver.complete(&ticket, Err(DataError::Http("offline".to_owned())));
    let retry = resolver.reload().expect("reload after failure");
    assert!(retry.generation() > ticket.generation());
}

// =============================================================
// resolve + settled
// =============================================================

#[test]
fn resolve_fetches_and_applies() {
    let source = FakeSource::default().with("a", Ok(Some(profile("a", RegistrationFlow::Inaugural, true))));
    let resolver = ProfileResolver::new();
    let ticket = resolver.sync(&signed_in("a")).unwrap();

    assert!(block_on(resolver.resolve(&source, ticket)));
    assert_eq!(source.calls.get(), 1);
    assert!(resolver.profile_for("a").is_some());
}

#[test]
fn settled_returns_immediately_when_already_finished() {
    let resolver = ProfileResolver::new();
    let ticket = resolver.sync(&signed_in("a")).unwrap();
    resolver.complete(&ticket, Ok(None));
    assert_eq!(block_on(resolver.settled("a")), ProfileOutcome::NotFound);
}

#[test]
fn settled_waits_for_completion() {
    let source = FakeSource::default().with("a", Err(DataError::Http("offline".to_owned())));
    let resolver = ProfileResolver::new();
    let ticket = resolver.sync(&signed_in("a")).unwrap();

    let outcome = block_on(async {
        let waiting = resolver.settled("a").fuse();
        let loading = resolver.resolve(&source, ticket).fuse();
        futures::pin_mut!(waiting, loading);
        loading.await;
        waiting.await
    });

    assert_eq!(outcome, ProfileOutcome::Failed("request failed: offline".to_owned()));
}

#[test]
fn settled_reports_superseded_on_identity_switch() {
    let resolver = ProfileResolver::new();
    let _ticket = resolver.sync(&signed_in("a")).unwrap();

    let outcome = block_on(async {
        let waiting = resolver.settled("a");
        futures::pin_mut!(waiting);
        // Register the waiter, then switch identity.
        assert!(futures::poll!(waiting.as_mut()).is_pending());
        resolver.sync(&signed_in("b"));
        waiting.await
    });

    assert_eq!(outcome, ProfileOutcome::Superseded);
}

#[test]
fn settled_is_pending_while_loading() {
    let resolver = ProfileResolver::new();
    let _ticket = resolver.sync(&signed_in("a")).unwrap();
    let raced = block_on(select(resolver.settled("a").boxed_local(), futures::future::ready(())));
    assert!(matches!(raced, futures::future::Either::Right(_)));
}

// =============================================================
// subscribers
// =============================================================

#[test]
fn subscribers_see_each_transition_once() {
    let resolver = ProfileResolver::new();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    resolver.subscribe(move |state| sink.borrow_mut().push(state.clone()));

    let ticket = resolver.sync(&signed_in("a")).unwrap();
    resolver.sync(&signed_in("a"));
    resolver.complete(&ticket, Ok(None));
    resolver.sync(&SessionSnapshot::resolved(None));
    resolver.sync(&SessionSnapshot::resolved(None));

    let states = seen.borrow();
    assert_eq!(states.len(), 3);
    assert!(matches!(states[0], ProfileState::Loading { .. }));
    assert!(matches!(states[1], ProfileState::Resolved { profile: None, .. }));
    assert_eq!(states[2], ProfileState::Idle);
}
