use super::*;

// =============================================================
// RegistrationFlow
// =============================================================

#[test]
fn registration_flow_parses_known_values() {
    assert_eq!(RegistrationFlow::parse("inaugural"), RegistrationFlow::Inaugural);
    assert_eq!(RegistrationFlow::parse("enrollment"), RegistrationFlow::Enrollment);
    assert_eq!(RegistrationFlow::parse("admin"), RegistrationFlow::Admin);
}

#[test]
fn registration_flow_keeps_unknown_values_verbatim() {
    let flow = RegistrationFlow::parse("Inaugural ");
    assert_eq!(flow, RegistrationFlow::Other("Inaugural ".to_owned()));
    assert_eq!(flow.as_str(), "Inaugural ");
    assert!(!flow.is_inaugural());
}

#[test]
fn registration_flow_serializes_as_plain_string() {
    let value = serde_json::to_value(RegistrationFlow::Enrollment).unwrap();
    assert_eq!(value, serde_json::json!("enrollment"));
}

// =============================================================
// Profile decoding
// =============================================================

#[test]
fn profile_decodes_backend_row() {
    let row = serde_json::json!({
        "id": "7f1c",
        "registration_flow": "inaugural",
        "onboarding_completed": false,
        "full_name": "Ana Souza",
        "created_at": "2024-03-01T10:00:00Z"
    });
    let profile: Profile = serde_json::from_value(row).unwrap();
    assert_eq!(profile.id, "7f1c");
    assert!(profile.registration_flow.is_inaugural());
    assert!(!profile.onboarding_completed);
    assert_eq!(profile.full_name.as_deref(), Some("Ana Souza"));
}

#[test]
fn profile_null_fields_fall_back_to_defaults() {
    let row = serde_json::json!({
        "id": "7f1c",
        "registration_flow": null,
        "onboarding_completed": null
    });
    let profile: Profile = serde_json::from_value(row).unwrap();
    assert_eq!(profile.registration_flow, RegistrationFlow::Unset);
    assert!(!profile.onboarding_completed);
    assert_eq!(profile.full_name, None);
}

#[test]
fn profile_missing_fields_fall_back_to_defaults() {
    let profile: Profile = serde_json::from_value(serde_json::json!({ "id": "7f1c" })).unwrap();
    assert_eq!(profile.registration_flow, RegistrationFlow::Unset);
    assert!(!profile.onboarding_completed);
}

// =============================================================
// AuthSession
// =============================================================

fn session_json(expires_at: Option<i64>) -> serde_json::Value {
    serde_json::json!({
        "access_token": "at",
        "refresh_token": "rt",
        "expires_in": 3600,
        "expires_at": expires_at,
        "user": { "id": "u1", "email": "ana@example.com", "role": "authenticated" }
    })
}

#[test]
fn auth_session_decodes_token_response() {
    let session: AuthSession = serde_json::from_value(session_json(Some(1_700_000_000))).unwrap();
    assert_eq!(session.token_type, "bearer");
    assert_eq!(session.user.id, "u1");
    assert_eq!(session.expires_at, Some(1_700_000_000));
}

#[test]
fn auth_session_derives_expiry_from_expires_in() {
    let session: AuthSession = serde_json::from_value(session_json(None)).unwrap();
    let session = session.with_expiry_from(1_000);
    assert_eq!(session.expires_at, Some(4_600));
}

#[test]
fn auth_session_expiry_window() {
    let session: AuthSession = serde_json::from_value(session_json(Some(1_000))).unwrap();
    assert!(!session.expires_within(900, 60));
    assert!(session.expires_within(950, 60));
    assert!(session.expires_within(2_000, 60));
}

#[test]
fn auth_session_without_expiry_never_expires() {
    let mut session: AuthSession = serde_json::from_value(session_json(None)).unwrap();
    session.expires_in = None;
    assert!(!session.with_expiry_from(0).expires_within(i64::MAX - 100, 60));
}
