use serde_json::json;

use super::*;
use crate::routing::guard::{PUBLIC_PATHS, is_public};

#[test]
fn section_paths_are_private_and_unique() {
    for section in Section::ALL {
        assert!(!is_public(section.path()), "{section:?}");
        assert!(!PUBLIC_PATHS.contains(&section.path()));
    }
    let mut paths: Vec<_> = Section::ALL.iter().map(|s| s.path()).collect();
    paths.sort_unstable();
    paths.dedup();
    assert_eq!(paths.len(), Section::ALL.len());
}

#[test]
fn from_path_round_trips_and_normalizes() {
    for section in Section::ALL {
        assert_eq!(Section::from_path(section.path()), Some(section));
    }
    assert_eq!(Section::from_path("/students/?page=2"), Some(Section::Students));
    assert_eq!(Section::from_path("/"), None);
}

#[test]
fn events_list_newest_first() {
    assert_eq!(Section::Events.ordering(), ("starts_at", false));
    assert_eq!(Section::Students.ordering(), ("full_name", true));
}

#[test]
fn row_label_prefers_name_columns() {
    assert_eq!(row_label(&json!({ "id": "1", "full_name": "Ana Souza", "name": "x" })), "Ana Souza");
    assert_eq!(row_label(&json!({ "id": "1", "name": "  Judô " })), "Judô");
    assert_eq!(row_label(&json!({ "id": "1", "title": "Festival" })), "Festival");
}

#[test]
fn row_label_falls_back_to_id() {
    assert_eq!(row_label(&json!({ "id": "abc", "full_name": "" })), "abc");
    assert_eq!(row_label(&json!({ "id": 42 })), "42");
    assert_eq!(row_label(&json!({})), "—");
}
