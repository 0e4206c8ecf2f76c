use super::*;

#[test]
fn writes_outside_the_browser_are_dropped() {
    save_json("academy.test", &serde_json::json!({ "a": 1 }));
    assert_eq!(load_json::<serde_json::Value>("academy.test"), None);
}

#[test]
fn remove_of_missing_key_is_a_no_op() {
    remove("academy.missing");
    assert_eq!(load_json::<serde_json::Value>("academy.missing"), None);
}
