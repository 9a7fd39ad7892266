//! Token engine behaviour across realistic route patterns.

use hal_resource::templating::{
    PathToken, UrlTemplate, collapse_separators, is_templated, join_segments, substitute, to_hal,
    tokenize,
};
use serde_json::json;

#[test]
fn tokens_of_nested_pattern() {
    let tokens = tokenize("/parent/:id/child/:child.id", "parent");
    assert_eq!(
        tokens,
        vec![
            PathToken {
                original: "id".to_string(),
                namespace: String::new(),
                resource: "parent".to_string(),
                property: "id".to_string(),
                camel: "parentId".to_string(),
            },
            PathToken {
                original: "child.id".to_string(),
                namespace: "child".to_string(),
                resource: "child".to_string(),
                property: "id".to_string(),
                camel: "childId".to_string(),
            },
        ]
    );
}

#[test]
fn hal_form_keeps_braces() {
    assert_eq!(to_hal("/parent/:id/child/{child.id}"), "/parent/{id}/child/{child.id}");
    assert_eq!(to_hal("/parent"), "/parent");
}

#[test]
fn substitution_prefers_camel_then_property() {
    let url = "/parent/:id/child/:child.id";
    let tokens = tokenize(url, "parent");
    let hal = to_hal(url);
    assert_eq!(substitute(&tokens, &hal, &json!({"id": 1, "childId": 2}), "parent"), "/parent/1/child/2");
    assert_eq!(
        substitute(&tokens, &hal, &json!({"parentId": 7, "id": 1, "childId": 2}), "parent"),
        "/parent/7/child/2"
    );
}

#[test]
fn missing_values_stay_as_placeholders() {
    let template = UrlTemplate::compile("/parent/:id/child/:child.id", "parent");
    assert_eq!(template.render(&json!({}), "parent"), "/parent/{id}/child/{childId}");
    assert_eq!(template.render(&json!({"parentId": 4}), "parent"), "/parent/4/child/{childId}");
    // A bare `id` fills both tokens through the property fallback.
    assert_eq!(template.render(&json!({"id": 4}), "parent"), "/parent/4/child/4");
    assert!(template.is_templated());
}

#[test]
fn literal_pattern_round_trips() {
    let template = UrlTemplate::compile("/parent/list", "parent");
    assert_eq!(template.render(&json!({}), "parent"), "/parent/list");
    assert!(!is_templated("/parent/list"));
    assert!(is_templated("/parent/:id"));
}

#[test]
fn separators_collapse_at_join_points() {
    assert_eq!(join_segments(&["/test/", "/api/", "/parent/1"]), "/test/api/parent/1");
    assert_eq!(collapse_separators("///a////b"), "/a/b");
    assert_eq!(collapse_separators("https://host//a?next=//b"), "https://host/a?next=//b");
}
