//! Action URLs across the three-level hierarchy.

use hal_resource::envelope::Envelope;
use hal_resource::graph::Prefix;
use hal_resource::render::Renderer;
use hal_resource::test_utils::fixtures;
use serde_json::{Value, json};

fn model() -> Value {
    json!({"parentId": 1, "childId": 2, "id": 3})
}

fn paging() -> Envelope {
    Envelope::new().with_data(json!({"page": 1, "size": 5}))
}

#[test]
fn urls_without_prefix() {
    let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::default(), 1).unwrap();

    assert_eq!(renderer.url("parent", "self", &json!({"id": 1}), None).unwrap(), "/parent/1");
    assert_eq!(renderer.url("parent", "children", &json!({"id": 1}), None).unwrap(), "/parent/1/child");
    assert_eq!(
        renderer.link_url("parent", "next-child-page", &paging(), &json!({"id": 1}), None).unwrap(),
        Some("/parent/1/child?page=2&size=5".to_string())
    );
    assert_eq!(renderer.url("child", "self", &model(), None).unwrap(), "/parent/1/child/2");
    assert_eq!(renderer.url("grandChild", "self", &model(), None).unwrap(), "/parent/1/child/2/grand/3");
}

#[test]
fn urls_with_prefix() {
    let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::new("/test", "/api"), 1).unwrap();

    assert_eq!(renderer.url("parent", "self", &json!({"id": 1}), None).unwrap(), "/test/api/parent/1");
    assert_eq!(
        renderer.url("parent", "children", &json!({"id": 1}), None).unwrap(),
        "/test/api/parent/1/child"
    );
    assert_eq!(
        renderer.link_url("parent", "next-child-page", &paging(), &json!({"id": 1}), None).unwrap(),
        Some("/test/api/parent/1/child?page=2&size=5".to_string())
    );
    assert_eq!(renderer.url("child", "self", &model(), None).unwrap(), "/test/api/parent/1/child/2");
    assert_eq!(
        renderer.url("grandChild", "self", &model(), None).unwrap(),
        "/test/api/parent/1/child/2/grand/3"
    );
}

#[test]
fn parent_urls() {
    let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::new("/test", "/api"), 1).unwrap();
    assert_eq!(renderer.parent_url("parent", &model()).unwrap(), "");
    assert_eq!(renderer.parent_url("child", &model()).unwrap(), "/parent/1");
    assert_eq!(renderer.parent_url("grandChild", &model()).unwrap(), "/parent/1/child/2");
}

#[test]
fn explicit_parent_url_wins() {
    let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::default(), 1).unwrap();
    let url = renderer.url("grandChild", "self", &json!({"id": 9}), Some("/parent/4/child/5")).unwrap();
    assert_eq!(url, "/parent/4/child/5/grand/9");
}

#[test]
fn dynamic_link_without_context_yields_nothing() {
    let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::default(), 1).unwrap();
    let url = renderer.link_url("parent", "next-child-page", &Envelope::new(), &json!({"id": 1}), None);
    assert_eq!(url.unwrap(), None);
    assert!(renderer.link_url("parent", "next-page", &Envelope::new(), &json!({}), None).is_err());
}
