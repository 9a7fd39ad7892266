//! Discovery documents over the fixture hierarchy.

use hal_resource::graph::Prefix;
use hal_resource::render::{HyperResource, OptionsRequest};
use hal_resource::test_utils::fixtures;
use serde_json::{Value, json};

fn options(prefix: Prefix, request: &OptionsRequest<'_>) -> Value {
    let catalog = HyperResource::new(fixtures::hierarchy());
    let renderer = catalog.renderer(&prefix, 1).unwrap();
    serde_json::to_value(renderer.options(request).unwrap()).unwrap()
}

#[test]
fn full_options_including_children() {
    let document = options(Prefix::default(), &OptionsRequest::new().full(true));
    assert_eq!(
        document,
        json!({
            "_mediaTypes": [],
            "_versions": ["1", "2"],
            "_links": {
                "parent:self": {"href": "/parent/{id}", "method": "GET", "templated": true},
                "parent:list": {"href": "/parent", "method": "GET"},
                "parent:children": {
                    "href": "/parent/{id}/child",
                    "method": "GET",
                    "templated": true,
                    "parameters": {"size": {"range": [1, 100]}}
                },
                "parent:bogus": {"href": "/parent/bogus", "method": "GET"},
                "child:self": {"href": "/parent/{parentId}/child/{id}", "method": "GET", "templated": true},
                "child:change": {"href": "/parent/{parentId}/child/{id}", "method": "PUT", "templated": true},
                "grandChild:self": {
                    "href": "/parent/{parentId}/child/{childId}/grand/{id}",
                    "method": "GET",
                    "templated": true
                },
                "grandChild:create": {
                    "href": "/parent/{parentId}/child/{childId}/grand",
                    "method": "POST",
                    "templated": true
                },
                "grandChild:delete": {
                    "href": "/parent/{parentId}/child/{childId}/grand/{id}",
                    "method": "DELETE",
                    "templated": true
                }
            }
        })
    );
}

#[test]
fn options_excluding_children() {
    let document = options(Prefix::default(), &OptionsRequest::new().exclude_children(true));
    assert_eq!(
        document,
        json!({
            "_mediaTypes": [],
            "_versions": ["1", "2"],
            "_links": {
                "parent:self": {"href": "/parent/{id}", "method": "GET", "templated": true},
                "parent:list": {"href": "/parent", "method": "GET"},
                "parent:children": {
                    "href": "/parent/{id}/child",
                    "method": "GET",
                    "templated": true,
                    "parameters": {"size": {"range": [1, 100]}}
                }
            }
        })
    );
}

#[test]
fn authorization_applies_without_full_flag() {
    let document = options(Prefix::default(), &OptionsRequest::new());
    let links = document["_links"].as_object().unwrap();
    assert!(!links.contains_key("parent:bogus"));
    // parity check has no user to approve it
    assert!(!links.contains_key("child:change"));
    assert!(links.contains_key("parent:children"));
}

#[test]
fn prefixed_options_with_media_types() {
    let media = vec!["application/hal+json".to_string(), "application/json".to_string()];
    let document = options(Prefix::new("/test", "/api"), &OptionsRequest::new().full(true).media_types(&media));
    assert_eq!(document["_mediaTypes"], json!(["application/hal+json", "application/json"]));
    assert_eq!(
        document["_links"]["grandChild:create"]["href"],
        "/test/api/parent/{parentId}/child/{childId}/grand"
    );
}
