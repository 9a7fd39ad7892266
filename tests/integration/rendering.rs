//! Full bodies: versioned shaping, embedded children and lists.

use hal_resource::envelope::Envelope;
use hal_resource::graph::Prefix;
use hal_resource::render::{HyperResource, Origin, RenderOptions, Renderer};
use hal_resource::test_utils::fixtures;
use serde_json::{Value, json};
use std::sync::Arc;

fn paging() -> Envelope {
    Envelope::new().with_data(json!({"page": 1, "size": 5}))
}

fn parent_data() -> Value {
    json!({
        "id": 1,
        "title": "test",
        "description": "this is a test",
        "children": [{}, {}, {}, {}, {}]
    })
}

fn parent_links() -> Value {
    let parameters = json!({"page": {"range": [1, 1]}, "size": {"range": [1, 100]}});
    json!({
        "self": {"href": "/parent/1", "method": "GET"},
        "list": {"href": "/parent", "method": "GET"},
        "children": {"href": "/parent/1/child", "method": "GET", "parameters": parameters},
        "next-child-page": {"href": "/parent/1/child?page=2&size=5", "method": "GET", "parameters": parameters}
    })
}

#[test]
fn specific_version_shapes_body() {
    let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::default(), 2).unwrap();
    let body = renderer
        .render_resource("parent", "self", &paging(), &parent_data(), &RenderOptions::new())
        .unwrap();
    assert_eq!(
        body,
        json!({
            "id": 1,
            "title": "test",
            "_origin": {"href": "/parent/1", "method": "GET"},
            "_resource": "parent",
            "_action": "self",
            "_links": parent_links()
        })
    );
}

#[test]
fn version_one_keeps_every_field() {
    let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::default(), 1).unwrap();
    let body = renderer
        .render_resource("parent", "self", &paging(), &parent_data(), &RenderOptions::new())
        .unwrap();
    assert_eq!(
        body,
        json!({
            "id": 1,
            "title": "test",
            "description": "this is a test",
            "children": [{}, {}, {}, {}, {}],
            "_origin": {"href": "/parent/1", "method": "GET"},
            "_resource": "parent",
            "_action": "self",
            "_links": parent_links()
        })
    );
}

#[test]
fn embedded_grandchildren_inherit_parent_url() {
    let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::new("/test", "/api"), 1).unwrap();
    let body = renderer
        .render_resource(
            "child",
            "self",
            &fixtures::user("Evenly"),
            &fixtures::child_with_grandchildren(),
            &RenderOptions::new(),
        )
        .unwrap();

    let grand_children: Vec<Value> = (1..=5)
        .map(|id| {
            let href = format!("/test/api/parent/1/child/2/grand/{id}");
            json!({
                "id": id,
                "_origin": {"href": href, "method": "GET"},
                "_resource": "grandChild",
                "_action": "self",
                "_links": {
                    "self": {"href": href, "method": "GET"},
                    "create": {"href": "/test/api/parent/1/child/2/grand", "method": "POST"}
                }
            })
        })
        .collect();

    assert_eq!(
        body,
        json!({
            "id": 2,
            "parentId": 1,
            "title": "child",
            "_origin": {"href": "/test/api/parent/1/child/2", "method": "GET"},
            "_resource": "child",
            "_action": "self",
            "_links": {
                "self": {"href": "/test/api/parent/1/child/2", "method": "GET"},
                "change": {"href": "/test/api/parent/1/child/2", "method": "PUT"}
            },
            "_embedded": {"grandChildren": grand_children}
        })
    );
}

#[test]
fn empty_embedded_collection_is_omitted() {
    let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::default(), 1).unwrap();
    let body = renderer
        .render_resource(
            "child",
            "self",
            &Envelope::new(),
            &json!({"id": 2, "parentId": 1, "grandChildren": []}),
            &RenderOptions::new(),
        )
        .unwrap();
    assert!(body.get("_embedded").is_none());
    assert!(body.get("grandChildren").is_none());
    assert!(body["_links"].get("change").is_none());
}

#[test]
fn top_level_list() {
    let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::default(), 1).unwrap();
    let items = vec![
        json!({"id": 1, "title": "one", "description": "the first item", "children": [{}]}),
        json!({"id": 2, "title": "two", "description": "the second item", "children": [{}]}),
    ];
    let origin = Origin::new("/parent", "GET");
    let body = renderer
        .render_list("parent", "self", &Envelope::new(), &items, &RenderOptions::new().origin(&origin))
        .unwrap();

    let expected_item = |id: u64, title: &str, description: &str| {
        json!({
            "id": id,
            "title": title,
            "description": description,
            "children": [{}],
            "_origin": {"href": format!("/parent/{id}"), "method": "GET"},
            "_resource": "parent",
            "_action": "self",
            "_links": {
                "self": {"href": format!("/parent/{id}"), "method": "GET"},
                "list": {"href": "/parent", "method": "GET"},
                "children": {
                    "href": format!("/parent/{id}/child"),
                    "method": "GET",
                    "parameters": {"size": {"range": [1, 100]}}
                }
            }
        })
    };
    assert_eq!(
        body,
        json!({
            "_origin": {"href": "/parent", "method": "GET"},
            "parents": [
                expected_item(1, "one", "the first item"),
                expected_item(2, "two", "the second item")
            ]
        })
    );
}

#[test]
fn list_from_another_resource() {
    let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::default(), 1).unwrap();
    let items: Vec<Value> = [(1, "one", "first"), (2, "two", "second"), (3, "three", "third")]
        .iter()
        .map(|(id, title, nth)| {
            json!({"id": id, "parentId": 1, "title": title, "description": format!("the {nth} item")})
        })
        .collect();
    let origin = Origin::new("/parent/1/child", "GET");
    let body = renderer
        .render_list("child", "self", &fixtures::user("Oddly"), &items, &RenderOptions::new().origin(&origin))
        .unwrap();

    assert_eq!(body["_origin"], json!({"href": "/parent/1/child", "method": "GET"}));
    let children = body["children"].as_array().unwrap();
    assert_eq!(children.len(), 3);
    for child in children {
        let id = child["id"].as_u64().unwrap();
        let href = format!("/parent/1/child/{id}");
        assert_eq!(child["_origin"], json!({"href": href, "method": "GET"}));
        assert_eq!(child["_resource"], "child");
        assert_eq!(child["_links"]["self"], json!({"href": href, "method": "GET"}));
        if id % 2 == 1 {
            assert_eq!(child["_links"]["change"], json!({"href": href, "method": "PUT"}));
        } else {
            assert!(child["_links"].get("change").is_none());
        }
    }
}

#[test]
fn list_without_origin_uses_template_href() {
    let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::default(), 1).unwrap();
    let body = renderer
        .render_list("parent", "children", &Envelope::new(), &[json!({"id": 4, "parentId": 1})], &RenderOptions::new())
        .unwrap();
    assert_eq!(body["_origin"], json!({"href": "/parent/{id}/child", "method": "GET"}));
    assert_eq!(body["children"][0]["_links"]["self"]["href"], "/parent/1/child/4");
}

#[test]
fn render_dispatches_on_shape_and_is_idempotent() {
    let renderer = Renderer::new(&fixtures::hierarchy(), Prefix::default(), 1).unwrap();
    let data = parent_data();
    let first = renderer.render("parent", "self", &paging(), &data, &RenderOptions::new()).unwrap();
    let second = renderer.render("parent", "self", &paging(), &data, &RenderOptions::new()).unwrap();
    assert_eq!(first, second);
    assert_eq!(data, parent_data());

    let list = renderer
        .render("parent", "list", &Envelope::new(), &json!([{"id": 1}]), &RenderOptions::new())
        .unwrap();
    assert!(list["parents"].is_array());
}

#[test]
fn catalog_shares_renderers_between_threads() {
    let catalog = Arc::new(HyperResource::new(fixtures::hierarchy()));
    let handles: Vec<_> = (1..=4u64)
        .map(|id| {
            let catalog = Arc::clone(&catalog);
            std::thread::spawn(move || {
                let renderer = catalog.renderer(&Prefix::new("/test", "/api"), 2).unwrap();
                renderer
                    .render_resource(
                        "parent",
                        "self",
                        &Envelope::new(),
                        &json!({"id": id, "title": "t", "secret": "x"}),
                        &RenderOptions::new(),
                    )
                    .unwrap()
            })
        })
        .collect();
    for (handle, id) in handles.into_iter().zip(1..=4u64) {
        let body = handle.join().unwrap();
        assert_eq!(body["_links"]["self"]["href"], format!("/test/api/parent/{id}"));
        assert!(body.get("secret").is_none());
    }
    assert_eq!(catalog.cached(), 1);
}
