//! Definitions loaded from documents render like the ones built in code.

use hal_resource::definition::document::DefinitionDocument;
use hal_resource::envelope::Envelope;
use hal_resource::render::{HyperResource, OptionsRequest, RenderOptions};
use hal_resource::test_utils::fixtures;
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

#[test]
fn toml_document_matches_code_fixture() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("resources.toml");
    std::fs::write(&path, fixtures::HIERARCHY_TOML).unwrap();

    let document = DefinitionDocument::from_path(&path).unwrap();
    let config = document.render.clone();
    let from_document = HyperResource::new(document.resource_set().unwrap());
    let from_code = HyperResource::new(fixtures::hierarchy());

    let model = json!({"parentId": 1, "childId": 2, "id": 3});
    for (resource, action) in [("parent", "self"), ("child", "self"), ("grandChild", "create")] {
        let a = from_document.renderer(&config.prefix(), 1).unwrap().url(resource, action, &model, None).unwrap();
        let b = from_code.renderer(&config.prefix(), 1).unwrap().url(resource, action, &model, None).unwrap();
        assert_eq!(a, b, "{resource}:{action}");
    }

    let renderer = from_document.renderer(&config.prefix(), 1).unwrap();
    let options = renderer.options(&OptionsRequest::new().media_types(&config.media_types)).unwrap();
    assert_eq!(options.media_types, vec!["application/hal+json"]);
    assert_eq!(options.versions, vec!["1", "2"]);
}

#[test]
fn callbacks_attach_after_loading() {
    let document = DefinitionDocument::parse(
        fixtures::HIERARCHY_TOML,
        hal_resource::definition::document::DocumentFormat::Toml,
        "fixture",
    )
    .unwrap();
    let mut set = document.resource_set().unwrap();
    set.action_mut("child", "change").unwrap().authorize = Some(Arc::new(fixtures::parity_authorize));

    let catalog = HyperResource::new(set);
    let renderer = catalog.renderer(&document.render.prefix(), 1).unwrap();
    let odd = renderer
        .links("child", "change", &fixtures::user("Evenly"), &json!({"id": 3, "parentId": 1}), &RenderOptions::new())
        .unwrap();
    assert!(odd.is_empty());
    let even = renderer
        .links("child", "change", &fixtures::user("Evenly"), &json!({"id": 4, "parentId": 1}), &RenderOptions::new())
        .unwrap();
    assert_eq!(even["change"].href, "/parent/1/child/4");
    assert!(renderer.links("child", "self", &Envelope::new(), &json!({}), &RenderOptions::new()).is_ok());
}
