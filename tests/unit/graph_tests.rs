//! Resource graph validation, prefix inheritance and parent URL composition.

use hal_resource::core::HyperError;
use hal_resource::definition::{Action, ResourceDefinition, ResourceSet};
use hal_resource::graph::{ParentUrlInfo, Prefix, prefix_for};
use hal_resource::test_utils::fixtures;
use hal_resource::version::resolve;
use serde_json::json;
use std::collections::BTreeMap;

fn resolved(set: &ResourceSet) -> BTreeMap<String, hal_resource::version::ResolvedResource> {
    set.iter().map(|(name, def)| (name.to_string(), resolve(def, 1).unwrap())).collect()
}

#[test]
fn fixture_graph_shape() {
    let set = fixtures::hierarchy();
    let graph = set.graph();
    assert_eq!(graph.ancestors("grandChild"), vec!["child", "parent"]);
    assert_eq!(graph.depth("grandChild"), 2);
    assert_eq!(graph.depth("parent"), 0);
    assert_eq!(graph.topological_order(), vec!["parent", "child", "grandChild"]);
}

#[test]
fn parent_url_cache_matches_hierarchy() {
    let resources = resolved(&fixtures::hierarchy());

    assert!(ParentUrlInfo::compose(&resources, "parent").is_empty());

    let child = ParentUrlInfo::compose(&resources, "child");
    assert_eq!(child.url_path, "/parent/{id}");
    assert_eq!(child.tokens.len(), 1);
    assert_eq!(child.tokens[0].camel, "parentId");

    let grand = ParentUrlInfo::compose(&resources, "grandChild");
    assert_eq!(grand.url_path, "/parent/{id}/child/{child.id}");
    let camels: Vec<_> = grand.tokens.iter().map(|t| t.camel.as_str()).collect();
    assert_eq!(camels, vec!["parentId", "childId"]);
}

#[test]
fn parent_urls_from_flat_data() {
    let resources = resolved(&fixtures::hierarchy());
    let model = json!({"parentId": 1, "childId": 2, "id": 3});
    assert_eq!(ParentUrlInfo::compose(&resources, "parent").render(&model, "parent"), "");
    assert_eq!(ParentUrlInfo::compose(&resources, "child").render(&model, "child"), "/parent/1");
    assert_eq!(
        ParentUrlInfo::compose(&resources, "grandChild").render(&model, "grandChild"),
        "/parent/1/child/2"
    );
}

#[test]
fn prefixes_inherit_and_override() {
    let set = ResourceSet::new([
        ResourceDefinition::new("a").api_prefix("/v1").action("self", Action::get("/a/:id")),
        ResourceDefinition::new("b").parent("a").url_prefix("/mnt").action("self", Action::get("/b/:id")),
        ResourceDefinition::new("c").parent("b").api_prefix("").action("self", Action::get("/c/:id")),
    ])
    .unwrap();
    let resources = resolved(&set);
    let base = Prefix::new("/root", "/api");

    assert_eq!(prefix_for(&resources, "a", &base), Prefix::new("/root", "/v1"));
    assert_eq!(prefix_for(&resources, "b", &base), Prefix::new("/mnt", "/v1"));
    assert_eq!(prefix_for(&resources, "c", &base), Prefix::new("/mnt", ""));
}

#[test]
fn cycles_are_rejected() {
    let result = ResourceSet::new([
        ResourceDefinition::new("a").parent("b").action("self", Action::get("/a/:id")),
        ResourceDefinition::new("b").parent("a").action("self", Action::get("/b/:id")),
    ]);
    match result {
        Err(HyperError::CircularParent { chain }) => {
            assert!(chain.contains("a") && chain.contains("b"), "{chain}");
        }
        other => panic!("expected a cycle error, got {other:?}"),
    }
}
