//! Version resolution: first write wins, overlays are cumulative, deletions apply.

use hal_resource::core::HyperError;
use hal_resource::definition::{Action, ActionOverlay, ResourceDefinition};
use hal_resource::version::{merge_values, resolve, versions_for};
use serde_json::json;

fn parent() -> ResourceDefinition {
    ResourceDefinition::new("parent")
        .action("self", Action::get("/parent/:id"))
        .action("legacy", Action::get("/parent/legacy"))
        .overlay(2, "self", ActionOverlay::new().include(["id", "title"]))
        .overlay(3, "self", ActionOverlay::new().include(["id"]).exclude(["secret"]))
        .overlay(3, "legacy", ActionOverlay::new().deleted())
        .overlay(4, "archive", ActionOverlay::new().method("post").url("/parent/:id/archive"))
}

#[test]
fn version_one_is_the_base() {
    let versions = versions_for(&parent()).unwrap();
    assert!(versions[&1].actions["self"].include.is_none());
    assert!(versions[&1].actions.contains_key("legacy"));
}

#[test]
fn earlier_overlay_wins_over_later() {
    let versions = versions_for(&parent()).unwrap();
    let include = |v: u32| versions[&v].actions["self"].include.clone().unwrap();
    assert_eq!(include(2), vec!["id", "title"]);
    assert_eq!(include(3), vec!["id", "title"]);
    assert_eq!(versions[&3].actions["self"].exclude, Some(vec!["secret".to_string()]));
}

#[test]
fn deleted_actions_disappear_from_that_version_on() {
    let versions = versions_for(&parent()).unwrap();
    assert!(versions[&2].actions.contains_key("legacy"));
    assert!(!versions[&3].actions.contains_key("legacy"));
    assert!(!versions[&4].actions.contains_key("legacy"));
}

#[test]
fn overlays_can_add_actions() {
    let resolved = resolve(&parent(), 4).unwrap();
    assert_eq!(resolved.actions["archive"].url, "/parent/:id/archive");
    assert!(!resolve(&parent(), 3).unwrap().actions.contains_key("archive"));
}

#[test]
fn undeclared_versions_use_lower_overlays() {
    let resolved = resolve(&parent(), 9).unwrap();
    assert_eq!(resolved.version, 9);
    assert!(resolved.actions.contains_key("archive"));
}

#[test]
fn incomplete_new_action_is_an_error() {
    let definition = ResourceDefinition::new("parent")
        .action("self", Action::get("/parent/:id"))
        .overlay(2, "archive", ActionOverlay::new().include(["id"]));
    let err = resolve(&definition, 2).unwrap_err();
    assert!(matches!(err, HyperError::IncompleteAction { action, version: 2, .. } if action == "archive"));
}

#[test]
fn resolution_leaves_definition_untouched() {
    let definition = parent();
    let _ = versions_for(&definition).unwrap();
    assert!(definition.actions["self"].include.is_none());
    assert_eq!(definition.actions.len(), 2);
}

#[test]
fn value_merge_polarity() {
    let mut target = json!({"a": 1, "nested": {"keep": true}, "empty": null});
    merge_values(&mut target, &json!({"a": 2, "b": 3, "nested": {"keep": false, "add": 1}, "empty": 4}));
    assert_eq!(target, json!({"a": 1, "b": 3, "nested": {"keep": true, "add": 1}, "empty": 4}));
}
