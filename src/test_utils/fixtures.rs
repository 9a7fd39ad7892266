//! The canonical three-level definition set used across the test suites.
//!
//! ```text
//! parent            /parent/:id, /parent, /bogus (denied), /parent/:id/child
//! └── child         /child/:child.id (embeds grandChildren), PUT change
//!     └── grandChild  /grand/:grandChild.id, POST /grand, DELETE  (no resource prefix)
//! ```
//!
//! `parent:self` gains `include = ["id", "title"]` at version 2.

use serde_json::{Value, json};

use crate::definition::{Action, ActionOverlay, Embed, ResourceDefinition, ResourceSet};
use crate::envelope::Envelope;

/// `count / size` as a JSON number, integral when it divides evenly.
fn page_count(count: u64, size: u64) -> Value {
    if count % size == 0 {
        json!(count / size)
    } else {
        json!(count as f64 / size as f64)
    }
}

/// `Evenly` may change even ids, `Oddly` odd ids, anybody else nothing.
pub fn parity_authorize(envelope: &Envelope, data: &Value) -> bool {
    let id = data.get("id").and_then(Value::as_u64);
    match (envelope.user.get("name").and_then(Value::as_str), id) {
        (Some("Evenly"), Some(id)) => id % 2 == 0,
        (Some("Oddly"), Some(id)) => id % 2 == 1,
        _ => false,
    }
}

/// An envelope for the named user.
pub fn user(name: &str) -> Envelope {
    Envelope::new().with_user(json!({ "name": name }))
}

/// The definitions, unvalidated.
pub fn hierarchy_definitions() -> Vec<ResourceDefinition> {
    let children = Action::get("/parent/:id/child")
        .render("child", "self")
        .condition(|_, data| data.get("children").and_then(Value::as_array).is_some_and(|c| !c.is_empty()))
        .dynamic_link("next-child-page", |envelope, _| {
            let page = envelope.data_field("page")?.as_u64().filter(|p| *p > 0)?;
            let size = envelope.data_field("size")?.as_u64().filter(|s| *s > 0)?;
            Some(format!("/parent/:id/child?page={}&size={}", page + 1, size))
        })
        .dynamic_parameter("page", |envelope, data| {
            let size = envelope.data_field("size")?.as_u64().filter(|s| *s > 0)?;
            let count = data.get("children")?.as_array()?.len() as u64;
            Some(json!({ "range": [1, page_count(count, size)] }))
        })
        .parameter("size", json!({ "range": [1, 100] }));

    vec![
        ResourceDefinition::new("parent")
            .action("self", Action::get("/parent/:id"))
            .action("list", Action::get("/parent"))
            .action("bogus", Action::get("/bogus").authorize(|_, _| false))
            .action("children", children)
            .overlay(2, "self", ActionOverlay::new().include(["id", "title"])),
        ResourceDefinition::new("child")
            .parent("parent")
            .action(
                "self",
                Action::get("/child/:child.id").embed(
                    "grandChildren",
                    Embed::new("grandChild", "self").with_actions(["self", "create"]),
                ),
            )
            .action("change", Action::put("/child/:child.id").authorize(parity_authorize)),
        ResourceDefinition::new("grandChild")
            .parent("child")
            .without_resource_prefix()
            .action("self", Action::get("/grand/:grandChild.id"))
            .action("create", Action::post("/grand"))
            .action("delete", Action::delete("/grand/:grandChild.id")),
    ]
}

/// The validated definition set.
pub fn hierarchy() -> ResourceSet {
    ResourceSet::new(hierarchy_definitions()).expect("fixture definitions are valid")
}

/// The callback-free part of [`hierarchy`] as a TOML document.
pub const HIERARCHY_TOML: &str = r#"
[render]
media_types = ["application/hal+json"]

[resources.parent.actions.self]
method = "get"
url = "/parent/:id"

[resources.parent.actions.list]
method = "get"
url = "/parent"

[resources.parent.actions.children]
method = "get"
url = "/parent/:id/child"
render = { resource = "child", action = "self" }
parameters = { size = { range = [1, 100] } }

[resources.parent.versions.2.self]
include = ["id", "title"]

[resources.child]
parent = "parent"

[resources.child.actions.self]
method = "get"
url = "/child/:child.id"
embed = { grandChildren = { resource = "grandChild", render = "self", actions = ["self", "create"] } }

[resources.child.actions.change]
method = "put"
url = "/child/:child.id"

[resources.grandChild]
parent = "child"
resource_prefix = false

[resources.grandChild.actions.self]
method = "get"
url = "/grand/:grandChild.id"

[resources.grandChild.actions.create]
method = "post"
url = "/grand"

[resources.grandChild.actions.delete]
method = "delete"
url = "/grand/:grandChild.id"
"#;

/// Domain data of the child with id 2 holding five grandchildren.
pub fn child_with_grandchildren() -> Value {
    json!({
        "id": 2,
        "parentId": 1,
        "title": "child",
        "grandChildren": [{"id": 1}, {"id": 2}, {"id": 3}, {"id": 4}, {"id": 5}]
    })
}
