//! Version overlay resolution.
//!
//! Version 1 of a resource is its base definition. Every declared overlay key `v`
//! produces a separate resolved action set: the base is cloned, then every overlay
//! with a key up to and including `v` is merged into it in ascending order.
//!
//! # Merge polarity
//!
//! The merge is **first write wins**: a field that is already set in the
//! accumulating target keeps its value, and only absent fields are filled from the
//! overlay. Maps (`embed`, `links`, `parameters`) merge per key, and static
//! parameter objects merge recursively under the same rule. Lists such as
//! `include` are leaves: an existing list is kept whole.
//!
//! ```rust
//! use hal_resource::definition::{Action, ActionOverlay, ResourceDefinition};
//! use hal_resource::version::versions_for;
//!
//! let parent = ResourceDefinition::new("parent")
//!     .action("self", Action::get("/parent/:id"))
//!     .overlay(2, "self", ActionOverlay::new().include(["id", "title"]));
//!
//! let versions = versions_for(&parent)?;
//! assert!(versions[&1].actions["self"].include.is_none());
//! assert_eq!(versions[&2].actions["self"].include.as_deref(), Some(&["id".to_string(), "title".to_string()][..]));
//! # Ok::<(), hal_resource::core::HyperError>(())
//! ```
//!
//! After merging, actions whose overlay carries `deleted` are removed. Each
//! resolved version owns its data; nothing is shared with the base definition or
//! with other versions.

use serde_json::Value;
use std::collections::BTreeMap;

use crate::core::{HyperError, Result};
use crate::definition::{
    Action, ActionOverlay, Embed, LinkSpec, ParameterSpec, ResourceDefinition,
};

/// Fill `target` from `source` without replacing anything already present.
///
/// Objects merge key by key, recursively. Any other value in `target` (including
/// arrays) is kept as is; `null` counts as absent.
pub fn merge_values(target: &mut Value, source: &Value) {
    match (target, source) {
        (Value::Object(target), Value::Object(source)) => {
            for (key, value) in source {
                match target.get_mut(key) {
                    Some(existing) if !existing.is_null() => merge_values(existing, value),
                    _ => {
                        target.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (target @ Value::Null, source) => *target = source.clone(),
        _ => {}
    }
}

/// First-write merge of a partial record into an accumulating one.
pub trait Absorb<Rhs = Self> {
    /// Fill unset parts of `self` from `other`.
    fn absorb(&mut self, other: Rhs);
}

impl<T> Absorb for Option<T> {
    fn absorb(&mut self, other: Option<T>) {
        if self.is_none() {
            *self = other;
        }
    }
}

impl<V: Absorb> Absorb for BTreeMap<String, V> {
    fn absorb(&mut self, other: BTreeMap<String, V>) {
        for (key, value) in other {
            match self.get_mut(&key) {
                Some(existing) => existing.absorb(value),
                None => {
                    self.insert(key, value);
                }
            }
        }
    }
}

impl Absorb for Embed {
    fn absorb(&mut self, other: Embed) {
        self.actions.absorb(other.actions);
    }
}

impl Absorb for ParameterSpec {
    fn absorb(&mut self, other: ParameterSpec) {
        if let (ParameterSpec::Static(existing), ParameterSpec::Static(incoming)) = (self, &other) {
            merge_values(existing, incoming);
        }
    }
}

impl Absorb for LinkSpec {
    fn absorb(&mut self, _other: LinkSpec) {}
}

impl Absorb for ActionOverlay {
    fn absorb(&mut self, other: ActionOverlay) {
        self.method.absorb(other.method);
        self.url.absorb(other.url);
        self.authorize.absorb(other.authorize);
        self.condition.absorb(other.condition);
        self.render.absorb(other.render);
        self.embed.absorb(other.embed);
        self.links.absorb(other.links);
        self.parameters.absorb(other.parameters);
        self.include.absorb(other.include);
        self.exclude.absorb(other.exclude);
        self.filter.absorb(other.filter);
        self.transform.absorb(other.transform);
        self.deleted.absorb(other.deleted);
    }
}

/// A resource with the action set of one version.
#[derive(Debug, Clone)]
pub struct ResolvedResource {
    pub name: String,
    pub version: u32,
    pub parent: Option<String>,
    pub resource_prefix: bool,
    pub url_prefix: Option<String>,
    pub api_prefix: Option<String>,
    pub actions: BTreeMap<String, Action>,
}

impl ResolvedResource {
    fn base(definition: &ResourceDefinition) -> Self {
        Self {
            name: definition.name.clone(),
            version: 1,
            parent: definition.parent.clone(),
            resource_prefix: definition.resource_prefix,
            url_prefix: definition.url_prefix.clone(),
            api_prefix: definition.api_prefix.clone(),
            actions: definition.actions.clone(),
        }
    }
}

/// Resolve `definition` at `version`.
///
/// Version 1, and any version below the first overlay key, yields the base
/// definition. Otherwise every overlay with a key up to `version` is applied.
pub fn resolve(definition: &ResourceDefinition, version: u32) -> Result<ResolvedResource> {
    let mut resolved = ResolvedResource::base(definition);
    resolved.version = version;

    let overlays: Vec<_> =
        definition.versions.range(..=version).filter(|(key, _)| **key >= 2).collect();
    if overlays.is_empty() {
        return Ok(resolved);
    }

    let mut accumulated: BTreeMap<String, ActionOverlay> = definition
        .actions
        .iter()
        .map(|(name, action)| (name.clone(), ActionOverlay::from(action.clone())))
        .collect();

    for (key, overlay) in overlays {
        tracing::trace!(resource = %definition.name, version = key, "applying overlay");
        accumulated.absorb(overlay.clone());
    }

    let mut actions = BTreeMap::new();
    for (name, overlay) in accumulated {
        if overlay.deleted == Some(true) {
            tracing::trace!(resource = %definition.name, action = %name, version, "action deleted");
            continue;
        }
        let action = finish_action(&definition.name, &name, version, overlay)?;
        actions.insert(name, action);
    }
    resolved.actions = actions;
    Ok(resolved)
}

fn finish_action(
    resource: &str,
    action: &str,
    version: u32,
    overlay: ActionOverlay,
) -> Result<Action> {
    let missing = |field: &str| HyperError::IncompleteAction {
        resource: resource.to_string(),
        action: action.to_string(),
        version,
        field: field.to_string(),
    };
    let method = overlay.method.ok_or_else(|| missing("method"))?;
    let url = overlay.url.ok_or_else(|| missing("url"))?;

    Ok(Action {
        method,
        url,
        authorize: overlay.authorize,
        condition: overlay.condition,
        render: overlay.render,
        embed: overlay.embed,
        links: overlay.links,
        parameters: overlay.parameters,
        include: overlay.include,
        exclude: overlay.exclude,
        filter: overlay.filter,
        transform: overlay.transform,
    })
}

/// Every version of `definition`: `1` plus each declared overlay key.
pub fn versions_for(definition: &ResourceDefinition) -> Result<BTreeMap<u32, ResolvedResource>> {
    let mut versions = BTreeMap::new();
    versions.insert(1, ResolvedResource::base(definition));
    for key in definition.versions.keys().copied().filter(|v| *v >= 2) {
        versions.insert(key, resolve(definition, key)?);
    }
    Ok(versions)
}
