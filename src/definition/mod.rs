//! Typed resource definitions.
//!
//! A definition set describes a graph of resources. Each [`ResourceDefinition`] owns
//! a map of [`Action`]s (HTTP method + route pattern + optional gating, shaping and
//! embedding rules) and an optional map of version overlays. Callbacks
//! (`authorize`, `condition`, `transform`, dynamic links and parameters) are plain
//! function-typed fields, so a definition is an ordinary value that can be cloned
//! and shared across threads.
//!
//! Definitions are usually written in code with the builder methods:
//!
//! ```rust
//! use hal_resource::definition::{Action, ResourceDefinition, ResourceSet};
//!
//! let set = ResourceSet::new([
//!     ResourceDefinition::new("parent")
//!         .action("self", Action::get("/parent/:id"))
//!         .action("list", Action::get("/parent")),
//!     ResourceDefinition::new("child")
//!         .parent("parent")
//!         .action("self", Action::get("/child/:child.id")),
//! ])?;
//! assert_eq!(set.len(), 2);
//! # Ok::<(), hal_resource::core::HyperError>(())
//! ```
//!
//! or loaded from a [`document::DefinitionDocument`], with callbacks attached
//! afterwards through [`ResourceSet::action_mut`].

pub mod document;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::core::{HyperError, Result, closest_match};
use crate::envelope::Envelope;
use crate::graph::ResourceGraph;

/// `(envelope, data) -> bool`, used for `authorize` and `condition`.
pub type Predicate = Arc<dyn Fn(&Envelope, &Value) -> bool + Send + Sync>;

/// `data -> data`, applied last when shaping a body.
pub type Transform = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// `(envelope, data) -> Option<value>`; `None` or a falsy value hides the parameter.
pub type ParameterGenerator = Arc<dyn Fn(&Envelope, &Value) -> Option<Value> + Send + Sync>;

/// `(envelope, data) -> Option<url>`; `None` or an empty string hides the link.
pub type LinkGenerator = Arc<dyn Fn(&Envelope, &Value) -> Option<String> + Send + Sync>;

/// An additional named link declared on an action.
#[derive(Clone)]
pub enum LinkSpec {
    /// Route-style pattern filled from data
    Template(String),
    /// URL computed per render
    Dynamic(LinkGenerator),
}

impl fmt::Debug for LinkSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LinkSpec::Template(t) => f.debug_tuple("Template").field(t).finish(),
            LinkSpec::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

/// A parameter description attached to an action's links.
#[derive(Clone)]
pub enum ParameterSpec {
    /// Fixed value, always present
    Static(Value),
    /// Computed per render, present only when the generator yields a truthy value
    Dynamic(ParameterGenerator),
}

impl fmt::Debug for ParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParameterSpec::Static(v) => f.debug_tuple("Static").field(v).finish(),
            ParameterSpec::Dynamic(_) => f.write_str("Dynamic(<fn>)"),
        }
    }
}

/// Cross reference to the `{resource, action}` whose shape an action renders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderRef {
    /// Target resource
    pub resource: String,
    /// Target action
    pub action: String,
}

/// A child resource inlined under `_embedded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Embed {
    /// Resource the embedded data belongs to
    pub resource: String,
    /// Action of that resource used to render each item
    pub render: String,
    /// When set, embedded items keep only these link names
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actions: Option<Vec<String>>,
}

impl Embed {
    /// Embed `resource` rendered through its `render` action.
    pub fn new(resource: impl Into<String>, render: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            render: render.into(),
            actions: None,
        }
    }

    /// Restrict the links kept on embedded items.
    pub fn with_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.actions = Some(actions.into_iter().map(Into::into).collect());
        self
    }
}

/// One capability of a resource.
#[derive(Clone, Default)]
pub struct Action {
    /// HTTP verb; emitted upper-cased
    pub method: String,
    /// Route-style pattern, e.g. `/parent/:id`
    pub url: String,
    /// Own authorization check; replaces the injected auth function when set
    pub authorize: Option<Predicate>,
    /// Data-dependent visibility; skipped for discovery documents
    pub condition: Option<Predicate>,
    /// Resource/action used to render list items for this action
    pub render: Option<RenderRef>,
    /// Children to inline, keyed by the data field holding them
    pub embed: BTreeMap<String, Embed>,
    /// Extra named links rendered alongside the action's own
    pub links: BTreeMap<String, LinkSpec>,
    /// Parameters attached to every link of the action
    pub parameters: BTreeMap<String, ParameterSpec>,
    /// Keep only these fields
    pub include: Option<Vec<String>>,
    /// Drop these fields
    pub exclude: Option<Vec<String>>,
    /// Keep only these fields (applied after `exclude`)
    pub filter: Option<Vec<String>>,
    /// Final user mapping of the shaped body
    pub transform: Option<Transform>,
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("authorize", &self.authorize.is_some())
            .field("condition", &self.condition.is_some())
            .field("render", &self.render)
            .field("embed", &self.embed)
            .field("links", &self.links)
            .field("parameters", &self.parameters)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("filter", &self.filter)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl Action {
    /// An action with the given method and route pattern.
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// `GET url`
    pub fn get(url: impl Into<String>) -> Self {
        Self::new("GET", url)
    }

    /// `POST url`
    pub fn post(url: impl Into<String>) -> Self {
        Self::new("POST", url)
    }

    /// `PUT url`
    pub fn put(url: impl Into<String>) -> Self {
        Self::new("PUT", url)
    }

    /// `PATCH url`
    pub fn patch(url: impl Into<String>) -> Self {
        Self::new("PATCH", url)
    }

    /// `DELETE url`
    pub fn delete(url: impl Into<String>) -> Self {
        Self::new("DELETE", url)
    }

    pub fn authorize<F>(mut self, f: F) -> Self
    where
        F: Fn(&Envelope, &Value) -> bool + Send + Sync + 'static,
    {
        self.authorize = Some(Arc::new(f));
        self
    }

    pub fn condition<F>(mut self, f: F) -> Self
    where
        F: Fn(&Envelope, &Value) -> bool + Send + Sync + 'static,
    {
        self.condition = Some(Arc::new(f));
        self
    }

    pub fn render(mut self, resource: impl Into<String>, action: impl Into<String>) -> Self {
        self.render = Some(RenderRef {
            resource: resource.into(),
            action: action.into(),
        });
        self
    }

    pub fn embed(mut self, key: impl Into<String>, embed: Embed) -> Self {
        self.embed.insert(key.into(), embed);
        self
    }

    pub fn link(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.links.insert(name.into(), LinkSpec::Template(template.into()));
        self
    }

    pub fn dynamic_link<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Envelope, &Value) -> Option<String> + Send + Sync + 'static,
    {
        self.links.insert(name.into(), LinkSpec::Dynamic(Arc::new(f)));
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), ParameterSpec::Static(value));
        self
    }

    pub fn dynamic_parameter<F>(mut self, name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Envelope, &Value) -> Option<Value> + Send + Sync + 'static,
    {
        self.parameters.insert(name.into(), ParameterSpec::Dynamic(Arc::new(f)));
        self
    }

    pub fn include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn filter<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(f));
        self
    }
}

/// A partial [`Action`] declared for a version.
///
/// Every field is optional. Overlays are merged into the base definition with
/// first-write-wins semantics (see [`crate::version`]), so an overlay can add
/// fields and actions but never change a value that is already set.
#[derive(Clone, Default)]
pub struct ActionOverlay {
    pub method: Option<String>,
    pub url: Option<String>,
    pub authorize: Option<Predicate>,
    pub condition: Option<Predicate>,
    pub render: Option<RenderRef>,
    pub embed: BTreeMap<String, Embed>,
    pub links: BTreeMap<String, LinkSpec>,
    pub parameters: BTreeMap<String, ParameterSpec>,
    pub include: Option<Vec<String>>,
    pub exclude: Option<Vec<String>>,
    pub filter: Option<Vec<String>>,
    pub transform: Option<Transform>,
    /// Removes the action from this version on
    pub deleted: Option<bool>,
}

impl fmt::Debug for ActionOverlay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionOverlay")
            .field("method", &self.method)
            .field("url", &self.url)
            .field("render", &self.render)
            .field("embed", &self.embed)
            .field("links", &self.links)
            .field("parameters", &self.parameters)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("filter", &self.filter)
            .field("deleted", &self.deleted)
            .finish_non_exhaustive()
    }
}

impl ActionOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(method.into());
        self
    }

    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn include<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn exclude<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    pub fn parameter(mut self, name: impl Into<String>, value: Value) -> Self {
        self.parameters.insert(name.into(), ParameterSpec::Static(value));
        self
    }

    pub fn link(mut self, name: impl Into<String>, template: impl Into<String>) -> Self {
        self.links.insert(name.into(), LinkSpec::Template(template.into()));
        self
    }

    pub fn embed(mut self, key: impl Into<String>, embed: Embed) -> Self {
        self.embed.insert(key.into(), embed);
        self
    }

    pub fn authorize<F>(mut self, f: F) -> Self
    where
        F: Fn(&Envelope, &Value) -> bool + Send + Sync + 'static,
    {
        self.authorize = Some(Arc::new(f));
        self
    }

    pub fn transform<F>(mut self, f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        self.transform = Some(Arc::new(f));
        self
    }

    /// Mark the action as removed.
    pub fn deleted(mut self) -> Self {
        self.deleted = Some(true);
        self
    }
}

impl From<Action> for ActionOverlay {
    fn from(action: Action) -> Self {
        Self {
            method: Some(action.method),
            url: Some(action.url),
            authorize: action.authorize,
            condition: action.condition,
            render: action.render,
            embed: action.embed,
            links: action.links,
            parameters: action.parameters,
            include: action.include,
            exclude: action.exclude,
            filter: action.filter,
            transform: action.transform,
            deleted: None,
        }
    }
}

/// Action overlays of one version, keyed by action name.
pub type VersionOverlay = BTreeMap<String, ActionOverlay>;

/// A named resource with its actions, parent edge and version overlays.
#[derive(Debug, Clone)]
pub struct ResourceDefinition {
    pub name: String,
    /// Name of the parent resource, if any
    pub parent: Option<String>,
    /// `false` suppresses the automatic `/name` path segment
    pub resource_prefix: bool,
    /// Own URL prefix, inherited by descendants; `Some("")` clears an inherited one
    pub url_prefix: Option<String>,
    /// Own API prefix, inherited by descendants
    pub api_prefix: Option<String>,
    pub actions: BTreeMap<String, Action>,
    /// Overlays keyed by version number (2 and up)
    pub versions: BTreeMap<u32, VersionOverlay>,
}

impl ResourceDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            resource_prefix: true,
            url_prefix: None,
            api_prefix: None,
            actions: BTreeMap::new(),
            versions: BTreeMap::new(),
        }
    }

    pub fn parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Do not insert `/name` in front of action URLs.
    pub fn without_resource_prefix(mut self) -> Self {
        self.resource_prefix = false;
        self
    }

    pub fn url_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.url_prefix = Some(prefix.into());
        self
    }

    pub fn api_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.api_prefix = Some(prefix.into());
        self
    }

    pub fn action(mut self, name: impl Into<String>, action: Action) -> Self {
        self.actions.insert(name.into(), action);
        self
    }

    /// Add an overlay for `action` at `version`.
    pub fn overlay(
        mut self,
        version: u32,
        action: impl Into<String>,
        overlay: ActionOverlay,
    ) -> Self {
        self.versions.entry(version).or_default().insert(action.into(), overlay);
        self
    }

    pub fn action_mut(&mut self, name: &str) -> Option<&mut Action> {
        self.actions.get_mut(name)
    }
}

/// A validated set of resource definitions.
///
/// Construction checks that names are unique, every parent exists, the parent
/// graph is acyclic, every parent has a `self` action and every version key is 2
/// or greater.
#[derive(Debug, Clone)]
pub struct ResourceSet {
    resources: BTreeMap<String, ResourceDefinition>,
    graph: ResourceGraph,
}

impl ResourceSet {
    pub fn new<I>(definitions: I) -> Result<Self>
    where
        I: IntoIterator<Item = ResourceDefinition>,
    {
        let mut resources = BTreeMap::new();
        for definition in definitions {
            if resources.contains_key(&definition.name) {
                return Err(HyperError::DuplicateResource {
                    name: definition.name,
                });
            }
            resources.insert(definition.name.clone(), definition);
        }

        for definition in resources.values() {
            if let Some(version) = definition.versions.keys().find(|v| **v < 2) {
                return Err(HyperError::InvalidVersion {
                    resource: definition.name.clone(),
                    version: version.to_string(),
                });
            }
        }

        let graph = ResourceGraph::build(&resources)?;

        for definition in resources.values() {
            if let Some(parent) = &definition.parent {
                if !resources[parent].actions.contains_key("self") {
                    return Err(HyperError::MissingSelfAction {
                        resource: parent.clone(),
                        child: definition.name.clone(),
                    });
                }
            }
        }

        tracing::debug!("Validated {} resource definitions", resources.len());
        Ok(Self {
            resources,
            graph,
        })
    }

    pub fn get(&self, name: &str) -> Option<&ResourceDefinition> {
        self.resources.get(name)
    }

    /// Like [`get`](Self::get) but with an error suggesting a similar name.
    pub fn require(&self, name: &str) -> Result<&ResourceDefinition> {
        self.resources.get(name).ok_or_else(|| HyperError::UnknownResource {
            name: name.to_string(),
            suggestion: closest_match(name, self.resources.keys().map(String::as_str)),
        })
    }

    /// Mutable access to an action, used to attach callbacks after loading a document.
    pub fn action_mut(&mut self, resource: &str, action: &str) -> Option<&mut Action> {
        self.resources.get_mut(resource)?.actions.get_mut(action)
    }

    /// Mutable access to a version overlay entry.
    pub fn overlay_mut(
        &mut self,
        resource: &str,
        version: u32,
        action: &str,
    ) -> Option<&mut ActionOverlay> {
        self.resources.get_mut(resource)?.versions.get_mut(&version)?.get_mut(action)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ResourceDefinition)> {
        self.resources.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn graph(&self) -> &ResourceGraph {
        &self.graph
    }

    /// `"1"` plus every declared version key, deduplicated and in numeric order.
    pub fn declared_versions(&self) -> Vec<u32> {
        let mut versions: Vec<u32> = std::iter::once(1)
            .chain(self.resources.values().flat_map(|r| r.versions.keys().copied()))
            .collect();
        versions.sort_unstable();
        versions.dedup();
        versions
    }
}
