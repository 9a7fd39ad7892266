//! The render cache: compiled link, body and embedding functions per resource action.
//!
//! A [`Renderer`] is built once for a `(definition set, prefix, version)` triple.
//! Building resolves every resource at the requested version, checks cross
//! references, compiles every action URL into a [`UrlTemplate`] and every parent
//! chain into a [`ParentUrlInfo`]. After that the renderer is immutable, so one
//! instance can be shared by reference (or `Arc`) across threads and every render
//! is a lookup plus work proportional to the depth of the data.
//!
//! # Output shape
//!
//! ```text
//! {
//!   ...shaped fields,
//!   "_links":    { "<action or link name>": { "href", "method", "templated"?, "parameters"? } },
//!   "_origin":   { "href", "method" },
//!   "_resource": "<resource>",
//!   "_action":   "<action>",
//!   "_embedded": { "<embed key>": <item or list> }      // only when non-empty
//! }
//! ```
//!
//! A list renders as `{ "_origin": {...}, "<plural of resource>": [ ...items ] }`.
//!
//! # Example
//!
//! ```rust
//! use hal_resource::definition::{Action, ResourceDefinition, ResourceSet};
//! use hal_resource::envelope::Envelope;
//! use hal_resource::graph::Prefix;
//! use hal_resource::render::{RenderOptions, Renderer};
//! use serde_json::json;
//!
//! let set = ResourceSet::new([ResourceDefinition::new("parent")
//!     .action("self", Action::get("/parent/:id"))
//!     .action("list", Action::get("/parent"))])?;
//! let renderer = Renderer::new(&set, Prefix::default(), 1)?;
//!
//! let body = renderer.render_resource(
//!     "parent",
//!     "self",
//!     &Envelope::new(),
//!     &json!({"id": 1, "title": "test"}),
//!     &RenderOptions::new(),
//! )?;
//! assert_eq!(body["_links"]["self"]["href"], "/parent/1");
//! assert_eq!(body["_links"]["list"]["href"], "/parent");
//! # Ok::<(), hal_resource::core::HyperError>(())
//! ```

pub mod body;
pub mod catalog;
pub mod links;
pub mod options;

pub use body::BodyShape;
pub use catalog::HyperResource;
pub use links::{AuthCheck, Gate, Link, Links, Origin, is_truthy, parameter_set};
pub use options::{OptionsDocument, OptionsRequest};

use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, trace};

use crate::core::{HyperError, Result, closest_match};
use crate::definition::{Action, LinkGenerator, LinkSpec, ResourceSet};
use crate::envelope::Envelope;
use crate::graph::{ParentUrlInfo, Prefix, prefix_for, resource_segment};
use crate::pluralize::{EnglishPluralizer, Pluralizer};
use crate::templating::{
    UrlTemplate, collapse_separators, has_placeholder, is_templated, join_segments,
};
use crate::version::{ResolvedResource, resolve};

/// Per-call inputs of a render besides envelope and data.
#[derive(Clone, Copy, Default)]
pub struct RenderOptions<'a> {
    /// Already known parent URL (without prefixes); computed from data when absent
    pub parent_url: Option<&'a str>,
    /// Explicit `_origin` overriding the action's own link
    pub origin: Option<&'a Origin>,
    /// Authorization for actions without their own `authorize`
    pub auth: Option<AuthCheck<'a>>,
}

impl<'a> RenderOptions<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn parent_url(mut self, parent_url: &'a str) -> Self {
        self.parent_url = Some(parent_url);
        self
    }

    pub fn origin(mut self, origin: &'a Origin) -> Self {
        self.origin = Some(origin);
        self
    }

    pub fn auth(mut self, auth: AuthCheck<'a>) -> Self {
        self.auth = Some(auth);
        self
    }
}

#[derive(Clone)]
enum CompiledLink {
    Template(UrlTemplate),
    Dynamic(LinkGenerator),
}

#[derive(Clone)]
struct CompiledAction {
    action: Action,
    identifier: String,
    method: String,
    template: UrlTemplate,
    links: BTreeMap<String, CompiledLink>,
    shape: BodyShape,
}

#[derive(Clone)]
struct CompiledResource {
    resolved: ResolvedResource,
    prefix: Prefix,
    prefix_path: String,
    parent: ParentUrlInfo,
    actions: BTreeMap<String, CompiledAction>,
}

/// Compiled render functions for one definition set, prefix and version.
#[derive(Clone)]
pub struct Renderer {
    version: u32,
    prefix: Prefix,
    resources: BTreeMap<String, CompiledResource>,
    versions: Vec<u32>,
    pluralizer: Arc<dyn Pluralizer>,
}

impl std::fmt::Debug for Renderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("version", &self.version)
            .field("prefix", &self.prefix)
            .field("resources", &self.resources.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Renderer {
    /// Compile `set` for `prefix` and `version`.
    pub fn new(set: &ResourceSet, prefix: Prefix, version: u32) -> Result<Self> {
        if version == 0 {
            return Err(HyperError::InvalidVersion {
                resource: "renderer".to_string(),
                version: version.to_string(),
            });
        }
        let mut resolved = BTreeMap::new();
        for (name, definition) in set.iter() {
            resolved.insert(name.to_string(), resolve(definition, version)?);
        }
        check_references(&resolved)?;

        let graph = set.graph();
        let mut resources = BTreeMap::new();
        for name in graph.topological_order() {
            let Some(resource) = resolved.get(name) else {
                continue;
            };
            let resource_prefix = prefix_for(&resolved, name, &prefix);
            let prefix_path = resource_prefix.combined();
            let parent = ParentUrlInfo::compose(&resolved, name);

            let actions = resource
                .actions
                .iter()
                .map(|(action_name, action)| {
                    (action_name.clone(), compile_action(resource, action_name, action))
                })
                .collect();

            debug!(
                resource = %name,
                depth = graph.depth(name),
                parent_url = %parent.url_path,
                prefix = %prefix_path,
                "compiled resource"
            );
            resources.insert(
                name.to_string(),
                CompiledResource {
                    resolved: resource.clone(),
                    prefix: resource_prefix,
                    prefix_path,
                    parent,
                    actions,
                },
            );
        }

        debug!(
            "Built renderer for {} resources at version {} (prefix '{}')",
            resources.len(),
            version,
            prefix.combined()
        );
        Ok(Self {
            version,
            prefix,
            resources,
            versions: set.declared_versions(),
            pluralizer: Arc::new(EnglishPluralizer),
        })
    }

    /// Replace the pluralizer used for list body keys.
    pub fn with_pluralizer(mut self, pluralizer: Arc<dyn Pluralizer>) -> Self {
        self.pluralizer = pluralizer;
        self
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    /// Resource names in order.
    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// The resource as resolved at this renderer's version.
    pub fn resource(&self, name: &str) -> Result<&ResolvedResource> {
        self.compiled(name).map(|r| &r.resolved)
    }

    fn compiled(&self, name: &str) -> Result<&CompiledResource> {
        self.resources.get(name).ok_or_else(|| HyperError::UnknownResource {
            name: name.to_string(),
            suggestion: closest_match(name, self.resources.keys().map(String::as_str)),
        })
    }

    fn compiled_action<'r>(
        &'r self,
        resource: &str,
        action: &str,
    ) -> Result<(&'r CompiledResource, &'r CompiledAction)> {
        let compiled = self.compiled(resource)?;
        let found = compiled.actions.get(action).ok_or_else(|| HyperError::UnknownAction {
            resource: resource.to_string(),
            action: action.to_string(),
            suggestion: closest_match(action, compiled.actions.keys().map(String::as_str)),
        })?;
        Ok((compiled, found))
    }

    /// Prefixes in effect for `resource`.
    pub fn prefix_for(&self, resource: &str) -> Result<&Prefix> {
        self.compiled(resource).map(|r| &r.prefix)
    }

    /// Composed parent path and tokens of `resource`.
    pub fn parent_url_info(&self, resource: &str) -> Result<&ParentUrlInfo> {
        self.compiled(resource).map(|r| &r.parent)
    }

    /// Parent URL of `resource` filled from `data`; empty for root resources.
    pub fn parent_url(&self, resource: &str, data: &Value) -> Result<String> {
        self.compiled(resource).map(|r| r.parent.render(data, resource))
    }

    fn effective_parent(
        compiled: &CompiledResource,
        name: &str,
        data: &Value,
        parent_url: Option<&str>,
    ) -> String {
        match parent_url.filter(|p| !p.is_empty()) {
            Some(parent_url) => parent_url.to_string(),
            None => compiled.parent.render(data, name),
        }
    }

    fn href(compiled: &CompiledResource, parent: &str, path: &str) -> String {
        join_segments(&[
            compiled.prefix.url_prefix.as_str(),
            compiled.prefix.api_prefix.as_str(),
            parent,
            path,
        ])
    }

    /// Full href of `resource:action` for `data`.
    ///
    /// Tokens without a value stay as `{placeholders}`.
    pub fn url(
        &self,
        resource: &str,
        action: &str,
        data: &Value,
        parent_url: Option<&str>,
    ) -> Result<String> {
        let (compiled, compiled_action) = self.compiled_action(resource, action)?;
        let parent = Self::effective_parent(compiled, resource, data, parent_url);
        Ok(Self::href(compiled, &parent, &compiled_action.template.render(data, resource)))
    }

    /// Href of an action or of a named extra link of `resource`, ungated.
    ///
    /// Action names win over link names. `Ok(None)` when a dynamic link yields no
    /// URL for this data.
    pub fn link_url(
        &self,
        resource: &str,
        name: &str,
        envelope: &Envelope,
        data: &Value,
        parent_url: Option<&str>,
    ) -> Result<Option<String>> {
        let compiled = self.compiled(resource)?;
        if compiled.actions.contains_key(name) {
            return self.url(resource, name, data, parent_url).map(Some);
        }
        let link = compiled.actions.values().find_map(|action| action.links.get(name));
        let Some(link) = link else {
            let names = compiled
                .actions
                .iter()
                .flat_map(|(action, compiled_action)| {
                    std::iter::once(action.as_str()).chain(compiled_action.links.keys().map(String::as_str))
                });
            return Err(HyperError::UnknownAction {
                resource: resource.to_string(),
                action: name.to_string(),
                suggestion: closest_match(name, names),
            });
        };
        let parent = Self::effective_parent(compiled, resource, data, parent_url);
        Ok(Self::link_href(compiled, resource, link, envelope, data, &parent))
    }

    fn link_href(
        compiled: &CompiledResource,
        name: &str,
        link: &CompiledLink,
        envelope: &Envelope,
        data: &Value,
        parent: &str,
    ) -> Option<String> {
        let path = match link {
            CompiledLink::Template(template) => template.render(data, name),
            CompiledLink::Dynamic(generate) => {
                let url = collapse_separators(&generate(envelope, data)?);
                if is_templated(&url) {
                    UrlTemplate::compile(&url, name).render(data, name)
                } else {
                    url
                }
            }
        };
        if path.is_empty() {
            None
        } else {
            Some(Self::href(compiled, parent, &path))
        }
    }

    fn gated_links(
        &self,
        resource: &str,
        action: &str,
        envelope: &Envelope,
        data: &Value,
        options: &RenderOptions<'_>,
        gate: Gate,
    ) -> Result<Links> {
        let (compiled, compiled_action) = self.compiled_action(resource, action)?;
        let mut links = Links::new();
        let identifier = &compiled_action.identifier;
        if !gate.allows(identifier, &compiled_action.action, envelope, data, options.auth) {
            trace!(action = %identifier, "link gated off");
            return Ok(links);
        }

        let parent = Self::effective_parent(compiled, resource, data, options.parent_url);
        let parameters = parameter_set(&compiled_action.action, envelope, data);
        let make_link = |href: String| Link {
            templated: has_placeholder(&href),
            href,
            method: compiled_action.method.clone(),
            parameters: parameters.clone(),
        };

        for (link_name, link) in &compiled_action.links {
            if let Some(href) = Self::link_href(compiled, resource, link, envelope, data, &parent) {
                links.insert(link_name.clone(), make_link(href));
            }
        }
        let own = Self::href(compiled, &parent, &compiled_action.template.render(data, resource));
        links.insert(action.to_string(), make_link(own));
        Ok(links)
    }

    /// Links of one action: its own link plus its extra named links.
    ///
    /// Empty when the action's condition or authorization fails.
    pub fn links(
        &self,
        resource: &str,
        action: &str,
        envelope: &Envelope,
        data: &Value,
        options: &RenderOptions<'_>,
    ) -> Result<Links> {
        self.gated_links(resource, action, envelope, data, options, Gate::Render)
    }

    /// Shaped body of `data` for `resource:action`, without links.
    pub fn body(&self, resource: &str, action: &str, data: &Value) -> Result<Value> {
        let (_, compiled_action) = self.compiled_action(resource, action)?;
        Ok(compiled_action.shape.apply(data))
    }

    /// Ungated `{href, method}` of `resource:action` rendered without data.
    pub fn origin(&self, resource: &str, action: &str, parent_url: Option<&str>) -> Result<Origin> {
        let (_, compiled_action) = self.compiled_action(resource, action)?;
        let href = self.url(resource, action, &json!({}), parent_url)?;
        Ok(Origin::new(href, compiled_action.method.clone()))
    }

    /// Render one item: shaped fields, `_links`, `_origin`, `_resource`, `_action`
    /// and `_embedded`.
    pub fn render_resource(
        &self,
        resource: &str,
        action: &str,
        envelope: &Envelope,
        data: &Value,
        options: &RenderOptions<'_>,
    ) -> Result<Value> {
        let (compiled, compiled_action) = self.compiled_action(resource, action)?;

        let mut links = self.links(resource, action, envelope, data, options)?;
        let origin = match options.origin {
            Some(origin) => Some(origin.clone()),
            None => links.get(action).map(Origin::from),
        };
        for other in compiled.actions.keys().filter(|name| name.as_str() != action) {
            let extra = self.gated_links(resource, other, envelope, data, options, Gate::Render)?;
            for (name, link) in extra {
                links.entry(name).or_insert(link);
            }
        }

        let own_href = links
            .get("self")
            .or_else(|| links.get(action))
            .map(|link| link.href.clone())
            .unwrap_or_default();
        let embedded =
            self.render_embedded(compiled, compiled_action, &own_href, envelope, data, options)?;

        let mut body = match compiled_action.shape.apply(data) {
            Value::Object(fields) => fields,
            _ => Map::new(),
        };
        body.insert("_links".to_string(), serde_json::to_value(&links)?);
        if let Some(origin) = origin {
            body.insert("_origin".to_string(), serde_json::to_value(origin)?);
        }
        body.insert("_resource".to_string(), Value::String(resource.to_string()));
        body.insert("_action".to_string(), Value::String(action.to_string()));
        if !embedded.is_empty() {
            body.insert("_embedded".to_string(), Value::Object(embedded));
        }
        Ok(Value::Object(body))
    }

    fn render_embedded(
        &self,
        compiled: &CompiledResource,
        compiled_action: &CompiledAction,
        own_href: &str,
        envelope: &Envelope,
        data: &Value,
        options: &RenderOptions<'_>,
    ) -> Result<Map<String, Value>> {
        let mut embedded = Map::new();
        for (key, embed) in &compiled_action.action.embed {
            let Some(child_data) = data.get(key).filter(|v| is_truthy(v)) else {
                continue;
            };

            let child_has_parent = self.compiled(&embed.resource)?.resolved.parent.is_some();
            let inherited = if child_has_parent {
                strip_prefix(own_href, &compiled.prefix_path)
            } else {
                String::new()
            };
            let child_options = RenderOptions {
                parent_url: Some(inherited.as_str()),
                origin: None,
                auth: options.auth,
            };

            let render_item = |item: &Value| -> Result<Value> {
                let mut rendered =
                    self.render_resource(&embed.resource, &embed.render, envelope, item, &child_options)?;
                if let Some(keep) = &embed.actions {
                    if let Some(Value::Object(item_links)) = rendered.get_mut("_links") {
                        item_links.retain(|name, _| keep.iter().any(|k| k == name));
                    }
                }
                Ok(rendered)
            };

            match child_data {
                Value::Array(items) => {
                    if items.is_empty() {
                        continue;
                    }
                    let rendered = items.iter().map(&render_item).collect::<Result<Vec<_>>>()?;
                    embedded.insert(key.clone(), Value::Array(rendered));
                }
                item => {
                    embedded.insert(key.clone(), render_item(item)?);
                }
            }
        }
        Ok(embedded)
    }

    /// Render a homogeneous list under the plural of the rendered resource.
    ///
    /// Items are rendered through the action's `render` target when it declares
    /// one, otherwise through `resource:action` itself.
    pub fn render_list(
        &self,
        resource: &str,
        action: &str,
        envelope: &Envelope,
        items: &[Value],
        options: &RenderOptions<'_>,
    ) -> Result<Value> {
        let (_, compiled_action) = self.compiled_action(resource, action)?;
        let (item_resource, item_action) = match &compiled_action.action.render {
            Some(target) => (target.resource.as_str(), target.action.as_str()),
            None => (resource, action),
        };
        let key = self.pluralizer.plural(item_resource);

        let item_options = RenderOptions {
            parent_url: options.parent_url,
            origin: None,
            auth: options.auth,
        };
        let list = items
            .iter()
            .map(|item| self.render_resource(item_resource, item_action, envelope, item, &item_options))
            .collect::<Result<Vec<_>>>()?;

        let origin = match options.origin {
            Some(origin) => origin.clone(),
            None => self.origin(resource, action, options.parent_url)?,
        };

        let mut body = Map::new();
        body.insert("_origin".to_string(), serde_json::to_value(origin)?);
        body.insert(key, Value::Array(list));
        Ok(Value::Object(body))
    }

    /// Render `data` as a list when it is an array, as a single item otherwise.
    pub fn render(
        &self,
        resource: &str,
        action: &str,
        envelope: &Envelope,
        data: &Value,
        options: &RenderOptions<'_>,
    ) -> Result<Value> {
        match data {
            Value::Array(items) => self.render_list(resource, action, envelope, items, options),
            _ => self.render_resource(resource, action, envelope, data, options),
        }
    }
}

fn compile_action(resource: &ResolvedResource, name: &str, action: &Action) -> CompiledAction {
    let own = collapse_separators(&action.url);
    let pattern = format!("{}{own}", resource_segment(&own, resource));
    let links = action
        .links
        .iter()
        .map(|(link_name, spec)| {
            let compiled = match spec {
                LinkSpec::Template(template) => {
                    CompiledLink::Template(UrlTemplate::compile(template, &resource.name))
                }
                LinkSpec::Dynamic(generate) => CompiledLink::Dynamic(Arc::clone(generate)),
            };
            (link_name.clone(), compiled)
        })
        .collect();

    CompiledAction {
        identifier: format!("{}:{name}", resource.name),
        method: action.method.to_uppercase(),
        template: UrlTemplate::compile(&pattern, &resource.name),
        links,
        shape: BodyShape::for_action(action),
        action: action.clone(),
    }
}

/// Remove the first occurrence of `prefix` from `href`.
fn strip_prefix(href: &str, prefix: &str) -> String {
    if prefix.is_empty() || prefix == "/" {
        href.to_string()
    } else {
        href.replacen(prefix, "", 1)
    }
}

/// Every `render` and `embed` target must exist at the resolved version.
fn check_references(resources: &BTreeMap<String, ResolvedResource>) -> Result<()> {
    let exists = |resource: &str, action: &str| {
        resources.get(resource).is_some_and(|r| r.actions.contains_key(action))
    };
    for (name, resource) in resources {
        // An overlay may delete a parent's `self` even though the base declares one.
        if let Some(parent) = &resource.parent {
            if resources.get(parent).is_some_and(|p| !p.actions.contains_key("self")) {
                return Err(HyperError::MissingSelfAction {
                    resource: parent.clone(),
                    child: name.clone(),
                });
            }
        }
        for (action_name, action) in &resource.actions {
            let from = format!("{name}:{action_name}");
            if let Some(target) = &action.render {
                if !exists(&target.resource, &target.action) {
                    return Err(HyperError::BrokenReference {
                        from,
                        to: format!("{}:{}", target.resource, target.action),
                    });
                }
            }
            for embed in action.embed.values() {
                if !exists(&embed.resource, &embed.render) {
                    return Err(HyperError::BrokenReference {
                        from,
                        to: format!("{}:{}", embed.resource, embed.render),
                    });
                }
            }
        }
    }
    Ok(())
}
