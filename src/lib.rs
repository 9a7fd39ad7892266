//! hal-resource - versioned HAL hypermedia from declarative resource definitions
//!
//! Applications describe their API as a graph of resources. Each resource has
//! named actions (HTTP method plus route pattern), an optional parent, optional
//! URL/API prefixes and optional version overlays. From those definitions the
//! crate produces:
//!
//! - HAL-style bodies: shaped domain data with `_links`, `_origin`, `_resource`,
//!   `_action` and `_embedded` children
//! - list bodies keyed by the plural of the rendered resource
//! - discovery (OPTIONS) documents listing every reachable action as a
//!   `resource:action` link
//!
//! Routing, persistence and HTTP handling stay with the host application; the
//! crate only turns definitions, a request [`envelope::Envelope`] and domain data
//! into JSON.
//!
//! # Modules
//!
//! - [`templating`] - route patterns, path tokens and URL substitution
//! - [`definition`] - typed definitions, the validated [`definition::ResourceSet`]
//!   and serialized documents
//! - [`version`] - overlay merging and per-version resolution
//! - [`graph`] - parent graph, prefix inheritance and parent URL composition
//! - [`render`] - the compiled [`render::Renderer`], options documents and the
//!   memoizing [`render::HyperResource`] catalog
//! - [`envelope`] - the normalized request context
//! - [`pluralize`] - list key inflection
//! - [`config`] - render settings and environment overrides
//! - [`core`] - error types and CLI error reporting
//! - [`cli`] - the `hal-resource` binary
//!
//! # Example
//!
//! ```rust
//! use hal_resource::definition::{Action, ResourceDefinition, ResourceSet};
//! use hal_resource::envelope::Envelope;
//! use hal_resource::graph::Prefix;
//! use hal_resource::render::{HyperResource, OptionsRequest, RenderOptions};
//! use serde_json::json;
//!
//! let catalog = HyperResource::new(ResourceSet::new([
//!     ResourceDefinition::new("parent")
//!         .action("self", Action::get("/parent/:id"))
//!         .action("list", Action::get("/parent")),
//!     ResourceDefinition::new("child")
//!         .parent("parent")
//!         .action("self", Action::get("/child/:child.id")),
//! ])?);
//! let renderer = catalog.renderer(&Prefix::new("", "/api"), 1)?;
//!
//! let child = renderer.render_resource(
//!     "child",
//!     "self",
//!     &Envelope::new(),
//!     &json!({"id": 2, "parentId": 1}),
//!     &RenderOptions::new(),
//! )?;
//! assert_eq!(child["_links"]["self"]["href"], "/api/parent/1/child/2");
//!
//! let options = renderer.options(&OptionsRequest::new())?;
//! assert_eq!(options.links["child:self"].href, "/api/parent/{parentId}/child/{id}");
//! # Ok::<(), hal_resource::core::HyperError>(())
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod definition;
pub mod envelope;
pub mod graph;
pub mod pluralize;
pub mod render;
pub mod templating;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
