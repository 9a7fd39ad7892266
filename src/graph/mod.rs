//! Resource graph: parent edges, inherited prefixes and composed parent URLs.
//!
//! Parent relationships form a forest. [`ResourceGraph`] holds them as a petgraph
//! `DiGraph` with an edge from every child to its parent, which lets construction
//! reject unknown parents and cycles before anything is rendered.
//!
//! Two derived values depend on the ancestor chain:
//!
//! - [`Prefix`]: URL and API prefixes, inherited from the nearest ancestor that
//!   declares them (see [`prefix_for`]).
//! - [`ParentUrlInfo`]: the HAL path of every ancestor's `self` action joined root to
//!   leaf, with the tokens needed to fill it from the child's flat data.

use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};

use crate::core::{HyperError, Result};
use crate::definition::ResourceDefinition;
use crate::templating::{PathToken, collapse_separators, join_segments, substitute, to_hal, tokenize};
use crate::version::ResolvedResource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

/// Parent edges of a definition set.
#[derive(Debug, Clone)]
pub struct ResourceGraph {
    graph: DiGraph<String, ()>,
    nodes: HashMap<String, NodeIndex>,
}

impl ResourceGraph {
    /// Build the graph, failing on unknown parents or parent cycles.
    pub fn build(resources: &BTreeMap<String, ResourceDefinition>) -> Result<Self> {
        let mut graph = DiGraph::new();
        let mut nodes = HashMap::new();
        for name in resources.keys() {
            nodes.insert(name.clone(), graph.add_node(name.clone()));
        }

        for definition in resources.values() {
            if let Some(parent) = &definition.parent {
                let Some(&parent_idx) = nodes.get(parent) else {
                    return Err(HyperError::UnknownParent {
                        resource: definition.name.clone(),
                        parent: parent.clone(),
                    });
                };
                let child_idx = nodes[&definition.name];
                graph.add_edge(child_idx, parent_idx, ());
            }
        }

        let built = Self {
            graph,
            nodes,
        };
        built.detect_cycles()?;
        Ok(built)
    }

    fn detect_cycles(&self) -> Result<()> {
        let mut colors: HashMap<NodeIndex, Color> =
            self.graph.node_indices().map(|n| (n, Color::White)).collect();
        let mut path = Vec::new();

        for node in self.graph.node_indices() {
            if colors.get(&node) == Some(&Color::White) {
                if let Some(cycle) = self.dfs_visit(node, &mut colors, &mut path) {
                    return Err(HyperError::CircularParent {
                        chain: cycle.join(" → "),
                    });
                }
            }
        }
        Ok(())
    }

    fn dfs_visit(
        &self,
        node: NodeIndex,
        colors: &mut HashMap<NodeIndex, Color>,
        path: &mut Vec<NodeIndex>,
    ) -> Option<Vec<String>> {
        colors.insert(node, Color::Gray);
        path.push(node);

        for next in self.graph.neighbors(node) {
            match colors.get(&next) {
                Some(Color::Gray) => {
                    let start = path.iter().position(|n| *n == next).unwrap_or(0);
                    let mut cycle: Vec<String> =
                        path[start..].iter().map(|n| self.graph[*n].clone()).collect();
                    cycle.push(self.graph[next].clone());
                    return Some(cycle);
                }
                Some(Color::White) => {
                    if let Some(cycle) = self.dfs_visit(next, colors, path) {
                        return Some(cycle);
                    }
                }
                _ => {}
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }

    /// Direct parent of `name`.
    pub fn parent_of(&self, name: &str) -> Option<&str> {
        let idx = *self.nodes.get(name)?;
        self.graph.neighbors(idx).next().map(|p| self.graph[p].as_str())
    }

    /// Ancestors of `name`, nearest first.
    pub fn ancestors(&self, name: &str) -> Vec<&str> {
        let mut chain = Vec::new();
        let mut current = self.parent_of(name);
        while let Some(parent) = current {
            chain.push(parent);
            current = self.parent_of(parent);
        }
        chain
    }

    /// Number of ancestors of `name`.
    pub fn depth(&self, name: &str) -> usize {
        self.ancestors(name).len()
    }

    /// Every resource with ancestors ahead of their descendants.
    pub fn topological_order(&self) -> Vec<&str> {
        match toposort(&self.graph, None) {
            Ok(order) => order.into_iter().rev().map(|n| self.graph[n].as_str()).collect(),
            Err(_) => Vec::new(),
        }
    }
}

/// URL and API prefixes applied in front of every href of a resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Prefix {
    pub url_prefix: String,
    pub api_prefix: String,
}

impl Prefix {
    pub fn new(url_prefix: impl Into<String>, api_prefix: impl Into<String>) -> Self {
        Self {
            url_prefix: url_prefix.into(),
            api_prefix: api_prefix.into(),
        }
    }

    /// `url_prefix` followed by `api_prefix`, with doubled separators collapsed.
    pub fn combined(&self) -> String {
        join_segments(&[self.url_prefix.as_str(), self.api_prefix.as_str()])
    }
}

/// Prefixes in effect for `name`.
///
/// Starts from `base` and walks the parent chain root to leaf; each level replaces
/// only the prefixes it declares itself (an explicit empty string included).
pub fn prefix_for(
    resources: &BTreeMap<String, ResolvedResource>,
    name: &str,
    base: &Prefix,
) -> Prefix {
    let mut lineage = Vec::new();
    let mut current = resources.get(name);
    while let Some(resource) = current {
        if lineage.len() > resources.len() {
            break;
        }
        lineage.push(resource);
        current = resource.parent.as_deref().and_then(|p| resources.get(p));
    }

    let mut prefix = base.clone();
    for resource in lineage.into_iter().rev() {
        if let Some(url_prefix) = &resource.url_prefix {
            prefix.url_prefix.clone_from(url_prefix);
        }
        if let Some(api_prefix) = &resource.api_prefix {
            prefix.api_prefix.clone_from(api_prefix);
        }
    }
    prefix
}

/// The `/name` path segment inserted in front of `url` for `resource`.
///
/// Empty when the resource opts out or `url` already contains `/name`.
pub fn resource_segment(url: &str, resource: &ResolvedResource) -> String {
    let segment = format!("/{}", resource.name);
    if !resource.resource_prefix || url.contains(&segment) {
        String::new()
    } else {
        segment
    }
}

/// Composed HAL path of a resource's ancestors and the tokens that fill it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParentUrlInfo {
    /// Ancestors' `self` paths joined root to leaf, e.g. `/parent/{id}/child/{child.id}`
    pub url_path: String,
    /// Tokens of `url_path` in order, each tagged with the ancestor owning it
    pub tokens: Vec<PathToken>,
}

impl ParentUrlInfo {
    /// Compose the parent URL of `name` from the `self` actions of its ancestors.
    ///
    /// A root resource yields an empty path and no tokens. Callers reject parents
    /// without a `self` action before composing.
    pub fn compose(resources: &BTreeMap<String, ResolvedResource>, name: &str) -> Self {
        let mut segments = Vec::new();
        let mut tokens = Vec::new();

        let mut current = resources.get(name).and_then(|r| r.parent.as_deref());
        while let Some(parent_name) = current {
            if segments.len() > resources.len() {
                break;
            }
            let Some(parent) = resources.get(parent_name) else {
                break;
            };
            let Some(self_action) = parent.actions.get("self") else {
                break;
            };

            let own = collapse_separators(&self_action.url);
            let hal = to_hal(&format!("{}{own}", resource_segment(&own, parent)));
            let mut level_tokens = tokenize(&hal, parent_name);
            for token in &mut level_tokens {
                token.retag(parent_name);
            }

            segments.push(hal);
            tokens.push(level_tokens);
            current = parent.parent.as_deref();
        }

        segments.reverse();
        tokens.reverse();
        Self {
            url_path: join_segments(&segments),
            tokens: tokens.into_iter().flatten().collect(),
        }
    }

    /// Whether `name` has no ancestors.
    pub fn is_empty(&self) -> bool {
        self.url_path.is_empty()
    }

    /// Fill the path from `data` on behalf of `resource_name`.
    pub fn render(&self, data: &Value, resource_name: &str) -> String {
        if self.tokens.is_empty() {
            self.url_path.clone()
        } else {
            substitute(&self.tokens, &self.url_path, data, resource_name)
        }
    }
}
