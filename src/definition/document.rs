//! Serialized definition documents.
//!
//! The callback-free part of a definition set can be written as a TOML, JSON or
//! YAML document. Callbacks (`authorize`, `condition`, `transform`, dynamic links
//! and parameters) cannot be expressed in a document; attach them to the loaded
//! [`ResourceSet`] with [`ResourceSet::action_mut`].
//!
//! ```toml
//! [render]
//! api_prefix = "/api"
//!
//! [resources.parent.actions.self]
//! method = "GET"
//! url = "/parent/:id"
//!
//! [resources.child]
//! parent = "parent"
//!
//! [resources.child.actions.self]
//! method = "GET"
//! url = "/child/:child.id"
//!
//! [resources.parent.versions.2.self]
//! include = ["id", "title"]
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

use super::{Action, ActionOverlay, Embed, LinkSpec, ParameterSpec, RenderRef, ResourceDefinition, ResourceSet};
use crate::config::RenderConfig;
use crate::core::{HyperError, Result};

/// Serialization format of a definition document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Toml,
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Guess the format from a file extension; `None` for unknown extensions.
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            "yaml" | "yml" => Some(Self::Yaml),
            _ => None,
        }
    }
}

/// A whole definition document: render settings plus resources by name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefinitionDocument {
    pub render: RenderConfig,
    pub resources: BTreeMap<String, ResourceDocument>,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default = "default_true", alias = "resourcePrefix")]
    pub resource_prefix: bool,
    #[serde(default, alias = "urlPrefix", skip_serializing_if = "Option::is_none")]
    pub url_prefix: Option<String>,
    #[serde(default, alias = "apiPrefix", skip_serializing_if = "Option::is_none")]
    pub api_prefix: Option<String>,
    #[serde(default)]
    pub actions: BTreeMap<String, ActionDocument>,
    /// Overlays keyed by version as written (`"2"`, `"3"`, ...)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub versions: BTreeMap<String, BTreeMap<String, OverlayDocument>>,
}

impl Default for ResourceDocument {
    fn default() -> Self {
        Self {
            parent: None,
            resource_prefix: true,
            url_prefix: None,
            api_prefix: None,
            actions: BTreeMap::new(),
            versions: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionDocument {
    pub method: String,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderRef>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub embed: BTreeMap<String, Embed>,
    /// Extra links as route patterns
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, String>,
    /// Static parameters
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayDocument {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub render: Option<RenderRef>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub embed: BTreeMap<String, Embed>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub links: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub parameters: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

fn template_links(links: BTreeMap<String, String>) -> BTreeMap<String, LinkSpec> {
    links.into_iter().map(|(name, url)| (name, LinkSpec::Template(url))).collect()
}

fn static_parameters(parameters: BTreeMap<String, Value>) -> BTreeMap<String, ParameterSpec> {
    parameters.into_iter().map(|(name, value)| (name, ParameterSpec::Static(value))).collect()
}

impl From<ActionDocument> for Action {
    fn from(doc: ActionDocument) -> Self {
        Action {
            method: doc.method,
            url: doc.url,
            render: doc.render,
            embed: doc.embed,
            links: template_links(doc.links),
            parameters: static_parameters(doc.parameters),
            include: doc.include,
            exclude: doc.exclude,
            filter: doc.filter,
            ..Action::default()
        }
    }
}

impl From<OverlayDocument> for ActionOverlay {
    fn from(doc: OverlayDocument) -> Self {
        ActionOverlay {
            method: doc.method,
            url: doc.url,
            render: doc.render,
            embed: doc.embed,
            links: template_links(doc.links),
            parameters: static_parameters(doc.parameters),
            include: doc.include,
            exclude: doc.exclude,
            filter: doc.filter,
            deleted: doc.deleted,
            ..ActionOverlay::default()
        }
    }
}

impl ResourceDocument {
    fn into_definition(self, name: &str) -> Result<ResourceDefinition> {
        let mut definition = ResourceDefinition::new(name);
        definition.parent = self.parent;
        definition.resource_prefix = self.resource_prefix;
        definition.url_prefix = self.url_prefix;
        definition.api_prefix = self.api_prefix;
        definition.actions =
            self.actions.into_iter().map(|(action, doc)| (action, Action::from(doc))).collect();

        for (key, overlays) in self.versions {
            let version = key.trim().parse::<u32>().map_err(|_| HyperError::InvalidVersion {
                resource: name.to_string(),
                version: key.clone(),
            })?;
            let entry = definition.versions.entry(version).or_default();
            for (action, overlay) in overlays {
                entry.insert(action, ActionOverlay::from(overlay));
            }
        }
        Ok(definition)
    }
}

impl DefinitionDocument {
    /// Parse a document from text in the given format.
    ///
    /// `origin` names the source in error messages.
    pub fn parse(content: &str, format: DocumentFormat, origin: &str) -> Result<Self> {
        let parsed = match format {
            DocumentFormat::Toml => toml::from_str(content).map_err(|e| e.to_string()),
            DocumentFormat::Json => serde_json::from_str(content).map_err(|e| e.to_string()),
            DocumentFormat::Yaml => serde_yaml::from_str(content).map_err(|e| e.to_string()),
        };
        parsed.map_err(|reason| HyperError::DefinitionParse {
            file: origin.to_string(),
            reason,
        })
    }

    /// Read and parse a document, picking the format from its extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let source_name = path.display().to_string();
        let format = DocumentFormat::from_path(path).ok_or_else(|| HyperError::DefinitionParse {
            file: source_name.clone(),
            reason: "unsupported extension (expected .toml, .json, .yaml or .yml)".to_string(),
        })?;
        let content = std::fs::read_to_string(path)?;
        let document = Self::parse(&content, format, &source_name)?;
        debug!("Loaded {} resources from {}", document.resources.len(), source_name);
        Ok(document)
    }

    /// Convert and validate the resources into a [`ResourceSet`].
    pub fn resource_set(&self) -> Result<ResourceSet> {
        let definitions = self
            .resources
            .iter()
            .map(|(name, doc)| doc.clone().into_definition(name))
            .collect::<Result<Vec<_>>>()?;
        ResourceSet::new(definitions)
    }
}
