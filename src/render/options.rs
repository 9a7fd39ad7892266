//! Discovery documents listing every action a client can reach.

use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;

use super::{AuthCheck, Gate, Link, RenderOptions, Renderer};
use crate::core::Result;
use crate::envelope::Envelope;

/// Parameters of an options render.
#[derive(Clone, Copy, Default)]
pub struct OptionsRequest<'a> {
    /// Media types advertised in `_mediaTypes`
    pub media_types: &'a [String],
    /// Only enumerate resources without a parent
    pub exclude_children: bool,
    /// Reveal every action regardless of authorization
    pub full: bool,
    /// Authorization for actions without their own `authorize`
    pub auth: Option<AuthCheck<'a>>,
}

impl<'a> OptionsRequest<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn media_types(mut self, media_types: &'a [String]) -> Self {
        self.media_types = media_types;
        self
    }

    pub fn exclude_children(mut self, exclude: bool) -> Self {
        self.exclude_children = exclude;
        self
    }

    pub fn full(mut self, full: bool) -> Self {
        self.full = full;
        self
    }

    pub fn auth(mut self, auth: AuthCheck<'a>) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// `{_mediaTypes, _versions, _links}` with links keyed `resource:action`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OptionsDocument {
    #[serde(rename = "_mediaTypes")]
    pub media_types: Vec<String>,
    #[serde(rename = "_versions")]
    pub versions: Vec<String>,
    #[serde(rename = "_links")]
    pub links: BTreeMap<String, Link>,
}

impl Renderer {
    /// Build the discovery document.
    ///
    /// Every action is rendered once with an empty envelope and empty data.
    /// Conditions are not evaluated; authorization is, unless `request.full` is set.
    /// Unresolved tokens stay as `{placeholders}`, so most links come out templated.
    pub fn options(&self, request: &OptionsRequest<'_>) -> Result<OptionsDocument> {
        let envelope = Envelope::new();
        let data = json!({});
        let gate = Gate::Discovery {
            skip_auth: request.full,
        };
        let render_options = RenderOptions {
            parent_url: None,
            origin: None,
            auth: request.auth,
        };

        let mut links = BTreeMap::new();
        for (name, compiled) in &self.resources {
            if request.exclude_children && compiled.resolved.parent.is_some() {
                continue;
            }
            for action in compiled.actions.keys() {
                let mut rendered =
                    self.gated_links(name, action, &envelope, &data, &render_options, gate)?;
                if let Some(link) = rendered.remove(action) {
                    links.insert(format!("{name}:{action}"), link);
                }
            }
        }

        tracing::debug!(
            links = links.len(),
            full = request.full,
            exclude_children = request.exclude_children,
            "rendered options document"
        );
        Ok(OptionsDocument {
            media_types: request.media_types.to_vec(),
            versions: self.versions.iter().map(u32::to_string).collect(),
            links,
        })
    }
}
