//! Render a JSON data file through a resource action.

use anyhow::{Context, Result};
use clap::Args;
use serde_json::Value;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::DefinitionArgs;
use crate::envelope::Envelope;
use crate::render::{HyperResource, Origin, RenderOptions};

#[derive(Args, Debug)]
pub struct RenderCommand {
    #[command(flatten)]
    pub definitions: DefinitionArgs,

    /// Resource to render
    #[arg(short, long)]
    pub resource: String,

    /// Action to render through
    #[arg(short, long, default_value = "self")]
    pub action: String,

    /// JSON data file; an array renders as a list. Reads stdin when omitted or `-`
    #[arg(long, value_name = "FILE")]
    pub data: Option<PathBuf>,

    /// JSON envelope file (user, context, data, params...)
    #[arg(long, value_name = "FILE")]
    pub envelope: Option<PathBuf>,

    /// Parent URL to use instead of composing it from the data
    #[arg(long)]
    pub parent_url: Option<String>,

    /// Explicit `_origin` href
    #[arg(long, requires = "origin_method")]
    pub origin_href: Option<String>,

    /// Explicit `_origin` method
    #[arg(long, requires = "origin_href")]
    pub origin_method: Option<String>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

fn read_json(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {}", path.display()))
}

impl RenderCommand {
    pub fn execute(self) -> Result<()> {
        let data = match self.data.as_deref() {
            Some(path) if path != Path::new("-") => read_json(path)?,
            _ => {
                let mut content = String::new();
                std::io::stdin().read_to_string(&mut content)?;
                serde_json::from_str(&content).context("Invalid JSON on stdin")?
            }
        };
        let body = self.render(&data)?;
        let output =
            if self.compact { serde_json::to_string(&body)? } else { serde_json::to_string_pretty(&body)? };
        println!("{output}");
        Ok(())
    }

    /// Render `data` with the loaded definitions.
    pub fn render(&self, data: &Value) -> Result<Value> {
        let (set, config) = self.definitions.load_set()?;
        let envelope = match &self.envelope {
            Some(path) => serde_json::from_value::<Envelope>(read_json(path)?)
                .with_context(|| format!("Invalid envelope in {}", path.display()))?,
            None => Envelope::new(),
        };
        let origin = match (&self.origin_href, &self.origin_method) {
            (Some(href), Some(method)) => Some(Origin::new(href.clone(), method.to_uppercase())),
            _ => None,
        };

        let mut options = RenderOptions::new();
        if let Some(parent_url) = &self.parent_url {
            options = options.parent_url(parent_url);
        }
        if let Some(origin) = &origin {
            options = options.origin(origin);
        }

        let catalog = HyperResource::new(set);
        let renderer = catalog.renderer(&config.prefix(), config.version)?;
        Ok(renderer.render(&self.resource, &self.action, &envelope, data, &options)?)
    }
}
