//! Print the discovery document of a definition set.

use anyhow::Result;
use clap::Args;
use tracing::debug;

use super::DefinitionArgs;
use crate::render::{HyperResource, OptionsDocument, OptionsRequest};

/// Print the OPTIONS document for the configured prefix and version.
#[derive(Args, Debug)]
pub struct OptionsCommand {
    #[command(flatten)]
    pub definitions: DefinitionArgs,

    /// Only list resources without a parent
    #[arg(long)]
    pub exclude_children: bool,

    /// Reveal every action regardless of authorization
    #[arg(long)]
    pub full: bool,

    /// Media type to advertise (repeatable; replaces the document's list)
    #[arg(long = "media-type", value_name = "TYPE")]
    pub media_types: Vec<String>,

    /// Print compact JSON instead of pretty-printed
    #[arg(long)]
    pub compact: bool,
}

impl OptionsCommand {
    pub fn execute(self) -> Result<()> {
        let document = self.build()?;
        let output = if self.compact {
            serde_json::to_string(&document)?
        } else {
            serde_json::to_string_pretty(&document)?
        };
        println!("{output}");
        Ok(())
    }

    /// Load the definitions and build the document without printing it.
    pub fn build(&self) -> Result<OptionsDocument> {
        let (set, config) = self.definitions.load_set()?;
        let media_types =
            if self.media_types.is_empty() { config.media_types.clone() } else { self.media_types.clone() };
        let exclude_children = self.exclude_children || config.exclude_children;
        let full = self.full || config.full_options;

        let catalog = HyperResource::new(set);
        let renderer = catalog.renderer(&config.prefix(), config.version)?;
        debug!(version = config.version, full, exclude_children, "rendering options");

        let request = OptionsRequest::new()
            .media_types(&media_types)
            .exclude_children(exclude_children)
            .full(full);
        Ok(renderer.options(&request)?)
    }
}
