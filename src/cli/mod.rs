//! Command-line interface for hal-resource.
//!
//! The binary loads a definition document (TOML, JSON or YAML) and renders from it.
//! Documents cannot carry callbacks, so the CLI renders with every action
//! authorized and visible.
//!
//! # Available Commands
//!
//! - `options` - Print the discovery document of every reachable action
//! - `render` - Render a JSON data file as a resource or list body
//! - `validate` - Check a definition document and resolve every version
//!
//! # Examples
//!
//! ```bash
//! # Discovery document at version 2 under /api
//! hal-resource options -d resources.toml --api-prefix /api --api-version 2
//!
//! # Render a record
//! hal-resource render -d resources.toml --resource parent --action self --data parent.json
//!
//! # Check the document in CI
//! hal-resource validate -d resources.toml --format json
//! ```
//!
//! # Configuration Precedence
//!
//! Render settings come from the `[render]` table of the document, then the
//! `HAL_RESOURCE_*` environment variables (see [`crate::config`]), then the
//! command-line flags, each layer overriding the previous one.

mod options;
mod render;
mod validate;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use crate::config::RenderConfig;
use crate::definition::ResourceSet;
use crate::definition::document::DefinitionDocument;

pub use options::OptionsCommand;
pub use render::RenderCommand;
pub use validate::{OutputFormat, ValidateCommand, ValidationResults};

/// Runtime settings derived from global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// Default tracing filter; `None` disables logging.
    ///
    /// `RUST_LOG` takes precedence when set.
    pub log_level: Option<String>,
}

impl CliConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the global tracing subscriber, writing to stderr.
    ///
    /// Only the first call in a process installs anything.
    pub fn init_logging(&self) {
        let Some(level) = &self.log_level else {
            return;
        };
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }
}

/// Render HAL hypermedia documents from declarative resource definitions.
#[derive(Parser, Debug)]
#[command(
    name = "hal-resource",
    about = "Render versioned HAL documents from resource definitions",
    version,
    long_about = "hal-resource compiles a resource definition document and renders discovery \
                  documents and HAL bodies from it."
)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Show debug logging (equivalent to RUST_LOG=debug)
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    /// Suppress everything but the command's output and errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the discovery (OPTIONS) document
    Options(OptionsCommand),

    /// Render a data file through a resource action
    Render(RenderCommand),

    /// Validate a definition document
    Validate(ValidateCommand),
}

/// Arguments shared by every command that loads definitions.
#[derive(Args, Debug, Clone)]
pub struct DefinitionArgs {
    /// Definition document (.toml, .json, .yaml or .yml)
    #[arg(short, long, env = "HAL_RESOURCE_DEFINITIONS", default_value = "resources.toml")]
    pub definitions: PathBuf,

    /// URL prefix in front of every href
    #[arg(long)]
    pub url_prefix: Option<String>,

    /// API prefix after the URL prefix
    #[arg(long)]
    pub api_prefix: Option<String>,

    /// API version to render
    #[arg(long = "api-version", value_parser = clap::value_parser!(u32).range(1..))]
    pub version: Option<u32>,
}

impl DefinitionArgs {
    /// Load the document and its effective render settings.
    pub fn load(&self) -> Result<(DefinitionDocument, RenderConfig)> {
        let document = DefinitionDocument::from_path(&self.definitions).with_context(|| {
            format!("Failed to load definitions from {}", self.definitions.display())
        })?;
        let config = self.apply(document.render.clone().with_env());
        Ok((document, config))
    }

    /// Load and validate into a [`ResourceSet`].
    pub fn load_set(&self) -> Result<(ResourceSet, RenderConfig)> {
        let (document, config) = self.load()?;
        Ok((document.resource_set()?, config))
    }

    /// Overlay explicit flags on `config`.
    pub fn apply(&self, mut config: RenderConfig) -> RenderConfig {
        if let Some(url_prefix) = &self.url_prefix {
            config.url_prefix.clone_from(url_prefix);
        }
        if let Some(api_prefix) = &self.api_prefix {
            config.api_prefix.clone_from(api_prefix);
        }
        if let Some(version) = self.version {
            config.version = version;
        }
        config
    }
}

impl Cli {
    /// Run the parsed command with configuration derived from the flags.
    pub fn execute(self) -> Result<()> {
        let config = self.build_config();
        self.execute_with_config(config)
    }

    /// `--verbose` maps to `debug`, `--quiet` disables logging, otherwise `info`.
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            Some("debug".to_string())
        } else if self.quiet {
            None
        } else {
            Some("info".to_string())
        };
        CliConfig {
            log_level,
        }
    }

    /// Run with an explicit configuration.
    pub fn execute_with_config(self, config: CliConfig) -> Result<()> {
        config.init_logging();
        match self.command {
            Commands::Options(cmd) => cmd.execute(),
            Commands::Render(cmd) => cmd.execute(),
            Commands::Validate(cmd) => cmd.execute(),
        }
    }
}
