//! Validate a definition document.
//!
//! Validation loads the document, builds the resource set (names, parents,
//! cycles, version keys) and then compiles a renderer at every declared version,
//! which resolves overlays and checks `render`/`embed` references.
//!
//! ```text
//! ✓ Valid definitions: 3 resources, versions 1, 2
//! ⚠ Warning: Resource 'audit' has no self action
//! ```

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::DefinitionArgs;
use crate::definition::ResourceSet;
use crate::graph::Prefix;
use crate::render::Renderer;

/// Output format of `validate`.
#[derive(Clone, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Colored text with ✓, ✗ and ⚠ markers
    Text,
    /// A single [`ValidationResults`] JSON object
    Json,
}

/// Outcome of a validation run, also the JSON output format.
#[derive(Debug, Default, Serialize)]
pub struct ValidationResults {
    /// No errors (and, in strict mode, no warnings)
    pub valid: bool,
    /// Number of resources in the document
    pub resources: usize,
    /// Versions that compiled
    pub versions: Vec<u32>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Args, Debug)]
pub struct ValidateCommand {
    #[command(flatten)]
    pub definitions: DefinitionArgs,

    /// Output format
    #[arg(long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Treat warnings as errors
    #[arg(long)]
    pub strict: bool,
}

fn warnings_for(set: &ResourceSet) -> Vec<String> {
    let mut warnings = Vec::new();
    for (name, definition) in set.iter() {
        if definition.actions.is_empty() {
            warnings.push(format!("Resource '{name}' has no actions"));
        } else if !definition.actions.contains_key("self") {
            warnings.push(format!("Resource '{name}' has no self action"));
        }
        for (action_name, action) in &definition.actions {
            if action.url.trim().is_empty() {
                warnings.push(format!("Action '{name}:{action_name}' has an empty url"));
            }
        }
    }
    warnings
}

impl ValidateCommand {
    pub fn execute(self) -> Result<()> {
        let results = self.validate();
        match self.format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
            OutputFormat::Text => {
                for error in &results.errors {
                    println!("{} {}", "✗".red(), error);
                }
                for warning in &results.warnings {
                    println!("{} Warning: {}", "⚠".yellow(), warning);
                }
                if results.valid {
                    let versions: Vec<String> = results.versions.iter().map(u32::to_string).collect();
                    println!(
                        "{} Valid definitions: {} resources, versions {}",
                        "✓".green(),
                        results.resources,
                        versions.join(", ")
                    );
                }
            }
        }

        if results.valid {
            Ok(())
        } else {
            Err(anyhow::anyhow!("Validation failed with {} error(s)", results.errors.len()))
        }
    }

    /// Run every check and collect the outcome.
    pub fn validate(&self) -> ValidationResults {
        let mut results = ValidationResults::default();

        let (document, _) = match self.definitions.load() {
            Ok(loaded) => loaded,
            Err(e) => {
                results.errors.push(format!("{e:#}"));
                return results;
            }
        };
        results.resources = document.resources.len();

        let set = match document.resource_set() {
            Ok(set) => set,
            Err(e) => {
                results.errors.push(e.to_string());
                return results;
            }
        };

        for version in set.declared_versions() {
            match Renderer::new(&set, Prefix::default(), version) {
                Ok(_) => results.versions.push(version),
                Err(e) => results.errors.push(format!("Version {version}: {e}")),
            }
        }
        results.warnings = warnings_for(&set);

        if self.strict && !results.warnings.is_empty() {
            results.errors.extend(results.warnings.iter().map(|w| format!("Strict mode: {w}")));
        }
        results.valid = results.errors.is_empty();
        results
    }
}
