//! Error handling for hal-resource
//!
//! Rendering is designed to degrade to omission rather than fail: missing token
//! values stay as placeholders, gated links are dropped and empty embeds vanish.
//! The errors in this module therefore describe *programmer* defects in a resource
//! definition set (unknown parents, cycles, dangling embed targets) or lookups of
//! names that do not exist. They are raised when a [`ResourceSet`] or a
//! [`Renderer`] is built, never halfway through producing a body.
//!
//! # Error Categories
//!
//! - **Graph**: [`HyperError::DuplicateResource`], [`HyperError::UnknownParent`],
//!   [`HyperError::CircularParent`], [`HyperError::MissingSelfAction`]
//! - **Lookup**: [`HyperError::UnknownResource`], [`HyperError::UnknownAction`],
//!   [`HyperError::BrokenReference`]
//! - **Versions**: [`HyperError::InvalidVersion`], [`HyperError::IncompleteAction`]
//! - **Documents**: [`HyperError::DefinitionParse`], [`HyperError::Io`],
//!   [`HyperError::Json`]
//!
//! The CLI converts any error into an [`ErrorContext`] through
//! [`user_friendly_error`], which adds a suggestion line and prints with colors.
//!
//! ```rust,no_run
//! use hal_resource::core::{HyperError, user_friendly_error};
//!
//! let err = HyperError::UnknownParent {
//!     resource: "child".to_string(),
//!     parent: "parnet".to_string(),
//! };
//! user_friendly_error(anyhow::Error::from(err)).display();
//! ```
//!
//! [`ResourceSet`]: crate::definition::ResourceSet
//! [`Renderer`]: crate::render::Renderer

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// The main error type for hal-resource operations.
#[derive(Error, Debug)]
pub enum HyperError {
    /// Two definitions share a name.
    #[error("Resource '{name}' is defined more than once")]
    DuplicateResource {
        /// The repeated name
        name: String,
    },

    /// A resource names a parent that is not part of the definition set.
    #[error("Resource '{resource}' declares unknown parent '{parent}'")]
    UnknownParent {
        /// Resource carrying the bad reference
        resource: String,
        /// The parent name that could not be found
        parent: String,
    },

    /// The parent chain loops back on itself.
    #[error("Circular parent chain detected: {chain}")]
    CircularParent {
        /// Human readable chain, e.g. `a → b → a`
        chain: String,
    },

    /// A resource is used as a parent but has no `self` action to derive its URL from.
    #[error("Resource '{resource}' is a parent of '{child}' but has no 'self' action")]
    MissingSelfAction {
        /// The parent resource lacking `self`
        resource: String,
        /// A child that needs the parent URL
        child: String,
    },

    /// Lookup of a resource name that does not exist.
    #[error("Unknown resource '{name}'")]
    UnknownResource {
        /// Requested resource name
        name: String,
        /// Closest known name, when one is similar enough
        suggestion: Option<String>,
    },

    /// Lookup of an action name that the (versioned) resource does not have.
    #[error("Resource '{resource}' has no action '{action}'")]
    UnknownAction {
        /// Resource that was searched
        resource: String,
        /// Requested action name
        action: String,
        /// Closest known action, when one is similar enough
        suggestion: Option<String>,
    },

    /// An `embed` or `render` cross reference points at a missing resource/action.
    #[error("'{from}' references '{to}', which does not exist")]
    BrokenReference {
        /// `resource:action` holding the reference
        from: String,
        /// `resource:action` that is missing
        to: String,
    },

    /// A version key that is not a positive integer.
    #[error("'{resource}' uses invalid version '{version}'")]
    InvalidVersion {
        /// Resource declaring the version, or `renderer` for a requested render version
        resource: String,
        /// Offending key as written
        version: String,
    },

    /// A version overlay introduces a new action without a method or url.
    #[error("Version {version} of '{resource}' adds action '{action}' without a {field}")]
    IncompleteAction {
        /// Resource being resolved
        resource: String,
        /// Action introduced by the overlay
        action: String,
        /// Version number of the overlay
        version: u32,
        /// Missing field name (`method` or `url`)
        field: String,
    },

    /// A definition document could not be parsed.
    #[error("Failed to parse definition document '{file}': {reason}")]
    DefinitionParse {
        /// Path of the document
        file: String,
        /// Parser message
        reason: String,
    },

    /// I/O failure reading documents or data files.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization failure.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Shorthand result type used across the crate.
pub type Result<T, E = HyperError> = std::result::Result<T, E>;

/// Pick the candidate closest to `target`, if any is within half its length.
///
/// Used to attach "did you mean" hints to lookup errors.
pub fn closest_match<'a, I>(target: &str, candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let threshold = (target.len() / 2).max(1);
    candidates
        .into_iter()
        .map(|candidate| (strsim::levenshtein(target, candidate), candidate))
        .filter(|(distance, _)| *distance <= threshold)
        .min_by_key(|(distance, _)| *distance)
        .map(|(_, candidate)| candidate.to_string())
}

/// Error wrapper with a user-facing suggestion and details, for CLI output.
#[derive(Debug)]
pub struct ErrorContext {
    /// Underlying error message
    pub message: String,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Extra explanation
    pub details: Option<String>,
}

impl ErrorContext {
    /// Wrap a message without suggestion or details.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            suggestion: None,
            details: None,
        }
    }

    /// Attach a suggestion line.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Attach a details line.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.message);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

fn context_for(error: &HyperError) -> ErrorContext {
    let ctx = ErrorContext::new(error.to_string());
    match error {
        HyperError::DuplicateResource {
            ..
        } => ctx.with_suggestion("Rename one of the definitions; resource names must be unique"),
        HyperError::UnknownParent {
            resource,
            ..
        } => ctx
            .with_suggestion(format!(
                "Declare the parent resource or remove the 'parent' field from '{resource}'"
            ))
            .with_details("Parent names must refer to a resource in the same definition set"),
        HyperError::CircularParent {
            ..
        } => ctx
            .with_suggestion("Break the loop by removing one of the 'parent' fields in the chain")
            .with_details("A resource may not be its own ancestor"),
        HyperError::MissingSelfAction {
            resource,
            ..
        } => ctx.with_suggestion(format!(
            "Add a 'self' action to '{resource}'; child URLs are composed from it"
        )),
        HyperError::UnknownResource {
            suggestion: Some(s),
            ..
        }
        | HyperError::UnknownAction {
            suggestion: Some(s),
            ..
        } => ctx.with_suggestion(format!("Did you mean '{s}'?")),
        HyperError::BrokenReference {
            ..
        } => ctx.with_suggestion("Check the 'embed' and 'render' entries of the action"),
        HyperError::InvalidVersion {
            ..
        } => ctx.with_suggestion("Version keys must be positive integers such as \"2\""),
        HyperError::IncompleteAction {
            ..
        } => ctx
            .with_suggestion("Give the new action both a 'method' and a 'url' in its overlay")
            .with_details("Overlays only fill fields that are not already set"),
        HyperError::DefinitionParse {
            ..
        } => ctx.with_suggestion(
            "Check the document syntax; the format is chosen from the extension (.toml, .json, .yaml)",
        ),
        _ => ctx,
    }
}

/// Convert any error into an [`ErrorContext`] with a suggestion where one is known.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    // `downcast_ref` also sees through context layers; only unwrapped errors short-circuit.
    if error.chain().count() == 1 {
        if let Some(hyper_error) = error.downcast_ref::<HyperError>() {
            return context_for(hyper_error);
        }

        if let Some(io_error) = error.downcast_ref::<std::io::Error>() {
            if io_error.kind() == std::io::ErrorKind::NotFound {
                return ErrorContext::new(error.to_string())
                    .with_suggestion("Check that the file exists and the path is correct");
            }
        }
    }

    let mut message = error.to_string();
    let chain: Vec<String> =
        error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    // A wrapped HyperError deeper in the chain still deserves its suggestion.
    for cause in error.chain() {
        if let Some(hyper_error) = cause.downcast_ref::<HyperError>() {
            let inner = context_for(hyper_error);
            let mut ctx = ErrorContext::new(message);
            ctx.suggestion = inner.suggestion;
            ctx.details = inner.details;
            return ctx;
        }
        if let Some(io_error) = cause.downcast_ref::<std::io::Error>() {
            if io_error.kind() == std::io::ErrorKind::NotFound {
                return ErrorContext::new(message)
                    .with_suggestion("Check that the file exists and the path is correct");
            }
        }
    }

    ErrorContext::new(message)
}
