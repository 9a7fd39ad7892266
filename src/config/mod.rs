//! Render configuration.
//!
//! [`RenderConfig`] collects the knobs of a render outside the definitions
//! themselves: the prefixes, the API version and the flags of the options
//! document. It is read from the `[render]` table of a definition document and can
//! be overridden from the environment or the command line.
//!
//! ```toml
//! [render]
//! url_prefix = "/test"
//! api_prefix = "/api"
//! version = 2
//! full_options = true
//! media_types = ["application/hal+json"]
//! ```
//!
//! # Environment
//!
//! | Variable | Field |
//! |---|---|
//! | `HAL_RESOURCE_URL_PREFIX` | `url_prefix` |
//! | `HAL_RESOURCE_API_PREFIX` | `api_prefix` |
//! | `HAL_RESOURCE_VERSION` | `version` |

use serde::{Deserialize, Serialize};

use crate::graph::Prefix;

/// Environment variable overriding [`RenderConfig::url_prefix`].
pub const ENV_URL_PREFIX: &str = "HAL_RESOURCE_URL_PREFIX";
/// Environment variable overriding [`RenderConfig::api_prefix`].
pub const ENV_API_PREFIX: &str = "HAL_RESOURCE_API_PREFIX";
/// Environment variable overriding [`RenderConfig::version`].
pub const ENV_VERSION: &str = "HAL_RESOURCE_VERSION";

fn default_version() -> u32 {
    1
}

/// Settings of one render configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Prefix in front of every href, e.g. a mount point
    pub url_prefix: String,
    /// Prefix after `url_prefix`, e.g. `/api`
    pub api_prefix: String,
    /// API version to render
    #[serde(default = "default_version")]
    pub version: u32,
    /// Options document lists root resources only
    pub exclude_children: bool,
    /// Options document ignores authorization
    pub full_options: bool,
    /// Media types advertised by the options document
    pub media_types: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            url_prefix: String::new(),
            api_prefix: String::new(),
            version: default_version(),
            exclude_children: false,
            full_options: false,
            media_types: Vec::new(),
        }
    }
}

impl RenderConfig {
    pub fn prefix(&self) -> Prefix {
        Prefix::new(self.url_prefix.clone(), self.api_prefix.clone())
    }

    /// Apply overrides from the process environment.
    ///
    /// A version variable that does not parse as a positive integer is ignored.
    #[must_use]
    pub fn with_env(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup; used by [`with_env`](Self::with_env).
    #[must_use]
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url_prefix) = lookup(ENV_URL_PREFIX) {
            self.url_prefix = url_prefix;
        }
        if let Some(api_prefix) = lookup(ENV_API_PREFIX) {
            self.api_prefix = api_prefix;
        }
        match lookup(ENV_VERSION).map(|v| v.trim().parse::<u32>()) {
            Some(Ok(version)) if version > 0 => self.version = version,
            Some(_) => tracing::debug!("ignoring invalid {ENV_VERSION}"),
            None => {}
        }
        self
    }
}
