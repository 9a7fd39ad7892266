//! Path tokens extracted from route-style URL patterns.
//!
//! A token is either the route form `:name` / `:ns.name` or the HAL form
//! `{name}` / `{ns.name}`. Both spellings produce the same [`PathToken`].

use regex::Regex;
use serde::Serialize;
use serde_json::Value;
use std::sync::LazyLock;

/// Matches `:token` and `{token}` markers, capturing the token text.
static TOKEN_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?::([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*))|(?:\{([A-Za-z_$][\w$]*(?:\.[A-Za-z_$][\w$]*)*)\})")
        .expect("token pattern is a valid regex")
});

/// A single path variable found in a URL pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathToken {
    /// Raw token text without marker, e.g. `child.id`
    pub original: String,
    /// Dotted prefix before the final segment (`child` for `child.id`, empty for `id`)
    pub namespace: String,
    /// Resource whose flat data owns the value
    pub resource: String,
    /// Final field name (`id` for `child.id`)
    pub property: String,
    /// `resource` + capitalized `property`, e.g. `childId`
    pub camel: String,
}

impl PathToken {
    /// Parse token text appearing in a pattern owned by `owner`.
    ///
    /// A namespaced token belongs to the resource named by the last namespace
    /// segment; a bare token belongs to `owner`.
    pub fn parse(original: &str, owner: &str) -> Self {
        let (namespace, property) = match original.rsplit_once('.') {
            Some((namespace, property)) => (namespace.to_string(), property.to_string()),
            None => (String::new(), original.to_string()),
        };
        let resource = namespace.rsplit('.').next().filter(|s| !s.is_empty()).unwrap_or(owner);
        let camel = camel(resource, &property);

        Self {
            original: original.to_string(),
            resource: resource.to_string(),
            namespace,
            property,
            camel,
        }
    }

    /// Re-assign the owning resource, keeping `camel` consistent with it.
    pub fn retag(&mut self, resource: &str) {
        self.resource = resource.to_string();
        self.camel = camel(resource, &self.property);
    }

    /// Read this token's value out of flat data: `data[camel]`, then `data[property]`.
    ///
    /// `null` counts as absent.
    pub fn lookup<'a>(&self, data: &'a Value) -> Option<&'a Value> {
        let object = data.as_object()?;
        object
            .get(&self.camel)
            .filter(|v| !v.is_null())
            .or_else(|| object.get(&self.property).filter(|v| !v.is_null()))
    }

    /// Placeholder left in a URL when no value is available while rendering `resource_name`.
    ///
    /// Tokens owned by the rendered resource collapse to `{property}`; tokens owned by an
    /// ancestor keep their qualified `{camel}` name.
    pub fn template_placeholder(&self, resource_name: &str) -> String {
        if self.resource == resource_name {
            format!("{{{}}}", self.property)
        } else {
            format!("{{{}}}", self.camel)
        }
    }
}

/// `resource` followed by `property` with its first letter upper-cased.
pub fn camel(resource: &str, property: &str) -> String {
    let mut chars = property.chars();
    match chars.next() {
        Some(first) => format!("{resource}{}{}", first.to_uppercase(), chars.as_str()),
        None => resource.to_string(),
    }
}

/// Extract every token of `pattern`, in order of appearance.
pub fn tokenize(pattern: &str, owner: &str) -> Vec<PathToken> {
    TOKEN_PATTERN
        .captures_iter(pattern)
        .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
        .map(|m| PathToken::parse(m.as_str(), owner))
        .collect()
}

/// Iterate over `(range, token text)` of every marker in `pattern`.
pub(crate) fn markers(pattern: &str) -> impl Iterator<Item = (std::ops::Range<usize>, &str)> {
    TOKEN_PATTERN.captures_iter(pattern).filter_map(|caps| {
        let whole = caps.get(0)?;
        let name = caps.get(1).or_else(|| caps.get(2))?;
        Some((whole.range(), name.as_str()))
    })
}
