//! Route pattern to HAL template conversion and substitution.

use serde_json::Value;

use super::token::{PathToken, markers, tokenize};

/// Whether `pattern` contains a token marker.
///
/// A marker at position 0 never counts: a pattern must start with a literal path
/// character for its tokens to be processed.
pub fn is_templated(pattern: &str) -> bool {
    pattern.char_indices().skip(1).any(|(_, c)| c == '{' || c == ':')
}

/// Whether a rendered href still carries an unresolved `{placeholder}`.
pub fn has_placeholder(href: &str) -> bool {
    markers(href).any(|(range, _)| href[range].starts_with('{'))
}

/// Rewrite every `:token` to `{token}`, leaving brace-style text untouched.
pub fn to_hal(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 4);
    let mut last = 0;
    for (range, name) in markers(pattern) {
        out.push_str(&pattern[last..range.start]);
        out.push('{');
        out.push_str(name);
        out.push('}');
        last = range.end;
    }
    out.push_str(&pattern[last..]);
    out
}

/// Render a JSON value as a path segment. `None` for values that cannot fill a token.
pub fn segment_value(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        other => Some(other.to_string()),
    }
}

/// Fill the placeholders of `hal_template` from `data`.
///
/// Placeholders are paired with `tokens` by position (falling back to a match on the
/// token text), so the same name may appear for several resources along a parent
/// chain. A token with a value is replaced by it; a token without one is left as a
/// template placeholder (see [`PathToken::template_placeholder`]). Placeholders with
/// no matching token are left verbatim.
pub fn substitute(
    tokens: &[PathToken],
    hal_template: &str,
    data: &Value,
    resource_name: &str,
) -> String {
    let mut out = String::with_capacity(hal_template.len() + 8);
    let mut last = 0;
    for (index, (range, name)) in markers(hal_template).enumerate() {
        out.push_str(&hal_template[last..range.start]);
        last = range.end;

        let token = tokens
            .get(index)
            .filter(|t| t.original == name)
            .or_else(|| tokens.iter().find(|t| t.original == name));

        match token {
            Some(token) => match token.lookup(data).and_then(segment_value) {
                Some(value) => out.push_str(&value),
                None => {
                    tracing::trace!(
                        token = %token.original,
                        resource = resource_name,
                        "no value for token, leaving placeholder"
                    );
                    out.push_str(&token.template_placeholder(resource_name));
                }
            },
            None => out.push_str(&hal_template[range]),
        }
    }
    out.push_str(&hal_template[last..]);
    out
}

/// Collapse runs of `/` in the path portion of `url` to a single separator.
///
/// The `//` following a URL scheme (`https://`) and anything after `?` are kept as is.
pub fn collapse_separators(url: &str) -> String {
    let (scheme, rest) = match url.find("://") {
        Some(pos)
            if pos > 0
                && url[..pos]
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            url.split_at(pos + 3)
        }
        _ => ("", url),
    };
    let (path, query) = match rest.find('?') {
        Some(pos) => rest.split_at(pos),
        None => (rest, ""),
    };

    let mut out = String::with_capacity(url.len());
    out.push_str(scheme);
    let mut previous_slash = scheme.ends_with('/');
    for c in path.chars() {
        if c == '/' && previous_slash {
            continue;
        }
        previous_slash = c == '/';
        out.push(c);
    }
    out.push_str(query);
    out
}

/// Concatenate URL pieces and collapse doubled separators at the join points.
pub fn join_segments<S: AsRef<str>>(segments: &[S]) -> String {
    let joined: String = segments.iter().map(AsRef::as_ref).collect();
    collapse_separators(&joined)
}

/// A route pattern compiled once into HAL form with its tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    hal: String,
    tokens: Vec<PathToken>,
    templated: bool,
}

impl UrlTemplate {
    /// Compile `pattern`, attributing bare tokens to `owner`.
    pub fn compile(pattern: &str, owner: &str) -> Self {
        let pattern = collapse_separators(pattern);
        if is_templated(&pattern) {
            let hal = to_hal(&pattern);
            let tokens = tokenize(&hal, owner);
            Self {
                hal,
                tokens,
                templated: true,
            }
        } else {
            Self {
                hal: pattern,
                tokens: Vec::new(),
                templated: false,
            }
        }
    }

    /// A pre-built template from HAL text and an explicit token list.
    pub fn from_parts(hal: String, tokens: Vec<PathToken>) -> Self {
        let templated = !tokens.is_empty();
        Self {
            hal,
            tokens,
            templated,
        }
    }

    /// HAL form of the pattern.
    pub fn hal(&self) -> &str {
        &self.hal
    }

    /// Tokens in order of appearance.
    pub fn tokens(&self) -> &[PathToken] {
        &self.tokens
    }

    /// Whether the pattern contains tokens at all.
    pub fn is_templated(&self) -> bool {
        self.templated
    }

    /// Produce the URL for `data`; literal patterns come back unchanged.
    pub fn render(&self, data: &Value, resource_name: &str) -> String {
        if self.templated {
            substitute(&self.tokens, &self.hal, data, resource_name)
        } else {
            self.hal.clone()
        }
    }
}
