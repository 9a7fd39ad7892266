//! Link records and the gating rules that decide whether a link is emitted.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::definition::{Action, ParameterSpec};
use crate::envelope::Envelope;

/// Injected authorization check: `(resource:action, data, context) -> allowed`.
pub type AuthCheck<'a> = &'a dyn Fn(&str, &Value, &Value) -> bool;

/// One entry of `_links`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub href: String,
    /// Upper-cased HTTP verb
    pub method: String,
    /// Set when the href still contains an unresolved `{placeholder}`
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub templated: bool,
    /// Present whenever the owning action declares parameters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

/// Links keyed by action or link name.
pub type Links = BTreeMap<String, Link>;

/// The `{href, method}` pair identifying the action that produced a body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Origin {
    pub href: String,
    pub method: String,
}

impl Origin {
    pub fn new(href: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            method: method.into(),
        }
    }
}

impl From<&Link> for Origin {
    fn from(link: &Link) -> Self {
        Self {
            href: link.href.clone(),
            method: link.method.clone(),
        }
    }
}

/// JavaScript-style truthiness of a JSON value.
///
/// `null`, `false`, `0` and `""` are falsy; everything else, empty arrays and
/// objects included, is truthy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// How the visibility predicates are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gate {
    /// Per-instance render: condition and authorization both apply
    Render,
    /// Discovery document: conditions are skipped, authorization unless `skip_auth`
    Discovery {
        skip_auth: bool,
    },
}

impl Gate {
    /// Whether `action` may be linked for this envelope and data.
    pub fn allows(
        self,
        identifier: &str,
        action: &Action,
        envelope: &Envelope,
        data: &Value,
        auth: Option<AuthCheck<'_>>,
    ) -> bool {
        let skip_condition = matches!(self, Gate::Discovery { .. });
        if matches!(self, Gate::Discovery { skip_auth: true }) {
            return true;
        }

        let visible = match &action.condition {
            Some(condition) if !skip_condition => condition(envelope, data),
            _ => true,
        };
        if !visible {
            return false;
        }

        match (&action.authorize, auth) {
            (Some(authorize), _) => authorize(envelope, data),
            (None, Some(auth)) => auth(identifier, data, &envelope.context),
            (None, None) => true,
        }
    }
}

/// Parameters attached to every link of `action`.
///
/// `None` when the action declares no parameters; otherwise static values plus
/// every dynamic value that comes out truthy.
pub fn parameter_set(action: &Action, envelope: &Envelope, data: &Value) -> Option<Map<String, Value>> {
    if action.parameters.is_empty() {
        return None;
    }
    let mut parameters = Map::new();
    for (name, spec) in &action.parameters {
        match spec {
            ParameterSpec::Static(value) => {
                parameters.insert(name.clone(), value.clone());
            }
            ParameterSpec::Dynamic(generate) => {
                if let Some(value) = generate(envelope, data).filter(is_truthy) {
                    parameters.insert(name.clone(), value);
                }
            }
        }
    }
    Some(parameters)
}
