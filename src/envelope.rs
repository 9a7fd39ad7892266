//! Normalized request context handed to every render call.
//!
//! The renderer never looks at a transport. Callers build an [`Envelope`] (directly
//! or through [`Envelope::from_request`]) and the engine only passes it on to
//! `authorize`, `condition`, parameter and link callbacks, reading nothing but
//! `context` for the injected authorization function.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Request context: who is asking, in which auth context, with which request data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Envelope {
    /// Transport label, e.g. `http`
    pub transport: String,
    /// Authenticated user, if any
    pub user: Value,
    /// Authorization context passed to the injected auth function
    pub context: Value,
    /// Request body merged with route params and query values
    pub data: Value,
    /// Route params and query values
    pub params: Map<String, Value>,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Request cookies
    pub cookies: BTreeMap<String, String>,
    /// Session state
    pub session: Value,
    /// Request path
    pub path: Option<String>,
    /// Extra fields contributed by the host application
    pub extensions: Map<String, Value>,
}

/// Transport-agnostic pieces of an incoming request.
#[derive(Debug, Clone, Default)]
pub struct RequestParts {
    /// Transport label
    pub transport: String,
    /// Parsed body
    pub body: Option<Value>,
    /// Route parameters
    pub params: Map<String, Value>,
    /// Query string values
    pub query: Map<String, Value>,
    /// Headers
    pub headers: BTreeMap<String, String>,
    /// Cookies
    pub cookies: BTreeMap<String, String>,
    /// Authenticated user
    pub user: Option<Value>,
    /// Authorization context
    pub context: Option<Value>,
    /// Session state
    pub session: Option<Value>,
    /// Request path
    pub url: Option<String>,
    /// Host-specific extras copied onto the envelope
    pub extensions: Map<String, Value>,
}

impl Envelope {
    /// An empty envelope: no user, no context, empty data.
    pub fn new() -> Self {
        Self {
            data: Value::Object(Map::new()),
            ..Self::default()
        }
    }

    /// Set the authenticated user.
    pub fn with_user(mut self, user: Value) -> Self {
        self.user = user;
        self
    }

    /// Set the authorization context.
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = context;
        self
    }

    /// Set the request data.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Build an envelope from request parts.
    ///
    /// The body becomes `data`; route params then query values are added to `data`
    /// without overwriting body fields, and to `params` with params taking
    /// precedence over query values.
    pub fn from_request(parts: RequestParts) -> Self {
        let mut data = match parts.body {
            Some(Value::Null) | None => Value::Object(Map::new()),
            Some(body) => body,
        };
        let mut params = Map::new();

        for source in [parts.params, parts.query] {
            for (key, value) in source {
                if let Value::Object(fields) = &mut data {
                    fields.entry(key.clone()).or_insert_with(|| value.clone());
                }
                params.entry(key).or_insert(value);
            }
        }

        Self {
            transport: parts.transport,
            user: parts.user.unwrap_or(Value::Null),
            context: parts.context.unwrap_or(Value::Null),
            data,
            params,
            headers: parts.headers,
            cookies: parts.cookies,
            session: parts.session.unwrap_or(Value::Null),
            path: parts.url,
            extensions: parts.extensions,
        }
    }

    /// Read a field of `data`.
    pub fn data_field(&self, key: &str) -> Option<&Value> {
        self.data.get(key).filter(|v| !v.is_null())
    }
}
