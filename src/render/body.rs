//! Body shaping: the field pipeline applied to domain data before links are attached.

use serde_json::{Map, Value};
use std::fmt;

use crate::definition::{Action, Transform};

/// Field pipeline of one action.
///
/// Stages run in this order, each skipped when unset: strip embedded keys (those
/// not re-included by `include`), `include`, `exclude`, `filter`, `transform`.
#[derive(Clone, Default)]
pub struct BodyShape {
    embedded: Vec<String>,
    include: Option<Vec<String>>,
    exclude: Option<Vec<String>>,
    filter: Option<Vec<String>>,
    transform: Option<Transform>,
}

impl fmt::Debug for BodyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BodyShape")
            .field("embedded", &self.embedded)
            .field("include", &self.include)
            .field("exclude", &self.exclude)
            .field("filter", &self.filter)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

impl BodyShape {
    pub fn for_action(action: &Action) -> Self {
        let embedded = action
            .embed
            .keys()
            .filter(|key| !action.include.as_ref().is_some_and(|include| include.contains(*key)))
            .cloned()
            .collect();

        Self {
            embedded,
            include: action.include.clone(),
            exclude: action.exclude.clone(),
            filter: action.filter.clone(),
            transform: action.transform.clone(),
        }
    }

    /// Shape a copy of `data`; the input is never modified.
    pub fn apply(&self, data: &Value) -> Value {
        let mut shaped = data.clone();
        if let Value::Object(fields) = &mut shaped {
            for key in &self.embedded {
                fields.remove(key);
            }
            if let Some(include) = &self.include {
                pick(fields, include);
            }
            if let Some(exclude) = &self.exclude {
                for key in exclude {
                    fields.remove(key);
                }
            }
            if let Some(filter) = &self.filter {
                pick(fields, filter);
            }
        }
        match &self.transform {
            Some(transform) => transform(shaped),
            None => shaped,
        }
    }
}

fn pick(fields: &mut Map<String, Value>, keep: &[String]) {
    fields.retain(|key, _| keep.iter().any(|k| k == key));
}
