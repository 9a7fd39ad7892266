//! URL templating for resource actions.
//!
//! Action URLs are written route style (`/parent/:id/child/:child.id`). This module
//! turns them into HAL templates (`/parent/{id}/child/{child.id}`) and fills those
//! templates from flat domain data.
//!
//! # Token naming
//!
//! Each token resolves to a [`PathToken`]. A bare token (`:id`) belongs to the
//! resource owning the pattern; a namespaced token (`:child.id`) belongs to the
//! resource named by its namespace. Values are read from flat data under the
//! token's `camel` name (`childId`) first and its bare `property` (`id`) second.
//!
//! # Two rendering modes
//!
//! Substitution is driven purely by value presence. With data, placeholders are
//! replaced by values (`/parent/1`). Without, they stay as templates
//! (`/parent/{id}`), which is how discovery documents are produced.

pub mod token;
pub mod url;

pub use token::{PathToken, camel, tokenize};
pub use url::{
    UrlTemplate, collapse_separators, has_placeholder, is_templated, join_segments,
    segment_value, substitute, to_hal,
};
