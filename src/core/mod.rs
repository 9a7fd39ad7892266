//! Core types shared by every layer of hal-resource.
//!
//! At the moment this is the error taxonomy: [`HyperError`] for typed failures,
//! [`ErrorContext`] and [`user_friendly_error`] for CLI reporting.

pub mod error;

pub use error::{ErrorContext, HyperError, Result, closest_match, user_friendly_error};
