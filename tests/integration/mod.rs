//! Integration test suite for hal-resource
//!
//! End-to-end scenarios over the canonical `parent` → `child` → `grandChild`
//! fixture (see `hal_resource::test_utils::fixtures`) plus the command-line binary.
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **urls**: action and parent URLs with and without prefixes
//! - **links**: gating, parameters and dynamic links of single actions
//! - **rendering**: versioned bodies, embedded children and lists
//! - **options**: discovery documents
//! - **documents**: definitions loaded from files
//! - **cli**: the `hal-resource` binary

mod cli;
mod documents;
mod options;
mod rendering;
mod urls;
