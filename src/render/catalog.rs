//! Memoized renderers keyed by configuration.
//!
//! [`HyperResource`] owns a validated [`ResourceSet`] and hands out one shared
//! [`Renderer`] per `(url prefix, api prefix, version)` combination. Renderers are
//! built on first request and kept for the lifetime of the catalog; a different
//! definition set needs a different catalog.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::debug;

use super::Renderer;
use crate::core::Result;
use crate::definition::ResourceSet;
use crate::graph::Prefix;
use crate::pluralize::{EnglishPluralizer, Pluralizer};

type CatalogKey = (String, String, u32);

/// A definition set plus its cache of compiled renderers.
pub struct HyperResource {
    set: Arc<ResourceSet>,
    renderers: DashMap<CatalogKey, Arc<Renderer>>,
    pluralizer: Arc<dyn Pluralizer>,
}

impl std::fmt::Debug for HyperResource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HyperResource")
            .field("resources", &self.set.len())
            .field("renderers", &self.renderers.len())
            .finish_non_exhaustive()
    }
}

impl HyperResource {
    pub fn new(set: ResourceSet) -> Self {
        Self {
            set: Arc::new(set),
            renderers: DashMap::new(),
            pluralizer: Arc::new(EnglishPluralizer),
        }
    }

    /// Use `pluralizer` for every renderer built from now on.
    pub fn with_pluralizer(mut self, pluralizer: Arc<dyn Pluralizer>) -> Self {
        self.pluralizer = pluralizer;
        self
    }

    pub fn resources(&self) -> &ResourceSet {
        &self.set
    }

    /// The renderer for `prefix` and `version`, compiling it on first use.
    ///
    /// Concurrent first requests for the same key may each compile; only one result
    /// is kept and every caller receives that instance.
    pub fn renderer(&self, prefix: &Prefix, version: u32) -> Result<Arc<Renderer>> {
        let key = (prefix.url_prefix.clone(), prefix.api_prefix.clone(), version);
        if let Some(existing) = self.renderers.get(&key) {
            return Ok(Arc::clone(existing.value()));
        }

        debug!(
            url_prefix = %prefix.url_prefix,
            api_prefix = %prefix.api_prefix,
            version,
            "compiling renderer"
        );
        let built = Arc::new(
            Renderer::new(&self.set, prefix.clone(), version)?
                .with_pluralizer(Arc::clone(&self.pluralizer)),
        );
        let entry = self.renderers.entry(key).or_insert(built);
        Ok(Arc::clone(entry.value()))
    }

    /// Number of compiled renderers held.
    pub fn cached(&self) -> usize {
        self.renderers.len()
    }
}
