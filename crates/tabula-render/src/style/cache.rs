//! Memoized layout resolution.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::debug;

use super::{StyleProfile, StyleResolver};
use crate::error::Result;

/// Read-mostly cache of resolved profiles, keyed by layout name.
///
/// The cache never expires entries on its own. Whoever changes the
/// configuration behind the resolver calls [`StyleCache::invalidate`].
#[derive(Debug, Default)]
pub struct StyleCache {
    profiles: RwLock<HashMap<String, Arc<StyleProfile>>>,
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached profile or resolves and stores it.
    ///
    /// Resolution errors are returned and nothing is cached.
    pub fn get_or_resolve<R>(&self, layout: &str, resolver: &R) -> Result<Arc<StyleProfile>>
    where
        R: StyleResolver + ?Sized,
    {
        if let Some(profile) = self.get(layout) {
            debug!(layout, "style cache hit");
            return Ok(profile);
        }

        let profile = Arc::new(resolver.resolve(layout)?);
        let mut profiles = self
            .profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let entry = profiles
            .entry(layout.to_string())
            .or_insert_with(|| Arc::clone(&profile));
        Ok(Arc::clone(entry))
    }

    /// Cached profile, if any.
    pub fn get(&self, layout: &str) -> Option<Arc<StyleProfile>> {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(layout)
            .cloned()
    }

    /// Drops every cached profile.
    pub fn invalidate(&self) {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Drops one cached profile.
    pub fn invalidate_layout(&self, layout: &str) {
        self.profiles
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(layout);
    }

    pub fn len(&self) -> usize {
        self.profiles
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
