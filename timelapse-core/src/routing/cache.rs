//! Memoization of shortest-path results per graph instance

use std::sync::Arc;

use hashbrown::HashMap;
use log::trace;

use super::Path;
use crate::{RouteId, StopId};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathKey {
    pub start: StopId,
    pub end: StopId,
    pub route: RouteId,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CacheStats {
    /// Queries answered from the cache
    pub hits: usize,
    /// Queries that ran a search
    pub misses: usize,
}

/// Grows for the lifetime of the owning graph, never evicted.
/// Not-found results are cached as `None`.
#[derive(Debug, Default, Clone)]
pub(crate) struct PathCache {
    entries: HashMap<PathKey, Option<Arc<Path>>>,
    stats: CacheStats,
}

impl PathCache {
    pub(crate) fn lookup(&mut self, key: &PathKey) -> Option<Option<Arc<Path>>> {
        let cached = self.entries.get(key).cloned();
        if cached.is_some() {
            self.stats.hits += 1;
            trace!("Path cache hit for {} -> {} on {}", key.start, key.end, key.route);
        }
        cached
    }

    pub(crate) fn store(&mut self, key: PathKey, path: Option<Arc<Path>>) {
        self.stats.misses += 1;
        self.entries.insert(key, path);
    }

    pub(crate) fn stats(&self) -> CacheStats {
        self.stats
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}
