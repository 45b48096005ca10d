//! Compiled path cache
//!
//! Thread-safe LRU cache from path text to `CompiledPath`. Owned by the
//! caller; the free `find`/`findall` functions keep no state.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;
use tracing::trace;

use super::compiler::CompiledPath;
use super::value::Match;
use crate::error::Result;
use crate::model::Node;

/// LRU cache of compiled paths
pub struct PathCache {
    inner: Mutex<LruCache<String, Arc<CompiledPath>>>,
}

impl PathCache {
    /// Cache holding at most `capacity` paths; zero is treated as one
    pub fn new(capacity: usize) -> Self {
        let cap = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        PathCache {
            inner: Mutex::new(LruCache::new(cap)),
        }
    }

    /// Compiled form of `path`, compiling on a miss. Syntax errors are not
    /// cached.
    pub fn get(&self, path: &str) -> Result<Arc<CompiledPath>> {
        if let Some(compiled) = self.lock().get(path) {
            trace!(path, "path cache hit");
            return Ok(Arc::clone(compiled));
        }
        let compiled = Arc::new(CompiledPath::compile(path)?);
        self.lock().put(path.to_string(), Arc::clone(&compiled));
        Ok(compiled)
    }

    pub fn findall<'a>(&self, context: impl Into<Node<'a>>, path: &str) -> Result<Vec<Match<'a>>> {
        self.get(path)?.findall(context)
    }

    pub fn find<'a>(&self, context: impl Into<Node<'a>>, path: &str) -> Result<Option<Match<'a>>> {
        self.get(path)?.find(context)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, LruCache<String, Arc<CompiledPath>>> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for PathCache {
    fn default() -> Self {
        PathCache::new(64)
    }
}

impl std::fmt::Debug for PathCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathCache").field("len", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[test]
    fn test_cache_reuses_compiled_paths() {
        let cache = PathCache::new(2);
        let first = cache.get("//item").unwrap();
        let second = cache.get("//item").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_cache_eviction() {
        let cache = PathCache::new(2);
        let a = cache.get("igt").unwrap();
        cache.get("igt/tier").unwrap();
        cache.get("igt/tier/item").unwrap();
        assert_eq!(cache.len(), 2);
        // "igt" was least recently used and is compiled afresh
        assert!(!Arc::ptr_eq(&a, &cache.get("igt").unwrap()));
    }

    #[test]
    fn test_cache_errors_not_stored() {
        let cache = PathCache::new(0);
        assert!(cache.get("igt/").is_err());
        assert!(cache.is_empty());

        let corpus = fixtures::xc1();
        assert_eq!(cache.findall(corpus.root(), "//item").unwrap().len(), 2);
        assert!(cache.find(corpus.root(), "tier").unwrap().is_none());
        cache.clear();
        assert!(cache.is_empty());
    }
}
