//! Aggregation cache.
//!
//! Building a container's bucket trees resolves every field through the
//! mapping and compiles every filter, although the result only depends on
//! the container, the request dimensions, the definitions and the facet
//! filters. The assembler therefore goes through an [`AggregationCache`],
//! keyed by a content hash of those inputs.
//!
//! Entries carry [`CacheTag`]s (the container name by default), so a
//! configuration reload can drop every tree of a container at once.
//!
//! ```text
//! get_or_build(key)
//!       │
//!       ├─→ entry present          → hit, shared tree
//!       │
//!       └─→ lock the key's slot
//!             ├─→ filled meanwhile → hit, shared tree
//!             └─→ build, insert    → miss
//! ```

use std::{
    collections::VecDeque,
    fmt,
    hash::Hasher,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use dashmap::DashMap;
use indexmap::IndexMap;
use parking_lot::Mutex;
use siphasher::sip::SipHasher24;
use tracing::debug;

use crate::{
    definition::BucketDefinition, error::AggregationError, filter::FilterSet, model::Bucket,
};

/// Default maximum number of cached trees.
pub const DEFAULT_MAX_ENTRIES: usize = 1000;

/// A built bucket tree, shared between requests.
pub type SharedBuckets = Arc<Vec<Bucket>>;

/// Content hash of the inputs of one aggregation build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey(u64);

impl CacheKey {
    /// Hashes the inputs of an aggregation build.
    ///
    /// Definitions and filters are hashed through their JSON serialization,
    /// which keeps declaration order. A serialization failure is returned as
    /// [`AggregationError::CacheKey`] rather than hashed as empty input.
    pub fn compute<'a, I>(
        container: &str,
        dimensions: I,
        definitions: &IndexMap<String, BucketDefinition>,
        facet_filters: &FilterSet,
    ) -> Result<Self, AggregationError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let serialize = |result: serde_json::Result<Vec<u8>>| {
            result.map_err(|source| AggregationError::CacheKey {
                name: container.to_string(),
                source,
            })
        };

        let mut hasher = SipHasher24::new();
        write_part(&mut hasher, container.as_bytes());
        for (name, value) in dimensions {
            write_part(&mut hasher, name.as_bytes());
            write_part(&mut hasher, value.as_bytes());
        }
        write_part(&mut hasher, &serialize(serde_json::to_vec(definitions))?);
        write_part(&mut hasher, &serialize(serde_json::to_vec(facet_filters))?);
        Ok(Self(hasher.finish()))
    }

    /// Returns the raw hash.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Writes a length-prefixed part, so that part boundaries affect the hash.
fn write_part(hasher: &mut SipHasher24, bytes: &[u8]) {
    hasher.write_usize(bytes.len());
    hasher.write(bytes);
}

/// Invalidation group of cache entries.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheTag(String);

impl CacheTag {
    /// Creates a tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self(tag.into())
    }

    /// Tag grouping every tree of a container.
    pub fn container(name: &str) -> Self {
        Self(format!("container:{name}"))
    }

    /// Returns the tag text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that built a tree.
    pub misses: u64,
    /// Entries dropped by tag invalidation.
    pub invalidated: u64,
    /// Current number of entries.
    pub entry_count: usize,
    /// Hit rate (0.0 - 1.0).
    pub hit_rate: f64,
}

/// Storage of built bucket trees.
pub trait AggregationCache: Send + Sync {
    /// Returns the tree cached under `key`, or builds, caches and returns it.
    ///
    /// Build errors are returned as-is and nothing is cached.
    fn get_or_build(
        &self,
        key: CacheKey,
        tags: &[CacheTag],
        build: &mut dyn FnMut() -> Result<Vec<Bucket>, AggregationError>,
    ) -> Result<SharedBuckets, AggregationError>;

    /// Drops every entry carrying `tag`, returning how many were dropped.
    fn invalidate(&self, tag: &CacheTag) -> usize;

    /// Returns usage statistics.
    fn stats(&self) -> CacheStats;
}

/// Cached tree with its tags.
#[derive(Debug, Clone)]
struct CacheEntry {
    /// Built tree.
    buckets: SharedBuckets,
    /// Invalidation groups.
    tags: Vec<CacheTag>,
}

/// In-memory [`AggregationCache`], bounded with oldest-eviction.
///
/// Concurrent builds of the same key wait on a per-key slot, so the tree
/// is built once and the waiters get the cached result.
pub struct MemoryAggregationCache {
    /// Cached trees.
    entries: DashMap<CacheKey, CacheEntry>,
    /// Build locks of keys being built.
    slots: DashMap<CacheKey, Arc<Mutex<()>>>,
    /// Insertion order for eviction (oldest first).
    order: Mutex<VecDeque<CacheKey>>,
    /// Maximum number of entries.
    max_entries: usize,
    /// Hits counter.
    hits: AtomicU64,
    /// Misses counter.
    misses: AtomicU64,
    /// Invalidated entries counter.
    invalidated: AtomicU64,
}

impl MemoryAggregationCache {
    /// Creates a cache holding at most `max_entries` trees.
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            slots: DashMap::new(),
            order: Mutex::new(VecDeque::new()),
            max_entries: max_entries.max(1),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            invalidated: AtomicU64::new(0),
        }
    }

    /// Drops every entry.
    pub fn clear(&self) {
        self.entries.clear();
        self.order.lock().clear();
    }

    /// Returns the cached tree for `key`, counting a hit.
    fn lookup(&self, key: CacheKey) -> Option<SharedBuckets> {
        let buckets = self.entries.get(&key).map(|entry| Arc::clone(&entry.buckets))?;
        self.hits.fetch_add(1, Ordering::Relaxed);
        debug!(%key, "aggregation cache hit");
        Some(buckets)
    }

    /// Stores a tree, evicting the oldest entries when full.
    fn insert(&self, key: CacheKey, tags: &[CacheTag], buckets: SharedBuckets) {
        let mut order = self.order.lock();
        while self.entries.len() >= self.max_entries {
            let Some(oldest) = order.pop_front() else {
                break;
            };
            self.entries.remove(&oldest);
        }

        let entry = CacheEntry {
            buckets,
            tags: tags.to_vec(),
        };
        if self.entries.insert(key, entry).is_none() {
            order.push_back(key);
        }
    }
}

impl Default for MemoryAggregationCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ENTRIES)
    }
}

impl AggregationCache for MemoryAggregationCache {
    fn get_or_build(
        &self,
        key: CacheKey,
        tags: &[CacheTag],
        build: &mut dyn FnMut() -> Result<Vec<Bucket>, AggregationError>,
    ) -> Result<SharedBuckets, AggregationError> {
        if let Some(buckets) = self.lookup(key) {
            return Ok(buckets);
        }

        let slot = Arc::clone(self.slots.entry(key).or_default().value());
        let guard = slot.lock();
        if let Some(buckets) = self.lookup(key) {
            return Ok(buckets);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        debug!(%key, "aggregation cache miss");
        let result = build().map(Arc::new);
        if let Ok(buckets) = &result {
            self.insert(key, tags, Arc::clone(buckets));
        }
        drop(guard);
        self.slots.remove(&key);
        result
    }

    fn invalidate(&self, tag: &CacheTag) -> usize {
        let mut order = self.order.lock();
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.tags.contains(tag));
        order.retain(|key| self.entries.contains_key(key));
        let dropped = before.saturating_sub(self.entries.len());

        self.invalidated.fetch_add(dropped as u64, Ordering::Relaxed);
        debug!(tag = tag.as_str(), dropped, "invalidated aggregation cache entries");
        dropped
    }

    fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;

        CacheStats {
            hits,
            misses,
            invalidated: self.invalidated.load(Ordering::Relaxed),
            entry_count: self.entries.len(),
            hit_rate: if total > 0 {
                hits as f64 / total as f64
            } else {
                0.0
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::AtomicUsize,
        thread,
        time::Duration,
    };

    use super::*;
    use crate::{
        filter::FilterCondition,
        model::{BucketKind, ReverseNestedBucket},
    };

    fn tree(name: &str) -> Vec<Bucket> {
        vec![Bucket::new(
            name,
            BucketKind::ReverseNested(ReverseNestedBucket::default()),
        )]
    }

    fn key(container: &str) -> CacheKey {
        CacheKey::compute(container, [], &IndexMap::new(), &FilterSet::new()).unwrap()
    }

    #[test]
    fn key_depends_on_every_input() {
        let mut definitions = IndexMap::new();
        definitions.insert("color".to_string(), BucketDefinition::term("color"));
        let mut filters = FilterSet::new();
        filters.insert("color".into(), FilterCondition::value("red"));

        let base = CacheKey::compute("catalog", [("store", "1")], &definitions, &filters).unwrap();
        assert_eq!(
            base,
            CacheKey::compute("catalog", [("store", "1")], &definitions, &filters).unwrap()
        );
        assert_ne!(
            base,
            CacheKey::compute("search", [("store", "1")], &definitions, &filters).unwrap()
        );
        assert_ne!(
            base,
            CacheKey::compute("catalog", [("store", "2")], &definitions, &filters).unwrap()
        );
        assert_ne!(
            base,
            CacheKey::compute("catalog", [("store", "1")], &IndexMap::new(), &filters).unwrap()
        );
        assert_ne!(
            base,
            CacheKey::compute("catalog", [("store", "1")], &definitions, &FilterSet::new()).unwrap()
        );
        assert_eq!(base.to_string().len(), 16);
    }

    #[test]
    fn second_lookup_is_a_hit() {
        let cache = MemoryAggregationCache::new(10);
        let mut builds = 0;
        let mut build = || {
            builds += 1;
            Ok::<_, AggregationError>(tree("color"))
        };

        let first = cache.get_or_build(key("catalog"), &[], &mut build).unwrap();
        let second = cache.get_or_build(key("catalog"), &[], &mut build).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(builds, 1);

        let stats = cache.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.entry_count, 1);
    }

    #[test]
    fn build_errors_are_not_cached() {
        let cache = MemoryAggregationCache::new(10);
        let err = cache
            .get_or_build(key("catalog"), &[], &mut || {
                Err(AggregationError::UnsupportedBucketType {
                    name: "color".into(),
                    bucket_type: "geo_grid".into(),
                })
            })
            .unwrap_err();
        assert_eq!(err.name(), "color");
        assert_eq!(cache.stats().entry_count, 0);
    }

    #[test]
    fn invalidate_drops_tagged_entries() {
        let cache = MemoryAggregationCache::new(10);
        let catalog = CacheTag::container("catalog");
        let search = CacheTag::container("search");
        cache
            .get_or_build(key("a"), &[catalog.clone()], &mut || Ok(tree("a")))
            .unwrap();
        cache
            .get_or_build(key("b"), &[catalog.clone()], &mut || Ok(tree("b")))
            .unwrap();
        cache
            .get_or_build(key("c"), &[search], &mut || Ok(tree("c")))
            .unwrap();

        assert_eq!(cache.invalidate(&catalog), 2);
        assert_eq!(cache.invalidate(&catalog), 0);

        let stats = cache.stats();
        assert_eq!(stats.entry_count, 1);
        assert_eq!(stats.invalidated, 2);
    }

    #[test]
    fn oldest_entry_is_evicted() {
        let cache = MemoryAggregationCache::new(2);
        for name in ["a", "b", "c"] {
            cache
                .get_or_build(key(name), &[], &mut || Ok(tree(name)))
                .unwrap();
        }
        assert_eq!(cache.stats().entry_count, 2);

        let mut rebuilt = false;
        cache
            .get_or_build(key("a"), &[], &mut || {
                rebuilt = true;
                Ok(tree("a"))
            })
            .unwrap();
        assert!(rebuilt);
    }

    #[test]
    fn concurrent_builds_collapse() {
        let cache = MemoryAggregationCache::new(10);
        let builds = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    cache
                        .get_or_build(key("catalog"), &[], &mut || {
                            builds.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            Ok(tree("color"))
                        })
                        .unwrap();
                });
            }
        });

        assert_eq!(builds.load(Ordering::SeqCst), 1);
        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 7);
    }
}
