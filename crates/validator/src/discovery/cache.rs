//! Concurrent cache of discovery artifacts.
//!
//! Keyed by subject type plus the member filter, with one independent
//! slot per artifact kind. Slots fill on first use and never change
//! afterwards, so concurrent discoveries of the same subject settle on
//! one shared artifact and a filled slot can be handed out without
//! copying.

use std::any::TypeId;
use std::sync::Arc;

use dashmap::DashMap;
use tracing::trace;

use crate::discovery::{DiscoveryOptions, RuleSet};
use crate::subject::member::{MemberSet, VisibilityMask};
use crate::subject::schema::Schema;

// ============================================================================
// KEY
// ============================================================================

/// Identity of one discovery: subject type plus the member filter.
///
/// Two filters that admit different members must never share an entry,
/// so the filter is part of the key. The caching switch is not: it only
/// decides whether this cache is consulted at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiscoveryKey {
    type_id: TypeId,
    visibility: VisibilityMask,
    skip_static: bool,
}

impl DiscoveryKey {
    /// Key for subject type `T` discovered under `options`.
    #[must_use]
    pub fn of<T: 'static>(options: &DiscoveryOptions) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            visibility: options.visibility,
            skip_static: options.skip_static,
        }
    }
}

// ============================================================================
// SLOTS
// ============================================================================

/// Which artifact a cache operation addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheItem {
    /// The instantiated rule set.
    Rules,
    /// The filtered member set.
    Members,
    /// The frozen schema.
    Schema,
}

/// A cached artifact.
#[derive(Debug, Clone)]
pub enum CacheValue {
    /// An instantiated rule set.
    Rules(Arc<RuleSet>),
    /// A filtered member set.
    Members(Arc<MemberSet>),
    /// A frozen schema.
    Schema(Arc<Schema>),
}

impl CacheValue {
    /// The slot this value belongs to.
    #[must_use]
    pub fn item(&self) -> CacheItem {
        match self {
            Self::Rules(_) => CacheItem::Rules,
            Self::Members(_) => CacheItem::Members,
            Self::Schema(_) => CacheItem::Schema,
        }
    }
}

/// Per-key artifact slots; each fills independently.
#[derive(Debug, Clone, Default)]
pub struct CacheSlots {
    rules: Option<Arc<RuleSet>>,
    members: Option<Arc<MemberSet>>,
    schema: Option<Arc<Schema>>,
}

impl CacheSlots {
    /// Fills the matching slot unless already taken; the first write
    /// wins so concurrent discoveries converge on one artifact.
    fn fill(&mut self, value: CacheValue) {
        match value {
            CacheValue::Rules(rules) => {
                if self.rules.is_none() {
                    self.rules = Some(rules);
                }
            }
            CacheValue::Members(members) => {
                if self.members.is_none() {
                    self.members = Some(members);
                }
            }
            CacheValue::Schema(schema) => {
                if self.schema.is_none() {
                    self.schema = Some(schema);
                }
            }
        }
    }
}

// ============================================================================
// CACHE
// ============================================================================

/// Concurrent discovery cache.
///
/// A disabled cache answers every lookup with a miss and drops every
/// store, which is how callers force fresh discoveries without touching
/// shared state.
#[derive(Debug)]
pub struct DiscoveryCache {
    entries: DashMap<DiscoveryKey, CacheSlots>,
    enabled: bool,
}

impl DiscoveryCache {
    /// An enabled, empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
            enabled: true,
        }
    }

    /// A cache that never stores anything.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            entries: DashMap::new(),
            enabled: false,
        }
    }

    /// Whether lookups and stores are honored.
    #[must_use]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Fetches one artifact.
    #[must_use]
    pub fn get(&self, key: &DiscoveryKey, item: CacheItem) -> Option<CacheValue> {
        if !self.enabled {
            return None;
        }
        let slots = self.entries.get(key)?;
        let value = match item {
            CacheItem::Rules => slots.rules.clone().map(CacheValue::Rules),
            CacheItem::Members => slots.members.clone().map(CacheValue::Members),
            CacheItem::Schema => slots.schema.clone().map(CacheValue::Schema),
        };
        trace!(?key, ?item, hit = value.is_some(), "discovery cache lookup");
        value
    }

    /// Stores one artifact; concurrent stores of the same slot keep the
    /// first value.
    pub fn put(&self, key: DiscoveryKey, value: CacheValue) {
        if !self.enabled {
            return;
        }
        trace!(?key, item = ?value.item(), "discovery cache store");
        self.entries.entry(key).or_default().fill(value);
    }

    /// Whether an artifact is present.
    #[must_use]
    pub fn has(&self, key: &DiscoveryKey, item: CacheItem) -> bool {
        self.get(key, item).is_some()
    }

    /// Drops every entry; artifacts already handed out stay alive
    /// through their `Arc`s.
    pub fn clear(&self) {
        trace!("discovery cache cleared");
        self.entries.clear();
    }

    /// Number of keyed entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn rules(&self, key: &DiscoveryKey) -> Option<Arc<RuleSet>> {
        match self.get(key, CacheItem::Rules) {
            Some(CacheValue::Rules(rules)) => Some(rules),
            _ => None,
        }
    }

    pub(crate) fn members(&self, key: &DiscoveryKey) -> Option<Arc<MemberSet>> {
        match self.get(key, CacheItem::Members) {
            Some(CacheValue::Members(members)) => Some(members),
            _ => None,
        }
    }

    pub(crate) fn schema(&self, key: &DiscoveryKey) -> Option<Arc<Schema>> {
        match self.get(key, CacheItem::Schema) {
            Some(CacheValue::Schema(schema)) => Some(schema),
            _ => None,
        }
    }
}

impl Default for DiscoveryCache {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use indexmap::IndexMap;

    struct Marker;

    fn key() -> DiscoveryKey {
        DiscoveryKey::of::<Marker>(&DiscoveryOptions::default())
    }

    fn member_set() -> Arc<MemberSet> {
        Arc::new(MemberSet::new(
            TypeId::of::<Marker>(),
            "Marker",
            IndexMap::new(),
        ))
    }

    #[test]
    fn slots_fill_independently() {
        let cache = DiscoveryCache::new();
        cache.put(key(), CacheValue::Members(member_set()));

        assert!(cache.has(&key(), CacheItem::Members));
        assert!(!cache.has(&key(), CacheItem::Rules));
        assert!(!cache.has(&key(), CacheItem::Schema));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn first_store_wins() {
        let cache = DiscoveryCache::new();
        let first = member_set();
        cache.put(key(), CacheValue::Members(Arc::clone(&first)));
        cache.put(key(), CacheValue::Members(member_set()));

        let cached = cache.members(&key()).unwrap();
        assert!(Arc::ptr_eq(&cached, &first));
    }

    #[test]
    fn disabled_cache_stores_nothing() {
        let cache = DiscoveryCache::disabled();
        cache.put(key(), CacheValue::Members(member_set()));
        assert!(!cache.has(&key(), CacheItem::Members));
        assert!(!cache.enabled());
    }

    #[test]
    fn clear_keeps_handed_out_arcs_alive() {
        let cache = DiscoveryCache::new();
        cache.put(key(), CacheValue::Members(member_set()));
        let held = cache.members(&key()).unwrap();

        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(held.subject_name(), "Marker");
    }

    #[test]
    fn keys_discriminate_by_filter() {
        let cache = DiscoveryCache::new();
        let narrow = DiscoveryOptions {
            visibility: VisibilityMask::PUBLIC,
            ..DiscoveryOptions::default()
        };
        cache.put(key(), CacheValue::Members(member_set()));

        let narrow_key = DiscoveryKey::of::<Marker>(&narrow);
        assert_ne!(key(), narrow_key);
        assert!(!cache.has(&narrow_key, CacheItem::Members));
    }
}
