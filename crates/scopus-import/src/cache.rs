//! Time-limited meta cache for previously fetched publications.
//!
//! Full abstract retrievals are the expensive part of an import run, and
//! most candidate publications get dismissed on metadata alone (publish
//! date, author affiliations). The cache keeps exactly that decision-relevant
//! metadata per scopus id so future runs can skip the fetch.
//!
//! The whole cache lives in memory while a run is active and is flushed to a
//! single persisted blob via [`MetaCache::save`]. There is no incremental
//! persistence and no locking; a run's load, mutate, save cycle must be
//! exclusive.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::api;
use crate::error::{CacheError, CacheResult};
use crate::store::CacheStore;

/// Decision-relevant metadata for one previously fetched publication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Publication date in ISO format (YYYY-MM-DD).
    pub publish_date: String,

    /// Scopus author id to affiliation id, for those authors of the
    /// publication that carried affiliation information. Partial by nature.
    #[serde(default)]
    pub author_affiliations: HashMap<String, String>,

    /// Local ids of the observed authors matched against this publication.
    #[serde(default)]
    pub observed_author_ids: Vec<i64>,

    /// When this entry was written.
    pub added_at: DateTime<Utc>,
}

/// The fields a cache update supplies; `added_at` is stamped internally.
#[derive(Debug, Clone, Default)]
pub struct CacheMeta {
    /// Publication date in ISO format (YYYY-MM-DD).
    pub publish_date: String,

    /// Scopus author id to affiliation id.
    pub author_affiliations: HashMap<String, String>,

    /// Local ids of the matched observed authors.
    pub observed_author_ids: Vec<i64>,
}

/// Persistent, time-limited map from scopus id to [`CacheEntry`].
#[derive(Debug, Default)]
pub struct MetaCache {
    entries: HashMap<String, CacheEntry>,
}

impl MetaCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the cache from its persisted blob. A missing blob yields an
    /// empty cache.
    pub fn load(store: &dyn CacheStore) -> CacheResult<Self> {
        let entries = match store.load()? {
            Some(blob) => serde_json::from_str(&blob)?,
            None => HashMap::new(),
        };
        Ok(Self { entries })
    }

    /// Flush the whole cache to its persisted blob.
    pub fn save(&self, store: &dyn CacheStore) -> CacheResult<()> {
        let blob = serde_json::to_string(&self.entries)?;
        store.save(&blob)
    }

    /// Whether a live entry exists for the given scopus id.
    ///
    /// An entry whose age exceeds the lifetime is deleted as a side effect
    /// and reported absent. This is a lazy-expiry read, not a background
    /// sweep; callers must not assume `contains` is side-effect-free.
    pub fn contains(&mut self, scopus_id: &str) -> bool {
        let Some(entry) = self.entries.get(scopus_id) else {
            return false;
        };
        if Self::is_lifetime_exceeded(entry) {
            tracing::debug!(scopus_id, "Evicting expired cache entry");
            self.entries.remove(scopus_id);
            return false;
        }
        true
    }

    /// Look up the entry for a scopus id.
    ///
    /// Does not check expiry; callers are expected to call
    /// [`MetaCache::contains`] first. A miss fails loudly because it
    /// indicates a caller bug, not missing data.
    pub fn get(&self, scopus_id: &str) -> CacheResult<&CacheEntry> {
        self.entries.get(scopus_id).ok_or_else(|| CacheError::not_found(scopus_id))
    }

    /// Upsert the entry for a scopus id, stamping `added_at` to now. Prior
    /// fields are fully overwritten, not merged.
    pub fn update(&mut self, scopus_id: &str, meta: CacheMeta) {
        let entry = CacheEntry {
            publish_date: meta.publish_date,
            author_affiliations: meta.author_affiliations,
            observed_author_ids: meta.observed_author_ids,
            added_at: Utc::now(),
        };
        self.entries.insert(scopus_id.to_string(), entry);
    }

    /// Number of entries, expired ones included until they are read.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whole days elapsed beyond the lifetime count as expired; the boundary
    /// day itself is retained.
    fn is_lifetime_exceeded(entry: &CacheEntry) -> bool {
        let age = Utc::now().signed_duration_since(entry.added_at);
        age.num_days() > api::CACHE_LIFETIME_DAYS
    }

    #[cfg(test)]
    pub(crate) fn insert_raw(&mut self, scopus_id: &str, entry: CacheEntry) {
        self.entries.insert(scopus_id.to_string(), entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCacheStore;
    use chrono::Duration;

    fn entry_added(days_ago: i64) -> CacheEntry {
        CacheEntry {
            publish_date: "2021-09-22".to_string(),
            author_affiliations: HashMap::new(),
            observed_author_ids: vec![],
            added_at: Utc::now() - Duration::days(days_ago),
        }
    }

    #[test]
    fn test_contains_fresh_entry() {
        let mut cache = MetaCache::new();
        cache.insert_raw("100", entry_added(0));
        assert!(cache.contains("100"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_contains_expired_entry_evicts() {
        let mut cache = MetaCache::new();
        cache.insert_raw("100", entry_added(31));
        assert!(!cache.contains("100"));
        // Lazy eviction removed the entry.
        assert_eq!(cache.len(), 0);
    }

    #[test]
    fn test_entry_on_lifetime_boundary_is_retained() {
        let mut cache = MetaCache::new();
        cache.insert_raw("100", entry_added(30));
        assert!(cache.contains("100"));
    }

    #[test]
    fn test_contains_absent() {
        let mut cache = MetaCache::new();
        assert!(!cache.contains("100"));
    }

    #[test]
    fn test_get_miss_fails_loudly() {
        let cache = MetaCache::new();
        let err = cache.get("100").unwrap_err();
        assert!(matches!(err, CacheError::NotFound { .. }));
    }

    #[test]
    fn test_update_overwrites_fully() {
        let mut cache = MetaCache::new();
        cache.update(
            "100",
            CacheMeta {
                publish_date: "2020-01-01".to_string(),
                author_affiliations: HashMap::from([("A1".to_string(), "60001".to_string())]),
                observed_author_ids: vec![1],
            },
        );
        cache.update(
            "100",
            CacheMeta { publish_date: "2021-09-22".to_string(), ..Default::default() },
        );

        let entry = cache.get("100").unwrap();
        assert_eq!(entry.publish_date, "2021-09-22");
        // Not a deep merge: the old affiliation map is gone.
        assert!(entry.author_affiliations.is_empty());
        assert!(entry.observed_author_ids.is_empty());
    }

    #[test]
    fn test_save_load_round_trip() {
        let store = MemoryCacheStore::default();

        let mut cache = MetaCache::new();
        cache.update(
            "100",
            CacheMeta {
                publish_date: "2021-09-22".to_string(),
                author_affiliations: HashMap::from([("A1".to_string(), "20".to_string())]),
                observed_author_ids: vec![7],
            },
        );
        cache.save(&store).unwrap();

        let loaded = MetaCache::load(&store).unwrap();
        assert_eq!(loaded.len(), 1);
        let entry = loaded.get("100").unwrap();
        assert_eq!(entry.author_affiliations.get("A1").map(String::as_str), Some("20"));
        assert_eq!(entry.observed_author_ids, vec![7]);
    }

    #[test]
    fn test_load_missing_blob_yields_empty_cache() {
        let store = MemoryCacheStore::default();
        let cache = MetaCache::load(&store).unwrap();
        assert!(cache.is_empty());
    }
}
