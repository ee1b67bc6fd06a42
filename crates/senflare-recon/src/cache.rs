//! Persistent TTL region cache.
//!
//! The cache maps endpoint strings to the region code they last resolved to.
//! It is loaded once per run, pruned once before the first lookup, updated by
//! concurrent resolution workers and written back as a whole file at the end.
//!
//! On disk it is a flat JSON object. Each value is either a bare region string
//! (the legacy format, honored without a freshness check) or an object with
//! `region` and a local `timestamp` without timezone.

use chrono::{Local, NaiveDateTime, Timelike};
use dashmap::DashMap;
use parking_lot::Mutex;
use senflare_core::{Endpoint, RegionCode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::error::{ReconError, ReconResult};

/// Seven days: region assignments rarely change
pub const DEFAULT_TTL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Hard cap on cached entries
pub const DEFAULT_CAPACITY: usize = 1000;

/// Default cache file name
pub const DEFAULT_CACHE_FILE: &str = "Cache.json";

/// Cache location and limits
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Cache file
    pub path: PathBuf,
    /// Maximum age of a timestamped entry
    pub ttl: Duration,
    /// Maximum number of entries
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_CACHE_FILE),
            ttl: DEFAULT_TTL,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

impl CacheConfig {
    /// Set the cache file
    #[must_use]
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = path.into();
        self
    }

    /// Set the entry TTL
    #[must_use]
    pub const fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the entry cap
    #[must_use]
    pub const fn capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// A cached classification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredEntry", into = "StoredEntry")]
pub enum CacheEntry {
    /// Bare region string from older cache files
    Legacy {
        /// Region code
        region: String,
    },
    /// Region with the local time it was resolved
    Timestamped {
        /// Region code
        region: String,
        /// When the region was resolved
        resolved_at: NaiveDateTime,
    },
}

impl CacheEntry {
    /// Region code stored in the entry
    #[must_use]
    pub fn region(&self) -> &str {
        match self {
            Self::Legacy { region } | Self::Timestamped { region, .. } => region,
        }
    }

    /// Resolution time, if recorded
    #[must_use]
    pub const fn resolved_at(&self) -> Option<NaiveDateTime> {
        match self {
            Self::Legacy { .. } => None,
            Self::Timestamped { resolved_at, .. } => Some(*resolved_at),
        }
    }

    /// Legacy entries never expire; timestamped ones expire once their age reaches `ttl`
    #[must_use]
    pub fn is_fresh(&self, now: NaiveDateTime, ttl: Duration) -> bool {
        match self {
            Self::Legacy { .. } => true,
            Self::Timestamped { resolved_at, .. } => {
                // Clock skew can put an entry in the future; count that as zero age.
                let age = now.signed_duration_since(*resolved_at).to_std().unwrap_or_default();
                age < ttl
            }
        }
    }
}

/// On-disk shape of an entry
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum StoredEntry {
    Record {
        region: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        timestamp: Option<NaiveDateTime>,
    },
    Bare(String),
}

impl From<StoredEntry> for CacheEntry {
    fn from(stored: StoredEntry) -> Self {
        match stored {
            StoredEntry::Record {
                region,
                timestamp: Some(resolved_at),
            } => Self::Timestamped {
                region,
                resolved_at,
            },
            StoredEntry::Record {
                region,
                timestamp: None,
            }
            | StoredEntry::Bare(region) => Self::Legacy { region },
        }
    }
}

impl From<CacheEntry> for StoredEntry {
    fn from(entry: CacheEntry) -> Self {
        match entry {
            CacheEntry::Legacy { region } => Self::Bare(region),
            CacheEntry::Timestamped {
                region,
                resolved_at,
            } => Self::Record {
                region,
                timestamp: Some(resolved_at),
            },
        }
    }
}

/// Entries removed by a prune pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneStats {
    /// Removed because older than the TTL
    pub expired: usize,
    /// Removed to get back under the cap
    pub evicted: usize,
}

/// Cache composition at a point in time
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// All entries
    pub entries: usize,
    /// Entries without a timestamp
    pub legacy: usize,
    /// Timestamped entries younger than the TTL
    pub fresh: usize,
    /// Timestamped entries at or past the TTL
    pub expired: usize,
}

/// Current local time at microsecond precision
#[must_use]
pub fn local_now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(now.nanosecond() / 1_000 * 1_000)
        .unwrap_or(now)
}

/// Process-wide region cache.
///
/// Reads and writes go through a sharded concurrent map; cap enforcement is
/// serialized so concurrent inserts never evict more than needed.
pub struct RegionCache {
    entries: DashMap<String, CacheEntry>,
    config: CacheConfig,
    eviction: Mutex<()>,
}

impl std::fmt::Debug for RegionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegionCache")
            .field("entries", &self.entries.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RegionCache {
    /// Create an empty cache
    #[must_use]
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: DashMap::new(),
            config,
            eviction: Mutex::new(()),
        }
    }

    /// Load the cache file, then drop expired and over-cap entries
    #[must_use]
    pub fn open(config: CacheConfig) -> Self {
        let cache = Self::load(config);
        cache.prune();
        cache
    }

    /// Load the cache file.
    ///
    /// A missing file yields an empty cache. An unreadable or malformed file is
    /// logged and also yields an empty cache. Individual entries that cannot be
    /// decoded are skipped.
    #[must_use]
    pub fn load(config: CacheConfig) -> Self {
        let cache = Self::new(config);
        let path = cache.config.path.clone();

        if !path.exists() {
            info!(path = %path.display(), "cache file not found, starting empty");
            return cache;
        }

        match read_entries(&path) {
            Ok((entries, skipped)) => {
                for (key, entry) in entries {
                    cache.entries.insert(key, entry);
                }
                if skipped > 0 {
                    warn!(skipped, "ignored undecodable cache entries");
                }
                info!(path = %path.display(), entries = cache.len(), "loaded region cache");
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to load cache, starting empty");
            }
        }
        cache
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the cache holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fresh region for `endpoint`, if any
    #[must_use]
    pub fn get(&self, endpoint: &Endpoint) -> Option<RegionCode> {
        self.get_at(endpoint, local_now())
    }

    /// Fresh region for `endpoint` as of `now`
    #[must_use]
    pub fn get_at(&self, endpoint: &Endpoint, now: NaiveDateTime) -> Option<RegionCode> {
        let entry = self.entries.get(endpoint.as_str())?;
        if entry.is_fresh(now, self.config.ttl) {
            Some(RegionCode::from_stored(entry.region()))
        } else {
            debug!(endpoint = %endpoint, "cache entry expired");
            None
        }
    }

    /// Raw entry for `endpoint`, regardless of freshness
    #[must_use]
    pub fn entry(&self, endpoint: &Endpoint) -> Option<CacheEntry> {
        self.entries.get(endpoint.as_str()).map(|e| e.value().clone())
    }

    /// Record a resolution made now
    pub fn put(&self, endpoint: &Endpoint, region: &RegionCode) {
        self.put_at(endpoint, region, local_now());
    }

    /// Record a resolution made at `now`, evicting the oldest entries if over the cap
    pub fn put_at(&self, endpoint: &Endpoint, region: &RegionCode, now: NaiveDateTime) {
        self.entries.insert(
            endpoint.as_str().to_string(),
            CacheEntry::Timestamped {
                region: region.as_str().to_string(),
                resolved_at: now,
            },
        );

        if self.entries.len() > self.config.capacity {
            let evicted = self.enforce_cap(self.config.capacity);
            debug!(evicted, "cache over capacity, evicted oldest entries");
        }
    }

    /// Prune with the configured TTL and capacity
    pub fn prune(&self) -> PruneStats {
        self.prune_expired_and_enforce_cap(self.config.ttl, self.config.capacity, local_now())
    }

    /// Drop entries older than `ttl`, then evict oldest-first down to `capacity`.
    ///
    /// Legacy entries never expire but sort as oldest when eviction is needed.
    pub fn prune_expired_and_enforce_cap(
        &self,
        ttl: Duration,
        capacity: usize,
        now: NaiveDateTime,
    ) -> PruneStats {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.is_fresh(now, ttl));
        let expired = before - self.entries.len();

        let evicted = self.enforce_cap(capacity);

        if expired > 0 {
            info!(expired, "removed expired cache entries");
        }
        if evicted > 0 {
            info!(evicted, capacity, "cache over capacity, removed oldest entries");
        }
        PruneStats { expired, evicted }
    }

    fn enforce_cap(&self, capacity: usize) -> usize {
        let _guard = self.eviction.lock();

        let len = self.entries.len();
        if len <= capacity {
            return 0;
        }

        let mut by_age: Vec<(Option<NaiveDateTime>, String)> = self
            .entries
            .iter()
            .map(|e| (e.value().resolved_at(), e.key().clone()))
            .collect();
        by_age.sort();

        let excess = len - capacity;
        for (_, key) in by_age.into_iter().take(excess) {
            self.entries.remove(&key);
        }
        excess
    }

    /// Composition of the cache as of `now`
    #[must_use]
    pub fn stats_at(&self, now: NaiveDateTime) -> CacheStats {
        let mut stats = CacheStats::default();
        for entry in &self.entries {
            stats.entries += 1;
            match entry.value() {
                CacheEntry::Legacy { .. } => stats.legacy += 1,
                e if e.is_fresh(now, self.config.ttl) => stats.fresh += 1,
                CacheEntry::Timestamped { .. } => stats.expired += 1,
            }
        }
        stats
    }

    /// Composition of the cache right now
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats_at(local_now())
    }

    /// Remove every entry
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Rewrite the cache file with the current contents.
    ///
    /// The file is replaced atomically; on failure the old file and the
    /// in-memory cache are left untouched.
    pub fn persist(&self) -> ReconResult<()> {
        let snapshot: BTreeMap<String, CacheEntry> = self
            .entries
            .iter()
            .map(|e| (e.key().clone(), e.value().clone()))
            .collect();
        let json = serde_json::to_string(&snapshot)?;

        let path = &self.config.path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                ReconError::Cache(format!("failed to create {}: {e}", parent.display()))
            })?;
        }

        let mut tmp = path.as_os_str().to_owned();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        std::fs::write(&tmp, json)
            .map_err(|e| ReconError::Cache(format!("failed to write {}: {e}", tmp.display())))?;
        std::fs::rename(&tmp, path).map_err(|e| {
            let _ = std::fs::remove_file(&tmp);
            ReconError::Cache(format!("failed to replace {}: {e}", path.display()))
        })?;

        info!(path = %path.display(), entries = snapshot.len(), "saved region cache");
        Ok(())
    }
}

type DecodedEntries = (Vec<(String, CacheEntry)>, usize);

fn read_entries(path: &Path) -> ReconResult<DecodedEntries> {
    let content = std::fs::read_to_string(path)?;
    let raw: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&content)?;

    let mut skipped = 0;
    let mut entries = Vec::with_capacity(raw.len());
    for (key, value) in raw {
        match serde_json::from_value::<CacheEntry>(value) {
            Ok(entry) => entries.push((key, entry)),
            Err(e) => {
                debug!(key = %key, error = %e, "skipping cache entry");
                skipped += 1;
            }
        }
    }
    Ok((entries, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::seq::SliceRandom;
    use std::sync::Arc;

    fn ep(s: &str) -> Endpoint {
        Endpoint::parse(s).unwrap()
    }

    fn code(s: &str) -> RegionCode {
        RegionCode::from_stored(s)
    }

    fn t0() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn secs(n: i64) -> chrono::Duration {
        chrono::Duration::seconds(n)
    }

    fn ttl_secs() -> i64 {
        i64::try_from(DEFAULT_TTL.as_secs()).unwrap()
    }

    #[test]
    fn test_ttl_boundaries() {
        let cache = RegionCache::new(CacheConfig::default());
        cache.put_at(&ep("1.1.1.1"), &code("US"), t0());

        let just_before = t0() + secs(ttl_secs() - 1);
        let just_after = t0() + secs(ttl_secs() + 1);
        assert_eq!(cache.get_at(&ep("1.1.1.1"), just_before), Some(code("US")));
        assert_eq!(cache.get_at(&ep("1.1.1.1"), just_after), None);
        assert_eq!(cache.get_at(&ep("1.1.1.1"), t0() + secs(ttl_secs())), None);
    }

    #[test]
    fn test_future_timestamp_counts_as_fresh() {
        let cache = RegionCache::new(CacheConfig::default());
        cache.put_at(&ep("1.1.1.1"), &code("JP"), t0() + secs(3600));
        assert_eq!(cache.get_at(&ep("1.1.1.1"), t0()), Some(code("JP")));
    }

    #[test]
    fn test_legacy_entries_always_honored() {
        let entry = CacheEntry::Legacy {
            region: "SG".into(),
        };
        let far_future = t0() + secs(ttl_secs() * 100);
        assert!(entry.is_fresh(far_future, DEFAULT_TTL));
    }

    #[test]
    fn test_cap_evicts_single_oldest() {
        let cache = RegionCache::new(CacheConfig::default());
        let mut order: Vec<u32> = (0..1001).collect();
        order.shuffle(&mut rand::thread_rng());

        for i in order {
            let ip = format!("10.{}.{}.{}", i / 65536, (i / 256) % 256, i % 256);
            cache.put_at(&ep(&ip), &code("US"), t0() + secs(i64::from(i)));
        }

        assert_eq!(cache.len(), 1000);
        assert!(cache.entry(&ep("10.0.0.0")).is_none());
        assert!(cache.entry(&ep("10.0.0.1")).is_some());
        assert!(cache.entry(&ep("10.0.3.232")).is_some());
    }

    #[test]
    fn test_prune_drops_expired_then_legacy_first() {
        let cache = RegionCache::new(CacheConfig::default());
        cache.put_at(&ep("1.0.0.1"), &code("US"), t0() - secs(ttl_secs() + 60));
        cache.put_at(&ep("1.0.0.2"), &code("HK"), t0() - secs(60));
        cache.put_at(&ep("1.0.0.3"), &code("JP"), t0() - secs(30));
        cache.entries.insert(
            "1.0.0.4".into(),
            CacheEntry::Legacy {
                region: "DE".into(),
            },
        );

        let stats = cache.prune_expired_and_enforce_cap(DEFAULT_TTL, 2, t0());
        assert_eq!(stats, PruneStats { expired: 1, evicted: 1 });
        assert!(cache.entry(&ep("1.0.0.4")).is_none());
        assert!(cache.entry(&ep("1.0.0.2")).is_some());
        assert!(cache.entry(&ep("1.0.0.3")).is_some());
    }

    #[test]
    fn test_stats() {
        let cache = RegionCache::new(CacheConfig::default());
        cache.put_at(&ep("1.0.0.1"), &code("US"), t0() - secs(ttl_secs() + 1));
        cache.put_at(&ep("1.0.0.2"), &code("US"), t0());
        cache.entries.insert(
            "1.0.0.3".into(),
            CacheEntry::Legacy {
                region: "US".into(),
            },
        );
        assert_eq!(
            cache.stats_at(t0()),
            CacheStats {
                entries: 3,
                legacy: 1,
                fresh: 1,
                expired: 1,
            }
        );
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RegionCache::load(CacheConfig::default().path(dir.path().join("none.json")));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_malformed_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cache.json");
        std::fs::write(&path, "{not json").unwrap();
        let cache = RegionCache::load(CacheConfig::default().path(&path));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_load_mixed_formats() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cache.json");
        std::fs::write(
            &path,
            r#"{
                "1.1.1.1": "US",
                "8.8.8.8": {"region": "US", "timestamp": "2025-03-01T12:00:00.123456"},
                "9.9.9.9": {"region": "CH"},
                "7.7.7.7": 42
            }"#,
        )
        .unwrap();

        let cache = RegionCache::load(CacheConfig::default().path(&path));
        assert_eq!(cache.len(), 3);
        assert_eq!(
            cache.entry(&ep("1.1.1.1")),
            Some(CacheEntry::Legacy {
                region: "US".into()
            })
        );
        assert_eq!(
            cache.entry(&ep("9.9.9.9")),
            Some(CacheEntry::Legacy {
                region: "CH".into()
            })
        );
        let stamped = cache.entry(&ep("8.8.8.8")).unwrap();
        assert_eq!(
            stamped.resolved_at().unwrap(),
            t0().with_nanosecond(123_456_000).unwrap()
        );
    }

    #[test]
    fn test_persist_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("Cache.json");
        let config = CacheConfig::default().path(&path);

        let cache = RegionCache::new(config.clone());
        cache.put_at(&ep("1.1.1.1"), &code("US"), t0());
        cache.entries.insert(
            "2.2.2.2".into(),
            CacheEntry::Legacy {
                region: "FR".into(),
            },
        );
        cache.persist().unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["2.2.2.2"], "FR");
        assert_eq!(raw["1.1.1.1"]["region"], "US");
        assert_eq!(raw["1.1.1.1"]["timestamp"], "2025-03-01T12:00:00");

        let reloaded = RegionCache::load(config);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.entry(&ep("1.1.1.1")), cache.entry(&ep("1.1.1.1")));
    }

    #[test]
    fn test_persist_failure_keeps_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();

        let cache = RegionCache::new(CacheConfig::default().path(blocker.join("Cache.json")));
        cache.put(&ep("1.1.1.1"), &code("US"));
        assert!(cache.persist().is_err());
        assert_eq!(cache.get(&ep("1.1.1.1")), Some(code("US")));
    }

    #[test]
    fn test_open_prunes_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Cache.json");
        std::fs::write(
            &path,
            r#"{"1.1.1.1": {"region": "US", "timestamp": "2000-01-01T00:00:00"}, "2.2.2.2": "FR"}"#,
        )
        .unwrap();

        let cache = RegionCache::open(CacheConfig::default().path(&path));
        assert_eq!(cache.len(), 1);
        assert!(cache.entry(&ep("2.2.2.2")).is_some());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_puts() {
        let cache = Arc::new(RegionCache::new(CacheConfig::default().capacity(500)));
        let mut handles = Vec::new();
        for worker in 0..8u32 {
            let cache = Arc::clone(&cache);
            handles.push(tokio::spawn(async move {
                for i in 0..100u32 {
                    let ip = format!("10.{worker}.{}.{}", i / 256, i % 256);
                    cache.put(&ep(&ip), &code("US"));
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(cache.len(), 500);
    }
}
