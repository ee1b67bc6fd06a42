//! Concurrent, cache-first region resolution.
//!
//! Work is spawned as index-tagged tasks and every result lands in the slot
//! of its input position, so output order always equals input order no
//! matter how the lookups complete.

use senflare_core::{Endpoint, ReachableEndpoint, RegionCode, RegionLookup, ResolvedEndpoint};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cache::RegionCache;

/// Upper bound on concurrent lookups regardless of the global worker count
pub const MAX_RESOLVE_WORKERS: usize = 15;

/// Resolution configuration
#[derive(Debug, Clone)]
pub struct ResolveConfig {
    /// Concurrent lookups
    pub workers: usize,
    /// Pause before every n-th network lookup (cache hits do not count)
    pub pace_every: usize,
    /// Length of that pause
    pub pace_delay: Duration,
}

impl Default for ResolveConfig {
    fn default() -> Self {
        Self {
            workers: MAX_RESOLVE_WORKERS,
            pace_every: 5,
            pace_delay: Duration::from_millis(100),
        }
    }
}

impl ResolveConfig {
    /// Derive the worker count from the global worker limit
    #[must_use]
    pub fn for_max_workers(max_workers: usize) -> Self {
        Self::default().workers(max_workers)
    }

    /// Set concurrent lookups (capped at [`MAX_RESOLVE_WORKERS`])
    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers.clamp(1, MAX_RESOLVE_WORKERS);
        self
    }

    /// Set the pacing interval in network lookups (0 disables pacing)
    #[must_use]
    pub const fn pace_every(mut self, n: usize) -> Self {
        self.pace_every = n;
        self
    }

    /// Set the pacing delay
    #[must_use]
    pub const fn pace_delay(mut self, delay: Duration) -> Self {
        self.pace_delay = delay;
        self
    }
}

/// Region resolver with cache, primary and fallback lookup services
#[derive(Clone)]
pub struct Resolver {
    inner: Arc<ResolverInner>,
}

struct ResolverInner {
    cache: Arc<RegionCache>,
    primary: Arc<dyn RegionLookup>,
    fallback: Arc<dyn RegionLookup>,
    config: ResolveConfig,
    network_lookups: AtomicUsize,
}

impl Resolver {
    /// Create a resolver with default settings
    #[must_use]
    pub fn new(
        cache: Arc<RegionCache>,
        primary: Arc<dyn RegionLookup>,
        fallback: Arc<dyn RegionLookup>,
    ) -> Self {
        Self::with_config(cache, primary, fallback, ResolveConfig::default())
    }

    /// Create a resolver with custom settings
    #[must_use]
    pub fn with_config(
        cache: Arc<RegionCache>,
        primary: Arc<dyn RegionLookup>,
        fallback: Arc<dyn RegionLookup>,
        config: ResolveConfig,
    ) -> Self {
        Self {
            inner: Arc::new(ResolverInner {
                cache,
                primary,
                fallback,
                config,
                network_lookups: AtomicUsize::new(0),
            }),
        }
    }

    /// The cache this resolver reads and writes
    #[must_use]
    pub fn cache(&self) -> &Arc<RegionCache> {
        &self.inner.cache
    }

    /// Network lookups made so far (cache hits excluded)
    #[must_use]
    pub fn network_lookups(&self) -> usize {
        self.inner.network_lookups.load(Ordering::Relaxed)
    }

    /// Resolve a batch of reachable endpoints, preserving input order
    pub async fn resolve(&self, endpoints: &[ReachableEndpoint]) -> Vec<ResolvedEndpoint> {
        let total = endpoints.len();
        if total == 0 {
            return Vec::new();
        }

        let workers = self.inner.config.workers.max(1);
        info!(total, workers, "resolving regions");
        let start = Instant::now();

        let semaphore = Arc::new(Semaphore::new(workers));
        let mut set = JoinSet::new();

        for (index, item) in endpoints.iter().enumerate() {
            let resolver = self.clone();
            let endpoint = item.endpoint.clone();
            let semaphore = Arc::clone(&semaphore);
            set.spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                let region = resolver.resolve_one(&endpoint).await;
                (index, region)
            });
        }

        let mut slots: Vec<Option<RegionCode>> = vec![None; total];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((index, region)) => slots[index] = Some(region),
                Err(e) => warn!(error = %e, "resolution task failed"),
            }
        }

        let resolved: Vec<ResolvedEndpoint> = endpoints
            .iter()
            .zip(slots)
            .enumerate()
            .map(|(i, (item, region))| {
                let region = region.unwrap_or_else(RegionCode::unknown);
                info!(
                    "[{}/{total}] {} -> {} ({}) - {:.1}s",
                    i + 1,
                    item.endpoint,
                    region.display_name(),
                    region,
                    start.elapsed().as_secs_f64()
                );
                ResolvedEndpoint::new(item.endpoint.clone(), region, item.latency_ms)
            })
            .collect();

        info!(
            total,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "region resolution finished"
        );
        resolved
    }

    /// Resolve one endpoint: fresh cache entry, then primary, then fallback.
    ///
    /// Never fails. When neither service answers the endpoint is classified
    /// as unknown and that classification is cached like any other.
    pub async fn resolve_one(&self, endpoint: &Endpoint) -> RegionCode {
        let inner = &self.inner;

        if let Some(region) = inner.cache.get(endpoint) {
            debug!(endpoint = %endpoint, region = %region, "cache hit");
            return region;
        }

        self.pace().await;

        let region = match inner.primary.lookup(endpoint).await {
            Ok(region) => region,
            Err(primary_err) => {
                debug!(
                    endpoint = %endpoint,
                    service = inner.primary.name(),
                    error = %primary_err,
                    "primary lookup failed, trying fallback"
                );
                match inner.fallback.lookup(endpoint).await {
                    Ok(region) => region,
                    Err(fallback_err) => {
                        warn!(
                            endpoint = %endpoint,
                            primary = %primary_err,
                            fallback = %fallback_err,
                            "region lookup failed"
                        );
                        RegionCode::unknown()
                    }
                }
            }
        };

        inner.cache.put(endpoint, &region);
        region
    }

    async fn pace(&self) {
        let config = &self.inner.config;
        let count = self.inner.network_lookups.fetch_add(1, Ordering::Relaxed) + 1;
        if config.pace_every > 0 && count % config.pace_every == 0 && !config.pace_delay.is_zero() {
            tokio::time::sleep(config.pace_delay).await;
        }
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("primary", &self.inner.primary.name())
            .field("fallback", &self.inner.fallback.name())
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheConfig;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use rand::Rng;
    use senflare_core::{LookupFailure, LookupResult};
    use std::collections::HashMap;

    /// Scripted lookup service with optional random delays
    struct MockLookup {
        name: &'static str,
        answers: HashMap<String, LookupResult>,
        default: LookupResult,
        max_delay_ms: u64,
        calls: Mutex<Vec<String>>,
    }

    impl MockLookup {
        fn new(name: &'static str, default: LookupResult) -> Self {
            Self {
                name,
                answers: HashMap::new(),
                default,
                max_delay_ms: 0,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn answer(mut self, ip: &str, result: LookupResult) -> Self {
            self.answers.insert(ip.to_string(), result);
            self
        }

        fn jitter(mut self, max_delay_ms: u64) -> Self {
            self.max_delay_ms = max_delay_ms;
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().clone()
        }
    }

    #[async_trait]
    impl RegionLookup for MockLookup {
        fn name(&self) -> &str {
            self.name
        }

        async fn lookup(&self, endpoint: &Endpoint) -> LookupResult {
            self.calls.lock().push(endpoint.to_string());
            if self.max_delay_ms > 0 {
                let delay = rand::thread_rng().gen_range(0..=self.max_delay_ms);
                tokio::time::sleep(Duration::from_millis(delay)).await;
            }
            self.answers
                .get(endpoint.as_str())
                .cloned()
                .unwrap_or_else(|| self.default.clone())
        }
    }

    fn ep(s: &str) -> Endpoint {
        Endpoint::parse(s).unwrap()
    }

    fn code(s: &str) -> RegionCode {
        RegionCode::from_stored(s)
    }

    fn reachable(ip: &str, ms: u64) -> ReachableEndpoint {
        ReachableEndpoint::new(ep(ip), ms)
    }

    fn empty_cache() -> Arc<RegionCache> {
        Arc::new(RegionCache::new(CacheConfig::default()))
    }

    fn no_pacing() -> ResolveConfig {
        ResolveConfig::default().pace_every(0)
    }

    #[tokio::test]
    async fn test_output_order_matches_input() {
        let primary = Arc::new(
            MockLookup::new("primary", Err(LookupFailure::MissingCode))
                .answer("1.0.0.1", Ok(code("US")))
                .answer("1.0.0.2", Ok(code("JP")))
                .answer("1.0.0.3", Ok(code("DE")))
                .jitter(40),
        );
        let fallback = Arc::new(MockLookup::new("fallback", Err(LookupFailure::Timeout)));
        let resolver = Resolver::with_config(empty_cache(), primary, fallback, no_pacing());

        let input = [
            reachable("1.0.0.1", 10),
            reachable("1.0.0.2", 5),
            reachable("1.0.0.3", 20),
        ];
        for _ in 0..5 {
            resolver.cache().clear();
            let out = resolver.resolve(&input).await;
            let shown: Vec<(&str, &str, u64)> = out
                .iter()
                .map(|r| (r.endpoint.as_str(), r.region.as_str(), r.latency_ms))
                .collect();
            assert_eq!(
                shown,
                [("1.0.0.1", "US", 10), ("1.0.0.2", "JP", 5), ("1.0.0.3", "DE", 20)]
            );
        }
    }

    #[tokio::test]
    async fn test_large_batch_order_with_duplicates() {
        let primary = Arc::new(MockLookup::new("primary", Ok(code("SG"))).jitter(5));
        let fallback = Arc::new(MockLookup::new("fallback", Err(LookupFailure::Timeout)));
        let resolver = Resolver::with_config(empty_cache(), primary, fallback, no_pacing());

        let input: Vec<ReachableEndpoint> = (0..60u64)
            .map(|i| reachable(&format!("10.0.0.{}", i % 30), i))
            .collect();
        let out = resolver.resolve(&input).await;

        assert_eq!(out.len(), input.len());
        for (resolved, original) in out.iter().zip(&input) {
            assert_eq!(resolved.endpoint, original.endpoint);
            assert_eq!(resolved.latency_ms, original.latency_ms);
        }
    }

    #[tokio::test]
    async fn test_fallback_used_after_primary_transport_error() {
        let primary = Arc::new(MockLookup::new(
            "primary",
            Err(LookupFailure::Transport("connection reset".into())),
        ));
        let fallback = Arc::new(MockLookup::new("fallback", Ok(code("NL"))));
        let cache = empty_cache();
        let resolver = Resolver::with_config(
            Arc::clone(&cache),
            primary.clone(),
            fallback.clone(),
            no_pacing(),
        );

        let region = resolver.resolve_one(&ep("5.5.5.5")).await;
        assert_eq!(region, code("NL"));
        assert_eq!(primary.calls(), ["5.5.5.5"]);
        assert_eq!(fallback.calls(), ["5.5.5.5"]);
        assert_eq!(cache.get(&ep("5.5.5.5")), Some(code("NL")));
    }

    #[tokio::test]
    async fn test_both_fail_caches_unknown() {
        let primary = Arc::new(MockLookup::new("primary", Err(LookupFailure::Status(429))));
        let fallback = Arc::new(MockLookup::new(
            "fallback",
            Err(LookupFailure::Rejected("private range".into())),
        ));
        let cache = empty_cache();
        let resolver =
            Resolver::with_config(Arc::clone(&cache), primary.clone(), fallback, no_pacing());

        assert!(resolver.resolve_one(&ep("10.1.1.1")).await.is_unknown());
        assert!(cache.get(&ep("10.1.1.1")).unwrap().is_unknown());

        // Negative entry is served from cache on the next run.
        assert!(resolver.resolve_one(&ep("10.1.1.1")).await.is_unknown());
        assert_eq!(primary.calls().len(), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let primary = Arc::new(MockLookup::new("primary", Ok(code("US"))));
        let fallback = Arc::new(MockLookup::new("fallback", Ok(code("US"))));
        let cache = empty_cache();
        cache.put(&ep("1.1.1.1"), &code("AU"));

        let resolver =
            Resolver::with_config(cache, primary.clone(), fallback.clone(), no_pacing());
        let out = resolver.resolve(&[reachable("1.1.1.1", 12)]).await;

        assert_eq!(out[0].region, code("AU"));
        assert!(primary.calls().is_empty());
        assert!(fallback.calls().is_empty());
        assert_eq!(resolver.network_lookups(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pacing_counts_network_lookups_only() {
        let primary = Arc::new(MockLookup::new("primary", Ok(code("US"))));
        let fallback = Arc::new(MockLookup::new("fallback", Ok(code("US"))));
        let cache = empty_cache();
        cache.put(&ep("9.9.9.9"), &code("CH"));

        let config = ResolveConfig::default()
            .workers(1)
            .pace_every(5)
            .pace_delay(Duration::from_secs(10));
        let resolver = Resolver::with_config(cache, primary, fallback, config);

        let mut input: Vec<ReachableEndpoint> =
            (1..=4).map(|i| reachable(&format!("2.0.0.{i}"), 1)).collect();
        input.push(reachable("9.9.9.9", 1));

        let start = Instant::now();
        resolver.resolve(&input).await;
        assert_eq!(resolver.network_lookups(), 4);
        assert!(start.elapsed() < Duration::from_secs(10));

        resolver.resolve(&[reachable("2.0.0.5", 1)]).await;
        assert_eq!(resolver.network_lookups(), 5);
        assert!(start.elapsed() >= Duration::from_secs(10));
    }

    #[test]
    fn test_worker_cap() {
        assert_eq!(ResolveConfig::for_max_workers(20).workers, 15);
        assert_eq!(ResolveConfig::for_max_workers(4).workers, 4);
        assert_eq!(ResolveConfig::for_max_workers(0).workers, 1);
    }

    #[tokio::test]
    async fn test_empty_input() {
        let primary = Arc::new(MockLookup::new("primary", Ok(code("US"))));
        let fallback = Arc::new(MockLookup::new("fallback", Ok(code("US"))));
        let resolver = Resolver::new(empty_cache(), primary, fallback);
        assert!(resolver.resolve(&[]).await.is_empty());
    }
}
