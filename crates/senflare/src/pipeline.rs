//! End-to-end run: collect, probe, resolve, rank.

use crate::report::Report;
use senflare_client::{CollectStats, SenflareClient, SourceConfig};
use senflare_core::{reachable_only, Endpoint, ReachableEndpoint, ResolvedEndpoint};
use senflare_recon::{Connector, Prober, Resolver, TcpConnector};
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;

/// Counts describing one run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    /// Sources that answered
    pub sources_ok: usize,
    /// Sources that were skipped
    pub sources_failed: usize,
    /// Unique candidates after dedup
    pub candidates: usize,
    /// Endpoints that accepted a connection
    pub reachable: usize,
    /// Country groups in the report
    pub regions: usize,
    /// Entries in the region cache after resolution
    pub cached: usize,
    /// Wall time of the run in milliseconds
    pub elapsed_ms: u64,
}

impl RunSummary {
    /// Elapsed wall time
    #[must_use]
    pub const fn elapsed(&self) -> Duration {
        Duration::from_millis(self.elapsed_ms)
    }
}

/// Everything a run produced
#[derive(Debug, Clone, Default)]
pub struct RunOutput {
    /// Reachable endpoints in probe completion order
    pub reachable: Vec<ReachableEndpoint>,
    /// Resolved endpoints in the same order
    pub resolved: Vec<ResolvedEndpoint>,
    /// Ranked report
    pub report: Report,
    /// Run counters
    pub summary: RunSummary,
}

/// The full collect → probe → resolve → report pipeline.
///
/// The probe and resolve stages run one after the other; each has its own
/// worker pool. Persisting the region cache is left to the caller so an
/// interrupted run never writes a partial cache.
pub struct Pipeline<C: Connector = TcpConnector> {
    client: SenflareClient,
    sources: SourceConfig,
    prober: Prober<C>,
    resolver: Resolver,
}

impl<C: Connector> Pipeline<C> {
    /// Assemble a pipeline from its stages
    #[must_use]
    pub fn new(
        client: SenflareClient,
        sources: SourceConfig,
        prober: Prober<C>,
        resolver: Resolver,
    ) -> Self {
        Self {
            client,
            sources,
            prober,
            resolver,
        }
    }

    /// The resolver (and through it the region cache)
    #[must_use]
    pub const fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// Collect candidates from every configured source, then process them
    pub async fn run(&self) -> RunOutput {
        let start = Instant::now();
        info!(sources = self.sources.urls.len(), "collecting candidates");
        let collection = self.client.sources().collect(&self.sources).await;
        self.finish(start, collection.endpoints, collection.stats)
            .await
    }

    /// Probe, resolve and rank an already collected candidate list
    pub async fn process(&self, candidates: Vec<Endpoint>) -> RunOutput {
        self.finish(Instant::now(), candidates, CollectStats::default())
            .await
    }

    async fn finish(
        &self,
        start: Instant,
        candidates: Vec<Endpoint>,
        stats: CollectStats,
    ) -> RunOutput {
        let mut summary = RunSummary {
            sources_ok: stats.succeeded,
            sources_failed: stats.failed,
            candidates: candidates.len(),
            ..RunSummary::default()
        };

        if candidates.is_empty() {
            info!("no candidates collected, nothing to probe");
            summary.elapsed_ms = elapsed_ms(start);
            return RunOutput {
                summary,
                ..RunOutput::default()
            };
        }

        let probed = self.prober.probe(&candidates).await;
        let reachable = reachable_only(probed);
        summary.reachable = reachable.len();
        info!(
            reachable = reachable.len(),
            candidates = candidates.len(),
            "probing finished"
        );

        let resolved = self.resolver.resolve(&reachable).await;
        let report = Report::build(&resolved);

        summary.regions = report.group_count();
        summary.cached = self.resolver.cache().len();
        summary.elapsed_ms = elapsed_ms(start);

        info!(
            sources_ok = summary.sources_ok,
            sources_failed = summary.sources_failed,
            candidates = summary.candidates,
            reachable = summary.reachable,
            regions = summary.regions,
            cached = summary.cached,
            elapsed_secs = summary.elapsed().as_secs_f64(),
            "run finished"
        );

        RunOutput {
            reachable,
            resolved,
            report,
            summary,
        }
    }
}

fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}
