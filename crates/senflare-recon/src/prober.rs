//! TCP reachability probing.
//!
//! Endpoints are probed in fixed-size batches. Inside a batch a semaphore caps
//! the number of in-flight probes, and a batch deadline abandons stragglers so
//! a hung connect can never stall the run.

use async_trait::async_trait;
use senflare_core::{Endpoint, ProbeResult};
use std::io;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tracing::{info, trace, warn};

/// Opens TCP connections on behalf of the prober
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    /// Attempt one connect and return how long it took.
    ///
    /// Any error means "this port failed".
    async fn connect(&self, addr: SocketAddr, timeout: Duration) -> io::Result<Duration>;
}

/// Plain TCP connect (no raw sockets required)
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpConnector;

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, addr: SocketAddr, timeout: Duration) -> io::Result<Duration> {
        let start = Instant::now();
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => Ok(start.elapsed()),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(io::Error::new(io::ErrorKind::TimedOut, "connect timed out")),
        }
    }
}

/// Probing configuration
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Candidate ports, tried in order
    pub ports: Vec<u16>,
    /// Timeout per connect attempt
    pub connect_timeout: Duration,
    /// A connect faster than this ends probing of the endpoint
    pub fast_latency: Duration,
    /// Endpoints per batch
    pub batch_size: usize,
    /// Maximum concurrent probes within a batch
    pub concurrent: usize,
    /// Deadline for a whole batch
    pub batch_timeout: Duration,
    /// Pause between batches
    pub batch_pause: Duration,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ports: vec![443],
            connect_timeout: Duration::from_secs(3),
            fast_latency: Duration::from_millis(200),
            batch_size: 20,
            concurrent: 20,
            batch_timeout: Duration::from_secs(30),
            batch_pause: Duration::from_millis(200),
        }
    }
}

impl ProbeConfig {
    /// Set the candidate ports
    #[must_use]
    pub fn ports(mut self, ports: Vec<u16>) -> Self {
        self.ports = ports;
        self
    }

    /// Set the per-attempt connect timeout
    #[must_use]
    pub const fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Set the short-circuit latency threshold
    #[must_use]
    pub const fn fast_latency(mut self, latency: Duration) -> Self {
        self.fast_latency = latency;
        self
    }

    /// Set the batch size
    #[must_use]
    pub const fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Set the worker cap
    #[must_use]
    pub const fn concurrent(mut self, workers: usize) -> Self {
        self.concurrent = workers;
        self
    }

    /// Set the batch deadline
    #[must_use]
    pub const fn batch_timeout(mut self, timeout: Duration) -> Self {
        self.batch_timeout = timeout;
        self
    }

    /// Set the pause between batches
    #[must_use]
    pub const fn batch_pause(mut self, pause: Duration) -> Self {
        self.batch_pause = pause;
        self
    }
}

/// Reachability prober
pub struct Prober<C = TcpConnector> {
    config: Arc<ProbeConfig>,
    connector: Arc<C>,
}

impl Default for Prober {
    fn default() -> Self {
        Self::new()
    }
}

impl Prober {
    /// Create a prober with default configuration
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ProbeConfig::default())
    }

    /// Create a prober with custom configuration
    #[must_use]
    pub fn with_config(config: ProbeConfig) -> Self {
        Self::with_connector(config, TcpConnector)
    }
}

impl<C: Connector> Prober<C> {
    /// Create a prober that dials through `connector`
    #[must_use]
    pub fn with_connector(config: ProbeConfig, connector: C) -> Self {
        Self {
            config: Arc::new(config),
            connector: Arc::new(connector),
        }
    }

    /// Active configuration
    #[must_use]
    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Probe a single endpoint across all configured ports
    pub async fn probe_one(&self, endpoint: &Endpoint) -> ProbeResult {
        probe_endpoint(self.connector.as_ref(), &self.config, endpoint.clone()).await
    }

    /// Probe every endpoint.
    ///
    /// Each input appears exactly once in the output, in completion order
    /// within each batch.
    pub async fn probe(&self, endpoints: &[Endpoint]) -> Vec<ProbeResult> {
        let total = endpoints.len();
        let batch_size = self.config.batch_size.max(1);
        let batches = total.div_ceil(batch_size);
        let start = Instant::now();

        info!(
            total,
            workers = self.config.concurrent,
            ports = ?self.config.ports,
            "starting reachability probe"
        );

        let mut results = Vec::with_capacity(total);
        for (index, batch) in endpoints.chunks(batch_size).enumerate() {
            info!(batch = index + 1, batches, size = batch.len(), "probing batch");
            self.probe_batch(batch, &mut results, total, start).await;

            if index + 1 < batches && !self.config.batch_pause.is_zero() {
                tokio::time::sleep(self.config.batch_pause).await;
            }
        }

        let reachable = results.iter().filter(|r| r.reachable).count();
        info!(
            reachable,
            total,
            elapsed_secs = start.elapsed().as_secs_f64(),
            "reachability probe finished"
        );
        results
    }

    async fn probe_batch(
        &self,
        batch: &[Endpoint],
        results: &mut Vec<ProbeResult>,
        total: usize,
        start: Instant,
    ) {
        let semaphore = Arc::new(Semaphore::new(self.config.concurrent.max(1)));
        let mut set = JoinSet::new();

        for (slot, endpoint) in batch.iter().cloned().enumerate() {
            let sem = Arc::clone(&semaphore);
            let connector = Arc::clone(&self.connector);
            let config = Arc::clone(&self.config);

            set.spawn(async move {
                let _permit = sem.acquire_owned().await.ok();
                (slot, probe_endpoint(connector.as_ref(), &config, endpoint).await)
            });
        }

        let mut done = vec![false; batch.len()];
        // An unrepresentable deadline means the batch is never cut short.
        let deadline = Instant::now().checked_add(self.config.batch_timeout);

        loop {
            let next = match deadline {
                Some(deadline) => tokio::time::timeout_at(deadline, set.join_next()).await,
                None => Ok(set.join_next().await),
            };
            match next {
                Ok(Some(Ok((slot, result)))) => {
                    done[slot] = true;
                    let completed = results.len() + 1;
                    let elapsed = start.elapsed().as_secs_f64();
                    match result.latency_ms {
                        Some(latency_ms) if result.reachable => info!(
                            "[{completed}/{total}] {} reachable ({latency_ms}ms) - {elapsed:.1}s",
                            result.endpoint
                        ),
                        _ => info!(
                            "[{completed}/{total}] {} unreachable - {elapsed:.1}s",
                            result.endpoint
                        ),
                    }
                    results.push(result);
                }
                Ok(Some(Err(e))) => warn!(error = %e, "probe task failed"),
                Ok(None) => break,
                Err(_) => {
                    warn!(
                        pending = set.len(),
                        timeout_secs = self.config.batch_timeout.as_secs_f64(),
                        "batch deadline reached, abandoning pending probes"
                    );
                    set.abort_all();
                    break;
                }
            }
        }

        for (slot, endpoint) in batch.iter().enumerate() {
            if !done[slot] {
                results.push(ProbeResult::unreachable(endpoint.clone()));
            }
        }
    }
}

async fn probe_endpoint<C: Connector + ?Sized>(
    connector: &C,
    config: &ProbeConfig,
    endpoint: Endpoint,
) -> ProbeResult {
    let fast_ms = duration_ms(config.fast_latency);
    let mut best: Option<u64> = None;

    for &port in &config.ports {
        let addr = SocketAddr::new(IpAddr::V4(endpoint.addr()), port);
        // The outer timeout also bounds connectors that ignore their deadline.
        let attempt = tokio::time::timeout(
            config.connect_timeout,
            connector.connect(addr, config.connect_timeout),
        )
        .await;

        match attempt {
            Ok(Ok(elapsed)) => {
                let latency_ms = duration_ms(elapsed);
                if latency_ms < fast_ms {
                    return ProbeResult::reachable(endpoint, latency_ms);
                }
                best = Some(best.map_or(latency_ms, |b| b.min(latency_ms)));
            }
            Ok(Err(e)) => trace!(%addr, error = %e, "port failed"),
            Err(_) => trace!(%addr, "port timed out"),
        }
    }

    match best {
        Some(latency_ms) => ProbeResult::reachable(endpoint, latency_ms),
        None => ProbeResult::unreachable(endpoint),
    }
}

/// Milliseconds, rounded to nearest
fn duration_ms(d: Duration) -> u64 {
    u64::try_from((d.as_micros() + 500) / 1000).unwrap_or(u64::MAX)
}
