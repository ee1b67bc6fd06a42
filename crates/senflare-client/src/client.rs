//! Shared HTTP client used for candidate sources and geolocation lookups.

use crate::api::{GeoApi, SourcesApi};
use crate::config::RetryConfig;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::Client as HttpClient;
use senflare_core::{Result, SenflareError};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default request timeout
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(8);

/// Several candidate sources reject non-browser clients
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Idle connections kept per host
const POOL_MAX_IDLE_PER_HOST: usize = 20;

/// Status and body of a completed GET request
#[derive(Debug, Clone)]
pub struct FetchedBody {
    /// HTTP status code
    pub status: u16,
    /// Response body as text
    pub body: String,
}

/// Shared HTTP client
#[derive(Clone)]
pub struct SenflareClient {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    http: HttpClient,
    retry_config: RetryConfig,
}

impl SenflareClient {
    /// Create a new client using default settings
    pub fn new() -> Result<Self> {
        SenflareClientBuilder::new().build()
    }

    /// Create a builder for custom configuration
    #[must_use]
    pub fn builder() -> SenflareClientBuilder {
        SenflareClientBuilder::new()
    }

    /// Access candidate source collection
    #[must_use]
    pub fn sources(&self) -> SourcesApi<'_> {
        SourcesApi::new(self)
    }

    /// Access geolocation lookup services
    #[must_use]
    pub fn geo(&self) -> GeoApi<'_> {
        GeoApi::new(self)
    }

    /// Perform a single GET request, returning status and body for any status
    pub(crate) async fn get(&self, url: &str, timeout: Option<Duration>) -> Result<FetchedBody> {
        debug!(url = %url, "GET request");

        let mut request = self.inner.http.get(url);
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await.map_err(|e| map_transport(&e, timeout))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| map_transport(&e, timeout))?;

        Ok(FetchedBody { status, body })
    }

    /// GET with retries on connection failures.
    ///
    /// Timeouts and HTTP error statuses are returned immediately.
    pub(crate) async fn get_with_retry(
        &self,
        url: &str,
        timeout: Option<Duration>,
    ) -> Result<FetchedBody> {
        let retry = &self.inner.retry_config;
        let mut attempt = 0;

        loop {
            match self.get(url, timeout).await {
                Err(SenflareError::Connection(msg)) if attempt < retry.max_retries => {
                    let backoff = retry.backoff_for(attempt);
                    warn!(url = %url, attempt, error = %msg, ?backoff, "connection failed, retrying");
                    tokio::time::sleep(backoff).await;
                    attempt += 1;
                }
                other => return other,
            }
        }
    }
}

fn map_transport(err: &reqwest::Error, timeout: Option<Duration>) -> SenflareError {
    if err.is_timeout() {
        SenflareError::Timeout(timeout.unwrap_or(DEFAULT_TIMEOUT).as_secs())
    } else if err.is_connect() {
        SenflareError::Connection(err.to_string())
    } else {
        SenflareError::Http(err.to_string())
    }
}

/// Builder for configuring a [`SenflareClient`]
pub struct SenflareClientBuilder {
    timeout: Duration,
    user_agent: String,
    retry_config: RetryConfig,
}

impl Default for SenflareClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl SenflareClientBuilder {
    /// Create a new builder
    #[must_use]
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            retry_config: RetryConfig::default(),
        }
    }

    /// Set the default request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the User-Agent header
    #[must_use]
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.user_agent = agent.into();
        self
    }

    /// Set retry configuration
    #[must_use]
    pub const fn retry(mut self, config: RetryConfig) -> Self {
        self.retry_config = config;
        self
    }

    /// Build the client
    pub fn build(self) -> Result<SenflareClient> {
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .user_agent(&self.user_agent)
            .default_headers(browser_headers())
            .pool_max_idle_per_host(POOL_MAX_IDLE_PER_HOST)
            .gzip(true)
            .build()
            .map_err(|e| SenflareError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(SenflareClient {
            inner: Arc::new(ClientInner {
                http,
                retry_config: self.retry_config,
            }),
        })
    }
}

fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("zh-CN,zh;q=0.9,en;q=0.8"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
}
