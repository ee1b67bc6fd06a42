//! Client configuration types.

use std::time::Duration;

/// Public candidate lists polled by default
pub const DEFAULT_SOURCES: &[&str] = &[
    "https://cf.hyli.xyz/",
    "https://raw.githubusercontent.com/ymyuuu/IPDB/main/BestCF/bestcfv4.txt",
    "https://ipdb.api.030101.xyz/?type=bestcf&country=true",
    "https://api.uouin.com/cloudflare.html",
    "https://api.urlce.com/cloudflare.html",
    "https://addressesapi.090227.xyz/CloudFlareYes",
    "https://cf.090227.xyz/CloudFlareYes",
    "https://ipdb.api.030101.xyz/?type=bestproxy&country=true",
    "https://ip.haogege.xyz/",
    "https://vps789.com/openApi/cfIpTop20",
    "https://vps789.com/openApi/cfIpApi",
    "https://hhhhh.eu.org/vps789.txt",
    "https://www.wetest.vip/page/cloudflare/address_v4.html",
    "https://www.wetest.vip/page/cloudflare/total_v4.html",
    "https://cf.090227.xyz/cmcc",
    "https://cf.090227.xyz/ct",
];

/// Primary geolocation service base URL
pub const DEFAULT_PRIMARY_URL: &str = "https://ipinfo.io";

/// Fallback geolocation service base URL
pub const DEFAULT_FALLBACK_URL: &str = "http://ip-api.com/json";

/// Retry configuration for transport failures when fetching sources
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retry attempts
    pub max_retries: u32,

    /// Initial backoff duration
    pub initial_backoff: Duration,

    /// Maximum backoff duration
    pub max_backoff: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryConfig {
    /// Create a new retry configuration
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_retries: 3,
            initial_backoff: Duration::from_millis(500),
            max_backoff: Duration::from_secs(5),
        }
    }

    /// Disable retries
    #[must_use]
    pub const fn none() -> Self {
        Self::new().max_retries(0)
    }

    /// Set maximum retries
    #[must_use]
    pub const fn max_retries(mut self, max: u32) -> Self {
        self.max_retries = max;
        self
    }

    /// Set initial backoff duration
    #[must_use]
    pub const fn initial_backoff(mut self, duration: Duration) -> Self {
        self.initial_backoff = duration;
        self
    }

    /// Set maximum backoff duration
    #[must_use]
    pub const fn max_backoff(mut self, duration: Duration) -> Self {
        self.max_backoff = duration;
        self
    }

    /// Calculate backoff for a given attempt
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let initial = u64::try_from(self.initial_backoff.as_millis()).unwrap_or(u64::MAX);
        let max = u64::try_from(self.max_backoff.as_millis()).unwrap_or(u64::MAX);
        let backoff = initial.saturating_mul(2u64.saturating_pow(attempt));
        Duration::from_millis(backoff.min(max))
    }
}

/// Candidate source collection settings
#[derive(Debug, Clone)]
pub struct SourceConfig {
    /// URLs to fetch, in order
    pub urls: Vec<String>,

    /// Per-source request timeout
    pub timeout: Duration,

    /// Minimum pause between consecutive source requests
    pub interval: Duration,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            urls: DEFAULT_SOURCES.iter().map(ToString::to_string).collect(),
            timeout: Duration::from_secs(8),
            interval: Duration::from_millis(100),
        }
    }
}

impl SourceConfig {
    /// Replace the source list
    #[must_use]
    pub fn urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.urls = urls.into_iter().map(Into::into).collect();
        self
    }

    /// Set the per-source timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the pause between requests
    #[must_use]
    pub const fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}
