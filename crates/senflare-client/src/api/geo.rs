//! Geolocation lookup services.
//!
//! Both services are queried with plain GET requests and answer JSON. The
//! primary reports the code in `country`; the fallback reports it in
//! `countryCode` next to a `status` discriminator.

use crate::config::{DEFAULT_FALLBACK_URL, DEFAULT_PRIMARY_URL};
use crate::SenflareClient;
use async_trait::async_trait;
use senflare_core::{Endpoint, LookupFailure, LookupResult, RegionCode, RegionLookup, SenflareError};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

/// Default per-request timeout for lookups
const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Factory for the lookup services
pub struct GeoApi<'a> {
    client: &'a SenflareClient,
}

impl<'a> GeoApi<'a> {
    pub(crate) fn new(client: &'a SenflareClient) -> Self {
        Self { client }
    }

    /// The primary service with default settings
    #[must_use]
    pub fn primary(&self) -> IpInfoLookup {
        IpInfoLookup::new(self.client.clone())
    }

    /// The fallback service with default settings
    #[must_use]
    pub fn fallback(&self) -> IpApiLookup {
        IpApiLookup::new(self.client.clone())
    }
}

/// Primary lookup (`GET {base}/{ip}[?token=...]`, field `country`)
#[derive(Clone)]
pub struct IpInfoLookup {
    client: SenflareClient,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl IpInfoLookup {
    /// Create the lookup against the public endpoint
    #[must_use]
    pub fn new(client: SenflareClient) -> Self {
        Self {
            client,
            base_url: DEFAULT_PRIMARY_URL.to_string(),
            token: None,
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Set the base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the access token appended as `?token=`
    #[must_use]
    pub fn token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn url_for(&self, endpoint: &Endpoint) -> String {
        let base = self.base_url.trim_end_matches('/');
        match &self.token {
            Some(token) => format!("{base}/{endpoint}?token={}", encode(token)),
            None => format!("{base}/{endpoint}"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    #[serde(default)]
    country: Option<String>,
}

#[async_trait]
impl RegionLookup for IpInfoLookup {
    fn name(&self) -> &str {
        "ipinfo"
    }

    #[instrument(skip_all, fields(service = "ipinfo", endpoint = %endpoint))]
    async fn lookup(&self, endpoint: &Endpoint) -> LookupResult {
        let fetched = self
            .client
            .get(&self.url_for(endpoint), Some(self.timeout))
            .await
            .map_err(into_failure)?;

        if fetched.status != 200 {
            debug!(status = fetched.status, "primary lookup returned non-200");
            return Err(LookupFailure::Status(fetched.status));
        }

        let parsed: IpInfoResponse = serde_json::from_str(&fetched.body)
            .map_err(|e| LookupFailure::Malformed(e.to_string()))?;

        parsed
            .country
            .as_deref()
            .and_then(RegionCode::from_lookup)
            .ok_or(LookupFailure::MissingCode)
    }
}

/// Fallback lookup (`GET {base}/{ip}?fields=status,countryCode`)
#[derive(Clone)]
pub struct IpApiLookup {
    client: SenflareClient,
    base_url: String,
    timeout: Duration,
}

impl IpApiLookup {
    /// Create the lookup against the public endpoint
    #[must_use]
    pub fn new(client: SenflareClient) -> Self {
        Self {
            client,
            base_url: DEFAULT_FALLBACK_URL.to_string(),
            timeout: DEFAULT_LOOKUP_TIMEOUT,
        }
    }

    /// Set the base URL (useful for testing)
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the per-request timeout
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct IpApiResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    country_code: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[async_trait]
impl RegionLookup for IpApiLookup {
    fn name(&self) -> &str {
        "ip-api"
    }

    #[instrument(skip_all, fields(service = "ip-api", endpoint = %endpoint))]
    async fn lookup(&self, endpoint: &Endpoint) -> LookupResult {
        let url = format!(
            "{}/{endpoint}?fields=status,message,countryCode",
            self.base_url.trim_end_matches('/')
        );
        let fetched = self
            .client
            .get(&url, Some(self.timeout))
            .await
            .map_err(into_failure)?;

        // The service reports failures in the body, so parse before judging the status.
        let parsed: IpApiResponse = match serde_json::from_str(&fetched.body) {
            Ok(parsed) => parsed,
            Err(_) if fetched.status != 200 => return Err(LookupFailure::Status(fetched.status)),
            Err(e) => return Err(LookupFailure::Malformed(e.to_string())),
        };

        match parsed.status.as_deref() {
            Some("success") => parsed
                .country_code
                .as_deref()
                .and_then(RegionCode::from_lookup)
                .ok_or(LookupFailure::MissingCode),
            other => {
                let reason = parsed
                    .message
                    .or_else(|| other.map(String::from))
                    .unwrap_or_else(|| "unknown".to_string());
                debug!(reason = %reason, "fallback lookup rejected");
                Err(LookupFailure::Rejected(reason))
            }
        }
    }
}

fn into_failure(err: SenflareError) -> LookupFailure {
    match err {
        SenflareError::Timeout(_) => LookupFailure::Timeout,
        other => LookupFailure::Transport(other.to_string()),
    }
}

fn encode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}
