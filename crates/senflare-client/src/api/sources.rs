//! Candidate source collection.
//!
//! Sources are fetched one after another, paced by a rate limiter. A source
//! that fails in any way is logged and skipped.

use crate::config::SourceConfig;
use crate::SenflareClient;
use governor::{Quota, RateLimiter};
use regex::Regex;
use senflare_core::{dedup_and_sort, Endpoint, Result, SenflareError};
use std::sync::OnceLock;
use tracing::{debug, error, info, warn};

/// Dotted quads anywhere in a page
const IPV4_PATTERN: &str = r"\b(?:[0-9]{1,3}\.){3}[0-9]{1,3}\b";

/// A line consisting only of a dotted quad
const IPV4_LINE_PATTERN: &str = r"^(?:[0-9]{1,3}\.){3}[0-9]{1,3}$";

fn ipv4_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IPV4_PATTERN).expect("valid IPv4 pattern"))
}

fn ipv4_line_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(IPV4_LINE_PATTERN).expect("valid IPv4 line pattern"))
}

/// Extract valid IPv4 candidates from raw text, in order of appearance.
///
/// Falls back to a line-by-line scan of bare addresses when the free-text
/// scan finds nothing valid.
#[must_use]
pub fn extract_candidates(text: &str) -> Vec<String> {
    let found: Vec<&str> = ipv4_regex().find_iter(text).map(|m| m.as_str()).collect();
    let valid: Vec<String> = found
        .iter()
        .filter(|s| Endpoint::is_valid(s))
        .map(ToString::to_string)
        .collect();

    if !found.is_empty() && valid.is_empty() {
        debug!(found = found.len(), "all matched addresses failed validation");
    }
    if !valid.is_empty() {
        return valid;
    }

    text.trim()
        .lines()
        .map(str::trim)
        .filter(|line| ipv4_line_regex().is_match(line) && Endpoint::is_valid(line))
        .map(ToString::to_string)
        .collect()
}

/// Per-run source statistics
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CollectStats {
    /// Sources that answered 200
    pub succeeded: usize,
    /// Sources that were skipped
    pub failed: usize,
    /// Valid addresses seen before deduplication
    pub raw_candidates: usize,
}

/// Result of a collection pass
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Deduplicated endpoints in ascending numeric order
    pub endpoints: Vec<Endpoint>,
    /// Source statistics
    pub stats: CollectStats,
}

/// Candidate source endpoints
pub struct SourcesApi<'a> {
    client: &'a SenflareClient,
}

impl<'a> SourcesApi<'a> {
    pub(crate) fn new(client: &'a SenflareClient) -> Self {
        Self { client }
    }

    /// Fetch one source and extract its valid candidates.
    ///
    /// Returns [`SenflareError::Forbidden`] for 403 and [`SenflareError::Api`]
    /// for any other non-200 status.
    pub async fn fetch(&self, url: &str, config: &SourceConfig) -> Result<Vec<String>> {
        let fetched = self
            .client
            .get_with_retry(url, Some(config.timeout))
            .await?;

        match fetched.status {
            200 => Ok(extract_candidates(&fetched.body)),
            403 => Err(SenflareError::Forbidden(url.to_string())),
            code => Err(SenflareError::Api {
                code,
                message: url.to_string(),
            }),
        }
    }

    /// Fetch every configured source and build the deduplicated candidate list
    pub async fn collect(&self, config: &SourceConfig) -> Collection {
        let limiter = Quota::with_period(config.interval).map(RateLimiter::direct);
        let mut stats = CollectStats::default();
        let mut raw = Vec::new();

        for url in &config.urls {
            if let Some(limiter) = &limiter {
                limiter.until_ready().await;
            }
            info!(url = %url, "collecting candidates");

            match self.fetch(url, config).await {
                Ok(candidates) => {
                    info!(url = %url, count = candidates.len(), "collected valid addresses");
                    stats.succeeded += 1;
                    stats.raw_candidates += candidates.len();
                    raw.extend(candidates);
                }
                Err(SenflareError::Forbidden(_)) => {
                    warn!(url = %url, "access restricted (403), skipping source");
                    stats.failed += 1;
                }
                Err(SenflareError::Api { code, .. }) => {
                    warn!(url = %url, status = code, "source returned error status, skipping");
                    stats.failed += 1;
                }
                Err(e) => {
                    error!(url = %url, error = %e, "source fetch failed, skipping");
                    stats.failed += 1;
                }
            }
        }

        let endpoints = dedup_and_sort(raw);
        info!(
            succeeded = stats.succeeded,
            failed = stats.failed,
            unique = endpoints.len(),
            "candidate collection finished"
        );

        Collection { endpoints, stats }
    }
}
