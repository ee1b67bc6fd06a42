use serde::{Deserialize, Serialize};

use super::Endpoint;

/// Outcome of probing one endpoint during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeResult {
    /// Endpoint that was probed
    pub endpoint: Endpoint,

    /// Whether any configured port accepted a TCP connection
    pub reachable: bool,

    /// Best observed connect latency in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl ProbeResult {
    /// An endpoint that accepted a connection
    #[must_use]
    pub const fn reachable(endpoint: Endpoint, latency_ms: u64) -> Self {
        Self {
            endpoint,
            reachable: true,
            latency_ms: Some(latency_ms),
        }
    }

    /// An endpoint where every port failed
    #[must_use]
    pub const fn unreachable(endpoint: Endpoint) -> Self {
        Self {
            endpoint,
            reachable: false,
            latency_ms: None,
        }
    }

    /// Convert into the resolver's input, dropping unreachable endpoints
    #[must_use]
    pub fn into_reachable(self) -> Option<ReachableEndpoint> {
        match (self.reachable, self.latency_ms) {
            (true, Some(latency_ms)) => Some(ReachableEndpoint {
                endpoint: self.endpoint,
                latency_ms,
            }),
            _ => None,
        }
    }
}

/// A reachable endpoint with its best latency
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReachableEndpoint {
    /// Endpoint address
    pub endpoint: Endpoint,
    /// Connect latency in milliseconds
    pub latency_ms: u64,
}

impl ReachableEndpoint {
    /// Create a new reachable endpoint
    #[must_use]
    pub const fn new(endpoint: Endpoint, latency_ms: u64) -> Self {
        Self {
            endpoint,
            latency_ms,
        }
    }
}

/// Keep only reachable endpoints, preserving order
pub fn reachable_only<I>(results: I) -> Vec<ReachableEndpoint>
where
    I: IntoIterator<Item = ProbeResult>,
{
    results
        .into_iter()
        .filter_map(ProbeResult::into_reachable)
        .collect()
}
