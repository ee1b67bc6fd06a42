//! The geolocation lookup seam.
//!
//! Each attempt against a lookup service yields an explicit [`LookupResult`];
//! callers chain attempts instead of catching errors.

use async_trait::async_trait;
use thiserror::Error;

use crate::{Endpoint, RegionCode};

/// Outcome of a single lookup attempt
pub type LookupResult = std::result::Result<RegionCode, LookupFailure>;

/// Why a lookup attempt produced no region code
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// Service answered with a non-200 status
    #[error("unexpected status {0}")]
    Status(u16),

    /// Body was not the expected JSON shape
    #[error("malformed response: {0}")]
    Malformed(String),

    /// Service reported the query as failed (e.g. `status != "success"`)
    #[error("service rejected query: {0}")]
    Rejected(String),

    /// Response carried no country code
    #[error("no country code in response")]
    MissingCode,

    /// Request did not complete in time
    #[error("timed out")]
    Timeout,

    /// Connection or protocol error
    #[error("transport error: {0}")]
    Transport(String),
}

/// A geolocation service that maps an endpoint to a region code
#[async_trait]
pub trait RegionLookup: Send + Sync {
    /// Short service name for logs
    fn name(&self) -> &str;

    /// Query the service for one endpoint
    async fn lookup(&self, endpoint: &Endpoint) -> LookupResult;
}
