use serde::{Deserialize, Serialize};

use super::country::country_name;
use super::Endpoint;

/// Country/region code returned by a geolocation service.
///
/// Codes from lookups are upper-cased. The sentinel [`RegionCode::UNKNOWN`]
/// marks endpoints that no service could classify.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionCode(String);

impl RegionCode {
    /// Sentinel for unclassifiable endpoints
    pub const UNKNOWN: &'static str = "Unknown";

    /// Normalise a code returned by a lookup service.
    ///
    /// Returns `None` for blank input.
    #[must_use]
    pub fn from_lookup(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_uppercase()))
        }
    }

    /// Wrap a stored code as-is (cache entries are trusted)
    #[must_use]
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The "Unknown" classification
    #[must_use]
    pub fn unknown() -> Self {
        Self(Self::UNKNOWN.to_string())
    }

    /// Returns true for the "Unknown" classification
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        self.0 == Self::UNKNOWN
    }

    /// The raw code
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Display name from the static table, falling back to the raw code
    #[must_use]
    pub fn display_name(&self) -> &str {
        country_name(&self.0).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for RegionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A reachable endpoint classified by region
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedEndpoint {
    /// Endpoint address
    pub endpoint: Endpoint,
    /// Region code (possibly "Unknown")
    pub region: RegionCode,
    /// Connect latency in milliseconds
    pub latency_ms: u64,
}

impl ResolvedEndpoint {
    /// Create a new resolved endpoint
    #[must_use]
    pub const fn new(endpoint: Endpoint, region: RegionCode, latency_ms: u64) -> Self {
        Self {
            endpoint,
            region,
            latency_ms,
        }
    }

    /// Country display name for report grouping
    #[must_use]
    pub fn country_name(&self) -> &str {
        self.region.display_name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_lookup_normalises() {
        assert_eq!(RegionCode::from_lookup(" us ").unwrap().as_str(), "US");
        assert!(RegionCode::from_lookup("").is_none());
        assert!(RegionCode::from_lookup("   ").is_none());
    }

    #[test]
    fn test_display_name_fallback() {
        assert_eq!(RegionCode::from_stored("JP").display_name(), "日本");
        assert_eq!(RegionCode::from_stored("QQ").display_name(), "QQ");
        assert_eq!(RegionCode::unknown().display_name(), "未知");
        assert!(RegionCode::unknown().is_unknown());
    }

    #[test]
    fn test_resolved_country_name() {
        let r = ResolvedEndpoint::new(
            Endpoint::parse("1.1.1.1").unwrap(),
            RegionCode::from_stored("US"),
            15,
        );
        assert_eq!(r.country_name(), "美国");
    }
}
