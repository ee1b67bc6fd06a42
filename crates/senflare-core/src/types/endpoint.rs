use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::str::FromStr;

use crate::SenflareError;

/// A validated dotted-quad IPv4 endpoint.
///
/// Identity is the original string: `"1.1.1.1"` and `"01.1.1.1"` both parse to
/// the same octets but are distinct endpoints. Ordering follows the numeric
/// octet tuple, so `10.0.0.2` sorts before `10.0.0.10`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Endpoint {
    text: String,
    octets: [u8; 4],
}

impl Endpoint {
    /// Validate a candidate string.
    ///
    /// Accepts exactly four dot-separated parts, each made of one to three
    /// ASCII digits with a value in `0..=255`.
    pub fn parse(text: &str) -> crate::Result<Self> {
        parse_octets(text)
            .map(|octets| Self {
                text: text.to_string(),
                octets,
            })
            .ok_or_else(|| SenflareError::InvalidIp(text.to_string()))
    }

    /// Returns true if `text` is a valid endpoint
    #[must_use]
    pub fn is_valid(text: &str) -> bool {
        parse_octets(text).is_some()
    }

    /// The endpoint as it was written in its source
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Numeric octets, used as the sort key
    #[must_use]
    pub const fn octets(&self) -> [u8; 4] {
        self.octets
    }

    /// Address to dial
    #[must_use]
    pub fn addr(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.octets)
    }
}

fn parse_octets(text: &str) -> Option<[u8; 4]> {
    let mut octets = [0u8; 4];
    let mut parts = text.split('.');

    for slot in &mut octets {
        let part = parts.next()?;
        if part.is_empty() || part.len() > 3 || !part.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        *slot = part.parse::<u16>().ok().and_then(|v| u8::try_from(v).ok())?;
    }

    if parts.next().is_some() {
        return None;
    }
    Some(octets)
}

impl PartialEq for Endpoint {
    fn eq(&self, other: &Self) -> bool {
        self.text == other.text
    }
}

impl Eq for Endpoint {}

impl std::hash::Hash for Endpoint {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.text.hash(state);
    }
}

impl Ord for Endpoint {
    fn cmp(&self, other: &Self) -> Ordering {
        self.octets
            .cmp(&other.octets)
            .then_with(|| self.text.cmp(&other.text))
    }
}

impl PartialOrd for Endpoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl FromStr for Endpoint {
    type Err = SenflareError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Endpoint {
    type Error = SenflareError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let octets = parse_octets(&value).ok_or_else(|| SenflareError::InvalidIp(value.clone()))?;
        Ok(Self {
            text: value,
            octets,
        })
    }
}

impl From<Endpoint> for String {
    fn from(endpoint: Endpoint) -> Self {
        endpoint.text
    }
}

impl From<Ipv4Addr> for Endpoint {
    fn from(addr: Ipv4Addr) -> Self {
        Self {
            text: addr.to_string(),
            octets: addr.octets(),
        }
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Validate, deduplicate and numerically sort raw candidates.
///
/// Invalid strings are dropped. Duplicates are detected by exact string
/// equality after validation.
pub fn dedup_and_sort<I, S>(candidates: I) -> Vec<Endpoint>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let unique: HashSet<Endpoint> = candidates
        .into_iter()
        .filter_map(|c| Endpoint::parse(c.as_ref()).ok())
        .collect();

    let mut sorted: Vec<Endpoint> = unique.into_iter().collect();
    sorted.sort();
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_valid_addresses() {
        for ip in ["0.0.0.0", "1.1.1.1", "255.255.255.255", "104.16.0.1", "001.2.3.4"] {
            assert!(Endpoint::is_valid(ip), "{ip} should be valid");
        }
    }

    #[test]
    fn test_rejects_malformed_addresses() {
        for ip in [
            "",
            "1.1.1",
            "1.1.1.1.1",
            "256.1.1.1",
            "1.1.1.999",
            "a.b.c.d",
            "1..1.1",
            "1.1.1.",
            " 1.1.1.1",
            "1.1.1.-1",
            "1.1.1.+1",
            "0001.1.1.1",
        ] {
            assert!(!Endpoint::is_valid(ip), "{ip:?} should be rejected");
        }
    }

    #[test]
    fn test_parse_error_carries_input() {
        let err = Endpoint::parse("300.1.1.1").unwrap_err();
        assert!(matches!(err, SenflareError::InvalidIp(ref s) if s == "300.1.1.1"));
    }

    #[test]
    fn test_dedup_and_sort_numeric_order() {
        let out = dedup_and_sort([
            "10.0.0.10",
            "10.0.0.2",
            "8.8.8.8",
            "10.0.0.2",
            "not an ip",
            "1.1.1.1",
        ]);
        let shown: Vec<&str> = out.iter().map(Endpoint::as_str).collect();
        assert_eq!(shown, ["1.1.1.1", "8.8.8.8", "10.0.0.2", "10.0.0.10"]);
    }

    #[test]
    fn test_identity_is_string() {
        let a = Endpoint::parse("1.1.1.1").unwrap();
        let b = Endpoint::parse("01.1.1.1").unwrap();
        assert_ne!(a, b);
        assert_eq!(a.octets(), b.octets());
        assert_eq!(dedup_and_sort(["1.1.1.1", "01.1.1.1"]).len(), 2);
    }

    #[test]
    fn test_serde_as_string() {
        let ep = Endpoint::parse("162.159.1.1").unwrap();
        let json = serde_json::to_string(&ep).unwrap();
        assert_eq!(json, "\"162.159.1.1\"");
        let back: Endpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ep);
        assert!(serde_json::from_str::<Endpoint>("\"1.2.3\"").is_err());
    }

    #[test]
    fn test_addr() {
        let ep = Endpoint::parse("001.002.003.004").unwrap();
        assert_eq!(ep.addr(), Ipv4Addr::new(1, 2, 3, 4));
    }
}
