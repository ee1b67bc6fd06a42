//! Ranked, region-grouped report.
//!
//! Endpoints are grouped by country display name, groups are ordered by name,
//! and each group is ranked by ascending latency. Each line reads
//! `<endpoint>#<code> <name>节点 | <rank>` with a two-digit rank.

use senflare_core::{Endpoint, RegionCode, ResolvedEndpoint};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// One ranked report line
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportLine {
    /// Endpoint address
    pub endpoint: Endpoint,
    /// Region code
    pub region: RegionCode,
    /// Country display name used for grouping
    pub country: String,
    /// Connect latency in milliseconds
    pub latency_ms: u64,
    /// 1-based rank within the country group
    pub rank: usize,
}

impl fmt::Display for ReportLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{} {}节点 | {:02}",
            self.endpoint, self.region, self.country, self.rank
        )
    }
}

/// The full report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Report {
    lines: Vec<ReportLine>,
    groups: usize,
}

impl Report {
    /// Group, sort and rank resolved endpoints
    #[must_use]
    pub fn build(resolved: &[ResolvedEndpoint]) -> Self {
        let mut groups: BTreeMap<&str, Vec<&ResolvedEndpoint>> = BTreeMap::new();
        for item in resolved {
            groups.entry(item.country_name()).or_default().push(item);
        }

        let group_count = groups.len();
        let mut lines = Vec::with_capacity(resolved.len());
        for (country, mut members) in groups {
            // Stable: equal latencies keep resolver order.
            members.sort_by_key(|m| m.latency_ms);
            lines.extend(members.into_iter().enumerate().map(|(i, m)| ReportLine {
                endpoint: m.endpoint.clone(),
                region: m.region.clone(),
                country: country.to_string(),
                latency_ms: m.latency_ms,
                rank: i + 1,
            }));
        }

        Self {
            lines,
            groups: group_count,
        }
    }

    /// Ranked lines, grouped by country
    #[must_use]
    pub fn lines(&self) -> &[ReportLine] {
        &self.lines
    }

    /// Number of country groups
    #[must_use]
    pub const fn group_count(&self) -> usize {
        self.groups
    }

    /// Number of lines
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns true if the report has no lines
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Lines joined by newlines, without a trailing newline
    #[must_use]
    pub fn render(&self) -> String {
        self.lines
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(ip: &str, code: &str, ms: u64) -> ResolvedEndpoint {
        ResolvedEndpoint::new(
            Endpoint::parse(ip).unwrap(),
            RegionCode::from_stored(code),
            ms,
        )
    }

    #[test]
    fn test_single_line_format() {
        let report = Report::build(&[resolved("1.1.1.1", "US", 15)]);
        assert_eq!(report.render(), "1.1.1.1#US 美国节点 | 01");
    }

    #[test]
    fn test_groups_sorted_and_ranked() {
        let report = Report::build(&[
            resolved("3.3.3.3", "US", 90),
            resolved("2.2.2.2", "JP", 40),
            resolved("1.1.1.1", "US", 15),
            resolved("4.4.4.4", "GB", 70),
            resolved("5.5.5.5", "UK", 20),
        ]);

        // "日本" < "美国" < "英国" by code point
        assert_eq!(
            report.render(),
            "2.2.2.2#JP 日本节点 | 01\n\
             1.1.1.1#US 美国节点 | 01\n\
             3.3.3.3#US 美国节点 | 02\n\
             5.5.5.5#UK 英国节点 | 01\n\
             4.4.4.4#GB 英国节点 | 02"
        );
        assert_eq!(report.group_count(), 3);
    }

    #[test]
    fn test_unmapped_code_uses_raw_code() {
        let report = Report::build(&[resolved("6.6.6.6", "QQ", 5)]);
        assert_eq!(report.lines()[0].to_string(), "6.6.6.6#QQ QQ节点 | 01");
    }

    #[test]
    fn test_unknown_group() {
        let report = Report::build(&[resolved("7.7.7.7", "Unknown", 5)]);
        assert_eq!(report.render(), "7.7.7.7#Unknown 未知节点 | 01");
    }

    #[test]
    fn test_rank_past_two_digits() {
        let items: Vec<ResolvedEndpoint> = (0..100u64)
            .map(|i| resolved(&format!("10.0.0.{i}"), "SG", i))
            .collect();
        let report = Report::build(&items);
        assert_eq!(report.lines()[8].to_string(), "10.0.0.8#SG 新加坡节点 | 09");
        assert_eq!(report.lines()[99].to_string(), "10.0.0.99#SG 新加坡节点 | 100");
    }

    #[test]
    fn test_empty() {
        let report = Report::build(&[]);
        assert!(report.is_empty());
        assert_eq!(report.render(), "");
    }
}
