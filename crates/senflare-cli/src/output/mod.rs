//! Output formats and run artifacts.

use anyhow::{Context as _, Result};
use clap::ValueEnum;
use senflare::{ReachableEndpoint, Report};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// Available output formats.
#[derive(Debug, Clone, Copy, Default, ValueEnum, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable text with colors
    #[default]
    Pretty,
    /// JSON output
    Json,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => anyhow::bail!(
                "Unknown output format: {}\n\
                 Valid formats: pretty, json",
                s
            ),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => write!(f, "pretty"),
            Self::Json => write!(f, "json"),
        }
    }
}

/// Remove artifacts left by a previous run.
pub fn remove_stale(paths: &[&Path]) -> Result<()> {
    for path in paths {
        match std::fs::remove_file(path) {
            Ok(()) => tracing::debug!(path = %path.display(), "removed previous output"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to remove {}", path.display()))
            }
        }
    }
    Ok(())
}

/// Write the reachable list, one address per line.
///
/// Nothing is written for an empty list. Returns whether a file was written.
pub fn write_reachable(path: &Path, reachable: &[ReachableEndpoint]) -> Result<bool> {
    if reachable.is_empty() {
        return Ok(false);
    }
    let body = reachable
        .iter()
        .map(|r| r.endpoint.as_str())
        .collect::<Vec<_>>()
        .join("\n");
    write_file(path, &body)?;
    Ok(true)
}

/// Write the ranked report.
///
/// Nothing is written for an empty report. Returns whether a file was written.
pub fn write_report(path: &Path, report: &Report) -> Result<bool> {
    if report.is_empty() {
        return Ok(false);
    }
    write_file(path, &report.render())?;
    Ok(true)
}

fn write_file(path: &Path, body: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, body).with_context(|| format!("Failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use senflare::{Endpoint, RegionCode, ResolvedEndpoint};

    fn ep(s: &str) -> Endpoint {
        Endpoint::parse(s).unwrap()
    }

    #[test]
    fn test_reachable_list_has_no_trailing_newline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("IPlist.txt");
        let reachable = [
            ReachableEndpoint::new(ep("8.8.8.8"), 30),
            ReachableEndpoint::new(ep("1.1.1.1"), 15),
        ];

        assert!(write_reachable(&path, &reachable).unwrap());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "8.8.8.8\n1.1.1.1");
    }

    #[test]
    fn test_empty_outputs_are_not_written() {
        let dir = tempfile::tempdir().unwrap();
        let list = dir.path().join("IPlist.txt");
        let report = dir.path().join("Senflare.txt");

        assert!(!write_reachable(&list, &[]).unwrap());
        assert!(!write_report(&report, &Report::default()).unwrap());
        assert!(!list.exists());
        assert!(!report.exists());
    }

    #[test]
    fn test_report_written_and_stale_removed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Senflare.txt");
        std::fs::write(&path, "old run").unwrap();

        let missing = dir.path().join("missing.txt");
        remove_stale(&[path.as_path(), missing.as_path()]).unwrap();
        assert!(!path.exists());

        let report = Report::build(&[ResolvedEndpoint::new(
            ep("1.1.1.1"),
            RegionCode::from_stored("US"),
            15,
        )]);
        assert!(write_report(&path, &report).unwrap());
        assert_eq!(
            std::fs::read_to_string(&path).unwrap(),
            "1.1.1.1#US 美国节点 | 01"
        );
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert!("yaml".parse::<OutputFormat>().is_err());
    }
}
