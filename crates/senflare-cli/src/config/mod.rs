//! Configuration management.

use anyhow::{Context as _, Result};
use directories::ProjectDirs;
use senflare::recon::{CacheConfig, ProbeConfig, ResolveConfig};
use senflare::{SourceConfig, DEFAULT_FALLBACK_URL, DEFAULT_PRIMARY_URL, DEFAULT_SOURCES};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::output::OutputFormat;

/// CLI configuration.
///
/// Every field has a default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Candidate list URLs.
    pub sources: Vec<String>,

    /// Ports tried per endpoint, in order.
    pub ports: Vec<u16>,

    /// Per-source request timeout.
    pub source_timeout_secs: u64,

    /// Per-lookup request timeout.
    pub api_timeout_secs: u64,

    /// Pause between source fetches and between paced lookups.
    pub query_interval_ms: u64,

    /// Global worker limit (resolution uses at most 15).
    pub max_workers: usize,

    /// Endpoints per probe batch.
    pub batch_size: usize,

    /// Per-port connect timeout.
    pub connect_timeout_secs: u64,

    /// A connect faster than this stops trying further ports.
    pub fast_latency_ms: u64,

    /// Deadline for one probe batch.
    pub batch_timeout_secs: u64,

    /// Pause between probe batches.
    pub batch_pause_ms: u64,

    /// Region cache TTL.
    pub cache_ttl_hours: u64,

    /// Region cache entry cap.
    pub cache_capacity: usize,

    /// Region cache file.
    pub cache_path: PathBuf,

    /// Reachable endpoint list.
    pub reachable_path: PathBuf,

    /// Ranked report.
    pub report_path: PathBuf,

    /// Run log file (omit to log to stderr only).
    pub log_file: Option<PathBuf>,

    /// Primary lookup service.
    pub primary_lookup_url: String,

    /// Fallback lookup service.
    pub fallback_lookup_url: String,

    /// Optional token for the primary lookup service.
    pub primary_token: Option<String>,

    /// Default output format.
    pub output_format: Option<OutputFormat>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(ToString::to_string).collect(),
            ports: vec![443],
            source_timeout_secs: 8,
            api_timeout_secs: 5,
            query_interval_ms: 100,
            max_workers: 20,
            batch_size: 20,
            connect_timeout_secs: 3,
            fast_latency_ms: 200,
            batch_timeout_secs: 30,
            batch_pause_ms: 200,
            cache_ttl_hours: 168,
            cache_capacity: 1000,
            cache_path: PathBuf::from("Cache.json"),
            reachable_path: PathBuf::from("IPlist.txt"),
            report_path: PathBuf::from("Senflare.txt"),
            log_file: Some(PathBuf::from("IPtest.log")),
            primary_lookup_url: DEFAULT_PRIMARY_URL.to_string(),
            fallback_lookup_url: DEFAULT_FALLBACK_URL.to_string(),
            primary_token: None,
            output_format: None,
        }
    }
}

impl Config {
    /// Get the default config file path.
    pub fn path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("io", "senflare", "senflare")
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit path must exist. The default path may be missing, in which
    /// case defaults are used.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from(path);
        }

        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific file.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a specific file.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.ports.is_empty() {
            anyhow::bail!("`ports` must list at least one port");
        }
        if self.max_workers == 0 {
            anyhow::bail!("`max_workers` must be at least 1");
        }
        if self.batch_size == 0 {
            anyhow::bail!("`batch_size` must be at least 1");
        }
        if self.cache_capacity == 0 {
            anyhow::bail!("`cache_capacity` must be at least 1");
        }
        Ok(())
    }

    /// Candidate collection settings.
    pub fn source_config(&self) -> SourceConfig {
        SourceConfig::default()
            .urls(self.sources.iter().cloned())
            .timeout(Duration::from_secs(self.source_timeout_secs))
            .interval(Duration::from_millis(self.query_interval_ms))
    }

    /// Probe settings.
    pub fn probe_config(&self) -> ProbeConfig {
        ProbeConfig::default()
            .ports(self.ports.clone())
            .connect_timeout(Duration::from_secs(self.connect_timeout_secs))
            .fast_latency(Duration::from_millis(self.fast_latency_ms))
            .batch_size(self.batch_size)
            .concurrent(self.max_workers)
            .batch_timeout(Duration::from_secs(self.batch_timeout_secs))
            .batch_pause(Duration::from_millis(self.batch_pause_ms))
    }

    /// Resolution settings.
    pub fn resolve_config(&self) -> ResolveConfig {
        ResolveConfig::for_max_workers(self.max_workers)
            .pace_delay(Duration::from_millis(self.query_interval_ms))
    }

    /// Region cache settings.
    pub fn cache_config(&self) -> CacheConfig {
        CacheConfig::default()
            .path(&self.cache_path)
            .ttl(Duration::from_secs(self.cache_ttl_hours.saturating_mul(3600)))
            .capacity(self.cache_capacity)
    }

    /// Per-lookup timeout.
    pub const fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}
