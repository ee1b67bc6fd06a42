//! Command implementations.

pub mod cache;
pub mod config;
pub mod lookup;
pub mod probe;
pub mod run;

use anyhow::Result;
use senflare::recon::{RegionCache, Resolver};
use senflare::{dedup_and_sort, Endpoint, SenflareClient};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::output::OutputFormat;

/// Shared context for all commands.
#[derive(Debug, Clone)]
pub struct Context {
    /// Effective configuration
    pub config: Config,

    /// Config file given on the command line
    pub config_path: Option<PathBuf>,

    /// Output format
    pub output_format: OutputFormat,

    /// Verbose output
    pub verbose: bool,
}

impl Context {
    /// Create the shared HTTP client.
    pub fn client(&self) -> Result<SenflareClient> {
        let client = SenflareClient::builder()
            .timeout(std::time::Duration::from_secs(self.config.source_timeout_secs))
            .build()?;
        Ok(client)
    }

    /// Load and prune the region cache, optionally from another file.
    pub fn open_cache(&self, path: Option<&Path>) -> Arc<RegionCache> {
        let mut config = self.config.cache_config();
        if let Some(path) = path {
            config = config.path(path);
        }
        Arc::new(RegionCache::open(config))
    }

    /// Build the resolver over both configured lookup services.
    pub fn resolver(
        &self,
        client: &SenflareClient,
        cache: Arc<RegionCache>,
        token: Option<String>,
    ) -> Resolver {
        let config = &self.config;
        let primary = client
            .geo()
            .primary()
            .base_url(&config.primary_lookup_url)
            .token(token.or_else(|| config.primary_token.clone()))
            .timeout(config.api_timeout());
        let fallback = client
            .geo()
            .fallback()
            .base_url(&config.fallback_lookup_url)
            .timeout(config.api_timeout());

        Resolver::with_config(
            cache,
            Arc::new(primary),
            Arc::new(fallback),
            config.resolve_config(),
        )
    }
}

/// Validate, dedupe and sort addresses given on the command line.
pub fn parse_endpoints(ips: &[String]) -> Result<Vec<Endpoint>> {
    let invalid: Vec<&str> = ips
        .iter()
        .map(String::as_str)
        .filter(|ip| !Endpoint::is_valid(ip))
        .collect();
    if !invalid.is_empty() {
        anyhow::bail!("Invalid IPv4 address: {}", invalid.join(", "));
    }
    Ok(dedup_and_sort(ips))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_endpoints() {
        let ips = vec!["8.8.8.8".to_string(), "1.1.1.1".into(), "8.8.8.8".into()];
        let parsed = parse_endpoints(&ips).unwrap();
        let shown: Vec<&str> = parsed.iter().map(Endpoint::as_str).collect();
        assert_eq!(shown, ["1.1.1.1", "8.8.8.8"]);
    }

    #[test]
    fn test_parse_endpoints_rejects_invalid() {
        let ips = vec!["1.1.1.1".to_string(), "256.0.0.1".into()];
        let err = parse_endpoints(&ips).unwrap_err();
        assert!(err.to_string().contains("256.0.0.1"));
    }
}
