//! Discover candidate edge endpoints, keep the reachable ones and rank them by region.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use senflare::{Pipeline, SenflareClient, SourceConfig};
//! use senflare::recon::{CacheConfig, Prober, RegionCache, Resolver};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> senflare::Result<()> {
//!     let client = SenflareClient::new()?;
//!     let cache = Arc::new(RegionCache::open(CacheConfig::default()));
//!     let resolver = Resolver::new(
//!         Arc::clone(&cache),
//!         Arc::new(client.geo().primary()),
//!         Arc::new(client.geo().fallback()),
//!     );
//!
//!     let pipeline = Pipeline::new(client, SourceConfig::default(), Prober::new(), resolver);
//!     let output = pipeline.run().await;
//!     println!("{}", output.report.render());
//!
//!     cache.persist()?;
//!     Ok(())
//! }
//! ```
//!
//! # Features
//!
//! - `default` - Uses rustls for TLS
//! - `rustls` - Use rustls for TLS (recommended)
//! - `native-tls` - Use system native TLS

#![doc(html_root_url = "https://docs.rs/senflare/2.1.0")]

pub mod pipeline;
pub mod report;

// Re-export core types
pub use senflare_core::*;

// Re-export client
pub use senflare_client::{
    api, CollectStats, Collection, RetryConfig, SenflareClient, SenflareClientBuilder,
    SourceConfig, DEFAULT_FALLBACK_URL, DEFAULT_PRIMARY_URL, DEFAULT_SOURCES,
};

// Re-export probing and resolution
pub use senflare_recon as recon;

pub use pipeline::{Pipeline, RunOutput, RunSummary};
pub use report::{Report, ReportLine};

// Re-export runtime for convenience
pub use serde;
pub use serde_json;
pub use tokio;
