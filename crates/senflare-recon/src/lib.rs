//! Reachability probing and cached region resolution.
//!
//! The two concurrent stages of the pipeline live here:
//!
//! - [`prober::Prober`] checks which endpoints accept TCP connections
//! - [`resolver::Resolver`] classifies reachable endpoints by region,
//!   consulting a persistent [`cache::RegionCache`] first

#![doc(html_root_url = "https://docs.rs/senflare-recon/2.1.0")]

mod error;

pub mod cache;
pub mod prober;
pub mod resolver;

pub use cache::{local_now, CacheConfig, CacheEntry, CacheStats, PruneStats, RegionCache};
pub use error::{ReconError, ReconResult};
pub use prober::{Connector, ProbeConfig, Prober, TcpConnector};
pub use resolver::{ResolveConfig, Resolver, MAX_RESOLVE_WORKERS};
