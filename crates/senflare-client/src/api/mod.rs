//! API endpoint modules.

mod geo;
mod sources;

pub use geo::{GeoApi, IpApiLookup, IpInfoLookup};
pub use sources::{extract_candidates, CollectStats, Collection, SourcesApi};
