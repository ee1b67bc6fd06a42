//! Core types and traits for the senflare endpoint pipeline.
//!
//! This crate provides the foundational types used across the workspace:
//!
//! - **Types**: validated [`Endpoint`]s, probe and resolution results, region codes
//! - **Lookup**: the [`RegionLookup`] seam implemented by geolocation services
//! - **Errors**: layered error handling with [`SenflareError`]
//!
//! # Example
//!
//! ```rust
//! use senflare_core::{dedup_and_sort, Endpoint};
//!
//! let sorted = dedup_and_sort(["10.0.0.10", "10.0.0.2", "10.0.0.2", "300.1.1.1"]);
//! let shown: Vec<&str> = sorted.iter().map(Endpoint::as_str).collect();
//! assert_eq!(shown, ["10.0.0.2", "10.0.0.10"]);
//! ```

#![doc(html_root_url = "https://docs.rs/senflare-core/2.1.0")]

mod error;
pub mod lookup;
pub mod types;

pub use error::{Result, SenflareError};
pub use lookup::{LookupFailure, LookupResult, RegionLookup};
pub use types::*;
