//! HTTP side of senflare.
//!
//! This crate provides the shared [`SenflareClient`] and the two HTTP
//! collaborators of the pipeline:
//!
//! - [`api::SourcesApi`] fetches candidate lists and extracts IPv4 endpoints
//! - [`api::IpInfoLookup`] / [`api::IpApiLookup`] implement
//!   [`senflare_core::RegionLookup`] for the primary and fallback services

#![doc(html_root_url = "https://docs.rs/senflare-client/2.1.0")]

mod client;
mod config;
pub mod api;

pub use api::{CollectStats, Collection};
pub use client::{FetchedBody, SenflareClient, SenflareClientBuilder};
pub use config::*;
pub use senflare_core::{Result, SenflareError};
