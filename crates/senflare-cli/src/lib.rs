//! # senflare-cli
//!
//! Command-line front end for the senflare pipeline.
//!
//! ## Features
//!
//! - **Full run**: collect candidates, probe, resolve regions, write the ranked report
//! - **Ad-hoc tools**: probe or resolve individual addresses
//! - **Cache maintenance**: inspect, prune or clear the region cache
//! - **Configuration**: TOML file with CLI overrides
//! - **Output formats**: pretty (colored) or JSON

pub mod cli;
pub mod config;
pub mod logging;
pub mod output;

pub use cli::run;
