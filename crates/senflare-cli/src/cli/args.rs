//! Command-line argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::output::OutputFormat;

/// Collect candidate edge endpoints, keep the reachable ones and rank them by region
///
/// Without a subcommand a full `run` is performed with the configured defaults.
#[derive(Parser, Debug)]
#[command(name = "senflare")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (defaults to the per-user config directory)
    #[arg(short, long, env = "SENFLARE_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Increase verbosity
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the full pipeline: collect, probe, resolve, write the report
    Run(RunArgs),

    /// Probe addresses for TCP reachability
    Probe(ProbeArgs),

    /// Resolve addresses to regions through the cache
    Lookup(LookupArgs),

    /// Inspect or maintain the region cache
    Cache(CacheArgs),

    /// Manage CLI configuration
    Config(ConfigArgs),
}

// ============================================================================
// Run command
// ============================================================================

#[derive(Args, Debug, Default)]
pub struct RunArgs {
    /// Candidate list URL (repeatable, replaces the configured list)
    #[arg(short, long = "source")]
    pub sources: Vec<String>,

    /// Port to probe (repeatable, replaces the configured ports)
    #[arg(short, long = "port")]
    pub ports: Vec<u16>,

    /// Global worker limit
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Endpoints per probe batch
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Region cache file
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Reachable list output file
    #[arg(long)]
    pub reachable_out: Option<PathBuf>,

    /// Report output file
    #[arg(long)]
    pub report_out: Option<PathBuf>,

    /// Log file
    #[arg(long, conflicts_with = "no_log_file")]
    pub log_file: Option<PathBuf>,

    /// Do not write a log file
    #[arg(long)]
    pub no_log_file: bool,

    /// Token for the primary lookup service
    #[arg(long, env = "SENFLARE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

// ============================================================================
// Probe command
// ============================================================================

#[derive(Args, Debug)]
pub struct ProbeArgs {
    /// IPv4 addresses to probe
    #[arg(required = true)]
    pub ips: Vec<String>,

    /// Port to probe (repeatable, replaces the configured ports)
    #[arg(short, long = "port")]
    pub ports: Vec<u16>,
}

// ============================================================================
// Lookup command
// ============================================================================

#[derive(Args, Debug)]
pub struct LookupArgs {
    /// IPv4 addresses to resolve
    #[arg(required = true)]
    pub ips: Vec<String>,

    /// Region cache file
    #[arg(long)]
    pub cache: Option<PathBuf>,

    /// Leave the cache file untouched
    #[arg(long)]
    pub no_save: bool,

    /// Token for the primary lookup service
    #[arg(long, env = "SENFLARE_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

// ============================================================================
// Cache command
// ============================================================================

#[derive(Args, Debug)]
pub struct CacheArgs {
    /// Region cache file
    #[arg(long, global = true)]
    pub cache: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CacheCommands,
}

#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show entry counts
    Stats,

    /// Drop expired entries and enforce the entry cap
    Prune,

    /// Remove every entry
    Clear,
}

// ============================================================================
// Config command
// ============================================================================

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show the effective configuration
    Show,

    /// Show the config file path
    Path,

    /// Write a config file with the default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
