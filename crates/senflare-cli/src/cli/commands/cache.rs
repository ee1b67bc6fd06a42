//! `senflare cache` - Region cache maintenance.

use anyhow::Result;
use colored::Colorize;
use senflare::recon::{local_now, RegionCache};

use super::Context;
use crate::cli::args::{CacheArgs, CacheCommands};
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: CacheArgs) -> Result<()> {
    let mut config = ctx.config.cache_config();
    if let Some(path) = &args.cache {
        config = config.path(path);
    }

    // Loaded without pruning so stats reflect the file as it is.
    let cache = RegionCache::load(config);

    match args.command {
        CacheCommands::Stats => show_stats(&ctx, &cache),
        CacheCommands::Prune => prune(&ctx, &cache),
        CacheCommands::Clear => clear(&ctx, &cache),
    }
}

fn show_stats(ctx: &Context, cache: &RegionCache) -> Result<()> {
    let stats = cache.stats();

    match ctx.output_format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": cache.config().path,
                "ttl_hours": ctx.config.cache_ttl_hours,
                "capacity": cache.config().capacity,
                "stats": stats,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Pretty => {
            println!("{}", "Region cache:".bold());
            println!("  {} {}", "File:".bold(), cache.config().path.display());
            println!(
                "  {} {}/{}",
                "Entries:".bold(),
                stats.entries,
                cache.config().capacity
            );
            println!("  {} {}", "Fresh:".bold(), stats.fresh.to_string().green());
            println!("  {} {}", "Expired:".bold(), stats.expired.to_string().yellow());
            println!("  {} {}", "Legacy:".bold(), stats.legacy);
        }
    }

    Ok(())
}

fn prune(ctx: &Context, cache: &RegionCache) -> Result<()> {
    let config = cache.config();
    let removed = cache.prune_expired_and_enforce_cap(config.ttl, config.capacity, local_now());
    cache.persist()?;

    match ctx.output_format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::json!({
                    "expired": removed.expired,
                    "evicted": removed.evicted,
                    "remaining": cache.len(),
                })
            );
        }
        OutputFormat::Pretty => {
            println!(
                "{} removed {} expired and {} over-cap entries, {} remain.",
                "Pruned:".green().bold(),
                removed.expired,
                removed.evicted,
                cache.len()
            );
        }
    }

    Ok(())
}

fn clear(ctx: &Context, cache: &RegionCache) -> Result<()> {
    let removed = cache.len();
    cache.clear();
    cache.persist()?;

    match ctx.output_format {
        OutputFormat::Json => println!("{}", serde_json::json!({ "removed": removed })),
        OutputFormat::Pretty => {
            println!("{} removed {} entries.", "Cleared:".green().bold(), removed);
        }
    }

    Ok(())
}
