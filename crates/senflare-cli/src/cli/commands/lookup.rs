//! `senflare lookup` - Resolve addresses to regions.

use anyhow::Result;
use colored::Colorize;
use senflare::ReachableEndpoint;
use tracing::error;

use super::{parse_endpoints, Context};
use crate::cli::args::LookupArgs;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: LookupArgs) -> Result<()> {
    let endpoints = parse_endpoints(&args.ips)?;

    let client = ctx.client()?;
    let cache = ctx.open_cache(args.cache.as_deref());
    let resolver = ctx.resolver(&client, std::sync::Arc::clone(&cache), args.token);

    // Latency is not measured here.
    let input: Vec<ReachableEndpoint> = endpoints
        .into_iter()
        .map(|endpoint| ReachableEndpoint::new(endpoint, 0))
        .collect();
    let resolved = resolver.resolve(&input).await;

    if !args.no_save {
        if let Err(e) = cache.persist() {
            error!(error = %e, "failed to save region cache");
        }
    }

    match ctx.output_format {
        OutputFormat::Json => {
            let rows: Vec<_> = resolved
                .iter()
                .map(|r| {
                    serde_json::json!({
                        "endpoint": r.endpoint,
                        "region": r.region,
                        "country": r.country_name(),
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Pretty => {
            for r in &resolved {
                let code = if r.region.is_unknown() {
                    r.region.as_str().yellow()
                } else {
                    r.region.as_str().cyan()
                };
                println!("  {:15} {} ({})", r.endpoint.as_str(), r.country_name(), code);
            }
            println!();
            println!(
                "{}",
                format!(
                    "{} network lookups, {} cached entries",
                    resolver.network_lookups(),
                    cache.len()
                )
                .dimmed()
            );
        }
    }

    Ok(())
}
