//! `senflare probe` - TCP reachability of specific addresses.

use anyhow::Result;
use colored::Colorize;
use senflare::recon::Prober;
use senflare::ProbeResult;

use super::{parse_endpoints, Context};
use crate::cli::args::ProbeArgs;
use crate::output::OutputFormat;

pub async fn execute(mut ctx: Context, args: ProbeArgs) -> Result<()> {
    if !args.ports.is_empty() {
        ctx.config.ports = args.ports;
    }
    let endpoints = parse_endpoints(&args.ips)?;

    let prober = Prober::with_config(ctx.config.probe_config());
    let mut results = prober.probe(&endpoints).await;
    results.sort_by(|a, b| a.endpoint.cmp(&b.endpoint));

    match ctx.output_format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        OutputFormat::Pretty => {
            for result in &results {
                println!("{}", pretty_line(result));
            }
            let reachable = results.iter().filter(|r| r.reachable).count();
            println!();
            println!(
                "{}",
                format!("{reachable}/{} reachable", results.len()).dimmed()
            );
        }
    }

    Ok(())
}

fn pretty_line(result: &ProbeResult) -> String {
    match result.latency_ms {
        Some(ms) if result.reachable => format!(
            "  {:15} {} {}",
            result.endpoint.as_str(),
            "reachable".green(),
            format!("{ms}ms").cyan()
        ),
        _ => format!("  {:15} {}", result.endpoint.as_str(), "unreachable".red()),
    }
}
