//! `senflare run` - Full pipeline.

use anyhow::Result;
use colored::Colorize;
use senflare::recon::Prober;
use senflare::{Pipeline, RunOutput};
use tracing::{error, info, warn};

use super::Context;
use crate::cli::args::RunArgs;
use crate::output::{self, OutputFormat};

pub async fn execute(mut ctx: Context, args: RunArgs) -> Result<()> {
    apply_overrides(&mut ctx, &args);
    ctx.config.validate()?;
    let config = &ctx.config;

    output::remove_stale(&[config.reachable_path.as_path(), config.report_path.as_path()])?;
    info!("previous output files removed");

    let client = ctx.client()?;
    let cache = ctx.open_cache(None);
    let resolver = ctx.resolver(&client, std::sync::Arc::clone(&cache), args.token);
    let prober = Prober::with_config(config.probe_config());
    let pipeline = Pipeline::new(client, config.source_config(), prober, resolver);

    let output = tokio::select! {
        output = pipeline.run() => output,
        _ = tokio::signal::ctrl_c() => {
            warn!("interrupted, stopping without saving the cache");
            eprintln!("{}", "Interrupted.".yellow());
            return Ok(());
        }
    };

    if let Err(e) = cache.persist() {
        error!(error = %e, "failed to save region cache");
    }

    let wrote_list = output::write_reachable(&config.reachable_path, &output.reachable)?;
    let wrote_report = output::write_report(&config.report_path, &output.report)?;
    if wrote_list {
        info!(path = %config.reachable_path.display(), count = output.reachable.len(), "reachable list written");
    }
    if wrote_report {
        info!(path = %config.report_path.display(), lines = output.report.len(), "report written");
    } else {
        warn!("no reachable endpoints, report not written");
    }

    print_output(&ctx, &output)
}

fn apply_overrides(ctx: &mut Context, args: &RunArgs) {
    let config = &mut ctx.config;
    if !args.sources.is_empty() {
        config.sources.clone_from(&args.sources);
    }
    if !args.ports.is_empty() {
        config.ports.clone_from(&args.ports);
    }
    if let Some(workers) = args.workers {
        config.max_workers = workers;
    }
    if let Some(size) = args.batch_size {
        config.batch_size = size;
    }
    if let Some(path) = &args.cache {
        config.cache_path.clone_from(path);
    }
    if let Some(path) = &args.reachable_out {
        config.reachable_path.clone_from(path);
    }
    if let Some(path) = &args.report_out {
        config.report_path.clone_from(path);
    }
}

fn print_output(ctx: &Context, output: &RunOutput) -> Result<()> {
    match ctx.output_format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "summary": output.summary,
                "report": output.report.lines(),
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Pretty => {
            for line in output.report.lines() {
                println!("{line}");
            }
            if !output.report.is_empty() {
                println!();
            }

            let s = &output.summary;
            println!("{}", "Run summary:".bold());
            println!(
                "  {} {} ok, {} skipped",
                "Sources:".bold(),
                s.sources_ok.to_string().green(),
                s.sources_failed.to_string().red()
            );
            println!("  {} {}", "Candidates:".bold(), s.candidates);
            println!("  {} {}", "Reachable:".bold(), s.reachable.to_string().cyan());
            println!("  {} {}", "Regions:".bold(), s.regions);
            println!("  {} {}", "Cached:".bold(), s.cached);
            println!("  {} {:.1}s", "Elapsed:".bold(), s.elapsed().as_secs_f64());
            if ctx.verbose {
                println!(
                    "  {} {}, {}",
                    "Files:".bold(),
                    ctx.config.reachable_path.display(),
                    ctx.config.report_path.display()
                );
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use std::path::PathBuf;

    #[test]
    fn test_overrides_replace_config_values() {
        let mut ctx = Context {
            config: Config::default(),
            config_path: None,
            output_format: OutputFormat::Pretty,
            verbose: false,
        };
        let args = RunArgs {
            sources: vec!["http://example.test/list".into()],
            ports: vec![2053],
            workers: Some(4),
            report_out: Some(PathBuf::from("out/report.txt")),
            ..RunArgs::default()
        };

        apply_overrides(&mut ctx, &args);
        assert_eq!(ctx.config.sources, ["http://example.test/list"]);
        assert_eq!(ctx.config.ports, [2053]);
        assert_eq!(ctx.config.max_workers, 4);
        assert_eq!(ctx.config.report_path, PathBuf::from("out/report.txt"));
        assert_eq!(ctx.config.reachable_path, PathBuf::from("IPlist.txt"));
    }
}
