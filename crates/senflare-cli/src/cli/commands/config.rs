//! `senflare config` - CLI configuration management.

use anyhow::Result;
use colored::Colorize;
use std::path::PathBuf;

use super::Context;
use crate::cli::args::{ConfigArgs, ConfigCommands};
use crate::config::Config;
use crate::output::OutputFormat;

pub async fn execute(ctx: Context, args: ConfigArgs) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(&ctx),
        ConfigCommands::Path => show_path(&ctx),
        ConfigCommands::Init { force } => init_config(&ctx, force),
    }
}

fn config_file(ctx: &Context) -> Result<PathBuf> {
    match &ctx.config_path {
        Some(path) => Ok(path.clone()),
        None => Config::path(),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    let config = &ctx.config;

    match ctx.output_format {
        OutputFormat::Json => {
            let mut masked = config.clone();
            masked.primary_token = masked.primary_token.as_deref().map(mask);
            println!("{}", serde_json::to_string_pretty(&masked)?);
        }
        OutputFormat::Pretty => {
            println!("{}", "Current Configuration:".bold());
            println!();

            println!("  {} {}", "sources:".bold(), config.sources.len());
            for url in &config.sources {
                println!("    {}", url.dimmed());
            }
            println!("  {} {:?}", "ports:".bold(), config.ports);
            println!("  {} {}", "max_workers:".bold(), config.max_workers);
            println!("  {} {}", "batch_size:".bold(), config.batch_size);
            println!(
                "  {} {}s connect, {}ms fast, {}s batch",
                "timeouts:".bold(),
                config.connect_timeout_secs,
                config.fast_latency_ms,
                config.batch_timeout_secs
            );
            println!(
                "  {} {} ({}h TTL, {} entries max)",
                "cache:".bold(),
                config.cache_path.display(),
                config.cache_ttl_hours,
                config.cache_capacity
            );
            println!("  {} {}", "primary_lookup_url:".bold(), config.primary_lookup_url);
            println!("  {} {}", "fallback_lookup_url:".bold(), config.fallback_lookup_url);

            // Token (masked)
            let token_display = config
                .primary_token
                .as_deref()
                .map_or_else(|| "(not set)".dimmed().to_string(), mask);
            println!("  {} {}", "primary_token:".bold(), token_display);
        }
    }

    Ok(())
}

fn show_path(ctx: &Context) -> Result<()> {
    let path = config_file(ctx)?;
    println!("{}", path.display());
    Ok(())
}

fn init_config(ctx: &Context, force: bool) -> Result<()> {
    let path = config_file(ctx)?;
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists: {}\n\
             Use --force to overwrite it.",
            path.display()
        );
    }

    Config::default().save_to(&path)?;
    println!("{} wrote {}", "Success:".green().bold(), path.display());
    Ok(())
}

fn mask(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "****".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask() {
        assert_eq!(mask("abcdefghijkl"), "abcd...ijkl");
        assert_eq!(mask("short"), "****");
    }
}
