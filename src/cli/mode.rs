//! Cache-only mode commands

use offcache::error::Result;

use super::{CommandContext, OutputFormat};

/// Show the persisted mode
pub fn get(ctx: &CommandContext) -> Result<()> {
    print_mode(ctx.format, ctx.config.cache_only)
}

/// Persist a new mode
pub fn set(ctx: &mut CommandContext, cache_only: bool) -> Result<()> {
    ctx.config.cache_only = cache_only;
    ctx.save_config()?;
    log::debug!("Saved cache_only={}", cache_only);
    print_mode(ctx.format, cache_only)
}

fn print_mode(format: OutputFormat, cache_only: bool) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({ "cache_only": cache_only });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Pretty => {
            println!("Cache-only mode: {}", if cache_only { "on" } else { "off" });
        }
    }
    Ok(())
}
