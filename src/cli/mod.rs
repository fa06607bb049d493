//! CLI command definitions and handlers

use clap::{Parser, Subcommand, ValueEnum};

pub mod cache;
pub mod context;
pub mod fetch;
pub mod mode;

pub use context::CommandContext;

/// offcache - offline-capable HTTP response cache
#[derive(Parser, Debug)]
#[command(name = "offcache")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Output format (pretty, json)
    #[arg(
        long,
        global = true,
        env = "OFFCACHE_FORMAT",
        default_value = "pretty",
        hide_env = true,
        hide_possible_values = true
    )]
    pub format: OutputFormat,

    /// Override config file location
    #[arg(long, global = true, env = "OFFCACHE_CONFIG", hide_env = true)]
    pub config: Option<String>,

    /// Override cache directory
    #[arg(long, global = true, env = "OFFCACHE_CACHE_DIR", hide_env = true)]
    pub cache_dir: Option<String>,

    /// Enable debug logging
    #[arg(long, global = true, env = "OFFCACHE_DEBUG", hide_env = true)]
    pub debug: bool,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a request through the cache pipeline
    Fetch(FetchArgs),

    /// Show or change cache-only mode
    #[command(subcommand)]
    Mode(ModeCommands),

    /// Manage the local response store
    #[command(subcommand)]
    Cache(CacheCommands),
}

/// Arguments for `offcache fetch`
#[derive(clap::Args, Debug, Clone)]
pub struct FetchArgs {
    /// Request URL
    pub url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET")]
    pub method: String,

    /// Request body
    #[arg(short = 'd', long)]
    pub data: Option<String>,

    /// Exempt this request from caching
    #[arg(long)]
    pub no_cache: bool,

    /// Use the blocking pipeline instead of the async one
    #[arg(long)]
    pub blocking: bool,

    /// Force cache-only mode for this request
    #[arg(long)]
    pub offline: bool,
}

/// Cache-only mode subcommands
#[derive(Subcommand, Debug)]
pub enum ModeCommands {
    /// Show the persisted mode
    Get,

    /// Serve every request from the local store
    On,

    /// Go back to the network
    Off,
}

/// Store management subcommands
#[derive(Subcommand, Debug)]
pub enum CacheCommands {
    /// Show store statistics
    Status,

    /// Remove every stored response
    Clear,

    /// Remove the response stored under a cache key
    Delete {
        /// 32-character key, as printed by `fetch --format json`
        key: String,
    },

    /// Print the store directory
    Path,
}

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Pretty,
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_fetch() {
        let cli = Cli::try_parse_from([
            "offcache",
            "fetch",
            "https://api.example/x",
            "-X",
            "post",
            "-d",
            "a=1",
            "--offline",
            "--blocking",
        ])
        .unwrap();

        match cli.command {
            Commands::Fetch(args) => {
                assert_eq!(args.url, "https://api.example/x");
                assert_eq!(args.method, "post");
                assert_eq!(args.data.as_deref(), Some("a=1"));
                assert!(args.offline);
                assert!(args.blocking);
                assert!(!args.no_cache);
            }
            _ => panic!("Expected fetch command"),
        }
        assert_eq!(cli.format, OutputFormat::Pretty);
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "offcache",
            "mode",
            "on",
            "--config",
            "/tmp/offcache.yaml",
            "--format",
            "json",
        ])
        .unwrap();

        assert!(matches!(cli.command, Commands::Mode(ModeCommands::On)));
        assert_eq!(cli.config.as_deref(), Some("/tmp/offcache.yaml"));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_parse_cache_delete() {
        let cli = Cli::try_parse_from([
            "offcache",
            "cache",
            "delete",
            "e8cd4a19739c12125514af3bc792d8a5",
        ])
        .unwrap();

        match cli.command {
            Commands::Cache(CacheCommands::Delete { key }) => {
                assert_eq!(key, "e8cd4a19739c12125514af3bc792d8a5");
            }
            _ => panic!("Expected cache delete command"),
        }
        assert!(Cli::try_parse_from(["offcache", "cache", "delete"]).is_err());
    }

    #[test]
    fn test_fetch_requires_url() {
        assert!(Cli::try_parse_from(["offcache", "fetch"]).is_err());
    }
}
