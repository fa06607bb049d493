//! offcache CLI - offline-capable HTTP response cache

use clap::Parser;

mod cli;

use cli::{CacheCommands, Cli, CommandContext, Commands, ModeCommands};
use offcache::error::Result;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.debug);

    if let Err(err) = run(cli) {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let mut ctx = CommandContext::new(&cli)?;

    match cli.command {
        Commands::Fetch(args) => cli::fetch::run(&ctx, &args),
        Commands::Mode(mode_cmd) => match mode_cmd {
            ModeCommands::Get => cli::mode::get(&ctx),
            ModeCommands::On => cli::mode::set(&mut ctx, true),
            ModeCommands::Off => cli::mode::set(&mut ctx, false),
        },
        Commands::Cache(cache_cmd) => match cache_cmd {
            CacheCommands::Status => cli::cache::status(&ctx),
            CacheCommands::Clear => cli::cache::clear(&ctx),
            CacheCommands::Delete { key } => cli::cache::delete(&ctx, &key),
            CacheCommands::Path => cli::cache::path(&ctx),
        },
    }
}
