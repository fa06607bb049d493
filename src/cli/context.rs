//! Command execution context
//!
//! Resolves configuration and the store location once, so handlers don't
//! repeat the precedence rules (CLI flag > environment > config file > default).

use std::path::PathBuf;
use std::sync::Arc;

use offcache::cache::{CacheStorage, SqliteStore};
use offcache::config::Config;
use offcache::error::Result;

use super::{Cli, OutputFormat};

/// Context for command execution
pub struct CommandContext {
    /// Loaded and validated configuration
    pub config: Config,
    /// Config path override, if any
    pub config_path: Option<String>,
    /// Output format preference
    pub format: OutputFormat,
    cache_dir_override: Option<PathBuf>,
}

impl CommandContext {
    pub fn new(cli: &Cli) -> Result<Self> {
        let config = Config::load_at(cli.config.as_deref())?;

        Ok(Self {
            config,
            config_path: cli.config.clone(),
            format: cli.format,
            cache_dir_override: cli.cache_dir.as_ref().map(PathBuf::from),
        })
    }

    /// Store directory after applying overrides
    pub fn cache_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.cache_dir_override {
            return Ok(dir.clone());
        }
        if let Some(dir) = &self.config.cache_dir {
            return Ok(dir.clone());
        }
        Ok(CacheStorage::cache_dir()?)
    }

    pub fn open_store(&self) -> Result<Arc<SqliteStore>> {
        let dir = self.cache_dir()?;
        log::debug!("Opening store at {}", dir.display());
        Ok(Arc::new(SqliteStore::open_at(&dir)?))
    }

    /// Persist the loaded config back to its file
    pub fn save_config(&self) -> Result<()> {
        self.config.save_at(self.config_path.as_deref())
    }
}
