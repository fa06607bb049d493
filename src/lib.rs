//! offcache - offline-capable response cache for HTTP client pipelines
//!
//! The same cache policy is available as a wrapper around a blocking
//! exchange ([`pipeline::BlockingCacheLayer`]) and as a pair of hooks around
//! an async exchange ([`pipeline::AsyncCacheHooks`] driven by
//! [`pipeline::AsyncPipeline`]). Both share one [`cache::CacheStore`] and one
//! [`mode::CacheModeFlag`].

pub mod cache;
pub mod config;
pub mod error;
pub mod mode;
pub mod pipeline;
pub mod predicate;
pub mod transport;

pub use error::{Error, Result};
