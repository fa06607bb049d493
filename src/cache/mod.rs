//! Local store for offline responses
//!
//! Provides request key derivation and a SQLite-backed store. Entries never
//! expire; they are overwritten by newer responses for the same key or
//! removed with `offcache cache clear`.

pub mod key;
pub mod storage;
pub mod store;

// Re-export main types
pub use key::cache_key;
pub use storage::CacheStorage;
pub use store::{CacheEntry, CacheStore, MemoryStore, SqliteStore};
