//! Cache interception for blocking and async client pipelines
//!
//! Both variants apply one policy:
//! - exempt requests pass straight through, the store is never touched
//! - in cache-only mode the store answers (hit or miss sentinel) and the
//!   network is never reached
//! - otherwise the exchange runs and eligible responses are upserted
//!
//! The helpers here hold the shared pieces so the two variants only differ
//! in how they schedule store access.

use crate::cache::CacheStore;
use crate::predicate::SuccessPredicate;
use crate::transport::{
    AsyncBody, AsyncResponse, Body, HeaderMap, HeaderValue, Response, StatusCode, header,
};

pub mod blocking;
pub mod hooks;

pub use blocking::BlockingCacheLayer;
pub use hooks::{AsyncCacheHooks, AsyncPipeline, RequestHook};

/// Status of the synthesized response for a cache-only lookup that found
/// nothing. Outside the range real servers send, so callers can tell it
/// apart from network errors.
pub const OFFLINE_MISS_STATUS: u16 = 599;

/// Body of the cache-only miss response
pub const OFFLINE_MISS_BODY: &str = "{}";

/// Header set on every synthesized response, `hit` or `miss`
pub const OFFLINE_HEADER: &str = "x-offcache";

/// Outcome of a cache-only lookup
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Offline {
    Hit(String),
    Miss,
}

impl Offline {
    fn into_parts(self) -> (StatusCode, HeaderMap, Vec<u8>) {
        let (status, marker, body) = match self {
            Offline::Hit(body) => (StatusCode::OK, "hit", body),
            Offline::Miss => (
                StatusCode::from_u16(OFFLINE_MISS_STATUS).unwrap_or(StatusCode::NOT_FOUND),
                "miss",
                OFFLINE_MISS_BODY.to_string(),
            ),
        };

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        headers.insert(OFFLINE_HEADER, HeaderValue::from_static(marker));
        (status, headers, body.into_bytes())
    }
}

impl From<Offline> for Response {
    fn from(offline: Offline) -> Self {
        let (status, headers, body) = offline.into_parts();
        Response::new(status, headers, Body::from_bytes(body))
    }
}

impl From<Offline> for AsyncResponse {
    fn from(offline: Offline) -> Self {
        let (status, headers, body) = offline.into_parts();
        AsyncResponse::new(status, headers, AsyncBody::from_bytes(body))
    }
}

/// Answer a request from the store alone. Store failures count as a miss.
pub(crate) fn lookup(store: &dyn CacheStore, key: &str) -> Offline {
    match store.get(key) {
        Ok(Some(entry)) => {
            log::debug!("Cache hit: {}", key);
            Offline::Hit(entry.body)
        }
        Ok(None) => {
            log::debug!("Cache miss: {}", key);
            Offline::Miss
        }
        Err(e) => {
            log::warn!("Cache lookup failed for {}: {}", key, e);
            Offline::Miss
        }
    }
}

/// Body text to persist, if the response qualifies
pub(crate) fn cacheable_text<'a>(
    predicate: &SuccessPredicate,
    status: StatusCode,
    body: &'a [u8],
) -> Option<&'a str> {
    let text = std::str::from_utf8(body).ok()?;
    if predicate.is_cacheable(status.is_success(), text) {
        Some(text)
    } else {
        None
    }
}

/// Upsert a qualifying body. Failures are logged and swallowed.
pub(crate) fn persist(store: &dyn CacheStore, key: &str, body: &str) {
    match store.put(key, body) {
        Ok(()) => log::debug!("Cached response: {} ({} bytes)", key, body.len()),
        Err(e) => log::warn!("Failed to cache response {}: {}", key, e),
    }
}
