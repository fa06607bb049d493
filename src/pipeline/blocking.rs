//! Cache layer for blocking exchanges

use std::sync::Arc;

use super::{Offline, cacheable_text, lookup, persist};
use crate::cache::CacheStore;
use crate::error::TransportError;
use crate::mode::ModeGate;
use crate::predicate::SuccessPredicate;
use crate::transport::{Body, Exchange, Request, Response};

/// Cached wrapper for any blocking [`Exchange`].
///
/// Store I/O happens on the calling thread before `send` returns. The mode
/// flag is read once per request.
pub struct BlockingCacheLayer<E: Exchange> {
    inner: E,
    store: Arc<dyn CacheStore>,
    mode: ModeGate,
    predicate: SuccessPredicate,
}

impl<E: Exchange> BlockingCacheLayer<E> {
    /// Wrap `inner` with the default success predicate
    pub fn new(inner: E, store: Arc<dyn CacheStore>, mode: ModeGate) -> Self {
        Self {
            inner,
            store,
            mode,
            predicate: SuccessPredicate::default(),
        }
    }

    pub fn with_predicate(mut self, predicate: SuccessPredicate) -> Self {
        self.predicate = predicate;
        self
    }

    /// Get the wrapped exchange
    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: Exchange> Exchange for BlockingCacheLayer<E> {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        if request.is_no_cache() {
            return self.inner.send(request);
        }

        let key = request.cache_key();

        if self.mode.is_cache_only_mode_active() {
            let offline: Offline = lookup(self.store.as_ref(), &key);
            return Ok(offline.into());
        }

        let response = self.inner.send(request)?;
        if !response.status().is_success() {
            return Ok(response);
        }

        // The transport body is single-read: buffer it once, persist from
        // the buffer and hand the caller a rebuilt response.
        let (status, headers, body) = response.into_parts();
        let bytes = body.into_bytes()?;

        match cacheable_text(&self.predicate, status, &bytes) {
            Some(text) => persist(self.store.as_ref(), &key, text),
            None => log::debug!("Response not cacheable: {} {}", request.method(), request.url()),
        }

        Ok(Response::new(status, headers, Body::from_bytes(bytes)))
    }
}
