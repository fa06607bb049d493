//! Hook-based cache interception for async exchanges
//!
//! [`AsyncPipeline`] runs every hook's `before_send`, dispatches if none of
//! them answered, then runs every hook's `after_receive`. The two calls for
//! one request are separate continuations and may land on different worker
//! threads, so [`AsyncCacheHooks`] keeps no per-request state: each hook
//! re-reads the exemption flag and the mode gate and re-derives the key.

use std::sync::Arc;

use async_trait::async_trait;

use super::{Offline, cacheable_text, lookup, persist};
use crate::cache::CacheStore;
use crate::error::TransportError;
use crate::mode::ModeGate;
use crate::predicate::SuccessPredicate;
use crate::transport::{AsyncBody, AsyncExchange, AsyncResponse, Request};

/// Interception points around an async exchange
#[async_trait]
pub trait RequestHook: Send + Sync {
    /// Runs before dispatch. Returning a response skips the network and
    /// every `after_receive`.
    async fn before_send(&self, _request: &Request) -> Option<AsyncResponse> {
        None
    }

    /// Runs after a dispatched request completed
    async fn after_receive(
        &self,
        _request: &Request,
        response: AsyncResponse,
    ) -> Result<AsyncResponse, TransportError> {
        Ok(response)
    }
}

/// Drives [`RequestHook`]s around an [`AsyncExchange`]
pub struct AsyncPipeline<E: AsyncExchange> {
    exchange: E,
    hooks: Vec<Arc<dyn RequestHook>>,
}

impl<E: AsyncExchange> AsyncPipeline<E> {
    pub fn new(exchange: E) -> Self {
        Self {
            exchange,
            hooks: Vec::new(),
        }
    }

    /// Append a hook; hooks run in insertion order
    pub fn with_hook(mut self, hook: impl RequestHook + 'static) -> Self {
        self.hooks.push(Arc::new(hook));
        self
    }

    /// Get the underlying exchange
    pub fn exchange(&self) -> &E {
        &self.exchange
    }
}

#[async_trait]
impl<E: AsyncExchange> AsyncExchange for AsyncPipeline<E> {
    async fn send(&self, request: &Request) -> Result<AsyncResponse, TransportError> {
        for hook in &self.hooks {
            if let Some(response) = hook.before_send(request).await {
                return Ok(response);
            }
        }

        let mut response = self.exchange.send(request).await?;

        for hook in &self.hooks {
            response = hook.after_receive(request, response).await?;
        }
        Ok(response)
    }
}

/// Cache policy as a pair of hooks.
///
/// Store access goes through `spawn_blocking`: the store API is synchronous
/// and single-key operations are short, so the task parks on the blocking
/// pool instead of stalling a runtime worker.
pub struct AsyncCacheHooks {
    store: Arc<dyn CacheStore>,
    mode: ModeGate,
    predicate: SuccessPredicate,
}

impl AsyncCacheHooks {
    pub fn new(store: Arc<dyn CacheStore>, mode: ModeGate) -> Self {
        Self {
            store,
            mode,
            predicate: SuccessPredicate::default(),
        }
    }

    pub fn with_predicate(mut self, predicate: SuccessPredicate) -> Self {
        self.predicate = predicate;
        self
    }
}

#[async_trait]
impl RequestHook for AsyncCacheHooks {
    async fn before_send(&self, request: &Request) -> Option<AsyncResponse> {
        if request.is_no_cache() || !self.mode.is_cache_only_mode_active() {
            return None;
        }

        let key = request.cache_key();
        let store = Arc::clone(&self.store);
        let offline = tokio::task::spawn_blocking(move || lookup(store.as_ref(), &key))
            .await
            .unwrap_or_else(|e| {
                log::warn!("Cache lookup task failed: {}", e);
                Offline::Miss
            });

        Some(offline.into())
    }

    async fn after_receive(
        &self,
        request: &Request,
        response: AsyncResponse,
    ) -> Result<AsyncResponse, TransportError> {
        if request.is_no_cache() || !response.status().is_success() {
            return Ok(response);
        }

        if self.mode.is_cache_only_mode_active() {
            log::debug!(
                "Cache-only mode switched on in flight, not caching {}",
                request.url()
            );
            return Ok(response);
        }

        let key = request.cache_key();
        let (status, headers, body) = response.into_parts();
        let bytes = body.into_bytes().await?;

        match cacheable_text(&self.predicate, status, &bytes) {
            Some(text) => {
                let store = Arc::clone(&self.store);
                let text = text.to_string();
                if let Err(e) =
                    tokio::task::spawn_blocking(move || persist(store.as_ref(), &key, &text)).await
                {
                    log::warn!("Cache write task failed: {}", e);
                }
            }
            None => log::debug!("Response not cacheable: {} {}", request.method(), request.url()),
        }

        Ok(AsyncResponse::new(status, headers, AsyncBody::from_bytes(bytes)))
    }
}
