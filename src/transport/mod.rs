//! Request and response types shared by both pipelines
//!
//! Response bodies are single-read: a [`Body`] wraps a reader and an
//! [`AsyncBody`] wraps a chunk stream. Consuming either one moves it.

use std::fmt;
use std::io::Read;

use async_trait::async_trait;
use futures::stream::{self, BoxStream, Stream, StreamExt, TryStreamExt};
pub use reqwest::Method;
pub use reqwest::StatusCode;
pub use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};

use crate::cache::cache_key;
use crate::error::TransportError;
use crate::pipeline::{OFFLINE_HEADER, OFFLINE_MISS_STATUS};

#[cfg(test)]
pub mod mock;
pub mod http;

#[cfg(test)]
pub use mock::MockExchange;
pub use http::{BlockingHttpClient, HttpClient};

/// Outgoing request as seen by the cache layers
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    url: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
    no_cache: bool,
}

impl Request {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
            no_cache: false,
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(Method::GET, url)
    }

    pub fn post(url: impl Into<String>) -> Self {
        Self::new(Method::POST, url)
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Exempt this request from every cache read and write
    pub fn no_cache(mut self) -> Self {
        self.no_cache = true;
        self
    }

    pub fn set_no_cache(&mut self, no_cache: bool) {
        self.no_cache = no_cache;
    }

    pub fn is_no_cache(&self) -> bool {
        self.no_cache
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Derive the store key for this request
    pub fn cache_key(&self) -> String {
        cache_key(self.method.as_str(), &self.url, self.body())
    }
}

/// Blocking response body, readable once
pub struct Body {
    inner: BodyInner,
}

enum BodyInner {
    Buffered(Vec<u8>),
    Reader(Box<dyn Read + Send>),
}

impl Body {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: BodyInner::Buffered(bytes.into()),
        }
    }

    pub fn from_reader(reader: impl Read + Send + 'static) -> Self {
        Self {
            inner: BodyInner::Reader(Box::new(reader)),
        }
    }

    /// Drain the body into memory
    pub fn into_bytes(self) -> Result<Vec<u8>, TransportError> {
        match self.inner {
            BodyInner::Buffered(bytes) => Ok(bytes),
            BodyInner::Reader(mut reader) => {
                let mut buf = Vec::new();
                reader.read_to_end(&mut buf)?;
                Ok(buf)
            }
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            BodyInner::Buffered(bytes) => write!(f, "Body::Buffered({} bytes)", bytes.len()),
            BodyInner::Reader(_) => f.write_str("Body::Reader"),
        }
    }
}

/// Response returned by a blocking exchange
#[derive(Debug)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Body,
}

impl Response {
    pub fn new(status: StatusCode, headers: HeaderMap, body: Body) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// True for the synthesized "no offline data" response
    pub fn is_offline_miss(&self) -> bool {
        self.status.as_u16() == OFFLINE_MISS_STATUS
    }

    /// True when the body came from the local store instead of the network
    pub fn is_offline_hit(&self) -> bool {
        offline_marker(&self.headers) == Some("hit")
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, Body) {
        (self.status, self.headers, self.body)
    }

    pub fn bytes(self) -> Result<Vec<u8>, TransportError> {
        self.body.into_bytes()
    }

    pub fn text(self) -> Result<String, TransportError> {
        let bytes = self.bytes()?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

/// Async response body, readable once
pub struct AsyncBody {
    inner: AsyncBodyInner,
}

enum AsyncBodyInner {
    Buffered(Vec<u8>),
    Stream(BoxStream<'static, Result<Vec<u8>, TransportError>>),
}

impl AsyncBody {
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            inner: AsyncBodyInner::Buffered(bytes.into()),
        }
    }

    pub fn from_stream(
        stream: impl Stream<Item = Result<Vec<u8>, TransportError>> + Send + 'static,
    ) -> Self {
        Self {
            inner: AsyncBodyInner::Stream(stream.boxed()),
        }
    }

    /// Collect every chunk into memory
    pub async fn into_bytes(self) -> Result<Vec<u8>, TransportError> {
        match self.inner {
            AsyncBodyInner::Buffered(bytes) => Ok(bytes),
            AsyncBodyInner::Stream(chunks) => {
                chunks
                    .try_fold(Vec::new(), |mut buf, chunk| async move {
                        buf.extend_from_slice(&chunk);
                        Ok(buf)
                    })
                    .await
            }
        }
    }

    /// Re-expose the body as a stream of chunks
    pub fn into_stream(self) -> BoxStream<'static, Result<Vec<u8>, TransportError>> {
        match self.inner {
            AsyncBodyInner::Buffered(bytes) => stream::once(async move { Ok(bytes) }).boxed(),
            AsyncBodyInner::Stream(chunks) => chunks,
        }
    }
}

impl fmt::Debug for AsyncBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.inner {
            AsyncBodyInner::Buffered(bytes) => {
                write!(f, "AsyncBody::Buffered({} bytes)", bytes.len())
            }
            AsyncBodyInner::Stream(_) => f.write_str("AsyncBody::Stream"),
        }
    }
}

/// Response returned by an async exchange
#[derive(Debug)]
pub struct AsyncResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: AsyncBody,
}

impl AsyncResponse {
    pub fn new(status: StatusCode, headers: HeaderMap, body: AsyncBody) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// True for the synthesized "no offline data" response
    pub fn is_offline_miss(&self) -> bool {
        self.status.as_u16() == OFFLINE_MISS_STATUS
    }

    /// True when the body came from the local store instead of the network
    pub fn is_offline_hit(&self) -> bool {
        offline_marker(&self.headers) == Some("hit")
    }

    pub fn into_parts(self) -> (StatusCode, HeaderMap, AsyncBody) {
        (self.status, self.headers, self.body)
    }

    pub async fn bytes(self) -> Result<Vec<u8>, TransportError> {
        self.body.into_bytes().await
    }

    pub async fn text(self) -> Result<String, TransportError> {
        let bytes = self.bytes().await?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

fn offline_marker(headers: &HeaderMap) -> Option<&str> {
    headers.get(OFFLINE_HEADER).and_then(|v| v.to_str().ok())
}

/// A blocking request/response exchange
pub trait Exchange: Send + Sync {
    fn send(&self, request: &Request) -> Result<Response, TransportError>;
}

/// A non-blocking request/response exchange
#[async_trait]
pub trait AsyncExchange: Send + Sync {
    async fn send(&self, request: &Request) -> Result<AsyncResponse, TransportError>;
}
