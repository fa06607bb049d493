//! reqwest-backed exchanges

use std::time::Duration;

use async_trait::async_trait;
use futures::TryStreamExt;

use super::{AsyncBody, AsyncExchange, AsyncResponse, Body, Exchange, Request, Response};
use crate::error::TransportError;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const USER_AGENT: &str = concat!("offcache/", env!("CARGO_PKG_VERSION"));

/// Async HTTP exchange
#[derive(Debug, Clone)]
pub struct HttpClient {
    http: reqwest::Client,
}

impl HttpClient {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http })
    }
}

#[async_trait]
impl AsyncExchange for HttpClient {
    async fn send(&self, request: &Request) -> Result<AsyncResponse, TransportError> {
        let mut builder = self
            .http
            .request(request.method().clone(), request.url())
            .headers(request.headers().clone());
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().await?;
        let status = response.status();
        let headers = response.headers().clone();
        let chunks = response
            .bytes_stream()
            .map_ok(|chunk| chunk.to_vec())
            .map_err(TransportError::from);

        Ok(AsyncResponse::new(
            status,
            headers,
            AsyncBody::from_stream(chunks),
        ))
    }
}

/// Blocking HTTP exchange.
///
/// Must not be created or used from inside an async runtime thread.
#[derive(Debug, Clone)]
pub struct BlockingHttpClient {
    http: reqwest::blocking::Client,
}

impl BlockingHttpClient {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http })
    }
}

impl Exchange for BlockingHttpClient {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let mut builder = self
            .http
            .request(request.method().clone(), request.url())
            .headers(request.headers().clone());
        if let Some(body) = request.body() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send()?;
        let status = response.status();
        let headers = response.headers().clone();

        Ok(Response::new(status, headers, Body::from_reader(response)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        assert!(HttpClient::new(DEFAULT_TIMEOUT).is_ok());
    }

    #[test]
    fn test_blocking_client_creation() {
        assert!(BlockingHttpClient::new(DEFAULT_TIMEOUT).is_ok());
    }

    #[tokio::test]
    async fn test_connect_failure_is_transport_error() {
        let client = HttpClient::new(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) is closed on CI hosts
        let result = client.send(&Request::get("http://127.0.0.1:9/")).await;
        assert!(result.is_err());
    }
}
