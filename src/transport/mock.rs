//! Mock exchange for testing
//!
//! Serves a canned reply for every request and records what was sent, so
//! tests can assert whether the network was reached.

use async_trait::async_trait;
use futures::stream;
use std::io::Cursor;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use super::{
    AsyncBody, AsyncExchange, AsyncResponse, Body, Exchange, HeaderMap, HeaderValue, Request,
    Response, StatusCode, header,
};
use crate::error::TransportError;

/// Canned outcome for every call
#[derive(Debug, Clone)]
enum Reply {
    Ok { status: u16, body: String },
    Timeout,
}

/// Mock exchange for testing.
///
/// # Example
/// ```ignore
/// let mock = MockExchange::new().with_reply(200, r#"{"code":1}"#);
/// let response = mock.send(&Request::get("https://api.example/x"))?;
/// assert_eq!(mock.calls(), 1);
/// ```
pub struct MockExchange {
    reply: Mutex<Reply>,
    calls: AtomicUsize,
    captured_requests: Mutex<Vec<Request>>,
}

impl Default for MockExchange {
    fn default() -> Self {
        Self {
            reply: Mutex::new(Reply::Ok {
                status: 200,
                body: String::new(),
            }),
            calls: AtomicUsize::new(0),
            captured_requests: Mutex::new(Vec::new()),
        }
    }
}

impl MockExchange {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reply(self, status: u16, body: &str) -> Self {
        *self.reply.lock().unwrap() = Reply::Ok {
            status,
            body: body.to_string(),
        };
        self
    }

    /// Fail every call with a timeout
    pub fn with_timeout(self) -> Self {
        *self.reply.lock().unwrap() = Reply::Timeout;
        self
    }

    /// Number of requests that reached the exchange
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn captured_requests(&self) -> Vec<Request> {
        self.captured_requests.lock().unwrap().clone()
    }

    fn record(&self, request: &Request) -> Result<(StatusCode, HeaderMap, String), TransportError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.captured_requests.lock().unwrap().push(request.clone());

        match self.reply.lock().unwrap().clone() {
            Reply::Ok { status, body } => {
                let mut headers = HeaderMap::new();
                headers.insert(
                    header::CONTENT_TYPE,
                    HeaderValue::from_static("application/json"),
                );
                headers.insert("x-upstream", HeaderValue::from_static("mock"));
                Ok((StatusCode::from_u16(status).unwrap(), headers, body))
            }
            Reply::Timeout => Err(TransportError::Timeout),
        }
    }
}

impl Exchange for MockExchange {
    fn send(&self, request: &Request) -> Result<Response, TransportError> {
        let (status, headers, body) = self.record(request)?;
        Ok(Response::new(
            status,
            headers,
            Body::from_reader(Cursor::new(body.into_bytes())),
        ))
    }
}

#[async_trait]
impl AsyncExchange for MockExchange {
    async fn send(&self, request: &Request) -> Result<AsyncResponse, TransportError> {
        let (status, headers, body) = self.record(request)?;

        // Split into two chunks to exercise buffering
        let bytes = body.into_bytes();
        let mid = bytes.len() / 2;
        let chunks = vec![Ok(bytes[..mid].to_vec()), Ok(bytes[mid..].to_vec())];

        Ok(AsyncResponse::new(
            status,
            headers,
            AsyncBody::from_stream(stream::iter(chunks)),
        ))
    }
}
