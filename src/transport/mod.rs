//! The HTTP transport seam.
//!
//! Remote operations go through the [`Transport`] trait: one call per HTTP
//! verb, each returning a plain [`Response`]. The live implementation is
//! [`HttpTransport`]; tests use [`MockTransport`], which serves canned
//! responses and fails loudly when nothing matches.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod http;
pub mod mock;

pub use http::HttpTransport;
pub use mock::MockTransport;

/// Request/response header pairs.
pub type Headers = Vec<(String, String)>;

/// An HTTP verb, as far as this layer cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        };
        f.write_str(s)
    }
}

/// A raw transport response.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Response {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Failures below the HTTP status line. Propagated unmodified to whoever
/// triggered the remote operation.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The mock transport had no canned response for this request.
    #[error("no response recorded for {method} {path}")]
    NoResponseRecorded { method: Method, path: String },

    /// The live transport failed before or while reading a response.
    #[error("transport failure: {0}")]
    Connection(String),
}

/// Blocking-per-operation HTTP access: each call resolves to one response
/// or one error. Timeouts and retries are the implementation's business.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, path: &str, headers: &Headers) -> Result<Response, TransportError>;

    async fn post(
        &self,
        path: &str,
        body: &[u8],
        headers: &Headers,
    ) -> Result<Response, TransportError>;

    async fn put(
        &self,
        path: &str,
        body: &[u8],
        headers: &Headers,
    ) -> Result<Response, TransportError>;

    async fn delete(&self, path: &str, headers: &Headers) -> Result<Response, TransportError>;
}
