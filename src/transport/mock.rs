//! Canned-response transport for testing record behavior in isolation.
//!
//! Register responses with the expectation builders, hand the mock to a
//! client, then assert on the request log. A request with no matching canned
//! response returns [`TransportError::NoResponseRecorded`] — silent
//! pass-through would hide a wrong path faster than any assertion finds it.
//!
//! # Example
//! ```ignore
//! let mock = MockTransport::new();
//! mock.expect_post("/races.json").respond(200, r#"{"race":{"id":1}}"#);
//!
//! // run code under test...
//!
//! assert_eq!(mock.calls(Method::Post, "/races.json"), 1);
//! mock.verify(); // every canned response was hit at least once
//! ```

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tracing::warn;

use super::{Headers, Method, Response, Transport, TransportError};

struct Canned {
    method: Method,
    path: String,
    status: u16,
    headers: Headers,
    body: Vec<u8>,
    hits: usize,
}

#[derive(Default)]
struct MockState {
    canned: Vec<Canned>,
    log: Vec<(Method, String)>,
}

/// Transport that serves registered responses and records every request.
///
/// Canned responses are not consumed: the same registration answers repeat
/// requests, which lets tests distinguish "cached, zero further requests"
/// from "fetched again" by counting [`MockTransport::calls`].
#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn expect_get(&self, path: impl Into<String>) -> ResponseBuilder {
        self.expect(Method::Get, path)
    }

    pub fn expect_post(&self, path: impl Into<String>) -> ResponseBuilder {
        self.expect(Method::Post, path)
    }

    pub fn expect_put(&self, path: impl Into<String>) -> ResponseBuilder {
        self.expect(Method::Put, path)
    }

    pub fn expect_delete(&self, path: impl Into<String>) -> ResponseBuilder {
        self.expect(Method::Delete, path)
    }

    fn expect(&self, method: Method, path: impl Into<String>) -> ResponseBuilder {
        ResponseBuilder {
            method,
            path: path.into(),
            state: self.state.clone(),
        }
    }

    /// Every request seen, in order.
    pub fn requests(&self) -> Vec<(Method, String)> {
        self.state.lock().unwrap().log.clone()
    }

    /// How many times a verb/path pair was requested.
    pub fn calls(&self, method: Method, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .log
            .iter()
            .filter(|(m, p)| *m == method && p == path)
            .count()
    }

    /// Panics if any canned response was never requested.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        let unused: Vec<String> = state
            .canned
            .iter()
            .filter(|c| c.hits == 0)
            .map(|c| format!("{} {}", c.method, c.path))
            .collect();
        if !unused.is_empty() {
            panic!("canned responses never requested: {}", unused.join(", "));
        }
    }

    fn serve(&self, method: Method, path: &str) -> Result<Response, TransportError> {
        let mut state = self.state.lock().unwrap();
        state.log.push((method, path.to_string()));
        match state
            .canned
            .iter_mut()
            .find(|c| c.method == method && c.path == path)
        {
            Some(canned) => {
                canned.hits += 1;
                Ok(Response {
                    status: canned.status,
                    headers: canned.headers.clone(),
                    body: canned.body.clone(),
                })
            }
            None => {
                warn!(%method, path, "no canned response");
                Err(TransportError::NoResponseRecorded {
                    method,
                    path: path.to_string(),
                })
            }
        }
    }
}

/// Builder for one canned response.
pub struct ResponseBuilder {
    method: Method,
    path: String,
    state: Arc<Mutex<MockState>>,
}

impl ResponseBuilder {
    /// Registers the response for this verb/path.
    pub fn respond(self, status: u16, body: impl Into<Vec<u8>>) {
        self.respond_with(status, body, Headers::new());
    }

    /// Registers the response with explicit headers.
    pub fn respond_with(self, status: u16, body: impl Into<Vec<u8>>, headers: Headers) {
        self.state.lock().unwrap().canned.push(Canned {
            method: self.method,
            path: self.path,
            status,
            headers,
            body: body.into(),
            hits: 0,
        });
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, path: &str, _headers: &Headers) -> Result<Response, TransportError> {
        self.serve(Method::Get, path)
    }

    async fn post(
        &self,
        path: &str,
        _body: &[u8],
        _headers: &Headers,
    ) -> Result<Response, TransportError> {
        self.serve(Method::Post, path)
    }

    async fn put(
        &self,
        path: &str,
        _body: &[u8],
        _headers: &Headers,
    ) -> Result<Response, TransportError> {
        self.serve(Method::Put, path)
    }

    async fn delete(&self, path: &str, _headers: &Headers) -> Result<Response, TransportError> {
        self.serve(Method::Delete, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn serves_canned_responses_repeatedly() {
        let mock = MockTransport::new();
        mock.expect_get("/races/1.json").respond(200, "{}");

        let first = mock.get("/races/1.json", &Headers::new()).await.unwrap();
        let second = mock.get("/races/1.json", &Headers::new()).await.unwrap();
        assert_eq!(first.status, 200);
        assert_eq!(second.status, 200);
        assert_eq!(mock.calls(Method::Get, "/races/1.json"), 2);
    }

    #[tokio::test]
    async fn unmatched_request_is_an_error() {
        let mock = MockTransport::new();
        let err = mock.get("/nowhere.json", &Headers::new()).await.unwrap_err();
        assert!(matches!(err, TransportError::NoResponseRecorded { .. }));
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    #[should_panic(expected = "never requested")]
    async fn verify_panics_on_unused_responses() {
        let mock = MockTransport::new();
        mock.expect_post("/races.json").respond(201, "{}");
        mock.verify();
    }
}
