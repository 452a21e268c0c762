//! Live transport backed by `reqwest`.

use async_trait::async_trait;

use super::{Headers, Response, Transport, TransportError};

/// HTTP transport against a fixed site, e.g. `http://localhost:3000`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    site: String,
    client: reqwest::Client,
}

impl HttpTransport {
    /// `site` is prepended to every request path; no trailing slash.
    pub fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            client: reqwest::Client::new(),
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    async fn request(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<&[u8]>,
        headers: &Headers,
    ) -> Result<Response, TransportError> {
        let url = format!("{}{}", self.site, path);
        let mut request = self.client.request(method, &url);
        for (name, value) in headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = body {
            request = request.body(body.to_vec());
        }

        let response = request
            .send()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::Connection(e.to_string()))?
            .to_vec();

        Ok(Response {
            status,
            headers,
            body,
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, path: &str, headers: &Headers) -> Result<Response, TransportError> {
        self.request(reqwest::Method::GET, path, None, headers).await
    }

    async fn post(
        &self,
        path: &str,
        body: &[u8],
        headers: &Headers,
    ) -> Result<Response, TransportError> {
        self.request(reqwest::Method::POST, path, Some(body), headers)
            .await
    }

    async fn put(
        &self,
        path: &str,
        body: &[u8],
        headers: &Headers,
    ) -> Result<Response, TransportError> {
        self.request(reqwest::Method::PUT, path, Some(body), headers)
            .await
    }

    async fn delete(&self, path: &str, headers: &Headers) -> Result<Response, TransportError> {
        self.request(reqwest::Method::DELETE, path, None, headers)
            .await
    }
}
