//! Transports that execute `HttpRequest` values built by the core.
//!
//! # Design
//! Both transports return 4xx/5xx responses as data so status interpretation
//! stays in `actions_core`. Only failures that never produced a response
//! (DNS, refused connection, timeout) become `ApiError::Transport`. Connection
//! reuse belongs to the underlying HTTP library.

use std::sync::RwLock;

use actions_core::{ApiError, HttpMethod, HttpRequest, HttpResponse};
use async_trait::async_trait;
use tracing::trace;

/// Executes requests on the calling thread.
pub trait Transport: Send + Sync {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;
}

/// Executes requests without blocking the async runtime.
#[async_trait]
pub trait AsyncTransport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError>;

    /// Release pooled connections. Called at most once by the client.
    async fn close(&self);
}

/// Blocking transport backed by a `ureq` agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, headers: &[(String, String)]) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        trace!(method = %request.method, url = %request.url, "ureq request");
        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(request.url.as_str()), &request.headers).call(),
            HttpMethod::Post => {
                let builder = with_headers(self.agent.post(request.url.as_str()), &request.headers);
                match &request.body {
                    Some(body) => builder.send(body.as_bytes()),
                    None => builder.send_empty(),
                }
            }
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, headers, body })
    }
}

/// Async transport backed by a shared `reqwest::Client`.
///
/// `close` drops the client and with it the connection pool; later requests
/// fail with `ApiError::Transport`.
#[derive(Debug)]
pub struct ReqwestTransport {
    client: RwLock<Option<reqwest::Client>>,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::with_client(reqwest::Client::new())
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self {
            client: RwLock::new(Some(client)),
        }
    }

    fn client(&self) -> Result<reqwest::Client, ApiError> {
        let guard = self
            .client
            .read()
            .map_err(|_| ApiError::Transport("transport lock poisoned".to_string()))?;
        guard
            .clone()
            .ok_or_else(|| ApiError::Transport("transport is closed".to_string()))
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AsyncTransport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let client = self.client()?;
        trace!(method = %request.method, url = %request.url, "reqwest request");

        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };
        let mut builder = client.request(method, request.url.as_str());
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse { status, headers, body })
    }

    async fn close(&self) {
        if let Ok(mut guard) = self.client.write() {
            guard.take();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(url: &str) -> HttpRequest {
        HttpRequest {
            method: HttpMethod::Get,
            url: url.to_string(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[test]
    fn ureq_connection_refused_is_transport_error() {
        // Port 9 (discard) is not listening on loopback in test environments.
        let err = UreqTransport::new()
            .execute(request("http://127.0.0.1:9/api/connections"))
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }

    #[tokio::test]
    async fn reqwest_requests_after_close_fail() {
        let transport = ReqwestTransport::new();
        transport.close().await;
        let err = transport
            .execute(request("http://127.0.0.1:9/api/connections"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport(ref msg) if msg.contains("closed")));
    }
}
