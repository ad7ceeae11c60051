//! Async client for the Actions API.
//!
//! # Design
//! Methods take `&self`, so independent calls can be driven concurrently
//! (`futures::future::join_all`, `tokio::join!`) against the same transport
//! and headers. Results of a fan-out must be correlated by position; arrival
//! order is unspecified.
//!
//! `close` forwards to the transport exactly once. Dropping the client without
//! closing still drops the transport, but an explicit `close` lets callers
//! release the pool at a known point.

use std::sync::atomic::{AtomicBool, Ordering};

use actions_core::{
    ActionExecutionResult, ActionType, ActionsClient, ApiError, ClientConfig, Connection, HttpRequest,
    HttpResponse, Page, DEFAULT_BASE_URL,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::transport::{AsyncTransport, ReqwestTransport};

#[derive(Debug)]
pub struct AsyncActionsClient<T: AsyncTransport = ReqwestTransport> {
    core: ActionsClient,
    transport: T,
    closed: AtomicBool,
}

impl AsyncActionsClient<ReqwestTransport> {
    /// Client for the production endpoint.
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            core: ActionsClient::new(api_key, base_url),
            transport: ReqwestTransport::new(),
            closed: AtomicBool::new(false),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(config, ReqwestTransport::new())
    }
}

impl<T: AsyncTransport> AsyncActionsClient<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            core: ActionsClient::from_config(config),
            transport,
            closed: AtomicBool::new(false),
        }
    }

    pub fn core(&self) -> &ActionsClient {
        &self.core
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub async fn execute_action(
        &self,
        connection_id: &str,
        action_type_id: &str,
        payload: &Value,
    ) -> Result<ActionExecutionResult, ApiError> {
        let request = self
            .core
            .build_execute_action(connection_id, action_type_id, payload)?;
        self.core.parse_execute_action(self.send(request).await?)
    }

    pub async fn list_connections(&self) -> Result<Page<Connection>, ApiError> {
        let request = self.core.build_list_connections();
        self.core.parse_list_connections(self.send(request).await?)
    }

    pub async fn get_connection(&self, connection_id: &str) -> Result<Connection, ApiError> {
        let request = self.core.build_get_connection(connection_id);
        self.core.parse_get_connection(self.send(request).await?)
    }

    pub async fn list_action_types(&self, connection_id: &str) -> Result<Page<ActionType>, ApiError> {
        let request = self.core.build_list_action_types(connection_id);
        self.core.parse_list_action_types(self.send(request).await?)
    }

    pub async fn get_action_type(
        &self,
        connection_id: &str,
        action_type_id: &str,
    ) -> Result<ActionType, ApiError> {
        let request = self.core.build_get_action_type(connection_id, action_type_id);
        self.core.parse_get_action_type(self.send(request).await?)
    }

    /// Release the transport's connections. Only the first call reaches the
    /// transport; requests issued afterwards fail with `ApiError::Transport`.
    pub async fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.transport.close().await;
        debug!("actions client closed");
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        if self.is_closed() {
            return Err(ApiError::Transport("client is closed".to_string()));
        }
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request).await?;
        if response.status >= 400 {
            warn!(status = response.status, "actions api returned an error status");
        }
        Ok(response)
    }
}
