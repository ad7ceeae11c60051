//! Blocking client for the Actions API.

use actions_core::{
    ActionExecutionResult, ActionType, ActionsClient, ApiError, ClientConfig, Connection, HttpRequest,
    HttpResponse, Page, DEFAULT_BASE_URL,
};
use serde_json::Value;
use tracing::{debug, warn};

use crate::transport::{Transport, UreqTransport};

/// Blocking client: every call performs exactly one HTTP request on the
/// calling thread.
#[derive(Debug)]
pub struct BlockingActionsClient<T: Transport = UreqTransport> {
    core: ActionsClient,
    transport: T,
}

impl BlockingActionsClient<UreqTransport> {
    /// Client for the production endpoint.
    pub fn new(api_key: &str) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(api_key: &str, base_url: &str) -> Self {
        Self {
            core: ActionsClient::new(api_key, base_url),
            transport: UreqTransport::new(),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl<T: Transport> BlockingActionsClient<T> {
    pub fn with_transport(config: &ClientConfig, transport: T) -> Self {
        Self {
            core: ActionsClient::from_config(config),
            transport,
        }
    }

    pub fn core(&self) -> &ActionsClient {
        &self.core
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn execute_action(
        &self,
        connection_id: &str,
        action_type_id: &str,
        payload: &Value,
    ) -> Result<ActionExecutionResult, ApiError> {
        let request = self
            .core
            .build_execute_action(connection_id, action_type_id, payload)?;
        self.core.parse_execute_action(self.send(request)?)
    }

    pub fn list_connections(&self) -> Result<Page<Connection>, ApiError> {
        let request = self.core.build_list_connections();
        self.core.parse_list_connections(self.send(request)?)
    }

    pub fn get_connection(&self, connection_id: &str) -> Result<Connection, ApiError> {
        let request = self.core.build_get_connection(connection_id);
        self.core.parse_get_connection(self.send(request)?)
    }

    pub fn list_action_types(&self, connection_id: &str) -> Result<Page<ActionType>, ApiError> {
        let request = self.core.build_list_action_types(connection_id);
        self.core.parse_list_action_types(self.send(request)?)
    }

    pub fn get_action_type(&self, connection_id: &str, action_type_id: &str) -> Result<ActionType, ApiError> {
        let request = self.core.build_get_action_type(connection_id, action_type_id);
        self.core.parse_get_action_type(self.send(request)?)
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        debug!(method = %request.method, url = %request.url, "sending request");
        let response = self.transport.execute(request)?;
        if response.status >= 400 {
            warn!(status = response.status, "actions api returned an error status");
        }
        Ok(response)
    }
}
