//! Stateless HTTP request builder and response parser for the Actions API.
//!
//! # Design
//! `ActionsClient` holds the normalized base URL and the fixed header set, and
//! carries no mutable state between calls. Each operation is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method that
//! consumes an `HttpResponse`. The caller executes the round-trip, so the same
//! core backs both the blocking and the async client.

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{ActionExecutionResult, ActionType, Connection, Page};

/// Stateless, I/O-free client for the Actions API.
#[derive(Clone)]
pub struct ActionsClient {
    base_url: String,
    headers: Vec<(String, String)>,
}

impl std::fmt::Debug for ActionsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionsClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl ActionsClient {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            headers: vec![
                ("authorization".to_string(), format!("Bearer {api_key}")),
                ("content-type".to_string(), "application/json".to_string()),
            ],
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.api_key, &config.base_url)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Headers attached to every request.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    pub fn build_execute_action(
        &self,
        connection_id: &str,
        action_type_id: &str,
        payload: &Value,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload).map_err(|e| ApiError::Serialization(e.to_string()))?;
        Ok(self.request(
            HttpMethod::Post,
            format!(
                "/api/connections/{}/actions/{}/execute",
                segment(connection_id),
                segment(action_type_id)
            ),
            Some(body),
        ))
    }

    pub fn build_list_connections(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/api/connections".to_string(), None)
    }

    pub fn build_get_connection(&self, connection_id: &str) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            format!("/api/connections/{}", segment(connection_id)),
            None,
        )
    }

    pub fn build_list_action_types(&self, connection_id: &str) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            format!("/api/connections/{}/actions", segment(connection_id)),
            None,
        )
    }

    pub fn build_get_action_type(&self, connection_id: &str, action_type_id: &str) -> HttpRequest {
        self.request(
            HttpMethod::Get,
            format!(
                "/api/connections/{}/actions/{}",
                segment(connection_id),
                segment(action_type_id)
            ),
            None,
        )
    }

    pub fn parse_execute_action(&self, response: HttpResponse) -> Result<ActionExecutionResult, ApiError> {
        decode(response)
    }

    pub fn parse_list_connections(&self, response: HttpResponse) -> Result<Page<Connection>, ApiError> {
        decode(response)
    }

    pub fn parse_get_connection(&self, response: HttpResponse) -> Result<Connection, ApiError> {
        decode(response)
    }

    pub fn parse_list_action_types(&self, response: HttpResponse) -> Result<Page<ActionType>, ApiError> {
        decode(response)
    }

    pub fn parse_get_action_type(&self, response: HttpResponse) -> Result<ActionType, ApiError> {
        decode(response)
    }

    fn request(&self, method: HttpMethod, path: String, body: Option<String>) -> HttpRequest {
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers: self.headers.clone(),
            body,
        }
    }
}

fn segment(id: &str) -> std::borrow::Cow<'_, str> {
    urlencoding::encode(id)
}

/// Map error statuses to `ApiError`, then decode the body.
fn decode<T: DeserializeOwned>(response: HttpResponse) -> Result<T, ApiError> {
    check_status(&response)?;
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.status >= 400 {
        return Err(ApiError::from_status(response.status, response.body.clone()));
    }
    Ok(())
}
