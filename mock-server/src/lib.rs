use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Connection {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionType {
    pub id: String,
    pub name: String,
    pub description: String,
    pub connection_id: String,
    pub input_schema: Map<String, Value>,
    pub output_schema: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub id: String,
    pub connection_id: String,
    pub action_type_id: String,
    pub status: String,
    pub result: Value,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Serialize)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
    pub next_cursor: Option<String>,
}

/// In-memory state behind the mock API.
#[derive(Debug, Default)]
pub struct Store {
    pub connections: BTreeMap<String, Connection>,
    /// Keyed by `(connection_id, action_type_id)`.
    pub action_types: BTreeMap<(String, String), ActionType>,
    pub executions: Vec<ExecutionResult>,
}

impl Store {
    /// Two connections: an active Slack workspace with one action type and an
    /// expired GitHub connection without any.
    pub fn seeded() -> Self {
        let t0 = Utc
            .with_ymd_and_hms(2024, 5, 1, 10, 0, 0)
            .single()
            .unwrap_or_default();
        let mut store = Store::default();

        for (id, name, provider, status) in [
            ("conn_slack", "Team Slack", "slack", "active"),
            ("conn_github", "GitHub", "github", "expired"),
        ] {
            store.connections.insert(
                id.to_string(),
                Connection {
                    id: id.to_string(),
                    name: name.to_string(),
                    provider: provider.to_string(),
                    status: status.to_string(),
                    created_at: t0,
                    updated_at: t0,
                    metadata: None,
                },
            );
        }

        let send_message = ActionType {
            id: "act_send_message".to_string(),
            name: "Send message".to_string(),
            description: "Post a message to a channel".to_string(),
            connection_id: "conn_slack".to_string(),
            input_schema: object(json!({
                "type": "object",
                "required": ["channel", "text"],
                "properties": {
                    "channel": {"type": "string"},
                    "text": {"type": "string"}
                }
            })),
            output_schema: object(json!({"type": "object"})),
            created_at: t0,
            updated_at: t0,
            metadata: Some(object(json!({"category": "messaging"}))),
        };
        store.action_types.insert(
            (send_message.connection_id.clone(), send_message.id.clone()),
            send_message,
        );
        store
    }
}

fn object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub api_key: Arc<str>,
    pub store: Arc<RwLock<Store>>,
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

pub fn app(api_key: &str) -> Router {
    app_with_store(api_key, Store::seeded())
}

pub fn app_with_store(api_key: &str, store: Store) -> Router {
    let state = AppState {
        api_key: Arc::from(api_key),
        store: Arc::new(RwLock::new(store)),
    };
    Router::new()
        .route("/api/connections", get(list_connections))
        .route("/api/connections/{connection_id}", get(get_connection))
        .route("/api/connections/{connection_id}/actions", get(list_action_types))
        .route(
            "/api/connections/{connection_id}/actions/{action_type_id}",
            get(get_action_type),
        )
        .route(
            "/api/connections/{connection_id}/actions/{action_type_id}/execute",
            post(execute_action),
        )
        .with_state(state)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

fn authorize(state: &AppState, headers: &HeaderMap) -> Result<(), (StatusCode, String)> {
    let expected = format!("Bearer {}", state.api_key);
    match headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        Some(value) if value == expected => Ok(()),
        _ => Err((StatusCode::UNAUTHORIZED, "invalid api key".to_string())),
    }
}

fn not_found() -> (StatusCode, String) {
    (StatusCode::NOT_FOUND, "not found".to_string())
}

async fn list_connections(State(state): State<AppState>, headers: HeaderMap) -> ApiResult<Vec<Connection>> {
    authorize(&state, &headers)?;
    let store = state.store.read().await;
    Ok(Json(store.connections.values().cloned().collect()))
}

async fn get_connection(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(connection_id): Path<String>,
) -> ApiResult<Connection> {
    authorize(&state, &headers)?;
    let store = state.store.read().await;
    store
        .connections
        .get(&connection_id)
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn list_action_types(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(connection_id): Path<String>,
) -> ApiResult<Paginated<ActionType>> {
    authorize(&state, &headers)?;
    let store = state.store.read().await;
    if !store.connections.contains_key(&connection_id) {
        return Err(not_found());
    }
    let items = store
        .action_types
        .values()
        .filter(|a| a.connection_id == connection_id)
        .cloned()
        .collect();
    Ok(Json(Paginated {
        items,
        has_next_page: false,
        next_cursor: None,
    }))
}

async fn get_action_type(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((connection_id, action_type_id)): Path<(String, String)>,
) -> ApiResult<ActionType> {
    authorize(&state, &headers)?;
    let store = state.store.read().await;
    store
        .action_types
        .get(&(connection_id, action_type_id))
        .cloned()
        .map(Json)
        .ok_or_else(not_found)
}

async fn execute_action(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path((connection_id, action_type_id)): Path<(String, String)>,
    Json(payload): Json<Value>,
) -> ApiResult<ExecutionResult> {
    authorize(&state, &headers)?;
    let mut store = state.store.write().await;
    let action = store
        .action_types
        .get(&(connection_id.clone(), action_type_id.clone()))
        .ok_or_else(not_found)?;
    validate_payload(&action.input_schema, &payload)?;

    let result = ExecutionResult {
        id: format!("exec_{}", Uuid::new_v4().simple()),
        connection_id,
        action_type_id,
        status: "success".to_string(),
        result: json!({ "echo": payload }),
        created_at: Utc::now(),
        metadata: None,
    };
    store.executions.push(result.clone());
    Ok(Json(result))
}

/// Only checks that the payload is an object carrying the schema's
/// `required` keys.
fn validate_payload(schema: &Map<String, Value>, payload: &Value) -> Result<(), (StatusCode, String)> {
    let Some(fields) = payload.as_object() else {
        return Err((
            StatusCode::UNPROCESSABLE_ENTITY,
            "payload must be a JSON object".to_string(),
        ));
    };
    let required = schema
        .get("required")
        .and_then(Value::as_array)
        .map(|r| r.iter().filter_map(Value::as_str).collect::<Vec<_>>())
        .unwrap_or_default();
    for key in required {
        if !fields.contains_key(key) {
            return Err((
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("missing required field: {key}"),
            ));
        }
    }
    Ok(())
}
