//! Client behaviour against a stub transport that records every request.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use actions_core::{HttpMethod, HttpRequest, HttpResponse};
use actions_sdk::{
    ActionExecutionResult, ActionType, ApiError, AsyncActionsClient, AsyncTransport, BlockingActionsClient,
    ClientConfig, Connection, Page, Transport,
};
use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};

const CONNECTION: &str = r#"{"id":"conn_1","name":"Slack","provider":"slack","status":"active","created_at":"2024-05-01T10:00:00Z","updated_at":"2024-05-02T10:00:00Z","metadata":{"team":"core"}}"#;
const ACTION_TYPE: &str = r#"{"id":"act_1","name":"Send message","description":"Post to a channel","connection_id":"conn_1","input_schema":{"type":"object"},"output_schema":{"type":"object"},"created_at":"2024-05-01T10:00:00Z","updated_at":"2024-05-01T10:00:00Z"}"#;
const EXECUTION: &str = r#"{"id":"exec_1","connection_id":"conn_1","action_type_id":"act_1","status":"success","result":{"ok":true},"created_at":"2024-05-01T10:00:00Z"}"#;

/// Answers every request with a fixed status and body.
struct StubTransport {
    status: u16,
    body: String,
    requests: Mutex<Vec<HttpRequest>>,
    closes: AtomicUsize,
}

impl StubTransport {
    fn new(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.to_string(),
            requests: Mutex::new(Vec::new()),
            closes: AtomicUsize::new(0),
        }
    }

    fn record(&self, request: HttpRequest) -> HttpResponse {
        self.requests.lock().unwrap().push(request);
        HttpResponse::new(self.status, self.body.clone())
    }

    fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

impl Transport for StubTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        Ok(self.record(request))
    }
}

#[async_trait]
impl AsyncTransport for StubTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        Ok(self.record(request))
    }

    async fn close(&self) {
        self.closes.fetch_add(1, Ordering::SeqCst);
    }
}

fn config(base_url: &str) -> ClientConfig {
    ClientConfig::new("sk-stub").with_base_url(base_url)
}

fn blocking(status: u16, body: &str) -> BlockingActionsClient<StubTransport> {
    BlockingActionsClient::with_transport(&config("http://stub"), StubTransport::new(status, body))
}

fn async_client(status: u16, body: &str) -> AsyncActionsClient<StubTransport> {
    AsyncActionsClient::with_transport(&config("http://stub"), StubTransport::new(status, body))
}

fn decode<T: serde::de::DeserializeOwned>(body: &str) -> T {
    serde_json::from_str(body).unwrap()
}

fn assert_not_found(err: ApiError) {
    assert!(matches!(err, ApiError::NotFound { .. }), "unexpected error: {err:?}");
    let msg = err.to_string();
    assert!(msg.contains("404"), "{msg}");
    assert!(msg.contains("not found"), "{msg}");
}

// ---------------------------------------------------------------------------
// Blocking
// ---------------------------------------------------------------------------

#[test]
fn blocking_success_returns_decoded_body() {
    let list = format!("[{CONNECTION}]");
    let c = blocking(200, &list);
    assert_eq!(c.list_connections().unwrap(), decode::<Page<Connection>>(&list));

    let c = blocking(200, CONNECTION);
    assert_eq!(c.get_connection("conn_1").unwrap(), decode::<Connection>(CONNECTION));

    let list = format!(r#"{{"items":[{ACTION_TYPE}],"has_next_page":true,"next_cursor":"n2"}}"#);
    let c = blocking(200, &list);
    let page = c.list_action_types("conn_1").unwrap();
    assert_eq!(page, decode::<Page<ActionType>>(&list));
    assert_eq!(page.next_cursor.as_deref(), Some("n2"));

    let c = blocking(200, ACTION_TYPE);
    assert_eq!(c.get_action_type("conn_1", "act_1").unwrap(), decode::<ActionType>(ACTION_TYPE));

    let c = blocking(200, EXECUTION);
    assert_eq!(
        c.execute_action("conn_1", "act_1", &json!({"text": "hi"})).unwrap(),
        decode::<ActionExecutionResult>(EXECUTION)
    );
}

#[test]
fn blocking_not_found_for_every_operation() {
    let c = blocking(404, "not found");
    assert_not_found(c.list_connections().unwrap_err());
    assert_not_found(c.get_connection("conn_1").unwrap_err());
    assert_not_found(c.list_action_types("conn_1").unwrap_err());
    assert_not_found(c.get_action_type("conn_1", "act_1").unwrap_err());
    assert_not_found(c.execute_action("conn_1", "act_1", &json!({})).unwrap_err());
    assert_eq!(c.transport().requests().len(), 5, "exactly one request per call");
}

#[test]
fn blocking_execute_posts_payload() {
    let c = blocking(200, EXECUTION);
    let payload = json!({"channel": "#ops", "text": "deployed"});
    c.execute_action("conn_1", "act_1", &payload).unwrap();

    let requests = c.transport().requests();
    assert_eq!(requests[0].method, HttpMethod::Post);
    assert_eq!(requests[0].url, "http://stub/api/connections/conn_1/actions/act_1/execute");
    let sent: Value = serde_json::from_str(requests[0].body.as_deref().unwrap()).unwrap();
    assert_eq!(sent, payload);
}

#[test]
fn trailing_slash_produces_same_urls() {
    let urls = |base: &str| {
        let c = BlockingActionsClient::with_transport(&config(base), StubTransport::new(404, ""));
        let _ = c.list_connections();
        let _ = c.get_connection("conn_1");
        let _ = c.list_action_types("conn_1");
        let _ = c.get_action_type("conn_1", "act_1");
        let _ = c.execute_action("conn_1", "act_1", &json!({}));
        c.transport()
            .requests()
            .into_iter()
            .map(|r| r.url)
            .collect::<Vec<_>>()
    };
    let with_slash = urls("http://x/y/");
    assert_eq!(with_slash, urls("http://x/y"));
    assert_eq!(with_slash[0], "http://x/y/api/connections");
}

#[test]
fn every_request_carries_auth_and_content_type() {
    let c = blocking(200, CONNECTION);
    for _ in 0..3 {
        c.get_connection("conn_1").unwrap();
    }
    let _ = c.list_connections();
    let _ = c.execute_action("conn_1", "act_1", &json!({}));

    let requests = c.transport().requests();
    assert_eq!(requests.len(), 5);
    for req in &requests {
        assert_eq!(req.header("authorization"), Some("Bearer sk-stub"));
        assert_eq!(req.header("content-type"), Some("application/json"));
        assert_eq!(req.headers, requests[0].headers);
    }
}

#[test]
fn error_classes_follow_status() {
    let err = blocking(401, "bad key").list_connections().unwrap_err();
    assert!(matches!(err, ApiError::Authentication { status: 401, .. }));

    let err = blocking(422, "bad payload")
        .execute_action("c", "a", &json!({}))
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation { status: 422, .. }));

    let err = blocking(503, "maintenance").get_connection("c").unwrap_err();
    assert!(err.is_transient());
    assert_eq!(err.body(), Some("maintenance"));
}

#[test]
fn unknown_field_is_a_decode_error() {
    let body = CONNECTION.replace(r#""status":"active""#, r#""status":"active","color":"red""#);
    let err = blocking(200, &body).get_connection("conn_1").unwrap_err();
    assert!(matches!(err, ApiError::Deserialization(_)));
}

// ---------------------------------------------------------------------------
// Async
// ---------------------------------------------------------------------------

#[tokio::test]
async fn async_success_returns_decoded_body() {
    let c = async_client(200, CONNECTION);
    assert_eq!(c.get_connection("conn_1").await.unwrap(), decode::<Connection>(CONNECTION));

    let list = format!("[{CONNECTION}]");
    let c = async_client(200, &list);
    assert_eq!(c.list_connections().await.unwrap(), decode::<Page<Connection>>(&list));

    let list = format!("[{ACTION_TYPE}]");
    let c = async_client(200, &list);
    assert_eq!(c.list_action_types("conn_1").await.unwrap(), decode::<Page<ActionType>>(&list));

    let c = async_client(200, ACTION_TYPE);
    assert_eq!(
        c.get_action_type("conn_1", "act_1").await.unwrap(),
        decode::<ActionType>(ACTION_TYPE)
    );

    let c = async_client(200, EXECUTION);
    assert_eq!(
        c.execute_action("conn_1", "act_1", &json!({})).await.unwrap(),
        decode::<ActionExecutionResult>(EXECUTION)
    );
}

#[tokio::test]
async fn async_not_found_for_every_operation() {
    let c = async_client(404, "not found");
    assert_not_found(c.list_connections().await.unwrap_err());
    assert_not_found(c.get_connection("conn_1").await.unwrap_err());
    assert_not_found(c.list_action_types("conn_1").await.unwrap_err());
    assert_not_found(c.get_action_type("conn_1", "act_1").await.unwrap_err());
    assert_not_found(c.execute_action("conn_1", "act_1", &json!({})).await.unwrap_err());
}

#[tokio::test]
async fn close_releases_transport_once() {
    let c = async_client(200, CONNECTION);
    c.get_connection("conn_1").await.unwrap();
    c.get_connection("conn_2").await.unwrap();

    c.close().await;
    c.close().await;

    assert!(c.is_closed());
    assert_eq!(c.transport().close_count(), 1);
}

#[tokio::test]
async fn requests_after_close_fail_without_reaching_transport() {
    let c = async_client(200, CONNECTION);
    c.close().await;

    let err = c.get_connection("conn_1").await.unwrap_err();
    assert!(matches!(err, ApiError::Transport(_)));
    assert!(c.transport().requests().is_empty());
}

#[tokio::test]
async fn concurrent_executions_share_transport_and_keep_order() {
    let c = async_client(200, EXECUTION);
    let payloads: Vec<Value> = (0..5).map(|i| json!({ "n": i })).collect();

    let results = join_all(payloads.iter().map(|p| c.execute_action("conn_1", "act_1", p))).await;

    assert_eq!(results.len(), 5);
    assert!(results.iter().all(Result::is_ok));

    let mut sent: Vec<i64> = c
        .transport()
        .requests()
        .iter()
        .map(|r| serde_json::from_str::<Value>(r.body.as_deref().unwrap()).unwrap()["n"].as_i64().unwrap())
        .collect();
    sent.sort();
    assert_eq!(sent, vec![0, 1, 2, 3, 4]);

    for req in c.transport().requests() {
        assert_eq!(req.header("authorization"), Some("Bearer sk-stub"));
    }

    c.close().await;
    assert_eq!(c.transport().close_count(), 1);
}
