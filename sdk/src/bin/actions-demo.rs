//! Lists connections and action types, then fans out a few executions of the
//! first action type concurrently.
//!
//! Reads `ACTIONS_API_KEY` and `ACTIONS_BASE_URL` from the environment.

use actions_sdk::{AsyncActionsClient, ClientConfig};
use futures::future::join_all;
use serde_json::json;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = ClientConfig::from_env()?;
    let client = AsyncActionsClient::from_config(&config);

    let outcome = run(&client).await;
    client.close().await;
    outcome
}

async fn run(client: &AsyncActionsClient) -> anyhow::Result<()> {
    let connections = client.list_connections().await?;
    println!("{} connection(s)", connections.len());
    for connection in &connections.items {
        println!("  {} {} [{}] {}", connection.id, connection.name, connection.provider, connection.status);
    }
    if connections.has_next_page {
        println!("  (more available, cursor {:?})", connections.next_cursor);
    }

    let Some(connection) = connections.items.first() else {
        return Ok(());
    };

    let action_types = client.list_action_types(&connection.id).await?;
    for action in &action_types.items {
        println!("  action {}: {}", action.id, action.description);
    }
    let Some(action) = action_types.items.first() else {
        println!("connection {} exposes no action types", connection.id);
        return Ok(());
    };

    let payloads: Vec<_> = (1..=3)
        .map(|i| json!({ "channel": "#general", "text": format!("message {i}") }))
        .collect();
    let results = join_all(
        payloads
            .iter()
            .map(|payload| client.execute_action(&connection.id, &action.id, payload)),
    )
    .await;

    for (i, result) in results.into_iter().enumerate() {
        match result {
            Ok(execution) => println!("execution #{i}: {} {}", execution.id, execution.status),
            Err(e) => println!("execution #{i} failed: {e}"),
        }
    }
    Ok(())
}
