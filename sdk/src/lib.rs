//! Blocking and async clients for the Actions API.
//!
//! # Overview
//! Pairs the I/O-free `actions_core::ActionsClient` with a transport:
//! - [`BlockingActionsClient`] runs each call on the calling thread (`ureq`).
//! - [`AsyncActionsClient`] suspends at each network call (`reqwest`) and adds
//!   an explicit [`AsyncActionsClient::close`].
//!
//! Both expose the same five operations and the same error contract: any
//! status >= 400 becomes an [`ApiError`] discriminated by status code, and
//! success bodies are decoded into typed records.
//!
//! ```no_run
//! use actions_sdk::BlockingActionsClient;
//!
//! let client = BlockingActionsClient::new("sk-live-...");
//! for connection in client.list_connections()? {
//!     println!("{} ({})", connection.name, connection.provider);
//! }
//! # Ok::<(), actions_sdk::ApiError>(())
//! ```

pub mod blocking;
pub mod client;
pub mod transport;

pub use actions_core::{
    ActionExecutionResult, ActionType, ApiError, ClientConfig, Connection, Page, DEFAULT_BASE_URL,
};
pub use blocking::BlockingActionsClient;
pub use client::AsyncActionsClient;
pub use transport::{AsyncTransport, ReqwestTransport, Transport, UreqTransport};
