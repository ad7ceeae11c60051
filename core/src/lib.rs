//! I/O-free client core for the Actions API.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). The `actions-sdk` crate pairs
//! this core with blocking and async transports.
//!
//! # Design
//! - `ActionsClient` holds only the normalized base URL and the fixed
//!   authorization/content-type headers.
//! - Each operation is split into `build_*` (produces request) and `parse_*`
//!   (consumes response), so the I/O boundary is explicit.
//! - Any status >= 400 becomes an `ApiError` discriminated by status code.
//! - Success bodies decode into strongly typed records; unknown fields are
//!   rejected.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod types;

pub use client::ActionsClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use types::{ActionExecutionResult, ActionType, Connection, Metadata, Page};
