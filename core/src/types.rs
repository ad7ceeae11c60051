//! Records returned by the Actions API.
//!
//! # Design
//! Responses are decoded into these records at the client boundary instead of
//! being handed back as loose JSON. Every record rejects unknown fields, so a
//! schema change on the service side shows up as a `Deserialization` error
//! rather than silently dropped data. The mock server defines its own copies;
//! integration tests catch drift between the two.

use chrono::{DateTime, Utc};
use serde::de::{self, DeserializeOwned, Deserializer, Unexpected};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form key/value metadata attached to records.
pub type Metadata = Map<String, Value>;

/// A configured integration endpoint the caller has authorized.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Connection {
    pub id: String,
    pub name: String,
    pub provider: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// An invocable operation exposed by a connection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ActionType {
    pub id: String,
    pub name: String,
    pub description: String,
    pub connection_id: String,
    pub input_schema: Map<String, Value>,
    pub output_schema: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// Outcome of one action invocation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ActionExecutionResult {
    pub id: String,
    pub connection_id: String,
    pub action_type_id: String,
    pub status: String,
    pub result: Value,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
}

/// One page of a list endpoint.
///
/// The service answers list calls either with a bare JSON array or with an
/// `{ items, has_next_page, next_cursor }` object. A bare array decodes as a
/// single, final page. The client never follows `next_cursor` itself.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub has_next_page: bool,
    pub next_cursor: Option<String>,
}

impl<T> Page<T> {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T> IntoIterator for Page<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct PaginatedBody<T> {
    items: Vec<T>,
    #[serde(default)]
    has_next_page: bool,
    #[serde(default)]
    next_cursor: Option<String>,
}

// Dispatches on the JSON shape so a bad item reports its own field error
// instead of an untagged "did not match any variant".
impl<'de, T: DeserializeOwned> Deserialize<'de> for Page<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match Value::deserialize(deserializer)? {
            value @ Value::Array(_) => {
                let items = Vec::<T>::deserialize(value).map_err(<D::Error as de::Error>::custom)?;
                Ok(Page {
                    items,
                    has_next_page: false,
                    next_cursor: None,
                })
            }
            value @ Value::Object(_) => {
                let body = PaginatedBody::<T>::deserialize(value).map_err(<D::Error as de::Error>::custom)?;
                Ok(Page {
                    items: body.items,
                    has_next_page: body.has_next_page,
                    next_cursor: body.next_cursor,
                })
            }
            other => Err(<D::Error as de::Error>::invalid_type(
                unexpected(&other),
                &"an array or an object with `items`",
            )),
        }
    }
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}
