//! Remote Auth API
//!
//! The external GraphQL service that owns user identity and issues
//! bearer tokens. Handlers only ever talk to it through [`AuthApi`],
//! so tests can swap in a stub.

mod graphql;
mod queries;

pub use graphql::GraphQlClient;

use async_trait::async_trait;
use axum::http::StatusCode;
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Failure talking to the Remote Auth API
#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Network failure before a response arrived
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Non-2xx response without GraphQL errors
    #[error("upstream returned HTTP {0}")]
    Status(StatusCode),

    /// Response carried a GraphQL `errors` array
    #[error("upstream returned {} GraphQL error(s) with HTTP {status}", .messages.len())]
    GraphQl {
        status: StatusCode,
        messages: Vec<String>,
    },

    /// Body could not be decoded into the expected shape
    #[error("malformed upstream response: {0}")]
    Malformed(String),
}

impl UpstreamError {
    /// First GraphQL error message, if the upstream sent one
    pub fn first_message(&self) -> Option<&str> {
        match self {
            UpstreamError::GraphQl { messages, .. } => messages
                .iter()
                .map(String::as_str)
                .find(|message| !message.is_empty()),
            _ => None,
        }
    }

    pub(crate) fn outcome(&self) -> &'static str {
        match self {
            UpstreamError::Transport(_) => "transport",
            UpstreamError::Status(_) => "status",
            UpstreamError::GraphQl { .. } => "graphql",
            UpstreamError::Malformed(_) => "malformed",
        }
    }
}

/// User as returned by the login and register mutations
///
/// Only the token matters to the gateway, so every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AuthUser {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmed: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
}

/// Role attached to a freshly registered user
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Role {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub role_type: Option<String>,
}

/// `login` mutation result
#[derive(Debug, Clone, Deserialize)]
pub struct LoginPayload {
    pub jwt: String,
    #[serde(default)]
    pub user: Option<AuthUser>,
}

/// `register` mutation result
///
/// The upstream may answer successfully without a token; callers
/// must treat that as a failed registration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterPayload {
    pub jwt: Option<String>,
    pub user: Option<AuthUser>,
}

/// Row of the `userDbs` collection
///
/// Kept as the raw JSON object so the list can be handed back
/// unmodified: unknown fields, nulls and field order all survive.
/// Use [`UserRecord::view`] for typed access.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct UserRecord(Map<String, Value>);

impl UserRecord {
    /// Lenient typed view; fields that are missing or of the wrong type read as `None`
    pub fn view(&self) -> UserView<'_> {
        UserView {
            document_id: self.str_field("documentId"),
            name: self.str_field("Name"),
            date_of_birth: self.str_field("DOB"),
            email: self.str_field("email"),
            phone: self.str_field("phone"),
            active: self.0.get("is_active").and_then(Value::as_bool),
            created_at: self.str_field("createdAt"),
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }
}

/// Borrowed view of the fields the dashboard displays
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UserView<'a> {
    pub document_id: Option<&'a str>,
    pub name: Option<&'a str>,
    pub date_of_birth: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub active: Option<bool>,
    pub created_at: Option<&'a str>,
}

/// Operations consumed from the Remote Auth API
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Exchange an identifier and password for a bearer token
    async fn login(
        &self,
        identifier: &str,
        password: &SecretString,
    ) -> Result<LoginPayload, UpstreamError>;

    /// Create an account
    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<RegisterPayload, UpstreamError>;

    /// Fetch the user list, authorized by `token`
    async fn list_users(&self, token: &str) -> Result<Vec<UserRecord>, UpstreamError>;
}
