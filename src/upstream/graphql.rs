//! GraphQL-over-HTTP client for the Remote Auth API

use std::time::Instant;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use url::Url;

use super::queries::{LOGIN_MUTATION, REGISTER_MUTATION, USERS_QUERY};
use super::{AuthApi, LoginPayload, RegisterPayload, UpstreamError, UserRecord};
use crate::metrics::{UPSTREAM_REQUEST_DURATION_SECONDS, UPSTREAM_REQUESTS_TOTAL};

/// Standard GraphQL response envelope
#[derive(Debug, Deserialize)]
struct GraphQlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Vec<GraphQlErrorEntry>,
}

#[derive(Debug, Deserialize)]
struct GraphQlErrorEntry {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    login: LoginPayload,
}

#[derive(Debug, Deserialize)]
struct RegisterData {
    register: Option<RegisterPayload>,
}

#[derive(Debug, Deserialize)]
struct UsersData {
    #[serde(rename = "userDbs")]
    user_dbs: Vec<UserRecord>,
}

/// Remote Auth API client
///
/// Holds only the endpoint and a connection pool. The bearer token is
/// supplied per call, so one instance can serve every request.
#[derive(Debug, Clone)]
pub struct GraphQlClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl GraphQlClient {
    /// Create a client for `endpoint`
    ///
    /// No request timeout is configured; reqwest's transport defaults apply.
    pub fn new(endpoint: Url, user_agent: &str) -> Result<Self, UpstreamError> {
        let http = reqwest::Client::builder().user_agent(user_agent).build()?;
        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    #[tracing::instrument(skip(self, query, variables, bearer), fields(endpoint = %self.endpoint))]
    async fn execute<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        query: &str,
        variables: Value,
        bearer: Option<&str>,
    ) -> Result<T, UpstreamError> {
        let started = Instant::now();
        let result = self.send(query, variables, bearer).await;

        UPSTREAM_REQUEST_DURATION_SECONDS
            .with_label_values(&[operation])
            .observe(started.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(_) => "ok",
            Err(error) => error.outcome(),
        };
        UPSTREAM_REQUESTS_TOTAL
            .with_label_values(&[operation, outcome])
            .inc();

        if let Err(error) = &result {
            tracing::warn!(%error, "Remote Auth API call failed");
        }

        result
    }

    async fn send<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
        bearer: Option<&str>,
    ) -> Result<T, UpstreamError> {
        let mut request = self.http.post(self.endpoint.clone()).json(&json!({
            "query": query,
            "variables": variables,
        }));
        if let Some(token) = bearer {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        let envelope: GraphQlResponse = match serde_json::from_slice(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => return Err(UpstreamError::Status(status)),
            Err(e) => return Err(UpstreamError::Malformed(e.to_string())),
        };

        // GraphQL errors win over the HTTP status
        if !envelope.errors.is_empty() {
            return Err(UpstreamError::GraphQl {
                status,
                messages: envelope.errors.into_iter().map(|e| e.message).collect(),
            });
        }

        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }

        let data = envelope
            .data
            .filter(|data| !data.is_null())
            .ok_or_else(|| UpstreamError::Malformed("response carried no data".to_string()))?;

        serde_json::from_value(data).map_err(|e| UpstreamError::Malformed(e.to_string()))
    }
}

#[async_trait]
impl AuthApi for GraphQlClient {
    async fn login(
        &self,
        identifier: &str,
        password: &SecretString,
    ) -> Result<LoginPayload, UpstreamError> {
        let variables = json!({
            "input": {
                "identifier": identifier,
                "password": password.expose_secret(),
            }
        });

        let data: LoginData = self
            .execute("login", LOGIN_MUTATION, variables, None)
            .await?;
        Ok(data.login)
    }

    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &SecretString,
    ) -> Result<RegisterPayload, UpstreamError> {
        let variables = json!({
            "input": {
                "username": username,
                "email": email,
                "password": password.expose_secret(),
            }
        });

        let data: RegisterData = self
            .execute("register", REGISTER_MUTATION, variables, None)
            .await?;
        Ok(data.register.unwrap_or_default())
    }

    async fn list_users(&self, token: &str) -> Result<Vec<UserRecord>, UpstreamError> {
        let data: UsersData = self
            .execute("list_users", USERS_QUERY, json!({}), Some(token))
            .await?;
        Ok(data.user_dbs)
    }
}
