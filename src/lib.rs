//! Authgate - a cookie-session login gateway in front of a GraphQL auth API
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                      HTTP Layer (Axum)                       │
//! │  - Login / signup / logout                                  │
//! │  - Dashboard (behind the access guard)                      │
//! │  - Health and metrics                                       │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Service Layer                            │
//! │  - Credential validation and session minting                │
//! │  - User directory fetch                                     │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     Upstream Layer                           │
//! │  - GraphQL client for the Remote Auth API                   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `api`: Dashboard and metrics handlers
//! - `auth`: Session cookie codec, access guard and auth routes
//! - `service`: Business logic layer
//! - `upstream`: Remote Auth API client
//! - `config`: Configuration management
//! - `error`: Error types

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod metrics;
pub mod service;
pub mod upstream;

use std::sync::Arc;

use axum::{
    Router,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::get,
};

use upstream::{AuthApi, GraphQlClient};

/// Maximum accepted request body (form posts are tiny)
const MAX_BODY_BYTES: usize = 16 * 1024;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<config::AppConfig>,

    /// Remote Auth API client, shared by every request
    pub auth_api: Arc<dyn AuthApi>,
}

impl AppState {
    /// Initialize application state
    ///
    /// Builds the GraphQL client once from `config.upstream`.
    ///
    /// # Errors
    /// Returns error if the upstream URL is invalid or the HTTP client
    /// cannot be built
    pub fn new(config: config::AppConfig) -> Result<Self, error::AppError> {
        tracing::info!("Initializing application state...");

        let endpoint = config.graphql_url()?;
        let client = GraphQlClient::new(endpoint, &config.upstream.user_agent)
            .map_err(|e| error::AppError::Internal(e.into()))?;
        tracing::info!(endpoint = %client.endpoint(), "Upstream client initialized");

        Ok(Self::with_auth_api(config, Arc::new(client)))
    }

    /// Build state around an existing [`AuthApi`] implementation
    pub fn with_auth_api(config: config::AppConfig, auth_api: Arc<dyn AuthApi>) -> Self {
        Self {
            config: Arc::new(config),
            auth_api,
        }
    }
}

/// Build the Axum router with all routes.
///
/// This is shared by the binary and integration tests to keep route
/// composition consistent across environments.
pub fn build_router(state: AppState) -> Router {
    use tower::ServiceBuilder;
    use tower_http::{limit::RequestBodyLimitLayer, trace::TraceLayer};

    let metrics_enabled = state.config.metrics.enabled;

    let router = Router::new()
        .route("/", get(root_redirect))
        .route("/health", get(health_check))
        .merge(auth::auth_router())
        .merge(api::dashboard_router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES)),
        )
        .with_state(state);

    if metrics_enabled {
        router.merge(api::metrics_router())
    } else {
        router
    }
}

/// GET / - send visitors to the dashboard; the guard takes it from there
async fn root_redirect() -> impl IntoResponse {
    (
        StatusCode::FOUND,
        [(header::LOCATION, auth::LANDING_PATH)],
    )
}

async fn health_check() -> &'static str {
    "OK"
}
