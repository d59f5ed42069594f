//! Access guard
//!
//! Protects routes that require a session. Only the presence of a
//! non-empty token is checked here; whether the token is still valid
//! is decided by the Remote Auth API on the subsequent data fetch.

use std::fmt;

use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{HeaderMap, Request, request::Parts},
    middleware::Next,
    response::Response,
};

use super::session;
use crate::error::AppError;

/// Bearer token decoded from the session cookie
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    pub(crate) fn new(token: String) -> Self {
        Self(token)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}

/// Outcome of evaluating a request against the guard
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessState {
    Authenticated(SessionToken),
    Unauthenticated,
}

impl AccessState {
    /// Read the `Cookie` headers and decide the request's state
    pub fn from_headers(headers: &HeaderMap) -> Self {
        match session::parse_headers(headers) {
            Some(token) if !token.is_empty() => AccessState::Authenticated(SessionToken::new(token)),
            _ => AccessState::Unauthenticated,
        }
    }

    pub fn into_result(self) -> Result<SessionToken, AppError> {
        match self {
            AccessState::Authenticated(token) => Ok(token),
            AccessState::Unauthenticated => Err(AppError::Unauthenticated),
        }
    }
}

/// Middleware to require a session
///
/// Adds [`SessionToken`] to request extensions if present, otherwise
/// short-circuits with a redirect to the login page.
///
/// # Usage
/// ```ignore
/// let protected_routes = Router::new()
///     .route("/dashboard", ...)
///     .layer(middleware::from_fn(require_session));
/// ```
pub async fn require_session(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = match AccessState::from_headers(request.headers()) {
        AccessState::Authenticated(token) => token,
        AccessState::Unauthenticated => {
            tracing::debug!(path = %request.uri().path(), "No session, redirecting to login");
            return Err(AppError::Unauthenticated);
        }
    };

    request.extensions_mut().insert(token);

    Ok(next.run(request).await)
}

/// Extractor for the current session token
///
/// # Usage
/// ```ignore
/// async fn handler(CurrentSession(token): CurrentSession) -> impl IntoResponse {
///     upstream.list_users(token.as_str()).await
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentSession(pub SessionToken);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        if let Some(token) = parts.extensions.get::<SessionToken>().cloned() {
            return Ok(CurrentSession(token));
        }

        let token = AccessState::from_headers(&parts.headers).into_result()?;
        parts.extensions.insert(token.clone());

        Ok(CurrentSession(token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{HeaderValue, header};

    fn headers_with_cookie(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn missing_cookie_header_is_unauthenticated() {
        assert_eq!(
            AccessState::from_headers(&HeaderMap::new()),
            AccessState::Unauthenticated
        );
    }

    #[test]
    fn empty_token_is_unauthenticated() {
        assert_eq!(
            AccessState::from_headers(&headers_with_cookie("token=")),
            AccessState::Unauthenticated
        );
        assert_eq!(
            AccessState::from_headers(&headers_with_cookie("")),
            AccessState::Unauthenticated
        );
    }

    #[test]
    fn present_token_is_authenticated() {
        let state = AccessState::from_headers(&headers_with_cookie("lang=en; token=abc"));
        let token = state.into_result().unwrap();
        assert_eq!(token.as_str(), "abc");
    }

    #[test]
    fn unauthenticated_maps_to_redirect_error() {
        let error = AccessState::Unauthenticated.into_result().unwrap_err();
        assert!(matches!(error, AppError::Unauthenticated));
    }

    #[test]
    fn debug_output_redacts_token() {
        let token = SessionToken::new("secret-bearer".to_string());
        assert!(!format!("{token:?}").contains("secret-bearer"));
    }
}
