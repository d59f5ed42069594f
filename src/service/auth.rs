//! Auth gateway service
//!
//! Validates submitted credentials, forwards them unchanged to the
//! Remote Auth API and turns the issued token into a session cookie.
//! Nothing is kept server-side: the token is minted into a `Set-Cookie`
//! header and handed to the browser.

use std::sync::Arc;

use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use time::Duration;

use crate::AppState;
use crate::auth::session::{self, CookieOptions};
use crate::auth::{LANDING_PATH, LOGIN_PATH};
use crate::error::AppError;
use crate::metrics::AUTH_ATTEMPTS_TOTAL;
use crate::upstream::AuthApi;

pub(crate) const INVALID_FORM_DATA: &str = "Invalid form data";
const LOGIN_FAILED: &str = "Login failed";
const SIGNUP_FAILED: &str = "Signup failed";
const SIGNUP_NO_TOKEN: &str = "Signup failed: No token returned.";

/// Submitted login form
#[derive(Debug, Default, Deserialize)]
pub struct LoginForm {
    pub identifier: Option<String>,
    pub password: Option<SecretString>,
}

/// Submitted signup form
#[derive(Debug, Default, Deserialize)]
pub struct SignupForm {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<SecretString>,
}

/// Validated login credentials, alive for one gateway call
#[derive(Debug)]
pub struct Credentials {
    pub identifier: String,
    pub password: SecretString,
}

/// Validated signup fields
#[derive(Debug)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: SecretString,
}

fn required(value: Option<String>) -> Result<String, AppError> {
    value
        .filter(|value| !value.is_empty())
        .ok_or_else(|| AppError::InvalidInput(INVALID_FORM_DATA.to_string()))
}

fn required_secret(value: Option<SecretString>) -> Result<SecretString, AppError> {
    value
        .filter(|value| !value.expose_secret().is_empty())
        .ok_or_else(|| AppError::InvalidInput(INVALID_FORM_DATA.to_string()))
}

impl LoginForm {
    pub fn into_credentials(self) -> Result<Credentials, AppError> {
        Ok(Credentials {
            identifier: required(self.identifier)?,
            password: required_secret(self.password)?,
        })
    }
}

impl SignupForm {
    pub fn into_registration(self) -> Result<Registration, AppError> {
        Ok(Registration {
            username: required(self.username)?,
            email: required(self.email)?,
            password: required_secret(self.password)?,
        })
    }
}

/// Redirect carrying a freshly serialized session cookie
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionGrant {
    pub location: &'static str,
    pub set_cookie: String,
}

impl IntoResponse for SessionGrant {
    fn into_response(self) -> Response {
        (
            StatusCode::FOUND,
            [
                (header::LOCATION, self.location.to_string()),
                (header::SET_COOKIE, self.set_cookie),
            ],
        )
            .into_response()
    }
}

fn record_attempt(operation: &str, outcome: &str) {
    AUTH_ATTEMPTS_TOTAL
        .with_label_values(&[operation, outcome])
        .inc();
}

/// Auth gateway service
pub struct AuthService {
    api: Arc<dyn AuthApi>,
    secure_cookies: bool,
    signup_max_age: Duration,
}

impl AuthService {
    /// Create new auth service
    pub fn new(api: Arc<dyn AuthApi>, secure_cookies: bool, signup_max_age: Duration) -> Self {
        Self {
            api,
            secure_cookies,
            signup_max_age,
        }
    }

    pub fn from_state(state: &AppState) -> Self {
        Self::new(
            state.auth_api.clone(),
            state.config.should_use_secure_cookies(),
            Duration::seconds(state.config.session.signup_max_age),
        )
    }

    /// Log in with an identifier and password
    ///
    /// # Errors
    /// `InvalidInput` without contacting the upstream when a field is
    /// missing or empty; `AuthFailed` when the upstream rejects the
    /// credentials or cannot be reached.
    #[tracing::instrument(skip_all)]
    pub async fn login(&self, form: LoginForm) -> Result<SessionGrant, AppError> {
        let credentials = form
            .into_credentials()
            .inspect_err(|_| record_attempt("login", "invalid_input"))?;

        let payload = self
            .api
            .login(&credentials.identifier, &credentials.password)
            .await
            .map_err(|error| {
                record_attempt("login", "rejected");
                tracing::info!(kind = error.outcome(), "Login rejected by upstream");
                AppError::AuthFailed(error.first_message().unwrap_or(LOGIN_FAILED).to_string())
            })?;

        if payload.jwt.is_empty() {
            record_attempt("login", "no_token");
            return Err(AppError::AuthFailed(LOGIN_FAILED.to_string()));
        }

        record_attempt("login", "ok");
        let user_id = payload.user.as_ref().and_then(|user| user.id.as_deref());
        tracing::info!(user_id = ?user_id, "Login succeeded");

        Ok(SessionGrant {
            location: LANDING_PATH,
            set_cookie: session::serialize(
                &payload.jwt,
                &CookieOptions::session(self.secure_cookies),
            ),
        })
    }

    /// Register a new account and start a session for it
    ///
    /// A registration the upstream accepts without issuing a token is
    /// reported as `AuthFailed`.
    #[tracing::instrument(skip_all)]
    pub async fn signup(&self, form: SignupForm) -> Result<SessionGrant, AppError> {
        let registration = form
            .into_registration()
            .inspect_err(|_| record_attempt("signup", "invalid_input"))?;

        let payload = self
            .api
            .register(
                &registration.username,
                &registration.email,
                &registration.password,
            )
            .await
            .map_err(|error| {
                record_attempt("signup", "rejected");
                tracing::info!(kind = error.outcome(), "Signup rejected by upstream");
                AppError::AuthFailed(error.first_message().unwrap_or(SIGNUP_FAILED).to_string())
            })?;

        let Some(jwt) = payload.jwt.filter(|jwt| !jwt.is_empty()) else {
            record_attempt("signup", "no_token");
            tracing::warn!("Upstream accepted registration without issuing a token");
            return Err(AppError::AuthFailed(SIGNUP_NO_TOKEN.to_string()));
        };

        record_attempt("signup", "ok");
        let user_id = payload.user.as_ref().and_then(|user| user.id.as_deref());
        tracing::info!(user_id = ?user_id, "Signup succeeded");

        Ok(SessionGrant {
            location: LANDING_PATH,
            set_cookie: session::serialize(
                &jwt,
                &CookieOptions::expiring_in(self.signup_max_age, self.secure_cookies),
            ),
        })
    }

    /// Clear the session cookie
    ///
    /// Always succeeds, with or without an existing session.
    pub fn logout(&self) -> SessionGrant {
        record_attempt("logout", "ok");

        SessionGrant {
            location: LOGIN_PATH,
            set_cookie: session::serialize("", &CookieOptions::cleared(self.secure_cookies)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{
        AuthUser, LoginPayload, MockAuthApi, RegisterPayload, UpstreamError,
    };

    fn secret(value: &str) -> Option<SecretString> {
        Some(SecretString::from(value.to_string()))
    }

    fn user() -> AuthUser {
        AuthUser {
            id: Some("1".to_string()),
            username: Some("ada".to_string()),
            email: Some("a@b.com".to_string()),
            ..AuthUser::default()
        }
    }

    fn service(api: MockAuthApi) -> AuthService {
        AuthService::new(Arc::new(api), false, Duration::days(7))
    }

    fn graphql_error(message: &str) -> UpstreamError {
        UpstreamError::GraphQl {
            status: StatusCode::OK,
            messages: vec![message.to_string()],
        }
    }

    #[tokio::test]
    async fn login_rejects_empty_fields_without_upstream_call() {
        let mut api = MockAuthApi::new();
        api.expect_login().never();
        let service = service(api);

        let forms = [
            LoginForm {
                identifier: Some(String::new()),
                password: secret("x"),
            },
            LoginForm {
                identifier: Some("a@b.com".to_string()),
                password: secret(""),
            },
            LoginForm {
                identifier: None,
                password: secret("x"),
            },
            LoginForm::default(),
        ];

        for form in forms {
            let error = service.login(form).await.unwrap_err();
            assert!(matches!(error, AppError::InvalidInput(_)));
        }
    }

    #[tokio::test]
    async fn login_success_sets_cookie_that_decodes_to_token() {
        let mut api = MockAuthApi::new();
        api.expect_login()
            .withf(|identifier, password| {
                identifier == "a@b.com" && password.expose_secret() == "hunter2"
            })
            .times(1)
            .returning(|_, _| {
                Ok(LoginPayload {
                    jwt: "abc".to_string(),
                    user: Some(user()),
                })
            });

        let grant = service(api)
            .login(LoginForm {
                identifier: Some("a@b.com".to_string()),
                password: secret("hunter2"),
            })
            .await
            .unwrap();

        assert_eq!(grant.location, LANDING_PATH);
        assert_eq!(
            session::parse(Some(&grant.set_cookie)).as_deref(),
            Some("abc")
        );
        assert!(!grant.set_cookie.contains("Expires"));

        let response = grant.into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers()[header::LOCATION], LANDING_PATH);
    }

    #[tokio::test]
    async fn login_needs_only_the_token() {
        let mut api = MockAuthApi::new();
        api.expect_login().times(1).returning(|_, _| {
            Ok(LoginPayload {
                jwt: "abc".to_string(),
                user: None,
            })
        });

        let grant = service(api)
            .login(LoginForm {
                identifier: Some("ada".to_string()),
                password: secret("hunter2"),
            })
            .await
            .unwrap();

        assert_eq!(
            session::parse(Some(&grant.set_cookie)).as_deref(),
            Some("abc")
        );
    }

    #[tokio::test]
    async fn login_failure_forwards_upstream_message() {
        let mut api = MockAuthApi::new();
        api.expect_login()
            .returning(|_, _| Err(graphql_error("Invalid identifier or password")));

        let error = service(api)
            .login(LoginForm {
                identifier: Some("a@b.com".to_string()),
                password: secret("wrong"),
            })
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            AppError::AuthFailed(message) if message == "Invalid identifier or password"
        ));
    }

    #[tokio::test]
    async fn login_failure_without_message_is_generic() {
        let mut api = MockAuthApi::new();
        api.expect_login()
            .returning(|_, _| Err(UpstreamError::Malformed("eof".to_string())));

        let error = service(api)
            .login(LoginForm {
                identifier: Some("a@b.com".to_string()),
                password: secret("x"),
            })
            .await
            .unwrap_err();

        assert!(matches!(error, AppError::AuthFailed(message) if message == LOGIN_FAILED));
    }

    #[tokio::test]
    async fn signup_requires_every_field() {
        let mut api = MockAuthApi::new();
        api.expect_register().never();
        let service = service(api);

        let error = service
            .signup(SignupForm {
                username: Some("ada".to_string()),
                email: None,
                password: secret("hunter2"),
            })
            .await
            .unwrap_err();

        assert!(matches!(error, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn signup_without_token_is_auth_failure() {
        let mut api = MockAuthApi::new();
        api.expect_register()
            .times(1)
            .returning(|_, _, _| Ok(RegisterPayload::default()));

        let error = service(api)
            .signup(SignupForm {
                username: Some("ada".to_string()),
                email: Some("a@b.com".to_string()),
                password: secret("hunter2"),
            })
            .await
            .unwrap_err();

        assert!(matches!(error, AppError::AuthFailed(message) if message == SIGNUP_NO_TOKEN));
    }

    #[tokio::test]
    async fn signup_success_sets_expiring_cookie() {
        let mut api = MockAuthApi::new();
        api.expect_register()
            .withf(|username, email, _| username == "ada" && email == "a@b.com")
            .returning(|_, _, _| {
                Ok(RegisterPayload {
                    jwt: Some("fresh".to_string()),
                    user: Some(user()),
                })
            });

        let grant = service(api)
            .signup(SignupForm {
                username: Some("ada".to_string()),
                email: Some("a@b.com".to_string()),
                password: secret("hunter2"),
            })
            .await
            .unwrap();

        assert_eq!(grant.location, LANDING_PATH);
        assert!(grant.set_cookie.contains("Expires="));
        assert_eq!(
            session::parse(Some(&grant.set_cookie)).as_deref(),
            Some("fresh")
        );
    }

    #[tokio::test]
    async fn signup_failure_uses_generic_message_without_upstream_text() {
        let mut api = MockAuthApi::new();
        api.expect_register()
            .returning(|_, _, _| Err(UpstreamError::Status(StatusCode::BAD_GATEWAY)));

        let error = service(api)
            .signup(SignupForm {
                username: Some("ada".to_string()),
                email: Some("a@b.com".to_string()),
                password: secret("hunter2"),
            })
            .await
            .unwrap_err();

        assert!(matches!(error, AppError::AuthFailed(message) if message == SIGNUP_FAILED));
    }

    #[test]
    fn logout_clears_cookie_and_redirects_to_login() {
        let service = service(MockAuthApi::new());

        let first = service.logout();
        let second = service.logout();

        assert_eq!(first, second);
        assert_eq!(first.location, LOGIN_PATH);
        assert!(first.set_cookie.contains("Max-Age=0"));
        assert_eq!(session::parse(Some(&first.set_cookie)).as_deref(), Some(""));
    }
}
