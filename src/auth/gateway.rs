//! Login, signup and logout routes
//!
//! Thin HTTP layer over [`AuthService`]: decode the form, delegate,
//! and let `SessionGrant` / `AppError` pick the response.

use axum::{
    Form, Router,
    extract::{State, rejection::FormRejection},
    response::{Html, IntoResponse},
    routing::{get, post},
};

use crate::AppState;
use crate::error::AppError;
use crate::service::{AuthService, INVALID_FORM_DATA, LoginForm, SessionGrant, SignupForm};

/// Create authentication router
///
/// Routes:
/// - GET /login - Login page
/// - POST /login - Log in
/// - GET /signup - Signup page
/// - POST /signup - Register and log in
/// - POST /logout - Logout
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/signup", get(signup_page).post(signup))
        .route("/logout", post(logout))
}

fn form_rejected(rejection: FormRejection) -> AppError {
    tracing::debug!(%rejection, "Rejected form body");
    AppError::InvalidInput(INVALID_FORM_DATA.to_string())
}

// =============================================================================
// Login
// =============================================================================

/// GET /login
async fn login_page() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Sign in</title></head>
<body>
    <h1>Sign in to your account</h1>
    <form method="post" action="/login">
        <input name="identifier" type="email" placeholder="Email" required>
        <input name="password" type="password" placeholder="Password" required>
        <button type="submit">Login</button>
    </form>
    <a href="/signup">Don't have an account? Sign up</a>
</body>
</html>
"#,
    )
}

/// POST /login
///
/// 302 to the dashboard with the session cookie, or a JSON error.
async fn login(
    State(state): State<AppState>,
    form: Result<Form<LoginForm>, FormRejection>,
) -> Result<SessionGrant, AppError> {
    let Form(form) = form.map_err(form_rejected)?;
    AuthService::from_state(&state).login(form).await
}

// =============================================================================
// Signup
// =============================================================================

/// GET /signup
async fn signup_page() -> impl IntoResponse {
    Html(
        r#"<!DOCTYPE html>
<html>
<head><title>Sign up</title></head>
<body>
    <h1>Create your account</h1>
    <form method="post" action="/signup">
        <input name="username" type="text" placeholder="Username" required>
        <input name="email" type="email" placeholder="Email" required>
        <input name="password" type="password" placeholder="Password" required>
        <button type="submit">Sign Up</button>
    </form>
    <a href="/login">Already have an account? Login</a>
</body>
</html>
"#,
    )
}

/// POST /signup
async fn signup(
    State(state): State<AppState>,
    form: Result<Form<SignupForm>, FormRejection>,
) -> Result<SessionGrant, AppError> {
    let Form(form) = form.map_err(form_rejected)?;
    AuthService::from_state(&state).signup(form).await
}

// =============================================================================
// Logout
// =============================================================================

/// POST /logout
///
/// Clears session cookie and redirects to login.
async fn logout(State(state): State<AppState>) -> SessionGrant {
    AuthService::from_state(&state).logout()
}
