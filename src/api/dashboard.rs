//! Dashboard
//!
//! The only protected view: lists users fetched from the Remote Auth
//! API with the visitor's session token.

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, header},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use serde::Serialize;

use crate::AppState;
use crate::auth::{CurrentSession, require_session};
use crate::error::AppError;
use crate::service::UserDirectory;
use crate::upstream::UserRecord;

/// Create dashboard router
///
/// Every route here sits behind the access guard.
pub fn dashboard_router() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard))
        .route_layer(middleware::from_fn(require_session))
}

#[derive(Debug, Serialize)]
struct UsersView {
    users: Vec<UserRecord>,
}

/// GET /dashboard
///
/// HTML table by default, `{"users": [...]}` for JSON clients.
async fn dashboard(
    State(state): State<AppState>,
    CurrentSession(token): CurrentSession,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let users = UserDirectory::new(state.auth_api.clone())
        .fetch_users(&token)
        .await?;

    if prefers_json(&headers) {
        return Ok(Json(UsersView { users }).into_response());
    }

    Ok(Html(render_dashboard(&users)).into_response())
}

fn prefers_json(headers: &HeaderMap) -> bool {
    headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|accept| accept.contains("application/json") && !accept.contains("text/html"))
}

fn created_on(timestamp: &str) -> String {
    chrono::DateTime::parse_from_rfc3339(timestamp)
        .map(|parsed| parsed.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|_| timestamp.to_string())
}

fn cell(value: Option<&str>) -> String {
    match value {
        Some(value) if !value.is_empty() => html_escape::encode_text(value).into_owned(),
        _ => String::new(),
    }
}

fn render_row(user: &UserRecord) -> String {
    let user = user.view();
    let dob = match user.date_of_birth {
        Some(dob) if !dob.is_empty() => html_escape::encode_text(dob).into_owned(),
        _ => "N/A".to_string(),
    };
    let created = user.created_at.map(created_on);

    format!(
        "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
        cell(user.document_id),
        cell(user.name),
        cell(user.email),
        cell(user.phone),
        if user.active == Some(true) { "Yes" } else { "No" },
        dob,
        cell(created.as_deref()),
    )
}

fn render_dashboard(users: &[UserRecord]) -> String {
    let rows: String = users.iter().map(render_row).collect();

    format!(
        r#"<!DOCTYPE html>
<html>
<head><title>User Dashboard</title></head>
<body>
    <form method="post" action="/logout"><button type="submit">Logout</button></form>
    <h1>User Dashboard</h1>
    <h2>All Users</h2>
    <table>
        <thead>
            <tr><th>ID</th><th>Name</th><th>Email</th><th>Phone</th><th>Active</th><th>DOB</th><th>Created At</th></tr>
        </thead>
        <tbody>{rows}</tbody>
    </table>
</body>
</html>
"#
    )
}
