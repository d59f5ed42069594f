//! Session token codec
//!
//! The session is the upstream's bearer token carried verbatim in a
//! `token` cookie. No server-side session storage, no signing: the
//! cookie value is a bearer secret and the Remote Auth API alone
//! decides whether it is still valid.

use axum::http::{HeaderMap, header};
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::{Duration, OffsetDateTime};

/// Cookie name holding the bearer token
pub const SESSION_COOKIE_NAME: &str = "token";

/// Per-cookie attributes on top of the fixed `Path=/; HttpOnly; SameSite=Lax`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieOptions {
    /// `Max-Age` attribute
    pub max_age: Option<Duration>,
    /// `Expires` attribute
    pub expires: Option<OffsetDateTime>,
    /// Add the `Secure` attribute
    pub secure: bool,
}

impl CookieOptions {
    /// Browser-session cookie with no expiry
    pub fn session(secure: bool) -> Self {
        Self {
            secure,
            ..Self::default()
        }
    }

    /// Cookie expiring `ttl` from now
    pub fn expiring_in(ttl: Duration, secure: bool) -> Self {
        Self {
            expires: Some(OffsetDateTime::now_utc() + ttl),
            secure,
            ..Self::default()
        }
    }

    /// Immediate-expiry cookie used to clear the session
    pub fn cleared(secure: bool) -> Self {
        Self {
            max_age: Some(Duration::ZERO),
            secure,
            ..Self::default()
        }
    }
}

/// Build the session cookie for `token`
pub fn session_cookie(token: &str, options: &CookieOptions) -> Cookie<'static> {
    let mut builder = Cookie::build((SESSION_COOKIE_NAME, token.to_owned()))
        .path("/")
        .http_only(true)
        .secure(options.secure)
        .same_site(SameSite::Lax);

    if let Some(max_age) = options.max_age {
        builder = builder.max_age(max_age);
    }
    if let Some(expires) = options.expires {
        builder = builder.expires(expires);
    }

    builder.build()
}

/// Serialize `token` into a `Set-Cookie` header value
///
/// `serialize("", &CookieOptions::cleared(..))` produces the logout cookie.
pub fn serialize(token: &str, options: &CookieOptions) -> String {
    session_cookie(token, options).encoded().to_string()
}

/// Extract the session token from a `Cookie` header value
///
/// Returns `None` when the header is absent or carries no `token`
/// cookie. Malformed segments are skipped, never reported.
pub fn parse(cookie_header: Option<&str>) -> Option<String> {
    let header = cookie_header?;

    Cookie::split_parse_encoded(header)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == SESSION_COOKIE_NAME)
        .map(|cookie| cookie.value().to_owned())
}

/// Extract the session token from every `Cookie` header of a request
pub fn parse_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|value| parse(Some(value)))
}
