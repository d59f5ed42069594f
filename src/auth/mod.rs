//! Cookie session authentication
//!
//! Handles:
//! - Login, signup and logout against the Remote Auth API
//! - Session cookie encoding
//! - Access guard for protected routes

mod gateway;
mod middleware;
pub mod session;

pub use gateway::auth_router;
pub use middleware::{AccessState, CurrentSession, SessionToken, require_session};

/// Login entry point, target of every unauthenticated redirect
pub const LOGIN_PATH: &str = "/login";

/// Protected landing page reached after login or signup
pub const LANDING_PATH: &str = "/dashboard";
