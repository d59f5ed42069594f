//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services talk to the Remote Auth API through the `AuthApi` seam.

mod auth;
mod users;

pub use auth::{AuthService, Credentials, LoginForm, Registration, SessionGrant, SignupForm};
pub use users::UserDirectory;
pub(crate) use auth::INVALID_FORM_DATA;
