//! HTTP middleware

mod auth;

pub use auth::{auth_middleware, check_permission, CurrentUser};
