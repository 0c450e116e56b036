//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- Extracts the caller from a JWT Bearer token.
//! - [`rbac::RequireAuth`] -- Requires any authenticated caller.
//! - [`rbac::RequireAlertReader`] -- Requires access to the stock alert feed.

pub mod auth;
pub mod rbac;
