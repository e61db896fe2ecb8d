//! Authentication and authorization middleware.
//!
//! - [`session::session_middleware`] -- validates bearer tokens and revalidates roles.
//! - [`auth::AuthUser`] -- the principal behind the current session.
//! - [`rbac`] -- `RequireAuth`, `RequireMasterAdmin`, `RequirePlanner`, `RequireWeddingAdmin`.

pub mod auth;
pub mod rbac;
pub mod session;
