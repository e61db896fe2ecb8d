//! Vowline API server library.
//!
//! Exposes the building blocks (config, state, error handling, session
//! middleware, routes) so integration tests, the seed binary and the server
//! entrypoint can all reach them.

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
