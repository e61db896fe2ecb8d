//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`jwt`] -- session-token issue, signing and validation.
//! - [`principal`] -- loading the principal rows behind an email.

pub mod jwt;
pub mod password;
pub mod principal;
