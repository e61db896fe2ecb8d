//! Magic-link tokens and RSVP cutoff evaluation.
//!
//! Each family gets one opaque token that grants passwordless access to its
//! RSVP page. Tokens are random, stored verbatim (unique index) and checked
//! for shape before any database lookup.

use rand::Rng;

use crate::types::Timestamp;

/// Number of random bytes in a generated token (hex-encoded to twice this).
pub const TOKEN_BYTES: usize = 32;

/// Longest token accepted from a URL. Older imports used shorter tokens.
pub const MAX_TOKEN_LENGTH: usize = 128;

/// Generate a fresh magic-link token: 64 lowercase hex characters.
pub fn generate_magic_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill(&mut bytes[..]);
    hex::encode(bytes)
}

/// Cheap shape check performed before hitting the database.
///
/// Accepts 1..=[`MAX_TOKEN_LENGTH`] characters of `[A-Za-z0-9_-]`.
pub fn is_well_formed(token: &str) -> bool {
    !token.is_empty()
        && token.len() <= MAX_TOKEN_LENGTH
        && token
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Whether the wedding's RSVP cutoff has passed at `now`.
///
/// Weddings without a cutoff never close.
pub fn rsvp_cutoff_passed(cutoff: Option<Timestamp>, now: Timestamp) -> bool {
    match cutoff {
        Some(cutoff) => now > cutoff,
        None => false,
    }
}

/// Build the public RSVP link for a token.
pub fn rsvp_link(base_url: &str, token: &str) -> String {
    format!("{}/rsvp/{token}", base_url.trim_end_matches('/'))
}
