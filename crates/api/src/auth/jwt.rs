//! Session-token encoding and validation.
//!
//! Session tokens are HS256-signed JWTs carrying [`SessionClaims`]: the
//! principal's email, sign-in provider, resolved role and the time role
//! resolution last ran. The revalidation middleware re-signs the same claims
//! with a fresh `checked_at` instead of forcing a new sign-in.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use vowline_core::roles::ResolvedRole;
use vowline_core::session::{SessionClaims, REVALIDATE_INTERVAL_SECS};

/// Configuration for session-token signing and revalidation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Session lifetime in hours (default: 720, thirty days).
    pub session_expiry_hours: i64,
    /// Seconds between role revalidations of a live session (default: 60).
    pub revalidate_secs: i64,
}

/// Default session lifetime in hours.
const DEFAULT_SESSION_EXPIRY_HOURS: i64 = 720;

impl JwtConfig {
    /// Load JWT configuration from environment variables.
    ///
    /// | Env Var                    | Required | Default |
    /// |----------------------------|----------|---------|
    /// | `JWT_SECRET`               | **yes**  | --      |
    /// | `JWT_SESSION_EXPIRY_HOURS` | no       | `720`   |
    /// | `SESSION_REVALIDATE_SECS`  | no       | `60`    |
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is not set or is empty.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let session_expiry_hours: i64 = std::env::var("JWT_SESSION_EXPIRY_HOURS")
            .unwrap_or_else(|_| DEFAULT_SESSION_EXPIRY_HOURS.to_string())
            .parse()
            .expect("JWT_SESSION_EXPIRY_HOURS must be a valid i64");

        let revalidate_secs: i64 = std::env::var("SESSION_REVALIDATE_SECS")
            .unwrap_or_else(|_| REVALIDATE_INTERVAL_SECS.to_string())
            .parse()
            .expect("SESSION_REVALIDATE_SECS must be a valid i64");

        Self {
            secret,
            session_expiry_hours,
            revalidate_secs,
        }
    }

    pub fn session_lifetime_secs(&self) -> i64 {
        self.session_expiry_hours * 3600
    }
}

/// Issue a new session for a just-authenticated principal.
///
/// Returns the signed token together with the claims it carries.
pub fn issue_session(
    email: &str,
    provider: &str,
    resolved: ResolvedRole,
    config: &JwtConfig,
) -> Result<(String, SessionClaims), jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = SessionClaims::issue(
        email,
        provider,
        resolved,
        now,
        config.session_lifetime_secs(),
    );
    let token = encode_session(&claims, config)?;
    Ok((token, claims))
}

/// Sign `claims` as an HS256 token.
pub fn encode_session(
    claims: &SessionClaims,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a session token, returning its claims.
///
/// Validates the signature and expiration.
pub fn validate_session(
    token: &str,
    config: &JwtConfig,
) -> Result<SessionClaims, jsonwebtoken::errors::Error> {
    let token_data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(),
    )?;
    Ok(token_data.claims)
}
