//! JWT access-token generation and validation.
//!
//! Tokens are HS256-signed JWTs carrying a [`Claims`] payload. They are
//! issued by the identity service; this service only validates them, and
//! [`generate_access_token`] exists for operators and tests.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims embedded in every access token.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject -- the caller's identifier in the identity service.
    pub sub: String,
    /// Role name (e.g. `"admin"`, `"staff"`).
    pub role: String,
    /// Fine-grained grants such as `"alerts:read"`.
    #[serde(default)]
    pub permissions: Vec<String>,
    /// Expiration time (UTC Unix timestamp).
    pub exp: i64,
    /// Issued-at time (UTC Unix timestamp).
    pub iat: i64,
    /// Unique token identifier (UUID v4) for audit.
    pub jti: String,
}

/// Configuration for JWT token generation and validation.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC-SHA256 secret used to sign and verify tokens.
    pub secret: String,
    /// Access token lifetime in minutes (default: 15).
    pub access_token_expiry_mins: i64,
}

/// Default access token expiry in minutes.
pub const DEFAULT_ACCESS_EXPIRY_MINS: i64 = 15;

impl JwtConfig {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            access_token_expiry_mins: DEFAULT_ACCESS_EXPIRY_MINS,
        }
    }
}

/// Generate an HS256 access token.
pub fn generate_access_token(
    subject: &str,
    role: &str,
    permissions: &[&str],
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let exp = now + config.access_token_expiry_mins * 60;

    let claims = Claims {
        sub: subject.to_string(),
        role: role.to_string(),
        permissions: permissions.iter().map(|p| p.to_string()).collect(),
        exp,
        iat: now,
        jti: Uuid::new_v4().to_string(),
    };

    encode(
        &Header::default(), // HS256
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate and decode an access token, returning the embedded [`Claims`].
///
/// Validates the signature and expiration.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::default(), // HS256, validates exp
    )?;
    Ok(token_data.claims)
}
