use crate::error::AppError;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// Represents the claims encoded within a JWT (JSON Web Token).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject of the token: the username it was issued for.
    pub sub: String,
    /// Expiration timestamp (seconds since epoch) for the token.
    pub exp: usize,
}

/// Generates a JWT for a given username.
///
/// The signing secret and time-to-live come from configuration; this function
/// never reads the environment itself. There is no revocation: a token stays
/// valid until `ttl_minutes` elapse.
///
/// # Arguments
/// * `username` - The subject the token is issued for.
/// * `secret` - The process-wide signing secret.
/// * `ttl_minutes` - Minutes until the token expires.
///
/// # Returns
/// A `Result` containing the JWT string if successful.
/// Returns `AppError::InternalServerError` if token encoding fails.
pub fn generate_token(username: &str, secret: &str, ttl_minutes: i64) -> Result<String, AppError> {
    let expiration = chrono::Utc::now()
        .checked_add_signed(chrono::Duration::minutes(ttl_minutes))
        .ok_or_else(|| AppError::InternalServerError("Invalid token expiry".into()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: username.to_string(),
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::InternalServerError(format!("Failed to generate token: {}", e)))
}

/// Verifies a JWT string and decodes its claims.
///
/// Default validation checks are applied (signature, expiration). Decoding is
/// synchronous and performs no I/O.
///
/// # Arguments
/// * `token` - The JWT string to verify.
/// * `secret` - The process-wide signing secret.
///
/// # Returns
/// A `Result` containing the decoded `Claims` if the token is valid.
/// Returns `AppError::Unauthorized` if the token is malformed, its signature
/// is invalid, or it has expired.
pub fn verify_token(token: &str, secret: &str) -> Result<Claims, AppError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))
}
