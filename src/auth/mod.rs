pub mod middleware;
pub mod password;
pub mod token;

use actix_web::{HttpMessage, HttpRequest};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::error::AppError;
use crate::models::User;
use crate::store;

// Re-export necessary items
pub use middleware::AuthMiddleware;
pub use password::{hash_password, verify_password};
pub use token::{generate_token, verify_token, Claims};

lazy_static! {
    // Regex for username validation: alphanumeric, underscores, hyphens
    static ref USERNAME_REGEX: regex::Regex = regex::Regex::new(r"^[a-zA-Z0-9_-]+$").unwrap();
}

/// Represents the payload for a new user registration request.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Desired username for the new account.
    /// Must be 1 to 64 characters, alphanumeric, underscores, or hyphens.
    #[validate(
        length(min = 1, max = 64),
        regex(
            path = "USERNAME_REGEX",
            message = "Username must be alphanumeric, underscores, or hyphens"
        )
    )]
    pub username: String,
    /// Password for the new account. Must be non-empty.
    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Represents the form-encoded payload for the token endpoint.
#[derive(Debug, Deserialize)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

/// Response structure for a successful token request.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// The signed bearer token.
    pub access_token: String,
    /// Always `"bearer"`.
    pub token_type: String,
}

/// Resolves the authenticated user for a request that passed `AuthMiddleware`.
///
/// Reads the token subject from request extensions and loads the matching
/// user row. A subject that no longer resolves to a user (the token outlived
/// the account) fails with 401.
pub async fn current_user(pool: &PgPool, req: &HttpRequest) -> Result<User, AppError> {
    let username = req
        .extensions()
        .get::<Claims>()
        .map(|claims| claims.sub.clone())
        .ok_or_else(|| {
            AppError::Unauthorized(
                "Token claims not found in request. Ensure AuthMiddleware is active.".into(),
            )
        })?;

    store::get_user_by_username(pool, &username)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid user".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[test]
    fn test_register_request_validation() {
        let valid_register = RegisterRequest {
            username: "test_user-123".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid_register.validate().is_ok());

        // Short credentials are allowed by the current contract.
        let minimal_register = RegisterRequest {
            username: "u1".to_string(),
            password: "p1".to_string(),
        };
        assert!(minimal_register.validate().is_ok());

        let invalid_username_register = RegisterRequest {
            username: "test user!".to_string(), // Contains space and exclamation
            password: "password123".to_string(),
        };
        assert!(invalid_username_register.validate().is_err());

        let empty_username_register = RegisterRequest {
            username: "".to_string(),
            password: "password123".to_string(),
        };
        assert!(empty_username_register.validate().is_err());

        let empty_password_register = RegisterRequest {
            username: "testuser".to_string(),
            password: "".to_string(),
        };
        assert!(empty_password_register.validate().is_err());
    }

    #[test]
    fn test_token_response_shape() {
        let response = TokenResponse {
            access_token: "abc.def.ghi".to_string(),
            token_type: "bearer".to_string(),
        };
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["access_token"], "abc.def.ghi");
        assert_eq!(json["token_type"], "bearer");
    }
}
