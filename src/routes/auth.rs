use crate::{
    auth::{generate_token, hash_password, verify_password, RegisterRequest, TokenRequest,
        TokenResponse},
    config::Config,
    error::AppError,
    models::UserResponse,
    store,
};
use actix_web::{post, web, HttpResponse, Responder};
use sqlx::PgPool;
use validator::Validate;

/// Register a new user
///
/// Creates a new user account and returns its API representation with an
/// empty task list. Duplicate usernames are rejected with 400.
#[post("/register")]
pub async fn register(
    pool: web::Data<PgPool>,
    register_data: web::Json<RegisterRequest>,
) -> Result<impl Responder, AppError> {
    // Validate input
    register_data.validate()?;

    // Check if username already exists
    let existing_user = store::get_user_by_username(&pool, &register_data.username).await?;
    if existing_user.is_some() {
        return Err(AppError::BadRequest("Username already registered".into()));
    }

    // Hash password and insert new user
    let password_hash = hash_password(&register_data.password)?;
    let user = store::create_user(&pool, &register_data.username, &password_hash).await?;

    Ok(HttpResponse::Ok().json(UserResponse::new(user, vec![])))
}

/// Issue a bearer token
///
/// Authenticates a user from form-encoded credentials and returns a signed,
/// time-limited access token. Bad credentials yield 401 with a
/// `WWW-Authenticate: Bearer` challenge.
#[post("/token")]
pub async fn token(
    pool: web::Data<PgPool>,
    config: web::Data<Config>,
    form_data: web::Form<TokenRequest>,
) -> Result<impl Responder, AppError> {
    let user = store::get_user_by_username(&pool, &form_data.username).await?;

    match user {
        Some(user) if verify_password(&form_data.password, &user.password_hash) => {
            let access_token =
                generate_token(&user.username, &config.jwt_secret, config.token_ttl_minutes)?;
            Ok(HttpResponse::Ok().json(TokenResponse {
                access_token,
                token_type: "bearer".to_string(),
            }))
        }
        _ => Err(AppError::Unauthorized(
            "Incorrect username or password".into(),
        )),
    }
}
