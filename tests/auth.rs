use actix_cors::Cors;
use actix_web::middleware::Logger;
use actix_web::{test, web, App};
use dotenv::dotenv;
use jsonwebtoken::{encode, EncodingKey, Header};
use pretty_assertions::assert_eq;
use serde_json::json;
use sqlx::PgPool;
use taskdeck::auth::{generate_token, Claims, TokenResponse};
use taskdeck::config::Config;
use taskdeck::routes;
use taskdeck::routes::health;
use taskdeck::store;

async fn setup() -> (PgPool, Config) {
    dotenv().ok();
    if std::env::var("JWT_SECRET").is_err() {
        std::env::set_var("JWT_SECRET", "taskdeck-test-secret");
    }
    let config = Config::from_env();
    let pool = PgPool::connect(&config.database_url)
        .await
        .expect("Failed to connect to test DB");
    store::init_schema(&pool)
        .await
        .expect("Failed to initialize schema");
    (pool, config)
}

async fn cleanup_user(pool: &PgPool, username: &str) {
    // Tasks cascade with the owning user row.
    let _ = sqlx::query("DELETE FROM users WHERE username = $1")
        .bind(username)
        .execute(pool)
        .await;
}

#[actix_rt::test]
async fn test_register_and_token_flow() {
    let (pool, config) = setup().await;
    cleanup_user(&pool, "integration_user").await;

    // Inline App setup
    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .wrap(
                Cors::default()
                    .allow_any_origin()
                    .allow_any_method()
                    .allow_any_header()
                    .max_age(3600),
            )
            .wrap(Logger::default())
            .service(health::health)
            .configure(routes::config),
    )
    .await;

    // Register a new user
    let register_payload = json!({
        "username": "integration_user",
        "password": "Password123!"
    });
    let req = test::TestRequest::post()
        .uri("/register")
        .set_json(&register_payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    let status = resp.status();
    let body_bytes = test::read_body(resp).await;
    assert_eq!(
        status,
        actix_web::http::StatusCode::OK,
        "Registration failed. Body: {:?}",
        String::from_utf8_lossy(&body_bytes)
    );

    let registered: serde_json::Value =
        serde_json::from_slice(&body_bytes).expect("Failed to parse register response JSON");
    assert_eq!(registered["username"], "integration_user");
    assert_eq!(registered["tasks"], json!([]));
    assert!(registered["id"].is_i64());
    assert!(
        registered.get("password").is_none() && registered.get("password_hash").is_none(),
        "Password material must never be serialized"
    );

    // Try to register the same user again (should fail)
    let req_conflict = test::TestRequest::post()
        .uri("/register")
        .set_json(&register_payload)
        .to_request();
    let resp_conflict = test::call_service(&app, req_conflict).await;
    assert_eq!(
        resp_conflict.status(),
        actix_web::http::StatusCode::BAD_REQUEST,
        "Duplicate registration did not fail as expected"
    );

    // Obtain a token with form-encoded credentials
    let req_token = test::TestRequest::post()
        .uri("/token")
        .set_form(&[
            ("username", "integration_user"),
            ("password", "Password123!"),
        ])
        .to_request();
    let resp_token = test::call_service(&app, req_token).await;
    let status_token = resp_token.status();
    let body_bytes_token = test::read_body(resp_token).await;
    assert_eq!(
        status_token,
        actix_web::http::StatusCode::OK,
        "Token request failed. Body: {:?}",
        String::from_utf8_lossy(&body_bytes_token)
    );

    let token_response: TokenResponse =
        serde_json::from_slice(&body_bytes_token).expect("Failed to parse token response JSON");
    assert_eq!(token_response.token_type, "bearer");
    assert!(!token_response.access_token.is_empty());

    // Use the token on a protected route
    let req_list = test::TestRequest::get()
        .uri("/tasks/")
        .append_header((
            "Authorization",
            format!("Bearer {}", token_response.access_token),
        ))
        .to_request();
    let resp_list = test::call_service(&app, req_list).await;
    assert_eq!(resp_list.status(), actix_web::http::StatusCode::OK);

    cleanup_user(&pool, "integration_user").await;
}

#[actix_rt::test]
async fn test_token_rejects_bad_credentials() {
    let (pool, config) = setup().await;
    cleanup_user(&pool, "badcreds_user").await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await;

    let req_register = test::TestRequest::post()
        .uri("/register")
        .set_json(&json!({ "username": "badcreds_user", "password": "right-password" }))
        .to_request();
    let resp_register = test::call_service(&app, req_register).await;
    assert!(resp_register.status().is_success());

    // Wrong password
    let req_wrong = test::TestRequest::post()
        .uri("/token")
        .set_form(&[("username", "badcreds_user"), ("password", "wrong")])
        .to_request();
    let resp_wrong = test::call_service(&app, req_wrong).await;
    assert_eq!(
        resp_wrong.status(),
        actix_web::http::StatusCode::UNAUTHORIZED
    );
    assert_eq!(
        resp_wrong
            .headers()
            .get("WWW-Authenticate")
            .and_then(|v| v.to_str().ok()),
        Some("Bearer"),
        "401 must carry the bearer challenge"
    );

    // Unknown username
    let req_unknown = test::TestRequest::post()
        .uri("/token")
        .set_form(&[("username", "no_such_user"), ("password", "whatever")])
        .to_request();
    let resp_unknown = test::call_service(&app, req_unknown).await;
    assert_eq!(
        resp_unknown.status(),
        actix_web::http::StatusCode::UNAUTHORIZED
    );

    cleanup_user(&pool, "badcreds_user").await;
}

#[actix_rt::test]
async fn test_invalid_registration_inputs() {
    let (pool, config) = setup().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await;

    let test_cases = vec![
        (
            json!({ "password": "Password123!" }),
            "missing username",
        ),
        (
            json!({ "username": "testuser" }),
            "missing password",
        ),
        (
            json!({ "username": "", "password": "Password123!" }),
            "empty username",
        ),
        (
            json!({ "username": "user name!", "password": "Password123!" }),
            "username with invalid chars",
        ),
        (
            json!({ "username": "a".repeat(65), "password": "Password123!" }),
            "username too long",
        ),
        (
            json!({ "username": "testuser", "password": "" }),
            "empty password",
        ),
    ];

    for (payload, description) in test_cases {
        let req = test::TestRequest::post()
            .uri("/register")
            .set_json(&payload)
            .to_request();

        let resp = test::call_service(&app, req).await;
        let status = resp.status();
        let body_bytes = test::read_body(resp).await;

        assert_eq!(
            status,
            actix_web::http::StatusCode::BAD_REQUEST,
            "Test case failed: {}. Got {}. Body: {:?}",
            description,
            status,
            String::from_utf8_lossy(&body_bytes)
        );
    }
}

#[actix_rt::test]
async fn test_protected_routes_reject_bad_tokens() {
    let (pool, config) = setup().await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await;

    // No Authorization header at all
    let req_missing = test::TestRequest::get().uri("/tasks/").to_request();
    let resp_missing = test::call_service(&app, req_missing).await;
    assert_eq!(
        resp_missing.status(),
        actix_web::http::StatusCode::UNAUTHORIZED
    );

    // Garbage token
    let req_garbage = test::TestRequest::get()
        .uri("/tasks/")
        .append_header(("Authorization", "Bearer not-a-jwt"))
        .to_request();
    let resp_garbage = test::call_service(&app, req_garbage).await;
    assert_eq!(
        resp_garbage.status(),
        actix_web::http::StatusCode::UNAUTHORIZED
    );

    // Token signed with a different secret
    let foreign_token = generate_token("somebody", "some-other-secret", 30)
        .expect("Failed to sign foreign token");
    let req_foreign = test::TestRequest::get()
        .uri("/tasks/")
        .append_header(("Authorization", format!("Bearer {}", foreign_token)))
        .to_request();
    let resp_foreign = test::call_service(&app, req_foreign).await;
    assert_eq!(
        resp_foreign.status(),
        actix_web::http::StatusCode::UNAUTHORIZED
    );

    // Expired token signed with the real secret
    let expired_claims = Claims {
        sub: "somebody".to_string(),
        exp: (chrono::Utc::now() - chrono::Duration::hours(1)).timestamp() as usize,
    };
    let expired_token = encode(
        &Header::default(),
        &expired_claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .expect("Failed to sign expired token");
    let req_expired = test::TestRequest::get()
        .uri("/tasks/")
        .append_header(("Authorization", format!("Bearer {}", expired_token)))
        .to_request();
    let resp_expired = test::call_service(&app, req_expired).await;
    assert_eq!(
        resp_expired.status(),
        actix_web::http::StatusCode::UNAUTHORIZED
    );
}

#[actix_rt::test]
async fn test_token_with_stale_subject() {
    let (pool, config) = setup().await;
    cleanup_user(&pool, "ghost_user").await;

    let app = test::init_service(
        App::new()
            .app_data(web::Data::new(pool.clone()))
            .app_data(web::Data::new(config.clone()))
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await;

    // A well-signed token whose subject does not match any user row.
    let stale_token = generate_token("ghost_user", &config.jwt_secret, 30)
        .expect("Failed to sign stale token");
    let req = test::TestRequest::get()
        .uri("/tasks/")
        .append_header(("Authorization", format!("Bearer {}", stale_token)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), actix_web::http::StatusCode::UNAUTHORIZED);
}
