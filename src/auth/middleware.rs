use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    error::ResponseError,
    web, Error, HttpMessage,
};
use futures::future::{ready, LocalBoxFuture, Ready};

use crate::auth::token::verify_token;
use crate::config::Config;
use crate::error::AppError;

/// Bearer-token guard for user-scoped routes.
///
/// Wrapped around the `/tasks` scope: it verifies the `Authorization: Bearer`
/// header against the configured signing secret and, on success, inserts the
/// decoded `Claims` into request extensions for handlers to resolve the user.
/// Open endpoints (`/register`, `/token`, `/health`) live outside the wrapped
/// scope and are never touched by this middleware.
pub struct AuthMiddleware;

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = AuthMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService { service }))
    }
}

pub struct AuthMiddlewareService<S> {
    service: S,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        // Rejections are materialized as responses here (via the shared
        // `ResponseError` impl) rather than propagated as service errors, so
        // the guard behaves the same under `test::call_service` as it does
        // behind a real server.
        fn reject<B: 'static>(
            req: ServiceRequest,
            app_err: AppError,
        ) -> LocalBoxFuture<'static, Result<ServiceResponse<EitherBody<B>>, Error>> {
            let res = req
                .into_response(app_err.error_response())
                .map_into_right_body();
            Box::pin(async move { Ok(res) })
        }

        // The signing secret is injected via app data, not read from the
        // environment here.
        let secret = match req.app_data::<web::Data<Config>>() {
            Some(config) => config.jwt_secret.clone(),
            None => {
                let app_err =
                    AppError::InternalServerError("Application config not available".into());
                return reject(req, app_err);
            }
        };

        let auth_header = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "));

        match auth_header {
            Some(token) => match verify_token(token, &secret) {
                Ok(claims) => {
                    req.extensions_mut().insert(claims);
                    let fut = self.service.call(req);
                    Box::pin(async move { fut.await.map(|res| res.map_into_left_body()) })
                }
                Err(app_err) => reject(req, app_err),
            },
            None => {
                let app_err = AppError::Unauthorized("Missing token".into());
                reject(req, app_err)
            }
        }
    }
}
