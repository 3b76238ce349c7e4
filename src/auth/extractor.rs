//! Actix-web extractor for bearer session tokens.

use std::future::{Ready, ready};

use actix_web::dev::Payload;
use actix_web::http::header::AUTHORIZATION;
use actix_web::{FromRequest, HttpRequest, web};

use super::TokenVerifier;
use crate::error::AppError;
use crate::models::AuthContext;

/// Authenticated caller.
///
/// ```ignore
/// async fn handler(auth: AuthUser) -> impl Responder {
///     // auth.0.usuario_id, auth.0.rol_id
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct AuthUser(pub AuthContext);

fn bearer_token(req: &HttpRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

impl FromRequest for AuthUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let Some(verifier) = req.app_data::<web::Data<TokenVerifier>>() else {
            return ready(Err(AppError::Unauthorized(
                "Internal configuration error".to_string(),
            )));
        };

        let result = match bearer_token(req) {
            Some(token) => verifier.verify(token).map(AuthUser),
            None => Err(AppError::Unauthorized(
                "Falta el encabezado Authorization: Bearer".to_string(),
            )),
        };
        ready(result)
    }
}
