//! Authenticated-user extractor.

use crate::error::AppError;
use crate::state::AppState;
use actix_web::{dev::Payload, web, FromRequest, HttpRequest};
use chrono::{DateTime, Utc};
use futures::future::{ready, Ready};

/// The caller behind a validated bearer token. Handlers that take this
/// extractor require authentication; the raw token is kept so logout can
/// revoke exactly the credential that was presented.
#[derive(Debug, Clone)]
pub struct AuthedUser {
    pub user_id: i64,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl FromRequest for AuthedUser {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(extract(req))
    }
}

fn extract(req: &HttpRequest) -> Result<AuthedUser, AppError> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .ok_or_else(|| AppError::Internal("missing application state".to_string()))?;

    let token = req
        .headers()
        .get("Authorization")
        .and_then(|header| header.to_str().ok())
        .and_then(|header| header.strip_prefix("Bearer "))
        .ok_or(AppError::InvalidToken)?;

    let claims = state.jwt.decode(token)?;
    let user_id = claims.user_id().ok_or(AppError::InvalidToken)?;

    Ok(AuthedUser {
        user_id,
        token: token.to_string(),
        expires_at: claims.expires_at(),
    })
}
