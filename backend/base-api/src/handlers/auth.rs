use crate::db;
use crate::error::{AppError, Result};
use crate::models::{LoginRequest, LogoutResponse, RegisterRequest, UserResponse};
use crate::security::AuthedUser;
use crate::services::session;
use crate::state::AppState;
use actix_middleware::Sanitized;
use actix_web::{web, HttpResponse};

pub async fn register(
    state: web::Data<AppState>,
    body: Sanitized<RegisterRequest>,
) -> Result<HttpResponse> {
    let user = session::register(&state, &body).await?;
    Ok(HttpResponse::Created().json(UserResponse::from(user)))
}

pub async fn login(
    state: web::Data<AppState>,
    body: Sanitized<LoginRequest>,
) -> Result<HttpResponse> {
    let response = session::login(&state, &body).await?;
    Ok(HttpResponse::Ok().json(response))
}

pub async fn logout(state: web::Data<AppState>, user: AuthedUser) -> Result<HttpResponse> {
    session::logout(state.store.as_ref(), &user).await?;
    Ok(HttpResponse::Ok().json(LogoutResponse::ok()))
}

pub async fn logout_all(state: web::Data<AppState>, user: AuthedUser) -> Result<HttpResponse> {
    session::logout_all(state.store.as_ref(), &user).await?;
    Ok(HttpResponse::Ok().json(LogoutResponse::ok()))
}

pub async fn me(state: web::Data<AppState>, user: AuthedUser) -> Result<HttpResponse> {
    let record = db::users::find_by_id(&state.db, user.user_id)
        .await?
        .ok_or(AppError::InvalidToken)?;
    Ok(HttpResponse::Ok().json(UserResponse::from(record)))
}
