//! Session lifecycle: login, logout, logout-everywhere.

use crate::db;
use crate::error::{AppError, Result};
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, User};
use crate::security::{password, AuthedUser};
use crate::state::AppState;
use actix_middleware::RevocationStore;
use chrono::Utc;

const LOGOUT_REASON: &str = "user logout";
const LOGOUT_ALL_REASON: &str = "logout all sessions";

pub async fn register(state: &AppState, req: &RegisterRequest) -> Result<User> {
    req.validate()?;
    let hash = password::hash_password(&req.password)?;
    let user = db::users::create(&state.db, &req.username, &req.email, &hash).await?;

    tracing::info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user)
}

pub async fn login(state: &AppState, req: &LoginRequest) -> Result<LoginResponse> {
    let user = db::users::find_by_username(&state.db, &req.username)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    if !user.is_active {
        return Err(AppError::InvalidCredentials);
    }

    password::verify_password(&req.password, &user.password_hash)?;

    let (token, expires_at) = state.jwt.issue(user.id)?;
    tracing::info!(user_id = user.id, "login succeeded");

    Ok(LoginResponse {
        token,
        expires_at,
        user: user.into(),
    })
}

/// Invalidate the presented token. Idempotent: a second logout with the
/// same token succeeds, and an already-expired token has nothing left to
/// revoke.
pub async fn logout(store: &dyn RevocationStore, user: &AuthedUser) -> Result<()> {
    if user.expires_at <= Utc::now() {
        tracing::debug!(user_id = user.user_id, "logout of already-expired token");
        return Ok(());
    }

    store
        .revoke(&user.token, user.user_id, user.expires_at, Some(LOGOUT_REASON))
        .await?;

    tracing::info!(user_id = user.user_id, "token revoked on logout");
    Ok(())
}

/// Logout-everywhere: revokes the presented token, then records the
/// subject-wide invalidation.
pub async fn logout_all(store: &dyn RevocationStore, user: &AuthedUser) -> Result<()> {
    if user.expires_at > Utc::now() {
        store
            .revoke(
                &user.token,
                user.user_id,
                user.expires_at,
                Some(LOGOUT_ALL_REASON),
            )
            .await?;
    }

    store.revoke_all_for_subject(user.user_id).await?;

    tracing::info!(user_id = user.user_id, "logout-all recorded");
    Ok(())
}
