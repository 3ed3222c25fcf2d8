//! Handlers for the `/auth` resource (login, change password).
//!
//! Login is a credential check only; the client keeps the session.

use axum::extract::State;
use axum::Json;
use lus_core::error::CoreError;
use lus_core::wire::{ChangePasswordRequest, LoginRequest, Message};
use lus_db::repositories::UserRepo;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid username or password";

/// POST /auth/login
///
/// Returns 200 when the username exists and the password matches, 401 otherwise.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<Message>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| AppError::Core(CoreError::Unauthorized(INVALID_CREDENTIALS.into())))?;

    if !verify_password(&input.password, &user.password_hash)? {
        tracing::info!(username = %input.username, "Rejected login attempt");
        return Err(AppError::Core(CoreError::Unauthorized(
            INVALID_CREDENTIALS.into(),
        )));
    }

    tracing::info!(user_id = user.id, username = %user.username, "User logged in");
    Ok(Json(Message { detail: "ok".into() }))
}

/// POST /auth/change-password
///
/// Requires the current password. 404 for an unknown user, 400 when the
/// old password does not match.
pub async fn change_password(
    State(state): State<AppState>,
    Json(input): Json<ChangePasswordRequest>,
) -> AppResult<Json<Message>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &input.username))?;

    if !verify_password(&input.old_password, &user.password_hash)? {
        return Err(AppError::Core(CoreError::Validation(
            "Old password is incorrect".into(),
        )));
    }
    validate_password_strength(&input.new_password, state.config.password_min_length)?;

    let new_hash = hash_password(&input.new_password)?;
    UserRepo::update_password(&state.pool, user.id, &new_hash).await?;

    tracing::info!(user_id = user.id, "Password changed");
    Ok(Json(Message {
        detail: "Password updated successfully".into(),
    }))
}
