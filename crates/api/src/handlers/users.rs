//! Handlers for the `/users` resource.
//!
//! Annotator accounts are deliberately simple: a unique username and a
//! password hash. Deleting an account requires its current password.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use lus_core::error::CoreError;
use lus_core::wire::{Message, UserCredentials, UserSummary};
use lus_db::models::user::CreateUser;
use lus_db::repositories::UserRepo;

use crate::auth::password::{hash_password, validate_password_strength, verify_password};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// GET /users
pub async fn list_users(State(state): State<AppState>) -> AppResult<Json<Vec<UserSummary>>> {
    let users = UserRepo::list(&state.pool).await?;
    Ok(Json(users.into_iter().map(UserSummary::from).collect()))
}

/// POST /users
///
/// Create an annotator account. Returns 409 when the username is taken.
pub async fn create_user(
    State(state): State<AppState>,
    Json(input): Json<UserCredentials>,
) -> AppResult<(StatusCode, Json<UserSummary>)> {
    let username = input.username.trim();
    if username.is_empty() {
        return Err(AppError::Core(CoreError::Validation(
            "Username must not be empty".into(),
        )));
    }
    validate_password_strength(&input.password, state.config.password_min_length)?;

    if UserRepo::find_by_username(&state.pool, username)
        .await?
        .is_some()
    {
        return Err(AppError::Core(CoreError::Conflict(
            "Username already exists".into(),
        )));
    }

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: username.to_string(),
            password_hash: hash_password(&input.password)?,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User created");

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// DELETE /users
///
/// Delete an account after checking its password.
pub async fn delete_user(
    State(state): State<AppState>,
    Json(input): Json<UserCredentials>,
) -> AppResult<Json<Message>> {
    let user = UserRepo::find_by_username(&state.pool, &input.username)
        .await?
        .ok_or_else(|| CoreError::not_found("User", &input.username))?;

    if !verify_password(&input.password, &user.password_hash)? {
        return Err(AppError::Core(CoreError::Forbidden(
            "Incorrect password".into(),
        )));
    }

    UserRepo::delete(&state.pool, user.id).await?;
    tracing::info!(user_id = user.id, username = %user.username, "User deleted");

    Ok(Json(Message {
        detail: "User deleted".into(),
    }))
}
