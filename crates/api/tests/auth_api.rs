mod common;

use axum::http::StatusCode;
use common::{body_json, post_json};
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_success(pool: SqlitePool) {
    common::create_user(&pool, "dr.lee", "secret").await;
    let response = post_json(
        common::build_test_app(pool),
        "/auth/login",
        json!({ "username": "dr.lee", "password": "secret" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_wrong_password_is_401(pool: SqlitePool) {
    common::create_user(&pool, "dr.lee", "secret").await;
    let response = post_json(
        common::build_test_app(pool),
        "/auth/login",
        json!({ "username": "dr.lee", "password": "guess" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let json = body_json(response).await;
    assert_eq!(json["detail"], "Invalid username or password");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_login_unknown_user_is_401(pool: SqlitePool) {
    let response = post_json(
        common::build_test_app(pool),
        "/auth/login",
        json!({ "username": "ghost", "password": "x" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_change_password_flow(pool: SqlitePool) {
    common::create_user(&pool, "dr.lee", "old").await;

    let response = post_json(
        common::build_test_app(pool.clone()),
        "/auth/change-password",
        json!({ "username": "dr.lee", "old_password": "old", "new_password": "new" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["detail"],
        "Password updated successfully"
    );

    let old_login = post_json(
        common::build_test_app(pool.clone()),
        "/auth/login",
        json!({ "username": "dr.lee", "password": "old" }),
    )
    .await;
    assert_eq!(old_login.status(), StatusCode::UNAUTHORIZED);

    let new_login = post_json(
        common::build_test_app(pool),
        "/auth/login",
        json!({ "username": "dr.lee", "password": "new" }),
    )
    .await;
    assert_eq!(new_login.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_change_password_wrong_old_password(pool: SqlitePool) {
    common::create_user(&pool, "dr.lee", "old").await;
    let response = post_json(
        common::build_test_app(pool),
        "/auth/change-password",
        json!({ "username": "dr.lee", "old_password": "bad", "new_password": "new" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "Old password is incorrect");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_change_password_unknown_user(pool: SqlitePool) {
    let response = post_json(
        common::build_test_app(pool),
        "/auth/change-password",
        json!({ "username": "ghost", "old_password": "a", "new_password": "b" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
