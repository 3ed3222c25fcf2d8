mod common;

use axum::http::StatusCode;
use common::{body_json, delete_json, get, post_json};
use serde_json::json;
use sqlx::SqlitePool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_user_returns_201(pool: SqlitePool) {
    let response = post_json(
        common::build_test_app(pool),
        "/users",
        json!({ "username": "dr.lee", "password": "pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["username"], "dr.lee");
    assert!(json["id"].is_number());
    assert!(json.get("password_hash").is_none());
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_duplicate_username_returns_409(pool: SqlitePool) {
    common::create_user(&pool, "dr.lee", "pw").await;
    let response = post_json(
        common::build_test_app(pool),
        "/users",
        json!({ "username": "dr.lee", "password": "other" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(body_json(response).await["code"], "CONFLICT");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_empty_username_rejected(pool: SqlitePool) {
    let response = post_json(
        common::build_test_app(pool),
        "/users",
        json!({ "username": "  ", "password": "pw" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_users_in_creation_order(pool: SqlitePool) {
    common::create_user(&pool, "dr.park", "pw").await;
    common::create_user(&pool, "dr.kim", "pw").await;

    let response = get(common::build_test_app(pool), "/users").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let names: Vec<_> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|u| u["username"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(names, vec!["dr.park", "dr.kim"]);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_delete_user_requires_password(pool: SqlitePool) {
    common::create_user(&pool, "dr.lee", "pw").await;

    let wrong = delete_json(
        common::build_test_app(pool.clone()),
        "/users",
        json!({ "username": "dr.lee", "password": "nope" }),
    )
    .await;
    assert_eq!(wrong.status(), StatusCode::FORBIDDEN);

    let missing = delete_json(
        common::build_test_app(pool.clone()),
        "/users",
        json!({ "username": "ghost", "password": "pw" }),
    )
    .await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let ok = delete_json(
        common::build_test_app(pool.clone()),
        "/users",
        json!({ "username": "dr.lee", "password": "pw" }),
    )
    .await;
    assert_eq!(ok.status(), StatusCode::OK);

    let json = body_json(get(common::build_test_app(pool), "/users").await).await;
    assert!(json.as_array().unwrap().is_empty());
}
