mod common;

use axum::http::StatusCode;
use common::{body_bytes, body_json, get, get_with_header, write_video};
use lus_core::label::Label;
use lus_core::library::file_id;
use serde_json::json;
use sqlx::SqlitePool;

fn library() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_video(dir.path(), "Patient_3/H-LUS/seq_b.mp4", b"bbbb");
    write_video(dir.path(), "Patient_3/H-LUS/seq_a.mp4", b"0123456789");
    write_video(dir.path(), "Patient_3/I-LUS/seq_c.mp4", b"cc");
    write_video(dir.path(), "Patient_1/C-LUS/x.mp4", b"x");
    dir
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_patients(pool: SqlitePool) {
    let dir = library();
    let app = common::build_test_app_with_library(pool, dir.path());
    let json = body_json(get(app, "/api/patients").await).await;
    assert_eq!(
        json,
        json!([
            { "patient_id": "Patient_1", "display_name": "Patient_1" },
            { "patient_id": "Patient_3", "display_name": "Patient_3" },
        ])
    );
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_classes(pool: SqlitePool) {
    let dir = library();
    let app = common::build_test_app_with_library(pool.clone(), dir.path());
    let json = body_json(get(app, "/api/patients/Patient_3/classes").await).await;
    assert_eq!(json, json!(["H-LUS", "I-LUS"]));

    let app = common::build_test_app_with_library(pool, dir.path());
    let response = get(app, "/api/patients/Patient_9/classes").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_videos_sorted_with_stream_urls(pool: SqlitePool) {
    let dir = library();
    let app = common::build_test_app_with_library(pool, dir.path());
    let json = body_json(get(app, "/api/patients/Patient_3/classes/H-LUS/videos").await).await;
    let first_id = file_id("Patient_3", Label::HLus, "seq_a.mp4");
    assert_eq!(json[0]["file_name"], "seq_a.mp4");
    assert_eq!(json[0]["url"], format!("/api/videos/{first_id}"));
    assert_eq!(json[1]["file_name"], "seq_b.mp4");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_videos_empty_and_invalid_class(pool: SqlitePool) {
    let dir = library();
    let app = common::build_test_app_with_library(pool.clone(), dir.path());
    let json = body_json(get(app, "/api/patients/Patient_3/classes/C-LUS/videos").await).await;
    assert_eq!(json, json!([]));

    let app = common::build_test_app_with_library(pool, dir.path());
    let response = get(app, "/api/patients/Patient_3/classes/B-LUS/videos").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_stream_full_and_range(pool: SqlitePool) {
    let dir = library();
    let id = file_id("Patient_3", Label::HLus, "seq_a.mp4");

    let app = common::build_test_app_with_library(pool.clone(), dir.path());
    let full = get(app, &format!("/api/videos/{id}")).await;
    assert_eq!(full.status(), StatusCode::OK);
    assert_eq!(full.headers()["content-type"], "video/mp4");
    assert_eq!(body_bytes(full).await, b"0123456789");

    let app = common::build_test_app_with_library(pool.clone(), dir.path());
    let partial = get_with_header(app, &format!("/api/videos/{id}"), "range", "bytes=2-5").await;
    assert_eq!(partial.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(partial.headers()["content-range"], "bytes 2-5/10");
    assert_eq!(body_bytes(partial).await, b"2345");

    let app = common::build_test_app_with_library(pool, dir.path());
    let beyond = get_with_header(app, &format!("/api/videos/{id}"), "range", "bytes=50-").await;
    assert_eq!(beyond.status(), StatusCode::RANGE_NOT_SATISFIABLE);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_stream_range_start_at_u64_max_is_416(pool: SqlitePool) {
    let dir = library();
    let id = file_id("Patient_3", Label::HLus, "seq_a.mp4");
    let range = format!("bytes={}-", u64::MAX);

    let app = common::build_test_app_with_library(pool, dir.path());
    let response = get_with_header(app, &format!("/api/videos/{id}"), "range", &range).await;
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);
    assert_eq!(response.headers()["content-range"], "bytes */10");
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_stream_unknown_video_404(pool: SqlitePool) {
    let dir = library();
    let app = common::build_test_app_with_library(pool, dir.path());
    let response = get(app, "/api/videos/00000000000000000000000000000000").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
