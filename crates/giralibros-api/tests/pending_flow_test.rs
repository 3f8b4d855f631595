//! Staged-cover lifecycle: stage, consume, ownership, expiry.
//!
//! Run with: `cargo test -p giralibros-api --test pending_flow_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::{bearer, seed_user, TestUser};
use helpers::fixtures::{file_form, png};
use helpers::{api_path, setup_test_app, TestApp, TEST_MAINTENANCE_KEY};
use serde_json::{json, Value};

async fn stage_cover(app: &TestApp, user: &TestUser) -> String {
    let response = app
        .client()
        .post(&api_path("/covers"))
        .add_header("Authorization", bearer(user))
        .multipart(file_form(png(400, 600), "image/png"))
        .await;
    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    body["handle"].as_str().unwrap().to_string()
}

async fn save_book_with_handle(app: &TestApp, user: &TestUser, title: &str, handle: &str) -> Value {
    let response = app
        .client()
        .put(&api_path("/my/books"))
        .add_header("Authorization", bearer(user))
        .json(&json!([{ "title": title, "author": "Autor", "cover_handle": handle }]))
        .await;
    assert_eq!(response.status_code(), 200);
    response.json()
}

#[tokio::test]
async fn test_consume_enforces_ownership_then_exactly_once() {
    let app = setup_test_app().await;
    let ana = seed_user(app.pool(), "ana", &["CABA"]).await;
    let bruno = seed_user(app.pool(), "bruno", &["CABA"]).await;

    let handle = stage_cover(&app, &ana).await;

    // Another user referencing the handle is denied and the staged cover
    // survives untouched.
    let response = app
        .client()
        .put(&api_path("/my/books"))
        .add_header("Authorization", bearer(&bruno))
        .json(&json!([{ "title": "Ajena", "author": "Autor", "cover_handle": handle }]))
        .await;
    assert_eq!(response.status_code(), 403);

    // The owner can still consume it.
    let books = save_book_with_handle(&app, &ana, "Propia", &handle).await;
    assert!(books[0]["cover_url"].as_str().unwrap().contains("covers/"));

    // A second submission with the same handle saves the book without a
    // cover: the handle was consumed by the first submission.
    let response = app
        .client()
        .put(&api_path("/my/books"))
        .add_header("Authorization", bearer(&ana))
        .json(&json!([
            { "id": books[0]["id"], "title": "Propia", "author": "Autor" },
            { "title": "Segunda", "author": "Autor", "cover_handle": handle }
        ]))
        .await;
    assert_eq!(response.status_code(), 200);
    let books: Value = response.json();
    let second = books
        .as_array()
        .unwrap()
        .iter()
        .find(|b| b["title"] == "Segunda")
        .unwrap();
    assert!(second["cover_url"].is_null());
}

#[tokio::test]
async fn test_invalid_submission_does_not_consume_handle() {
    let app = setup_test_app().await;
    let ana = seed_user(app.pool(), "ana", &["CABA"]).await;

    let handle = stage_cover(&app, &ana).await;

    // Empty title fails validation before the broker is touched.
    let response = app
        .client()
        .put(&api_path("/my/books"))
        .add_header("Authorization", bearer(&ana))
        .json(&json!([{ "title": "", "author": "Autor", "cover_handle": handle }]))
        .await;
    assert_eq!(response.status_code(), 400);

    // The staged cover is still there for a corrected submission.
    let books = save_book_with_handle(&app, &ana, "Corregida", &handle).await;
    assert!(books[0]["cover_url"].as_str().unwrap().contains("covers/"));
}

#[tokio::test]
async fn test_sweep_requires_key_and_honors_age() {
    let app = setup_test_app().await;
    let ana = seed_user(app.pool(), "ana", &["CABA"]).await;

    let handle = stage_cover(&app, &ana).await;

    // No key: denied.
    let response = app
        .client()
        .post(&api_path("/maintenance/sweep-pending"))
        .await;
    assert_eq!(response.status_code(), 401);

    // Fresh records are younger than the default threshold: nothing removed.
    let response = app
        .client()
        .post(&api_path("/maintenance/sweep-pending"))
        .add_header("Authorization", format!("Bearer {}", TEST_MAINTENANCE_KEY))
        .await;
    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["removed"], 0);

    // Backdate the record past the threshold; the sweep removes exactly it.
    sqlx::query("UPDATE pending_covers SET created_at = NOW() - INTERVAL '25 hours'")
        .execute(app.pool())
        .await
        .unwrap();

    let response = app
        .client()
        .post(&api_path("/maintenance/sweep-pending"))
        .add_header("Authorization", format!("Bearer {}", TEST_MAINTENANCE_KEY))
        .await;
    let body: Value = response.json();
    assert_eq!(body["removed"], 1);

    // Idempotent: a second run finds nothing.
    let response = app
        .client()
        .post(&api_path("/maintenance/sweep-pending"))
        .add_header("Authorization", format!("Bearer {}", TEST_MAINTENANCE_KEY))
        .await;
    let body: Value = response.json();
    assert_eq!(body["removed"], 0);

    // An expired handle is a soft miss: the book is saved without a cover.
    let books = save_book_with_handle(&app, &ana, "Tarde", &handle).await;
    assert!(books[0]["cover_url"].is_null());
}

#[tokio::test]
async fn test_sweep_removes_object_too() {
    let app = setup_test_app().await;
    let ana = seed_user(app.pool(), "ana", &["CABA"]).await;

    let response = app
        .client()
        .post(&api_path("/covers"))
        .add_header("Authorization", bearer(&ana))
        .multipart(file_form(png(400, 600), "image/png"))
        .await;
    let body: Value = response.json();
    let object_path = body["url"]
        .as_str()
        .unwrap()
        .replace("http://localhost:4000", "");

    assert_eq!(app.client().get(&object_path).await.status_code(), 200);

    sqlx::query("UPDATE pending_covers SET created_at = NOW() - INTERVAL '25 hours'")
        .execute(app.pool())
        .await
        .unwrap();
    let response = app
        .client()
        .post(&api_path("/maintenance/sweep-pending"))
        .add_header("Authorization", format!("Bearer {}", TEST_MAINTENANCE_KEY))
        .await;
    let swept: Value = response.json();
    assert_eq!(swept["removed"], 1);

    assert_eq!(app.client().get(&object_path).await.status_code(), 404);
}
