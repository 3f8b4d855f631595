//! Cover upload integration tests.
//!
//! Run with: `cargo test -p giralibros-api --test covers_test`
//! Requires Docker for testcontainers (Postgres).

mod helpers;

use helpers::auth::{bearer, seed_user};
use helpers::fixtures::{file_form, png};
use helpers::{api_path, setup_test_app};
use serde_json::{json, Value};

#[tokio::test]
async fn test_stage_cover() {
    let app = setup_test_app().await;
    let user = seed_user(app.pool(), "ana", &["CABA"]).await;

    let response = app
        .client()
        .post(&api_path("/covers"))
        .add_header("Authorization", bearer(&user))
        .multipart(file_form(png(800, 1200), "image/png"))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert!(body.get("handle").and_then(|v| v.as_str()).is_some());
    assert_eq!(body["width"], 400);
    assert_eq!(body["height"], 600);
    assert!(body["url"].as_str().unwrap().contains("pending/"));
}

#[tokio::test]
async fn test_upload_requires_auth() {
    let app = setup_test_app().await;

    let response = app
        .client()
        .post(&api_path("/covers"))
        .multipart(file_form(png(100, 150), "image/png"))
        .await;

    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_upload_rejects_disallowed_content_type() {
    let app = setup_test_app().await;
    let user = seed_user(app.pool(), "ana", &["CABA"]).await;

    let response = app
        .client()
        .post(&api_path("/covers"))
        .add_header("Authorization", bearer(&user))
        .multipart(file_form(png(100, 150), "application/pdf"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_IMAGE");
}

#[tokio::test]
async fn test_upload_rejects_undecodable_bytes() {
    let app = setup_test_app().await;
    let user = seed_user(app.pool(), "ana", &["CABA"]).await;

    let response = app
        .client()
        .post(&api_path("/covers"))
        .add_header("Authorization", bearer(&user))
        .multipart(file_form(b"not an image at all".to_vec(), "image/png"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_IMAGE");
}

#[tokio::test]
async fn test_upload_rejects_oversized_file() {
    let app = setup_test_app().await;
    let user = seed_user(app.pool(), "ana", &["CABA"]).await;

    // Over the 256 KiB test cap; rejected by the size gate before decoding.
    let response = app
        .client()
        .post(&api_path("/covers"))
        .add_header("Authorization", bearer(&user))
        .multipart(file_form(vec![0u8; 300 * 1024], "image/png"))
        .await;

    assert_eq!(response.status_code(), 413);
}

#[tokio::test]
async fn test_attach_directly_to_owned_book() {
    let app = setup_test_app().await;
    let user = seed_user(app.pool(), "ana", &["CABA"]).await;

    let response = app
        .client()
        .put(&api_path("/my/books"))
        .add_header("Authorization", bearer(&user))
        .json(&json!([{ "title": "Rayuela", "author": "Cortázar" }]))
        .await;
    assert_eq!(response.status_code(), 200);
    let books: Value = response.json();
    let book_id = books[0]["id"].as_str().unwrap().to_string();

    let response = app
        .client()
        .post(&format!("{}?book={}", api_path("/covers"), book_id))
        .add_header("Authorization", bearer(&user))
        .multipart(file_form(png(600, 400), "image/png"))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["book_id"].as_str().unwrap(), book_id);
    assert!(body["url"].as_str().unwrap().contains("covers/"));

    let response = app
        .client()
        .get(&api_path("/my/books"))
        .add_header("Authorization", bearer(&user))
        .await;
    let books: Value = response.json();
    assert!(books[0]["cover_url"].as_str().unwrap().contains("covers/"));
}

#[tokio::test]
async fn test_attach_to_another_users_book_is_not_found() {
    let app = setup_test_app().await;
    let ana = seed_user(app.pool(), "ana", &["CABA"]).await;
    let bruno = seed_user(app.pool(), "bruno", &["CABA"]).await;

    let response = app
        .client()
        .put(&api_path("/my/books"))
        .add_header("Authorization", bearer(&bruno))
        .json(&json!([{ "title": "Ficciones", "author": "Borges" }]))
        .await;
    let books: Value = response.json();
    let book_id = books[0]["id"].as_str().unwrap();

    let response = app
        .client()
        .post(&format!("{}?book={}", api_path("/covers"), book_id))
        .add_header("Authorization", bearer(&ana))
        .multipart(file_form(png(100, 150), "image/png"))
        .await;

    // Ownership is checked before any pixel work or storage write.
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_replacing_cover_discards_previous_object() {
    let app = setup_test_app().await;
    let user = seed_user(app.pool(), "ana", &["CABA"]).await;

    let response = app
        .client()
        .put(&api_path("/my/books"))
        .add_header("Authorization", bearer(&user))
        .json(&json!([{ "title": "Rayuela", "author": "Cortázar" }]))
        .await;
    let books: Value = response.json();
    let book_id = books[0]["id"].as_str().unwrap().to_string();

    let first: Value = app
        .client()
        .post(&format!("{}?book={}", api_path("/covers"), book_id))
        .add_header("Authorization", bearer(&user))
        .multipart(file_form(png(600, 400), "image/png"))
        .await
        .json();
    let first_path = first["url"]
        .as_str()
        .unwrap()
        .replace("http://localhost:4000", "");

    // Served while current.
    let served = app.client().get(&first_path).await;
    assert_eq!(served.status_code(), 200);

    let second: Value = app
        .client()
        .post(&format!("{}?book={}", api_path("/covers"), book_id))
        .add_header("Authorization", bearer(&user))
        .multipart(file_form(png(400, 600), "image/png"))
        .await
        .json();
    assert_ne!(first["url"], second["url"]);

    // Replaced bytes are gone.
    let served = app.client().get(&first_path).await;
    assert_eq!(served.status_code(), 404);
}
