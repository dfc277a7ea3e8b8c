//! HTTP API tests against the in-memory store

use actix_web::{http::StatusCode, test, web, App};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use insta_service::handlers;
use insta_service::repository::{MemorySocialRepository, SocialRepository};
use insta_service::services::{CreatePostInput, CreateProfileInput};
use insta_service::storage::{LocalMediaStorage, MediaStorage};
use insta_service::AppState;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;

fn media_root() -> PathBuf {
    std::env::temp_dir().join(format!("insta-http-{}", uuid::Uuid::new_v4().simple()))
}

fn build_state(media_root: &PathBuf) -> web::Data<AppState> {
    let repo: Arc<dyn SocialRepository> = Arc::new(MemorySocialRepository::new());
    let media: Arc<dyn MediaStorage> = Arc::new(LocalMediaStorage::new(media_root, "/media"));
    web::Data::new(AppState::new(repo, media))
}

async fn seed_profile(state: &AppState, username: &str) -> i64 {
    state
        .profiles
        .create_profile(CreateProfileInput {
            username: username.to_string(),
            display_name: username.to_uppercase(),
            bio_text: String::new(),
            profile_image_url: None,
        })
        .await
        .expect("seed profile")
        .id
}

async fn seed_post(state: &AppState, profile_id: i64, caption: &str) -> i64 {
    state
        .posts
        .create_post(
            profile_id,
            CreatePostInput {
                caption: caption.to_string(),
                photo_urls: Vec::new(),
            },
        )
        .await
        .expect("seed post")
        .id
}

#[actix_web::test]
async fn test_health() {
    let state = build_state(&media_root());
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(handlers::configure)).await;

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "ok");
}

#[actix_web::test]
async fn test_follow_then_feed_is_newest_first() {
    let state = build_state(&media_root());
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(handlers::configure)).await;

    let alice = seed_profile(&state, "alice").await;
    let bob = seed_profile(&state, "bob").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/profiles/{}/following/{}", alice, bob))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    // repeat is a no-op
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/profiles/{}/following/{}", alice, bob))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["changed"], false);

    seed_post(&state, bob, "Hello").await;
    seed_post(&state, bob, "World").await;
    seed_post(&state, alice, "my own").await;

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/profiles/{}/feed", alice))
        .to_request();
    let feed: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    let captions: Vec<&str> = feed.iter().filter_map(|p| p["caption"].as_str()).collect();
    assert_eq!(captions, vec!["World", "Hello"]);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/profiles/{}/followers", bob))
        .to_request();
    let followers: Vec<Value> = test::call_and_read_body_json(&app, req).await;
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0]["username"], "alice");
}

#[actix_web::test]
async fn test_self_follow_is_bad_request() {
    let state = build_state(&media_root());
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(handlers::configure)).await;
    let alice = seed_profile(&state, "alice").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/profiles/{}/following/{}", alice, alice))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_create_profile_and_duplicate_username() {
    let state = build_state(&media_root());
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(handlers::configure)).await;

    let payload = json!({ "username": "carol", "display_name": "Carol" });

    let req = test::TestRequest::post()
        .uri("/api/v1/profiles")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created: Value = test::read_body_json(resp).await;
    assert_eq!(created["username"], "carol");
    assert_eq!(created["bio_text"], "");

    let req = test::TestRequest::post()
        .uri("/api/v1/profiles")
        .set_json(&payload)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["status"], 400);
}

#[actix_web::test]
async fn test_unknown_ids_are_not_found() {
    let state = build_state(&media_root());
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(handlers::configure)).await;

    for uri in [
        "/api/v1/profiles/999",
        "/api/v1/profiles/999/feed",
        "/api/v1/posts/999",
        "/api/v1/posts/random",
    ] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "GET {}", uri);
    }
}

#[actix_web::test]
async fn test_like_comment_and_post_detail() {
    let state = build_state(&media_root());
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(handlers::configure)).await;
    let dave = seed_profile(&state, "dave").await;
    let post = seed_post(&state, dave, "sunrise").await;

    for expected in [StatusCode::CREATED, StatusCode::OK] {
        let req = test::TestRequest::post()
            .uri(&format!("/api/v1/posts/{}/likes/{}", post, dave))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected);
    }

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{}/comments", post))
        .set_json(json!({ "profile_id": dave, "text": "first!" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{}", post))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(detail["post"]["caption"], "sunrise");
    assert_eq!(detail["author"]["username"], "dave");
    assert_eq!(detail["likes"].as_array().map(Vec::len), Some(1));
    assert_eq!(detail["comments"][0]["text"], "first!");

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/posts/{}/likes/{}", post, dave))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["like_count"], 0);
}

#[actix_web::test]
async fn test_search_endpoint() {
    let state = build_state(&media_root());
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(handlers::configure)).await;
    let erin = seed_profile(&state, "erin").await;
    seed_post(&state, erin, "Hello there").await;
    seed_post(&state, erin, "Goodbye").await;

    let req = test::TestRequest::get()
        .uri("/api/v1/search?q=hello")
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"].as_array().map(Vec::len), Some(1));
    assert_eq!(body["posts"][0]["caption"], "Hello there");

    let req = test::TestRequest::get().uri("/api/v1/search").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["posts"].as_array().map(Vec::len), Some(0));
    assert_eq!(body["profiles"].as_array().map(Vec::len), Some(0));
}

#[actix_web::test]
async fn test_upload_photo_stores_file() {
    let root = media_root();
    let state = build_state(&root);
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(handlers::configure)).await;
    let frank = seed_profile(&state, "frank").await;
    let post = seed_post(&state, frank, "").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{}/photos/upload?file_name=cat.png", post))
        .set_payload("png-bytes")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let photo: Value = test::read_body_json(resp).await;
    let reference = photo["image_file"].as_str().unwrap_or_default().to_string();
    assert!(reference.starts_with("/media/"));
    assert!(reference.ends_with("-cat.png"));

    let stored = root.join(reference.trim_start_matches("/media/"));
    assert_eq!(std::fs::read(stored).unwrap(), b"png-bytes");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{}/photos/upload?file_name=empty.png", post))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    std::fs::remove_dir_all(&root).unwrap();
}

#[actix_web::test]
async fn test_upload_photo_accepts_large_files() {
    let root = media_root();
    let state = build_state(&root);
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(handlers::configure)).await;
    let hana = seed_profile(&state, "hana").await;
    let post = seed_post(&state, hana, "").await;

    let image = vec![7u8; 1024 * 1024];
    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{}/photos/upload?file_name=big.jpg", post))
        .set_payload(image.clone())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let photo: Value = test::read_body_json(resp).await;
    let reference = photo["image_file"].as_str().unwrap_or_default().to_string();
    let stored = root.join(reference.trim_start_matches("/media/"));
    assert_eq!(std::fs::read(stored).unwrap().len(), image.len());

    std::fs::remove_dir_all(&root).unwrap();
}

#[actix_web::test]
async fn test_upload_limit_comes_from_route_config() {
    let root = media_root();
    let state = build_state(&root);
    let app = test::init_service(
        App::new()
            .app_data(state.clone())
            .configure(handlers::api_routes(1024)),
    )
    .await;
    let ivan = seed_profile(&state, "ivan").await;
    let post = seed_post(&state, ivan, "").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{}/photos/upload?file_name=big.jpg", post))
        .set_payload(vec![7u8; 4096])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/posts/{}/photos/upload?file_name=small.jpg", post))
        .set_payload(vec![7u8; 512])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let _ = std::fs::remove_dir_all(&root);
}

#[actix_web::test]
async fn test_create_post_with_uploads() {
    let root = media_root();
    let state = build_state(&root);
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(handlers::configure)).await;
    let june = seed_profile(&state, "june").await;

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/profiles/{}/posts/upload", june))
        .set_json(json!({
            "caption": "two shots",
            "files": [
                { "file_name": "a.png", "content_base64": STANDARD.encode(b"first") },
                { "file_name": "b.png", "content_base64": STANDARD.encode(b"second") },
            ],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Value = test::read_body_json(resp).await;
    assert_eq!(post["caption"], "two shots");
    let post_id = post["id"].as_i64().unwrap();

    let req = test::TestRequest::get()
        .uri(&format!("/api/v1/posts/{}", post_id))
        .to_request();
    let detail: Value = test::call_and_read_body_json(&app, req).await;
    let photos = detail["photos"].as_array().unwrap();
    assert_eq!(photos.len(), 2);
    let first = photos[0]["image_file"].as_str().unwrap();
    assert!(first.ends_with("-a.png"));
    let stored = root.join(first.trim_start_matches("/media/"));
    assert_eq!(std::fs::read(stored).unwrap(), b"first");

    let req = test::TestRequest::post()
        .uri(&format!("/api/v1/profiles/{}/posts/upload", june))
        .set_json(json!({
            "caption": "broken",
            "files": [{ "file_name": "c.png", "content_base64": "not base64!" }],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let req = test::TestRequest::post()
        .uri("/api/v1/profiles/999/posts/upload")
        .set_json(json!({
            "files": [{ "file_name": "d.png", "content_base64": STANDARD.encode(b"x") }],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    std::fs::remove_dir_all(&root).unwrap();
}

#[actix_web::test]
async fn test_delete_profile_returns_no_content() {
    let state = build_state(&media_root());
    let app =
        test::init_service(App::new().app_data(state.clone()).configure(handlers::configure)).await;
    let gail = seed_profile(&state, "gail").await;

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/profiles/{}", gail))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let req = test::TestRequest::delete()
        .uri(&format!("/api/v1/profiles/{}", gail))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
