//! Router-level tests for the public and admin HTTP surface
//!
//! Requests go through the real `router()` with an in-memory store and a
//! temporary upload directory, using `tower::ServiceExt::oneshot`.

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use http_body_util::BodyExt;
use polyglot_cms::content::{ensure_default_pages, ContentKind};
use polyglot_cms::server::{router, AdminCredentials, AppState};
use polyglot_cms::storage::DiskStorage;
use polyglot_cms::store::{ContentStore, MemoryStore};
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

const BOUNDARY: &str = "polyglot-test-boundary";

// ==================== Test Helpers ====================

struct TestApp {
    app: Router,
    store: MemoryStore,
    _uploads: TempDir,
}

fn test_app() -> TestApp {
    let uploads = TempDir::new().unwrap();
    let store = MemoryStore::new();
    let state = AppState {
        store: Arc::new(store.clone()),
        storage: Arc::new(DiskStorage::new(uploads.path(), 1024)),
        admin: Arc::new(AdminCredentials {
            user: "admin".to_string(),
            password: "secret".to_string(),
        }),
        max_upload_bytes: 1024,
        backend: "memory",
    };
    TestApp {
        app: router(state),
        store,
        _uploads: uploads,
    }
}

fn basic(user: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn admin_form(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, basic("admin", "secret"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Create an English-only event and return the id of each language row.
async fn create_event(app: &Router) -> Value {
    let (status, body) = send(
        app,
        admin_form(
            "/admin/events",
            "title_en=Summer+Concert&event_date=2025-06-01&location=Bratislava",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["data"]["ids"].clone()
}

fn multipart_body(parts: &[(&str, Option<&str>, &[u8])]) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, filename, content) in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match filename {
            Some(filename) => body.extend_from_slice(
                format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                     Content-Type: image/jpeg\r\n\r\n"
                )
                .as_bytes(),
            ),
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
            ),
        }
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn gallery_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::post(uri)
        .header(header::AUTHORIZATION, basic("admin", "secret"))
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

// ==================== Health Tests ====================

#[tokio::test]
async fn test_health() {
    let t = test_app();
    let (status, body) = send(&t.app, get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["store"], "memory");
}

// ==================== Auth Tests ====================

#[tokio::test]
async fn test_admin_requires_credentials() {
    let t = test_app();
    let request = Request::post("/admin/events")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("title_en=X"))
        .unwrap();
    let response = t.app.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(response.headers().contains_key(header::WWW_AUTHENTICATE));
    assert!(t.store.is_empty());
}

#[tokio::test]
async fn test_admin_rejects_wrong_password() {
    let t = test_app();
    let request = Request::post("/admin/events")
        .header(header::AUTHORIZATION, basic("admin", "wrong"))
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("title_en=X"))
        .unwrap();
    let (status, _) = send(&t.app, request).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ==================== Create / Read Tests ====================

#[tokio::test]
async fn test_create_then_read_in_every_language() {
    let t = test_app();
    let ids = create_event(&t.app).await;
    assert_eq!(t.store.len(), 3);

    let en_id = ids["en"].as_i64().unwrap();
    for lang in ["en", "sk", "hu"] {
        let (status, body) = send(&t.app, get(&format!("/api/events/{en_id}?lang={lang}"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["lang"], lang);
        assert_eq!(body["data"]["fields"]["title"], "Summer Concert");
        assert_eq!(body["data"]["gallery"], serde_json::json!([]));
    }
}

#[tokio::test]
async fn test_unknown_language_falls_back_to_english() {
    let t = test_app();
    let ids = create_event(&t.app).await;
    let sk_id = ids["sk"].as_i64().unwrap();

    let (status, body) = send(&t.app, get(&format!("/api/events/{sk_id}?lang=de"))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lang"], "en");
}

#[tokio::test]
async fn test_create_without_title_is_localized() {
    let t = test_app();
    let (status, body) = send(
        &t.app,
        admin_form("/admin/events?lang=sk", "event_date=2025-06-01&location=Nitra"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(t.store.is_empty());
}

#[tokio::test]
async fn test_list_and_slug_lookup() {
    let t = test_app();
    create_event(&t.app).await;

    let (status, body) = send(&t.app, get("/api/events?lang=hu")).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["lang"], "hu");

    let (status, body) = send(&t.app, get("/api/events/slug/summer-concert?lang=sk")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["lang"], "sk");

    let (status, _) = send(&t.app, get("/api/events/slug/nothing-here")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_kind_and_missing_item() {
    let t = test_app();

    let (status, _) = send(&t.app, get("/api/widgets")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(&t.app, get("/api/events/999")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_unpublished_item_is_hidden() {
    let t = test_app();
    let ids = create_event(&t.app).await;
    let en_id = ids["en"].as_i64().unwrap();

    let (status, _) = send(
        &t.app,
        admin_form(&format!("/admin/events/{en_id}"), "published=off"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&t.app, get(&format!("/api/events/{en_id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&t.app, get("/api/events")).await;
    assert_eq!(body["data"], serde_json::json!([]));
}

// ==================== Update / Delete Tests ====================

#[tokio::test]
async fn test_update_only_touches_posted_language() {
    let t = test_app();
    let ids = create_event(&t.app).await;
    let sk_id = ids["sk"].as_i64().unwrap();

    let (status, body) = send(
        &t.app,
        admin_form(&format!("/admin/events/{sk_id}"), "title_sk=Letn%C3%BD+koncert"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["updated"]["sk"], sk_id);
    assert!(body["data"]["updated"].get("en").is_none());

    let en_id = ids["en"].as_i64().unwrap();
    let en = t.store.get(ContentKind::Event, en_id).await.unwrap().unwrap();
    let sk = t.store.get(ContentKind::Event, sk_id).await.unwrap().unwrap();
    assert_eq!(en.fields.get("title"), Some("Summer Concert"));
    assert_eq!(sk.fields.get("title"), Some("Letný koncert"));
}

#[tokio::test]
async fn test_variants_and_delete() {
    let t = test_app();
    let ids = create_event(&t.app).await;
    let hu_id = ids["hu"].as_i64().unwrap();

    let request = Request::get(format!("/admin/events/{hu_id}/variants"))
        .header(header::AUTHORIZATION, basic("admin", "secret"))
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_object().unwrap().len(), 3);

    let (status, body) = send(&t.app, admin_form(&format!("/admin/events/{hu_id}/delete"), "")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["deleted"], 3);
    assert!(t.store.is_empty());
}

// ==================== Gallery Tests ====================

#[tokio::test]
async fn test_gallery_upload_is_shared_by_the_group() {
    let t = test_app();
    let ids = create_event(&t.app).await;
    let sk_id = ids["sk"].as_i64().unwrap();
    let en_id = ids["en"].as_i64().unwrap();

    let body = multipart_body(&[
        ("additional_images", Some("Stage.jpg"), b"jpeg-bytes"),
        ("additional_images", Some("Crowd.jpg"), b"more-bytes"),
    ]);
    let (status, outcome) = send(
        &t.app,
        gallery_request(&format!("/admin/events/{sk_id}/gallery"), body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["data"]["images"].as_array().unwrap().len(), 2);
    let first_url = outcome["data"]["images"][0]["image_url"].clone();
    assert_eq!(outcome["data"]["lead_url"], first_url);

    // Reading any language shows the same gallery and lead image.
    let (_, body) = send(&t.app, get(&format!("/api/events/{en_id}?lang=hu"))).await;
    assert_eq!(body["data"]["gallery"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"]["lead_url"], first_url);

    // Remove the first image and check the lead moves on.
    let first_id = outcome["data"]["images"][0]["id"].as_i64().unwrap().to_string();
    let body = multipart_body(&[("remove_image_ids", None, first_id.as_bytes())]);
    let (status, outcome) = send(
        &t.app,
        gallery_request(&format!("/admin/events/{en_id}/gallery"), body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let images = outcome["data"]["images"].as_array().unwrap();
    assert_eq!(images.len(), 1);
    assert_eq!(images[0]["sort_order"], 0);
    assert_eq!(outcome["data"]["lead_url"], images[0]["image_url"]);
}

#[tokio::test]
async fn test_gallery_rejects_oversized_upload() {
    let t = test_app();
    let ids = create_event(&t.app).await;
    let en_id = ids["en"].as_i64().unwrap();

    let big = vec![b'x'; 2048];
    let body = multipart_body(&[("additional_images", Some("huge.jpg"), &big)]);
    let (status, body) = send(
        &t.app,
        gallery_request(&format!("/admin/events/{en_id}/gallery"), body),
    )
    .await;

    assert_eq!(status, StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn test_gallery_not_available_for_documents() {
    let t = test_app();
    let (status, body) = send(
        &t.app,
        admin_form("/admin/documents", "title_en=Annual+Report"),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["data"]["ids"]["en"].as_i64().unwrap();

    let body = multipart_body(&[("additional_images", Some("a.jpg"), b"x")]);
    let (status, _) = send(
        &t.app,
        gallery_request(&format!("/admin/documents/{id}/gallery"), body),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// ==================== Menu Tests ====================

fn menu_entries(body: &Value) -> Vec<(String, String)> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| {
            (
                p["slug"].as_str().unwrap().to_string(),
                p["title"].as_str().unwrap().to_string(),
            )
        })
        .collect()
}

#[tokio::test]
async fn test_menu_lists_seeded_pages_in_nav_order() {
    let t = test_app();
    let seeded = ensure_default_pages(&t.store).await.unwrap();
    assert_eq!(seeded, 15);

    let (status, body) = send(&t.app, get("/api/menu?lang=sk")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        menu_entries(&body),
        vec![
            ("home".to_string(), "Domov".to_string()),
            ("about-us".to_string(), "O nás".to_string()),
            ("focus-areas".to_string(), "Zamerania".to_string()),
            ("gdpr".to_string(), "GDPR".to_string()),
            ("contact".to_string(), "Kontakt".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_admin_page_edit_shows_in_menu() {
    let t = test_app();
    ensure_default_pages(&t.store).await.unwrap();

    let (status, body) = send(
        &t.app,
        admin_form(
            "/admin/pages/contact",
            "title_sk=Nap%C3%AD%C5%A1te+n%C3%A1m&content_sk=%3Cp%3Einfo%40example.sk%3C%2Fp%3E&title_hu=",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let saved = body["data"].as_array().unwrap();
    assert_eq!(saved.len(), 3);
    assert_eq!(saved[1]["lang"], "sk");
    assert_eq!(saved[1]["content"], "<p>info@example.sk</p>");
    assert_eq!(saved[2]["title"], "Kapcsolat");

    let (_, body) = send(&t.app, get("/api/menu?lang=sk")).await;
    let entries = menu_entries(&body);
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[4], ("contact".to_string(), "Napíšte nám".to_string()));

    let (_, body) = send(&t.app, get("/api/menu?lang=en")).await;
    assert_eq!(menu_entries(&body)[4].1, "Contact");
}

#[tokio::test]
async fn test_admin_page_edit_creates_missing_page() {
    let t = test_app();

    let (status, _) = send(&t.app, admin_form("/admin/pages/gdpr", "title_en=Privacy")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = send(&t.app, get("/api/menu?lang=hu")).await;
    assert_eq!(menu_entries(&body), vec![("gdpr".to_string(), "GDPR".to_string())]);
    let (_, body) = send(&t.app, get("/api/menu")).await;
    assert_eq!(menu_entries(&body), vec![("gdpr".to_string(), "Privacy".to_string())]);
}

#[tokio::test]
async fn test_admin_page_edit_rejects_unknown_slug_and_anonymous() {
    let t = test_app();

    let (status, body) = send(
        &t.app,
        admin_form("/admin/pages/careers?lang=sk", "title_en=Jobs"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Stránka sa nenašla");

    let request = Request::post("/admin/pages/contact")
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from("title_en=Hi"))
        .unwrap();
    let (status, _) = send(&t.app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (_, body) = send(&t.app, get("/api/menu")).await;
    assert!(menu_entries(&body).is_empty());
}
