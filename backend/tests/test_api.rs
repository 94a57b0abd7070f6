use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use inkpost_backend::{routes, state::AppState};
use inkpost_shared::BlobStore;

const BOUNDARY: &str = "test-boundary";

fn app(dir: &TempDir) -> Router {
    let blob = BlobStore::local_only(dir.path()).expect("open local store");
    routes::create_router(AppState::new(blob, Duration::from_secs(60)))
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("build request")
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("build request")
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse body")
}

fn multipart_file(name: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn upload_request(name: &str, content_type: &str, data: &[u8]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_file(name, content_type, data)))
        .expect("build request")
}

async fn login_cookie(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/admin",
            json!({ "action": "login", "username": "admin", "password": "password123" }),
        ))
        .await
        .expect("login request");
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie on login")
        .to_str()
        .expect("cookie is ascii");
    assert!(cookie.starts_with("auth_token="));
    cookie
        .split(';')
        .next()
        .expect("cookie pair")
        .to_string()
}

#[tokio::test]
async fn api_responses_are_marked_uncacheable() {
    let dir = TempDir::new().expect("temp dir");
    let app = app(&dir);

    let response = app.oneshot(get("/about")).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CACHE_CONTROL).map(|v| v.to_str().unwrap_or("")),
        Some("no-store")
    );
}

#[tokio::test]
async fn about_nested_mutations_over_http() {
    let dir = TempDir::new().expect("temp dir");
    let app = app(&dir);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/about?action=add-timeline",
            json!({ "year": "2025", "title": "New entry", "description": "", "type": "work" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let about = body_json(response).await;
    let added = about["timeline"]
        .as_array()
        .expect("timeline array")
        .iter()
        .find(|item| item["title"] == "New entry")
        .expect("added item")
        .clone();
    // 2025 is the newest year in the seeded document, so it sorts first.
    assert_eq!(about["timeline"][0]["id"], added["id"]);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!(
                    "/about?type=timeline&id={}",
                    added["id"].as_str().expect("id string")
                ))
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let about = body_json(response).await;
    assert!(about["timeline"]
        .as_array()
        .expect("timeline array")
        .iter()
        .all(|item| item["id"] != added["id"]));

    let response = app
        .oneshot(json_request("POST", "/about?action=bogus", json!({})))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn about_update_actions_over_http() {
    let dir = TempDir::new().expect("temp dir");
    let app = app(&dir);

    // Timeline: an updated year re-sorts the collection.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/about?action=add-timeline",
            json!({ "year": "1990", "title": "Old entry", "description": "", "type": "education" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let about = body_json(response).await;
    let timeline = about["timeline"].as_array().expect("timeline array");
    let id = timeline.last().expect("1990 sorts last")["id"]
        .as_str()
        .expect("id string")
        .to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/about?action=update-timeline",
            json!({ "id": id, "year": "2099" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let about = body_json(response).await;
    assert_eq!(about["timeline"][0]["id"], id.as_str());
    assert_eq!(about["timeline"][0]["title"], "Old entry");

    // Project: partial update merges, untouched fields survive.
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/about?action=add-project",
            json!({ "title": "New project", "description": "desc", "image": "", "technologies": [] }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let about = body_json(response).await;
    let project_id = about["projects"]
        .as_array()
        .expect("projects array")
        .last()
        .expect("appended")["id"]
        .as_str()
        .expect("id string")
        .to_string();

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/about?action=update-project",
            json!({ "id": project_id, "featured": true }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let about = body_json(response).await;
    let project = about["projects"]
        .as_array()
        .expect("projects array")
        .iter()
        .find(|p| p["id"] == project_id.as_str())
        .expect("still present")
        .clone();
    assert_eq!(project["featured"], true);
    assert_eq!(project["title"], "New project");
    assert_eq!(project["description"], "desc");

    // Unknown ids surface as 404 with the uniform error body.
    let response = app
        .oneshot(json_request(
            "POST",
            "/about?action=update-project",
            json!({ "id": "missing", "featured": true }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["code"], 404);
}

#[tokio::test]
async fn posts_crud_envelopes() {
    let dir = TempDir::new().expect("temp dir");
    let app = app(&dir);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/posts",
            json!({ "title": "My First Post", "content": "hello", "status": "published" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["post"]["slug"], "my-first-post");
    assert!(created["post"]["publishedAt"].is_string());
    let id = created["post"]["id"].as_str().expect("id").to_string();

    let response = app
        .clone()
        .oneshot(get("/posts?slug=my-first-post"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["post"]["id"], id.as_str());

    let response = app
        .clone()
        .oneshot(get("/posts?slug=nope"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let error = body_json(response).await;
    assert_eq!(error["code"], 404);
    assert!(error["error"].is_string());

    let response = app.clone().oneshot(get("/posts")).await.expect("request");
    assert_eq!(
        body_json(response).await["posts"]
            .as_array()
            .expect("posts array")
            .len(),
        1
    );

    // The client cannot touch server-owned fields through an update.
    let response = app
        .clone()
        .oneshot(json_request(
            "PUT",
            "/posts",
            json!({ "id": id, "title": "Renamed", "publishedAt": null }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let updated = body_json(response).await;
    assert_eq!(updated["post"]["title"], "Renamed");
    assert!(updated["post"]["publishedAt"].is_string());
    assert_eq!(updated["post"]["slug"], "my-first-post");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri("/posts")
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(format!("/posts?id={id}"))
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn message_and_subscriber_validation_over_http() {
    let dir = TempDir::new().expect("temp dir");
    let app = app(&dir);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/messages",
            json!({ "email": "no-at-sign", "content": "long enough content" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/messages",
            json!({ "email": "a@b.com", "content": "long enough content" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/subscribe", json!({ "email": "a@b.com" })))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request("POST", "/subscribe", json!({ "email": "a@b.com" })))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.oneshot(get("/subscribe")).await.expect("request");
    assert_eq!(
        body_json(response).await["subscribers"]
            .as_array()
            .expect("subscribers array")
            .len(),
        1
    );
}

#[tokio::test]
async fn contact_submission_envelope() {
    let dir = TempDir::new().expect("temp dir");
    let app = app(&dir);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/contact",
            json!({ "contact": "  nova@example.com  ", "type": "email" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["contact"], "nova@example.com");
    assert_eq!(body["data"]["type"], "email");

    let response = app
        .oneshot(json_request("POST", "/contact", json!({ "contact": "   " })))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn admin_routes_are_gated_and_session_lifecycle_works() {
    let dir = TempDir::new().expect("temp dir");
    let app = app(&dir);

    // No session: guarded routes refuse.
    let response = app.clone().oneshot(get("/admin")).await.expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/admin",
            json!({ "action": "login", "username": "admin", "password": "wrong" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = login_cookie(&app).await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let profile = body_json(response).await;
    assert_eq!(profile["username"], "admin");
    assert!(profile.get("passwordHash").is_none());
    assert!(profile["lastLoginAt"].is_string());

    // The token also works as a bearer header.
    let token = cookie.trim_start_matches("auth_token=").to_string();
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "action": "verify" }).to_string()))
                .expect("build request"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["user"]["username"], "admin");

    // Logout revokes the session and clears the cookie.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/admin")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "action": "logout" }).to_string()))
                .expect("build request"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let cleared = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("set-cookie on logout")
        .to_str()
        .expect("ascii cookie");
    assert!(cleared.contains("Max-Age=0"));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/admin")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .expect("build request"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_password_change_over_http() {
    let dir = TempDir::new().expect("temp dir");
    let app = app(&dir);
    let cookie = login_cookie(&app).await;

    let change = |current: &str, next: &str| {
        json!({ "action": "change-password", "currentPassword": current, "newPassword": next })
    };

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/admin")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(change("wrong", "long-enough").to_string()))
                .expect("build request"),
        )
        .await
        .expect("request");
    // A wrong current password is a bad request, not a failed login.
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/admin")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(change("password123", "12345").to_string()))
                .expect("build request"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("PUT")
                .uri("/admin")
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(change("password123", "123456").to_string()))
                .expect("build request"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(json_request(
            "POST",
            "/admin",
            json!({ "action": "login", "username": "admin", "password": "123456" }),
        ))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_validation_and_serving() {
    let dir = TempDir::new().expect("temp dir");
    let app = app(&dir);

    // Unsupported type, nothing stored.
    let response = app
        .clone()
        .oneshot(upload_request("photo.bmp", "image/bmp", b"bmp data"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Over the 5 MiB cap.
    let big = vec![0u8; 6 * 1024 * 1024];
    let response = app
        .clone()
        .oneshot(upload_request("big.png", "image/png", &big))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Missing file part.
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(format!("--{BOUNDARY}--\r\n")))
                .expect("build request"),
        )
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // A valid upload round-trips through /uploads with cache headers.
    let response = app
        .clone()
        .oneshot(upload_request("photo.png", "image/png", b"png bytes"))
        .await
        .expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    let url = body["url"].as_str().expect("url").to_string();
    let file_name = body["fileName"].as_str().expect("fileName");
    assert_eq!(url, format!("/uploads/{file_name}"));
    assert!(file_name.ends_with(".png"));

    let response = app.clone().oneshot(get(&url)).await.expect("request");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap_or("")),
        Some("image/png")
    );
    assert_eq!(
        response
            .headers()
            .get(header::CACHE_CONTROL)
            .map(|v| v.to_str().unwrap_or("")),
        Some("public, max-age=31536000, immutable")
    );
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("read body");
    assert_eq!(&bytes[..], b"png bytes");

    let response = app.oneshot(get("/uploads/missing.png")).await.expect("request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
