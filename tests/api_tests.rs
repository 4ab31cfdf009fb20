use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use std::sync::Arc;
use tower::ServiceExt;

use inkroll::api;
use inkroll::config::{AdminAccount, Config};
use inkroll::services::{ImageHost, UploadedImage};
use inkroll::state::SharedState;

struct StubImageHost;

#[async_trait::async_trait]
impl ImageHost for StubImageHost {
    fn name(&self) -> &'static str {
        "StubHost"
    }

    async fn upload(&self, filename: &str, _bytes: Vec<u8>) -> anyhow::Result<UploadedImage> {
        Ok(UploadedImage {
            url: format!("https://img.test/{filename}"),
        })
    }
}

struct FailingImageHost;

#[async_trait::async_trait]
impl ImageHost for FailingImageHost {
    fn name(&self) -> &'static str {
        "StubHost"
    }

    async fn upload(&self, _filename: &str, _bytes: Vec<u8>) -> anyhow::Result<UploadedImage> {
        Err(anyhow::anyhow!("Upload rejected: preset not found"))
    }
}

fn test_config(admins: Vec<AdminAccount>) -> Config {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();
    config.server.secure_cookies = false;
    config.auth.admins = admins;
    config
}

fn admins() -> Vec<AdminAccount> {
    vec![
        AdminAccount {
            email: "ed@example.com".to_string(),
            password: "hunter2".to_string(),
            name: "Ed Itor".to_string(),
        },
        AdminAccount {
            email: "pat@example.com".to_string(),
            password: "swordfish".to_string(),
            name: "Pat Row".to_string(),
        },
    ]
}

async fn spawn_app_with(config: Config, host: Arc<dyn ImageHost>) -> Router {
    let shared = SharedState::new(config)
        .await
        .expect("Failed to create shared state")
        .with_image_host(host);
    let state = api::create_app_state(Arc::new(shared), None);
    api::router(state)
}

async fn spawn_app() -> Router {
    spawn_app_with(test_config(admins()), Arc::new(StubImageHost)).await
}

fn login_request(email: &str, password: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/auth/login")
        .header("Content-Type", "application/json")
        .body(Body::from(
            serde_json::json!({ "email": email, "password": password }).to_string(),
        ))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn login_success_sets_the_session_cookie() {
    let app = spawn_app().await;

    let response = app
        .oneshot(login_request("ed@example.com", "hunter2"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("login should set a cookie")
        .to_str()
        .unwrap()
        .to_string();

    assert!(cookie.starts_with("admin_email=ed@example.com"));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("SameSite=Strict"));
    assert!(cookie.contains("Max-Age=604800"));
    // secure_cookies is off in the test config
    assert!(!cookie.contains("Secure"));

    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["user"]["email"], "ed@example.com");
    assert_eq!(body["user"]["name"], "Ed Itor");
}

#[tokio::test]
async fn login_missing_fields_is_a_bad_request() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("Content-Type", "application/json")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_email_and_wrong_password_share_one_message() {
    let app = spawn_app().await;

    let unknown = app
        .clone()
        .oneshot(login_request("ghost@example.com", "hunter2"))
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = body_json(unknown).await;

    let wrong = app
        .oneshot(login_request("ed@example.com", "wrong-password"))
        .await
        .unwrap();
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_body = body_json(wrong).await;

    assert_eq!(unknown_body["error"], wrong_body["error"]);
    assert_eq!(wrong_body["error"], "Invalid email or password");
}

#[tokio::test]
async fn sixth_attempt_in_the_window_is_rate_limited() {
    let app = spawn_app().await;

    for _ in 0..5 {
        let response = app
            .clone()
            .oneshot(login_request("ed@example.com", "wrong-password"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused once the window is spent.
    let response = app
        .oneshot(login_request("ed@example.com", "hunter2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn rate_limit_windows_are_per_email() {
    let app = spawn_app().await;

    for _ in 0..6 {
        let _ = app
            .clone()
            .oneshot(login_request("ed@example.com", "wrong-password"))
            .await
            .unwrap();
    }

    let response = app
        .oneshot(login_request("pat@example.com", "swordfish"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn gate_redirects_without_a_cookie() {
    let app = spawn_app().await;

    for uri in ["/api/dashboard/posts", "/dashboard", "/dashboard/blogs/create"] {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert!(
            response.status().is_redirection(),
            "{uri} should redirect, got {}",
            response.status()
        );
        assert_eq!(
            response.headers().get(header::LOCATION).unwrap(),
            "/login"
        );
    }
}

#[tokio::test]
async fn gate_passes_an_authorized_cookie() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/posts")
                .header(header::COOKIE, "admin_email=ed@example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn gate_rejects_a_cookie_for_an_unknown_identity() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/posts")
                .header(header::COOKIE, "admin_email=ghost@example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_redirection());
}

#[tokio::test]
async fn a_removed_admin_loses_access_with_no_revocation_step() {
    // Cookie issued while ed was on the allow-list...
    let app = spawn_app().await;
    let response = app
        .oneshot(login_request("ed@example.com", "hunter2"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // ...stops working against a process whose config dropped ed.
    let remaining = vec![admins().remove(1)];
    let app = spawn_app_with(test_config(remaining), Arc::new(StubImageHost)).await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/posts")
                .header(header::COOKIE, "admin_email=ed@example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_redirection());
}

#[tokio::test]
async fn logout_expires_the_cookie() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/logout")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(cookie.starts_with("admin_email=;"));
    assert!(cookie.contains("Max-Age=0"));
}

fn multipart_upload(uri: &str, filename: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "inkroll-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; \
             filename=\"{filename}\"\r\nContent-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, "admin_email=ed@example.com")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={boundary}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn upload_returns_the_hosted_url() {
    let app = spawn_app().await;

    let response = app
        .oneshot(multipart_upload(
            "/api/dashboard/uploads",
            "cover.jpg",
            b"jpeg-bytes",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["url"], "https://img.test/cover.jpg");
}

#[tokio::test]
async fn upload_failure_hides_host_internals() {
    let app = spawn_app_with(test_config(admins()), Arc::new(FailingImageHost)).await;

    let response = app
        .oneshot(multipart_upload(
            "/api/dashboard/uploads",
            "cover.jpg",
            b"jpeg-bytes",
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    // The client sees which service failed, never the raw error detail.
    assert_eq!(body["error"], "StubHost service is unavailable");
}

#[tokio::test]
async fn upload_requires_a_file_field() {
    let app = spawn_app().await;

    let boundary = "inkroll-test-boundary";
    let body = format!(
        "--{boundary}\r\nContent-Disposition: form-data; name=\"other\"\r\n\r\nvalue\r\n--{boundary}--\r\n"
    );

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/dashboard/uploads")
                .header(header::COOKIE, "admin_email=ed@example.com")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={boundary}"),
                )
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn dashboard_status_reports_the_post_count() {
    let app = spawn_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/dashboard/status")
                .header(header::COOKIE, "admin_email=ed@example.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["posts"], 0);
    assert_eq!(body["data"]["database"], true);
}
