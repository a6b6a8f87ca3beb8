//! Web API integration tests
//!
//! End-to-end tests for the upload, info and download endpoints.

use axum::http::StatusCode;
use axum_test::{TestResponse, TestServer};
use serde_json::Value;
use sharebin_server::config::{ApiConfig, Config, ServerConfig, StorageConfig};
use sharebin_server::server::{build_router, build_state};
use tempfile::TempDir;

const HELLO_ID: &str = "5d41402abc4b2a76b9719d911017c592";

/// Create a test configuration rooted in a temp directory.
fn create_test_config(root: &std::path::Path) -> Config {
    Config {
        server: ServerConfig {
            bind_addr: "127.0.0.1:0".to_string(),
        },
        api: ApiConfig::default(),
        storage: StorageConfig {
            uploads_dir: root.join("uploads"),
            catalog_db: root.join("catalog.db"),
            storage_limit: 200_000,
            file_limit: 50_000,
        },
    }
}

fn create_test_server() -> (TempDir, TestServer) {
    let temp_dir = tempfile::tempdir().expect("create temp dir");
    let config = create_test_config(temp_dir.path());
    let state = build_state(&config).expect("build server state");
    let server = TestServer::new(build_router(state)).expect("create test server");
    (temp_dir, server)
}

/// Hand-rolled multipart request body with a single form field.
fn multipart_body(
    field_name: &str,
    file_name: &str,
    content_type: &str,
    content: &[u8],
) -> (String, Vec<u8>) {
    let boundary = "sharebin-test-boundary";
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{field_name}\"; filename=\"{file_name}\"\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{boundary}--\r\n").as_bytes());

    (format!("multipart/form-data; boundary={boundary}"), body)
}

async fn upload(
    server: &TestServer,
    file_name: &str,
    content_type: &str,
    content: &[u8],
) -> TestResponse {
    let (mime, body) = multipart_body("file", file_name, content_type, content);
    server
        .post("/api/v1/upload")
        .content_type(&mime)
        .bytes(body.into())
        .await
}

#[tokio::test]
async fn upload_returns_created_with_download_location() {
    let (_tmp, server) = create_test_server();

    let response = upload(&server, "a.txt", "text/plain", b"hello").await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
    assert_eq!(
        response.header("location"),
        format!("/api/v1/download/{HELLO_ID}")
    );
}

#[tokio::test]
async fn info_reflects_stored_files() {
    let (_tmp, server) = create_test_server();

    upload(&server, "a.txt", "text/plain", b"hello").await;

    let response = server.get("/api/v1/info").await;
    assert_eq!(response.status_code(), StatusCode::OK);

    let info: Value = response.json();
    assert_eq!(info["total_files"], 1);
    assert_eq!(info["total_bytes"], 5);
}

#[tokio::test]
async fn download_round_trip() {
    let (_tmp, server) = create_test_server();

    upload(&server, "a.txt", "text/plain", b"hello").await;

    let response = server.get(&format!("/api/v1/download/{HELLO_ID}")).await;
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(response.header("content-type"), "text/plain");
    assert_eq!(response.header("content-length"), "5");
    assert_eq!(
        response.header("content-disposition"),
        "attachment; filename=\"a.txt\""
    );
    assert_eq!(response.as_bytes().as_ref(), b"hello".as_slice());
}

#[tokio::test]
async fn identical_reupload_deduplicates_and_renames() {
    let (_tmp, server) = create_test_server();

    let first = upload(&server, "a.txt", "text/plain", b"hello").await;
    assert_eq!(first.status_code(), StatusCode::CREATED);

    let second = upload(&server, "b.txt", "text/plain", b"hello").await;
    assert_eq!(second.status_code(), StatusCode::CREATED);
    assert_eq!(second.header("location"), first.header("location"));

    let info: Value = server.get("/api/v1/info").await.json();
    assert_eq!(info["total_files"], 1);
    assert_eq!(info["total_bytes"], 5);

    let download = server.get(&format!("/api/v1/download/{HELLO_ID}")).await;
    assert_eq!(
        download.header("content-disposition"),
        "attachment; filename=\"b.txt\""
    );
}

#[tokio::test]
async fn accepts_jpeg_with_valid_markers() {
    let (_tmp, server) = create_test_server();

    let response = upload(
        &server,
        "photo.jpg",
        "image/jpeg",
        &[0xFF, 0xD8, 0x00, 0x00, 0xFF, 0xD9],
    )
    .await;
    assert_eq!(response.status_code(), StatusCode::CREATED);
}

#[tokio::test]
async fn oversized_upload_is_rejected() {
    let (_tmp, server) = create_test_server();

    let body = vec![b'a'; 50_001];
    let response = upload(&server, "big.txt", "text/plain", &body).await;
    assert_eq!(response.status_code(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn mismatched_signature_is_rejected() {
    let (_tmp, server) = create_test_server();

    let response = upload(&server, "fake.png", "image/png", b"not a png").await;
    assert_eq!(response.status_code(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
}

#[tokio::test]
async fn missing_file_field_is_rejected() {
    let (_tmp, server) = create_test_server();

    let (mime, body) = multipart_body("other", "a.txt", "text/plain", b"hello");
    let response = server
        .post("/api/v1/upload")
        .content_type(&mime)
        .bytes(body.into())
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn empty_file_name_is_rejected() {
    let (_tmp, server) = create_test_server();

    let response = upload(&server, "", "text/plain", b"hello").await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let (_tmp, server) = create_test_server();

    let response = server
        .get("/api/v1/download/ffffffffffffffffffffffffffffffff")
        .await;
    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
}
