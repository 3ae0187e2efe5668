mod common;

use common::{http_response, MockService};
use serde_json::json;
use tiny_squeeze::tinify::METADATA_FIELDS;
use tiny_squeeze::{CompressionError, Compressor, TinifyClient, TinifyOptions};

// base64 of "api:test-key"
const AUTHORIZATION: &str = "Basic YXBpOnRlc3Qta2V5";

fn client_for(service: &MockService) -> TinifyClient {
    TinifyClient::new(TinifyOptions::new("test-key", Some(service.url.clone()))).unwrap()
}

#[test]
fn test_compress_uploads_then_downloads_result() {
    let service = MockService::bind();
    let client = client_for(&service);
    let location = format!("{}/output/abc123", service.url);
    let server = service.serve(vec![
        http_response(
            "201 Created",
            &[("Location", location.as_str()), ("Compression-Count", "42")],
            br#"{"input":{"size":15},"output":{"size":10}}"#,
        ),
        http_response("200 OK", &[("Content-Type", "image/jpeg")], b"tiny bytes"),
    ]);

    let compressed = client.compress(b"raw image bytes", &[]).unwrap();

    assert_eq!(compressed, b"tiny bytes");
    assert_eq!(client.compression_count(), Some(42));

    let requests = server.join().unwrap();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/shrink");
    assert_eq!(requests[0].body, b"raw image bytes");
    assert_eq!(requests[0].header("authorization"), Some(AUTHORIZATION));
    assert_eq!(requests[1].method, "GET");
    assert_eq!(requests[1].path, "/output/abc123");
    assert_eq!(requests[1].header("authorization"), Some(AUTHORIZATION));
    assert!(requests[1].body.is_empty());
}

#[test]
fn test_compress_with_metadata_posts_preserve_fields() {
    let service = MockService::bind();
    let client = client_for(&service);
    let location = format!("{}/output/abc123", service.url);
    let server = service.serve(vec![
        http_response("201 Created", &[("Location", location.as_str())], b""),
        http_response("200 OK", &[], b"tiny bytes with copyright"),
    ]);

    let compressed = client.compress(b"raw image bytes", METADATA_FIELDS).unwrap();

    assert_eq!(compressed, b"tiny bytes with copyright");
    assert_eq!(client.compression_count(), None);

    let requests = server.join().unwrap();
    assert_eq!(requests[1].method, "POST");
    assert_eq!(requests[1].path, "/output/abc123");
    assert_eq!(requests[1].header("content-type"), Some("application/json"));
    let payload: serde_json::Value = serde_json::from_slice(&requests[1].body).unwrap();
    assert_eq!(payload, json!({ "preserve": ["copyright", "creation"] }));
}

#[test]
fn test_rejected_key_is_account_error() {
    let service = MockService::bind();
    let client = client_for(&service);
    let server = service.serve(vec![http_response(
        "401 Unauthorized",
        &[("Content-Type", "application/json")],
        br#"{"error":"Unauthorized","message":"Credentials are invalid."}"#,
    )]);

    let result = client.compress(b"raw image bytes", &[]);

    match result {
        Err(CompressionError::Account(detail)) => {
            assert_eq!(detail, "Unauthorized: Credentials are invalid. (HTTP 401)");
        }
        other => panic!("expected an account error, got {:?}", other),
    }
    assert_eq!(server.join().unwrap().len(), 1);
}

#[test]
fn test_unsupported_image_is_client_error() {
    let service = MockService::bind();
    let client = client_for(&service);
    let server = service.serve(vec![http_response(
        "415 Unsupported Media Type",
        &[("Compression-Count", "7")],
        br#"{"error":"Unsupported media type","message":"File type is not supported."}"#,
    )]);

    let result = client.compress(b"not an image", &[]);

    assert!(matches!(result, Err(CompressionError::Client(_))));
    assert_eq!(client.compression_count(), Some(7));
    server.join().unwrap();
}

#[test]
fn test_failed_download_is_server_error() {
    let service = MockService::bind();
    let client = client_for(&service);
    let location = format!("{}/output/abc123", service.url);
    let server = service.serve(vec![
        http_response("201 Created", &[("Location", location.as_str())], b""),
        http_response("503 Service Unavailable", &[], b""),
    ]);

    let result = client.compress(b"raw image bytes", &[]);

    match result {
        Err(CompressionError::Server(detail)) => assert_eq!(detail, "HTTP 503"),
        other => panic!("expected a server error, got {:?}", other),
    }
    assert_eq!(server.join().unwrap().len(), 2);
}

#[test]
fn test_missing_location_is_unknown_error() {
    let service = MockService::bind();
    let client = client_for(&service);
    let server = service.serve(vec![http_response("201 Created", &[], b"{}")]);

    let result = client.compress(b"raw image bytes", &[]);

    assert!(matches!(result, Err(CompressionError::Unknown(_))));
    assert_eq!(server.join().unwrap().len(), 1);
}

#[test]
fn test_validate_accepts_key_when_empty_upload_is_refused() {
    let service = MockService::bind();
    let client = client_for(&service);
    let server = service.serve(vec![http_response(
        "400 Bad Request",
        &[("Compression-Count", "3")],
        br#"{"error":"Input missing","message":"Input file is empty."}"#,
    )]);

    client.validate().unwrap();
    assert_eq!(client.compression_count(), Some(3));

    let requests = server.join().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, "POST");
    assert_eq!(requests[0].path, "/shrink");
    assert_eq!(requests[0].header("authorization"), Some(AUTHORIZATION));
    assert!(requests[0].body.is_empty());
}

#[test]
fn test_validate_accepts_key_over_monthly_limit() {
    let service = MockService::bind();
    let client = client_for(&service);
    let server = service.serve(vec![http_response(
        "429 Too Many Requests",
        &[],
        br#"{"error":"Too many requests","message":"Your monthly limit has been exceeded."}"#,
    )]);

    client.validate().unwrap();
    server.join().unwrap();
}

#[test]
fn test_validate_rejects_invalid_key() {
    let service = MockService::bind();
    let client = client_for(&service);
    let server = service.serve(vec![http_response(
        "401 Unauthorized",
        &[],
        br#"{"error":"Unauthorized","message":"Credentials are invalid."}"#,
    )]);

    let result = client.validate();

    assert!(matches!(result, Err(CompressionError::Account(_))));
    server.join().unwrap();
}

#[test]
fn test_validate_reports_server_error() {
    let service = MockService::bind();
    let client = client_for(&service);
    let server = service.serve(vec![http_response("500 Internal Server Error", &[], b"")]);

    let result = client.validate();

    assert!(matches!(result, Err(CompressionError::Server(_))));
    server.join().unwrap();
}
