//! Security Test Suite
//!
//! Validates the hardening of the web interface and of names derived from
//! catalog content: response headers, file name sanitization, identifier
//! limits and HTML-unsafe catalog text.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use geo_catalog::utils::validation::{
    validate_filename, ValidationError, MAX_IDENTIFIER_LENGTH,
};
use geo_catalog::web::server::{build_app, AppState};
use geo_catalog::CatalogSource;
use tower::ServiceExt;

fn embedded_app() -> axum::Router {
    build_app(Arc::new(AppState::new(CatalogSource::Embedded)))
}

/// Test filename validation and sanitization
#[test]
fn test_filename_validation_security() {
    let traversal_attempts = vec![
        "../etc/passwd",
        "..\\windows\\system32",
        "test/../../secret",
        "normal/../../../etc/passwd",
        "..\\..\\..\\windows\\system.ini",
    ];

    for attempt in traversal_attempts {
        match validate_filename(attempt) {
            Err(ValidationError::InvalidFilename) => {}
            Ok(_) => panic!("Directory traversal attempt '{attempt}' should have been blocked"),
            Err(e) => panic!("Unexpected error for '{attempt}': {e:?}"),
        }
    }

    let null_byte_attempts = vec!["test\0.py", "normal.py\0", "file\x00name.py"];
    for attempt in null_byte_attempts {
        assert!(
            validate_filename(attempt).is_err(),
            "Null byte attempt {attempt:?} should have been blocked"
        );
    }

    // Header injection through a dataset id must not survive sanitization
    let sanitized = validate_filename("roads\"; filename=evil.sh_schema_arcpy.py").unwrap();
    assert!(!sanitized.contains('"'));
    assert!(!sanitized.contains(';'));
    assert!(!sanitized.contains('='));
}

/// Every response carries the browser protection headers
#[tokio::test]
async fn test_security_headers_present() {
    let response = embedded_app()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["x-content-type-options"], "nosniff");
    assert_eq!(headers["x-frame-options"], "DENY");
    assert_eq!(headers["referrer-policy"], "strict-origin-when-cross-origin");
    assert!(headers[header::CONTENT_TYPE]
        .to_str()
        .unwrap()
        .starts_with("text/html"));
}

/// Oversized identifiers are rejected before lookup
#[tokio::test]
async fn test_oversized_identifier_rejected() {
    let long_id = "x".repeat(MAX_IDENTIFIER_LENGTH + 1);
    let response = embedded_app()
        .oneshot(
            Request::builder()
                .uri(format!("/api/datasets/{long_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

/// Unknown routes do not leak anything
#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = embedded_app()
        .oneshot(
            Request::builder()
                .uri("/static/../Cargo.toml")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Error bodies never include internal details
#[tokio::test]
async fn test_load_errors_are_not_disclosed() {
    let dir = tempfile::tempdir().unwrap();
    let secret_path = dir.path().join("secret-location.json");
    let app = build_app(Arc::new(AppState::new(CatalogSource::File(secret_path))));

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/catalog")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(!text.contains("secret-location"));
    assert!(!text.contains("No such file"));
}
