//! Integration tests for the middleware chain and request validation.
//!
//! Every request here is rejected before it reaches the datastore, so these
//! run without PostgreSQL.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use common::{create_test_app, empty_request, json_request, lazy_pool, parse_response_body, session_cookie};

#[tokio::test]
async fn test_liveness_is_public() {
    let app = create_test_app(lazy_pool());

    let response = app
        .oneshot(empty_request(Method::GET, "/api/health/live", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "alive");
}

#[tokio::test]
async fn test_api_requires_session_cookie() {
    let app = create_test_app(lazy_pool());

    for uri in [
        "/api/v1/components",
        "/api/v1/queries",
        "/api/v1/pages",
        "/api/v1/accounts",
        "/api/v1/roles",
    ] {
        let response = app
            .clone()
            .oneshot(empty_request(Method::GET, uri, None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{}", uri);
        let body = parse_response_body(response).await;
        assert_eq!(body["error"], "unauthorized");
        assert_eq!(body["message"], "Missing session");
    }
}

#[tokio::test]
async fn test_api_rejects_invalid_session_token() {
    let app = create_test_app(lazy_pool());

    let response = app
        .oneshot(empty_request(
            Method::GET,
            "/api/v1/components",
            Some("session=not-a-token"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Invalid or expired session");
}

#[tokio::test]
async fn test_unsupported_method_is_rejected() {
    let app = create_test_app(lazy_pool());
    let cookie = session_cookie(Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            Method::PATCH,
            "/api/v1/components",
            json!({}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn test_create_component_requires_name() {
    let app = create_test_app(lazy_pool());
    let cookie = session_cookie(Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/components",
            json!({"name": "", "componentType": "table"}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
    assert!(body["message"].as_str().unwrap().contains("name"));
}

#[tokio::test]
async fn test_create_component_requires_object_properties() {
    let app = create_test_app(lazy_pool());
    let cookie = session_cookie(Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/components",
            json!({"name": "usersTable", "componentType": "table", "properties": [1, 2]}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_query_requires_name() {
    let app = create_test_app(lazy_pool());
    let cookie = session_cookie(Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/queries",
            json!({"name": "   ", "body": "SELECT 1"}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert!(body["message"].as_str().unwrap().contains("Name is required"));
}

#[tokio::test]
async fn test_execute_query_with_id_and_name_is_rejected() {
    let app = create_test_app(lazy_pool());
    let cookie = session_cookie(Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/queries/execute",
            json!({"id": Uuid::new_v4(), "name": "listUsers"}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Provide either id or name, not both");
}

#[tokio::test]
async fn test_execute_query_without_target_is_rejected() {
    let app = create_test_app(lazy_pool());
    let cookie = session_cookie(Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/queries/execute",
            json!({"params": {}}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_execute_query_rejects_null_param() {
    let app = create_test_app(lazy_pool());
    let cookie = session_cookie(Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/queries/execute",
            json!({"name": "listUsers", "params": {"email": null}}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = parse_response_body(response).await;
    assert_eq!(body["message"], "Parameter 'email' must not be null");
}

#[tokio::test]
async fn test_create_page_rejects_bad_slug() {
    let app = create_test_app(lazy_pool());
    let cookie = session_cookie(Uuid::new_v4());

    let response = app
        .oneshot(json_request(
            Method::POST,
            "/api/v1/pages",
            json!({"name": "Users", "slug": "Not A Slug"}),
            Some(&cookie),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = create_test_app(lazy_pool());

    let request = axum::http::Request::builder()
        .uri("/api/health/live")
        .header("X-Request-ID", "req-123")
        .body(axum::body::Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "req-123"
    );
}

#[tokio::test]
async fn test_request_id_is_generated() {
    let app = create_test_app(lazy_pool());

    let response = app
        .oneshot(empty_request(Method::GET, "/api/health/live", None))
        .await
        .unwrap();

    let request_id = response.headers().get("x-request-id").unwrap();
    assert!(Uuid::parse_str(request_id.to_str().unwrap()).is_ok());
}
