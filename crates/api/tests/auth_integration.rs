//! Integration tests for the OAuth login flow.
//!
//! Tests that touch the users table are `#[ignore]`d and need
//! `TEST_DATABASE_URL`:
//! `cargo test --test auth_integration -- --ignored`

mod common;

use axum::http::{header, Method, StatusCode};
use tower::ServiceExt;
use uuid::Uuid;

use common::{
    cookie_pair, create_test_app, create_test_app_with_provider, create_test_pool, empty_request,
    lazy_pool, parse_response_body, session_cookie, set_cookies, unique_test_email, StubProvider,
    GOOD_CODE,
};

fn location(response: &axum::response::Response) -> String {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Starts the flow and returns the signed state from the `oauth_state` cookie.
async fn start_login(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(empty_request(Method::GET, "/auth/google", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let pair = cookie_pair(&set_cookies(&response), "oauth_state").expect("state cookie");
    pair.trim_start_matches("oauth_state=").to_string()
}

#[tokio::test]
async fn test_login_lists_providers() {
    let app = create_test_app(lazy_pool());

    let response = app
        .oneshot(empty_request(Method::GET, "/login", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["providers"][0]["name"], "google");
    assert_eq!(body["providers"][0]["authUrl"], "/auth/google");
}

#[tokio::test]
async fn test_initiate_auth_redirects_with_state_cookie() {
    let app = create_test_app(lazy_pool());

    let response = app
        .oneshot(empty_request(Method::GET, "/auth/google", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let cookies = set_cookies(&response);
    let state_cookie = cookies
        .iter()
        .find(|c| c.starts_with("oauth_state="))
        .expect("state cookie");
    assert!(state_cookie.contains("HttpOnly"));

    let state = cookie_pair(&cookies, "oauth_state")
        .unwrap()
        .trim_start_matches("oauth_state=")
        .to_string();
    assert!(location(&response).starts_with("https://idp.example.com/authorize"));
    assert!(location(&response).ends_with(&state));
}

#[tokio::test]
async fn test_unknown_provider_returns_404() {
    let app = create_test_app(lazy_pool());

    let response = app
        .oneshot(empty_request(Method::GET, "/auth/github", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_callback_with_provider_error_is_unauthorized() {
    let app = create_test_app(lazy_pool());

    let response = app
        .oneshot(empty_request(
            Method::GET,
            "/auth/google/callback?error=access_denied",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_callback_without_code_is_bad_request() {
    let app = create_test_app(lazy_pool());

    let response = app
        .oneshot(empty_request(
            Method::GET,
            "/auth/google/callback?state=abc",
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_state_mismatch_is_unauthorized() {
    let app = create_test_app(lazy_pool());
    let state = start_login(&app).await;

    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/auth/google/callback?code={}&state={}", GOOD_CODE, state),
            Some("oauth_state=something-else"),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_callback_without_state_cookie_is_unauthorized() {
    let app = create_test_app(lazy_pool());
    let state = start_login(&app).await;

    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/auth/google/callback?code={}&state={}", GOOD_CODE, state),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_callback_with_rejected_code_is_unauthorized() {
    let app = create_test_app(lazy_pool());
    let state = start_login(&app).await;

    let response = app
        .oneshot(empty_request(
            Method::GET,
            &format!("/auth/google/callback?code=bad-code&state={}", state),
            Some(&format!("oauth_state={}", state)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_logout_clears_session_and_redirects() {
    let app = create_test_app(lazy_pool());
    let cookie = session_cookie(Uuid::new_v4());

    let response = app
        .oneshot(empty_request(Method::GET, "/logout", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/login");
    let cookies = set_cookies(&response);
    let cleared = cookies
        .iter()
        .find(|c| c.starts_with("session="))
        .expect("session cookie");
    assert!(cleared.contains("Max-Age=0"));
}

#[tokio::test]
async fn test_profile_requires_session() {
    let app = create_test_app(lazy_pool());

    let response = app
        .oneshot(empty_request(Method::GET, "/profile", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn test_profile_rejects_tampered_session() {
    let app = create_test_app(lazy_pool());
    let cookie = format!("{}x", session_cookie(Uuid::new_v4()));

    let response = app
        .oneshot(empty_request(Method::GET, "/profile", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Database-backed flow
// ============================================================================

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_full_login_flow_creates_user_and_profile() {
    let pool = create_test_pool().await;
    let email = unique_test_email();
    let app = create_test_app_with_provider(pool, StubProvider::new(&email));
    let state = start_login(&app).await;

    let response = app
        .clone()
        .oneshot(empty_request(
            Method::GET,
            &format!("/auth/google/callback?code={}&state={}", GOOD_CODE, state),
            Some(&format!("oauth_state={}", state)),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile");
    let cookies = set_cookies(&response);
    let session = cookie_pair(&cookies, "session").expect("session cookie");

    let response = app
        .oneshot(empty_request(Method::GET, "/profile", Some(&session)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["email"], email);
    assert_eq!(body["provider"], "google");
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_repeat_login_reuses_user() {
    let pool = create_test_pool().await;
    let email = unique_test_email();
    let provider = StubProvider::new(&email);
    let identity = provider.identity.clone();
    let app = create_test_app_with_provider(pool.clone(), provider);

    for _ in 0..2 {
        let state = start_login(&app).await;
        let response = app
            .clone()
            .oneshot(empty_request(
                Method::GET,
                &format!("/auth/google/callback?code={}&state={}", GOOD_CODE, state),
                Some(&format!("oauth_state={}", state)),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
    }

    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM users WHERE provider = 'google' AND provider_user_id = $1",
    )
    .bind(&identity.provider_user_id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
#[ignore = "requires TEST_DATABASE_URL"]
async fn test_profile_for_deleted_user_is_unauthorized() {
    let pool = create_test_pool().await;
    let app = create_test_app(pool);
    let cookie = session_cookie(Uuid::new_v4());

    let response = app
        .oneshot(empty_request(Method::GET, "/profile", Some(&cookie)))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
