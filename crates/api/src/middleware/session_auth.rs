//! Session authentication middleware.
//!
//! Requests under `/api/v1` must carry a valid session cookie. The cookie
//! holds an HS256 session token issued at the end of the OAuth callback.

use axum::{
    body::Body,
    extract::State,
    http::{HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;

/// Signed-in user, stored in request extensions by [`require_session`].
#[derive(Debug, Clone)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub email: String,
}

impl SessionUser {
    /// Reads and validates the session cookie.
    pub fn from_headers(state: &AppState, headers: &HeaderMap) -> Result<Self, &'static str> {
        let token = state
            .cookies
            .extract_session_token(headers)
            .ok_or("Missing session")?;

        let claims = state.sessions.validate(token).map_err(|e| {
            tracing::debug!(error = %e, "Session validation failed");
            "Invalid or expired session"
        })?;
        let user_id = claims.user_id().map_err(|_| "Invalid or expired session")?;

        Ok(SessionUser {
            user_id,
            email: claims.email,
        })
    }
}

/// Middleware that rejects requests without a valid session.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    match SessionUser::from_headers(&state, req.headers()) {
        Ok(user) => {
            req.extensions_mut().insert(user);
            next.run(req).await
        }
        Err(message) => unauthorized_response(message),
    }
}

fn unauthorized_response(message: &str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({
            "error": "unauthorized",
            "message": message
        })),
    )
        .into_response()
}
