//! OAuth login, logout and profile handlers.

use axum::{
    extract::{Path, Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use persistence::repositories::{RoleRepository, UserRepository};
use serde::{Deserialize, Serialize};
use tracing::info;

use domain::models::user::{User, UserProfileResponse};
use shared::crypto::{generate_nonce, sign_state, verify_state};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_login;
use crate::middleware::SessionUser;
use crate::services::{CookieHelper, OAuthError};

/// Provider entry on the login page.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginProvider {
    pub name: String,
    pub auth_url: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub providers: Vec<LoginProvider>,
}

/// Query parameters the provider sends to the callback URL.
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// List the identity providers users can sign in with.
///
/// GET /login
pub async fn login(State(state): State<AppState>) -> Json<LoginResponse> {
    let providers = state
        .providers
        .names()
        .map(|name| LoginProvider {
            name: name.to_string(),
            auth_url: format!("/auth/{}", name),
        })
        .collect();

    Json(LoginResponse { providers })
}

/// Start the OAuth flow by redirecting to the provider.
///
/// GET /auth/:provider
pub async fn initiate_auth(
    State(state): State<AppState>,
    Path(provider_name): Path<String>,
) -> Result<Response, ApiError> {
    let provider = state.providers.get(&provider_name)?;

    let oauth_state = sign_state(&state.config.auth.session_secret, &generate_nonce());
    let authorization_url = provider.authorization_url(&oauth_state)?;

    let mut headers = HeaderMap::new();
    CookieHelper::append(&mut headers, &[state.cookies.build_state_cookie(&oauth_state)]);

    Ok((headers, Redirect::to(&authorization_url)).into_response())
}

/// Complete the OAuth flow and establish a session.
///
/// GET /auth/:provider/callback
pub async fn auth_callback(
    State(state): State<AppState>,
    Path(provider_name): Path<String>,
    Query(params): Query<CallbackParams>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let provider = state.providers.get(&provider_name)?;

    if let Some(error) = params.error {
        return Err(OAuthError::Denied(error).into());
    }
    let code = params
        .code
        .filter(|c| !c.is_empty())
        .ok_or(OAuthError::MissingParameter("code"))?;
    let returned_state = params
        .state
        .filter(|s| !s.is_empty())
        .ok_or(OAuthError::MissingParameter("state"))?;

    let cookie_state = state.cookies.extract_state(&headers);
    if cookie_state != Some(returned_state.as_str())
        || verify_state(&state.config.auth.session_secret, &returned_state).is_none()
    {
        return Err(OAuthError::StateMismatch.into());
    }

    let identity = provider.exchange_code(&code).await?;

    let user_repo = UserRepository::new(state.pool.clone());
    let user: User = user_repo.upsert_from_identity(&identity).await?.into();

    let token = state
        .sessions
        .issue(user.id, &user.email, identity.provider.as_str())?;

    record_login(identity.provider.as_str());
    info!(user_id = %user.id, provider = %identity.provider, "User logged in");

    let mut response_headers = HeaderMap::new();
    CookieHelper::append(
        &mut response_headers,
        &[
            state.cookies.build_session_cookie(&token),
            state.cookies.build_clear_state_cookie(),
        ],
    );

    Ok((
        response_headers,
        Redirect::to(&state.config.auth.post_login_redirect),
    )
        .into_response())
}

/// End the session.
///
/// GET /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> Response {
    if let Ok(user) = SessionUser::from_headers(&state, &headers) {
        info!(user_id = %user.user_id, "User logged out");
    }

    let mut response_headers = HeaderMap::new();
    CookieHelper::append(
        &mut response_headers,
        &[state.cookies.build_clear_session_cookie()],
    );

    (response_headers, Redirect::to("/login")).into_response()
}

/// Profile of the signed-in user.
///
/// GET /profile
pub async fn profile(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<UserProfileResponse>, ApiError> {
    let session = SessionUser::from_headers(&state, &headers)
        .map_err(|message| ApiError::Unauthorized(message.to_string()))?;

    let user: User = UserRepository::new(state.pool.clone())
        .find_by_id(session.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("User no longer exists".to_string()))?
        .into();

    let role = match user.role_id {
        Some(role_id) => RoleRepository::new(state.pool.clone())
            .find_by_id(role_id)
            .await?
            .map(|r| r.name),
        None => None,
    };

    Ok(Json(UserProfileResponse::new(user, role)))
}
