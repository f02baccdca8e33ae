//! Account endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use persistence::repositories::AccountRepository;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::account::{Account, CreateAccountRequest, UpdateAccountRequest};
use domain::models::{ListParams, ListResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::SessionUser;

/// List accounts.
///
/// GET /api/v1/accounts?limit=&offset=
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<Account>>, ApiError> {
    let repo = AccountRepository::new(state.pool.clone());
    let entities = repo.list(params.limit(), params.offset()).await?;
    let total = repo.count().await?;

    let data = entities.into_iter().map(Account::from).collect();
    Ok(Json(ListResponse::new(data, total, &params)))
}

/// Get a single account.
///
/// GET /api/v1/accounts/:id
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Account>, ApiError> {
    let entity = AccountRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    Ok(Json(entity.into()))
}

/// Create an account.
///
/// POST /api/v1/accounts
pub async fn create_account(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<Account>), ApiError> {
    request.validate()?;

    let entity = AccountRepository::new(state.pool.clone())
        .create(&request.name, request.domain.as_deref())
        .await?;
    let account: Account = entity.into();

    info!(account_id = %account.id, user_id = %session.user_id, "Account created");

    Ok((StatusCode::CREATED, Json(account)))
}

/// Update an account addressed by `id` in the body.
///
/// PUT /api/v1/accounts
pub async fn update_account(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<Account>, ApiError> {
    request.validate()?;

    let entity = AccountRepository::new(state.pool.clone())
        .update(request.id, request.name.as_deref(), request.domain.as_deref())
        .await?
        .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

    info!(account_id = %entity.id, user_id = %session.user_id, "Account updated");

    Ok(Json(entity.into()))
}

/// Delete an account. Users and records in it are detached, not deleted.
///
/// DELETE /api/v1/accounts/:id
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = AccountRepository::new(state.pool.clone()).delete(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Account not found".to_string()));
    }

    info!(account_id = %id, user_id = %session.user_id, "Account deleted");

    Ok(StatusCode::NO_CONTENT)
}
