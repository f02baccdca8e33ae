//! Page endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use persistence::repositories::{PageRepository, PageUpdate};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::page::{CreatePageRequest, Page, UpdatePageRequest};
use domain::models::{ListParams, ListResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::SessionUser;

/// Slugs are unique per account.
fn slug_conflict(err: sqlx::Error) -> ApiError {
    match ApiError::from(err) {
        ApiError::Conflict(_) => {
            ApiError::Conflict("A page with this slug already exists".to_string())
        }
        other => other,
    }
}

/// List pages.
///
/// GET /api/v1/pages?limit=&offset=&accountId=
pub async fn list_pages(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<Page>>, ApiError> {
    let repo = PageRepository::new(state.pool.clone());
    let entities = repo
        .list(params.account_id, params.limit(), params.offset())
        .await?;
    let total = repo.count(params.account_id).await?;

    let data = entities.into_iter().map(Page::from).collect();
    Ok(Json(ListResponse::new(data, total, &params)))
}

/// Get a single page.
///
/// GET /api/v1/pages/:id
pub async fn get_page(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Page>, ApiError> {
    let entity = PageRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Page not found".to_string()))?;

    Ok(Json(entity.into()))
}

/// Create a page.
///
/// POST /api/v1/pages
pub async fn create_page(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Json(request): Json<CreatePageRequest>,
) -> Result<(StatusCode, Json<Page>), ApiError> {
    request.validate()?;

    let entity = PageRepository::new(state.pool.clone())
        .create(request.account_id, &request.name, &request.slug, &request.layout)
        .await
        .map_err(slug_conflict)?;
    let page: Page = entity.into();

    info!(page_id = %page.id, slug = %page.slug, user_id = %session.user_id, "Page created");

    Ok((StatusCode::CREATED, Json(page)))
}

/// Update a page addressed by `id` in the body.
///
/// PUT /api/v1/pages
pub async fn update_page(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Json(request): Json<UpdatePageRequest>,
) -> Result<Json<Page>, ApiError> {
    request.validate()?;

    let update = PageUpdate {
        name: request.name,
        slug: request.slug,
        layout: request.layout,
    };
    let entity = PageRepository::new(state.pool.clone())
        .update(request.id, &update)
        .await
        .map_err(slug_conflict)?
        .ok_or_else(|| ApiError::NotFound("Page not found".to_string()))?;

    info!(page_id = %entity.id, user_id = %session.user_id, "Page updated");

    Ok(Json(entity.into()))
}

/// Delete a page.
///
/// DELETE /api/v1/pages/:id
pub async fn delete_page(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = PageRepository::new(state.pool.clone()).delete(id).await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Page not found".to_string()));
    }

    info!(page_id = %id, user_id = %session.user_id, "Page deleted");

    Ok(StatusCode::NO_CONTENT)
}
