//! Component endpoint handlers.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use persistence::repositories::{ComponentRepository, ComponentUpdate};
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use domain::models::component::{Component, CreateComponentRequest, UpdateComponentRequest};
use domain::models::{ListParams, ListResponse};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::SessionUser;

/// List components.
///
/// GET /api/v1/components?limit=&offset=&accountId=
pub async fn get_components(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse<Component>>, ApiError> {
    let repo = ComponentRepository::new(state.pool.clone());
    let entities = repo
        .list(params.account_id, params.limit(), params.offset())
        .await?;
    let total = repo.count(params.account_id).await?;

    let data = entities.into_iter().map(Component::from).collect();
    Ok(Json(ListResponse::new(data, total, &params)))
}

/// Get a single component.
///
/// GET /api/v1/components/:id
pub async fn get_component(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Component>, ApiError> {
    let entity = ComponentRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Component not found".to_string()))?;

    Ok(Json(entity.into()))
}

/// Create a component.
///
/// POST /api/v1/components
pub async fn create_component(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Json(request): Json<CreateComponentRequest>,
) -> Result<(StatusCode, Json<Component>), ApiError> {
    request.validate()?;

    let entity = ComponentRepository::new(state.pool.clone())
        .create(
            request.account_id,
            &request.name,
            &request.component_type,
            &request.properties,
        )
        .await?;
    let component: Component = entity.into();

    info!(
        component_id = %component.id,
        component_type = %component.component_type,
        user_id = %session.user_id,
        "Component created"
    );

    Ok((StatusCode::CREATED, Json(component)))
}

/// Update a component addressed by `id` in the body.
///
/// PUT /api/v1/components
pub async fn update_component(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Json(request): Json<UpdateComponentRequest>,
) -> Result<Json<Component>, ApiError> {
    request.validate()?;

    let update = ComponentUpdate {
        name: request.name,
        component_type: request.component_type,
        properties: request.properties,
    };
    let entity = ComponentRepository::new(state.pool.clone())
        .update(request.id, &update)
        .await?
        .ok_or_else(|| ApiError::NotFound("Component not found".to_string()))?;

    info!(component_id = %entity.id, user_id = %session.user_id, "Component updated");

    Ok(Json(entity.into()))
}

/// Delete a component.
///
/// DELETE /api/v1/components/:id
pub async fn delete_component(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = ComponentRepository::new(state.pool.clone())
        .delete(id)
        .await?;
    if deleted == 0 {
        return Err(ApiError::NotFound("Component not found".to_string()));
    }

    info!(component_id = %id, user_id = %session.user_id, "Component deleted");

    Ok(StatusCode::NO_CONTENT)
}
