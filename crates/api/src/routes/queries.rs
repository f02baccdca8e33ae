//! Query endpoint handlers.

use axum::{
    extract::{Path, Query as QueryParams, State},
    http::StatusCode,
    Extension, Json,
};
use persistence::repositories::{NewQuery, QueryRepository, QueryUpdate};
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use domain::models::query::{
    CreateQueryRequest, ExecuteQueryRequest, Query, QueryExecutionResponse, QueryTarget,
    UpdateQueryRequest,
};
use domain::models::{ListParams, ListResponse};
use domain::services::{inspect_query, TemplateError};

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::metrics::record_query_execution;
use crate::middleware::SessionUser;
use crate::services::QueryExecutor;

fn query_not_found() -> ApiError {
    ApiError::NotFound("Query not found".to_string())
}

/// Execute a stored query.
///
/// POST /api/v1/queries/execute
pub async fn execute_query(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Json(request): Json<ExecuteQueryRequest>,
) -> Result<Json<QueryExecutionResponse>, ApiError> {
    let target = request.target().map_err(ApiError::Validation)?;
    if let Some(key) = request.first_null_param() {
        return Err(TemplateError::NullParam(key.to_string()).into());
    }

    let repo = QueryRepository::new(state.pool.clone());
    let entity = match &target {
        QueryTarget::Id(id) => repo.find_by_id(*id).await?,
        QueryTarget::Name(name) => repo.find_by_name(name).await?,
    }
    .ok_or_else(query_not_found)?;
    let query: Query = entity.into();

    let outcome = QueryExecutor::new(state.pool.clone())
        .execute(&query, &request.params)
        .await;
    record_query_execution(outcome.is_ok());

    let outcome = outcome.map_err(|e| {
        warn!(query_id = %query.id, error = %e, "Query execution failed");
        e
    })?;

    info!(
        query_id = %query.id,
        row_count = outcome.row_count,
        duration_ms = outcome.duration_ms,
        user_id = %session.user_id,
        "Query executed"
    );

    Ok(Json(QueryExecutionResponse {
        query_id: query.id,
        rows: outcome.rows,
        row_count: outcome.row_count,
        duration_ms: outcome.duration_ms,
    }))
}

/// List queries ordered by name.
///
/// GET /api/v1/queries?limit=&offset=&accountId=
pub async fn list_queries(
    State(state): State<AppState>,
    QueryParams(params): QueryParams<ListParams>,
) -> Result<Json<ListResponse<Query>>, ApiError> {
    let repo = QueryRepository::new(state.pool.clone());
    let entities = repo
        .list(params.account_id, params.limit(), params.offset())
        .await?;
    let total = repo.count(params.account_id).await?;

    let data = entities.into_iter().map(Query::from).collect();
    Ok(Json(ListResponse::new(data, total, &params)))
}

/// Get a single query.
///
/// GET /api/v1/queries/:id
pub async fn get_query(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Query>, ApiError> {
    let entity = QueryRepository::new(state.pool.clone())
        .find_by_id(id)
        .await?
        .ok_or_else(query_not_found)?;

    Ok(Json(entity.into()))
}

/// Create a query. Invalid definitions are stored with `isValid = false`.
///
/// POST /api/v1/queries
pub async fn create_query(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Json(request): Json<CreateQueryRequest>,
) -> Result<(StatusCode, Json<Query>), ApiError> {
    request.validate()?;

    let name = request.name.trim().to_string();
    let inspection = inspect_query(&name, &request.body);

    let new_query = NewQuery {
        account_id: request.account_id,
        page_id: request.page_id,
        name,
        query_type: request.query_type.as_str().to_string(),
        body: request.body,
        timeout_ms: request.timeout_ms,
        is_valid: inspection.is_valid,
        invalids: inspection.invalids,
        template_keys: inspection.template_keys,
    };
    let query: Query = QueryRepository::new(state.pool.clone())
        .create(&new_query)
        .await?
        .into();

    info!(
        query_id = %query.id,
        name = %query.name,
        is_valid = query.is_valid,
        user_id = %session.user_id,
        "Query created"
    );

    Ok((StatusCode::CREATED, Json(query)))
}

/// Update a query addressed by `id` in the body.
///
/// PUT /api/v1/queries
pub async fn update_query(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Json(request): Json<UpdateQueryRequest>,
) -> Result<Json<Query>, ApiError> {
    request.validate()?;

    let repo = QueryRepository::new(state.pool.clone());
    let existing = repo.find_by_id(request.id).await?.ok_or_else(query_not_found)?;

    // Validity is derived from the merged name and body.
    let name = request.name.map(|n| n.trim().to_string());
    let inspection = inspect_query(
        name.as_deref().unwrap_or(&existing.name),
        request.body.as_deref().unwrap_or(&existing.body),
    );

    let update = QueryUpdate {
        page_id: request.page_id,
        name,
        query_type: request.query_type.map(|t| t.as_str().to_string()),
        body: request.body,
        timeout_ms: request.timeout_ms,
        is_valid: inspection.is_valid,
        invalids: inspection.invalids,
        template_keys: inspection.template_keys,
    };
    let query: Query = repo
        .update(request.id, &update)
        .await?
        .ok_or_else(query_not_found)?
        .into();

    info!(
        query_id = %query.id,
        is_valid = query.is_valid,
        user_id = %session.user_id,
        "Query updated"
    );

    Ok(Json(query))
}

/// Delete a query.
///
/// DELETE /api/v1/queries/:id
pub async fn delete_query(
    State(state): State<AppState>,
    Extension(session): Extension<SessionUser>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    let deleted = QueryRepository::new(state.pool.clone()).delete(id).await?;
    if deleted == 0 {
        return Err(query_not_found());
    }

    info!(query_id = %id, user_id = %session.user_id, "Query deleted");

    Ok(StatusCode::NO_CONTENT)
}
