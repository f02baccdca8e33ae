//! Role endpoint handlers.

use axum::{extract::State, Json};
use persistence::repositories::RoleRepository;

use domain::models::Role;

use crate::app::AppState;
use crate::error::ApiError;

/// List the seeded roles.
///
/// GET /api/v1/roles
pub async fn list_roles(State(state): State<AppState>) -> Result<Json<Vec<Role>>, ApiError> {
    let roles = RoleRepository::new(state.pool.clone())
        .list()
        .await?
        .into_iter()
        .map(Role::from)
        .collect();

    Ok(Json(roles))
}
