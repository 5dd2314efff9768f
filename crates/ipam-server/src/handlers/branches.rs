use crate::{
    db::{is_unique_violation, Database},
    error::ApiError,
    handlers::{json_body, required_name},
    models::{Branch, CreateNamed},
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

/// List all branches with their address counts
#[utoipa::path(
    get,
    path = "/api/branches",
    tag = "branches",
    responses(
        (status = 200, description = "List of branches", body = Vec<Branch>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_branches(State(db): State<Arc<Database>>) -> Result<Json<Vec<Branch>>, ApiError> {
    Ok(Json(db.list_branches().await?))
}

/// Create a branch
#[utoipa::path(
    post,
    path = "/api/branches",
    tag = "branches",
    request_body = CreateNamed,
    responses(
        (status = 201, description = "Branch created", body = Branch),
        (status = 400, description = "Bad request"),
        (status = 409, description = "Branch name already used"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_branch(
    State(db): State<Arc<Database>>,
    payload: Result<Json<CreateNamed>, JsonRejection>,
) -> Result<(StatusCode, Json<Branch>), ApiError> {
    let body = json_body(payload)?;
    let name = required_name(&body.name)?;

    let id = db.create_branch(name).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("Branch already exists".to_string())
        } else {
            e.into()
        }
    })?;
    info!("Created branch {} ({})", name, id);

    Ok((
        StatusCode::CREATED,
        Json(Branch {
            id,
            name: name.to_string(),
            ip_count: 0,
        }),
    ))
}
