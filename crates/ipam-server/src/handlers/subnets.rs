use crate::{db::Database, error::ApiError, models::Subnet};
use axum::{extract::State, Json};
use std::sync::Arc;

/// List the subnet sizes addresses can be assigned to
#[utoipa::path(
    get,
    path = "/api/subnets",
    tag = "subnets",
    responses(
        (status = 200, description = "List of subnets", body = Vec<Subnet>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_subnets(State(db): State<Arc<Database>>) -> Result<Json<Vec<Subnet>>, ApiError> {
    Ok(Json(db.list_subnets().await?))
}
