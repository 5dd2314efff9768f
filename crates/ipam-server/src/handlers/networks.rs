use crate::{
    db::Database,
    error::ApiError,
    handlers::branch_id_param,
    models::NetworkSummary,
};
use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct NetworkQuery {
    /// Branch whose addresses are summarized
    pub branch_id: Option<String>,
}

/// Summarize a branch's addresses by /24 network
#[utoipa::path(
    get,
    path = "/api/networks",
    tag = "networks",
    params(NetworkQuery),
    responses(
        (status = 200, description = "Networks of the branch", body = Vec<NetworkSummary>),
        (status = 400, description = "Missing or invalid branch ID"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_networks(
    State(db): State<Arc<Database>>,
    Query(query): Query<NetworkQuery>,
) -> Result<Json<Vec<NetworkSummary>>, ApiError> {
    let branch_id = branch_id_param(query.branch_id.as_deref())?;
    Ok(Json(db.list_networks(branch_id).await?))
}
