use crate::{
    db::{is_foreign_key_violation, is_unique_violation, Database},
    error::ApiError,
    handlers::{branch_id_param, json_body, query_params},
    models::{
        AddressRecord, IpChange, IpPage, IpPatch, IpSearch, IpSearchResult, MessageResponse, NewIp,
    },
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use ipam_range::parse_ipv4;
use serde::Deserialize;
use std::net::Ipv4Addr;
use std::sync::Arc;
use tracing::info;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IpListQuery {
    pub branch_id: Option<String>,
    /// 1-based page number
    pub page: Option<u32>,
}

fn parse_address(input: &str) -> Result<Ipv4Addr, ApiError> {
    parse_ipv4(input).map_err(|_| ApiError::BadRequest("Invalid IP address format".to_string()))
}

/// Map write failures caused by constraints to client errors
fn write_error(err: anyhow::Error) -> ApiError {
    if is_unique_violation(&err) {
        ApiError::Conflict("IP address already exists".to_string())
    } else if is_foreign_key_violation(&err) {
        ApiError::BadRequest("Unknown branch, device type or subnet".to_string())
    } else {
        err.into()
    }
}

/// List a branch's addresses, ten per page
#[utoipa::path(
    get,
    path = "/api/ips",
    tag = "ips",
    params(IpListQuery),
    responses(
        (status = 200, description = "Page of addresses", body = IpPage),
        (status = 400, description = "Missing or invalid branch ID"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_ips(
    State(db): State<Arc<Database>>,
    Query(query): Query<IpListQuery>,
) -> Result<Json<IpPage>, ApiError> {
    let branch_id = branch_id_param(query.branch_id.as_deref())?;
    Ok(Json(db.list_ips(branch_id, query.page.unwrap_or(1)).await?))
}

/// Search, order and page a branch's addresses
#[utoipa::path(
    get,
    path = "/api/ips/search",
    tag = "ips",
    params(IpSearch),
    responses(
        (status = 200, description = "Matching addresses", body = IpSearchResult),
        (status = 400, description = "Invalid query"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn search_ips(
    State(db): State<Arc<Database>>,
    query: Result<Query<IpSearch>, QueryRejection>,
) -> Result<Json<IpSearchResult>, ApiError> {
    let search = query_params(query)?;
    if search.branch_id <= 0 {
        return Err(ApiError::BadRequest("Branch ID is required".to_string()));
    }
    Ok(Json(db.search_ips(&search).await?))
}

/// Register a single address
#[utoipa::path(
    post,
    path = "/api/ips",
    tag = "ips",
    request_body = NewIp,
    responses(
        (status = 201, description = "Address created", body = IpChange),
        (status = 400, description = "Bad request"),
        (status = 409, description = "Address already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_ip(
    State(db): State<Arc<Database>>,
    payload: Result<Json<NewIp>, JsonRejection>,
) -> Result<(StatusCode, Json<IpChange>), ApiError> {
    let new_ip = json_body(payload)?;

    if new_ip.ip_address.trim().is_empty() {
        return Err(ApiError::BadRequest("Field 'ip_address' is required".to_string()));
    }
    if new_ip.device_name.trim().is_empty() {
        return Err(ApiError::BadRequest("Field 'device_name' is required".to_string()));
    }
    let ip_address = parse_address(&new_ip.ip_address)?;

    if db.find_ip_id(ip_address).await?.is_some() {
        return Err(ApiError::Conflict("IP address already exists".to_string()));
    }

    let record = AddressRecord {
        ip_address,
        device_name: new_ip.device_name,
        device_type_id: new_ip.device_type_id,
        subnet_id: new_ip.subnet_id,
        branch_id: new_ip.branch_id,
        description: new_ip.description,
    };
    let id = db.create_ip(&record).await.map_err(write_error)?;
    info!("Created address {} ({})", ip_address, id);

    let ip = db
        .get_ip(id)
        .await?
        .ok_or_else(|| ApiError::Internal("Created address disappeared".to_string()))?;

    Ok((
        StatusCode::CREATED,
        Json(IpChange {
            message: "IP created successfully".to_string(),
            ip,
        }),
    ))
}

/// Update the editable fields of an address
#[utoipa::path(
    put,
    path = "/api/ips/{id}",
    tag = "ips",
    params(
        ("id" = i64, Path, description = "Address ID")
    ),
    request_body = IpPatch,
    responses(
        (status = 200, description = "Address updated", body = IpChange),
        (status = 400, description = "Bad request"),
        (status = 404, description = "Address not found"),
        (status = 409, description = "Address already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn update_ip(
    State(db): State<Arc<Database>>,
    Path(id): Path<i64>,
    payload: Result<Json<IpPatch>, JsonRejection>,
) -> Result<Json<IpChange>, ApiError> {
    let patch = json_body(payload)?;

    if db.get_ip(id).await?.is_none() {
        return Err(ApiError::NotFound("IP not found".to_string()));
    }

    let ip_address = patch.ip_address.as_deref().map(parse_address).transpose()?;
    if let Some(ip) = ip_address {
        if matches!(db.find_ip_id(ip).await?, Some(other) if other != id) {
            return Err(ApiError::Conflict("IP address already exists".to_string()));
        }
    }

    if patch.is_empty() {
        return Err(ApiError::BadRequest("No valid fields to update".to_string()));
    }

    if !db.update_ip(id, ip_address, &patch).await.map_err(write_error)? {
        return Err(ApiError::NotFound("IP not found".to_string()));
    }
    info!("Updated address {}", id);

    let ip = db
        .get_ip(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("IP not found".to_string()))?;

    Ok(Json(IpChange {
        message: "IP updated successfully".to_string(),
        ip,
    }))
}

/// Remove an address
#[utoipa::path(
    delete,
    path = "/api/ips/{id}",
    tag = "ips",
    params(
        ("id" = i64, Path, description = "Address ID")
    ),
    responses(
        (status = 200, description = "Address deleted", body = MessageResponse),
        (status = 404, description = "Address not found"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn delete_ip(
    State(db): State<Arc<Database>>,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !db.delete_ip(id).await? {
        return Err(ApiError::NotFound("IP not found".to_string()));
    }
    info!("Deleted address {}", id);

    Ok(Json(MessageResponse {
        message: "IP deleted successfully".to_string(),
    }))
}
