pub mod branches;
pub mod bulk;
pub mod device_types;
pub mod health;
pub mod ips;
pub mod networks;
pub mod subnets;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query,
    },
    Json,
};

use crate::error::ApiError;

/// Unwrap a JSON body, reporting any rejection as a bad request
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|_| ApiError::BadRequest("Invalid JSON input".to_string()))
}

/// Unwrap typed query parameters, reporting any rejection as a bad request
pub(crate) fn query_params<T>(query: Result<Query<T>, QueryRejection>) -> Result<T, ApiError> {
    query
        .map(|Query(params)| params)
        .map_err(|rejection| {
            ApiError::BadRequest(format!("Invalid query parameters: {}", rejection.body_text()))
        })
}

/// Parse a branch id given as a query parameter
pub(crate) fn branch_id_param(value: Option<&str>) -> Result<i64, ApiError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Branch ID is required".to_string()))?;
    value
        .parse()
        .map_err(|_| ApiError::BadRequest("Invalid branch ID".to_string()))
}

/// Name field of a create request; blank names are rejected
pub(crate) fn required_name(name: &str) -> Result<&str, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("Field 'name' is required".to_string()));
    }
    Ok(name)
}
