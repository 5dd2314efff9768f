use crate::{
    db::{is_unique_violation, Database},
    error::ApiError,
    handlers::{json_body, required_name},
    models::{CreateNamed, DeviceType},
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use std::sync::Arc;
use tracing::info;

/// List all device types
#[utoipa::path(
    get,
    path = "/api/device-types",
    tag = "device-types",
    responses(
        (status = 200, description = "List of device types", body = Vec<DeviceType>),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn list_device_types(
    State(db): State<Arc<Database>>,
) -> Result<Json<Vec<DeviceType>>, ApiError> {
    Ok(Json(db.list_device_types().await?))
}

/// Create a device type
#[utoipa::path(
    post,
    path = "/api/device-types",
    tag = "device-types",
    request_body = CreateNamed,
    responses(
        (status = 201, description = "Device type created", body = DeviceType),
        (status = 400, description = "Bad request"),
        (status = 409, description = "Device type already exists"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn create_device_type(
    State(db): State<Arc<Database>>,
    payload: Result<Json<CreateNamed>, JsonRejection>,
) -> Result<(StatusCode, Json<DeviceType>), ApiError> {
    let body = json_body(payload)?;
    let name = required_name(&body.name)?;

    let id = db.create_device_type(name).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::Conflict("Device type already exists".to_string())
        } else {
            e.into()
        }
    })?;
    info!("Created device type {} ({})", name, id);

    Ok((
        StatusCode::CREATED,
        Json(DeviceType {
            id,
            name: name.to_string(),
        }),
    ))
}
