use crate::{
    bulk::{bulk_insert, BulkError, BulkInsertPayload, BulkProfile, RangeRequest},
    config::BulkConfig,
    db::Database,
    error::ApiError,
    handlers::json_body,
};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

/// Outcome of a bulk insertion
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BulkInsertResponse {
    pub success: bool,
    pub message: String,
    pub inserted: u64,
    pub skipped: u64,
    pub total_processed: u64,
    pub start_ip: String,
    pub end_ip: String,
    pub errors: Vec<String>,
    /// Present when some addresses could not be inserted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

/// Insert every address of a range
#[utoipa::path(
    post,
    path = "/api/ips/bulk",
    tag = "bulk",
    request_body = BulkInsertPayload,
    responses(
        (status = 201, description = "Range processed", body = BulkInsertResponse),
        (status = 400, description = "Invalid request or range"),
        (status = 500, description = "Database error")
    )
)]
pub async fn bulk_insert_basic(
    State(db): State<Arc<Database>>,
    State(config): State<Arc<BulkConfig>>,
    payload: Result<Json<BulkInsertPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<BulkInsertResponse>), ApiError> {
    run(&db, &config, payload, BulkProfile::Basic).await
}

/// Insert every address of a range after checking its references
#[utoipa::path(
    post,
    path = "/api/ips/bulk/enhanced",
    tag = "bulk",
    request_body = BulkInsertPayload,
    responses(
        (status = 201, description = "Range processed", body = BulkInsertResponse),
        (status = 400, description = "Invalid request, range or reference"),
        (status = 500, description = "Database error")
    )
)]
pub async fn bulk_insert_enhanced(
    State(db): State<Arc<Database>>,
    State(config): State<Arc<BulkConfig>>,
    payload: Result<Json<BulkInsertPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<BulkInsertResponse>), ApiError> {
    run(&db, &config, payload, BulkProfile::Enhanced).await
}

async fn run(
    db: &Database,
    config: &BulkConfig,
    payload: Result<Json<BulkInsertPayload>, JsonRejection>,
    profile: BulkProfile,
) -> Result<(StatusCode, Json<BulkInsertResponse>), ApiError> {
    let payload = json_body(payload)?;
    let request = RangeRequest::try_from(payload).map_err(BulkError::from)?;

    let mut store = db.bulk_store();
    let result = bulk_insert(&mut store, &request, profile, config).await?;

    let (message, warning) = match profile {
        BulkProfile::Basic => (
            "Bulk insertion completed".to_string(),
            "Some IPs could not be inserted",
        ),
        BulkProfile::Enhanced => (
            format!(
                "Successfully processed {} IP addresses",
                group_thousands(result.total_processed)
            ),
            "Some IPs encountered errors during insertion",
        ),
    };

    Ok((
        StatusCode::CREATED,
        Json(BulkInsertResponse {
            success: true,
            message,
            inserted: result.inserted,
            skipped: result.skipped,
            total_processed: result.total_processed,
            start_ip: request.range.start().to_string(),
            end_ip: request.range.end().to_string(),
            warning: (!result.errors.is_empty()).then(|| warning.to_string()),
            errors: result.errors,
        }),
    ))
}

/// 1234567 -> "1,234,567"
fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
