pub mod bulk;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;

#[cfg(test)]
mod test_helpers;

pub use config::{BulkConfig, Config};
pub use models::{Branch, DeviceType, IpEntry, NetworkSummary, Subnet};

use axum::{
    extract::FromRef,
    routing::{get, post, put},
    Router,
};
use db::Database;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Shared state handed to every handler
#[derive(Clone, FromRef)]
pub struct AppState {
    pub db: Arc<Database>,
    pub bulk: Arc<BulkConfig>,
}

impl AppState {
    pub fn new(db: Arc<Database>, bulk: BulkConfig) -> Self {
        Self {
            db,
            bulk: Arc::new(bulk),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::branches::list_branches,
        handlers::branches::create_branch,
        handlers::device_types::list_device_types,
        handlers::device_types::create_device_type,
        handlers::subnets::list_subnets,
        handlers::networks::list_networks,
        handlers::ips::list_ips,
        handlers::ips::search_ips,
        handlers::ips::create_ip,
        handlers::ips::update_ip,
        handlers::ips::delete_ip,
        handlers::bulk::bulk_insert_basic,
        handlers::bulk::bulk_insert_enhanced,
        handlers::health::health_check,
    ),
    components(
        schemas(
            models::Branch,
            models::DeviceType,
            models::Subnet,
            models::CreateNamed,
            models::IpEntry,
            models::NewIp,
            models::IpPatch,
            models::IpChange,
            models::MessageResponse,
            models::IpPage,
            models::Pagination,
            models::IpSearchResult,
            models::NetworkSummary,
            models::SortColumn,
            models::SortDirection,
            bulk::BulkInsertPayload,
            bulk::ReferenceId,
            handlers::bulk::BulkInsertResponse,
            handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "branches", description = "Branch management endpoints"),
        (name = "device-types", description = "Device type management endpoints"),
        (name = "subnets", description = "Subnet reference data"),
        (name = "networks", description = "Per-branch network summaries"),
        (name = "ips", description = "IP address management endpoints"),
        (name = "bulk", description = "Bulk range insertion endpoints"),
        (name = "health", description = "Service health"),
    )
)]
pub struct ApiDoc;

pub fn create_router(state: AppState) -> Router {
    let app = Router::new()
        // Reference data
        .route(
            "/api/branches",
            get(handlers::branches::list_branches).post(handlers::branches::create_branch),
        )
        .route(
            "/api/device-types",
            get(handlers::device_types::list_device_types)
                .post(handlers::device_types::create_device_type),
        )
        .route("/api/subnets", get(handlers::subnets::list_subnets))
        .route("/api/networks", get(handlers::networks::list_networks))
        // Addresses
        .route(
            "/api/ips",
            get(handlers::ips::list_ips).post(handlers::ips::create_ip),
        )
        .route("/api/ips/search", get(handlers::ips::search_ips))
        .route(
            "/api/ips/{id}",
            put(handlers::ips::update_ip).delete(handlers::ips::delete_ip),
        )
        // Bulk insertion
        .route("/api/ips/bulk", post(handlers::bulk::bulk_insert_basic))
        .route(
            "/api/ips/bulk/enhanced",
            post(handlers::bulk::bulk_insert_enhanced),
        )
        // Health check
        .route("/health", get(handlers::health::health_check))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    app.merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
}
