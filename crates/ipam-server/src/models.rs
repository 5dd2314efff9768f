use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use utoipa::{IntoParams, ToSchema};

/// An organizational branch owning IP addresses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Branch {
    pub id: i64,

    /// Branch name
    pub name: String,

    /// Number of addresses allocated to this branch
    #[serde(default)]
    pub ip_count: i64,
}

/// A kind of device (server, printer, camera...)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct DeviceType {
    pub id: i64,
    pub name: String,
}

/// A subnet size
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Subnet {
    pub id: i64,

    /// Prefix length (e.g., 24 for /24)
    pub prefix: u8,

    /// Dotted subnet mask (e.g., 255.255.255.0)
    pub subnet_mask: String,
}

/// Request body for creating a branch or device type
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreateNamed {
    pub name: String,
}

/// An address row ready to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressRecord {
    pub ip_address: Ipv4Addr,
    pub device_name: String,
    pub device_type_id: i64,
    pub subnet_id: i64,
    pub branch_id: i64,
    pub description: Option<String>,
}

/// A stored address joined with its reference data
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IpEntry {
    pub id: i64,

    #[schema(value_type = String)]
    pub ip_address: Ipv4Addr,

    pub device_name: String,
    pub description: Option<String>,

    /// Device type name
    pub device_type: String,
    pub device_type_id: i64,

    pub subnet_mask: String,
    pub subnet_id: i64,

    pub branch_id: i64,
}

/// Request body for creating an address
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NewIp {
    #[schema(value_type = String)]
    pub ip_address: String,
    pub device_name: String,
    pub device_type_id: i64,
    pub subnet_id: i64,
    pub branch_id: i64,
    pub description: Option<String>,
}

/// Partial update of an address; absent fields are left unchanged
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct IpPatch {
    pub ip_address: Option<String>,
    pub device_name: Option<String>,
    pub device_type_id: Option<i64>,
    pub subnet_id: Option<i64>,
    pub description: Option<String>,
}

impl IpPatch {
    pub fn is_empty(&self) -> bool {
        self.ip_address.is_none()
            && self.device_name.is_none()
            && self.device_type_id.is_none()
            && self.subnet_id.is_none()
            && self.description.is_none()
    }
}

/// Pagination metadata returned with address listings
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_records: i64,
    pub records_per_page: u32,
}

/// One page of a branch's addresses
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IpPage {
    pub ips: Vec<IpEntry>,
    pub pagination: Pagination,
}

/// Addresses of a branch grouped by /24 network and subnet
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct NetworkSummary {
    /// Network address (e.g., 192.168.1.0)
    #[schema(value_type = String)]
    pub network: Ipv4Addr,
    pub subnet_id: i64,
    pub prefix: u8,
    pub subnet_mask: String,
    pub ip_count: i64,
}

/// Column used to order search results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    IpAddress,
    DeviceName,
    DeviceType,
    SubnetMask,
    Description,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// Server-side table query over a branch's addresses
#[derive(Debug, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct IpSearch {
    pub branch_id: i64,
    #[serde(default)]
    pub start: i64,
    #[serde(default = "default_length")]
    pub length: i64,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub order_column: SortColumn,
    #[serde(default)]
    pub order_dir: SortDirection,
}

fn default_length() -> i64 {
    10
}

/// Result of a table query
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IpSearchResult {
    /// Addresses in the branch before filtering
    pub records_total: i64,
    /// Addresses matching the search text
    pub records_filtered: i64,
    pub data: Vec<IpEntry>,
}

/// Response to a successful address create or update
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct IpChange {
    pub message: String,
    pub ip: IpEntry,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}
