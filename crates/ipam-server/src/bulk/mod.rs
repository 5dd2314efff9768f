//! Bulk range insertion
//!
//! A request names an IPv4 range; the committer expands it into address
//! records and writes them in grouped inserts, falling back to one record at
//! a time when a group hits a duplicate. The transaction is committed every
//! `commit_interval` inserted records, so an interrupted run keeps its
//! completed chunks and can be resumed by re-running with `skip_existing`.

pub mod committer;
pub mod request;
pub mod store;

#[cfg(test)]
pub mod test_helpers;

pub use committer::bulk_insert;
pub use request::{BulkInsertPayload, ReferenceId};
pub use store::{AddressStore, SqliteStore, StoreError};

use crate::config::{BulkConfig, ProfileLimits};
use ipam_range::{RangeError, RangeSpec};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;
use thiserror::Error;
use utoipa::ToSchema;

/// Which bulk endpoint variant handles a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkProfile {
    /// No up-front reference checks; the database rejects bad references
    Basic,
    /// References are validated before any insert; higher range ceiling
    Enhanced,
}

impl BulkProfile {
    pub fn limits(self, config: &BulkConfig) -> ProfileLimits {
        match self {
            Self::Basic => config.basic,
            Self::Enhanced => config.enhanced,
        }
    }

    pub fn validates_references(self) -> bool {
        matches!(self, Self::Enhanced)
    }
}

/// Reference tables an address points to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Branch,
    DeviceType,
    Subnet,
}

impl ReferenceKind {
    pub fn table(self) -> &'static str {
        match self {
            Self::Branch => "branches",
            Self::DeviceType => "device_types",
            Self::Subnet => "subnets",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Branch => "branch",
            Self::DeviceType => "device type",
            Self::Subnet => "subnet",
        })
    }
}

/// A validated bulk insertion request
#[derive(Debug, Clone)]
pub struct RangeRequest {
    pub range: RangeSpec,
    pub subnet_id: i64,
    pub device_type_id: i64,
    pub branch_id: i64,
    pub device_name_prefix: String,
    pub description: String,
    pub skip_existing: bool,
    /// Chunk size; `None` uses the configured default
    pub batch_size: Option<usize>,
}

/// Outcome of a bulk insertion
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BatchResult {
    pub inserted: u64,
    pub skipped: u64,
    pub total_processed: u64,
    pub errors: Vec<String>,
}

impl BatchResult {
    pub fn new(total_processed: u64) -> Self {
        Self {
            total_processed,
            ..Default::default()
        }
    }
}

/// Input rejected before any database write
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid IP address: '{0}'")]
    InvalidAddress(String),

    #[error("Start IP must be less than or equal to End IP ({start} > {end})")]
    InvalidRange { start: Ipv4Addr, end: Ipv4Addr },

    #[error("Range too large. Maximum {limit} IPs per operation. Total requested: {requested}")]
    RangeTooLarge { limit: u64, requested: u64 },

    #[error("Field '{name}' is required")]
    MissingField { name: &'static str },

    #[error("Field '{name}' must be numeric")]
    NotNumeric { name: &'static str },

    #[error("Invalid {kind} ID: {id}")]
    InvalidReference { kind: ReferenceKind, id: i64 },
}

impl From<RangeError> for ValidationError {
    fn from(err: RangeError) -> Self {
        match err {
            RangeError::InvalidAddress(input) => Self::InvalidAddress(input),
            RangeError::InvalidRange { start, end } => Self::InvalidRange { start, end },
            RangeError::RangeTooLarge { limit, requested } => {
                Self::RangeTooLarge { limit, requested }
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum BulkError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Transaction or pre-check failure; the pending chunk was rolled back
    #[error("Database error: {0}")]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_limits_follow_config() {
        let config = BulkConfig::default();
        assert_eq!(BulkProfile::Basic.limits(&config).max_range, 2_000_000);
        assert_eq!(BulkProfile::Enhanced.limits(&config).commit_interval, 50_000);
        assert!(!BulkProfile::Basic.validates_references());
        assert!(BulkProfile::Enhanced.validates_references());
    }

    #[test]
    fn test_invalid_reference_message() {
        let err = ValidationError::InvalidReference {
            kind: ReferenceKind::DeviceType,
            id: 7,
        };
        assert_eq!(err.to_string(), "Invalid device type ID: 7");
    }

    #[test]
    fn test_range_error_conversion() {
        let err: ValidationError = RangeError::RangeTooLarge {
            limit: 10,
            requested: 11,
        }
        .into();
        assert_eq!(
            err,
            ValidationError::RangeTooLarge {
                limit: 10,
                requested: 11
            }
        );
    }
}
