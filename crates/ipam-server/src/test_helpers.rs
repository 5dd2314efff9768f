#[cfg(test)]
use crate::bulk::RangeRequest;
#[cfg(test)]
use crate::config::{ApiConfig, BulkConfig, Config};
#[cfg(test)]
use crate::db::Database;
#[cfg(test)]
use crate::models::AddressRecord;
#[cfg(test)]
use ipam_range::{hyphenated, RangeSpec};
#[cfg(test)]
use std::net::Ipv4Addr;
#[cfg(test)]
use std::path::Path;

/// Reference rows every address needs
#[cfg(test)]
#[derive(Debug, Clone, Copy)]
pub struct TestRefs {
    pub branch_id: i64,
    pub device_type_id: i64,
    pub subnet_id: i64,
}

#[cfg(test)]
pub fn create_test_config() -> Config {
    Config {
        database_path: ":memory:".to_string(),
        api: ApiConfig {
            listen_address: "127.0.0.1".to_string(),
            port: 8080,
            unix_socket: None,
        },
        bulk: BulkConfig::default(),
    }
}

/// In-memory database with one branch, one device type and the /24 subnet
#[cfg(test)]
pub async fn create_test_database() -> (Database, TestRefs) {
    seed_test_database(Database::new(":memory:").await.unwrap()).await
}

/// Same reference rows as [`create_test_database`], in a database file
#[cfg(test)]
pub async fn create_file_test_database(path: &Path) -> (Database, TestRefs) {
    let url = format!("sqlite:{}", path.display());
    seed_test_database(Database::new(&url).await.unwrap()).await
}

#[cfg(test)]
async fn seed_test_database(db: Database) -> (Database, TestRefs) {
    let branch_id = db.create_branch("Main Office").await.unwrap();
    let device_type_id = db.create_device_type("Server").await.unwrap();
    let subnet_id = db
        .list_subnets()
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.prefix == 24)
        .map(|s| s.id)
        .unwrap();

    (
        db,
        TestRefs {
            branch_id,
            device_type_id,
            subnet_id,
        },
    )
}

/// Reference ids for stores that do not check them
#[cfg(test)]
pub fn memory_refs() -> TestRefs {
    TestRefs {
        branch_id: 1,
        device_type_id: 1,
        subnet_id: 17,
    }
}

#[cfg(test)]
pub fn test_record(refs: &TestRefs, ip: Ipv4Addr) -> AddressRecord {
    AddressRecord {
        ip_address: ip,
        device_name: format!("host-{}", hyphenated(ip)),
        device_type_id: refs.device_type_id,
        subnet_id: refs.subnet_id,
        branch_id: refs.branch_id,
        description: Some("test entry".to_string()),
    }
}

/// Full-address range request with the default naming and description
#[cfg(test)]
pub fn range_request(refs: &TestRefs, start: &str, end: &str, skip_existing: bool) -> RangeRequest {
    RangeRequest {
        range: RangeSpec::from_addresses(start, end).unwrap(),
        subnet_id: refs.subnet_id,
        device_type_id: refs.device_type_id,
        branch_id: refs.branch_id,
        device_name_prefix: "Device".to_string(),
        description: "Bulk inserted IP".to_string(),
        skip_existing,
        batch_size: None,
    }
}
