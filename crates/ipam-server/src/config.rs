use serde::{Deserialize, Serialize};

/// Configuration structure loaded from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Database file path
    #[serde(default = "default_db_path")]
    pub database_path: String,

    /// API server configuration
    pub api: ApiConfig,

    /// Bulk range insertion tuning
    #[serde(default)]
    pub bulk: BulkConfig,
}

fn default_db_path() -> String {
    "/var/lib/ipam-server/ipam.db".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API listening address
    #[serde(default = "default_api_address")]
    pub listen_address: String,

    /// API listening port
    #[serde(default = "default_api_port")]
    pub port: u16,

    /// Optional Unix socket path for local CLI access
    #[serde(default)]
    pub unix_socket: Option<String>,
}

fn default_api_address() -> String {
    "127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
    8080
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkConfig {
    /// Chunk size used when a request does not set one
    #[serde(default = "default_batch_size")]
    pub default_batch_size: usize,

    /// Upper bound for caller-provided chunk sizes. Each record binds 7
    /// parameters, so this keeps grouped inserts under SQLite's limit.
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Ranges up to this size check existence chunk by chunk; larger
    /// ranges pre-load existing addresses by numeric window
    #[serde(default = "default_preload_threshold")]
    pub preload_threshold: u64,

    /// Number of addresses covered by one pre-load query
    #[serde(default = "default_preload_window")]
    pub preload_window: u32,

    /// Limits for the basic bulk endpoint
    #[serde(default = "default_basic_limits")]
    pub basic: ProfileLimits,

    /// Limits for the enhanced bulk endpoint
    #[serde(default = "default_enhanced_limits")]
    pub enhanced: ProfileLimits,

    /// Retries of a lock-contended begin or insert before the run aborts
    #[serde(default = "default_lock_retries")]
    pub lock_retries: u32,

    /// Delay before the first retry, doubled on each further attempt
    #[serde(default = "default_lock_retry_delay_ms")]
    pub lock_retry_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLimits {
    /// Maximum number of addresses in one request
    pub max_range: u64,

    /// Commit after this many inserted records
    pub commit_interval: u64,
}

fn default_batch_size() -> usize {
    1000
}

fn default_max_batch_size() -> usize {
    4000
}

fn default_preload_threshold() -> u64 {
    10_000
}

fn default_preload_window() -> u32 {
    65_536
}

fn default_basic_limits() -> ProfileLimits {
    ProfileLimits {
        max_range: 2_000_000,
        commit_interval: 10_000,
    }
}

fn default_enhanced_limits() -> ProfileLimits {
    ProfileLimits {
        max_range: 5_000_000,
        commit_interval: 50_000,
    }
}

fn default_lock_retries() -> u32 {
    5
}

fn default_lock_retry_delay_ms() -> u64 {
    250
}

impl Default for BulkConfig {
    fn default() -> Self {
        Self {
            default_batch_size: default_batch_size(),
            max_batch_size: default_max_batch_size(),
            preload_threshold: default_preload_threshold(),
            preload_window: default_preload_window(),
            basic: default_basic_limits(),
            enhanced: default_enhanced_limits(),
            lock_retries: default_lock_retries(),
            lock_retry_delay_ms: default_lock_retry_delay_ms(),
        }
    }
}

impl BulkConfig {
    /// Resolve the chunk size for a request
    pub fn batch_size(&self, requested: Option<usize>) -> usize {
        let max = self.max_batch_size.max(1);
        requested.unwrap_or(self.default_batch_size).clamp(1, max)
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a YAML file
    pub fn to_file(&self, path: &str) -> anyhow::Result<()> {
        let yaml = serde_yaml::to_string(self)?;
        std::fs::write(path, yaml)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_path: default_db_path(),
            api: ApiConfig {
                listen_address: default_api_address(),
                port: default_api_port(),
                unix_socket: None,
            },
            bulk: BulkConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_yaml_uses_defaults() {
        let config: Config = serde_yaml::from_str("api: {}\n").unwrap();
        assert_eq!(config.database_path, "/var/lib/ipam-server/ipam.db");
        assert_eq!(config.api.listen_address, "127.0.0.1");
        assert_eq!(config.api.port, 8080);
        assert!(config.api.unix_socket.is_none());
        assert_eq!(config.bulk.default_batch_size, 1000);
        assert_eq!(config.bulk.basic.max_range, 2_000_000);
        assert_eq!(config.bulk.basic.commit_interval, 10_000);
        assert_eq!(config.bulk.enhanced.max_range, 5_000_000);
        assert_eq!(config.bulk.enhanced.commit_interval, 50_000);
    }

    #[test]
    fn test_yaml_overrides() {
        let yaml = r#"
database_path: /tmp/ipam.db
api:
  listen_address: 0.0.0.0
  port: 9000
  unix_socket: /run/ipam.sock
bulk:
  default_batch_size: 250
  enhanced:
    max_range: 100
    commit_interval: 10
"#;
        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.database_path, "/tmp/ipam.db");
        assert_eq!(config.api.port, 9000);
        assert_eq!(config.api.unix_socket.as_deref(), Some("/run/ipam.sock"));
        assert_eq!(config.bulk.default_batch_size, 250);
        assert_eq!(config.bulk.enhanced.max_range, 100);
        assert_eq!(config.bulk.basic, default_basic_limits());
    }

    #[test]
    fn test_batch_size_clamped() {
        let bulk = BulkConfig::default();
        assert_eq!(bulk.batch_size(None), 1000);
        assert_eq!(bulk.batch_size(Some(50)), 50);
        assert_eq!(bulk.batch_size(Some(0)), 1);
        assert_eq!(bulk.batch_size(Some(1_000_000)), 4000);
    }

    #[test]
    fn test_config_file_round_trip() {
        let path = std::env::temp_dir().join(format!("ipam-config-{}.yaml", std::process::id()));
        let path = path.to_string_lossy().to_string();

        let mut config = Config::default();
        config.api.port = 8181;
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.api.port, 8181);
        assert_eq!(loaded.bulk.enhanced, config.bulk.enhanced);

        let _ = std::fs::remove_file(&path);
    }
}
