use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqliteRow},
    QueryBuilder, Row, Sqlite, SqlitePool,
};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;

use crate::bulk::SqliteStore;
use crate::models::{
    AddressRecord, Branch, DeviceType, IpEntry, IpPage, IpPatch, IpSearch, IpSearchResult,
    NetworkSummary, Pagination, SortColumn, SortDirection, Subnet,
};

pub const RECORDS_PER_PAGE: u32 = 10;

/// How long a statement waits for another connection's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(30);

const IP_SELECT: &str = "SELECT i.id, i.ip_address, i.device_name, i.description, i.branch_id, \
     dt.name AS device_type, dt.id AS device_type_id, s.subnet_mask, s.id AS subnet_id \
     FROM ips i \
     JOIN device_types dt ON i.device_type_id = dt.id \
     JOIN subnets s ON i.subnet_id = s.id";

const IP_COUNT: &str = "SELECT COUNT(*) FROM ips i \
     JOIN device_types dt ON i.device_type_id = dt.id \
     JOIN subnets s ON i.subnet_id = s.id";

pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Create a new database connection
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePool::connect_with(options).await?;

        // Run migrations
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Open a store for one bulk insertion
    pub fn bulk_store(&self) -> SqliteStore {
        SqliteStore::new(self.pool.clone())
    }

    // Reference data
    pub async fn list_branches(&self) -> anyhow::Result<Vec<Branch>> {
        let rows = sqlx::query(
            "SELECT b.id, b.name, COUNT(i.id) AS ip_count FROM branches b \
             LEFT JOIN ips i ON b.id = i.branch_id \
             GROUP BY b.id, b.name ORDER BY b.name",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| -> anyhow::Result<Branch> {
                Ok(Branch {
                    id: r.try_get("id")?,
                    name: r.try_get("name")?,
                    ip_count: r.try_get("ip_count")?,
                })
            })
            .collect()
    }

    pub async fn create_branch(&self, name: &str) -> anyhow::Result<i64> {
        let result = sqlx::query("INSERT INTO branches (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_device_types(&self) -> anyhow::Result<Vec<DeviceType>> {
        let rows = sqlx::query("SELECT id, name FROM device_types ORDER BY name")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|r| -> anyhow::Result<DeviceType> {
                Ok(DeviceType {
                    id: r.try_get("id")?,
                    name: r.try_get("name")?,
                })
            })
            .collect()
    }

    pub async fn create_device_type(&self, name: &str) -> anyhow::Result<i64> {
        let result = sqlx::query("INSERT INTO device_types (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn list_subnets(&self) -> anyhow::Result<Vec<Subnet>> {
        let rows = sqlx::query("SELECT id, prefix, subnet_mask FROM subnets ORDER BY prefix")
            .fetch_all(&self.pool)
            .await?;

        rows.iter()
            .map(|r| -> anyhow::Result<Subnet> {
                Ok(Subnet {
                    id: r.try_get("id")?,
                    prefix: u8::try_from(r.try_get::<i64, _>("prefix")?)?,
                    subnet_mask: r.try_get("subnet_mask")?,
                })
            })
            .collect()
    }

    /// Addresses of a branch grouped by /24 network and subnet
    pub async fn list_networks(&self, branch_id: i64) -> anyhow::Result<Vec<NetworkSummary>> {
        let rows = sqlx::query(
            "SELECT (i.ip_numeric / 256) * 256 AS network, s.id AS subnet_id, s.prefix, \
             s.subnet_mask, COUNT(i.id) AS ip_count \
             FROM ips i JOIN subnets s ON i.subnet_id = s.id \
             WHERE i.branch_id = ? \
             GROUP BY network, s.id, s.prefix, s.subnet_mask \
             ORDER BY network, s.prefix",
        )
        .bind(branch_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|r| -> anyhow::Result<NetworkSummary> {
                Ok(NetworkSummary {
                    network: Ipv4Addr::from(u32::try_from(r.try_get::<i64, _>("network")?)?),
                    subnet_id: r.try_get("subnet_id")?,
                    prefix: u8::try_from(r.try_get::<i64, _>("prefix")?)?,
                    subnet_mask: r.try_get("subnet_mask")?,
                    ip_count: r.try_get("ip_count")?,
                })
            })
            .collect()
    }

    // Address operations
    pub async fn count_ips(&self, branch_id: i64) -> anyhow::Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM ips WHERE branch_id = ?")
            .bind(branch_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// One page of a branch's addresses, ordered numerically
    pub async fn list_ips(&self, branch_id: i64, page: u32) -> anyhow::Result<IpPage> {
        let page = page.max(1);
        let total_records = self.count_ips(branch_id).await?;
        let total_pages = (total_records as u64).div_ceil(RECORDS_PER_PAGE as u64) as u32;
        let offset = i64::from(page - 1) * i64::from(RECORDS_PER_PAGE);

        let sql = format!(
            "{} WHERE i.branch_id = ? ORDER BY i.ip_numeric LIMIT ? OFFSET ?",
            IP_SELECT
        );
        let rows = sqlx::query(&sql)
            .bind(branch_id)
            .bind(i64::from(RECORDS_PER_PAGE))
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok(IpPage {
            ips: rows.iter().map(ip_entry_from_row).collect::<anyhow::Result<_>>()?,
            pagination: Pagination {
                current_page: page,
                total_pages,
                total_records,
                records_per_page: RECORDS_PER_PAGE,
            },
        })
    }

    /// Filtered, ordered and paged view of a branch's addresses
    pub async fn search_ips(&self, search: &IpSearch) -> anyhow::Result<IpSearchResult> {
        let records_total = self.count_ips(search.branch_id).await?;

        let pattern = search
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| format!("%{}%", s));

        let mut count = QueryBuilder::<Sqlite>::new(IP_COUNT);
        count.push(" WHERE i.branch_id = ").push_bind(search.branch_id);
        push_search_filter(&mut count, &pattern);
        let records_filtered = count.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Sqlite>::new(IP_SELECT);
        query.push(" WHERE i.branch_id = ").push_bind(search.branch_id);
        push_search_filter(&mut query, &pattern);
        query
            .push(" ORDER BY ")
            .push(sort_expression(search.order_column))
            .push(match search.order_dir {
                SortDirection::Asc => " ASC",
                SortDirection::Desc => " DESC",
            })
            .push(", i.id")
            // A non-positive length means "no limit", which SQLite spells -1
            .push(" LIMIT ")
            .push_bind(if search.length > 0 { search.length } else { -1 })
            .push(" OFFSET ")
            .push_bind(search.start.max(0));

        let rows = query.build().fetch_all(&self.pool).await?;

        Ok(IpSearchResult {
            records_total,
            records_filtered,
            data: rows.iter().map(ip_entry_from_row).collect::<anyhow::Result<_>>()?,
        })
    }

    pub async fn get_ip(&self, id: i64) -> anyhow::Result<Option<IpEntry>> {
        let sql = format!("{} WHERE i.id = ?", IP_SELECT);
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(ip_entry_from_row).transpose()
    }

    pub async fn find_ip_id(&self, ip: Ipv4Addr) -> anyhow::Result<Option<i64>> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM ips WHERE ip_address = ?")
            .bind(ip.to_string())
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    pub async fn create_ip(&self, record: &AddressRecord) -> anyhow::Result<i64> {
        let result = sqlx::query(
            "INSERT INTO ips (ip_address, ip_numeric, device_name, device_type_id, subnet_id, branch_id, description) \
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(record.ip_address.to_string())
        .bind(i64::from(u32::from(record.ip_address)))
        .bind(&record.device_name)
        .bind(record.device_type_id)
        .bind(record.subnet_id)
        .bind(record.branch_id)
        .bind(&record.description)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Update the fixed set of editable columns; `None` keeps the stored value
    pub async fn update_ip(
        &self,
        id: i64,
        ip_address: Option<Ipv4Addr>,
        patch: &IpPatch,
    ) -> anyhow::Result<bool> {
        let result = sqlx::query(
            "UPDATE ips SET \
             ip_address = COALESCE(?, ip_address), \
             ip_numeric = COALESCE(?, ip_numeric), \
             device_name = COALESCE(?, device_name), \
             device_type_id = COALESCE(?, device_type_id), \
             subnet_id = COALESCE(?, subnet_id), \
             description = COALESCE(?, description) \
             WHERE id = ?",
        )
        .bind(ip_address.map(|ip| ip.to_string()))
        .bind(ip_address.map(|ip| i64::from(u32::from(ip))))
        .bind(&patch.device_name)
        .bind(patch.device_type_id)
        .bind(patch.subnet_id)
        .bind(&patch.description)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_ip(&self, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query("DELETE FROM ips WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

fn ip_entry_from_row(r: &SqliteRow) -> anyhow::Result<IpEntry> {
    Ok(IpEntry {
        id: r.try_get("id")?,
        ip_address: r.try_get::<String, _>("ip_address")?.parse()?,
        device_name: r.try_get("device_name")?,
        description: r.try_get("description")?,
        device_type: r.try_get("device_type")?,
        device_type_id: r.try_get("device_type_id")?,
        subnet_mask: r.try_get("subnet_mask")?,
        subnet_id: r.try_get("subnet_id")?,
        branch_id: r.try_get("branch_id")?,
    })
}

fn push_search_filter(builder: &mut QueryBuilder<'_, Sqlite>, pattern: &Option<String>) {
    if let Some(pattern) = pattern {
        builder
            .push(" AND (i.ip_address LIKE ")
            .push_bind(pattern.clone())
            .push(" OR i.device_name LIKE ")
            .push_bind(pattern.clone())
            .push(" OR i.description LIKE ")
            .push_bind(pattern.clone())
            .push(" OR dt.name LIKE ")
            .push_bind(pattern.clone())
            .push(")");
    }
}

fn sort_expression(column: SortColumn) -> &'static str {
    match column {
        SortColumn::IpAddress => "i.ip_numeric",
        SortColumn::DeviceName => "i.device_name",
        SortColumn::DeviceType => "dt.name",
        SortColumn::SubnetMask => "s.prefix",
        SortColumn::Description => "i.description",
    }
}

/// Whether an error came from a UNIQUE constraint
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db_err)) if db_err.is_unique_violation()
    )
}

/// Whether an error came from a FOREIGN KEY constraint
pub fn is_foreign_key_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<sqlx::Error>(),
        Some(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation()
    )
}
