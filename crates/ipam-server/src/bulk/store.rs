use async_trait::async_trait;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, Transaction};
use std::collections::HashSet;
use std::net::Ipv4Addr;
use thiserror::Error;

use super::ReferenceKind;
use crate::models::AddressRecord;

const INSERT_PREFIX: &str = "INSERT INTO ips \
     (ip_address, ip_numeric, device_name, device_type_id, subnet_id, branch_id, description) ";

/// Failure reported by an [`AddressStore`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("{0}")]
    Conflict(String),

    /// Another connection holds the database lock past the busy timeout
    #[error("{0}")]
    Busy(String),

    #[error("{0}")]
    Other(String),
}

/// SQLITE_BUSY and SQLITE_LOCKED; extended codes keep the primary code in the low byte
fn is_lock_error(db_err: &dyn sqlx::error::DatabaseError) -> bool {
    db_err
        .code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, 5 | 6))
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict(db_err.message().to_string())
            }
            sqlx::Error::Database(db_err) if is_lock_error(db_err.as_ref()) => {
                Self::Busy(err.to_string())
            }
            _ => Self::Other(err.to_string()),
        }
    }
}

/// Persistence operations needed by the bulk committer.
///
/// Writes and existence checks run inside the transaction opened by
/// [`AddressStore::begin`], which takes the write lock up front.
#[async_trait]
pub trait AddressStore: Send {
    /// Subset of `addresses` already stored
    async fn exists_any(&mut self, addresses: &[Ipv4Addr]) -> Result<HashSet<Ipv4Addr>, StoreError>;

    /// Stored addresses whose numeric value lies in `[start, end]`
    async fn existing_in_range(&mut self, start: u32, end: u32)
        -> Result<HashSet<Ipv4Addr>, StoreError>;

    /// Grouped insert; all records are written or none are
    async fn insert_many(&mut self, records: &[AddressRecord]) -> Result<u64, StoreError>;

    async fn insert_one(&mut self, record: &AddressRecord) -> Result<(), StoreError>;

    async fn lookup_exists(&mut self, kind: ReferenceKind, id: i64) -> Result<bool, StoreError>;

    async fn begin(&mut self) -> Result<(), StoreError>;

    async fn commit(&mut self) -> Result<(), StoreError>;

    /// Roll back the open transaction, if any
    async fn rollback(&mut self) -> Result<(), StoreError>;
}

/// [`AddressStore`] backed by the SQLite pool
pub struct SqliteStore {
    pool: SqlitePool,
    tx: Option<Transaction<'static, Sqlite>>,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool, tx: None }
    }

    fn conn(&mut self) -> Result<&mut SqliteConnection, StoreError> {
        self.tx
            .as_mut()
            .map(|tx| &mut **tx)
            .ok_or_else(|| StoreError::Other("no open transaction".to_string()))
    }
}

fn parse_addresses(rows: Vec<String>) -> Result<HashSet<Ipv4Addr>, StoreError> {
    rows.into_iter()
        .map(|s| {
            s.parse()
                .map_err(|_| StoreError::Other(format!("stored address '{}' is not IPv4", s)))
        })
        .collect()
}

#[async_trait]
impl AddressStore for SqliteStore {
    async fn exists_any(&mut self, addresses: &[Ipv4Addr]) -> Result<HashSet<Ipv4Addr>, StoreError> {
        if addresses.is_empty() {
            return Ok(HashSet::new());
        }

        let mut query = QueryBuilder::<Sqlite>::new("SELECT ip_address FROM ips WHERE ip_address IN (");
        let mut values = query.separated(", ");
        for ip in addresses {
            values.push_bind(ip.to_string());
        }
        values.push_unseparated(")");

        let rows: Vec<String> = query.build_query_scalar().fetch_all(self.conn()?).await?;
        parse_addresses(rows)
    }

    async fn existing_in_range(
        &mut self,
        start: u32,
        end: u32,
    ) -> Result<HashSet<Ipv4Addr>, StoreError> {
        let rows: Vec<String> =
            sqlx::query_scalar("SELECT ip_address FROM ips WHERE ip_numeric BETWEEN ? AND ?")
                .bind(i64::from(start))
                .bind(i64::from(end))
                .fetch_all(self.conn()?)
                .await?;
        parse_addresses(rows)
    }

    async fn insert_many(&mut self, records: &[AddressRecord]) -> Result<u64, StoreError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut query = QueryBuilder::<Sqlite>::new(INSERT_PREFIX);
        query.push_values(records, |mut row, record| {
            row.push_bind(record.ip_address.to_string())
                .push_bind(i64::from(u32::from(record.ip_address)))
                .push_bind(record.device_name.clone())
                .push_bind(record.device_type_id)
                .push_bind(record.subnet_id)
                .push_bind(record.branch_id)
                .push_bind(record.description.clone());
        });

        let result = query.build().execute(self.conn()?).await?;
        Ok(result.rows_affected())
    }

    async fn insert_one(&mut self, record: &AddressRecord) -> Result<(), StoreError> {
        sqlx::query(
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
        .execute(self.conn()?)
        .await?;
        Ok(())
    }

    async fn lookup_exists(&mut self, kind: ReferenceKind, id: i64) -> Result<bool, StoreError> {
        let sql = format!("SELECT 1 FROM {} WHERE id = ?", kind.table());
        let query = sqlx::query(&sql).bind(id);
        let row = match self.tx.as_mut() {
            Some(tx) => query.fetch_optional(&mut **tx).await?,
            None => query.fetch_optional(&self.pool).await?,
        };
        Ok(row.is_some())
    }

    async fn begin(&mut self) -> Result<(), StoreError> {
        if self.tx.is_some() {
            return Err(StoreError::Other("transaction already open".to_string()));
        }
        // Reserve the write lock before the first pre-check read
        self.tx = Some(self.pool.begin_with("BEGIN IMMEDIATE").await?);
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Err(StoreError::Other("no open transaction".to_string())),
        }
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        if let Some(tx) = self.tx.take() {
            tx.rollback().await?;
        }
        Ok(())
    }
}
