use async_trait::async_trait;
use std::collections::{BTreeMap, HashSet};
use std::net::Ipv4Addr;

use super::{AddressStore, ReferenceKind, StoreError};
use crate::models::AddressRecord;

/// In-memory [`AddressStore`] with fault injection
#[derive(Default)]
pub struct MemoryStore {
    committed: BTreeMap<Ipv4Addr, AddressRecord>,
    pending: Option<BTreeMap<Ipv4Addr, AddressRecord>>,

    /// Number of successful commits
    pub commits: u32,

    /// Addresses that conflict on insert without being visible to lookups
    pub hidden_conflicts: HashSet<Ipv4Addr>,

    /// Grouped inserts containing this address fail with a non-conflict error
    pub fail_batches_with: Option<Ipv4Addr>,

    /// The n-th commit call (1-based) fails
    pub fail_commit_number: Option<u32>,
    commit_calls: u32,

    /// The next n `begin` calls report lock contention
    pub busy_begins: u32,

    /// The next n grouped inserts report lock contention
    pub busy_inserts: u32,

    /// Reference ids known to `lookup_exists`; empty means every id exists
    pub known_references: HashSet<(ReferenceKind, i64)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn committed_len(&self) -> usize {
        self.committed.len()
    }

    pub fn contains(&self, ip: Ipv4Addr) -> bool {
        self.committed.contains_key(&ip)
    }

    pub fn in_transaction(&self) -> bool {
        self.pending.is_some()
    }

    fn stored(&self, ip: &Ipv4Addr) -> bool {
        self.committed.contains_key(ip)
            || self.pending.as_ref().is_some_and(|p| p.contains_key(ip))
    }

    fn pending_mut(&mut self) -> Result<&mut BTreeMap<Ipv4Addr, AddressRecord>, StoreError> {
        self.pending
            .as_mut()
            .ok_or_else(|| StoreError::Other("no open transaction".to_string()))
    }

    fn conflict(ip: Ipv4Addr) -> StoreError {
        StoreError::Conflict(format!("duplicate address {}", ip))
    }

    fn locked() -> StoreError {
        StoreError::Busy("database is locked".to_string())
    }
}

#[async_trait]
impl AddressStore for MemoryStore {
    async fn exists_any(&mut self, addresses: &[Ipv4Addr]) -> Result<HashSet<Ipv4Addr>, StoreError> {
        Ok(addresses.iter().filter(|ip| self.stored(ip)).copied().collect())
    }

    async fn existing_in_range(
        &mut self,
        start: u32,
        end: u32,
    ) -> Result<HashSet<Ipv4Addr>, StoreError> {
        let range = Ipv4Addr::from(start)..=Ipv4Addr::from(end);
        let mut found: HashSet<Ipv4Addr> = self.committed.range(range.clone()).map(|(ip, _)| *ip).collect();
        if let Some(pending) = &self.pending {
            found.extend(pending.range(range).map(|(ip, _)| *ip));
        }
        Ok(found)
    }

    async fn insert_many(&mut self, records: &[AddressRecord]) -> Result<u64, StoreError> {
        self.pending_mut()?;
        if self.busy_inserts > 0 {
            self.busy_inserts -= 1;
            return Err(Self::locked());
        }
        if let Some(bad) = self.fail_batches_with {
            if records.iter().any(|r| r.ip_address == bad) {
                return Err(StoreError::Other("injected failure".to_string()));
            }
        }

        let mut seen = HashSet::new();
        for record in records {
            let ip = record.ip_address;
            if self.stored(&ip) || self.hidden_conflicts.contains(&ip) || !seen.insert(ip) {
                return Err(Self::conflict(ip));
            }
        }

        let pending = self.pending_mut()?;
        for record in records {
            pending.insert(record.ip_address, record.clone());
        }
        Ok(records.len() as u64)
    }

    async fn insert_one(&mut self, record: &AddressRecord) -> Result<(), StoreError> {
        self.pending_mut()?;
        let ip = record.ip_address;
        if self.stored(&ip) || self.hidden_conflicts.contains(&ip) {
            return Err(Self::conflict(ip));
        }
        self.pending_mut()?.insert(ip, record.clone());
        Ok(())
    }

    async fn lookup_exists(&mut self, kind: ReferenceKind, id: i64) -> Result<bool, StoreError> {
        Ok(self.known_references.is_empty() || self.known_references.contains(&(kind, id)))
    }

    async fn begin(&mut self) -> Result<(), StoreError> {
        if self.pending.is_some() {
            return Err(StoreError::Other("transaction already open".to_string()));
        }
        if self.busy_begins > 0 {
            self.busy_begins -= 1;
            return Err(Self::locked());
        }
        self.pending = Some(BTreeMap::new());
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), StoreError> {
        self.commit_calls += 1;
        if self.fail_commit_number == Some(self.commit_calls) {
            return Err(StoreError::Other("injected commit failure".to_string()));
        }
        let pending = self
            .pending
            .take()
            .ok_or_else(|| StoreError::Other("no open transaction".to_string()))?;
        self.committed.extend(pending);
        self.commits += 1;
        Ok(())
    }

    async fn rollback(&mut self) -> Result<(), StoreError> {
        self.pending = None;
        Ok(())
    }
}
