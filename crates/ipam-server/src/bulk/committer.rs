use ipam_range::{Candidate, RangeExpander};
use std::collections::HashSet;
use std::net::Ipv4Addr;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{
    AddressStore, BatchResult, BulkError, BulkProfile, RangeRequest, ReferenceKind, StoreError,
    ValidationError,
};
use crate::config::BulkConfig;
use crate::models::AddressRecord;

/// Repeat a store call while it reports [`StoreError::Busy`], backing off
/// between attempts; evaluates to the last result
macro_rules! retry_on_lock {
    ($retry:expr, $call:expr) => {{
        let mut attempt = 0;
        loop {
            match $call.await {
                Err(StoreError::Busy(reason)) => {
                    attempt += 1;
                    if !$retry.backoff(attempt, &reason).await {
                        break Err(StoreError::Busy(reason));
                    }
                }
                other => break other,
            }
        }
    }};
}

#[derive(Debug, Clone, Copy)]
struct LockRetry {
    attempts: u32,
    delay: Duration,
}

impl LockRetry {
    fn new(config: &BulkConfig) -> Self {
        Self {
            attempts: config.lock_retries,
            delay: Duration::from_millis(config.lock_retry_delay_ms),
        }
    }

    /// Sleep before retry `attempt` (1-based); false once retries are used up
    async fn backoff(&self, attempt: u32, reason: &str) -> bool {
        if attempt > self.attempts {
            return false;
        }
        let delay = self.delay.saturating_mul(1 << (attempt - 1).min(10));
        warn!(
            "Database locked ({}), retry {} of {} in {:?}",
            reason, attempt, self.attempts, delay
        );
        tokio::time::sleep(delay).await;
        true
    }
}

/// How already-stored addresses are found when `skip_existing` is set
enum Precheck {
    /// Every candidate is inserted; duplicates surface as conflicts
    Disabled,
    /// One `exists_any` query per chunk
    PerChunk,
    /// Existing addresses loaded by numeric window ahead of the cursor
    Windowed(PreloadWindow),
}

struct PreloadWindow {
    range_end: u32,
    size: u32,
    loaded_to: Option<u32>,
    existing: HashSet<Ipv4Addr>,
}

impl PreloadWindow {
    fn new(range_end: u32, size: u32) -> Self {
        Self {
            range_end,
            size: size.max(1),
            loaded_to: None,
            existing: HashSet::new(),
        }
    }

    async fn contains<S>(&mut self, store: &mut S, ip: Ipv4Addr) -> Result<bool, StoreError>
    where
        S: AddressStore + ?Sized,
    {
        let value = u32::from(ip);
        if !matches!(self.loaded_to, Some(to) if value <= to) {
            let to = value.saturating_add(self.size - 1).min(self.range_end);
            self.existing = store.existing_in_range(value, to).await?;
            self.loaded_to = Some(to);
            debug!(
                "Pre-loaded {} existing addresses up to {}",
                self.existing.len(),
                Ipv4Addr::from(to)
            );
        }
        Ok(self.existing.contains(&ip))
    }
}

/// Insert every address of the requested range.
///
/// Validation failures are returned before anything is written. Once the
/// first chunk starts, duplicates and batch-level database errors are
/// recorded in the returned [`BatchResult`] and processing continues; only a
/// failed pre-check, `begin` or `commit` aborts the operation. Lock
/// contention with another writer is retried with backoff and aborts once
/// the retries run out. Chunks committed before such a failure stay in the
/// database.
pub async fn bulk_insert<S>(
    store: &mut S,
    request: &RangeRequest,
    profile: BulkProfile,
    config: &BulkConfig,
) -> Result<BatchResult, BulkError>
where
    S: AddressStore + ?Sized,
{
    let limits = profile.limits(config);
    request
        .range
        .ensure_within(limits.max_range)
        .map_err(ValidationError::from)?;

    if profile.validates_references() {
        validate_references(store, request).await?;
    }

    let total = request.range.total();
    let batch_size = config.batch_size(request.batch_size);
    let precheck = if !request.skip_existing {
        Precheck::Disabled
    } else if total <= config.preload_threshold {
        Precheck::PerChunk
    } else {
        Precheck::Windowed(PreloadWindow::new(
            request.range.end_u32(),
            config.preload_window,
        ))
    };

    info!(
        "Bulk insert of {} addresses ({} - {}), profile {:?}, batch size {}, skip existing: {}",
        total,
        request.range.start(),
        request.range.end(),
        profile,
        batch_size,
        request.skip_existing
    );

    let retry = LockRetry::new(config);
    let mut result = BatchResult::new(total);
    retry_on_lock!(retry, store.begin())?;

    let outcome = run_chunks(
        store,
        request,
        precheck,
        batch_size,
        limits.commit_interval,
        retry,
        &mut result,
    )
    .await;

    if let Err(e) = outcome {
        warn!("Bulk insert aborted after {} inserted records: {}", result.inserted, e);
        if let Err(rollback_err) = store.rollback().await {
            warn!("Rollback after aborted bulk insert failed: {}", rollback_err);
        }
        return Err(e.into());
    }

    if let Err(e) = store.commit().await {
        warn!("Final commit of bulk insert failed: {}", e);
        store.rollback().await.ok();
        return Err(e.into());
    }

    info!(
        "Bulk insert finished: {} inserted, {} skipped, {} errors",
        result.inserted,
        result.skipped,
        result.errors.len()
    );

    Ok(result)
}

async fn validate_references<S>(store: &mut S, request: &RangeRequest) -> Result<(), BulkError>
where
    S: AddressStore + ?Sized,
{
    let references = [
        (ReferenceKind::Branch, request.branch_id),
        (ReferenceKind::DeviceType, request.device_type_id),
        (ReferenceKind::Subnet, request.subnet_id),
    ];

    for (kind, id) in references {
        if !store.lookup_exists(kind, id).await? {
            return Err(ValidationError::InvalidReference { kind, id }.into());
        }
    }
    Ok(())
}

async fn run_chunks<S>(
    store: &mut S,
    request: &RangeRequest,
    mut precheck: Precheck,
    batch_size: usize,
    commit_interval: u64,
    retry: LockRetry,
    result: &mut BatchResult,
) -> Result<(), StoreError>
where
    S: AddressStore + ?Sized,
{
    let mut expander: RangeExpander = request.range.expander(request.device_name_prefix.clone());
    let mut since_commit = 0u64;
    let mut chunk_index = 0u64;

    while !expander.is_exhausted() {
        chunk_index += 1;
        let chunk = expander.next_chunk(batch_size);
        let offered = chunk.len() as u64;

        let candidates = filter_existing(store, &mut precheck, chunk).await?;
        result.skipped += offered - candidates.len() as u64;

        if candidates.is_empty() {
            continue;
        }

        let records: Vec<AddressRecord> = candidates
            .into_iter()
            .map(|c| AddressRecord {
                ip_address: c.ip_address,
                device_name: c.device_name,
                device_type_id: request.device_type_id,
                subnet_id: request.subnet_id,
                branch_id: request.branch_id,
                description: Some(request.description.clone()),
            })
            .collect();

        since_commit +=
            insert_chunk(store, &records, request.skip_existing, chunk_index, retry, result).await?;

        if commit_interval > 0 && since_commit >= commit_interval {
            store.commit().await?;
            retry_on_lock!(retry, store.begin())?;
            debug!(
                "Committed {} records ({} inserted so far, {} remaining)",
                since_commit,
                result.inserted,
                expander.remaining()
            );
            since_commit = 0;
        }
    }

    Ok(())
}

async fn filter_existing<S>(
    store: &mut S,
    precheck: &mut Precheck,
    chunk: Vec<Candidate>,
) -> Result<Vec<Candidate>, StoreError>
where
    S: AddressStore + ?Sized,
{
    match precheck {
        Precheck::Disabled => Ok(chunk),
        Precheck::PerChunk => {
            let addresses: Vec<Ipv4Addr> = chunk.iter().map(|c| c.ip_address).collect();
            let existing = store.exists_any(&addresses).await?;
            Ok(chunk
                .into_iter()
                .filter(|c| !existing.contains(&c.ip_address))
                .collect())
        }
        Precheck::Windowed(window) => {
            let mut kept = Vec::with_capacity(chunk.len());
            for candidate in chunk {
                if !window.contains(store, candidate.ip_address).await? {
                    kept.push(candidate);
                }
            }
            Ok(kept)
        }
    }
}

/// Grouped insert with per-record fallback; returns the number of rows written.
///
/// Only lock contention that outlasts the retries is returned as an error.
async fn insert_chunk<S>(
    store: &mut S,
    records: &[AddressRecord],
    skip_existing: bool,
    chunk_index: u64,
    retry: LockRetry,
    result: &mut BatchResult,
) -> Result<u64, StoreError>
where
    S: AddressStore + ?Sized,
{
    match retry_on_lock!(retry, store.insert_many(records)) {
        Ok(count) => {
            result.inserted += count;
            Ok(count)
        }
        Err(StoreError::Conflict(reason)) => {
            debug!(
                "Chunk {} hit a duplicate ({}), inserting {} records one by one",
                chunk_index,
                reason,
                records.len()
            );
            let mut written = 0;
            for record in records {
                match retry_on_lock!(retry, store.insert_one(record)) {
                    Ok(()) => written += 1,
                    Err(StoreError::Conflict(_)) if skip_existing => result.skipped += 1,
                    Err(e @ StoreError::Busy(_)) => {
                        result.inserted += written;
                        return Err(e);
                    }
                    Err(e) => result
                        .errors
                        .push(format!("Failed to insert {}: {}", record.ip_address, e)),
                }
            }
            result.inserted += written;
            Ok(written)
        }
        Err(e @ StoreError::Busy(_)) => Err(e),
        Err(StoreError::Other(reason)) => {
            warn!("Chunk {} failed: {}", chunk_index, reason);
            result.errors.push(format!("Batch insert failed: {}", reason));
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bulk::test_helpers::MemoryStore;
    use crate::test_helpers::*;
    use ipam_range::RangeSpec;

    fn small_config() -> BulkConfig {
        BulkConfig {
            default_batch_size: 4,
            preload_threshold: 8,
            preload_window: 5,
            ..BulkConfig::default()
        }
    }

    #[tokio::test]
    async fn test_example_range_into_empty_table() {
        let (db, refs) = create_test_database().await;
        let request = range_request(&refs, "192.168.1.1", "192.168.1.3", true);

        let mut store = db.bulk_store();
        let result = bulk_insert(&mut store, &request, BulkProfile::Enhanced, &BulkConfig::default())
            .await
            .unwrap();

        assert_eq!(
            result,
            BatchResult {
                inserted: 3,
                skipped: 0,
                total_processed: 3,
                errors: vec![],
            }
        );

        let page = db.list_ips(refs.branch_id, 1).await.unwrap();
        let names: Vec<(String, String)> = page
            .ips
            .iter()
            .map(|e| (e.ip_address.to_string(), e.device_name.clone()))
            .collect();
        assert_eq!(
            names,
            vec![
                ("192.168.1.1".to_string(), "Device-192-168-1-1".to_string()),
                ("192.168.1.2".to_string(), "Device-192-168-1-2".to_string()),
                ("192.168.1.3".to_string(), "Device-192-168-1-3".to_string()),
            ]
        );
        assert_eq!(page.ips[0].description.as_deref(), Some("Bulk inserted IP"));
    }

    #[tokio::test]
    async fn test_rerun_with_skip_existing_is_idempotent() {
        let (db, refs) = create_test_database().await;
        let request = range_request(&refs, "192.168.1.1", "192.168.1.3", true);
        let config = BulkConfig::default();

        let mut store = db.bulk_store();
        bulk_insert(&mut store, &request, BulkProfile::Enhanced, &config)
            .await
            .unwrap();
        let second = bulk_insert(&mut store, &request, BulkProfile::Enhanced, &config)
            .await
            .unwrap();

        assert_eq!(second.inserted, 0);
        assert_eq!(second.skipped, 3);
        assert_eq!(second.total_processed, 3);
        assert!(second.errors.is_empty());
        assert_eq!(db.count_ips(refs.branch_id).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_multi_chunk_range_spanning_octets() {
        let (db, refs) = create_test_database().await;
        let request = range_request(&refs, "10.0.0.250", "10.0.1.9", false);

        let mut store = db.bulk_store();
        let result = bulk_insert(&mut store, &request, BulkProfile::Basic, &small_config())
            .await
            .unwrap();

        assert_eq!(result.inserted, 16);
        assert_eq!(result.total_processed, 16);
        assert_eq!(db.count_ips(refs.branch_id).await.unwrap(), 16);
    }

    #[tokio::test]
    async fn test_partial_conflict_reports_single_error() {
        let (db, refs) = create_test_database().await;
        db.create_ip(&test_record(&refs, Ipv4Addr::new(10, 0, 0, 3)))
            .await
            .unwrap();

        let mut request = range_request(&refs, "10.0.0.1", "10.0.0.5", false);
        request.batch_size = Some(5);

        let mut store = db.bulk_store();
        let result = bulk_insert(&mut store, &request, BulkProfile::Basic, &BulkConfig::default())
            .await
            .unwrap();

        assert_eq!(result.inserted, 4);
        assert_eq!(result.skipped, 0);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Failed to insert 10.0.0.3:"));
        assert_eq!(db.count_ips(refs.branch_id).await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_skip_existing_leaves_stored_rows_untouched() {
        let (db, refs) = create_test_database().await;
        let id = db
            .create_ip(&test_record(&refs, Ipv4Addr::new(10, 0, 0, 2)))
            .await
            .unwrap();

        let request = range_request(&refs, "10.0.0.1", "10.0.0.4", true);
        let mut store = db.bulk_store();
        let result = bulk_insert(&mut store, &request, BulkProfile::Basic, &BulkConfig::default())
            .await
            .unwrap();

        assert_eq!(result.inserted, 3);
        assert_eq!(result.skipped, 1);
        let kept = db.get_ip(id).await.unwrap().unwrap();
        assert_eq!(kept.device_name, "host-10-0-0-2");
    }

    #[tokio::test]
    async fn test_windowed_preload_matches_per_chunk_check() {
        let (db, refs) = create_test_database().await;
        // Pre-existing addresses scattered across several preload windows
        for last in [1u8, 6, 7, 12, 20] {
            db.create_ip(&test_record(&refs, Ipv4Addr::new(10, 0, 0, last)))
                .await
                .unwrap();
        }

        let config = small_config();
        let large = range_request(&refs, "10.0.0.1", "10.0.0.20", true);
        assert!(large.range.total() > config.preload_threshold);

        let mut store = db.bulk_store();
        let result = bulk_insert(&mut store, &large, BulkProfile::Basic, &config)
            .await
            .unwrap();
        assert_eq!(result.inserted, 15);
        assert_eq!(result.skipped, 5);
        assert!(result.errors.is_empty());

        let per_chunk = BulkConfig {
            preload_threshold: 1_000,
            ..config
        };
        let rerun = bulk_insert(&mut store, &large, BulkProfile::Basic, &per_chunk)
            .await
            .unwrap();
        assert_eq!(rerun.inserted, 0);
        assert_eq!(rerun.skipped, 20);
    }

    #[tokio::test]
    async fn test_last_octet_naming() {
        let (db, refs) = create_test_database().await;
        let mut request = range_request(&refs, "10.0.0.5", "10.0.0.5", false);
        request.range = RangeSpec::from_octets("10.0.0", 5, 6).unwrap();

        let mut store = db.bulk_store();
        bulk_insert(&mut store, &request, BulkProfile::Basic, &BulkConfig::default())
            .await
            .unwrap();

        let page = db.list_ips(refs.branch_id, 1).await.unwrap();
        assert_eq!(page.ips[0].device_name, "Device-5");
        assert_eq!(page.ips[1].device_name, "Device-6");
    }

    #[tokio::test]
    async fn test_range_ceiling_boundary() {
        let (db, refs) = create_test_database().await;
        let config = BulkConfig {
            enhanced: crate::config::ProfileLimits {
                max_range: 10,
                commit_interval: 50_000,
            },
            ..BulkConfig::default()
        };

        let mut store = db.bulk_store();
        let at_limit = range_request(&refs, "10.0.0.1", "10.0.0.10", false);
        let result = bulk_insert(&mut store, &at_limit, BulkProfile::Enhanced, &config)
            .await
            .unwrap();
        assert_eq!(result.inserted, 10);

        let over_limit = range_request(&refs, "10.0.1.1", "10.0.1.11", false);
        let err = bulk_insert(&mut store, &over_limit, BulkProfile::Enhanced, &config)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BulkError::Validation(ValidationError::RangeTooLarge {
                limit: 10,
                requested: 11
            })
        ));
        assert_eq!(db.count_ips(refs.branch_id).await.unwrap(), 10);
    }

    #[tokio::test]
    async fn test_invalid_reference_fails_fast_in_enhanced_profile() {
        let (db, refs) = create_test_database().await;
        let mut request = range_request(&refs, "10.0.0.1", "10.0.0.3", false);
        request.subnet_id = 4242;

        let mut store = db.bulk_store();
        let err = bulk_insert(&mut store, &request, BulkProfile::Enhanced, &BulkConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            BulkError::Validation(ValidationError::InvalidReference {
                kind: ReferenceKind::Subnet,
                id: 4242
            })
        ));
        assert_eq!(db.count_ips(refs.branch_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_basic_profile_reports_bad_reference_per_batch() {
        let (db, refs) = create_test_database().await;
        let mut request = range_request(&refs, "10.0.0.1", "10.0.0.6", false);
        request.branch_id = 4242;
        request.batch_size = Some(3);

        let mut store = db.bulk_store();
        let result = bulk_insert(&mut store, &request, BulkProfile::Basic, &BulkConfig::default())
            .await
            .unwrap();

        assert_eq!(result.inserted, 0);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors.iter().all(|e| e.starts_with("Batch insert failed:")));
    }

    #[tokio::test]
    async fn test_references_checked_branch_first() {
        let refs = memory_refs();
        let mut store = MemoryStore::new();
        store.known_references.insert((ReferenceKind::Subnet, refs.subnet_id));

        let request = range_request(&refs, "10.1.0.1", "10.1.0.2", false);
        let err = bulk_insert(&mut store, &request, BulkProfile::Enhanced, &BulkConfig::default())
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), format!("Invalid branch ID: {}", refs.branch_id));
        assert!(!store.in_transaction());
        assert_eq!(store.committed_len(), 0);
    }

    #[tokio::test]
    async fn test_commits_every_interval() {
        let refs = memory_refs();
        let mut store = MemoryStore::new();
        let config = BulkConfig {
            default_batch_size: 10,
            basic: crate::config::ProfileLimits {
                max_range: 1_000,
                commit_interval: 25,
            },
            ..BulkConfig::default()
        };
        let request = range_request(&refs, "10.1.0.1", "10.1.0.100", false);

        let result = bulk_insert(&mut store, &request, BulkProfile::Basic, &config)
            .await
            .unwrap();

        assert_eq!(result.inserted, 100);
        // Chunks of 10 against an interval of 25: commits after 30, 60, 90, then the final one
        assert_eq!(store.commits, 4);
        assert_eq!(store.committed_len(), 100);
    }

    #[tokio::test]
    async fn test_batch_error_does_not_stop_later_chunks() {
        let refs = memory_refs();
        let mut store = MemoryStore::new();
        store.fail_batches_with = Some(Ipv4Addr::new(10, 1, 0, 5));

        let mut request = range_request(&refs, "10.1.0.1", "10.1.0.12", false);
        request.batch_size = Some(4);

        let result = bulk_insert(&mut store, &request, BulkProfile::Basic, &BulkConfig::default())
            .await
            .unwrap();

        assert_eq!(result.inserted, 8);
        assert_eq!(result.errors, vec!["Batch insert failed: injected failure".to_string()]);
        assert!(!store.contains(Ipv4Addr::new(10, 1, 0, 5)));
        assert!(store.contains(Ipv4Addr::new(10, 1, 0, 9)));
    }

    #[tokio::test]
    async fn test_concurrent_writer_conflict_is_skipped() {
        let refs = memory_refs();
        let mut store = MemoryStore::new();
        // Invisible to the pre-check, but rejected on insert
        store.hidden_conflicts.insert(Ipv4Addr::new(10, 1, 0, 2));

        let request = range_request(&refs, "10.1.0.1", "10.1.0.4", true);
        let result = bulk_insert(&mut store, &request, BulkProfile::Basic, &BulkConfig::default())
            .await
            .unwrap();

        assert_eq!(result.inserted, 3);
        assert_eq!(result.skipped, 1);
        assert!(result.errors.is_empty());
    }

    #[tokio::test]
    async fn test_commit_failure_aborts_and_keeps_earlier_commits() {
        let refs = memory_refs();
        let mut store = MemoryStore::new();
        store.fail_commit_number = Some(2);
        let config = BulkConfig {
            default_batch_size: 10,
            basic: crate::config::ProfileLimits {
                max_range: 1_000,
                commit_interval: 10,
            },
            ..BulkConfig::default()
        };
        let request = range_request(&refs, "10.1.0.1", "10.1.0.50", false);

        let err = bulk_insert(&mut store, &request, BulkProfile::Basic, &config)
            .await
            .unwrap_err();

        assert!(matches!(err, BulkError::Store(StoreError::Other(_))));
        assert_eq!(store.committed_len(), 10);
        assert!(!store.in_transaction());
    }

    fn quick_retry_config(lock_retries: u32) -> BulkConfig {
        BulkConfig {
            default_batch_size: 4,
            lock_retries,
            lock_retry_delay_ms: 1,
            ..BulkConfig::default()
        }
    }

    #[tokio::test]
    async fn test_locked_begin_and_insert_are_retried() {
        let refs = memory_refs();
        let mut store = MemoryStore::new();
        store.busy_begins = 2;
        store.busy_inserts = 3;

        let request = range_request(&refs, "10.1.0.1", "10.1.0.10", false);
        let result = bulk_insert(&mut store, &request, BulkProfile::Basic, &quick_retry_config(5))
            .await
            .unwrap();

        assert_eq!(result.inserted, 10);
        assert!(result.errors.is_empty());
        assert_eq!(store.committed_len(), 10);
    }

    #[tokio::test]
    async fn test_lock_contention_past_retries_aborts() {
        let refs = memory_refs();
        let mut store = MemoryStore::new();
        store.busy_inserts = 10;

        let request = range_request(&refs, "10.1.0.1", "10.1.0.10", false);
        let err = bulk_insert(&mut store, &request, BulkProfile::Basic, &quick_retry_config(2))
            .await
            .unwrap_err();

        assert!(matches!(err, BulkError::Store(StoreError::Busy(_))));
        assert_eq!(store.committed_len(), 0);
        assert!(!store.in_transaction());
    }

    #[tokio::test]
    async fn test_overlapping_runs_on_file_database() {
        let dir = tempfile::TempDir::new().unwrap();
        let (db, refs) = create_file_test_database(&dir.path().join("ipam.db")).await;
        let config = BulkConfig {
            default_batch_size: 100,
            enhanced: crate::config::ProfileLimits {
                max_range: 5_000_000,
                commit_interval: 1_000,
            },
            lock_retry_delay_ms: 10,
            ..BulkConfig::default()
        };

        // 20 /24s each, overlapping on 10.0.10.0 - 10.0.19.255
        let first = range_request(&refs, "10.0.0.0", "10.0.19.255", true);
        let second = range_request(&refs, "10.0.10.0", "10.0.29.255", true);
        let mut first_store = db.bulk_store();
        let mut second_store = db.bulk_store();

        let (a, b) = tokio::join!(
            bulk_insert(&mut first_store, &first, BulkProfile::Enhanced, &config),
            bulk_insert(&mut second_store, &second, BulkProfile::Enhanced, &config),
        );
        let (a, b) = (a.unwrap(), b.unwrap());

        assert!(a.errors.is_empty(), "{:?}", a.errors.first());
        assert!(b.errors.is_empty(), "{:?}", b.errors.first());
        assert_eq!(a.inserted + a.skipped, 5_120);
        assert_eq!(b.inserted + b.skipped, 5_120);
        assert_eq!(a.inserted + b.inserted, 7_680);
        assert_eq!(a.skipped + b.skipped, 2_560);
        assert_eq!(db.count_ips(refs.branch_id).await.unwrap(), 7_680);
    }
}
