//! In-memory ledger store.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use dashmap::DashMap;

use super::{DocumentHandle, LedgerError, LedgerKey, LedgerRecord, LedgerStore, SyncStatus};

/// Ledger held in a concurrent map, for tests and ephemeral deployments.
#[derive(Debug, Default)]
pub struct MemoryLedger {
    records: DashMap<LedgerKey, LedgerRecord>,
}

impl MemoryLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a record as-is, replacing any record with the same key.
    pub fn insert_raw(&self, record: LedgerRecord) {
        self.records.insert(record.key.clone(), record);
    }

    /// Number of records.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when the ledger holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn find_by_key(&self, key: &LedgerKey) -> Result<Option<LedgerRecord>, LedgerError> {
        Ok(self.records.get(key).map(|r| r.value().clone()))
    }

    async fn upsert_success(
        &self,
        key: &LedgerKey,
        handle: &DocumentHandle,
        status: SyncStatus,
        document_date: Option<NaiveDate>,
    ) -> Result<LedgerRecord, LedgerError> {
        let record = LedgerRecord::success(key.clone(), handle, status, document_date, Utc::now());
        self.records.remove(key);
        self.records.insert(key.clone(), record.clone());
        Ok(record)
    }

    async fn upsert_failure(
        &self,
        key: &LedgerKey,
        message: &str,
        document_date: Option<NaiveDate>,
    ) -> Result<LedgerRecord, LedgerError> {
        let now = Utc::now();
        let mut entry = self
            .records
            .entry(key.clone())
            .or_insert_with(|| LedgerRecord::failure(key.clone(), message, document_date, now));
        entry.mark_failed(message, document_date, now);
        Ok(entry.value().clone())
    }

    async fn prune_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, LedgerError> {
        let before = self.records.len();
        self.records.retain(|_, record| record.processed_at >= threshold);
        Ok(u64::try_from(before.saturating_sub(self.records.len())).unwrap_or(u64::MAX))
    }
}
