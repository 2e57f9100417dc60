//! Sync ledger port.
//!
//! The ledger keeps one record per (document kind, business key, tenant):
//! the outcome of the most recent submission and the handle of the document
//! it created. Successful submissions replace the record; failures update it
//! in place so a known handle survives a failed retry.

mod memory;
mod record;

pub use memory::MemoryLedger;
pub use record::{DocumentHandle, LedgerKey, LedgerRecord, SyncStatus};

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use thiserror::Error;

/// Errors raised by ledger stores.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The backing store failed.
    #[error("Ledger storage error: {0}")]
    Storage(String),

    /// A stored row could not be read back.
    #[error("Corrupt ledger row: {0}")]
    Corrupt(String),
}

/// Durable store of submission outcomes.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Finds the record for a key.
    async fn find_by_key(&self, key: &LedgerKey) -> Result<Option<LedgerRecord>, LedgerError>;

    /// Removes any record for the key, then inserts a fresh one carrying the
    /// new document handle.
    async fn upsert_success(
        &self,
        key: &LedgerKey,
        handle: &DocumentHandle,
        status: SyncStatus,
        document_date: Option<NaiveDate>,
    ) -> Result<LedgerRecord, LedgerError>;

    /// Marks the record for the key as failed, inserting one if absent.
    /// An existing handle is kept.
    async fn upsert_failure(
        &self,
        key: &LedgerKey,
        message: &str,
        document_date: Option<NaiveDate>,
    ) -> Result<LedgerRecord, LedgerError>;

    /// Deletes records processed before the threshold and returns how many
    /// were removed.
    async fn prune_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, LedgerError>;
}

/// Oldest processing time kept by a retention window of `days`.
#[must_use]
pub fn retention_threshold(now: DateTime<Utc>, days: i64) -> DateTime<Utc> {
    now - Duration::days(days.max(0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_retention_threshold() {
        let now = Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap();

        assert_eq!(
            retention_threshold(now, 365),
            Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
        );
        assert_eq!(retention_threshold(now, -3), now);
    }
}
