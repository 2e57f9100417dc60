//! Sync ledger repository.
//!
//! A successful submission replaces the row for its key inside one database
//! transaction, so readers never see zero or two rows for a key. A failure
//! updates the existing row in place and keeps its document handle.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use qbsync_core::ledger::{
    DocumentHandle, LedgerError, LedgerKey, LedgerRecord, LedgerStore, SyncStatus,
};
use qbsync_shared::types::DocumentKind;
use sea_orm::sea_query::Condition;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, Set, TransactionTrait,
};
use tracing::debug;

use crate::entities::sync_ledger;

/// Ledger repository backed by the `sync_ledger` table.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// The underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

#[async_trait]
impl LedgerStore for LedgerRepository {
    async fn find_by_key(&self, key: &LedgerKey) -> Result<Option<LedgerRecord>, LedgerError> {
        find_model(&self.db, key)
            .await
            .map_err(storage)?
            .map(to_record)
            .transpose()
    }

    async fn upsert_success(
        &self,
        key: &LedgerKey,
        handle: &DocumentHandle,
        status: SyncStatus,
        document_date: Option<NaiveDate>,
    ) -> Result<LedgerRecord, LedgerError> {
        let record = LedgerRecord::success(key.clone(), handle, status, document_date, Utc::now());

        let txn = self.db.begin().await.map_err(storage)?;
        sync_ledger::Entity::delete_many()
            .filter(key_condition(key))
            .exec(&txn)
            .await
            .map_err(storage)?;
        new_row(&record).insert(&txn).await.map_err(storage)?;
        txn.commit().await.map_err(storage)?;

        debug!(key = %key.business_key, status = %status, "ledger row replaced");
        Ok(record)
    }

    async fn upsert_failure(
        &self,
        key: &LedgerKey,
        message: &str,
        document_date: Option<NaiveDate>,
    ) -> Result<LedgerRecord, LedgerError> {
        let now = Utc::now();
        let txn = self.db.begin().await.map_err(storage)?;

        let record = match find_model(&txn, key).await.map_err(storage)? {
            Some(model) => {
                let mut record = to_record(model.clone())?;
                record.mark_failed(message, document_date, now);
                let mut row: sync_ledger::ActiveModel = model.into();
                row.status = Set(record.status.as_str().to_string());
                row.document_date = Set(record.document_date);
                row.processed_at = Set(record.processed_at);
                row.error_message = Set(record.error_message.clone());
                row.update(&txn).await.map_err(storage)?;
                record
            }
            None => {
                let record = LedgerRecord::failure(key.clone(), message, document_date, now);
                new_row(&record).insert(&txn).await.map_err(storage)?;
                record
            }
        };

        txn.commit().await.map_err(storage)?;
        Ok(record)
    }

    async fn prune_older_than(&self, threshold: DateTime<Utc>) -> Result<u64, LedgerError> {
        let result = sync_ledger::Entity::delete_many()
            .filter(sync_ledger::Column::ProcessedAt.lt(threshold))
            .exec(&self.db)
            .await
            .map_err(storage)?;
        Ok(result.rows_affected)
    }
}

fn key_condition(key: &LedgerKey) -> Condition {
    Condition::all()
        .add(sync_ledger::Column::DocumentKind.eq(key.kind.as_str()))
        .add(sync_ledger::Column::BusinessKey.eq(key.business_key.as_str()))
        .add(sync_ledger::Column::Tenant.eq(key.tenant.as_str()))
}

async fn find_model<C: ConnectionTrait>(
    db: &C,
    key: &LedgerKey,
) -> Result<Option<sync_ledger::Model>, DbErr> {
    sync_ledger::Entity::find()
        .filter(key_condition(key))
        .one(db)
        .await
}

fn new_row(record: &LedgerRecord) -> sync_ledger::ActiveModel {
    sync_ledger::ActiveModel {
        document_kind: Set(record.key.kind.as_str().to_string()),
        business_key: Set(record.key.business_key.as_str().to_string()),
        tenant: Set(record.key.tenant.as_str().to_string()),
        status: Set(record.status.as_str().to_string()),
        txn_id: Set(record.txn_id.clone()),
        ref_number: Set(record.ref_number.clone()),
        document_date: Set(record.document_date),
        processed_at: Set(record.processed_at),
        error_message: Set(record.error_message.clone()),
        ..Default::default()
    }
}

fn to_record(model: sync_ledger::Model) -> Result<LedgerRecord, LedgerError> {
    let kind: DocumentKind = model.document_kind.parse().map_err(LedgerError::Corrupt)?;
    let status: SyncStatus = model.status.parse().map_err(LedgerError::Corrupt)?;
    Ok(LedgerRecord {
        key: LedgerKey::new(kind, model.business_key.into(), model.tenant.into()),
        status,
        txn_id: model.txn_id,
        ref_number: model.ref_number,
        document_date: model.document_date,
        processed_at: model.processed_at,
        error_message: model.error_message,
    })
}

#[allow(clippy::needless_pass_by_value)]
fn storage(err: DbErr) -> LedgerError {
    LedgerError::Storage(err.to_string())
}
