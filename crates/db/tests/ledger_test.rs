//! Integration tests for the ledger repository.
//!
//! Runs against an in-memory SQLite database. The pool holds a single
//! connection so every query sees the same database.

use chrono::{Duration, NaiveDate, Utc};
use qbsync_core::ledger::{DocumentHandle, LedgerError, LedgerKey, LedgerStore, SyncStatus};
use qbsync_db::entities::sync_ledger;
use qbsync_db::migration::{Migrator, MigratorTrait};
use qbsync_db::{LedgerRepository, connect};
use qbsync_shared::config::DatabaseConfig;
use qbsync_shared::types::DocumentKind;
use rstest::rstest;
use sea_orm::{ActiveModelTrait, EntityTrait, PaginatorTrait, Set};

async fn repository() -> LedgerRepository {
    let config = DatabaseConfig {
        url: "sqlite::memory:".to_string(),
        max_connections: 1,
        min_connections: 1,
    };
    let db = connect(&config).await.expect("Failed to connect to database");
    Migrator::up(&db, None).await.expect("Failed to run migrations");
    LedgerRepository::new(db)
}

fn key(kind: DocumentKind, business_key: &str) -> LedgerKey {
    LedgerKey::new(kind, business_key.into(), "acme".into())
}

fn handle(txn_id: &str, ref_number: &str) -> DocumentHandle {
    DocumentHandle {
        txn_id: txn_id.to_string(),
        ref_number: Some(ref_number.to_string()),
    }
}

async fn row_count(repo: &LedgerRepository) -> u64 {
    sync_ledger::Entity::find()
        .count(repo.connection())
        .await
        .expect("Failed to count rows")
}

#[tokio::test]
async fn test_find_missing_key() {
    let repo = repository().await;

    let found = repo
        .find_by_key(&key(DocumentKind::Invoice, "WO-1"))
        .await
        .expect("Failed to query ledger");

    assert!(found.is_none());
}

#[rstest]
#[case::created(SyncStatus::Created)]
#[case::not_deleted(SyncStatus::NotDeleted)]
#[case::duplicates(SyncStatus::DuplicateOldInvoices)]
#[case::bill_updated(SyncStatus::BillUpdated)]
#[tokio::test]
async fn test_success_round_trips_status(#[case] status: SyncStatus) {
    let repo = repository().await;
    let key = key(DocumentKind::Invoice, "WO-1");
    let date = NaiveDate::from_ymd_opt(2024, 3, 1);

    repo.upsert_success(&key, &handle("1A-1700000000", "WO-1"), status, date)
        .await
        .expect("Failed to write ledger");

    let record = repo.find_by_key(&key).await.unwrap().unwrap();
    assert_eq!(record.key, key);
    assert_eq!(record.status, status);
    assert_eq!(record.txn_id.as_deref(), Some("1A-1700000000"));
    assert_eq!(record.ref_number.as_deref(), Some("WO-1"));
    assert_eq!(record.document_date, date);
    assert!(record.error_message.is_none());
}

#[tokio::test]
async fn test_success_replaces_row() {
    let repo = repository().await;
    let key = key(DocumentKind::Invoice, "WO-1");

    repo.upsert_success(&key, &handle("1-1", "WO-1"), SyncStatus::Created, None)
        .await
        .unwrap();
    repo.upsert_success(&key, &handle("2-1", "WO-1"), SyncStatus::Updated, None)
        .await
        .unwrap();

    assert_eq!(row_count(&repo).await, 1);
    let record = repo.find_by_key(&key).await.unwrap().unwrap();
    assert_eq!(record.status, SyncStatus::Updated);
    assert_eq!(record.txn_id.as_deref(), Some("2-1"));
}

#[tokio::test]
async fn test_failure_keeps_existing_handle() {
    let repo = repository().await;
    let key = key(DocumentKind::Bill, "PO-1");
    let date = NaiveDate::from_ymd_opt(2024, 5, 2);
    repo.upsert_success(&key, &handle("1-1", "PO-1"), SyncStatus::Created, date)
        .await
        .unwrap();

    let record = repo
        .upsert_failure(&key, "Conflict: bill PO-1 is already paid", None)
        .await
        .unwrap();

    assert_eq!(record.status, SyncStatus::Failure);
    assert_eq!(record.txn_id.as_deref(), Some("1-1"));
    let stored = repo.find_by_key(&key).await.unwrap().unwrap();
    assert_eq!(stored.status, SyncStatus::Failure);
    assert_eq!(stored.txn_id.as_deref(), Some("1-1"));
    assert_eq!(stored.ref_number.as_deref(), Some("PO-1"));
    assert_eq!(stored.document_date, date);
    assert_eq!(
        stored.error_message.as_deref(),
        Some("Conflict: bill PO-1 is already paid")
    );
    assert_eq!(row_count(&repo).await, 1);
}

#[tokio::test]
async fn test_failure_inserts_row_without_handle() {
    let repo = repository().await;
    let key = key(DocumentKind::Invoice, "WO-9");

    repo.upsert_failure(&key, "Invalid document: to.name is required", None)
        .await
        .unwrap();

    let stored = repo.find_by_key(&key).await.unwrap().unwrap();
    assert_eq!(stored.status, SyncStatus::Failure);
    assert!(stored.handle().is_none());
}

#[tokio::test]
async fn test_key_includes_document_kind() {
    let repo = repository().await;

    repo.upsert_success(
        &key(DocumentKind::Invoice, "42"),
        &handle("1-1", "42"),
        SyncStatus::Created,
        None,
    )
    .await
    .unwrap();
    repo.upsert_success(
        &key(DocumentKind::Bill, "42"),
        &handle("2-1", "42"),
        SyncStatus::Created,
        None,
    )
    .await
    .unwrap();

    assert_eq!(row_count(&repo).await, 2);
    let bill = repo
        .find_by_key(&key(DocumentKind::Bill, "42"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(bill.txn_id.as_deref(), Some("2-1"));
}

#[tokio::test]
async fn test_prune_removes_only_expired_rows() {
    let repo = repository().await;
    repo.upsert_success(
        &key(DocumentKind::Invoice, "WO-NEW"),
        &handle("2-1", "WO-NEW"),
        SyncStatus::Created,
        None,
    )
    .await
    .unwrap();
    sync_ledger::ActiveModel {
        document_kind: Set("invoice".to_string()),
        business_key: Set("WO-OLD".to_string()),
        tenant: Set("acme".to_string()),
        status: Set("CREATED".to_string()),
        txn_id: Set(Some("1-1".to_string())),
        processed_at: Set(Utc::now() - Duration::days(400)),
        ..Default::default()
    }
    .insert(repo.connection())
    .await
    .expect("Failed to insert expired row");

    let pruned = repo
        .prune_older_than(Utc::now() - Duration::days(365))
        .await
        .unwrap();

    assert_eq!(pruned, 1);
    assert_eq!(row_count(&repo).await, 1);
    assert!(
        repo.find_by_key(&key(DocumentKind::Invoice, "WO-OLD"))
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_unknown_status_is_corrupt() {
    let repo = repository().await;
    sync_ledger::ActiveModel {
        document_kind: Set("invoice".to_string()),
        business_key: Set("WO-1".to_string()),
        tenant: Set("acme".to_string()),
        status: Set("SOMETHING ELSE".to_string()),
        processed_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(repo.connection())
    .await
    .unwrap();

    let err = repo
        .find_by_key(&key(DocumentKind::Invoice, "WO-1"))
        .await
        .unwrap_err();

    assert!(matches!(err, LedgerError::Corrupt(_)));
}
