//! Sync ledger table.
//!
//! One row per (document kind, business key, tenant). Built with the schema
//! builder so the same migration runs on Postgres and SQLite.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncLedger::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncLedger::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SyncLedger::DocumentKind).string_len(16).not_null())
                    .col(ColumnDef::new(SyncLedger::BusinessKey).string_len(255).not_null())
                    .col(ColumnDef::new(SyncLedger::Tenant).string_len(255).not_null())
                    .col(ColumnDef::new(SyncLedger::Status).string_len(64).not_null())
                    .col(ColumnDef::new(SyncLedger::TxnId).string_len(64))
                    .col(ColumnDef::new(SyncLedger::RefNumber).string_len(64))
                    .col(ColumnDef::new(SyncLedger::DocumentDate).date())
                    .col(
                        ColumnDef::new(SyncLedger::ProcessedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(SyncLedger::ErrorMessage).text())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("uq_sync_ledger_key")
                    .table(SyncLedger::Table)
                    .col(SyncLedger::DocumentKind)
                    .col(SyncLedger::BusinessKey)
                    .col(SyncLedger::Tenant)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Retention pruning scans by processing time.
        manager
            .create_index(
                Index::create()
                    .name("idx_sync_ledger_processed_at")
                    .table(SyncLedger::Table)
                    .col(SyncLedger::ProcessedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncLedger::Table).if_exists().to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum SyncLedger {
    Table,
    Id,
    DocumentKind,
    BusinessKey,
    Tenant,
    Status,
    TxnId,
    RefNumber,
    DocumentDate,
    ProcessedAt,
    ErrorMessage,
}
