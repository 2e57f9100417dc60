//! Ledger record types.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use qbsync_shared::types::{BusinessKey, DocumentKind, TenantCode};
use serde::{Deserialize, Serialize};

/// Identity of a ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LedgerKey {
    /// Invoice or bill.
    pub kind: DocumentKind,
    /// Work order or purchase order id.
    pub business_key: BusinessKey,
    /// Tenant the document was submitted for.
    pub tenant: TenantCode,
}

impl LedgerKey {
    /// Creates a key.
    #[must_use]
    pub fn new(kind: DocumentKind, business_key: BusinessKey, tenant: TenantCode) -> Self {
        Self {
            kind,
            business_key,
            tenant,
        }
    }
}

/// Outcome of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncStatus {
    /// No prior document; created.
    #[serde(rename = "CREATED")]
    Created,
    /// Prior invoice replaced and deleted.
    #[serde(rename = "UPDATED")]
    Updated,
    /// New document created but the prior one was not deleted.
    #[serde(rename = "NOT DELETED")]
    NotDeleted,
    /// Several prior invoices match the business key; none was deleted.
    #[serde(rename = "DUPLICATE OLD INVOICES FOUND")]
    DuplicateOldInvoices,
    /// The prior invoice reference number matched nothing.
    #[serde(rename = "OLD INVOICE NOT FOUND")]
    OldInvoiceNotFound,
    /// Prior bill replaced and deleted.
    #[serde(rename = "BILL UPDATED")]
    BillUpdated,
    /// The submission failed.
    #[serde(rename = "FAILURE")]
    Failure,
}

impl SyncStatus {
    /// Stored and reported form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Created => "CREATED",
            Self::Updated => "UPDATED",
            Self::NotDeleted => "NOT DELETED",
            Self::DuplicateOldInvoices => "DUPLICATE OLD INVOICES FOUND",
            Self::OldInvoiceNotFound => "OLD INVOICE NOT FOUND",
            Self::BillUpdated => "BILL UPDATED",
            Self::Failure => "FAILURE",
        }
    }

    /// True for every status except `Failure`.
    #[must_use]
    pub const fn is_success(self) -> bool {
        !matches!(self, Self::Failure)
    }
}

impl std::fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SyncStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATED" => Ok(Self::Created),
            "UPDATED" => Ok(Self::Updated),
            "NOT DELETED" => Ok(Self::NotDeleted),
            "DUPLICATE OLD INVOICES FOUND" => Ok(Self::DuplicateOldInvoices),
            "OLD INVOICE NOT FOUND" => Ok(Self::OldInvoiceNotFound),
            "BILL UPDATED" => Ok(Self::BillUpdated),
            "FAILURE" => Ok(Self::Failure),
            other => Err(format!("unknown sync status: {other}")),
        }
    }
}

/// Handle of a document in the company file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentHandle {
    /// Transaction id.
    pub txn_id: String,
    /// Reference number printed on the document.
    pub ref_number: Option<String>,
}

/// One ledger row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerRecord {
    /// Record identity.
    pub key: LedgerKey,
    /// Last outcome.
    pub status: SyncStatus,
    /// Transaction id of the current document.
    pub txn_id: Option<String>,
    /// Reference number of the current document.
    pub ref_number: Option<String>,
    /// Document date.
    pub document_date: Option<NaiveDate>,
    /// When the submission was processed; drives retention.
    pub processed_at: DateTime<Utc>,
    /// Error message, set only for failures.
    pub error_message: Option<String>,
}

impl LedgerRecord {
    /// Record for a successful submission.
    #[must_use]
    pub fn success(
        key: LedgerKey,
        handle: &DocumentHandle,
        status: SyncStatus,
        document_date: Option<NaiveDate>,
        processed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            status,
            txn_id: Some(handle.txn_id.clone()),
            ref_number: handle.ref_number.clone(),
            document_date,
            processed_at,
            error_message: None,
        }
    }

    /// Record for a failed first submission.
    #[must_use]
    pub fn failure(
        key: LedgerKey,
        message: &str,
        document_date: Option<NaiveDate>,
        processed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            key,
            status: SyncStatus::Failure,
            txn_id: None,
            ref_number: None,
            document_date,
            processed_at,
            error_message: Some(message.to_string()),
        }
    }

    /// Marks an existing record as failed, keeping its handle.
    pub fn mark_failed(
        &mut self,
        message: &str,
        document_date: Option<NaiveDate>,
        processed_at: DateTime<Utc>,
    ) {
        self.status = SyncStatus::Failure;
        self.error_message = Some(message.to_string());
        self.document_date = document_date.or(self.document_date);
        self.processed_at = processed_at;
    }

    /// Handle of the current document, if one was recorded.
    #[must_use]
    pub fn handle(&self) -> Option<DocumentHandle> {
        self.txn_id.as_ref().map(|txn_id| DocumentHandle {
            txn_id: txn_id.clone(),
            ref_number: self.ref_number.clone(),
        })
    }
}
