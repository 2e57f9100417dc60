//! Per-document and per-batch results.

use chrono::NaiveDate;
use qbsync_shared::types::{BusinessKey, TenantCode};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::SyncError;
use crate::ledger::{DocumentHandle, SyncStatus};
use crate::tax::TaxMismatch;

/// Outcome of one document in a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
    /// Business key of the document.
    pub business_key: BusinessKey,
    /// Resolved status.
    pub status: SyncStatus,
    /// Reference number of the created document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_number: Option<String>,
    /// Transaction id of the created document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub txn_id: Option<String>,
    /// Document date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_date: Option<NaiveDate>,
    /// Human-readable outcome.
    pub message: String,
    /// Error code, for failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<&'static str>,
    /// Tax mismatches, for tax failures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tax_details: Vec<TaxMismatch>,
    /// Amount due on a created bill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_due: Option<Decimal>,
    /// Paid flag of a created bill.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_paid: Option<bool>,
}

impl DocumentResult {
    /// Result of a document that reached the company file.
    #[must_use]
    pub fn success(
        business_key: BusinessKey,
        status: SyncStatus,
        handle: &DocumentHandle,
        document_date: Option<NaiveDate>,
    ) -> Self {
        Self {
            business_key,
            status,
            ref_number: handle.ref_number.clone(),
            txn_id: Some(handle.txn_id.clone()),
            document_date,
            message: describe(status).to_string(),
            error_code: None,
            tax_details: Vec::new(),
            amount_due: None,
            is_paid: None,
        }
    }

    /// Result of a failed document.
    #[must_use]
    pub fn failure(
        business_key: BusinessKey,
        document_date: Option<NaiveDate>,
        error: SyncError,
    ) -> Self {
        let error_code = Some(error.error_code());
        let message = error.to_string();
        let tax_details = match error {
            SyncError::TaxMismatch { mismatches } => mismatches,
            _ => Vec::new(),
        };
        Self {
            business_key,
            status: SyncStatus::Failure,
            ref_number: None,
            txn_id: None,
            document_date,
            message,
            error_code,
            tax_details,
            amount_due: None,
            is_paid: None,
        }
    }
}

fn describe(status: SyncStatus) -> &'static str {
    match status {
        SyncStatus::Created => "Document created",
        SyncStatus::Updated | SyncStatus::BillUpdated => {
            "Document replaced and the previous version deleted"
        }
        SyncStatus::NotDeleted => "Document created; the previous version could not be deleted",
        SyncStatus::DuplicateOldInvoices => {
            "Document created; several previous invoices match, none was deleted"
        }
        SyncStatus::OldInvoiceNotFound => "Document created; the previous invoice was not found",
        SyncStatus::Failure => "Document failed",
    }
}

/// Outcome of a batch, in input order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchOutcome {
    /// Tenant the batch ran for.
    pub tenant: TenantCode,
    /// One result per submitted document.
    pub results: Vec<DocumentResult>,
    /// Ledger rows removed by retention pruning.
    pub pruned: u64,
}

impl BatchOutcome {
    /// Number of failed documents.
    #[must_use]
    pub fn failed(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status == SyncStatus::Failure)
            .count()
    }
}
