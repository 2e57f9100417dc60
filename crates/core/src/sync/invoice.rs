//! Invoice create-or-replace.

use qbsync_shared::types::{DocumentKind, TenantCode};
use tracing::{debug, info, warn};

use super::counterparty::ensure_customer;
use super::{DocumentResult, SyncEngine};
use crate::document::{Invoice, SyncDocument, validate_invoice};
use crate::error::SyncError;
use crate::gateway::{RequestProcessor, Session};
use crate::ledger::{DocumentHandle, LedgerKey, LedgerRecord, LedgerStore, SyncStatus};
use crate::mapping::invoice_payload;
use crate::protocol::requests::{invoice_add, invoice_query_by_ref};
use crate::protocol::{Element, TxnType};
use crate::provisioning::create;
use crate::tax::{TaxSnapshot, reconcile};

/// What is known about an earlier invoice for the same work order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum PriorInvoice {
    /// Nothing was ever sent.
    None,
    /// The earlier invoice is identified and will be deleted.
    Handle(DocumentHandle),
    /// An earlier invoice may exist but cannot be identified.
    Unresolved(SyncStatus),
}

impl<P: RequestProcessor, L: LedgerStore> SyncEngine<P, L> {
    pub(super) async fn sync_invoice(
        &self,
        session: &Session<'_, P>,
        tenant: &TenantCode,
        snapshot: &TaxSnapshot,
        invoice: &Invoice,
    ) -> Result<DocumentResult, SyncError> {
        validate_invoice(invoice)?;
        let mismatches = reconcile(invoice, snapshot, &self.catalog.labor_tax_item);
        if !mismatches.is_empty() {
            return Err(SyncError::TaxMismatch { mismatches });
        }

        ensure_customer(session, &invoice.to).await?;

        let key = LedgerKey::new(
            DocumentKind::Invoice,
            invoice.work_order_id.clone(),
            tenant.clone(),
        );
        let record = self.ledger.find_by_key(&key).await?;
        let prior = resolve_prior(session, invoice, record.as_ref()).await;

        let payload = invoice_payload(invoice, &self.catalog, &self.quickbooks);
        let request = invoice_add(&payload);
        let response = create(session, &request).await?;
        let created = handle_of(response.record("InvoiceRet"))
            .ok_or_else(|| SyncError::Transport("InvoiceAdd response carries no TxnID".into()))?;

        let document_date = invoice.document_date();
        let mut status = match &prior {
            PriorInvoice::None => SyncStatus::Created,
            PriorInvoice::Handle(_) => SyncStatus::NotDeleted,
            PriorInvoice::Unresolved(status) => *status,
        };
        self.ledger
            .upsert_success(&key, &created, status, document_date)
            .await?;

        if let PriorInvoice::Handle(old) = &prior
            && self.delete_old(session, TxnType::Invoice, &old.txn_id).await
        {
            status = SyncStatus::Updated;
            self.ledger
                .upsert_success(&key, &created, status, document_date)
                .await?;
        }

        info!(
            tenant = %tenant,
            business_key = %invoice.work_order_id,
            txn_id = %created.txn_id,
            status = %status,
            "invoice synchronized"
        );
        Ok(DocumentResult::success(
            invoice.work_order_id.clone(),
            status,
            &created,
            document_date,
        ))
    }
}

/// Resolves the earlier invoice.
///
/// A recorded transaction id is authoritative. Otherwise the recorded or
/// caller-supplied reference number is queried; several candidates are
/// narrowed by the business key carried in `FOB`, and are never guessed
/// between.
pub(super) async fn resolve_prior<P: RequestProcessor + ?Sized>(
    session: &Session<'_, P>,
    invoice: &Invoice,
    record: Option<&LedgerRecord>,
) -> PriorInvoice {
    if let Some(handle) = record.and_then(LedgerRecord::handle) {
        return PriorInvoice::Handle(handle);
    }
    let reference = record
        .and_then(|r| r.ref_number.as_deref())
        .or_else(|| invoice.existing_ref_number());
    let Some(reference) = reference else {
        return PriorInvoice::None;
    };

    let response = match session.send(&invoice_query_by_ref(reference)).await {
        Ok(response) if response.is_success() => response,
        Ok(response) => {
            debug!(reference, status = response.status_code, "previous invoice not found");
            return PriorInvoice::Unresolved(SyncStatus::OldInvoiceNotFound);
        }
        Err(e) => {
            warn!(reference, error = %e, "previous invoice lookup failed");
            return PriorInvoice::Unresolved(SyncStatus::OldInvoiceNotFound);
        }
    };

    let candidates: Vec<&Element> = response.records("InvoiceRet").collect();
    let chosen = match candidates.as_slice() {
        [] => None,
        [only] => Some(*only),
        many => {
            let key = invoice.work_order_id.as_str();
            let matching: Vec<&Element> = many
                .iter()
                .copied()
                .filter(|c| c.child_text("FOB") == Some(key))
                .collect();
            match matching.as_slice() {
                [only] => Some(*only),
                [] => None,
                _ => {
                    warn!(
                        reference,
                        business_key = key,
                        candidates = matching.len(),
                        "several previous invoices match"
                    );
                    return PriorInvoice::Unresolved(SyncStatus::DuplicateOldInvoices);
                }
            }
        }
    };

    match handle_of(chosen) {
        Some(handle) => PriorInvoice::Handle(handle),
        None => PriorInvoice::Unresolved(SyncStatus::OldInvoiceNotFound),
    }
}

pub(super) fn handle_of(record: Option<&Element>) -> Option<DocumentHandle> {
    let record = record?;
    let txn_id = record.child_text("TxnID")?.trim();
    if txn_id.is_empty() {
        return None;
    }
    Some(DocumentHandle {
        txn_id: txn_id.to_string(),
        ref_number: record.child_text("RefNumber").map(str::to_string),
    })
}
