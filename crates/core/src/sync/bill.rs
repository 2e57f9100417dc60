//! Bill create-or-replace.
//!
//! Unlike invoices, a bill known only by reference number is not looked up:
//! without a recorded transaction id it cannot be replaced safely. A bill
//! that has been paid is never replaced.

use qbsync_shared::types::{DocumentKind, TenantCode};
use tracing::{info, warn};

use super::counterparty::ensure_vendor;
use super::invoice::handle_of;
use super::{DocumentResult, SyncEngine};
use crate::document::{Bill, SyncDocument, validate_bill};
use crate::error::SyncError;
use crate::gateway::{RequestProcessor, Session};
use crate::ledger::{DocumentHandle, LedgerKey, LedgerRecord, LedgerStore, SyncStatus};
use crate::mapping::{bill_payload, expense_accounts};
use crate::protocol::requests::{bill_add, bill_query_by_txn_id, decimal_field};
use crate::protocol::{AccountType, TxnType};
use crate::provisioning::create;

impl<P: RequestProcessor, L: LedgerStore> SyncEngine<P, L> {
    pub(super) async fn sync_bill(
        &self,
        session: &Session<'_, P>,
        tenant: &TenantCode,
        bill: &Bill,
    ) -> Result<DocumentResult, SyncError> {
        validate_bill(bill)?;
        let payload = bill_payload(bill)?;

        let key = LedgerKey::new(DocumentKind::Bill, bill.po_id.clone(), tenant.clone());
        let record = self.ledger.find_by_key(&key).await?;
        let prior = match record.as_ref().and_then(LedgerRecord::handle) {
            Some(handle) => Some(handle),
            None => {
                if let Some(reference) = record
                    .as_ref()
                    .and_then(|r| r.ref_number.as_deref())
                    .or_else(|| bill.existing_ref_number())
                {
                    return Err(SyncError::Ambiguous(format!(
                        "bill {reference} was sent before but its transaction id is unknown; it cannot be replaced safely"
                    )));
                }
                None
            }
        };
        let prior = match prior {
            Some(handle) => self.unpaid(session, bill, handle).await?,
            None => None,
        };

        ensure_vendor(session, &bill.from).await?;
        let provisioner = self.provisioner(session);
        for account in expense_accounts(bill) {
            provisioner.ensure_account(account, AccountType::Expense).await?;
        }

        let response = create(session, &bill_add(&payload)).await?;
        let ret = response.record("BillRet");
        let created = handle_of(ret)
            .ok_or_else(|| SyncError::Transport("BillAdd response carries no TxnID".into()))?;
        let amount_due = ret.and_then(|r| decimal_field(r, "AmountDue"));
        let is_paid = ret
            .and_then(|r| r.child_text("IsPaid"))
            .map(|v| v.eq_ignore_ascii_case("true"));

        let document_date = bill.document_date();
        let mut status = if prior.is_some() {
            SyncStatus::NotDeleted
        } else {
            SyncStatus::Created
        };
        self.ledger
            .upsert_success(&key, &created, status, document_date)
            .await?;

        if let Some(old) = &prior
            && self.delete_old(session, TxnType::Bill, &old.txn_id).await
        {
            status = SyncStatus::BillUpdated;
            self.ledger
                .upsert_success(&key, &created, status, document_date)
                .await?;
        }

        info!(
            tenant = %tenant,
            business_key = %bill.po_id,
            txn_id = %created.txn_id,
            status = %status,
            "bill synchronized"
        );
        Ok(DocumentResult {
            amount_due,
            is_paid,
            ..DocumentResult::success(bill.po_id.clone(), status, &created, document_date)
        })
    }

    /// Fetches the earlier bill and refuses to replace it once paid.
    ///
    /// Returns `None` when the earlier bill no longer exists.
    async fn unpaid(
        &self,
        session: &Session<'_, P>,
        bill: &Bill,
        handle: DocumentHandle,
    ) -> Result<Option<DocumentHandle>, SyncError> {
        let request = bill_query_by_txn_id(&handle.txn_id);
        let response = session.send(&request).await?;
        if response.is_not_found() {
            warn!(
                tenant = session.tenant(),
                business_key = %bill.po_id,
                txn_id = %handle.txn_id,
                "previous bill no longer exists"
            );
            return Ok(None);
        }
        if !response.is_success() {
            return Err(SyncError::rejected(
                request.operation(),
                response.status_code,
                &response.message,
            ));
        }
        let paid = response
            .record("BillRet")
            .and_then(|r| r.child_text("IsPaid"))
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));
        if paid {
            return Err(SyncError::Conflict(format!(
                "bill {} is already paid and cannot be replaced",
                handle.ref_number.as_deref().unwrap_or(&handle.txn_id)
            )));
        }
        Ok(Some(handle))
    }
}
