//! Synchronization engine.
//!
//! One batch runs against one session. Documents are processed one at a
//! time; a failure is recorded in the ledger and reported for that document
//! only. Errors raised while opening the session, bootstrapping reference
//! data or fetching the tax snapshot abort the batch. The session is closed
//! on every path.

mod bill;
mod counterparty;
mod invoice;
mod result;


pub use result::{BatchOutcome, DocumentResult};

use chrono::{NaiveDate, Utc};
use qbsync_shared::config::{CatalogConfig, QuickBooksConfig};
use qbsync_shared::types::{BusinessKey, DocumentKind, TenantCode};
use tracing::{error, info, warn};

use crate::document::{Bill, Invoice, Submission, SyncDocument};
use crate::error::SyncError;
use crate::gateway::{RequestProcessor, Session};
use crate::ledger::{LedgerKey, LedgerStore, retention_threshold};
use crate::protocol::TxnType;
use crate::protocol::requests::txn_del;
use crate::provisioning::{BootstrapReport, Provisioner};

/// Orchestrates sessions, provisioning, document replacement and the ledger.
pub struct SyncEngine<P, L> {
    processor: P,
    ledger: L,
    quickbooks: QuickBooksConfig,
    catalog: CatalogConfig,
}

impl<P: RequestProcessor, L: LedgerStore> SyncEngine<P, L> {
    /// Creates an engine.
    #[must_use]
    pub const fn new(
        processor: P,
        ledger: L,
        quickbooks: QuickBooksConfig,
        catalog: CatalogConfig,
    ) -> Self {
        Self {
            processor,
            ledger,
            quickbooks,
            catalog,
        }
    }

    /// The ledger store.
    pub const fn ledger(&self) -> &L {
        &self.ledger
    }

    /// The request processor.
    pub const fn processor(&self) -> &P {
        &self.processor
    }

    /// Accounting engine settings.
    pub const fn quickbooks(&self) -> &QuickBooksConfig {
        &self.quickbooks
    }

    /// Opens a session and ensures the reference data exists.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::NotFound` for an unknown tenant, or the first
    /// session or provisioning failure.
    pub async fn connect(&self, tenant: &TenantCode) -> Result<BootstrapReport, SyncError> {
        let session = self.open(tenant).await?;
        let report = self.provisioner(&session).ensure_bootstrap().await;
        session.close().await;
        report
    }

    /// Synchronizes a batch of invoices for one tenant.
    ///
    /// # Errors
    ///
    /// Returns an error only when the whole batch cannot run: unknown tenant,
    /// session failure, bootstrap failure, missing template or tax snapshot
    /// failure.
    pub async fn sync_invoices(
        &self,
        tenant: &TenantCode,
        submissions: Vec<Submission<Invoice>>,
    ) -> Result<BatchOutcome, SyncError> {
        let session = self.open(tenant).await?;
        let results = self.invoice_batch(&session, tenant, submissions).await;
        session.close().await;
        self.finish(tenant, results?).await
    }

    /// Synchronizes a batch of bills for one tenant.
    ///
    /// The catalog bootstrap and template check are skipped: a bill only
    /// needs its vendor and expense accounts, which each bill ensures itself.
    ///
    /// # Errors
    ///
    /// Returns an error only for an unknown tenant or a session failure.
    pub async fn sync_bills(
        &self,
        tenant: &TenantCode,
        submissions: Vec<Submission<Bill>>,
    ) -> Result<BatchOutcome, SyncError> {
        let session = self.open(tenant).await?;
        let mut results = Vec::with_capacity(submissions.len());
        for submission in submissions {
            let result = match submission {
                Submission::Parsed(bill) => {
                    let outcome = self.sync_bill(&session, tenant, &bill).await;
                    self.settle(tenant, &bill, outcome).await
                }
                malformed @ Submission::Malformed { .. } => {
                    self.reject::<Bill>(tenant, malformed).await
                }
            };
            results.push(result);
        }
        session.close().await;
        self.finish(tenant, results).await
    }

    async fn invoice_batch(
        &self,
        session: &Session<'_, P>,
        tenant: &TenantCode,
        submissions: Vec<Submission<Invoice>>,
    ) -> Result<Vec<DocumentResult>, SyncError> {
        let provisioner = self.provisioner(session);
        provisioner.ensure_bootstrap().await?;
        provisioner.verify_template().await?;
        let snapshot = provisioner.fetch_tax_snapshot().await?;

        let mut results = Vec::with_capacity(submissions.len());
        for submission in submissions {
            let result = match submission {
                Submission::Parsed(invoice) => {
                    let outcome = self.sync_invoice(session, tenant, &snapshot, &invoice).await;
                    self.settle(tenant, &invoice, outcome).await
                }
                malformed @ Submission::Malformed { .. } => {
                    self.reject::<Invoice>(tenant, malformed).await
                }
            };
            results.push(result);
        }
        Ok(results)
    }

    async fn open(&self, tenant: &TenantCode) -> Result<Session<'_, P>, SyncError> {
        let company_path = self
            .quickbooks
            .company_path(tenant.as_str())
            .ok_or_else(|| {
                SyncError::NotFound(format!("no company file is configured for tenant {tenant}"))
            })?;
        Ok(Session::open(
            &self.processor,
            tenant.as_str(),
            company_path,
            self.quickbooks.multi_user_mode,
        )
        .await?)
    }

    fn provisioner<'a>(&'a self, session: &'a Session<'a, P>) -> Provisioner<'a, P> {
        Provisioner::new(session, &self.catalog, &self.quickbooks)
    }

    /// Turns a per-document outcome into a result, recording failures.
    async fn settle<T: SyncDocument>(
        &self,
        tenant: &TenantCode,
        document: &T,
        outcome: Result<DocumentResult, SyncError>,
    ) -> DocumentResult {
        match outcome {
            Ok(result) => result,
            Err(err) => {
                self.record_failure(
                    T::KIND,
                    tenant,
                    document.business_key().clone(),
                    document.document_date(),
                    err,
                )
                .await
            }
        }
    }

    async fn reject<T: SyncDocument>(
        &self,
        tenant: &TenantCode,
        submission: Submission<T>,
    ) -> DocumentResult {
        let business_key = submission.business_key().clone();
        let reason = match submission {
            Submission::Malformed { reason, .. } => reason,
            Submission::Parsed(_) => String::new(),
        };
        self.record_failure(
            T::KIND,
            tenant,
            business_key,
            None,
            SyncError::Validation(reason),
        )
        .await
    }

    async fn record_failure(
        &self,
        kind: DocumentKind,
        tenant: &TenantCode,
        business_key: BusinessKey,
        document_date: Option<NaiveDate>,
        err: SyncError,
    ) -> DocumentResult {
        warn!(
            tenant = %tenant,
            business_key = %business_key,
            error_code = err.error_code(),
            error = %err,
            "document failed"
        );
        if !business_key.is_blank() {
            let key = LedgerKey::new(kind, business_key.clone(), tenant.clone());
            if let Err(ledger_err) = self
                .ledger
                .upsert_failure(&key, &err.to_string(), document_date)
                .await
            {
                error!(
                    tenant = %tenant,
                    business_key = %business_key,
                    error = %ledger_err,
                    "failed to record document failure"
                );
            }
        }
        DocumentResult::failure(business_key, document_date, err)
    }

    /// Prunes the ledger once the batch is done.
    async fn finish(
        &self,
        tenant: &TenantCode,
        results: Vec<DocumentResult>,
    ) -> Result<BatchOutcome, SyncError> {
        let threshold = retention_threshold(Utc::now(), self.quickbooks.ledger_retention_days);
        let pruned = match self.ledger.prune_older_than(threshold).await {
            Ok(pruned) => pruned,
            Err(e) => {
                error!(tenant = %tenant, error = %e, "ledger pruning failed");
                0
            }
        };
        let outcome = BatchOutcome {
            tenant: tenant.clone(),
            results,
            pruned,
        };
        info!(
            tenant = %tenant,
            documents = outcome.results.len(),
            failed = outcome.failed(),
            pruned,
            "batch complete"
        );
        Ok(outcome)
    }

    /// Deletes a superseded document. Failures are logged and reported as
    /// `false`.
    async fn delete_old(
        &self,
        session: &Session<'_, P>,
        txn_type: TxnType,
        txn_id: &str,
    ) -> bool {
        match session.send(&txn_del(txn_type, txn_id)).await {
            Ok(response) if response.is_success() => true,
            Ok(response) => {
                warn!(
                    tenant = session.tenant(),
                    txn_id,
                    status = response.status_code,
                    message = %response.message,
                    "previous document not deleted"
                );
                false
            }
            Err(e) => {
                warn!(tenant = session.tenant(), txn_id, error = %e, "previous document not deleted");
                false
            }
        }
    }
}
