//! Inbound domain documents.
//!
//! Documents are immutable once received. A resubmission is a new document
//! carrying the same business key.

pub mod bill;
pub mod invoice;
pub mod party;
pub mod validation;

pub use bill::{Bill, BillLine, BillTaxLine};
pub use invoice::{DeclaredTax, DisposalFee, Invoice, LaborLine, MiscCharge, PartLine, WorkLine};
pub use party::{Address, BillRecipient, Customer, Vendor};
pub use validation::{validate_bill, validate_invoice};

use chrono::NaiveDate;
use qbsync_shared::types::{BusinessKey, DocumentKind};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Common view over invoices and bills used by the sync engine.
pub trait SyncDocument: DeserializeOwned + Send + Sync {
    /// Ledger discriminator.
    const KIND: DocumentKind;
    /// JSON field carrying the business key.
    const KEY_FIELD: &'static str;

    /// Business key correlating resubmissions.
    fn business_key(&self) -> &BusinessKey;
    /// Document date recorded in the ledger.
    fn document_date(&self) -> Option<NaiveDate>;
    /// Reference number of a previous submission known to the caller.
    fn existing_ref_number(&self) -> Option<&str>;
}

impl SyncDocument for Invoice {
    const KIND: DocumentKind = DocumentKind::Invoice;
    const KEY_FIELD: &'static str = "workOrderId";

    fn business_key(&self) -> &BusinessKey {
        &self.work_order_id
    }

    fn document_date(&self) -> Option<NaiveDate> {
        Some(self.invoice_date)
    }

    fn existing_ref_number(&self) -> Option<&str> {
        non_blank(self.existing_ref_number.as_deref())
    }
}

impl SyncDocument for Bill {
    const KIND: DocumentKind = DocumentKind::Bill;
    const KEY_FIELD: &'static str = "poId";

    fn business_key(&self) -> &BusinessKey {
        &self.po_id
    }

    fn document_date(&self) -> Option<NaiveDate> {
        self.txn_date()
    }

    fn existing_ref_number(&self) -> Option<&str> {
        non_blank(self.existing_ref_number.as_deref())
    }
}

/// A document as received in a batch.
///
/// Documents that fail to deserialize stay in the batch so they are reported
/// and recorded individually instead of rejecting the whole request.
#[derive(Debug, Clone, PartialEq)]
pub enum Submission<T> {
    /// A well-formed document.
    Parsed(T),
    /// A document whose structure could not be read.
    Malformed {
        /// Business key, when it could be extracted.
        business_key: BusinessKey,
        /// Deserialization error.
        reason: String,
    },
}

impl<T: SyncDocument> Submission<T> {
    /// Deserializes one raw batch entry.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let business_key = BusinessKey::new(match value.get(T::KEY_FIELD) {
            Some(Value::String(s)) => s.clone(),
            Some(Value::Number(n)) => n.to_string(),
            _ => String::new(),
        });
        match serde_json::from_value::<T>(value) {
            Ok(document) => Self::Parsed(document),
            Err(e) => Self::Malformed {
                business_key,
                reason: e.to_string(),
            },
        }
    }

    /// Business key of the submission.
    #[must_use]
    pub fn business_key(&self) -> &BusinessKey {
        match self {
            Self::Parsed(document) => document.business_key(),
            Self::Malformed { business_key, .. } => business_key,
        }
    }
}

impl<T> From<T> for Submission<T> {
    fn from(document: T) -> Self {
        Self::Parsed(document)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Accepts a JSON string or number for free-text fields the business
/// application sometimes sends as numbers.
fn text_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Null) | None => None,
        Some(other) => {
            return Err(serde::de::Error::custom(format!(
                "expected string or number, found {other}"
            )));
        }
    })
}
