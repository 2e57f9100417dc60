//! Vendor bill documents.

use chrono::NaiveDate;
use qbsync_shared::types::BusinessKey;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::party::{BillRecipient, Vendor};

/// A vendor bill produced for one purchase order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    /// Purchase order id, the bill business key.
    pub po_id: BusinessKey,
    /// Reference number of a bill already sent for this purchase order.
    #[serde(rename = "qbBillNumber", default)]
    pub existing_ref_number: Option<String>,
    /// Vendor the bill is payable to.
    pub from: Vendor,
    /// Receiving contact.
    #[serde(default)]
    pub to: BillRecipient,
    /// Expense lines.
    #[serde(default)]
    pub lines: Vec<BillLine>,
}

impl Bill {
    /// Transaction date: the date part of the first line's purchase date.
    #[must_use]
    pub fn txn_date(&self) -> Option<NaiveDate> {
        let first = self.lines.first()?;
        let date = first.purchase_date.split('T').next()?;
        NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d").ok()
    }
}

/// One purchased item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillLine {
    /// Purchase timestamp, ISO 8601.
    #[serde(default)]
    pub purchase_date: String,
    /// Line amount.
    pub amount: Decimal,
    /// Expense account the amount is booked to.
    #[serde(default)]
    pub expense_account: String,
    /// Line memo.
    #[serde(default)]
    pub part_memo: Option<String>,
    /// Tax rate quoted in the tax line memo.
    #[serde(default)]
    pub tax_rate: Option<Decimal>,
    /// Tax charged on the line.
    #[serde(default)]
    pub tax_line: Option<BillTaxLine>,
}

/// Tax charged on a bill line, booked as its own expense line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BillTaxLine {
    /// Tax amount.
    pub amount: Decimal,
    /// Expense account the tax is booked to.
    #[serde(default)]
    pub expense_account: String,
    /// Tax description.
    #[serde(default)]
    pub description: String,
}
