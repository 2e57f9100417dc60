//! Bill expense line mapping.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::amount::plain;
use crate::document::Bill;
use crate::error::SyncError;

/// One `ExpenseLineAdd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpenseLine {
    /// Expense account full name.
    pub account: String,
    /// Amount.
    pub amount: Decimal,
    /// Memo.
    pub memo: Option<String>,
}

/// Everything needed for one `BillAdd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BillPayload {
    /// Vendor full name.
    pub vendor: String,
    /// Transaction date.
    pub txn_date: NaiveDate,
    /// Reference number (purchase order id).
    pub ref_number: String,
    /// Bill memo.
    pub memo: String,
    /// Expense lines in input order.
    pub lines: Vec<ExpenseLine>,
}

/// Maps each bill line to an expense line, followed by a second expense line
/// for its tax when one is declared.
#[must_use]
pub fn expense_lines(bill: &Bill) -> Vec<ExpenseLine> {
    let mut lines = Vec::with_capacity(bill.lines.len() * 2);
    for line in &bill.lines {
        lines.push(ExpenseLine {
            account: line.expense_account.clone(),
            amount: line.amount,
            memo: line.part_memo.clone(),
        });
        if let Some(tax) = &line.tax_line {
            let rate = line.tax_rate.map(plain).unwrap_or_default();
            lines.push(ExpenseLine {
                account: tax.expense_account.clone(),
                amount: tax.amount,
                memo: Some(format!("{} Rate {rate}", tax.description).trim_end().to_string()),
            });
        }
    }
    lines
}

/// Distinct expense account names referenced by a bill, in first-use order.
#[must_use]
pub fn expense_accounts(bill: &Bill) -> Vec<&str> {
    let mut accounts: Vec<&str> = Vec::new();
    let names = bill.lines.iter().flat_map(|line| {
        std::iter::once(line.expense_account.as_str())
            .chain(line.tax_line.iter().map(|t| t.expense_account.as_str()))
    });
    for name in names {
        if !accounts.contains(&name) {
            accounts.push(name);
        }
    }
    accounts
}

/// Builds the complete bill payload.
///
/// # Errors
///
/// Returns `SyncError::Validation` when the first line has no readable
/// purchase date.
pub fn bill_payload(bill: &Bill) -> Result<BillPayload, SyncError> {
    let txn_date = bill.txn_date().ok_or_else(|| {
        SyncError::Validation("first line purchaseDate must start with a YYYY-MM-DD date".into())
    })?;
    Ok(BillPayload {
        vendor: bill.from.name.clone(),
        txn_date,
        ref_number: bill.po_id.as_str().to_string(),
        memo: format!(
            "PO: {}, Contact: {}",
            bill.po_id,
            bill.to.contact_person_email.as_deref().unwrap_or_default()
        ),
        lines: expense_lines(bill),
    })
}
