//! Structural validation of inbound documents.
//!
//! All problems in a document are collected and reported together.

use rust_decimal::Decimal;

use super::bill::Bill;
use super::invoice::Invoice;
use super::party::Address;
use crate::error::SyncError;

/// Validates an invoice before any request is sent for it.
///
/// # Errors
///
/// Returns `SyncError::Validation` listing every problem found.
pub fn validate_invoice(invoice: &Invoice) -> Result<(), SyncError> {
    let mut problems = Vec::new();

    if invoice.work_order_id.is_blank() {
        problems.push("workOrderId is required".to_string());
    }
    require_text(&mut problems, "to.name", &invoice.to.name);
    check_address(&mut problems, "to.address", &invoice.to.address);

    for tax in &invoice.parts_tax {
        require_text(&mut problems, "partsTax.code", &tax.code);
        if tax.tax.is_sign_negative() {
            problems.push(format!("partsTax {} rate must not be negative", tax.code));
        }
    }
    if let Some(rate) = invoice.labor_tax_percentage
        && rate.is_sign_negative()
    {
        problems.push("laborTaxPercentage must not be negative".to_string());
    }

    for line in &invoice.lines {
        for part in &line.parts {
            require_positive(&mut problems, &format!("part {} quantity", part.name), part.quantity);
            require_positive(&mut problems, &format!("part {} sellingPrice", part.name), part.selling_price);
        }
        for labor in &line.labors {
            require_positive(&mut problems, &format!("labor {} hours", labor.name), labor.hours);
            require_positive(&mut problems, &format!("labor {} laborPerHour", labor.name), labor.labor_per_hour);
        }
        for charge in &line.misc_charges {
            require_positive(&mut problems, &format!("misc charge {} totalAmount", charge.name), charge.total_amount);
        }
        for fee in &line.disposal_fees {
            require_positive(&mut problems, &format!("disposal fee {} quantity", fee.name), fee.quantity);
            require_positive(&mut problems, &format!("disposal fee {} feeAmount", fee.name), fee.fee_amount);
        }
    }

    finish(problems)
}

/// Validates a bill before any request is sent for it.
///
/// # Errors
///
/// Returns `SyncError::Validation` listing every problem found.
pub fn validate_bill(bill: &Bill) -> Result<(), SyncError> {
    let mut problems = Vec::new();

    if bill.po_id.is_blank() {
        problems.push("poId is required".to_string());
    }
    require_text(&mut problems, "from.name", &bill.from.name);
    check_address(&mut problems, "from.address", &bill.from.address);

    if bill.lines.is_empty() {
        problems.push("a bill needs at least one line".to_string());
    } else if bill.txn_date().is_none() {
        problems.push("first line purchaseDate must start with a YYYY-MM-DD date".to_string());
    }

    for (index, line) in bill.lines.iter().enumerate() {
        let n = index + 1;
        require_positive(&mut problems, &format!("line {n} amount"), line.amount);
        require_text(&mut problems, &format!("line {n} expenseAccount"), &line.expense_account);
        if let Some(tax) = &line.tax_line {
            require_positive(&mut problems, &format!("line {n} taxLine amount"), tax.amount);
            require_text(&mut problems, &format!("line {n} taxLine expenseAccount"), &tax.expense_account);
        }
    }

    finish(problems)
}

fn require_text(problems: &mut Vec<String>, field: &str, value: &str) {
    if value.trim().is_empty() {
        problems.push(format!("{field} is required"));
    }
}

fn require_positive(problems: &mut Vec<String>, field: &str, value: Decimal) {
    if value <= Decimal::ZERO {
        problems.push(format!("{field} must be positive"));
    }
}

fn check_address(problems: &mut Vec<String>, prefix: &str, address: &Address) {
    require_text(problems, &format!("{prefix}.line1"), &address.line1);
    require_text(problems, &format!("{prefix}.city"), &address.city);
}

fn finish(problems: Vec<String>) -> Result<(), SyncError> {
    if problems.is_empty() {
        Ok(())
    } else {
        Err(SyncError::Validation(problems.join("; ")))
    }
}
