//! Invoice line and header mapping.
//!
//! Line order reproduces a running-subtotal layout the printed invoice
//! depends on:
//!
//! 1. parts, misc charges, disposal fees, then labor when labor shares the
//!    parts tax treatment;
//! 2. when any of those exist: a parts subtotal, then one tax line and one
//!    subtotal per declared parts tax;
//! 3. when labor is taxed separately: labor lines and a labor subtotal, then
//!    a labor tax line and its subtotal when the labor rate is non-zero.

use chrono::NaiveDate;
use qbsync_shared::config::{CatalogConfig, QuickBooksConfig};
use rust_decimal::Decimal;

use super::party::WireAddress;
use crate::amount::{fixed2, plain};
use crate::document::{DeclaredTax, DisposalFee, Invoice, LaborLine, MiscCharge, PartLine};

const OTHER_FIELD_LIMIT: usize = 29;

/// What an invoice line represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// A part sold.
    Part,
    /// Labor performed.
    Labor,
    /// A flat charge.
    MiscCharge,
    /// A disposal fee.
    DisposalFee,
    /// A tax item line.
    Tax,
    /// A running subtotal.
    Subtotal,
}

/// One `InvoiceLineAdd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoiceLine {
    /// Line kind.
    pub kind: LineKind,
    /// Full name of the referenced item.
    pub item_ref: String,
    /// Printed description.
    pub desc: String,
    /// Quantity, for priced lines.
    pub quantity: Option<Decimal>,
    /// Unit rate, for priced lines.
    pub rate: Option<Decimal>,
    /// Flat amount, for misc charges.
    pub amount: Option<Decimal>,
    /// Sales tax code of catalog lines.
    pub sales_tax_code: Option<String>,
}

impl InvoiceLine {
    fn subtotal(catalog: &CatalogConfig, label: impl Into<String>) -> Self {
        Self {
            kind: LineKind::Subtotal,
            item_ref: catalog.subtotal_item.clone(),
            desc: label.into(),
            quantity: None,
            rate: None,
            amount: None,
            sales_tax_code: None,
        }
    }

    fn tax(code: &str) -> Self {
        Self {
            kind: LineKind::Tax,
            item_ref: code.to_string(),
            desc: code.to_string(),
            quantity: None,
            rate: None,
            amount: None,
            sales_tax_code: None,
        }
    }
}

/// Everything needed for one `InvoiceAdd`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvoicePayload {
    /// Customer full name.
    pub customer: String,
    /// Template full name.
    pub template: String,
    /// Transaction date.
    pub txn_date: NaiveDate,
    /// Reference number; `None` lets the company file number the invoice.
    pub ref_number: Option<String>,
    /// Billing address.
    pub bill_address: WireAddress,
    /// Shipping address.
    pub ship_address: WireAddress,
    /// PO number (mileage).
    pub po_number: Option<String>,
    /// Terms full name.
    pub terms: String,
    /// FOB, carrying the business key for duplicate disambiguation.
    pub fob: String,
    /// Customer sales tax code.
    pub customer_tax_code: String,
    /// Vehicle description, truncated.
    pub other: Option<String>,
    /// Lines in print order.
    pub lines: Vec<InvoiceLine>,
}

/// Builds the ordered invoice lines.
#[must_use]
pub fn invoice_lines(invoice: &Invoice, catalog: &CatalogConfig) -> Vec<InvoiceLine> {
    let mut lines = Vec::new();
    let mut labor = Vec::new();

    for work in &invoice.lines {
        lines.extend(work.parts.iter().map(|p| part_line(catalog, &work.item, p)));
    }
    for work in &invoice.lines {
        lines.extend(work.misc_charges.iter().map(|m| misc_line(catalog, &work.item, m)));
    }
    for work in &invoice.lines {
        lines.extend(work.disposal_fees.iter().map(|d| disposal_line(catalog, &work.item, d)));
    }
    for work in &invoice.lines {
        labor.extend(work.labors.iter().map(|l| labor_line(catalog, &work.item, l)));
    }

    if !invoice.labor_taxed_separately() {
        lines.append(&mut labor);
    }

    if !lines.is_empty() {
        lines.push(InvoiceLine::subtotal(catalog, catalog.parts_subtotal_label.clone()));
        for DeclaredTax { code, .. } in &invoice.parts_tax {
            lines.push(InvoiceLine::tax(code));
            lines.push(InvoiceLine::subtotal(catalog, catalog.tax_subtotal_label(code)));
        }
    }

    if invoice.labor_taxed_separately() && !labor.is_empty() {
        lines.append(&mut labor);
        lines.push(InvoiceLine::subtotal(catalog, catalog.labor_subtotal_label.clone()));
        if invoice
            .labor_tax_percentage
            .is_some_and(|rate| rate > Decimal::ZERO)
        {
            lines.push(InvoiceLine::tax(&catalog.labor_tax_item));
            lines.push(InvoiceLine::subtotal(
                catalog,
                catalog.labor_tax_subtotal_label.clone(),
            ));
        }
    }

    lines
}

/// Builds the complete invoice payload.
#[must_use]
pub fn invoice_payload(
    invoice: &Invoice,
    catalog: &CatalogConfig,
    settings: &QuickBooksConfig,
) -> InvoicePayload {
    let key = invoice.work_order_id.as_str().to_string();
    InvoicePayload {
        customer: invoice.to.name.clone(),
        template: settings.template_name.clone(),
        txn_date: invoice.invoice_date,
        ref_number: (!settings.keep_target_ref_number).then(|| key.clone()),
        bill_address: WireAddress::two_line(&invoice.to.address),
        ship_address: WireAddress::two_line(&invoice.to.address),
        po_number: invoice.mileage.clone(),
        terms: settings.terms.clone(),
        fob: key,
        customer_tax_code: catalog.non_taxable_code.clone(),
        other: invoice
            .vehicle_info
            .as_deref()
            .map(|info| info.chars().take(OTHER_FIELD_LIMIT).collect()),
        lines: invoice_lines(invoice, catalog),
    }
}

fn part_line(catalog: &CatalogConfig, item: &str, part: &PartLine) -> InvoiceLine {
    InvoiceLine {
        kind: LineKind::Part,
        item_ref: catalog.qualified(&catalog.parts_item),
        desc: format!(
            "{item} Part - {} ($ {} * {}{})",
            part.name,
            fixed2(part.selling_price),
            plain(part.quantity),
            part.unit
        ),
        quantity: Some(part.quantity),
        rate: Some(part.selling_price),
        amount: None,
        sales_tax_code: Some(catalog.taxable_code.clone()),
    }
}

fn misc_line(catalog: &CatalogConfig, item: &str, charge: &MiscCharge) -> InvoiceLine {
    InvoiceLine {
        kind: LineKind::MiscCharge,
        item_ref: catalog.qualified(&catalog.misc_charges_item),
        desc: format!("{item} Misc Charges - {}", charge.name),
        quantity: None,
        rate: None,
        amount: Some(charge.total_amount),
        sales_tax_code: Some(catalog.taxable_code.clone()),
    }
}

fn disposal_line(catalog: &CatalogConfig, item: &str, fee: &DisposalFee) -> InvoiceLine {
    InvoiceLine {
        kind: LineKind::DisposalFee,
        item_ref: catalog.qualified(&catalog.disposal_item),
        desc: format!(
            "{item} Disposal Fee - {} (${} x {} {})",
            fee.name,
            fixed2(fee.fee_amount),
            plain(fee.quantity),
            fee.unit
        ),
        quantity: Some(fee.quantity),
        rate: Some(fee.fee_amount),
        amount: None,
        sales_tax_code: Some(catalog.taxable_code.clone()),
    }
}

fn labor_line(catalog: &CatalogConfig, item: &str, labor: &LaborLine) -> InvoiceLine {
    InvoiceLine {
        kind: LineKind::Labor,
        item_ref: catalog.qualified(&catalog.labor_item),
        desc: format!(
            "{item} Labor - {} (${} x {} hrs.)",
            labor.name,
            fixed2(labor.labor_per_hour),
            plain(labor.hours)
        ),
        quantity: Some(labor.hours),
        rate: Some(labor.labor_per_hour),
        amount: None,
        sales_tax_code: Some(catalog.taxable_code.clone()),
    }
}
