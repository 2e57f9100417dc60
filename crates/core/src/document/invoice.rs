//! Sales invoice documents.

use chrono::NaiveDate;
use qbsync_shared::types::BusinessKey;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::party::Customer;

/// A sales invoice produced for one work order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invoice {
    /// Work order id, the invoice business key.
    pub work_order_id: BusinessKey,
    /// Reference number of an invoice already sent for this work order.
    #[serde(rename = "qbInvoiceNumber", default)]
    pub existing_ref_number: Option<String>,
    /// Invoice date.
    pub invoice_date: NaiveDate,
    /// Customer the invoice is addressed to.
    pub to: Customer,
    /// Odometer reading, sent as the PO number.
    #[serde(default, deserialize_with = "super::text_or_number")]
    pub mileage: Option<String>,
    /// Vehicle description.
    #[serde(default)]
    pub vehicle_info: Option<String>,
    /// Taxes applied to parts.
    #[serde(default)]
    pub parts_tax: Vec<DeclaredTax>,
    /// Labor shares the parts tax treatment.
    #[serde(default = "default_true")]
    pub labor_tax_same_as_part: bool,
    /// Separate labor tax rate, in percent.
    #[serde(default)]
    pub labor_tax_percentage: Option<Decimal>,
    /// Separate labor tax amount.
    #[serde(default)]
    pub labor_tax: Option<Decimal>,
    /// Work lines, one per repaired item.
    #[serde(default)]
    pub lines: Vec<WorkLine>,
}

fn default_true() -> bool {
    true
}

impl Invoice {
    /// True when labor is taxed separately from parts.
    #[must_use]
    pub const fn labor_taxed_separately(&self) -> bool {
        !self.labor_tax_same_as_part
    }

    /// Separate labor tax rate when labor is taxed separately and the rate
    /// is non-zero.
    #[must_use]
    pub fn separate_labor_rate(&self) -> Option<Decimal> {
        if self.labor_tax_same_as_part {
            return None;
        }
        self.labor_tax_percentage.filter(|rate| !rate.is_zero())
    }
}

/// A tax declared on the invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclaredTax {
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Tax item code in the company file.
    pub code: String,
    /// Rate in percent.
    pub tax: Decimal,
    /// Tax amount.
    #[serde(default)]
    pub tax_amount: Option<Decimal>,
}

/// Everything done to one item of a work order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkLine {
    /// Item being serviced.
    pub item: String,
    /// Parts used.
    pub parts: Vec<PartLine>,
    /// Labor performed.
    pub labors: Vec<LaborLine>,
    /// Flat misc charges.
    pub misc_charges: Vec<MiscCharge>,
    /// Disposal fees.
    pub disposal_fees: Vec<DisposalFee>,
}

/// A part sold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartLine {
    /// Part name.
    pub name: String,
    /// Unit selling price.
    pub selling_price: Decimal,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit label appended to the quantity.
    #[serde(default)]
    pub unit: String,
}

/// Labor performed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LaborLine {
    /// Labor description.
    pub name: String,
    /// Hourly rate.
    pub labor_per_hour: Decimal,
    /// Hours worked.
    pub hours: Decimal,
}

/// A flat charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MiscCharge {
    /// Charge description.
    pub name: String,
    /// Charge amount.
    pub total_amount: Decimal,
}

/// A disposal fee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisposalFee {
    /// Fee description.
    pub name: String,
    /// Fee per unit.
    pub fee_amount: Decimal,
    /// Quantity.
    pub quantity: Decimal,
    /// Unit label.
    #[serde(default)]
    pub unit: String,
}
