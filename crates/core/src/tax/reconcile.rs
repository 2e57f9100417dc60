//! Declared-versus-known tax rate comparison.

use serde::{Deserialize, Serialize};

use super::snapshot::TaxSnapshot;
use crate::amount::percent;
use crate::document::{DeclaredTax, Invoice};

/// Why a declared tax was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MismatchKind {
    /// No active tax item with the declared code.
    NotFound,
    /// The active tax item has a different rate.
    RateMismatch,
}

/// One rejected tax declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxMismatch {
    /// Declared display name.
    pub name: String,
    /// Declared code.
    pub code: String,
    /// Declared rate, formatted `x.xx %`.
    pub tax: String,
    /// Company file rate, formatted `x.xx %`.
    #[serde(rename = "taxInQB", skip_serializing_if = "Option::is_none")]
    pub tax_in_target: Option<String>,
    /// Mismatch kind.
    pub kind: MismatchKind,
    /// Operator-facing explanation.
    pub description: String,
}

/// Builds the list of taxes an invoice expects to find.
///
/// Parts taxes come first. A synthetic labor tax entry named after
/// `labor_tax_code` follows when labor is taxed separately at a non-zero rate.
#[must_use]
pub fn expected_taxes(invoice: &Invoice, labor_tax_code: &str) -> Vec<DeclaredTax> {
    let mut taxes = invoice.parts_tax.clone();
    if let Some(rate) = invoice.separate_labor_rate() {
        taxes.push(DeclaredTax {
            name: labor_tax_code.to_string(),
            code: labor_tax_code.to_string(),
            tax: rate,
            tax_amount: invoice.labor_tax,
        });
    }
    taxes
}

/// Reconciles an invoice's declared taxes against a snapshot.
///
/// Matching is by exact name among active rates only; rates compare as exact
/// decimals. An empty result means the invoice may proceed.
#[must_use]
pub fn reconcile(invoice: &Invoice, snapshot: &TaxSnapshot, labor_tax_code: &str) -> Vec<TaxMismatch> {
    expected_taxes(invoice, labor_tax_code)
        .into_iter()
        .filter_map(|declared| match snapshot.active(&declared.code) {
            None => Some(TaxMismatch {
                description: format!(
                    "{} not found in the company file, create the tax item or correct the tax header to match an existing tax item.",
                    declared.code
                ),
                name: declared.name,
                code: declared.code,
                tax: percent(declared.tax),
                tax_in_target: None,
                kind: MismatchKind::NotFound,
            }),
            Some(known) if known.rate != declared.tax => Some(TaxMismatch {
                name: declared.name,
                code: declared.code,
                tax: percent(declared.tax),
                tax_in_target: Some(percent(known.rate)),
                kind: MismatchKind::RateMismatch,
                description:
                    "Declared tax rate does not match the company file tax rate, correct it to match."
                        .to_string(),
            }),
            Some(_) => None,
        })
        .collect()
}
