//! Tax reconciliation.
//!
//! Compares the taxes an invoice declares against the rates the company
//! file knows. A non-empty mismatch list stops that one document before any
//! customer lookup or document creation.

pub mod reconcile;
pub mod snapshot;

#[cfg(test)]
mod reconcile_props;

pub use reconcile::{MismatchKind, TaxMismatch, expected_taxes, reconcile};
pub use snapshot::{TaxRate, TaxSnapshot};
