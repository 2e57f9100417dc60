//! Document mapping.
//!
//! Pure functions translating domain documents into wire-ready structures.
//! Nothing here talks to the company file; reference data is provisioned
//! separately.

pub mod bill;
pub mod invoice;
pub mod party;

#[cfg(test)]
mod invoice_props;

pub use bill::{BillPayload, ExpenseLine, bill_payload, expense_accounts, expense_lines};
pub use invoice::{InvoiceLine, InvoicePayload, LineKind, invoice_lines, invoice_payload};
pub use party::{CounterpartyRecord, WireAddress, customer_record, vendor_record};
